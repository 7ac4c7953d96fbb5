//! Adapters Layer
//!
//! Connects the domain tracker to the mutex API that library code calls:
//!
//! - [`ThreadingContext`]: the explicit mutex API context (replaces global
//!   function pointers)
//! - [`Instrumented`]: substitution strategy, a decorating `MutexOps`
//! - [`MutexUsage`]: init / end / check / set_baseline lifecycle

pub mod context;
pub mod instrumented;
pub mod usage;

pub use context::ThreadingContext;
pub use instrumented::Instrumented;
pub use usage::MutexUsage;
