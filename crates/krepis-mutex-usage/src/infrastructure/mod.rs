//! Infrastructure Layer
//!
//! Concrete backends behind the domain traits:
//!
//! - [`NativeMutexOps`]: production primitives on `parking_lot::RawMutex`
//! - [`ScriptedMutexOps`]: deterministic, non-blocking primitives for tests
//! - [`thread`]: thread create/join facade over a selectable backend

pub mod native;
pub mod scripted;
pub mod thread;

pub use native::NativeMutexOps;
pub use scripted::{PrimitiveCall, ScriptedMutexOps};
pub use thread::{TestThread, ThreadBackend, ThreadEntry, ThreadFacade};
