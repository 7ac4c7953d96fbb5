//! Domain Layer: Mutex Usage Discipline
//!
//! Pure model of the init/lock/unlock/free contract and the tracker that
//! enforces it. Nothing in this layer knows how the platform lock works or
//! how the tracker gets wired in front of it.
//!
//! # Modules
//!
//! - [`types`]: the trackable mutex record and its state byte
//! - [`transition`]: the state machine as a pure function
//! - [`guard`]: the untracked lock type used by the framework itself
//! - [`backend`]: `MutexOps` / `MutexHooks` capability traits
//! - [`report`]: the test-result sink
//! - [`tracker`]: state validation plus the live-mutex counter
//! - [`config`]: guard policy and interception strategy
//! - [`error`]: usage and status errors

pub mod backend;
pub mod config;
pub mod error;
pub mod guard;
pub mod report;
pub mod tracker;
pub mod transition;
pub mod types;

// Re-exports
pub use backend::{MutexHooks, MutexOps};
pub use config::{GuardPolicy, InterceptStrategy, MutexUsageConfig};
pub use error::{FrameworkError, MutexError, ThreadError, UsageError};
pub use guard::InternalMutex;
pub use report::{TestFailure, TestInfo, TestResult, TestResultSink};
pub use tracker::MutexUsageTracker;
pub use transition::{next_state, Transition};
pub use types::{MutexOp, MutexState, ThreadingMutex};
