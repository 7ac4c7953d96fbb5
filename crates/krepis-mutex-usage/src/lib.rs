//! Krepis Mutex Usage Verifier
//!
//! # Overview
//!
//! `krepis-mutex-usage` detects incorrect use of a mutex abstraction at
//! runtime: lock without init, double lock, unlock without lock, free while
//! locked, double free, corrupted state, and init/free imbalance across a
//! test case. It checks the *discipline* of the mutex API only, not whether
//! the mutex actually protects what it should.
//!
//! # Trinity Architecture
//!
//! - **Domain**: state machine, tracker, live-mutex counter, result sink
//! - **Infrastructure**: native and scripted primitives, thread facade
//! - **Adapters**: threading context, instrumented primitives, lifecycle
//!
//! # Usage
//!
//! ```rust
//! use krepis_mutex_usage::{
//!     MutexUsage, MutexUsageConfig, TestResult, TestResultSink, ThreadingContext,
//!     ThreadingMutex, UsageError,
//! };
//!
//! let ctx = ThreadingContext::native();
//! let config = MutexUsageConfig::new().echo_to_stdout(false);
//! let (mut usage, info) = MutexUsage::with_test_info(config);
//!
//! // 1. Suite start
//! usage.init(&ctx).unwrap();
//! usage.set_baseline();
//!
//! // 2. A well-behaved test case
//! let result = usage.run_case(|| {
//!     let m = ThreadingMutex::new();
//!     ctx.mutex_init(&m);
//!     ctx.mutex_lock(&m).unwrap();
//!     ctx.mutex_unlock(&m).unwrap();
//!     ctx.mutex_free(&m);
//! });
//! assert_eq!(result, TestResult::Success);
//!
//! // 3. A leaking one: functionally fine, failed by check()
//! let result = usage.run_case(|| {
//!     let m = ThreadingMutex::new();
//!     ctx.mutex_init(&m);
//! });
//! assert_eq!(result, TestResult::Failed);
//! assert_eq!(usage.live_mutexes(), usage.permanent_mutex_count());
//!
//! // 4. Suite end
//! usage.end(&ctx).unwrap();
//! # let _ = (info.result(), UsageError::DoubleFree);
//! ```
//!
//! # Limitations
//!
//! All-bits-zero is FREED, so a double init and some uses of uninitialised
//! memory cannot be detected. Counting init against free misses a leak that
//! is exactly offset by a spurious free elsewhere in the same case.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

// Trinity Architecture Layers
pub mod domain;
pub mod infrastructure;
pub mod adapters;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Re-export Primary Types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

// Mutex record & state machine
pub use domain::{next_state, MutexOp, MutexState, ThreadingMutex, Transition};

// Tracker, reporting, configuration
pub use domain::{
    GuardPolicy,
    InterceptStrategy,
    InternalMutex,
    MutexHooks,
    MutexOps,
    MutexUsageConfig,
    MutexUsageTracker,
    TestFailure,
    TestInfo,
    TestResult,
    TestResultSink,
};

// Errors
pub use domain::{FrameworkError, MutexError, ThreadError, UsageError};

// Backends
pub use infrastructure::{NativeMutexOps, ScriptedMutexOps, TestThread, ThreadBackend, ThreadFacade};

// Lifecycle
pub use adapters::{Instrumented, MutexUsage, ThreadingContext};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
