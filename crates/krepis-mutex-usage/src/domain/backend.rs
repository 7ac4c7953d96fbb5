//! Mutex Capability Abstraction
//!
//! # Two Seams
//!
//! ```text
//!  library code ──▶ ThreadingContext ──▶ dyn MutexOps ──▶ platform lock
//!                          │
//!                          └──▶ dyn MutexHooks (optional, pre/post)
//! ```
//!
//! - [`MutexOps`] is the primitive capability. The harness can substitute a
//!   decorated implementation for the production one.
//! - [`MutexHooks`] are callbacks the context invokes around the primitives
//!   without replacing them.
//!
//! Both seams only ever see [`ThreadingMutex`]; framework-internal locks
//! use a different type and cannot reach either trait.

use super::error::MutexError;
use super::types::ThreadingMutex;

/// Primitive mutex operations
///
/// # Contract
/// - `init` / `free` cannot fail.
/// - `lock` / `unlock` report a status; implementations never inspect or
///   modify the handle's tracking state.
pub trait MutexOps: Send + Sync {
    /// Prepare the platform lock for use
    fn init(&self, mutex: &ThreadingMutex);

    /// Release platform resources held by the lock
    fn free(&self, mutex: &ThreadingMutex);

    /// Acquire the lock
    ///
    /// # Errors
    /// Backend-specific [`MutexError`] when the lock could not be taken
    fn lock(&self, mutex: &ThreadingMutex) -> Result<(), MutexError>;

    /// Release the lock
    ///
    /// # Errors
    /// Backend-specific [`MutexError`] when the lock could not be released
    fn unlock(&self, mutex: &ThreadingMutex) -> Result<(), MutexError>;
}

/// Observation points around the primitives
///
/// Naming follows when the hook runs relative to the primitive: after
/// init and lock, before free and unlock. Running `pre_unlock` before the
/// release and `post_lock` after the acquire means the state byte is only
/// ever rewritten by a thread that holds the mutex under test.
pub trait MutexHooks: Send + Sync {
    /// After `init(mutex)` returned
    fn post_init(&self, mutex: &ThreadingMutex);

    /// Before `free(mutex)` runs
    fn pre_free(&self, mutex: &ThreadingMutex);

    /// After `lock(mutex)` returned `status`
    fn post_lock(&self, mutex: &ThreadingMutex, status: &Result<(), MutexError>);

    /// Before `unlock(mutex)` runs
    fn pre_unlock(&self, mutex: &ThreadingMutex);
}
