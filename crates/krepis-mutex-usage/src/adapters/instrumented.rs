//! Instrumented Primitives (Substitution Strategy)

use crate::domain::{MutexError, MutexOps, MutexUsageTracker, ThreadingMutex};
use std::sync::Arc;

/// [`MutexOps`] decorator that reports every call to the tracker
///
/// Ordering around the real primitive:
///
/// - `lock`: real lock first, then the tracker. The state byte only moves
///   to LOCKED while the caller holds both the mutex and the guard.
/// - `unlock`: tracker first, then the real unlock, for the same reason.
/// - `free`: tracker first, so a bad free is reported before the platform
///   lock is torn down.
///
/// The inner primitive's return value is passed through unchanged.
pub struct Instrumented<O: MutexOps + ?Sized> {
    inner: Arc<O>,
    tracker: Arc<MutexUsageTracker>,
}

impl<O: MutexOps + ?Sized> Instrumented<O> {
    /// Wrap `inner`
    pub fn new(inner: Arc<O>, tracker: Arc<MutexUsageTracker>) -> Self {
        Self { inner, tracker }
    }
}

impl<O: MutexOps + ?Sized> MutexOps for Instrumented<O> {
    fn init(&self, mutex: &ThreadingMutex) {
        self.inner.init(mutex);
        self.tracker.post_init(mutex);
    }

    fn free(&self, mutex: &ThreadingMutex) {
        self.tracker.pre_free(mutex);
        self.inner.free(mutex);
    }

    fn lock(&self, mutex: &ThreadingMutex) -> Result<(), MutexError> {
        let status = self.inner.lock(mutex);
        self.tracker.post_lock(mutex, &status);
        status
    }

    fn unlock(&self, mutex: &ThreadingMutex) -> Result<(), MutexError> {
        self.tracker.pre_unlock(mutex);
        self.inner.unlock(mutex)
    }
}
