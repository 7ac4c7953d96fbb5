//! Internal (Untracked) Locks
//!
//! The tracker's own guard lock and the lock protecting test results must
//! never pass through the tracker:
//!
//! 1. A failure reported while holding the guard would deadlock on the
//!    reporting path.
//! 2. Both locks live for the whole suite and would show up as leaked on
//!    the first test case.
//!
//! Instead of comparing handle identity at runtime, these locks have their
//! own type. [`InternalMutex`] is not a [`ThreadingMutex`] and cannot be
//! handed to any [`MutexOps`] implementation, so the exclusion holds by
//! construction.
//!
//! [`ThreadingMutex`]: super::types::ThreadingMutex
//! [`MutexOps`]: super::backend::MutexOps

use super::config::GuardPolicy;
use parking_lot::{Mutex, MutexGuard};

/// Lock used by the framework itself, invisible to usage tracking
#[derive(Debug, Default)]
pub struct InternalMutex<T> {
    inner: Mutex<T>,
}

impl<T> InternalMutex<T> {
    /// Wrap `value`
    pub fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
        }
    }

    /// Block until the lock is held
    #[inline]
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock()
    }

    /// Acquire according to `policy`
    ///
    /// Returns `None` only under [`GuardPolicy::SkipWhenBusy`] when another
    /// thread currently holds the lock.
    #[inline]
    pub fn acquire(&self, policy: GuardPolicy) -> Option<MutexGuard<'_, T>> {
        match policy {
            GuardPolicy::Block => Some(self.inner.lock()),
            GuardPolicy::SkipWhenBusy => self.inner.try_lock(),
        }
    }
}
