//! Threading Context - The Mutex API Seen by Library Code
//!
//! Explicit replacement for the four global `mutex_{init,free,lock,unlock}`
//! function pointers. Library code receives a `&ThreadingContext` and calls
//! through it; the test harness substitutes the primitive capability or
//! registers hooks on the same object.

use crate::domain::{MutexError, MutexHooks, MutexOps, ThreadingMutex};
use crate::infrastructure::NativeMutexOps;
use parking_lot::RwLock;
use std::sync::Arc;

/// Current mutex primitives plus optional observation hooks
pub struct ThreadingContext {
    ops: RwLock<Arc<dyn MutexOps>>,
    hooks: RwLock<Option<Arc<dyn MutexHooks>>>,
}

impl ThreadingContext {
    /// Context using `ops`, no hooks
    pub fn new(ops: Arc<dyn MutexOps>) -> Self {
        Self {
            ops: RwLock::new(ops),
            hooks: RwLock::new(None),
        }
    }

    /// Context using the production primitives
    pub fn native() -> Self {
        Self::new(Arc::new(NativeMutexOps::new()))
    }

    /// Currently installed primitives
    pub fn ops(&self) -> Arc<dyn MutexOps> {
        self.ops.read().clone()
    }

    /// Replace the primitives, returning the previous ones
    pub fn substitute(&self, ops: Arc<dyn MutexOps>) -> Arc<dyn MutexOps> {
        std::mem::replace(&mut *self.ops.write(), ops)
    }

    /// Currently registered hooks
    pub fn hooks(&self) -> Option<Arc<dyn MutexHooks>> {
        self.hooks.read().clone()
    }

    /// Register (or clear, with `None`) hooks, returning the previous ones
    pub fn set_hooks(&self, hooks: Option<Arc<dyn MutexHooks>>) -> Option<Arc<dyn MutexHooks>> {
        std::mem::replace(&mut *self.hooks.write(), hooks)
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Mutex API
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Initialise `mutex`
    pub fn mutex_init(&self, mutex: &ThreadingMutex) {
        self.ops().init(mutex);
        if let Some(hooks) = self.hooks() {
            hooks.post_init(mutex);
        }
    }

    /// Free `mutex`
    pub fn mutex_free(&self, mutex: &ThreadingMutex) {
        if let Some(hooks) = self.hooks() {
            hooks.pre_free(mutex);
        }
        self.ops().free(mutex);
    }

    /// Lock `mutex`
    ///
    /// # Errors
    /// Whatever the installed primitive reports
    pub fn mutex_lock(&self, mutex: &ThreadingMutex) -> Result<(), MutexError> {
        let status = self.ops().lock(mutex);
        if let Some(hooks) = self.hooks() {
            hooks.post_lock(mutex, &status);
        }
        status
    }

    /// Unlock `mutex`
    ///
    /// # Errors
    /// Whatever the installed primitive reports
    pub fn mutex_unlock(&self, mutex: &ThreadingMutex) -> Result<(), MutexError> {
        if let Some(hooks) = self.hooks() {
            hooks.pre_unlock(mutex);
        }
        self.ops().unlock(mutex)
    }
}

impl Default for ThreadingContext {
    fn default() -> Self {
        Self::native()
    }
}
