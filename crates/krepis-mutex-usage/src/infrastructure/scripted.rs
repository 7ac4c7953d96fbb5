//! Scripted Mutex Primitives - Deterministic Test Backend
//!
//! Never blocks and never touches the platform lock. Lock and unlock
//! statuses come from a queue (default: success), and every call is
//! recorded. This makes scenarios like "double lock" or "lock reports a
//! failure" reproducible on a single thread, where the native backend
//! would deadlock or never fail.

use crate::domain::{MutexError, MutexOps, ThreadingMutex};
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Primitive call observed by [`ScriptedMutexOps`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveCall {
    /// `init`
    Init,
    /// `free`
    Free,
    /// `lock` and the status it returned
    Lock(Result<(), MutexError>),
    /// `unlock` and the status it returned
    Unlock(Result<(), MutexError>),
}

#[derive(Debug, Default)]
struct Script {
    lock_results: VecDeque<Result<(), MutexError>>,
    unlock_results: VecDeque<Result<(), MutexError>>,
    calls: Vec<PrimitiveCall>,
}

/// Deterministic, non-blocking [`MutexOps`]
///
/// # Example
///
/// ```rust
/// use krepis_mutex_usage::infrastructure::{PrimitiveCall, ScriptedMutexOps};
/// use krepis_mutex_usage::{MutexError, MutexOps, ThreadingMutex};
///
/// let ops = ScriptedMutexOps::new();
/// ops.push_lock_result(Err(MutexError::MutexFailure));
///
/// let m = ThreadingMutex::new();
/// assert_eq!(ops.lock(&m), Err(MutexError::MutexFailure));
/// assert_eq!(ops.lock(&m), Ok(()));
/// assert_eq!(ops.calls().len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct ScriptedMutexOps {
    script: Mutex<Script>,
}

impl ScriptedMutexOps {
    /// Empty script: every lock/unlock succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the status returned by the next `lock`
    pub fn push_lock_result(&self, result: Result<(), MutexError>) {
        self.script.lock().lock_results.push_back(result);
    }

    /// Queue the status returned by the next `unlock`
    pub fn push_unlock_result(&self, result: Result<(), MutexError>) {
        self.script.lock().unlock_results.push_back(result);
    }

    /// Calls observed so far
    pub fn calls(&self) -> Vec<PrimitiveCall> {
        self.script.lock().calls.clone()
    }

    /// Forget recorded calls (queued results are kept)
    pub fn clear_calls(&self) {
        self.script.lock().calls.clear();
    }
}

impl MutexOps for ScriptedMutexOps {
    fn init(&self, _mutex: &ThreadingMutex) {
        self.script.lock().calls.push(PrimitiveCall::Init);
    }

    fn free(&self, _mutex: &ThreadingMutex) {
        self.script.lock().calls.push(PrimitiveCall::Free);
    }

    fn lock(&self, _mutex: &ThreadingMutex) -> Result<(), MutexError> {
        let mut script = self.script.lock();
        let result = script.lock_results.pop_front().unwrap_or(Ok(()));
        script.calls.push(PrimitiveCall::Lock(result));
        result
    }

    fn unlock(&self, _mutex: &ThreadingMutex) -> Result<(), MutexError> {
        let mut script = self.script.lock();
        let result = script.unlock_results.pop_front().unwrap_or(Ok(()));
        script.calls.push(PrimitiveCall::Unlock(result));
        result
    }
}
