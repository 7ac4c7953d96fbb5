//! Native Mutex Primitives
//!
//! Production backend over `parking_lot::RawMutex`. Lock and unlock are
//! separate calls here (no RAII guard), matching the C-style mutex API the
//! library under test is written against.
//!
//! The raw lock is only ever released by the thread that acquired it: each
//! thread carries a non-zero owner token, `lock` stores it in the handle and
//! `unlock` compare-and-clears it before touching the raw lock.

use crate::domain::{MutexError, MutexOps, ThreadingMutex};
use parking_lot::lock_api::RawMutex as RawMutexApi;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_OWNER_TOKEN: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static OWNER_TOKEN: u64 = NEXT_OWNER_TOKEN.fetch_add(1, Ordering::Relaxed);
}

/// Owner token of the calling thread
///
/// Fails only while the thread's locals are being torn down.
fn current_owner() -> Result<u64, MutexError> {
    OWNER_TOKEN
        .try_with(|token| *token)
        .map_err(|_| MutexError::MutexFailure)
}

/// Production mutex primitives
///
/// `init` and `free` have nothing to do: the raw lock is const-initialised
/// and owns no OS resources.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeMutexOps;

impl NativeMutexOps {
    /// Create the production backend
    pub const fn new() -> Self {
        Self
    }
}

impl MutexOps for NativeMutexOps {
    #[inline]
    fn init(&self, _mutex: &ThreadingMutex) {}

    #[inline]
    fn free(&self, _mutex: &ThreadingMutex) {}

    fn lock(&self, mutex: &ThreadingMutex) -> Result<(), MutexError> {
        let owner = current_owner()?;
        mutex.raw().lock();
        mutex.claim_owner(owner);
        Ok(())
    }

    /// # Errors
    /// `MutexFailure` unless the calling thread holds the lock
    fn unlock(&self, mutex: &ThreadingMutex) -> Result<(), MutexError> {
        let owner = current_owner()?;
        if !mutex.release_owner(owner) {
            return Err(MutexError::MutexFailure);
        }
        // SAFETY: the owner token matched, so this thread acquired the raw
        // lock in `lock` and has not released it since.
        unsafe { mutex.raw().unlock() };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::{Arc, Barrier};

    #[test]
    fn test_lock_unlock() {
        let ops = NativeMutexOps::new();
        let m = ThreadingMutex::new();

        ops.init(&m);
        ops.lock(&m).unwrap();
        assert!(m.raw().is_locked());
        ops.unlock(&m).unwrap();
        assert!(!m.raw().is_locked());
        ops.free(&m);
    }

    #[test]
    fn test_unlock_of_unheld_lock_fails() {
        let ops = NativeMutexOps::new();
        let m = ThreadingMutex::new();
        assert_eq!(ops.unlock(&m), Err(MutexError::MutexFailure));
    }

    #[test]
    fn test_second_unlock_fails() {
        let ops = NativeMutexOps::new();
        let m = ThreadingMutex::new();

        ops.lock(&m).unwrap();
        ops.unlock(&m).unwrap();
        assert_eq!(ops.unlock(&m), Err(MutexError::MutexFailure));
    }

    #[test]
    fn test_unlock_from_non_owner_thread_fails() {
        let ops = NativeMutexOps::new();
        let m = ThreadingMutex::new();
        let locked = Barrier::new(2);
        let checked = Barrier::new(2);

        std::thread::scope(|s| {
            s.spawn(|| {
                ops.lock(&m).unwrap();
                locked.wait();
                checked.wait();
                ops.unlock(&m).unwrap();
            });

            locked.wait();
            assert_eq!(ops.unlock(&m), Err(MutexError::MutexFailure));
            // The holder's lock survived the foreign unlock attempt
            assert!(m.raw().is_locked());
            checked.wait();
        });

        assert!(!m.raw().is_locked());
    }

    #[test]
    fn test_mutual_exclusion() {
        let ops = NativeMutexOps::new();
        let m = Arc::new(ThreadingMutex::new());
        let inside = Arc::new(AtomicUsize::new(0));

        std::thread::scope(|s| {
            for _ in 0..4 {
                let m = m.clone();
                let inside = inside.clone();
                s.spawn(move || {
                    for _ in 0..200 {
                        ops.lock(&m).unwrap();
                        assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                        inside.fetch_sub(1, Ordering::SeqCst);
                        ops.unlock(&m).unwrap();
                    }
                });
            }
        });
        assert_eq!(inside.load(Ordering::SeqCst), 0);
    }
}
