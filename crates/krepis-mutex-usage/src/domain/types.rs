//! Core Types for Mutex Usage Tracking
//!
//! # State Machine
//!
//! ```text
//!   UNINITIALIZED ──init──┐
//!                         ▼
//!   FREED ──init──▶ IDLE ──lock──▶ LOCKED
//!     ▲              │  ◀──unlock──
//!     └─────free─────┘
//! ```
//!
//! All-bits-zero is the FREED state. A handle that was never initialised
//! but lives in zeroed memory is therefore indistinguishable from one that
//! was properly freed, which is what lets the tracker catch
//! "lock without init" on zeroed memory while double-init stays invisible.

use parking_lot::lock_api::RawMutex as RawMutexApi;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

/// Value of the `state` field of a trackable mutex
///
/// `Freed` must stay `0`: zero-initialised memory is defined to be a freed
/// mutex. `Locked` could be any other non-zero value.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutexState {
    /// Set by free (and the all-zero initial value)
    Freed = 0,
    /// Set by init and by unlock
    Idle = 1,
    /// Set by a successful lock
    Locked = 2,
}

impl MutexState {
    /// Decode a raw state byte
    ///
    /// Returns `None` for values outside the defined enum, which the
    /// tracker reports as a corrupted state.
    #[inline]
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Freed),
            1 => Some(Self::Idle),
            2 => Some(Self::Locked),
            _ => None,
        }
    }

    /// Raw byte stored in the mutex record
    #[inline(always)]
    pub const fn as_raw(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for MutexState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Freed => write!(f, "FREED"),
            Self::Idle => write!(f, "IDLE"),
            Self::Locked => write!(f, "LOCKED"),
        }
    }
}

/// Primitive mutex operation observed by the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutexOp {
    /// `init(handle)` completed
    Init,
    /// `free(handle)` is about to run
    Free,
    /// `lock(handle)` returned; `acquired` is false when the primitive
    /// reported a non-success status
    Lock {
        /// Whether the underlying lock call succeeded
        acquired: bool,
    },
    /// `unlock(handle)` is about to run
    Unlock,
}

impl MutexOp {
    /// Short operation name used in log events
    pub const fn name(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Free => "free",
            Self::Lock { .. } => "lock",
            Self::Unlock => "unlock",
        }
    }
}

/// Trackable mutex handle
///
/// This is the resource the library under test creates, locks and frees.
/// The tracker never owns it; it only observes and rewrites the `state`
/// byte while holding its own guard lock.
///
/// The platform lock and the state byte are separate: production
/// primitives ([`NativeMutexOps`](crate::infrastructure::NativeMutexOps))
/// touch only the platform lock and its owner token, the tracker touches
/// only the state.
pub struct ThreadingMutex {
    raw: parking_lot::RawMutex,
    /// Token of the thread holding `raw`, 0 when unowned
    owner: AtomicU64,
    state: AtomicU8,
}

impl ThreadingMutex {
    /// Create a zero-initialised handle (state = FREED)
    pub const fn new() -> Self {
        Self::with_raw_state(0)
    }

    /// Create a handle whose state byte holds arbitrary memory contents
    ///
    /// Models an uninitialised or corrupted handle. `with_raw_state(0)` is
    /// the same as [`ThreadingMutex::new`].
    pub const fn with_raw_state(raw: u8) -> Self {
        Self {
            raw: <parking_lot::RawMutex as RawMutexApi>::INIT,
            owner: AtomicU64::new(0),
            state: AtomicU8::new(raw),
        }
    }

    /// Decoded state, or `None` if the byte is corrupted
    pub fn state(&self) -> Option<MutexState> {
        MutexState::from_raw(self.raw_state())
    }

    /// Raw state byte
    pub fn raw_state(&self) -> u8 {
        self.state.load(Ordering::Acquire)
    }

    /// Overwrite the state byte. Callers must hold the tracker guard.
    pub(crate) fn store_state(&self, state: MutexState) {
        self.state.store(state.as_raw(), Ordering::Release);
    }

    /// Platform lock used by the production primitives
    pub(crate) fn raw(&self) -> &parking_lot::RawMutex {
        &self.raw
    }

    /// Record `token` as the holder. Call only right after acquiring `raw`.
    pub(crate) fn claim_owner(&self, token: u64) {
        self.owner.store(token, Ordering::Release);
    }

    /// Clear the holder if it is `token`
    ///
    /// Returns `false` when another thread (or nobody) holds the lock. At
    /// most one caller can win for a given acquisition.
    pub(crate) fn release_owner(&self, token: u64) -> bool {
        self.owner
            .compare_exchange(token, 0, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl Default for ThreadingMutex {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ThreadingMutex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadingMutex")
            .field("state", &self.raw_state())
            .field("locked", &self.raw.is_locked())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_handle_is_freed() {
        let m = ThreadingMutex::new();
        assert_eq!(m.state(), Some(MutexState::Freed));
        assert_eq!(m.raw_state(), 0);
    }

    #[test]
    fn test_raw_state_decoding() {
        assert_eq!(MutexState::from_raw(1), Some(MutexState::Idle));
        assert_eq!(MutexState::from_raw(2), Some(MutexState::Locked));
        assert_eq!(MutexState::from_raw(0x7f), None);

        let m = ThreadingMutex::with_raw_state(0xAA);
        assert_eq!(m.state(), None);
        assert_eq!(m.raw_state(), 0xAA);
    }

    #[test]
    fn test_store_state() {
        let m = ThreadingMutex::new();
        m.store_state(MutexState::Locked);
        assert_eq!(m.state(), Some(MutexState::Locked));
        assert_eq!(MutexState::Locked.to_string(), "LOCKED");
    }

    #[test]
    fn test_op_names() {
        assert_eq!(MutexOp::Init.name(), "init");
        assert_eq!(MutexOp::Lock { acquired: false }.name(), "lock");
    }
}
