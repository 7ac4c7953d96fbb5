//! Mutex State Transitions
//!
//! Pure transition function shared by every tracker entry point. It knows
//! nothing about locking or counters: given the raw state byte and the
//! observed operation it either yields the next state (plus the change to
//! the live-mutex counter) or the usage error to report.
//!
//! | op          | FREED             | IDLE              | LOCKED            | other          |
//! |-------------|-------------------|-------------------|-------------------|----------------|
//! | init        | IDLE, +1          | IDLE, +1          | IDLE, +1          | IDLE, +1       |
//! | free        | DoubleFree        | FREED, -1         | FreeWithoutUnlock | CorruptedState |
//! | lock ok     | LockWithoutInit   | LOCKED            | DoubleLock        | CorruptedState |
//! | lock failed | LockWithoutInit   | IDLE              | DoubleLock        | CorruptedState |
//! | unlock      | UnlockWithoutInit | UnlockWithoutLock | IDLE              | CorruptedState |
//!
//! `init` never validates the prior state: a double init on zeroed memory
//! cannot be told apart from a first init.

use super::error::UsageError;
use super::types::{MutexOp, MutexState};

/// Outcome of a valid transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// State to store in the mutex record
    pub next: MutexState,
    /// Change to apply to `live_mutexes`
    pub live_delta: i64,
}

impl Transition {
    const fn to(next: MutexState, live_delta: i64) -> Self {
        Self { next, live_delta }
    }
}

/// Validate `op` against the raw state byte
///
/// On error the caller must leave the state byte untouched.
pub fn next_state(raw: u8, op: MutexOp) -> Result<Transition, UsageError> {
    if op == MutexOp::Init {
        return Ok(Transition::to(MutexState::Idle, 1));
    }

    let Some(current) = MutexState::from_raw(raw) else {
        return Err(UsageError::CorruptedState { raw });
    };

    match (op, current) {
        (MutexOp::Free, MutexState::Freed) => Err(UsageError::DoubleFree),
        (MutexOp::Free, MutexState::Idle) => Ok(Transition::to(MutexState::Freed, -1)),
        (MutexOp::Free, MutexState::Locked) => Err(UsageError::FreeWithoutUnlock),

        (MutexOp::Lock { .. }, MutexState::Freed) => Err(UsageError::LockWithoutInit),
        (MutexOp::Lock { acquired: true }, MutexState::Idle) => {
            Ok(Transition::to(MutexState::Locked, 0))
        }
        // Failed for a reason unrelated to usage discipline
        (MutexOp::Lock { acquired: false }, MutexState::Idle) => {
            Ok(Transition::to(MutexState::Idle, 0))
        }
        (MutexOp::Lock { .. }, MutexState::Locked) => Err(UsageError::DoubleLock),

        (MutexOp::Unlock, MutexState::Freed) => Err(UsageError::UnlockWithoutInit),
        (MutexOp::Unlock, MutexState::Idle) => Err(UsageError::UnlockWithoutLock),
        (MutexOp::Unlock, MutexState::Locked) => Ok(Transition::to(MutexState::Idle, 0)),

        (MutexOp::Init, _) => Ok(Transition::to(MutexState::Idle, 1)),
    }
}
