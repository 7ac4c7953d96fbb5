//! Domain Model: Error Types
//!
//! Two families live here and must not be confused:
//!
//! - **Usage errors** ([`UsageError`]) describe a broken init/lock/unlock/free
//!   discipline. They are recorded, never returned from the intercepted call.
//! - **Status errors** ([`MutexError`], [`ThreadError`], [`FrameworkError`])
//!   are ordinary `Result` errors returned by primitives and lifecycle calls.

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Error Codes
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Bad input data passed to a threading primitive
pub const ERR_THREADING_BAD_INPUT_DATA: i32 = -0x001C;

/// Locking / unlocking / freeing failed
pub const ERR_THREADING_MUTEX_ERROR: i32 = -0x001E;

/// Thread creation or join failed
pub const ERR_THREADING_THREAD_ERROR: i32 = -0x001F;

/// Not enough memory to create the thread
pub const ERR_INSUFFICIENT_MEMORY: i32 = -141;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Usage Errors
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Mutex usage discipline violation
///
/// Display strings are the tags printed as `[mutex: <tag>]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UsageError {
    /// free on a mutex that is already FREED (or was never initialised)
    #[error("free without init or double free")]
    DoubleFree,

    /// free on a LOCKED mutex
    #[error("free without unlock")]
    FreeWithoutUnlock,

    /// lock on a FREED mutex
    #[error("lock without init")]
    LockWithoutInit,

    /// lock on a mutex that is already LOCKED
    #[error("double lock")]
    DoubleLock,

    /// unlock on a FREED mutex
    #[error("unlock without init")]
    UnlockWithoutInit,

    /// unlock on an IDLE mutex
    #[error("unlock without lock")]
    UnlockWithoutLock,

    /// state byte outside the defined enum
    #[error("corrupted state")]
    CorruptedState {
        /// The offending raw byte
        raw: u8,
    },

    /// init/free counter imbalance at a test-case boundary
    ///
    /// Positive `leaked` means more inits than frees (a leak); negative
    /// means a free without a matching init somewhere.
    #[error("missing free")]
    MissingFree {
        /// `live_mutexes - permanent_mutex_count` when the imbalance was seen
        leaked: i64,
    },
}

impl UsageError {
    /// Stable kind name for structured log fields
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::DoubleFree => "double_free",
            Self::FreeWithoutUnlock => "free_without_unlock",
            Self::LockWithoutInit => "lock_without_init",
            Self::DoubleLock => "double_lock",
            Self::UnlockWithoutInit => "unlock_without_init",
            Self::UnlockWithoutLock => "unlock_without_lock",
            Self::CorruptedState { .. } => "corrupted_state",
            Self::MissingFree { .. } => "missing_free",
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Status Errors
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Status returned by a primitive lock or unlock
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MutexError {
    /// Invalid handle passed to the primitive
    #[error("bad input data")]
    BadInputData,

    /// The platform lock refused the operation
    #[error("mutex operation failed")]
    MutexFailure,
}

impl MutexError {
    /// Normalised numeric code
    pub const fn code(&self) -> i32 {
        match self {
            Self::BadInputData => ERR_THREADING_BAD_INPUT_DATA,
            Self::MutexFailure => ERR_THREADING_MUTEX_ERROR,
        }
    }
}

/// Status returned by the thread create/join facade
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ThreadError {
    /// Missing entry point, occupied handle on create, or empty handle on join
    #[error("bad input data")]
    BadInputData,

    /// The backend could not allocate the thread
    #[error("insufficient memory to create thread")]
    InsufficientMemory,

    /// Backend-reported failure (including a panicked thread on join)
    #[error("thread error")]
    ThreadFailure,
}

impl ThreadError {
    /// Normalised numeric code
    pub const fn code(&self) -> i32 {
        match self {
            Self::BadInputData => ERR_THREADING_BAD_INPUT_DATA,
            Self::InsufficientMemory => ERR_INSUFFICIENT_MEMORY,
            Self::ThreadFailure => ERR_THREADING_THREAD_ERROR,
        }
    }
}

/// Misuse of the framework lifecycle itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FrameworkError {
    /// `init` called while instrumentation is already installed
    #[error("mutex usage verification is already active")]
    AlreadyActive,

    /// `end` called without a matching `init`
    #[error("mutex usage verification is not active")]
    NotActive,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
