//! MutexUsageTracker - Runtime Discipline Checker
//!
//! # Shared State
//!
//! ```text
//! guard: InternalMutex<Counters>
//!     live_mutexes            inits - valid frees since the framework started
//!     permanent_mutex_count   baseline of mutexes that outlive test cases
//! + the `state` byte of every ThreadingMutex passing through
//! ```
//!
//! Every read or write of the above happens with the guard held. There is
//! no lock-free fast path.
//!
//! # Invariant
//!
//! `live_mutexes == permanent_mutex_count` at every test-case boundary.
//! [`MutexUsageTracker::check`] enforces it and resets the counter so the
//! next case starts clean even after a leak.

use super::backend::MutexHooks;
use super::config::MutexUsageConfig;
use super::error::{MutexError, UsageError};
use super::guard::InternalMutex;
use super::report::{TestResult, TestResultSink};
use super::transition::next_state;
use super::types::{MutexOp, ThreadingMutex};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Log target for every event emitted by the tracker
pub const LOG_TARGET: &str = "mutex_usage";

/// Failure message used when `check` converts a usage error into a failure
pub const USAGE_FAILURE_MESSAGE: &str = "Mutex usage error";

#[derive(Debug, Default)]
struct Counters {
    live_mutexes: i64,
    permanent_mutex_count: i64,
}

/// Mutex state tracker and live-mutex counter
///
/// Usage errors never abort the observed operation. They are logged with
/// the `[mutex: <tag>]` tag right away and recorded in the sink, where
/// [`check`](Self::check) turns them into a test failure at the end of the
/// case.
pub struct MutexUsageTracker {
    guard: InternalMutex<Counters>,
    sink: Arc<dyn TestResultSink>,
    config: MutexUsageConfig,
}

impl MutexUsageTracker {
    /// Create a tracker reporting into `sink`
    pub fn new(sink: Arc<dyn TestResultSink>, config: MutexUsageConfig) -> Self {
        Self {
            guard: InternalMutex::new(Counters::default()),
            sink,
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &MutexUsageConfig {
        &self.config
    }

    /// Sink receiving usage errors
    pub fn sink(&self) -> &Arc<dyn TestResultSink> {
        &self.sink
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Observation points
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// `init(mutex)` completed: state = IDLE, `live_mutexes += 1`
    pub fn post_init(&self, mutex: &ThreadingMutex) {
        self.observe(mutex, MutexOp::Init);
    }

    /// `free(mutex)` is about to run
    pub fn pre_free(&self, mutex: &ThreadingMutex) {
        self.observe(mutex, MutexOp::Free);
    }

    /// `lock(mutex)` returned `status`
    ///
    /// A failed lock from IDLE leaves the state at IDLE and is not a usage
    /// error.
    pub fn post_lock(&self, mutex: &ThreadingMutex, status: &Result<(), MutexError>) {
        self.observe(
            mutex,
            MutexOp::Lock {
                acquired: status.is_ok(),
            },
        );
    }

    /// `unlock(mutex)` is about to run
    pub fn pre_unlock(&self, mutex: &ThreadingMutex) {
        self.observe(mutex, MutexOp::Unlock);
    }

    fn observe(&self, mutex: &ThreadingMutex, op: MutexOp) {
        let Some(mut counters) = self.guard.acquire(self.config.guard_policy) else {
            debug!(target: LOG_TARGET, op = op.name(), "guard busy, skipping check");
            return;
        };

        match next_state(mutex.raw_state(), op) {
            Ok(transition) => {
                mutex.store_state(transition.next);
                counters.live_mutexes += transition.live_delta;
            }
            // Illegal transitions leave the state byte as it was
            Err(error) => self.report(op, error),
        }
    }

    fn report(&self, op: MutexOp, error: UsageError) {
        self.sink.record_usage_error(error);
        warn!(target: LOG_TARGET, kind = error.kind(), op = op.name(), "[mutex: {}]", error);
        if self.config.echo_to_stdout {
            print!("[mutex: {}] ", error);
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Counter & test-case boundary
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Treat every currently live mutex as permanent
    ///
    /// Call once after suite-level mutexes are created and before the first
    /// test case.
    pub fn set_baseline(&self) {
        let mut counters = self.guard.lock();
        counters.permanent_mutex_count = counters.live_mutexes;
        info!(
            target: LOG_TARGET,
            permanent = counters.permanent_mutex_count,
            "mutex usage baseline set"
        );
    }

    /// Test-case boundary check
    ///
    /// 1. A counter imbalance is reported as [`UsageError::MissingFree`] and
    ///    the counter is reset to the baseline.
    /// 2. If any usage error is pending and the case has not already failed
    ///    for a functional reason, the case is failed.
    /// 3. The pending usage error is cleared.
    ///
    /// Returns the usage error that was pending for this case, if any.
    pub fn check(&self) -> Option<UsageError> {
        let Some(mut counters) = self.guard.acquire(self.config.guard_policy) else {
            debug!(target: LOG_TARGET, "guard busy, skipping test-case check");
            return None;
        };

        if counters.live_mutexes != counters.permanent_mutex_count {
            let leaked = counters.live_mutexes - counters.permanent_mutex_count;
            warn!(target: LOG_TARGET, kind = "missing_free", leaked, "[mutex: {} leaked]", leaked);
            if self.config.echo_to_stdout {
                print!("[mutex: {} leaked] ", leaked);
            }
            counters.live_mutexes = counters.permanent_mutex_count;
            self.sink.record_usage_error(UsageError::MissingFree { leaked });
        }

        let pending = self.sink.usage_error();
        if pending.is_some() && self.sink.result() != TestResult::Failed {
            // Functionally the case passed; the usage error fails it after all.
            self.sink.fail(USAGE_FAILURE_MESSAGE, line!(), file!());
        }
        self.sink.clear_usage_error();

        pending
    }

    /// Current `live_mutexes`
    pub fn live_mutexes(&self) -> i64 {
        self.guard.lock().live_mutexes
    }

    /// Current baseline
    pub fn permanent_mutex_count(&self) -> i64 {
        self.guard.lock().permanent_mutex_count
    }
}

impl MutexHooks for MutexUsageTracker {
    fn post_init(&self, mutex: &ThreadingMutex) {
        MutexUsageTracker::post_init(self, mutex);
    }

    fn pre_free(&self, mutex: &ThreadingMutex) {
        MutexUsageTracker::pre_free(self, mutex);
    }

    fn post_lock(&self, mutex: &ThreadingMutex, status: &Result<(), MutexError>) {
        MutexUsageTracker::post_lock(self, mutex, status);
    }

    fn pre_unlock(&self, mutex: &ThreadingMutex) {
        MutexUsageTracker::pre_unlock(self, mutex);
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
