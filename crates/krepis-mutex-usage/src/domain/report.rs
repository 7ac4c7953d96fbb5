//! Test Result Reporting
//!
//! The tracker records usage errors here instead of failing the test on the
//! spot. A test that later fails for a functional reason keeps its own
//! failure message and location; only a test that would otherwise pass is
//! turned into a failure by `check()`.

use super::error::UsageError;
use super::guard::InternalMutex;
use std::fmt;

/// Outcome of the current test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestResult {
    /// No failure recorded
    Success,
    /// At least one assertion (or a usage error) failed
    Failed,
    /// The case decided not to run
    Skipped,
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "PASSED"),
            Self::Failed => write!(f, "FAILED"),
            Self::Skipped => write!(f, "SKIPPED"),
        }
    }
}

/// Where and why a test case failed (or was skipped)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestFailure {
    /// Failed assertion text
    pub message: String,
    /// Source line
    pub line: u32,
    /// Source file
    pub file: String,
}

impl fmt::Display for TestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at line {}, {}", self.message, self.line, self.file)
    }
}

/// Destination for test outcomes and deferred usage errors
pub trait TestResultSink: Send + Sync {
    /// Remember a usage error for the current case; the first one wins
    fn record_usage_error(&self, error: UsageError);

    /// Forget the pending usage error
    fn clear_usage_error(&self);

    /// Pending usage error, if any
    fn usage_error(&self) -> Option<UsageError>;

    /// Mark the case failed. A case that already failed keeps its first
    /// failure location.
    fn fail(&self, message: &str, line: u32, file: &str);

    /// Current outcome
    fn result(&self) -> TestResult;

    /// Prepare for the next test case: result = Success, nothing recorded
    fn reset(&self);
}

#[derive(Debug)]
struct InfoState {
    result: TestResult,
    failure: Option<TestFailure>,
    step: Option<u64>,
    usage_error: Option<UsageError>,
}

impl InfoState {
    const fn fresh() -> Self {
        Self {
            result: TestResult::Success,
            failure: None,
            step: None,
            usage_error: None,
        }
    }
}

/// Per-case test information
///
/// Protected by its own [`InternalMutex`], i.e. the test-result reporting
/// lock that is excluded from usage tracking.
///
/// # Example
///
/// ```rust
/// use krepis_mutex_usage::{TestInfo, TestResult, TestResultSink, UsageError};
///
/// let info = TestInfo::new();
/// info.record_usage_error(UsageError::DoubleLock);
/// info.record_usage_error(UsageError::DoubleFree);
/// assert_eq!(info.usage_error(), Some(UsageError::DoubleLock));
///
/// info.fail("x == 1", 42, "suite.rs");
/// assert_eq!(info.result(), TestResult::Failed);
/// ```
#[derive(Debug)]
pub struct TestInfo {
    state: InternalMutex<InfoState>,
}

impl TestInfo {
    /// Fresh info: result = Success, nothing recorded
    pub fn new() -> Self {
        Self {
            state: InternalMutex::new(InfoState::fresh()),
        }
    }

    /// Mark the case skipped
    pub fn skip(&self, message: &str, line: u32, file: &str) {
        let mut state = self.state.lock();
        state.result = TestResult::Skipped;
        state.failure = Some(TestFailure {
            message: message.to_owned(),
            line,
            file: file.to_owned(),
        });
    }

    /// Record progress through a multi-step case
    pub fn set_step(&self, step: u64) {
        self.state.lock().step = Some(step);
    }

    /// Last recorded step
    pub fn step(&self) -> Option<u64> {
        self.state.lock().step
    }

    /// First failure (or skip reason) of the current case
    pub fn failure(&self) -> Option<TestFailure> {
        self.state.lock().failure.clone()
    }
}

impl Default for TestInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl TestResultSink for TestInfo {
    fn record_usage_error(&self, error: UsageError) {
        let mut state = self.state.lock();
        if state.usage_error.is_none() {
            state.usage_error = Some(error);
        }
    }

    fn clear_usage_error(&self) {
        self.state.lock().usage_error = None;
    }

    fn usage_error(&self) -> Option<UsageError> {
        self.state.lock().usage_error
    }

    fn fail(&self, message: &str, line: u32, file: &str) {
        let mut state = self.state.lock();
        if state.result == TestResult::Failed {
            return;
        }
        state.result = TestResult::Failed;
        state.failure = Some(TestFailure {
            message: message.to_owned(),
            line,
            file: file.to_owned(),
        });
    }

    fn result(&self) -> TestResult {
        self.state.lock().result
    }

    fn reset(&self) {
        *self.state.lock() = InfoState::fresh();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_failure_wins() {
        let info = TestInfo::new();
        info.fail("first", 10, "a.rs");
        info.fail("second", 20, "b.rs");

        let failure = info.failure().unwrap();
        assert_eq!(failure.message, "first");
        assert_eq!(failure.line, 10);
        assert_eq!(failure.to_string(), "first at line 10, a.rs");
    }

    #[test]
    fn test_fail_overrides_skip() {
        let info = TestInfo::new();
        info.skip("no backend", 1, "a.rs");
        assert_eq!(info.result(), TestResult::Skipped);

        info.fail("boom", 2, "a.rs");
        assert_eq!(info.result(), TestResult::Failed);
        assert_eq!(info.failure().unwrap().message, "boom");
    }

    #[test]
    fn test_usage_error_first_wins_until_cleared() {
        let info = TestInfo::new();
        info.record_usage_error(UsageError::UnlockWithoutLock);
        info.record_usage_error(UsageError::DoubleFree);
        assert_eq!(info.usage_error(), Some(UsageError::UnlockWithoutLock));

        info.clear_usage_error();
        info.record_usage_error(UsageError::DoubleFree);
        assert_eq!(info.usage_error(), Some(UsageError::DoubleFree));
    }

    #[test]
    fn test_reset() {
        let info = TestInfo::new();
        info.set_step(3);
        info.fail("x", 1, "f.rs");
        info.record_usage_error(UsageError::DoubleLock);

        info.reset();
        assert_eq!(info.result(), TestResult::Success);
        assert_eq!(info.step(), None);
        assert!(info.failure().is_none());
        assert!(info.usage_error().is_none());
    }
}
