//! MutexUsage - Harness-Facing Framework Lifecycle
//!
//! # Control Flow
//!
//! ```text
//! suite start   usage.init(&ctx)          install tracker (substitute or hooks)
//!               ...create suite mutexes...
//!               usage.set_baseline()
//! per case      usage.run_case(|| ...)    reset sink, run body, check()
//! suite end     usage.end(&ctx)           restore what init() replaced
//! ```

use super::context::ThreadingContext;
use super::instrumented::Instrumented;
use crate::domain::tracker::LOG_TARGET;
use crate::domain::{
    FrameworkError, InterceptStrategy, MutexHooks, MutexOps, MutexUsageConfig,
    MutexUsageTracker, TestInfo, TestResult, TestResultSink, UsageError,
};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::info;

/// What `init` replaced, so that `end` can put it back
enum Installed {
    Substitute { original: Arc<dyn MutexOps> },
    Hooks { previous: Option<Arc<dyn MutexHooks>> },
}

/// Mutex usage verification framework
///
/// # Example
///
/// ```rust
/// use krepis_mutex_usage::{
///     MutexUsage, MutexUsageConfig, TestResult, ThreadingContext, ThreadingMutex,
/// };
///
/// let ctx = ThreadingContext::native();
/// let config = MutexUsageConfig::new().echo_to_stdout(false);
/// let (mut usage, _info) = MutexUsage::with_test_info(config);
/// usage.init(&ctx).unwrap();
/// usage.set_baseline();
///
/// let result = usage.run_case(|| {
///     let m = ThreadingMutex::new();
///     ctx.mutex_init(&m);
///     ctx.mutex_lock(&m).unwrap();
///     ctx.mutex_free(&m); // still locked
/// });
/// assert_eq!(result, TestResult::Failed);
///
/// usage.end(&ctx).unwrap();
/// ```
pub struct MutexUsage {
    tracker: Arc<MutexUsageTracker>,
    installed: Option<Installed>,
}

impl MutexUsage {
    /// Framework reporting into `sink`; not yet installed
    pub fn new(sink: Arc<dyn TestResultSink>, config: MutexUsageConfig) -> Self {
        Self {
            tracker: Arc::new(MutexUsageTracker::new(sink, config)),
            installed: None,
        }
    }

    /// Framework with its own [`TestInfo`] sink
    pub fn with_test_info(config: MutexUsageConfig) -> (Self, Arc<TestInfo>) {
        let info = Arc::new(TestInfo::new());
        (Self::new(info.clone(), config), info)
    }

    /// Enable instrumentation on `ctx`
    ///
    /// # Errors
    /// `AlreadyActive` if called twice without `end`
    pub fn init(&mut self, ctx: &ThreadingContext) -> Result<(), FrameworkError> {
        if self.installed.is_some() {
            return Err(FrameworkError::AlreadyActive);
        }

        let strategy = self.tracker.config().strategy;
        let installed = match strategy {
            InterceptStrategy::Substitute => {
                let original = ctx.ops();
                let wrapped = Instrumented::new(original.clone(), self.tracker.clone());
                ctx.substitute(Arc::new(wrapped));
                Installed::Substitute { original }
            }
            InterceptStrategy::Hooks => {
                let hooks: Arc<dyn MutexHooks> = self.tracker.clone();
                Installed::Hooks {
                    previous: ctx.set_hooks(Some(hooks)),
                }
            }
        };
        self.installed = Some(installed);

        info!(target: LOG_TARGET, ?strategy, "🔒 mutex usage verification enabled");
        Ok(())
    }

    /// Disable instrumentation and restore exactly what `init` replaced
    ///
    /// # Errors
    /// `NotActive` if there is no matching `init`
    pub fn end(&mut self, ctx: &ThreadingContext) -> Result<(), FrameworkError> {
        match self.installed.take().ok_or(FrameworkError::NotActive)? {
            Installed::Substitute { original } => {
                ctx.substitute(original);
            }
            Installed::Hooks { previous } => {
                ctx.set_hooks(previous);
            }
        }

        info!(target: LOG_TARGET, "🔓 mutex usage verification disabled");
        Ok(())
    }

    /// Whether `init` is in effect
    pub fn is_active(&self) -> bool {
        self.installed.is_some()
    }

    /// Test-case boundary check, see [`MutexUsageTracker::check`]
    pub fn check(&self) -> Option<UsageError> {
        self.tracker.check()
    }

    /// Snapshot suite-lifetime mutexes, see [`MutexUsageTracker::set_baseline`]
    pub fn set_baseline(&self) {
        self.tracker.set_baseline();
    }

    /// Run one test case
    ///
    /// Resets the sink, runs `body`, then calls [`check`](Self::check). A
    /// panicking body counts as a functional failure, so its message is
    /// kept ahead of any usage error.
    pub fn run_case<F: FnOnce()>(&self, body: F) -> TestResult {
        let sink = self.tracker.sink();
        sink.reset();

        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(body)) {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_owned())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "test case panicked".to_owned());
            sink.fail(&message, line!(), file!());
        }

        self.check();
        sink.result()
    }

    /// Underlying tracker
    pub fn tracker(&self) -> &Arc<MutexUsageTracker> {
        &self.tracker
    }

    /// Current `live_mutexes`
    pub fn live_mutexes(&self) -> i64 {
        self.tracker.live_mutexes()
    }

    /// Current baseline
    pub fn permanent_mutex_count(&self) -> i64 {
        self.tracker.permanent_mutex_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ScriptedMutexOps;

    fn quiet() -> MutexUsageConfig {
        MutexUsageConfig::new().echo_to_stdout(false)
    }

    #[test]
    fn test_init_twice_rejected() {
        let ctx = ThreadingContext::native();
        let (mut usage, _info) = MutexUsage::with_test_info(quiet());
        usage.init(&ctx).unwrap();
        assert_eq!(usage.init(&ctx), Err(FrameworkError::AlreadyActive));
        usage.end(&ctx).unwrap();
        assert_eq!(usage.end(&ctx), Err(FrameworkError::NotActive));
    }

    #[test]
    fn test_end_restores_original_ops() {
        let original: Arc<dyn MutexOps> = Arc::new(ScriptedMutexOps::new());
        let ctx = ThreadingContext::new(original.clone());
        let (mut usage, _info) = MutexUsage::with_test_info(quiet());

        usage.init(&ctx).unwrap();
        assert!(!Arc::ptr_eq(&ctx.ops(), &original));
        usage.end(&ctx).unwrap();
        assert!(Arc::ptr_eq(&ctx.ops(), &original));
        assert!(ctx.hooks().is_none());
    }

    #[test]
    fn test_end_restores_null_hooks() {
        let ctx = ThreadingContext::native();
        let (mut usage, _info) =
            MutexUsage::with_test_info(quiet().strategy(InterceptStrategy::Hooks));

        let before = ctx.ops();
        usage.init(&ctx).unwrap();
        assert!(ctx.hooks().is_some());
        assert!(Arc::ptr_eq(&ctx.ops(), &before));

        usage.end(&ctx).unwrap();
        assert!(ctx.hooks().is_none());
    }

    #[test]
    fn test_panicking_case_keeps_its_message() {
        let ctx = ThreadingContext::new(Arc::new(ScriptedMutexOps::new()));
        let (mut usage, info) = MutexUsage::with_test_info(quiet());
        usage.init(&ctx).unwrap();

        let result = usage.run_case(|| {
            let m = crate::domain::ThreadingMutex::new();
            ctx.mutex_init(&m);
            panic!("assertion failed: key imported");
        });

        assert_eq!(result, TestResult::Failed);
        assert_eq!(info.failure().unwrap().message, "assertion failed: key imported");
        // Leak still balanced away for the next case
        assert_eq!(usage.live_mutexes(), 0);
        usage.end(&ctx).unwrap();
    }
}
