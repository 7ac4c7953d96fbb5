//! Framework Configuration

use serde::{Deserialize, Serialize};

/// What to do when the tracker's guard lock is busy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardPolicy {
    /// Wait for the guard. Hold times are O(1) table updates, so this only
    /// serialises tracking briefly.
    #[default]
    Block,
    /// Skip validation of this operation if the guard is held elsewhere.
    /// The real primitive still runs; detections may be missed.
    SkipWhenBusy,
}

/// How the tracker is wired into the mutex primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterceptStrategy {
    /// Replace the context's primitive capability with an instrumented
    /// decorator around the saved original
    #[default]
    Substitute,
    /// Keep the primitives and register pre/post hooks they call
    Hooks,
}

/// Mutex usage verification settings
///
/// # Example
///
/// ```rust
/// use krepis_mutex_usage::{GuardPolicy, InterceptStrategy, MutexUsageConfig};
///
/// let config = MutexUsageConfig::new()
///     .guard_policy(GuardPolicy::SkipWhenBusy)
///     .strategy(InterceptStrategy::Hooks)
///     .echo_to_stdout(false);
///
/// assert_eq!(config.guard_policy, GuardPolicy::SkipWhenBusy);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutexUsageConfig {
    /// Guard lock contention behaviour
    pub guard_policy: GuardPolicy,
    /// Interception strategy used by `init`
    pub strategy: InterceptStrategy,
    /// Also print `[mutex: ...]` tags to stdout
    pub echo_to_stdout: bool,
}

impl MutexUsageConfig {
    /// Defaults: blocking guard, capability substitution, stdout echo on
    pub fn new() -> Self {
        Self {
            guard_policy: GuardPolicy::Block,
            strategy: InterceptStrategy::Substitute,
            echo_to_stdout: true,
        }
    }

    /// Set the guard contention policy
    pub fn guard_policy(mut self, policy: GuardPolicy) -> Self {
        self.guard_policy = policy;
        self
    }

    /// Set the interception strategy
    pub fn strategy(mut self, strategy: InterceptStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Enable or disable the stdout echo
    pub fn echo_to_stdout(mut self, echo: bool) -> Self {
        self.echo_to_stdout = echo;
        self
    }
}

impl Default for MutexUsageConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MutexUsageConfig::default();
        assert_eq!(config.guard_policy, GuardPolicy::Block);
        assert_eq!(config.strategy, InterceptStrategy::Substitute);
        assert!(config.echo_to_stdout);
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let config: MutexUsageConfig =
            serde_json::from_str(r#"{ "guard_policy": "skip_when_busy" }"#)
                .expect("should deserialize");
        assert_eq!(config.guard_policy, GuardPolicy::SkipWhenBusy);
        assert_eq!(config.strategy, InterceptStrategy::Substitute);
        assert!(config.echo_to_stdout);
    }

    #[test]
    fn test_serialize_round_trip() {
        let config = MutexUsageConfig::new()
            .strategy(InterceptStrategy::Hooks)
            .echo_to_stdout(false);
        let json = serde_json::to_string(&config).expect("should serialize");
        assert!(json.contains("\"hooks\""));
        let back: MutexUsageConfig = serde_json::from_str(&json).expect("should deserialize");
        assert_eq!(back, config);
    }
}
