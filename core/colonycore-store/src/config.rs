use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Store tuning, usually read from the `[store]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Deadline for rule evaluation in one transaction attempt (ms); `0` disables it.
    #[serde(default = "default_evaluation_timeout_ms")]
    pub evaluation_timeout_ms: u64,

    /// Install `housing_capacity`, `protocol_subject_cap` and `lifecycle_transition`.
    #[serde(default = "default_builtin_rules")]
    pub builtin_rules: bool,
}

fn default_evaluation_timeout_ms() -> u64 {
    5_000
}

fn default_builtin_rules() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            evaluation_timeout_ms: default_evaluation_timeout_ms(),
            builtin_rules: default_builtin_rules(),
        }
    }
}

impl StoreConfig {
    pub fn evaluation_timeout(&self) -> Option<Duration> {
        (self.evaluation_timeout_ms > 0).then(|| Duration::from_millis(self.evaluation_timeout_ms))
    }
}
