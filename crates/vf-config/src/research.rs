//! Research session tuning.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use vf_core::enums::ResearchMode;

const fn default_max_concurrent_rechecks() -> usize {
    4
}

const fn default_recheck_timeout_secs() -> u64 {
    15
}

const fn default_discovery_timeout_secs() -> u64 {
    120
}

const fn default_write_retries() -> u32 {
    4
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResearchConfig {
    /// Upper bound on source rechecks in flight at once.
    #[serde(default = "default_max_concurrent_rechecks")]
    pub max_concurrent_rechecks: usize,

    /// Timeout for a single source recheck, in seconds.
    #[serde(default = "default_recheck_timeout_secs")]
    pub recheck_timeout_secs: u64,

    /// Timeout for one discovery call, in seconds.
    #[serde(default = "default_discovery_timeout_secs")]
    pub discovery_timeout_secs: u64,

    /// Attempts for a write that lost an optimistic-concurrency race.
    #[serde(default = "default_write_retries")]
    pub write_retries: u32,

    /// Mode used when a caller does not pick one.
    #[serde(default)]
    pub default_mode: ResearchMode,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_rechecks: default_max_concurrent_rechecks(),
            recheck_timeout_secs: default_recheck_timeout_secs(),
            discovery_timeout_secs: default_discovery_timeout_secs(),
            write_retries: default_write_retries(),
            default_mode: ResearchMode::default(),
        }
    }
}

impl ResearchConfig {
    pub const fn recheck_timeout(&self) -> Duration {
        Duration::from_secs(self.recheck_timeout_secs)
    }

    pub const fn discovery_timeout(&self) -> Duration {
        Duration::from_secs(self.discovery_timeout_secs)
    }
}
