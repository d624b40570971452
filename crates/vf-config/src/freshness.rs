//! Freshness defaults for facts and failed rechecks.

use serde::{Deserialize, Serialize};

const fn default_ttl_days() -> u32 {
    30
}

const fn default_failure_recheck_days() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FreshnessConfig {
    /// TTL for keys outside the critical-field table.
    #[serde(default = "default_ttl_days")]
    pub default_ttl_days: u32,

    /// Days until a fact whose source could not be read is tried again.
    #[serde(default = "default_failure_recheck_days")]
    pub failure_recheck_days: u32,
}

impl Default for FreshnessConfig {
    fn default() -> Self {
        Self {
            default_ttl_days: default_ttl_days(),
            failure_recheck_days: default_failure_recheck_days(),
        }
    }
}
