//! TTL and recheck priority per fact key.
//!
//! Fields with legal or regulatory exposure go stale fastest and are rechecked
//! first. Keys not listed fall back to [`DEFAULT_POLICY`].

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Freshness policy applied to a fact key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FieldPolicy {
    pub ttl_days: u32,
    pub recheck_priority: i32,
}

impl FieldPolicy {
    #[must_use]
    pub const fn new(ttl_days: u32, recheck_priority: i32) -> Self {
        Self {
            ttl_days,
            recheck_priority,
        }
    }
}

/// Policy for keys that are not critical.
pub const DEFAULT_POLICY: FieldPolicy = FieldPolicy::new(30, 0);

/// How a table entry matches a fact key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPattern {
    Exact(&'static str),
    Prefix(&'static str),
}

impl KeyPattern {
    #[must_use]
    pub fn matches(self, key: &str) -> bool {
        match self {
            Self::Exact(expected) => key == expected,
            Self::Prefix(prefix) => key.starts_with(prefix),
        }
    }
}

pub const CRITICAL_FIELDS: &[(KeyPattern, FieldPolicy)] = &[
    (KeyPattern::Exact("hipaa_baa"), FieldPolicy::new(14, 10)),
    (KeyPattern::Prefix("soc2"), FieldPolicy::new(30, 8)),
    (KeyPattern::Exact("iso27001"), FieldPolicy::new(30, 8)),
    (KeyPattern::Exact("hitrust"), FieldPolicy::new(30, 8)),
    (KeyPattern::Exact("fedramp"), FieldPolicy::new(30, 8)),
    (KeyPattern::Exact("pci_dss"), FieldPolicy::new(30, 8)),
    (KeyPattern::Exact("training_policy"), FieldPolicy::new(14, 9)),
    (KeyPattern::Exact("data_retention"), FieldPolicy::new(30, 7)),
    (KeyPattern::Exact("data_residency"), FieldPolicy::new(30, 6)),
    (KeyPattern::Exact("breach_history"), FieldPolicy::new(7, 10)),
    (KeyPattern::Exact("security_incidents"), FieldPolicy::new(7, 10)),
];

/// Look up the policy for a fact key. Matching is case-insensitive.
#[must_use]
pub fn policy_for(fact_key: &str) -> FieldPolicy {
    let key = fact_key.trim().to_ascii_lowercase();
    CRITICAL_FIELDS
        .iter()
        .find(|(pattern, _)| pattern.matches(&key))
        .map_or(DEFAULT_POLICY, |(_, policy)| *policy)
}

/// Whether a key is listed in `CRITICAL_FIELDS`.
#[must_use]
pub fn is_critical(fact_key: &str) -> bool {
    policy_for(fact_key) != DEFAULT_POLICY
}
