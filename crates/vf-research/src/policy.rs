//! Per-fact research decision.
//!
//! For each requested key the session either serves the cached fact, rechecks
//! it against its existing source, or leaves it as a gap for discovery.
//! Discovery is the only path that introduces brand-new facts.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use vf_core::entities::VendorFact;
use vf_core::enums::{FactCategory, ResearchMode, VerificationStatus};

/// Keys researched when a request names none.
pub const STANDARD_KEYS: &[(FactCategory, &str)] = &[
    (FactCategory::Certification, "soc2_type2"),
    (FactCategory::Certification, "iso27001"),
    (FactCategory::Certification, "hitrust"),
    (FactCategory::Certification, "fedramp"),
    (FactCategory::Certification, "pci_dss"),
    (FactCategory::Contract, "hipaa_baa"),
    (FactCategory::DataHandling, "training_policy"),
    (FactCategory::DataHandling, "data_retention"),
    (FactCategory::DataHandling, "data_residency"),
    (FactCategory::SecurityIncident, "breach_history"),
    (FactCategory::SecurityIncident, "security_incidents"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    ServeFromCache,
    Recheck,
    Discover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    /// `full` mode discovers regardless of the cache.
    FullMode,
    /// Verified and not expired.
    Fresh,
    /// Cached but due for revalidation.
    NeedsRecheck,
    /// Due for revalidation but there is no source to recheck.
    NoSourceUrl,
    /// Nothing cached for the key.
    NotCached,
}

/// Decide what to do with one key given its live cached fact.
#[must_use]
pub fn decide(
    fact: Option<&VendorFact>,
    mode: ResearchMode,
    now: DateTime<Utc>,
) -> (Decision, DecisionReason) {
    if mode == ResearchMode::Full {
        return (Decision::Discover, DecisionReason::FullMode);
    }
    let Some(fact) = fact else {
        return (Decision::Discover, DecisionReason::NotCached);
    };
    if fact.verification_status == VerificationStatus::Verified && fact.is_fresh_at(now) {
        return (Decision::ServeFromCache, DecisionReason::Fresh);
    }
    if has_source_url(fact) {
        (Decision::Recheck, DecisionReason::NeedsRecheck)
    } else {
        (Decision::Discover, DecisionReason::NoSourceUrl)
    }
}

/// Whether there is anything to recheck the fact against.
#[must_use]
pub fn has_source_url(fact: &VendorFact) -> bool {
    fact.source_url
        .as_deref()
        .is_some_and(|url| !url.trim().is_empty())
}
