//! Status enums, source types, url types and actions for vendor facts.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! Status enums with state machines provide `allowed_next_states()` to enforce
//! valid transitions at the application layer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// SourceType
// ---------------------------------------------------------------------------

/// Who published the source a fact was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Vendor,
    ThirdParty,
    Both,
}

impl SourceType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vendor => "vendor",
            Self::ThirdParty => "third_party",
            Self::Both => "both",
        }
    }

    /// Combine two observations of the same fact from different sources.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        match (self, other) {
            (Self::Vendor, Self::Vendor) => Self::Vendor,
            (Self::ThirdParty, Self::ThirdParty) => Self::ThirdParty,
            _ => Self::Both,
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// VerificationStatus
// ---------------------------------------------------------------------------

/// Verification state of a cached vendor fact.
///
/// ```text
/// pending → verified → stale    → verified (recheck passed)
///                    → disputed → verified (reviewer confirmed)
///                    → superseded
/// ```
///
/// `superseded` is terminal: a superseded row is history and never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Disputed,
    Stale,
    Superseded,
}

impl VerificationStatus {
    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Pending => &[
                Self::Verified,
                Self::Disputed,
                Self::Stale,
                Self::Superseded,
            ],
            Self::Verified => &[
                Self::Verified,
                Self::Stale,
                Self::Disputed,
                Self::Superseded,
            ],
            Self::Stale => &[Self::Verified, Self::Disputed, Self::Superseded],
            Self::Disputed => &[Self::Verified, Self::Superseded],
            Self::Superseded => &[],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Disputed => "disputed",
            Self::Stale => "stale",
            Self::Superseded => "superseded",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SourceStatus
// ---------------------------------------------------------------------------

/// Outcome of the most recent lightweight recheck of a fact's source URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    Accessible,
    Changed,
    #[serde(rename = "404")]
    NotFound,
    Blocked,
    Timeout,
}

impl SourceStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accessible => "accessible",
            Self::Changed => "changed",
            Self::NotFound => "404",
            Self::Blocked => "blocked",
            Self::Timeout => "timeout",
        }
    }

    /// Whether the source could be read at all.
    #[must_use]
    pub const fn is_reachable(self) -> bool {
        matches!(self, Self::Accessible | Self::Changed)
    }
}

impl fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// VerificationMethod
// ---------------------------------------------------------------------------

/// How a verification-log transition was performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMethod {
    WebSearch,
    DirectFetch,
    SourceRecheck,
    AuditAgent,
    Manual,
}

impl VerificationMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WebSearch => "web_search",
            Self::DirectFetch => "direct_fetch",
            Self::SourceRecheck => "source_recheck",
            Self::AuditAgent => "audit_agent",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for VerificationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// VerificationAction
// ---------------------------------------------------------------------------

/// Kind of transition recorded in the verification log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VerificationAction {
    Created,
    Refreshed,
    Verified,
    Disputed,
    MarkedStale,
    Superseded,
    Rechecked,
}

impl VerificationAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Refreshed => "refreshed",
            Self::Verified => "verified",
            Self::Disputed => "disputed",
            Self::MarkedStale => "marked_stale",
            Self::Superseded => "superseded",
            Self::Rechecked => "rechecked",
        }
    }
}

impl fmt::Display for VerificationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// UrlType
// ---------------------------------------------------------------------------

/// Kind of authoritative vendor URL held in the registry.
///
/// Declaration order is the canonical priority order: when two registered URLs
/// normalize to the same domain, the earlier type wins.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum UrlType {
    TrustCenter,
    SecurityPage,
    PrivacyPage,
    PricingPage,
    Docs,
}

impl UrlType {
    /// Canonical priority order for registry URLs.
    pub const CANONICAL_ORDER: [Self; 5] = [
        Self::TrustCenter,
        Self::SecurityPage,
        Self::PrivacyPage,
        Self::PricingPage,
        Self::Docs,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TrustCenter => "trust_center",
            Self::SecurityPage => "security_page",
            Self::PrivacyPage => "privacy_page",
            Self::PricingPage => "pricing_page",
            Self::Docs => "docs",
        }
    }
}

impl fmt::Display for UrlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CandidateType
// ---------------------------------------------------------------------------

/// Heuristic type assigned to a discovered, not-yet-authoritative URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CandidateType {
    TrustCenter,
    SecurityPage,
    PrivacyPage,
    PricingPage,
    Docs,
    StatusPage,
    Unknown,
}

impl CandidateType {
    /// The registry field this candidate could be promoted into.
    ///
    /// `StatusPage` and `Unknown` have no registry field.
    #[must_use]
    pub const fn registry_type(self) -> Option<UrlType> {
        match self {
            Self::TrustCenter => Some(UrlType::TrustCenter),
            Self::SecurityPage => Some(UrlType::SecurityPage),
            Self::PrivacyPage => Some(UrlType::PrivacyPage),
            Self::PricingPage => Some(UrlType::PricingPage),
            Self::Docs => Some(UrlType::Docs),
            Self::StatusPage | Self::Unknown => None,
        }
    }

    /// Whether candidates of this type may ever reach `promoted`.
    #[must_use]
    pub const fn is_promotable(self) -> bool {
        self.registry_type().is_some()
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TrustCenter => "trust_center",
            Self::SecurityPage => "security_page",
            Self::PrivacyPage => "privacy_page",
            Self::PricingPage => "pricing_page",
            Self::Docs => "docs",
            Self::StatusPage => "status_page",
            Self::Unknown => "unknown",
        }
    }
}

impl From<UrlType> for CandidateType {
    fn from(value: UrlType) -> Self {
        match value {
            UrlType::TrustCenter => Self::TrustCenter,
            UrlType::SecurityPage => Self::SecurityPage,
            UrlType::PrivacyPage => Self::PrivacyPage,
            UrlType::PricingPage => Self::PricingPage,
            UrlType::Docs => Self::Docs,
        }
    }
}

impl fmt::Display for CandidateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CandidateStatus
// ---------------------------------------------------------------------------

/// Review status of a candidate vendor URL.
///
/// ```text
/// pending → confirmed → promoted
///         → rejected
/// confirmed → rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    Pending,
    Confirmed,
    Rejected,
    Promoted,
}

impl CandidateStatus {
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Confirmed, Self::Rejected],
            Self::Confirmed => &[Self::Promoted, Self::Rejected],
            Self::Rejected | Self::Promoted => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Rejected => "rejected",
            Self::Promoted => "promoted",
        }
    }
}

impl fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// FactCategory
// ---------------------------------------------------------------------------

/// Broad grouping of vendor facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FactCategory {
    Certification,
    DataHandling,
    SecurityIncident,
    Contract,
    General,
}

impl FactCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Certification => "certification",
            Self::DataHandling => "data_handling",
            Self::SecurityIncident => "security_incident",
            Self::Contract => "contract",
            Self::General => "general",
        }
    }
}

impl fmt::Display for FactCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ConfidenceLevel
// ---------------------------------------------------------------------------

/// Coarse bucket for an audit confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    /// `high` at 0.8 and above, `medium` at 0.6 and above, otherwise `low`.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            Self::High
        } else if score >= 0.6 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Severity attached to dropped facts and unsupported claims.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Map a `CRITICAL_FIELDS` recheck priority onto a severity.
    #[must_use]
    pub const fn from_priority(priority: i32) -> Self {
        if priority >= 9 {
            Self::High
        } else if priority >= 6 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ResearchMode
// ---------------------------------------------------------------------------

/// Aggressiveness of a research session.
///
/// `Cached` serves and rechecks what is already known and only discovers keys
/// that have no fact at all. `Full` forces discovery regardless of cache state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResearchMode {
    #[default]
    Cached,
    Full,
}

impl ResearchMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cached => "cached",
            Self::Full => "full",
        }
    }
}

impl fmt::Display for ResearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
