use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{CandidateStatus, CandidateType};

/// A discovered URL that might be vendor-authoritative but is not in the registry.
///
/// Promotion into a `VendorRegistryEntry` is the only way a candidate affects
/// future classification.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct CandidateVendorUrl {
    pub id: String,
    pub vendor_name: String,
    pub url: String,
    pub normalized_domain: String,
    pub candidate_type: CandidateType,
    pub confidence: f64,
    pub status: CandidateStatus,
    pub reviewed_by: Option<String>,
    pub notes: Option<String>,
    pub discovered_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
