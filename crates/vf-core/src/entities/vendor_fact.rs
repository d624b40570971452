use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::enums::{FactCategory, SourceStatus, SourceType, VerificationStatus};
use crate::payloads::FactDetails;

/// Unique identity of a vendor fact.
///
/// At most one live (not superseded) row exists per key. Re-extracting the same
/// key supersedes rather than duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct FactKey {
    pub vendor_name: String,
    pub product_name: String,
    pub fact_category: FactCategory,
    pub fact_key: String,
}

impl FactKey {
    #[must_use]
    pub fn new(
        vendor_name: impl Into<String>,
        product_name: impl Into<String>,
        fact_category: FactCategory,
        fact_key: impl Into<String>,
    ) -> Self {
        Self {
            vendor_name: vendor_name.into().trim().to_string(),
            product_name: product_name.into().trim().to_string(),
            fact_category,
            fact_key: fact_key.into().trim().to_string(),
        }
    }
}

impl fmt::Display for FactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.vendor_name, self.product_name, self.fact_category, self.fact_key
        )
    }
}

/// One cached compliance/security datum about a vendor, with source
/// attribution, verification state and recheck bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct VendorFact {
    pub id: String,
    pub vendor_name: String,
    pub product_name: String,
    pub fact_category: FactCategory,
    pub fact_key: String,
    pub value: String,
    pub details: Option<FactDetails>,
    pub context: Option<String>,

    pub source_url: Option<String>,
    pub source_title: Option<String>,
    pub source_snippet: Option<String>,
    pub source_type: SourceType,

    pub verification_status: VerificationStatus,
    pub confidence_score: f64,
    pub ttl_days: u32,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<String>,
    pub research_log_id: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,

    pub source_last_checked_at: Option<DateTime<Utc>>,
    pub source_last_status: Option<SourceStatus>,
    pub recheck_count: u32,
    pub next_recheck_at: Option<DateTime<Utc>>,
    pub recheck_priority: i32,

    pub first_found_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
    pub superseded_by: Option<String>,

    /// Optimistic concurrency token, bumped on every write.
    pub version: i64,
}

impl VendorFact {
    #[must_use]
    pub fn key(&self) -> FactKey {
        FactKey {
            vendor_name: self.vendor_name.clone(),
            product_name: self.product_name.clone(),
            fact_category: self.fact_category,
            fact_key: self.fact_key.clone(),
        }
    }

    /// A row is live until another fact replaces it.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.superseded_by.is_none()
            && !matches!(self.verification_status, VerificationStatus::Superseded)
    }
}

/// Input for creating a fact from an extraction.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewFact {
    pub key: FactKey,
    pub value: String,
    pub details: Option<FactDetails>,
    pub context: Option<String>,
    pub source_url: Option<String>,
    pub source_title: Option<String>,
    pub source_snippet: Option<String>,
    pub source_type: SourceType,
    /// Extraction confidence reported by the discovery collaborator.
    pub confidence: f64,
}
