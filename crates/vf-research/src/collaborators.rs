//! Interfaces to the external collaborators that do network and model work.
//!
//! The engine itself never fetches a page or calls a model. A
//! [`SourceChecker`] revalidates one cached fact against its source URL, and a
//! [`DiscoveryAgent`] searches, extracts and writes the narrative report.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use vf_core::entities::{VendorFact, VendorUrl};
use vf_core::enums::FactCategory;
use vf_core::payloads::{ExtractedFact, ExtractionBatch};
use vf_db::updates::recheck::RecheckOutcome;

use crate::error::ResearchError;

/// Lightweight revalidation of a cached fact against its `source_url`.
///
/// Implementations map every failure onto a [`RecheckOutcome`] status
/// (`blocked`, `404`, `timeout`); the session enforces its own timeout on top.
#[async_trait]
pub trait SourceChecker: Send + Sync {
    async fn check(&self, fact: &VendorFact) -> RecheckOutcome;
}

/// One category/key pair of a vendor product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct ResearchKey {
    pub category: FactCategory,
    pub key: String,
}

impl ResearchKey {
    #[must_use]
    pub fn new(category: FactCategory, key: impl Into<String>) -> Self {
        Self {
            category,
            key: key.into().trim().to_string(),
        }
    }
}

/// What discovery is asked to find.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DiscoveryRequest {
    pub vendor_name: String,
    pub product_name: String,
    pub gaps: Vec<ResearchKey>,
    /// Registry URLs already known for the vendor. Empty for novel vendors.
    pub known_urls: Vec<VendorUrl>,
}

/// What discovery found.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DiscoveryResponse {
    pub facts: Vec<ExtractedFact>,
    /// Every URL visited, including ones no fact was taken from.
    #[serde(default)]
    pub discovered_urls: Vec<String>,
    /// Narrative report synthesized from `facts`, if one was written.
    pub report: Option<String>,
    #[serde(default)]
    pub notes: Vec<String>,
}

impl DiscoveryResponse {
    /// Build a response from a leniently parsed extraction body.
    ///
    /// Notes about skipped entries are carried over.
    #[must_use]
    pub fn from_extraction(
        batch: ExtractionBatch,
        discovered_urls: Vec<String>,
        report: Option<String>,
    ) -> Self {
        Self {
            facts: batch.facts,
            discovered_urls,
            report,
            notes: batch.notes,
        }
    }
}

/// Network and model extraction for keys the cache cannot answer.
#[async_trait]
pub trait DiscoveryAgent: Send + Sync {
    async fn discover(&self, request: &DiscoveryRequest) -> Result<DiscoveryResponse, ResearchError>;
}
