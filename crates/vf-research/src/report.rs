//! What a research session did, key by key.

use serde::Serialize;

use vf_classify::UrlSource;
use vf_core::entities::{AuditResult, FactKey, VendorFact, VendorUrl};
use vf_core::enums::{ResearchMode, SourceStatus, VerificationAction, VerificationStatus};
use vf_db::repos::facts::RecheckResult;

use crate::collaborators::ResearchKey;
use crate::policy::{Decision, DecisionReason};

/// The decision taken for one requested key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedKey {
    pub key: ResearchKey,
    pub decision: Decision,
    pub reason: DecisionReason,
    /// The live fact the decision was made on, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fact_id: Option<String>,
}

/// One applied source recheck.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecheckSummary {
    pub fact_id: String,
    pub key: FactKey,
    pub source_status: SourceStatus,
    pub action: VerificationAction,
    pub verification_status: VerificationStatus,
    /// Pending fact created from a changed value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacement_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl RecheckSummary {
    #[must_use]
    pub fn new(source_status: SourceStatus, notes: Option<String>, result: &RecheckResult) -> Self {
        Self {
            fact_id: result.fact.id.clone(),
            key: result.fact.key(),
            source_status,
            action: result.action,
            verification_status: result.fact.verification_status,
            replacement_id: result.replacement.as_ref().map(|f| f.id.clone()),
            notes,
        }
    }
}

/// Result of [`Researcher::run`](crate::Researcher::run).
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub research_log_id: String,
    pub vendor_name: String,
    pub product_name: String,
    pub mode: ResearchMode,
    pub plan: Vec<PlannedKey>,
    /// Verified, fresh facts returned without any network work.
    pub served: Vec<VendorFact>,
    pub rechecked: Vec<RecheckSummary>,
    /// Facts written from discovery, as stored.
    pub discovered: Vec<VendorFact>,
    /// Gaps discovery ran for but did not fill.
    pub unfilled: Vec<ResearchKey>,
    /// Keys never worked on because the session was cancelled.
    pub skipped: Vec<ResearchKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_source: Option<UrlSource>,
    pub effective_urls: Vec<VendorUrl>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit: Option<AuditResult>,
    pub cancelled: bool,
    pub notes: Vec<String>,
}

impl SessionReport {
    pub(crate) fn new(
        research_log_id: String,
        vendor_name: &str,
        product_name: &str,
        mode: ResearchMode,
    ) -> Self {
        Self {
            research_log_id,
            vendor_name: vendor_name.to_string(),
            product_name: product_name.to_string(),
            mode,
            plan: Vec::new(),
            served: Vec::new(),
            rechecked: Vec::new(),
            discovered: Vec::new(),
            unfilled: Vec::new(),
            skipped: Vec::new(),
            url_source: None,
            effective_urls: Vec::new(),
            audit: None,
            cancelled: false,
            notes: Vec::new(),
        }
    }
}

/// Result of [`Researcher::recheck_due`](crate::Researcher::recheck_due).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecheckRun {
    pub rechecked: Vec<RecheckSummary>,
    /// Due facts with nothing to recheck against.
    pub without_source: Vec<String>,
    /// Due facts left alone after cancellation.
    pub not_started: Vec<String>,
    pub notes: Vec<String>,
}
