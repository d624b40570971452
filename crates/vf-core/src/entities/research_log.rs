use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::AuditResult;
use crate::enums::{ConfidenceLevel, ResearchMode};

/// One research session for a vendor/product, with its audit summary.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ResearchLog {
    pub id: String,
    pub vendor_name: String,
    pub product_name: String,
    pub mode: ResearchMode,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub total_facts: u32,
    pub facts_in_report: u32,
    pub dropped_count: u32,
    pub unsupported_count: u32,
    pub confidence_score: Option<f64>,
    pub confidence_level: Option<ConfidenceLevel>,
    pub audit: Option<AuditResult>,
    pub cancelled: bool,
}
