use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{VerificationAction, VerificationMethod, VerificationStatus};

/// An append-only record of one transition on a `VendorFact`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct FactVerificationLogEntry {
    pub id: String,
    pub fact_id: String,
    pub action: VerificationAction,
    pub previous_value: Option<String>,
    pub new_value: Option<String>,
    pub previous_status: Option<VerificationStatus>,
    pub new_status: VerificationStatus,
    pub method: VerificationMethod,
    pub http_status: Option<u16>,
    pub performed_by: Option<String>,
    pub confidence_delta: Option<f64>,
    pub notes: Option<String>,
    pub research_log_id: Option<String>,
    pub created_at: DateTime<Utc>,
}
