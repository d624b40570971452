use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{ConfidenceLevel, Severity};
use crate::payloads::ExtractedFact;

/// A fact that was extracted but did not make it into the report.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct DroppedFact {
    pub fact: ExtractedFact,
    pub reason: String,
    pub severity: Severity,
}

/// A report statement that cannot be traced to any extracted fact.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct UnsupportedClaim {
    pub claim: String,
    pub location: String,
    pub severity: Severity,
}

/// Outcome of cross-checking a synthesized report against its facts.
///
/// Not stored as its own table; the summary flows into the research log.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct AuditResult {
    pub total_facts: u32,
    pub facts_in_report: u32,
    pub dropped_facts: Vec<DroppedFact>,
    pub unsupported_claims: Vec<UnsupportedClaim>,
    pub inclusion_rate: f64,
    pub drop_penalty: f64,
    pub hallucination_penalty: f64,
    pub confidence_score: f64,
    pub confidence_level: ConfidenceLevel,
    #[serde(default)]
    pub notes: Vec<String>,
}
