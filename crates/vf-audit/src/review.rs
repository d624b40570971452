//! Findings from an external audit reviewer.
//!
//! The reviewer (typically a model prompted with the facts and the report)
//! answers in loosely shaped JSON. [`AuditReview::parse_lenient`] accepts the
//! common shapes and degrades to an empty review with a note when the body
//! cannot be read at all.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use vf_core::entities::UnsupportedClaim;
use vf_core::enums::Severity;

/// A reviewer's pointer to a fact it believes the report dropped.
///
/// `reference` may be the fact key, its value, or a fragment of either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DroppedReference {
    pub reference: String,
    pub reason: Option<String>,
    pub severity: Option<Severity>,
}

impl DroppedReference {
    #[must_use]
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            reason: None,
            severity: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AuditReview {
    #[serde(default)]
    pub dropped: Vec<DroppedReference>,
    #[serde(default)]
    pub unsupported: Vec<UnsupportedClaim>,
    /// Problems met while reading the reviewer's answer.
    #[serde(default)]
    pub notes: Vec<String>,
}

#[derive(Deserialize)]
struct RawReview {
    #[serde(default, alias = "dropped_facts")]
    dropped: Vec<RawReference>,
    #[serde(default, alias = "unsupported_claims")]
    unsupported: Vec<RawClaim>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawReference {
    Text(String),
    Full {
        #[serde(alias = "fact", alias = "key")]
        reference: String,
        reason: Option<String>,
        severity: Option<String>,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawClaim {
    Text(String),
    Full {
        claim: String,
        location: Option<String>,
        severity: Option<String>,
    },
}

impl AuditReview {
    /// Parse a reviewer response.
    ///
    /// Accepts a JSON object optionally wrapped in a fenced code block, with
    /// either `dropped`/`unsupported` or `dropped_facts`/`unsupported_claims`
    /// arrays. Entries may be plain strings or objects.
    #[must_use]
    pub fn parse_lenient(body: &str) -> Self {
        let raw: RawReview = match serde_json::from_str(strip_code_fence(body)) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(%e, "unparseable audit review, continuing without it");
                return Self {
                    notes: vec![format!("unparseable audit review: {e}")],
                    ..Self::default()
                };
            }
        };

        let mut review = Self::default();
        for item in raw.dropped {
            let (reference, reason, severity) = match item {
                RawReference::Text(reference) => (reference, None, None),
                RawReference::Full {
                    reference,
                    reason,
                    severity,
                } => (reference, reason, severity),
            };
            if reference.trim().is_empty() {
                review.notes.push("empty dropped-fact reference skipped".into());
                continue;
            }
            review.dropped.push(DroppedReference {
                reference: reference.trim().to_string(),
                reason: reason.filter(|r| !r.trim().is_empty()),
                severity: severity.as_deref().and_then(parse_severity),
            });
        }

        for item in raw.unsupported {
            let (claim, location, severity) = match item {
                RawClaim::Text(claim) => (claim, None, None),
                RawClaim::Full {
                    claim,
                    location,
                    severity,
                } => (claim, location, severity),
            };
            if claim.trim().is_empty() {
                review.notes.push("empty unsupported claim skipped".into());
                continue;
            }
            review.unsupported.push(UnsupportedClaim {
                claim: claim.trim().to_string(),
                location: location.unwrap_or_else(|| "unspecified".into()),
                severity: severity
                    .as_deref()
                    .and_then(parse_severity)
                    .unwrap_or(Severity::Medium),
            });
        }
        review
    }
}

fn parse_severity(raw: &str) -> Option<Severity> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "low" => Some(Severity::Low),
        "medium" | "moderate" => Some(Severity::Medium),
        "high" | "critical" => Some(Severity::High),
        _ => None,
    }
}

fn strip_code_fence(body: &str) -> &str {
    let trimmed = body.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
