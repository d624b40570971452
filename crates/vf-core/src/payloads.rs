//! Typed fact payloads and the discovery-collaborator boundary.
//!
//! Extraction collaborators hand back loosely shaped JSON. It is validated here
//! into `ExtractedFact` values once, so nothing downstream has to guess at the
//! shape. Invalid entries are skipped with a note instead of failing the batch.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::FactCategory;

/// Structured detail for a certification such as SOC 2 or ISO 27001.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CertificationDetails {
    pub standard: String,
    pub status: Option<String>,
    pub scope: Option<String>,
    pub audit_date: Option<String>,
    pub report_available: Option<bool>,
}

/// Structured detail for data handling policies.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DataHandlingDetails {
    pub trains_on_customer_data: Option<bool>,
    pub retention_days: Option<u32>,
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default)]
    pub subprocessors: Vec<String>,
}

/// Structured detail for a disclosed breach or security incident.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct IncidentDetails {
    pub summary: String,
    pub occurred_on: Option<String>,
    pub severity: Option<String>,
    pub disclosed: Option<bool>,
}

/// Structured detail for contractual availability (BAA, DPA, SLA).
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ContractDetails {
    pub available: Option<bool>,
    pub tier: Option<String>,
    pub conditions: Option<String>,
}

/// Per-category structured payload attached to a fact.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FactDetails {
    Certification(CertificationDetails),
    DataHandling(DataHandlingDetails),
    SecurityIncident(IncidentDetails),
    Contract(ContractDetails),
}

impl FactDetails {
    #[must_use]
    pub const fn category(&self) -> FactCategory {
        match self {
            Self::Certification(_) => FactCategory::Certification,
            Self::DataHandling(_) => FactCategory::DataHandling,
            Self::SecurityIncident(_) => FactCategory::SecurityIncident,
            Self::Contract(_) => FactCategory::Contract,
        }
    }
}

/// A fact as reported by the discovery collaborator, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RawExtractedFact {
    pub category: Option<String>,
    pub key: Option<String>,
    pub value: Option<serde_json::Value>,
    pub source_url: Option<String>,
    pub source_title: Option<String>,
    pub source_snippet: Option<String>,
    pub confidence: Option<f64>,
    pub details: Option<serde_json::Value>,
}

/// A validated extracted fact.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ExtractedFact {
    pub category: FactCategory,
    pub key: String,
    pub value: String,
    pub source_url: Option<String>,
    pub source_title: Option<String>,
    pub source_snippet: Option<String>,
    pub confidence: f64,
    pub details: Option<FactDetails>,
}

impl ExtractedFact {
    #[must_use]
    pub fn new(category: FactCategory, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            category,
            key: key.into(),
            value: value.into(),
            source_url: None,
            source_title: None,
            source_snippet: None,
            confidence: 0.5,
            details: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }
}

/// Validated facts plus notes about everything that was skipped.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ExtractionBatch {
    pub facts: Vec<ExtractedFact>,
    pub notes: Vec<String>,
}

impl ExtractionBatch {
    /// Validate raw collaborator facts, keeping the valid ones.
    #[must_use]
    pub fn from_raw(raw: Vec<RawExtractedFact>) -> Self {
        let mut batch = Self::default();
        for (idx, item) in raw.into_iter().enumerate() {
            match validate(item) {
                Ok((fact, note)) => {
                    if let Some(note) = note {
                        batch.notes.push(format!("fact #{idx}: {note}"));
                    }
                    batch.facts.push(fact);
                }
                Err(reason) => batch.notes.push(format!("fact #{idx} skipped: {reason}")),
            }
        }
        batch
    }

    /// Parse a collaborator response body.
    ///
    /// Accepts either a bare JSON array of facts or an object with a `facts`
    /// array. Anything unparseable yields an empty batch with a note.
    #[must_use]
    pub fn parse_lenient(body: &str) -> Self {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Envelope {
            List(Vec<RawExtractedFact>),
            Object { facts: Vec<RawExtractedFact> },
        }

        match serde_json::from_str::<Envelope>(body.trim()) {
            Ok(Envelope::List(raw) | Envelope::Object { facts: raw }) => Self::from_raw(raw),
            Err(e) => Self {
                facts: Vec::new(),
                notes: vec![format!("unparseable extraction response: {e}")],
            },
        }
    }
}

fn validate(raw: RawExtractedFact) -> Result<(ExtractedFact, Option<String>), String> {
    let key = raw
        .key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| "missing key".to_string())?
        .to_ascii_lowercase();

    let value = raw
        .value
        .as_ref()
        .and_then(value_to_text)
        .ok_or_else(|| format!("missing or non-scalar value for '{key}'"))?;

    let mut note = None;
    let category = match raw.category.as_deref().map(str::trim) {
        Some(c) if !c.is_empty() => serde_json::from_value(serde_json::Value::String(
            c.to_ascii_lowercase(),
        ))
        .unwrap_or_else(|_| {
            note = Some(format!("unknown category '{c}', filed as general"));
            FactCategory::General
        }),
        _ => FactCategory::General,
    };

    let details = match raw.details {
        Some(serde_json::Value::Null) | None => None,
        Some(details) => match serde_json::from_value::<FactDetails>(details) {
            Ok(parsed) if parsed.category() == category => Some(parsed),
            Ok(parsed) => {
                note = Some(format!(
                    "details kind {} does not match category {category}, ignored",
                    parsed.category()
                ));
                None
            }
            Err(e) => {
                note = Some(format!("invalid details ignored: {e}"));
                None
            }
        },
    };

    let confidence = raw
        .confidence
        .filter(|c| c.is_finite())
        .map_or(0.5, |c| c.clamp(0.0, 1.0));

    Ok((
        ExtractedFact {
            category,
            key,
            value,
            source_url: non_empty(raw.source_url),
            source_title: non_empty(raw.source_title),
            source_snippet: non_empty(raw.source_snippet),
            confidence,
            details,
        },
        note,
    ))
}

fn value_to_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Bool(b) => Some(if *b { "yes" } else { "no" }.to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(value_to_text).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        _ => None,
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
