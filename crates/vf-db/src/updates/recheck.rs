//! Outcome of a lightweight source recheck, as handed to `apply_recheck`.

use serde::{Deserialize, Serialize};
use vf_core::enums::SourceStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecheckOutcome {
    pub status: SourceStatus,
    /// Value read from the source, when the checker could extract one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub research_log_id: Option<String>,
}

impl RecheckOutcome {
    #[must_use]
    pub const fn new(status: SourceStatus) -> Self {
        Self {
            status,
            observed_value: None,
            http_status: None,
            notes: None,
            performed_by: None,
            research_log_id: None,
        }
    }
}

pub struct RecheckOutcomeBuilder(RecheckOutcome);

impl RecheckOutcomeBuilder {
    #[must_use]
    pub const fn new(status: SourceStatus) -> Self {
        Self(RecheckOutcome::new(status))
    }

    #[must_use]
    pub fn observed_value(mut self, val: impl Into<String>) -> Self {
        self.0.observed_value = Some(val.into());
        self
    }

    #[must_use]
    pub const fn http_status(mut self, val: u16) -> Self {
        self.0.http_status = Some(val);
        self
    }

    #[must_use]
    pub fn notes(mut self, val: impl Into<String>) -> Self {
        self.0.notes = Some(val.into());
        self
    }

    #[must_use]
    pub fn performed_by(mut self, val: impl Into<String>) -> Self {
        self.0.performed_by = Some(val.into());
        self
    }

    #[must_use]
    pub fn research_log_id(mut self, val: impl Into<String>) -> Self {
        self.0.research_log_id = Some(val.into());
        self
    }

    #[must_use]
    pub fn build(self) -> RecheckOutcome {
        self.0
    }
}
