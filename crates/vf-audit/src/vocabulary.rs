//! Keywords that mark a report sentence as a compliance claim.
//!
//! A [`ClaimVocabulary`] is an explicit value built once by the caller and
//! handed to the [`CrossChecker`](crate::CrossChecker).

use serde::{Deserialize, Serialize};
use vf_core::enums::Severity;

use crate::text::{contains_term, fold};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimVocabulary {
    /// Terms whose unsupported mention is a high-severity claim.
    pub critical: Vec<String>,
    /// Other compliance terms; unsupported mentions are medium severity.
    pub general: Vec<String>,
}

impl ClaimVocabulary {
    #[must_use]
    pub fn standard() -> Self {
        let critical = [
            "soc 2", "soc2", "iso 27001", "iso27001", "hipaa", "baa", "hitrust", "fedramp",
            "pci", "breach", "incident", "trains on", "training on",
        ];
        let general = [
            "certified", "certification", "compliant", "compliance", "gdpr", "ccpa",
            "encrypt", "retention", "retain", "residency", "subprocessor", "penetration test",
            "audit", "sso", "zero data",
        ];
        Self::new(critical, general)
    }

    #[must_use]
    pub fn new<I, J, S, T>(critical: I, general: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            critical: critical.into_iter().map(|t| fold(t.as_ref())).collect(),
            general: general.into_iter().map(|t| fold(t.as_ref())).collect(),
        }
    }

    /// Severity of the strongest term in an already-folded sentence, or
    /// `None` when the sentence makes no compliance claim.
    #[must_use]
    pub fn claim_severity(&self, folded: &str) -> Option<Severity> {
        if self.critical.iter().any(|term| contains_term(folded, term)) {
            Some(Severity::High)
        } else if self.general.iter().any(|term| contains_term(folded, term)) {
            Some(Severity::Medium)
        } else {
            None
        }
    }
}

impl Default for ClaimVocabulary {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_by_term() {
        let vocab = ClaimVocabulary::standard();
        assert_eq!(vocab.claim_severity("they are fedramp high"), Some(Severity::High));
        assert_eq!(vocab.claim_severity("fully gdpr compliant"), Some(Severity::Medium));
        assert_eq!(vocab.claim_severity("founded in 2018"), None);
    }

    #[test]
    fn custom_terms_are_folded() {
        let vocab = ClaimVocabulary::new(["  Data  Sovereignty "], Vec::<String>::new());
        assert_eq!(
            vocab.claim_severity("claims data sovereignty in eu"),
            Some(Severity::High)
        );
    }
}
