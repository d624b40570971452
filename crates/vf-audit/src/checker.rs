//! The audit cross-checker.
//!
//! Two entry points produce an [`AuditResult`]:
//! - [`CrossChecker::check`] detects drops and unsupported claims itself, by
//!   case-insensitive matching of fact values against the report
//! - [`CrossChecker::reconcile`] applies an external reviewer's findings,
//!   resolving each dropped-fact reference back to an extracted fact

use std::collections::BTreeSet;

use vf_core::critical_fields::policy_for;
use vf_core::entities::{AuditResult, DroppedFact, UnsupportedClaim};
use vf_core::enums::Severity;
use vf_core::payloads::ExtractedFact;

use crate::review::AuditReview;
use crate::scoring::score;
use crate::text::{fold, is_boolean_like, key_label, sentences};
use crate::vocabulary::ClaimVocabulary;

/// Claims shorter than this many words are treated as headings or labels.
const MIN_CLAIM_WORDS: usize = 3;

/// References shorter than this are only matched exactly.
const MIN_SUBSTRING_LEN: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct CrossChecker {
    vocabulary: ClaimVocabulary,
}

impl CrossChecker {
    #[must_use]
    pub const fn new(vocabulary: ClaimVocabulary) -> Self {
        Self { vocabulary }
    }

    /// Audit `report` against the facts it was written from.
    #[must_use]
    pub fn check(&self, facts: &[ExtractedFact], report: &str) -> AuditResult {
        let folded_report = fold(report);
        let mut notes = Vec::new();
        if facts.is_empty() {
            notes.push("no extracted facts to audit".to_string());
        }
        if folded_report.is_empty() {
            notes.push("report is empty".to_string());
        }

        let dropped: Vec<DroppedFact> = facts
            .iter()
            .filter(|fact| !mentions(&folded_report, fact))
            .map(|fact| DroppedFact {
                fact: fact.clone(),
                reason: drop_reason(fact),
                severity: severity_for(fact),
            })
            .collect();

        let unsupported: Vec<UnsupportedClaim> = sentences(report)
            .into_iter()
            .filter_map(|sentence| {
                let folded = fold(&sentence.text);
                if folded.split(' ').count() < MIN_CLAIM_WORDS {
                    return None;
                }
                let severity = self.vocabulary.claim_severity(&folded)?;
                if facts.iter().any(|fact| mentions(&folded, fact)) {
                    return None;
                }
                Some(UnsupportedClaim {
                    location: sentence.location(),
                    claim: sentence.text,
                    severity,
                })
            })
            .collect();

        let total = count_u32(facts.len());
        let in_report = total.saturating_sub(count_u32(dropped.len()));
        assemble(total, in_report, dropped, unsupported, notes)
    }

    /// Build an audit result from a reviewer's findings.
    ///
    /// Each dropped reference resolves to at most one fact. References that
    /// match nothing are noted and ignored; two references to the same fact
    /// count once.
    #[must_use]
    pub fn reconcile(&self, facts: &[ExtractedFact], review: &AuditReview) -> AuditResult {
        let mut notes = review.notes.clone();
        let mut seen = BTreeSet::new();
        let mut dropped = Vec::new();

        for reference in &review.dropped {
            let Some((idx, fact)) = resolve_reference(facts, &reference.reference) else {
                tracing::debug!(reference = %reference.reference, "unresolved dropped-fact reference");
                notes.push(format!(
                    "dropped-fact reference '{}' matches no extracted fact",
                    reference.reference
                ));
                continue;
            };
            if !seen.insert(idx) {
                continue;
            }
            dropped.push(DroppedFact {
                fact: fact.clone(),
                reason: reference
                    .reason
                    .clone()
                    .unwrap_or_else(|| "reported missing by reviewer".to_string()),
                severity: reference.severity.unwrap_or_else(|| severity_for(fact)),
            });
        }

        let total = count_u32(facts.len());
        let in_report = total.saturating_sub(count_u32(dropped.len()));
        assemble(total, in_report, dropped, review.unsupported.clone(), notes)
    }
}

/// Resolve a dropped-fact reference to its originating fact.
///
/// Tries, in order: exact key, exact value, substring of key, substring of
/// value. Comparison ignores case and whitespace runs, and keys also match
/// in their spaced form (`hipaa baa`). The first match wins.
#[must_use]
pub fn resolve_reference<'a>(
    facts: &'a [ExtractedFact],
    reference: &str,
) -> Option<(usize, &'a ExtractedFact)> {
    let needle = fold(reference);
    if needle.is_empty() {
        return None;
    }
    let needle_label = key_label(&needle);

    let exact_key = |f: &ExtractedFact| fold(&f.key) == needle || key_label(&f.key) == needle_label;
    let exact_value = |f: &ExtractedFact| fold(&f.value) == needle;
    let substring_key = |f: &ExtractedFact| {
        needle.len() >= MIN_SUBSTRING_LEN
            && (fold(&f.key).contains(&needle) || key_label(&f.key).contains(&needle_label))
    };
    let substring_value =
        |f: &ExtractedFact| needle.len() >= MIN_SUBSTRING_LEN && fold(&f.value).contains(&needle);

    let strategies: [&dyn Fn(&ExtractedFact) -> bool; 4] =
        [&exact_key, &exact_value, &substring_key, &substring_value];
    strategies
        .iter()
        .find_map(|matches| facts.iter().enumerate().find(|&(_, f)| matches(f)))
}

/// Whether folded text mentions a fact.
///
/// Yes/no style values are matched through their key label, everything else
/// through the value itself.
fn mentions(folded: &str, fact: &ExtractedFact) -> bool {
    let value = fold(&fact.value);
    if value.is_empty() {
        return false;
    }
    if is_boolean_like(&value) {
        return folded.contains(&key_label(&fact.key));
    }
    folded.contains(&value)
}

fn drop_reason(fact: &ExtractedFact) -> String {
    if is_boolean_like(&fact.value) {
        format!("'{}' is not mentioned in the report", key_label(&fact.key))
    } else {
        format!("value '{}' does not appear in the report", fact.value)
    }
}

fn severity_for(fact: &ExtractedFact) -> Severity {
    Severity::from_priority(policy_for(&fact.key).recheck_priority)
}

fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn assemble(
    total_facts: u32,
    facts_in_report: u32,
    dropped_facts: Vec<DroppedFact>,
    unsupported_claims: Vec<UnsupportedClaim>,
    notes: Vec<String>,
) -> AuditResult {
    let s = score(
        total_facts,
        facts_in_report,
        dropped_facts.len(),
        unsupported_claims.len(),
    );
    tracing::info!(
        total_facts,
        facts_in_report,
        dropped = dropped_facts.len(),
        unsupported = unsupported_claims.len(),
        score = s.confidence_score,
        level = %s.confidence_level,
        "audit complete"
    );
    AuditResult {
        total_facts,
        facts_in_report,
        dropped_facts,
        unsupported_claims,
        inclusion_rate: s.inclusion_rate,
        drop_penalty: s.drop_penalty,
        hallucination_penalty: s.hallucination_penalty,
        confidence_score: s.confidence_score,
        confidence_level: s.confidence_level,
        notes,
    }
}
