//! Audit confidence scoring.
//!
//! ```text
//! inclusion_rate        = facts_in_report / total_facts   (0 when total is 0)
//! drop_penalty          = min(0.05 * dropped, 0.3)
//! hallucination_penalty = min(0.10 * unsupported, 0.4)
//! confidence_score      = clamp(inclusion - drop - hallucination, 0, 1)
//! ```

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use vf_core::enums::ConfidenceLevel;

const DROP_PENALTY_PER_FACT: f64 = 0.05;
const DROP_PENALTY_CAP: f64 = 0.3;
const HALLUCINATION_PENALTY_PER_CLAIM: f64 = 0.10;
const HALLUCINATION_PENALTY_CAP: f64 = 0.4;

/// Numeric part of an audit result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AuditScore {
    pub inclusion_rate: f64,
    pub drop_penalty: f64,
    pub hallucination_penalty: f64,
    pub confidence_score: f64,
    pub confidence_level: ConfidenceLevel,
}

/// Score an audit from its counts.
///
/// Values are rounded to six decimals before the level is bucketed, so
/// `0.8 - 0.1 - 0.1` lands on `0.6` (medium) rather than just under it.
#[must_use]
pub fn score(total_facts: u32, facts_in_report: u32, dropped: usize, unsupported: usize) -> AuditScore {
    let inclusion_rate = if total_facts == 0 {
        0.0
    } else {
        f64::from(facts_in_report.min(total_facts)) / f64::from(total_facts)
    };
    let drop_penalty = (DROP_PENALTY_PER_FACT * count(dropped)).min(DROP_PENALTY_CAP);
    let hallucination_penalty =
        (HALLUCINATION_PENALTY_PER_CLAIM * count(unsupported)).min(HALLUCINATION_PENALTY_CAP);

    let confidence_score =
        round6((inclusion_rate - drop_penalty - hallucination_penalty).clamp(0.0, 1.0));

    AuditScore {
        inclusion_rate: round6(inclusion_rate),
        drop_penalty: round6(drop_penalty),
        hallucination_penalty: round6(hallucination_penalty),
        confidence_score,
        confidence_level: ConfidenceLevel::from_score(confidence_score),
    }
}

#[allow(clippy::cast_precision_loss)]
fn count(n: usize) -> f64 {
    n as f64
}

fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}
