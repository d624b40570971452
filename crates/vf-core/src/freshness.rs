//! Freshness, recheck and confidence rules for cached vendor facts.
//!
//! Every rule takes an explicit `now` so callers (and tests) control the clock.
//! The convenience wrappers without a timestamp use `Utc::now()`.

use chrono::{DateTime, Duration, Utc};

use crate::critical_fields::policy_for;
use crate::entities::{NewFact, VendorFact};
use crate::enums::{SourceStatus, SourceType, VerificationStatus};
use crate::errors::CoreError;

const SECONDS_PER_DAY: f64 = 86_400.0;

const BASE_CONFIDENCE: f64 = 0.5;
const VENDOR_SOURCE_BONUS: f64 = 0.2;
const BOTH_SOURCES_BONUS: f64 = 0.3;
const VERIFIED_BONUS: f64 = 0.2;
const DISPUTED_PENALTY: f64 = 0.3;
const STALE_PENALTY: f64 = 0.1;
const AGE_PENALTY_PER_TTL: f64 = 0.2;
const MAX_AGE_RATIO: f64 = 2.0;
const ACCESSIBLE_RECHECK_BONUS: f64 = 0.1;

impl VendorFact {
    /// Build a pending fact from extraction input, applying `CRITICAL_FIELDS`.
    #[must_use]
    pub fn from_new(id: String, input: NewFact, now: DateTime<Utc>) -> Self {
        let policy = policy_for(&input.key.fact_key);
        let mut fact = Self {
            id,
            vendor_name: input.key.vendor_name,
            product_name: input.key.product_name,
            fact_category: input.key.fact_category,
            fact_key: input.key.fact_key,
            value: input.value,
            details: input.details,
            context: input.context,
            source_url: input.source_url,
            source_title: input.source_title,
            source_snippet: input.source_snippet,
            source_type: input.source_type,
            verification_status: VerificationStatus::Pending,
            confidence_score: 0.0,
            ttl_days: policy.ttl_days,
            verified_at: None,
            verified_by: None,
            research_log_id: None,
            expires_at: None,
            source_last_checked_at: None,
            source_last_status: None,
            recheck_count: 0,
            next_recheck_at: None,
            recheck_priority: policy.recheck_priority,
            first_found_at: now,
            last_updated_at: now,
            superseded_by: None,
            version: 1,
        };
        fact.confidence_score = fact.calculate_confidence_at(now);
        fact
    }

    /// Fresh means verified and not yet expired.
    ///
    /// Without `expires_at`, falls back to `verified_at + ttl_days`.
    #[must_use]
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        let Some(verified_at) = self.verified_at else {
            return false;
        };
        match self.expires_at {
            Some(expires_at) => now < expires_at,
            None => now - verified_at < self.ttl(),
        }
    }

    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(Utc::now())
    }

    /// True when disputed or stale, not fresh, or past its scheduled recheck.
    #[must_use]
    pub fn needs_recheck_at(&self, now: DateTime<Utc>) -> bool {
        if matches!(
            self.verification_status,
            VerificationStatus::Disputed | VerificationStatus::Stale
        ) {
            return true;
        }
        if !self.is_fresh_at(now) {
            return true;
        }
        self.next_recheck_at.is_some_and(|at| at <= now)
    }

    #[must_use]
    pub fn needs_recheck(&self) -> bool {
        self.needs_recheck_at(Utc::now())
    }

    /// Mark verified, stamping `verified_at` and a fresh `expires_at`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` if the fact cannot become verified
    /// from its current status.
    pub fn set_verified_at(
        &mut self,
        now: DateTime<Utc>,
        verified_by: &str,
        research_log_id: Option<&str>,
    ) -> Result<(), CoreError> {
        self.transition(VerificationStatus::Verified)?;
        let expires_at = now + self.ttl();
        self.verified_at = Some(now);
        self.verified_by = Some(verified_by.to_string());
        if research_log_id.is_some() {
            self.research_log_id = research_log_id.map(String::from);
        }
        self.expires_at = Some(expires_at);
        self.next_recheck_at = Some(expires_at);
        self.touch(now);
        Ok(())
    }

    /// # Errors
    ///
    /// See [`VendorFact::set_verified_at`].
    pub fn set_verified(
        &mut self,
        verified_by: &str,
        research_log_id: Option<&str>,
    ) -> Result<(), CoreError> {
        self.set_verified_at(Utc::now(), verified_by, research_log_id)
    }

    /// Mark disputed without touching `value`.
    ///
    /// The conflicting value is recorded in `context` so the replacement fact
    /// can carry it.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` for superseded facts.
    pub fn set_disputed_at(
        &mut self,
        now: DateTime<Utc>,
        new_value: Option<&str>,
    ) -> Result<(), CoreError> {
        self.transition(VerificationStatus::Disputed)?;
        if let Some(conflict) = new_value {
            self.annotate_conflict_at(now, conflict);
        }
        self.touch(now);
        Ok(())
    }

    /// Append a dated conflicting-value note to `context`. Status is left alone.
    pub fn annotate_conflict_at(&mut self, now: DateTime<Utc>, conflict: &str) {
        let note = format!(
            "[disputed {}] conflicting value observed: {conflict}",
            now.format("%Y-%m-%d")
        );
        self.context = Some(match self.context.take() {
            Some(existing) if !existing.is_empty() => format!("{existing}\n{note}"),
            _ => note,
        });
        self.touch(now);
    }

    /// # Errors
    ///
    /// See [`VendorFact::set_disputed_at`].
    pub fn set_disputed(&mut self, new_value: Option<&str>) -> Result<(), CoreError> {
        self.set_disputed_at(Utc::now(), new_value)
    }

    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` if the fact cannot become stale.
    pub fn mark_stale_at(&mut self, now: DateTime<Utc>) -> Result<(), CoreError> {
        self.transition(VerificationStatus::Stale)?;
        self.touch(now);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` if the fact is already superseded.
    pub fn mark_superseded_at(
        &mut self,
        now: DateTime<Utc>,
        replacement_id: &str,
    ) -> Result<(), CoreError> {
        self.transition(VerificationStatus::Superseded)?;
        self.superseded_by = Some(replacement_id.to_string());
        self.touch(now);
        Ok(())
    }

    /// Record the outcome of a source recheck. Status is left alone.
    pub fn record_recheck_at(&mut self, now: DateTime<Utc>, status: SourceStatus) {
        self.source_last_checked_at = Some(now);
        self.source_last_status = Some(status);
        self.recheck_count = self.recheck_count.saturating_add(1);
        self.touch(now);
    }

    pub fn record_recheck(&mut self, status: SourceStatus) {
        self.record_recheck_at(Utc::now(), status);
    }

    /// Days since the fact was verified, or since it was first found.
    #[must_use]
    pub fn age_days_at(&self, now: DateTime<Utc>) -> f64 {
        let anchor = self.verified_at.unwrap_or(self.first_found_at);
        #[allow(clippy::cast_precision_loss)]
        let seconds = (now - anchor).num_seconds().max(0) as f64;
        seconds / SECONDS_PER_DAY
    }

    /// Confidence in `[0, 1]` from source type, status, age and recheck history.
    #[must_use]
    pub fn calculate_confidence_at(&self, now: DateTime<Utc>) -> f64 {
        let mut score = BASE_CONFIDENCE;

        score += match self.source_type {
            SourceType::Vendor => VENDOR_SOURCE_BONUS,
            SourceType::Both => BOTH_SOURCES_BONUS,
            SourceType::ThirdParty => 0.0,
        };

        score += match self.verification_status {
            VerificationStatus::Verified => VERIFIED_BONUS,
            VerificationStatus::Disputed => -DISPUTED_PENALTY,
            VerificationStatus::Stale => -STALE_PENALTY,
            VerificationStatus::Pending | VerificationStatus::Superseded => 0.0,
        };

        let age_days = self.age_days_at(now);
        let ttl_days = f64::from(self.ttl_days);
        if age_days > ttl_days {
            let ratio = if ttl_days > 0.0 {
                (age_days / ttl_days).min(MAX_AGE_RATIO)
            } else {
                MAX_AGE_RATIO
            };
            score -= AGE_PENALTY_PER_TTL * ratio;
        }

        if self.recheck_count > 0 && self.source_last_status == Some(SourceStatus::Accessible) {
            score += ACCESSIBLE_RECHECK_BONUS;
        }

        score.clamp(0.0, 1.0)
    }

    #[must_use]
    pub fn calculate_confidence(&self) -> f64 {
        self.calculate_confidence_at(Utc::now())
    }

    fn ttl(&self) -> Duration {
        Duration::days(i64::from(self.ttl_days))
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.last_updated_at = now;
    }

    fn transition(&mut self, next: VerificationStatus) -> Result<(), CoreError> {
        if !self.verification_status.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                entity_type: "vendor_fact".into(),
                id: self.id.clone(),
                from: self.verification_status.to_string(),
                to: next.to_string(),
            });
        }
        self.verification_status = next;
        Ok(())
    }
}
