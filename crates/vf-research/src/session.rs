//! Research session runner.
//!
//! A session plans every requested key against the cache, then runs source
//! rechecks through a bounded pool while discovery works on the gaps. Results
//! are written back one at a time through the store's write path, so the pool
//! never races itself on the same row.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use vf_audit::CrossChecker;
use vf_classify::{CandidateAnalyzer, DomainIndex, UrlSource, resolve};
use vf_config::ResearchConfig;
use vf_core::entities::{FactKey, NewFact, VendorFact, VendorRegistryEntry};
use vf_core::enums::{ResearchMode, SourceStatus, VerificationMethod};
use vf_db::error::DatabaseError;
use vf_db::service::FactService;
use vf_db::updates::recheck::RecheckOutcomeBuilder;

use crate::cancel::CancellationFlag;
use crate::collaborators::{
    DiscoveryAgent, DiscoveryRequest, DiscoveryResponse, ResearchKey, SourceChecker,
};
use crate::error::ResearchError;
use crate::policy::{Decision, STANDARD_KEYS, decide, has_source_url};
use crate::report::{PlannedKey, RecheckRun, RecheckSummary, SessionReport};

/// Pool and timeout limits for a [`Researcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub max_concurrent_rechecks: usize,
    pub recheck_timeout: Duration,
    pub discovery_timeout: Duration,
}

impl SessionSettings {
    #[must_use]
    pub const fn from_config(config: &ResearchConfig) -> Self {
        Self {
            max_concurrent_rechecks: config.max_concurrent_rechecks,
            recheck_timeout: config.recheck_timeout(),
            discovery_timeout: config.discovery_timeout(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&ResearchConfig::default())
    }
}

/// One vendor product to research.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchRequest {
    pub vendor_name: String,
    pub product_name: String,
    pub mode: ResearchMode,
    /// Keys to research. Empty means [`STANDARD_KEYS`].
    pub keys: Vec<ResearchKey>,
}

impl ResearchRequest {
    #[must_use]
    pub fn new(
        vendor_name: impl Into<String>,
        product_name: impl Into<String>,
        mode: ResearchMode,
    ) -> Self {
        Self {
            vendor_name: vendor_name.into(),
            product_name: product_name.into(),
            mode,
            keys: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_keys(mut self, keys: impl IntoIterator<Item = ResearchKey>) -> Self {
        self.keys.extend(keys);
        self
    }

    /// Requested keys in order, without duplicates or blanks.
    fn effective_keys(&self) -> Vec<ResearchKey> {
        let requested = if self.keys.is_empty() {
            STANDARD_KEYS
                .iter()
                .map(|&(category, key)| ResearchKey::new(category, key))
                .collect()
        } else {
            self.keys.clone()
        };
        let mut seen = HashSet::new();
        requested
            .into_iter()
            .filter(|k| !k.key.is_empty() && seen.insert(k.clone()))
            .collect()
    }
}

enum DiscoveryOutcome {
    NotNeeded,
    Cancelled,
    Failed(String),
    Found(DiscoveryResponse),
}

#[derive(Default)]
struct PoolOutcome {
    summaries: Vec<RecheckSummary>,
    not_started: Vec<VendorFact>,
    notes: Vec<String>,
}

/// Runs research sessions against a fact store.
pub struct Researcher {
    store: Arc<FactService>,
    checker: Arc<dyn SourceChecker>,
    discovery: Arc<dyn DiscoveryAgent>,
    settings: SessionSettings,
    analyzer: CandidateAnalyzer,
    auditor: CrossChecker,
}

impl Researcher {
    #[must_use]
    pub fn new(
        store: Arc<FactService>,
        checker: Arc<dyn SourceChecker>,
        discovery: Arc<dyn DiscoveryAgent>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            store,
            checker,
            discovery,
            settings,
            analyzer: CandidateAnalyzer::default(),
            auditor: CrossChecker::default(),
        }
    }

    #[must_use]
    pub fn with_analyzer(mut self, analyzer: CandidateAnalyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    #[must_use]
    pub fn with_auditor(mut self, auditor: CrossChecker) -> Self {
        self.auditor = auditor;
        self
    }

    #[must_use]
    pub const fn store(&self) -> &Arc<FactService> {
        &self.store
    }

    /// Research one vendor product.
    ///
    /// Fresh verified facts are served as they are. Expired or flagged facts
    /// with a source are rechecked through the pool. Everything else is handed
    /// to discovery, whose facts are classified against the vendor's
    /// effective URLs before they are stored. A cancelled session stops
    /// scheduling work but still commits what finished and closes its log.
    ///
    /// # Errors
    ///
    /// Returns `ResearchError::InvalidRequest` for an empty vendor name and
    /// `ResearchError::Store` when the store fails. Recheck and discovery
    /// failures are reported in the session notes instead.
    pub async fn run(
        &self,
        request: &ResearchRequest,
        cancel: &CancellationFlag,
    ) -> Result<SessionReport, ResearchError> {
        let vendor_name = request.vendor_name.trim();
        if vendor_name.is_empty() {
            return Err(ResearchError::InvalidRequest("vendor name is empty".into()));
        }
        let product_name = request.product_name.trim();

        let log = self
            .store
            .start_research_log(vendor_name, product_name, request.mode)
            .await?;
        let mut report = SessionReport::new(log.id.clone(), vendor_name, product_name, request.mode);

        let registry = self.store.lookup_registry(vendor_name).await?;
        if let Some(entry) = &registry {
            report.url_source = Some(UrlSource::Registry);
            report.effective_urls = entry.urls();
        }

        let now = Utc::now();
        let mut to_recheck = Vec::new();
        let mut gaps = Vec::new();
        for key in request.effective_keys() {
            let fact_key = FactKey::new(vendor_name, product_name, key.category, key.key.as_str());
            let current = self.store.get_current_fact(&fact_key).await?;
            let (decision, reason) = decide(current.as_ref(), request.mode, now);
            tracing::debug!(vendor = vendor_name, key = %key.key, ?decision, ?reason, "planned key");
            report.plan.push(PlannedKey {
                key: key.clone(),
                decision,
                reason,
                fact_id: current.as_ref().map(|f| f.id.clone()),
            });
            match (decision, current) {
                (Decision::ServeFromCache, Some(fact)) => report.served.push(fact),
                (Decision::Recheck, Some(fact)) => to_recheck.push(fact),
                _ => gaps.push(key),
            }
        }
        to_recheck.sort_by_key(|f| std::cmp::Reverse(f.recheck_priority));

        let discovery_request = DiscoveryRequest {
            vendor_name: vendor_name.to_string(),
            product_name: product_name.to_string(),
            gaps: gaps.clone(),
            known_urls: report.effective_urls.clone(),
        };
        let (pool, discovery) = tokio::join!(
            self.recheck_pool(to_recheck, Some(log.id.as_str()), cancel),
            self.discover(&discovery_request, cancel),
        );

        let pool = pool?;
        report.rechecked = pool.summaries;
        report.notes.extend(pool.notes);
        report.skipped.extend(
            pool.not_started
                .iter()
                .map(|f| ResearchKey::new(f.fact_category, f.fact_key.as_str())),
        );

        match discovery {
            DiscoveryOutcome::NotNeeded => {}
            DiscoveryOutcome::Cancelled => {
                report.notes.push("discovery skipped: session cancelled".into());
                report.skipped.extend(gaps);
            }
            DiscoveryOutcome::Failed(note) => {
                report.notes.push(note);
                report.unfilled = gaps;
            }
            DiscoveryOutcome::Found(response) => {
                self.absorb(&mut report, registry.as_ref(), &gaps, response)
                    .await?;
            }
        }

        report.cancelled = cancel.is_cancelled();
        self.store
            .finish_research_log(&log.id, report.audit.as_ref(), report.cancelled)
            .await?;

        tracing::info!(
            research_log_id = %log.id,
            vendor = vendor_name,
            served = report.served.len(),
            rechecked = report.rechecked.len(),
            discovered = report.discovered.len(),
            unfilled = report.unfilled.len(),
            cancelled = report.cancelled,
            "research session complete"
        );
        Ok(report)
    }

    /// Recheck up to `limit` live facts that are due at `now`, across vendors.
    ///
    /// Facts without a source URL are listed but not checked.
    ///
    /// # Errors
    ///
    /// Returns `ResearchError::Store` when the store fails.
    pub async fn recheck_due(
        &self,
        now: DateTime<Utc>,
        limit: usize,
        cancel: &CancellationFlag,
    ) -> Result<RecheckRun, ResearchError> {
        let due = self.store.list_due_for_recheck(now, limit).await?;
        let (checkable, without_source): (Vec<_>, Vec<_>) =
            due.into_iter().partition(has_source_url);

        let pool = self.recheck_pool(checkable, None, cancel).await?;
        tracing::info!(
            rechecked = pool.summaries.len(),
            without_source = without_source.len(),
            not_started = pool.not_started.len(),
            "due recheck sweep complete"
        );
        Ok(RecheckRun {
            rechecked: pool.summaries,
            without_source: without_source.into_iter().map(|f| f.id).collect(),
            not_started: pool.not_started.into_iter().map(|f| f.id).collect(),
            notes: pool.notes,
        })
    }

    async fn recheck_pool(
        &self,
        facts: Vec<VendorFact>,
        research_log_id: Option<&str>,
        cancel: &CancellationFlag,
    ) -> Result<PoolOutcome, DatabaseError> {
        let mut outcome = PoolOutcome::default();
        if facts.is_empty() {
            return Ok(outcome);
        }

        // Permits are taken here, in the caller's order, so higher-priority
        // facts start first whatever the scheduler does.
        let permits = Arc::new(Semaphore::new(self.settings.max_concurrent_rechecks.max(1)));
        let timeout = self.settings.recheck_timeout;
        let mut set = JoinSet::new();
        let mut queue = facts.into_iter();
        while let Some(fact) = queue.next() {
            let permit = match Arc::clone(&permits).acquire_owned().await {
                Ok(permit) if !cancel.is_cancelled() => permit,
                _ => {
                    outcome.not_started.push(fact);
                    outcome.not_started.extend(queue.by_ref());
                    break;
                }
            };
            let checker = Arc::clone(&self.checker);
            set.spawn(async move {
                let _permit = permit;
                let checked = tokio::time::timeout(timeout, checker.check(&fact))
                    .await
                    .unwrap_or_else(|_| {
                        RecheckOutcomeBuilder::new(SourceStatus::Timeout)
                            .notes(format!("no response within {timeout:?}"))
                            .build()
                    });
                (fact, checked)
            });
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((fact, mut checked)) => {
                    if checked.research_log_id.is_none() {
                        checked.research_log_id = research_log_id.map(String::from);
                    }
                    match self.store.apply_recheck(&fact.id, &checked, Utc::now()).await {
                        Ok(result) => outcome.summaries.push(RecheckSummary::new(
                            checked.status,
                            checked.notes.clone(),
                            &result,
                        )),
                        Err(DatabaseError::InvalidState(reason)) => {
                            tracing::warn!(fact_id = %fact.id, %reason, "recheck not applied");
                            outcome
                                .notes
                                .push(format!("recheck of {} not applied: {reason}", fact.id));
                        }
                        Err(e) => return Err(e),
                    }
                }
                Err(e) => {
                    tracing::warn!(%e, "recheck task failed");
                    outcome.notes.push(format!("recheck task failed: {e}"));
                }
            }
        }
        outcome
            .not_started
            .sort_by_key(|f| std::cmp::Reverse(f.recheck_priority));
        Ok(outcome)
    }

    async fn discover(
        &self,
        request: &DiscoveryRequest,
        cancel: &CancellationFlag,
    ) -> DiscoveryOutcome {
        if request.gaps.is_empty() {
            return DiscoveryOutcome::NotNeeded;
        }
        if cancel.is_cancelled() {
            return DiscoveryOutcome::Cancelled;
        }
        let timeout = self.settings.discovery_timeout;
        match tokio::time::timeout(timeout, self.discovery.discover(request)).await {
            Ok(Ok(response)) => DiscoveryOutcome::Found(response),
            Ok(Err(e)) => {
                tracing::warn!(vendor = %request.vendor_name, %e, "discovery failed");
                DiscoveryOutcome::Failed(e.to_string())
            }
            Err(_) => {
                tracing::warn!(vendor = %request.vendor_name, ?timeout, "discovery timed out");
                DiscoveryOutcome::Failed(format!("discovery timed out after {timeout:?}"))
            }
        }
    }

    /// Store what discovery found.
    ///
    /// Every URL discovery touched feeds resolution, so a novel vendor gets
    /// its candidates recorded and an effective URL set before any fact is
    /// classified.
    async fn absorb(
        &self,
        report: &mut SessionReport,
        registry: Option<&VendorRegistryEntry>,
        gaps: &[ResearchKey],
        response: DiscoveryResponse,
    ) -> Result<(), ResearchError> {
        let DiscoveryResponse {
            facts,
            discovered_urls,
            report: narrative,
            notes,
        } = response;
        report.notes.extend(notes);

        let mut seen_urls = discovered_urls;
        seen_urls.extend(facts.iter().filter_map(|f| f.source_url.clone()));
        let resolution = resolve(registry, &seen_urls, &report.vendor_name, &self.analyzer);
        if resolution.source == UrlSource::Candidates {
            for candidate in &resolution.candidates {
                let Some(domain) = candidate.normalized_domain.as_deref() else {
                    continue;
                };
                self.store
                    .record_candidate(
                        &report.vendor_name,
                        &candidate.url,
                        domain,
                        candidate.candidate_type,
                        candidate.confidence,
                    )
                    .await?;
            }
        }
        let index = DomainIndex::build(&resolution.urls);

        let research_log_id = report.research_log_id.clone();
        let wanted: HashSet<&ResearchKey> = gaps.iter().collect();
        let mut filled = HashSet::new();
        for fact in &facts {
            let key = ResearchKey::new(fact.category, fact.key.as_str());
            if report.mode == ResearchMode::Cached && !wanted.contains(&key) {
                report
                    .notes
                    .push(format!("ignored extracted {}: not requested", fact.key));
                continue;
            }
            let classification = index.classify(fact.source_url.as_deref().unwrap_or_default());
            let input = NewFact {
                key: FactKey::new(
                    report.vendor_name.as_str(),
                    report.product_name.as_str(),
                    fact.category,
                    fact.key.as_str(),
                ),
                value: fact.value.clone(),
                details: fact.details.clone(),
                context: None,
                source_url: fact.source_url.clone(),
                source_title: fact.source_title.clone(),
                source_snippet: fact.source_snippet.clone(),
                source_type: classification.source_type,
                confidence: fact.confidence,
            };
            match self
                .store
                .upsert_extracted_fact(input, VerificationMethod::WebSearch, Some(research_log_id.as_str()))
                .await
            {
                Ok(stored) => {
                    filled.insert(key);
                    report.discovered.push(stored.fact);
                }
                Err(DatabaseError::InvalidState(reason)) => report
                    .notes
                    .push(format!("rejected extracted {}: {reason}", fact.key)),
                Err(e) => return Err(e.into()),
            }
        }
        report.unfilled = gaps.iter().filter(|k| !filled.contains(*k)).cloned().collect();

        if let Some(narrative) = narrative.as_deref() {
            report.audit = Some(self.auditor.check(&facts, narrative));
        }
        report.url_source = Some(resolution.source);
        report.effective_urls = resolution.urls;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vf_core::enums::FactCategory;

    #[test]
    fn empty_request_uses_standard_keys() {
        let request = ResearchRequest::new("Tabnine", "", ResearchMode::Cached);
        assert_eq!(request.effective_keys().len(), STANDARD_KEYS.len());
    }

    #[test]
    fn duplicate_and_blank_keys_are_dropped() {
        let request = ResearchRequest::new("Tabnine", "", ResearchMode::Cached).with_keys([
            ResearchKey::new(FactCategory::Contract, "hipaa_baa"),
            ResearchKey::new(FactCategory::Contract, " hipaa_baa "),
            ResearchKey::new(FactCategory::General, "  "),
            ResearchKey::new(FactCategory::Certification, "soc2_type2"),
        ]);
        assert_eq!(
            request.effective_keys(),
            vec![
                ResearchKey::new(FactCategory::Contract, "hipaa_baa"),
                ResearchKey::new(FactCategory::Certification, "soc2_type2"),
            ]
        );
    }

    #[test]
    fn settings_follow_research_config() {
        let config = ResearchConfig {
            max_concurrent_rechecks: 2,
            recheck_timeout_secs: 3,
            discovery_timeout_secs: 40,
            ..ResearchConfig::default()
        };
        let settings = SessionSettings::from_config(&config);
        assert_eq!(settings.max_concurrent_rechecks, 2);
        assert_eq!(settings.recheck_timeout, Duration::from_secs(3));
        assert_eq!(settings.discovery_timeout, Duration::from_secs(40));
    }
}
