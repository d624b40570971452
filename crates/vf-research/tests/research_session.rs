//! Research session integration tests with scripted collaborators.
//!
//! - Fresh verified facts are served without touching the network
//! - Flagged facts are rechecked; slow checks are recorded as timeouts
//! - The recheck pool never exceeds its concurrency bound
//! - Novel vendors: candidates recorded, facts reclassified, report audited
//! - Discovery timeouts and cancellation leave the store consistent

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use pretty_assertions::assert_eq;

use vf_classify::UrlSource;
use vf_core::entities::{FactKey, NewFact, VendorFact, VendorRegistryEntry, VendorUrl};
use vf_core::enums::{
    CandidateStatus, FactCategory, ResearchMode, SourceStatus, SourceType, UrlType,
    VerificationAction, VerificationMethod, VerificationStatus,
};
use vf_core::payloads::ExtractedFact;
use vf_db::service::FactService;
use vf_db::updates::recheck::RecheckOutcome;
use vf_research::{
    CancellationFlag, Decision, DiscoveryAgent, DiscoveryRequest, DiscoveryResponse,
    ResearchError, ResearchKey, ResearchRequest, Researcher, SessionSettings, SourceChecker,
};

// ---------------------------------------------------------------------------
// Scripted collaborators
// ---------------------------------------------------------------------------

struct ScriptedChecker {
    status: SourceStatus,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    started: Mutex<Vec<String>>,
}

impl ScriptedChecker {
    fn new(status: SourceStatus, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            status,
            delay,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            started: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceChecker for ScriptedChecker {
    async fn check(&self, fact: &VendorFact) -> RecheckOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.lock().unwrap().push(fact.fact_key.clone());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        RecheckOutcome::new(self.status)
    }
}

struct ScriptedAgent {
    response: Option<DiscoveryResponse>,
    delay: Duration,
    calls: AtomicUsize,
    last_request: Mutex<Option<DiscoveryRequest>>,
}

impl ScriptedAgent {
    fn returning(response: DiscoveryResponse) -> Arc<Self> {
        Self::build(Some(response), Duration::ZERO)
    }

    fn failing() -> Arc<Self> {
        Self::build(None, Duration::ZERO)
    }

    fn slow(delay: Duration) -> Arc<Self> {
        Self::build(Some(DiscoveryResponse::default()), delay)
    }

    fn build(response: Option<DiscoveryResponse>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            response,
            delay,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DiscoveryAgent for ScriptedAgent {
    async fn discover(&self, request: &DiscoveryRequest) -> Result<DiscoveryResponse, ResearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        tokio::time::sleep(self.delay).await;
        self.response
            .clone()
            .ok_or_else(|| ResearchError::Discovery("search backend unavailable".into()))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn settings() -> SessionSettings {
    SessionSettings {
        max_concurrent_rechecks: 4,
        recheck_timeout: Duration::from_secs(5),
        discovery_timeout: Duration::from_secs(5),
    }
}

async fn store() -> Arc<FactService> {
    Arc::new(FactService::new_local(":memory:", None).await.unwrap())
}

fn researcher(
    store: &Arc<FactService>,
    checker: &Arc<ScriptedChecker>,
    agent: &Arc<ScriptedAgent>,
    settings: SessionSettings,
) -> Researcher {
    Researcher::new(Arc::clone(store), checker.clone(), agent.clone(), settings)
}

fn key(category: FactCategory, key: &str) -> ResearchKey {
    ResearchKey::new(category, key)
}

async fn seed(
    store: &FactService,
    vendor: &str,
    category: FactCategory,
    fact_key: &str,
    source_url: Option<&str>,
) -> VendorFact {
    store
        .upsert_extracted_fact(
            NewFact {
                key: FactKey::new(vendor, "", category, fact_key),
                value: "yes".into(),
                details: None,
                context: None,
                source_url: source_url.map(String::from),
                source_title: None,
                source_snippet: None,
                source_type: SourceType::Vendor,
                confidence: 0.9,
            },
            VerificationMethod::WebSearch,
            None,
        )
        .await
        .unwrap()
        .fact
}

async fn seed_verified(store: &FactService, vendor: &str, category: FactCategory, fact_key: &str) -> VendorFact {
    let fact = seed(store, vendor, category, fact_key, Some("https://trust.tabnine.com/controls")).await;
    store
        .verify_fact(&fact.id, "analyst", VerificationMethod::Manual, None)
        .await
        .unwrap()
}

async fn seed_stale(store: &FactService, vendor: &str, category: FactCategory, fact_key: &str) -> VendorFact {
    let fact = seed_verified(store, vendor, category, fact_key).await;
    store
        .mark_stale(&fact.id, "analyst", Some("source moved"))
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Cache policy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fresh_verified_fact_is_served_without_network() {
    let store = store().await;
    let fact = seed_verified(&store, "Tabnine", FactCategory::Contract, "hipaa_baa").await;
    let checker = ScriptedChecker::new(SourceStatus::Accessible, Duration::ZERO);
    let agent = ScriptedAgent::failing();

    let request = ResearchRequest::new("Tabnine", "", ResearchMode::Cached)
        .with_keys([key(FactCategory::Contract, "hipaa_baa")]);
    let report = researcher(&store, &checker, &agent, settings())
        .run(&request, &CancellationFlag::new())
        .await
        .unwrap();

    assert_eq!(report.served.len(), 1);
    assert_eq!(report.served[0].id, fact.id);
    assert_eq!(report.plan[0].decision, Decision::ServeFromCache);
    assert_eq!(checker.calls(), 0);
    assert_eq!(agent.calls(), 0);
    assert!(report.unfilled.is_empty());

    let log = store.get_research_log(&report.research_log_id).await.unwrap();
    assert!(log.completed_at.is_some());
    assert!(!log.cancelled);
}

#[tokio::test]
async fn stale_fact_is_rechecked_and_verified_again() {
    let store = store().await;
    let fact = seed_stale(&store, "Tabnine", FactCategory::Certification, "soc2_type2").await;
    let checker = ScriptedChecker::new(SourceStatus::Accessible, Duration::ZERO);
    let agent = ScriptedAgent::failing();

    let request = ResearchRequest::new("Tabnine", "", ResearchMode::Cached)
        .with_keys([key(FactCategory::Certification, "soc2_type2")]);
    let report = researcher(&store, &checker, &agent, settings())
        .run(&request, &CancellationFlag::new())
        .await
        .unwrap();

    assert_eq!(checker.calls(), 1);
    assert_eq!(agent.calls(), 0);
    assert_eq!(report.rechecked.len(), 1);
    let summary = &report.rechecked[0];
    assert_eq!(summary.fact_id, fact.id);
    assert_eq!(summary.action, VerificationAction::Rechecked);
    assert_eq!(summary.verification_status, VerificationStatus::Verified);

    let stored = store.get_fact(&fact.id).await.unwrap();
    assert_eq!(stored.verification_status, VerificationStatus::Verified);
    assert_eq!(stored.recheck_count, 1);
    let log = store.fact_log(&fact.id).await.unwrap();
    let last = log.last().unwrap();
    assert_eq!(last.method, VerificationMethod::SourceRecheck);
    assert_eq!(last.research_log_id.as_deref(), Some(report.research_log_id.as_str()));
}

#[tokio::test]
async fn slow_recheck_is_recorded_as_timeout() {
    let store = store().await;
    let fact = seed_stale(&store, "Tabnine", FactCategory::Contract, "hipaa_baa").await;
    let checker = ScriptedChecker::new(SourceStatus::Accessible, Duration::from_secs(10));
    let agent = ScriptedAgent::failing();
    let settings = SessionSettings {
        recheck_timeout: Duration::from_millis(50),
        ..settings()
    };

    let request = ResearchRequest::new("Tabnine", "", ResearchMode::Cached)
        .with_keys([key(FactCategory::Contract, "hipaa_baa")]);
    let report = researcher(&store, &checker, &agent, settings)
        .run(&request, &CancellationFlag::new())
        .await
        .unwrap();

    let summary = &report.rechecked[0];
    assert_eq!(summary.source_status, SourceStatus::Timeout);
    assert_eq!(summary.verification_status, VerificationStatus::Stale);
    assert_eq!(summary.notes.as_deref(), Some("no response within 50ms"));

    let stored = store.get_fact(&fact.id).await.unwrap();
    assert_eq!(stored.value, fact.value);
    assert_eq!(stored.source_last_status, Some(SourceStatus::Timeout));
}

#[tokio::test]
async fn recheck_pool_respects_its_bound() {
    let store = store().await;
    let keys = [
        "soc2_type2",
        "iso27001",
        "hitrust",
        "fedramp",
        "pci_dss",
        "cmmc",
    ];
    for k in keys {
        seed_stale(&store, "Tabnine", FactCategory::Certification, k).await;
    }
    let checker = ScriptedChecker::new(SourceStatus::Accessible, Duration::from_millis(30));
    let agent = ScriptedAgent::failing();
    let settings = SessionSettings {
        max_concurrent_rechecks: 2,
        ..settings()
    };

    let request = ResearchRequest::new("Tabnine", "", ResearchMode::Cached)
        .with_keys(keys.map(|k| key(FactCategory::Certification, k)));
    let report = researcher(&store, &checker, &agent, settings)
        .run(&request, &CancellationFlag::new())
        .await
        .unwrap();

    assert_eq!(report.rechecked.len(), keys.len());
    assert_eq!(checker.calls(), keys.len());
    assert!(checker.max_in_flight.load(Ordering::SeqCst) <= 2);
}

#[tokio::test]
async fn rechecks_start_in_priority_order() {
    let store = store().await;
    let keys = ["data_residency", "hipaa_baa", "data_retention", "training_policy"];
    for k in keys {
        seed_stale(&store, "Tabnine", FactCategory::DataHandling, k).await;
    }
    let checker = ScriptedChecker::new(SourceStatus::Accessible, Duration::from_millis(10));
    let agent = ScriptedAgent::failing();
    let settings = SessionSettings {
        max_concurrent_rechecks: 1,
        ..settings()
    };

    let request = ResearchRequest::new("Tabnine", "", ResearchMode::Cached)
        .with_keys(keys.map(|k| key(FactCategory::DataHandling, k)));
    researcher(&store, &checker, &agent, settings)
        .run(&request, &CancellationFlag::new())
        .await
        .unwrap();

    assert_eq!(
        *checker.started.lock().unwrap(),
        vec!["hipaa_baa", "training_policy", "data_retention", "data_residency"]
    );
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

fn newco_discovery() -> DiscoveryResponse {
    let soc2 = ExtractedFact {
        source_snippet: Some("NewCo maintains a SOC 2 Type II report".into()),
        confidence: 0.9,
        ..ExtractedFact::new(FactCategory::Certification, "soc2_type2", "SOC 2 Type II")
            .with_source("https://trust.newco.com/soc2")
    };
    let training = ExtractedFact {
        confidence: 0.6,
        ..ExtractedFact::new(
            FactCategory::DataHandling,
            "training_policy",
            "Customer code is never used for training",
        )
        .with_source("https://techcrunch.com/newco-privacy")
    };
    let unrequested = ExtractedFact::new(FactCategory::Certification, "iso27001", "ISO 27001")
        .with_source("https://trust.newco.com/iso");
    DiscoveryResponse {
        facts: vec![soc2, training, unrequested],
        discovered_urls: vec![
            "https://trust.newco.com".into(),
            "https://techcrunch.com/newco-privacy".into(),
        ],
        report: Some(
            "NewCo holds a SOC 2 Type II attestation. Customer code is never used for training."
                .into(),
        ),
        notes: vec!["skipped entry 3: missing value".into()],
    }
}

#[tokio::test]
async fn novel_vendor_facts_are_classified_against_candidates() {
    let store = store().await;
    let checker = ScriptedChecker::new(SourceStatus::Accessible, Duration::ZERO);
    let agent = ScriptedAgent::returning(newco_discovery());

    let request = ResearchRequest::new("NewCo", "NewCo Platform", ResearchMode::Cached).with_keys([
        key(FactCategory::Certification, "soc2_type2"),
        key(FactCategory::DataHandling, "training_policy"),
    ]);
    let report = researcher(&store, &checker, &agent, settings())
        .run(&request, &CancellationFlag::new())
        .await
        .unwrap();

    let sent = agent.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(sent.gaps.len(), 2);
    assert!(sent.known_urls.is_empty());

    assert_eq!(report.url_source, Some(UrlSource::Candidates));
    assert_eq!(
        report.effective_urls,
        vec![VendorUrl::new(UrlType::TrustCenter, "https://trust.newco.com")]
    );

    assert_eq!(report.discovered.len(), 2);
    let soc2 = report
        .discovered
        .iter()
        .find(|f| f.fact_key == "soc2_type2")
        .unwrap();
    assert_eq!(soc2.source_type, SourceType::Vendor);
    assert_eq!(soc2.product_name, "NewCo Platform");
    assert_eq!(soc2.verification_status, VerificationStatus::Pending);
    assert_eq!(soc2.research_log_id.as_deref(), Some(report.research_log_id.as_str()));
    let training = report
        .discovered
        .iter()
        .find(|f| f.fact_key == "training_policy")
        .unwrap();
    assert_eq!(training.source_type, SourceType::ThirdParty);

    assert!(report.unfilled.is_empty());
    assert!(report.notes.iter().any(|n| n.contains("iso27001")));
    assert!(report.notes.iter().any(|n| n.contains("missing value")));

    let candidates = store.list_candidates(Some("NewCo"), None).await.unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].normalized_domain, "trust.newco.com");
    assert_eq!(candidates[0].status, CandidateStatus::Pending);

    let audit = report.audit.as_ref().unwrap();
    assert_eq!(audit.total_facts, 3);
    let log = store.get_research_log(&report.research_log_id).await.unwrap();
    assert_eq!(log.confidence_score, Some(audit.confidence_score));
}

#[tokio::test]
async fn registry_vendor_ignores_discovered_urls() {
    let store = store().await;
    let mut entry = VendorRegistryEntry::new("NewCo");
    entry.set_url(UrlType::SecurityPage, "https://www.newco.com/security");
    store.upsert_registry_entry(&entry).await.unwrap();

    let checker = ScriptedChecker::new(SourceStatus::Accessible, Duration::ZERO);
    let agent = ScriptedAgent::returning(newco_discovery());
    let request = ResearchRequest::new("NewCo", "", ResearchMode::Full);
    let report = researcher(&store, &checker, &agent, settings())
        .run(&request, &CancellationFlag::new())
        .await
        .unwrap();

    let sent = agent.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(sent.known_urls, entry.urls());

    assert_eq!(report.url_source, Some(UrlSource::Registry));
    assert_eq!(report.effective_urls, entry.urls());
    // trust.newco.com is not a registry domain
    assert!(report
        .discovered
        .iter()
        .all(|f| f.source_type == SourceType::ThirdParty));
    // full mode keeps facts for keys nobody asked for
    assert_eq!(report.discovered.len(), 3);
    assert!(store.list_candidates(Some("NewCo"), None).await.unwrap().is_empty());
}

#[tokio::test]
async fn discovery_timeout_leaves_gaps_unfilled() {
    let store = store().await;
    let checker = ScriptedChecker::new(SourceStatus::Accessible, Duration::ZERO);
    let agent = ScriptedAgent::slow(Duration::from_secs(10));
    let settings = SessionSettings {
        discovery_timeout: Duration::from_millis(50),
        ..settings()
    };

    let request = ResearchRequest::new("NewCo", "", ResearchMode::Cached)
        .with_keys([key(FactCategory::Contract, "hipaa_baa")]);
    let report = researcher(&store, &checker, &agent, settings)
        .run(&request, &CancellationFlag::new())
        .await
        .unwrap();

    assert_eq!(report.unfilled, vec![key(FactCategory::Contract, "hipaa_baa")]);
    assert!(report.notes.iter().any(|n| n.contains("timed out")));
    assert!(report.discovered.is_empty());
    assert!(report.audit.is_none());
}

#[tokio::test]
async fn discovery_error_is_a_note_not_a_failure() {
    let store = store().await;
    let checker = ScriptedChecker::new(SourceStatus::Accessible, Duration::ZERO);
    let agent = ScriptedAgent::failing();

    let request = ResearchRequest::new("NewCo", "", ResearchMode::Cached)
        .with_keys([key(FactCategory::Contract, "hipaa_baa")]);
    let report = researcher(&store, &checker, &agent, settings())
        .run(&request, &CancellationFlag::new())
        .await
        .unwrap();

    assert_eq!(report.unfilled.len(), 1);
    assert!(report
        .notes
        .iter()
        .any(|n| n.contains("search backend unavailable")));
}

// ---------------------------------------------------------------------------
// Cancellation and sweeps
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cancelled_session_starts_nothing_and_closes_its_log() {
    let store = store().await;
    seed_stale(&store, "Tabnine", FactCategory::Certification, "soc2_type2").await;
    let checker = ScriptedChecker::new(SourceStatus::Accessible, Duration::ZERO);
    let agent = ScriptedAgent::returning(newco_discovery());
    let cancel = CancellationFlag::new();
    cancel.cancel();

    let request = ResearchRequest::new("Tabnine", "", ResearchMode::Cached).with_keys([
        key(FactCategory::Certification, "soc2_type2"),
        key(FactCategory::Contract, "hipaa_baa"),
    ]);
    let report = researcher(&store, &checker, &agent, settings())
        .run(&request, &cancel)
        .await
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(checker.calls(), 0);
    assert_eq!(agent.calls(), 0);
    assert_eq!(report.skipped.len(), 2);
    assert!(report.rechecked.is_empty());

    let log = store.get_research_log(&report.research_log_id).await.unwrap();
    assert!(log.cancelled);
    assert!(log.completed_at.is_some());
}

#[tokio::test]
async fn recheck_due_skips_facts_without_a_source() {
    let store = store().await;
    let stale = seed_stale(&store, "Tabnine", FactCategory::Certification, "soc2_type2").await;
    let sourceless = seed(&store, "Acme", FactCategory::General, "sso", None).await;
    let checker = ScriptedChecker::new(SourceStatus::NotFound, Duration::ZERO);
    let agent = ScriptedAgent::failing();

    let run = researcher(&store, &checker, &agent, settings())
        .recheck_due(Utc::now(), 10, &CancellationFlag::new())
        .await
        .unwrap();

    assert_eq!(run.rechecked.len(), 1);
    assert_eq!(run.rechecked[0].fact_id, stale.id);
    assert_eq!(run.rechecked[0].source_status, SourceStatus::NotFound);
    assert_eq!(run.without_source, vec![sourceless.id]);
    assert!(run.not_started.is_empty());
}

#[tokio::test]
async fn empty_vendor_is_rejected() {
    let store = store().await;
    let checker = ScriptedChecker::new(SourceStatus::Accessible, Duration::ZERO);
    let agent = ScriptedAgent::failing();
    let request = ResearchRequest::new("  ", "", ResearchMode::Cached);
    let err = researcher(&store, &checker, &agent, settings())
        .run(&request, &CancellationFlag::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ResearchError::InvalidRequest(_)));
}
