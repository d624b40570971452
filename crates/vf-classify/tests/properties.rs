//! End-to-end properties of normalization, classification and resolution.

use pretty_assertions::assert_eq;
use rstest::rstest;
use vf_classify::{
    CandidateAnalyzer, ClassificationReason, UrlSource, classify, normalize_domain, resolve,
    resolve_effective_urls,
};
use vf_core::entities::{VendorRegistryEntry, VendorUrl};
use vf_core::enums::{CandidateType, SourceType, UrlType};

fn tabnine_urls() -> Vec<VendorUrl> {
    vec![
        VendorUrl::new(UrlType::TrustCenter, "trust.tabnine.com"),
        VendorUrl::new(UrlType::SecurityPage, "www.tabnine.com/security"),
    ]
}

fn strings(list: &[&str]) -> Vec<String> {
    list.iter().map(ToString::to_string).collect()
}

#[rstest]
#[case("example.com")]
#[case("http://example.com")]
#[case("https://example.com")]
#[case("https://www.example.com")]
#[case("http://www.example.com:8080")]
#[case("www.example.com:443/path")]
fn host_variants_share_one_domain(#[case] url: &str) {
    assert_eq!(normalize_domain(url).as_deref(), Some("example.com"));
}

#[rstest]
#[case("https://trust.tabnine.com")]
#[case("https://techcrunch.com/tabnine")]
#[case("not even a url")]
fn empty_url_set_is_no_registry_urls(#[case] url: &str) {
    let c = classify(url, &[]);
    assert_eq!(c.source_type, SourceType::ThirdParty);
    assert_eq!(c.reason, ClassificationReason::NoRegistryUrls);
}

#[test]
fn empty_url_is_no_url_for_any_set() {
    assert_eq!(classify("", &[]).reason, ClassificationReason::NoUrl);
    assert_eq!(classify("", &tabnine_urls()).reason, ClassificationReason::NoUrl);
}

#[test]
fn no_substring_matching() {
    let urls = vec![VendorUrl::new(UrlType::TrustCenter, "https://trust.tabnine.com")];
    let c = classify("https://evil-trust.tabnine.com.attacker.net", &urls);
    assert_eq!(c.source_type, SourceType::ThirdParty);
}

#[test]
fn known_vendor_classification() {
    let urls = tabnine_urls();

    let soc2 = classify("https://trust.tabnine.com/soc2", &urls);
    assert_eq!(soc2.source_type, SourceType::Vendor);
    assert_eq!(soc2.matched_type, Some(UrlType::TrustCenter));

    let press = classify("https://techcrunch.com/tabnine", &urls);
    assert_eq!(press.source_type, SourceType::ThirdParty);
    assert_eq!(press.reason, ClassificationReason::NoMatch);
}

#[test]
fn same_domain_candidates_collapse() {
    let resolution = resolve(
        None,
        &strings(&["https://trust.newco.com/a", "https://trust.newco.com/b"]),
        "NewCo",
        &CandidateAnalyzer::default(),
    );
    assert_eq!(resolution.candidates.len(), 1);
    assert_eq!(
        resolution.candidates[0].normalized_domain.as_deref(),
        Some("trust.newco.com")
    );
}

#[test]
fn status_pages_never_resolve() {
    let analyzer = CandidateAnalyzer::default();
    let discovered = strings(&[
        "https://status.newco.com",
        "https://status.newco.com/history",
        "https://status.other.io/incidents",
    ]);
    let resolution = resolve(None, &discovered, "NewCo", &analyzer);
    assert!(resolution.urls.is_empty());
    assert!(
        resolution
            .candidates
            .iter()
            .all(|c| c.candidate_type != CandidateType::StatusPage)
    );
}

#[test]
fn novel_vendor_end_to_end() {
    let analyzer = CandidateAnalyzer::default();
    let discovered = strings(&[
        "https://trust.newco.com/certifications",
        "https://techcrunch.com/newco-funding",
    ]);

    // First pass, before any effective set exists.
    let early = classify("https://trust.newco.com/soc2", &[]);
    assert_eq!(early.source_type, SourceType::ThirdParty);

    let effective = resolve_effective_urls(None, &discovered, "NewCo", &analyzer);
    let domains: Vec<_> = effective
        .iter()
        .filter_map(|u| normalize_domain(&u.url))
        .collect();
    assert_eq!(domains, vec!["trust.newco.com".to_string()]);

    let soc2 = classify("https://trust.newco.com/soc2", &effective);
    assert_eq!(soc2.source_type, SourceType::Vendor);
    let press = classify("https://techcrunch.com/newco", &effective);
    assert_eq!(press.source_type, SourceType::ThirdParty);
}

#[test]
fn registry_resolution_wins_over_candidates() {
    let mut entry = VendorRegistryEntry::new("Tabnine");
    entry.set_url(UrlType::SecurityPage, "https://www.tabnine.com/security");
    let resolution = resolve(
        Some(&entry),
        &strings(&["https://trust.tabnine.com/certifications"]),
        "Tabnine",
        &CandidateAnalyzer::default(),
    );
    assert_eq!(resolution.source, UrlSource::Registry);

    let c = classify("https://trust.tabnine.com/soc2", &resolution.urls);
    assert_eq!(c.source_type, SourceType::ThirdParty);
}
