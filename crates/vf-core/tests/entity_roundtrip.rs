//! Serde roundtrip and JsonSchema validation tests for entity types.

use chrono::Utc;
use schemars::schema_for;
use vf_core::entities::*;
use vf_core::enums::*;
use vf_core::payloads::*;

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(
                recovered,
                val,
                "serde roundtrip failed for {}",
                stringify!($ty)
            );

            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

fn soc2_fact() -> ExtractedFact {
    ExtractedFact {
        category: FactCategory::Certification,
        key: "soc2_type2".into(),
        value: "SOC 2 Type II".into(),
        source_url: Some("https://trust.tabnine.com/soc2".into()),
        source_title: Some("Tabnine Trust Center".into()),
        source_snippet: Some("Tabnine maintains SOC 2 Type II".into()),
        confidence: 0.9,
        details: Some(FactDetails::Certification(CertificationDetails {
            standard: "SOC 2 Type II".into(),
            status: Some("active".into()),
            scope: None,
            audit_date: Some("2025-11-30".into()),
            report_available: Some(true),
        })),
    }
}

roundtrip_and_validate!(
    vendor_fact_roundtrip,
    VendorFact,
    VendorFact {
        id: "fct-a3f8b2c1".into(),
        vendor_name: "Tabnine".into(),
        product_name: "Tabnine Enterprise".into(),
        fact_category: FactCategory::DataHandling,
        fact_key: "training_policy".into(),
        value: "Does not train on customer code".into(),
        details: Some(FactDetails::DataHandling(DataHandlingDetails {
            trains_on_customer_data: Some(false),
            retention_days: Some(0),
            regions: vec!["us".into(), "eu".into()],
            subprocessors: Vec::new(),
        })),
        context: None,
        source_url: Some("https://www.tabnine.com/privacy".into()),
        source_title: None,
        source_snippet: None,
        source_type: SourceType::Vendor,
        verification_status: VerificationStatus::Verified,
        confidence_score: 0.9,
        ttl_days: 14,
        verified_at: Some(Utc::now()),
        verified_by: Some("source_recheck".into()),
        research_log_id: Some("rsl-11aa22bb".into()),
        expires_at: Some(Utc::now()),
        source_last_checked_at: None,
        source_last_status: Some(SourceStatus::NotFound),
        recheck_count: 2,
        next_recheck_at: None,
        recheck_priority: 9,
        first_found_at: Utc::now(),
        last_updated_at: Utc::now(),
        superseded_by: None,
        version: 3,
    }
);

roundtrip_and_validate!(
    verification_log_roundtrip,
    FactVerificationLogEntry,
    FactVerificationLogEntry {
        id: "vlg-0f0f0f0f".into(),
        fact_id: "fct-a3f8b2c1".into(),
        action: VerificationAction::Rechecked,
        previous_value: Some("SOC 2 Type I".into()),
        new_value: Some("SOC 2 Type II".into()),
        previous_status: Some(VerificationStatus::Stale),
        new_status: VerificationStatus::Verified,
        method: VerificationMethod::SourceRecheck,
        http_status: Some(200),
        performed_by: Some("vfc".into()),
        confidence_delta: Some(0.3),
        notes: None,
        research_log_id: None,
        created_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    candidate_roundtrip,
    CandidateVendorUrl,
    CandidateVendorUrl {
        id: "cnd-12345678".into(),
        vendor_name: "NewCo".into(),
        url: "https://trust.newco.com/certifications".into(),
        normalized_domain: "trust.newco.com".into(),
        candidate_type: CandidateType::TrustCenter,
        confidence: 0.7,
        status: CandidateStatus::Pending,
        reviewed_by: None,
        notes: None,
        discovered_at: Utc::now(),
        updated_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    registry_roundtrip,
    VendorRegistryEntry,
    VendorRegistryEntry {
        vendor_name: "Tabnine".into(),
        aliases: vec!["Codota".into()],
        trust_center: Some("https://trust.tabnine.com".into()),
        security_page: Some("https://www.tabnine.com/security".into()),
        privacy_page: None,
        pricing_page: None,
        docs: Some("https://docs.tabnine.com".into()),
        updated_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    audit_result_roundtrip,
    AuditResult,
    AuditResult {
        total_facts: 10,
        facts_in_report: 8,
        dropped_facts: vec![DroppedFact {
            fact: soc2_fact(),
            reason: "not mentioned in report".into(),
            severity: Severity::Medium,
        }],
        unsupported_claims: vec![UnsupportedClaim {
            claim: "Tabnine is FedRAMP High authorized.".into(),
            location: "paragraph 2, sentence 1".into(),
            severity: Severity::High,
        }],
        inclusion_rate: 0.8,
        drop_penalty: 0.1,
        hallucination_penalty: 0.1,
        confidence_score: 0.6,
        confidence_level: ConfidenceLevel::Medium,
        notes: Vec::new(),
    }
);

roundtrip_and_validate!(
    research_log_roundtrip,
    ResearchLog,
    ResearchLog {
        id: "rsl-11aa22bb".into(),
        vendor_name: "Tabnine".into(),
        product_name: String::new(),
        mode: ResearchMode::Full,
        started_at: Utc::now(),
        completed_at: None,
        total_facts: 0,
        facts_in_report: 0,
        dropped_count: 0,
        unsupported_count: 0,
        confidence_score: None,
        confidence_level: None,
        audit: None,
        cancelled: false,
    }
);

roundtrip_and_validate!(extracted_fact_roundtrip, ExtractedFact, soc2_fact());

#[test]
fn fact_details_are_tagged_by_kind() {
    let details = FactDetails::Contract(ContractDetails {
        available: Some(true),
        tier: Some("enterprise".into()),
        conditions: None,
    });
    let json = serde_json::to_value(&details).unwrap();
    assert_eq!(json["kind"], "contract");
    assert_eq!(details.category(), FactCategory::Contract);
}
