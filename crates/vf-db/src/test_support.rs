//! Shared test utilities for vf-db unit tests.

#[cfg(test)]
pub(crate) mod helpers {
    use vf_core::entities::{FactKey, NewFact};
    use vf_core::enums::{FactCategory, SourceType};

    use crate::FactDb;
    use crate::service::FactService;
    use crate::trail::writer::TrailWriter;

    /// Create an in-memory `FactService` with trail disabled (for pure DB tests).
    pub async fn test_service() -> FactService {
        let db = FactDb::open_local(":memory:").await.unwrap();
        FactService::from_db(db, TrailWriter::disabled())
    }

    /// Create an in-memory `FactService` with trail enabled writing to a temp dir.
    pub async fn test_service_with_trail(trail_dir: std::path::PathBuf) -> FactService {
        let db = FactDb::open_local(":memory:").await.unwrap();
        let trail = TrailWriter::new(trail_dir).unwrap();
        FactService::from_db(db, trail)
    }

    /// An extracted Tabnine fact, filed under the category its key belongs to.
    pub fn extracted(key: &str, value: &str, source_type: SourceType) -> NewFact {
        let category = match key {
            k if k.starts_with("soc2") || k == "iso27001" => FactCategory::Certification,
            "hipaa_baa" => FactCategory::Contract,
            "training_policy" | "data_retention" | "data_residency" => FactCategory::DataHandling,
            "breach_history" => FactCategory::SecurityIncident,
            _ => FactCategory::General,
        };
        NewFact {
            key: FactKey::new("Tabnine", "Tabnine Enterprise", category, key),
            value: value.into(),
            details: None,
            context: None,
            source_url: Some("https://www.tabnine.com/security".into()),
            source_title: Some("Tabnine Security".into()),
            source_snippet: None,
            source_type,
            confidence: 0.8,
        }
    }
}
