//! Discovery from files produced by an external extraction run.
//!
//! `vfc` does no searching of its own. Gaps are answered from an extraction
//! JSON file (and optionally the report written from it); without one, the
//! session records the gaps as unfilled.

use std::path::PathBuf;

use async_trait::async_trait;
use vf_core::payloads::ExtractionBatch;
use vf_research::{DiscoveryAgent, DiscoveryRequest, DiscoveryResponse, ResearchError};

pub struct FileDiscovery {
    extraction: Option<PathBuf>,
    report: Option<PathBuf>,
}

impl FileDiscovery {
    pub const fn new(extraction: Option<PathBuf>, report: Option<PathBuf>) -> Self {
        Self { extraction, report }
    }
}

#[async_trait]
impl DiscoveryAgent for FileDiscovery {
    async fn discover(&self, request: &DiscoveryRequest) -> Result<DiscoveryResponse, ResearchError> {
        let Some(path) = &self.extraction else {
            return Err(ResearchError::Discovery(format!(
                "no extraction file for {} gaps",
                request.gaps.len()
            )));
        };
        let body = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ResearchError::Discovery(format!("{}: {e}", path.display())))?;
        let report = match &self.report {
            Some(path) => Some(
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| ResearchError::Discovery(format!("{}: {e}", path.display())))?,
            ),
            None => None,
        };

        let batch = ExtractionBatch::parse_lenient(&body);
        tracing::debug!(
            vendor = %request.vendor_name,
            facts = batch.facts.len(),
            skipped = batch.notes.len(),
            "extraction file loaded"
        );
        Ok(DiscoveryResponse::from_extraction(batch, Vec::new(), report))
    }
}
