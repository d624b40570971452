use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use vf_audit::{AuditReview, CrossChecker};
use vf_core::entities::AuditResult;
use vf_core::payloads::ExtractionBatch;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::AuditArgs;
use crate::output::output;

#[derive(Debug, Serialize)]
struct AuditResponse {
    audit: AuditResult,
    /// Entries of the facts file that could not be used.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    extraction_notes: Vec<String>,
}

/// Handle `vfc audit`. Pure; never opens the store.
pub async fn handle(args: &AuditArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let batch = ExtractionBatch::parse_lenient(&read(&args.facts).await?);
    let report = read(&args.report).await?;
    let checker = CrossChecker::default();

    let audit = match &args.review {
        Some(path) => checker.reconcile(&batch.facts, &AuditReview::parse_lenient(&read(path).await?)),
        None => checker.check(&batch.facts, &report),
    };
    output(
        &AuditResponse {
            audit,
            extraction_notes: batch.notes,
        },
        flags.format,
    )
}

async fn read(path: &Path) -> anyhow::Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}
