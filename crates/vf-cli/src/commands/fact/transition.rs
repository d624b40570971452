use chrono::Utc;
use serde::Serialize;
use vf_core::entities::VendorFact;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

pub async fn stale(
    id: &str,
    by: &str,
    notes: Option<&str>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let fact = ctx.service.mark_stale(id, by, notes).await?;
    output(&fact, flags.format)
}

#[derive(Debug, Serialize)]
struct SweepResponse {
    marked_stale: usize,
    facts: Vec<VendorFact>,
}

pub async fn sweep(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let facts = ctx.service.sweep_expired(Utc::now()).await?;
    tracing::info!(count = facts.len(), "expired facts marked stale");
    output(
        &SweepResponse {
            marked_stale: facts.len(),
            facts,
        },
        flags.format,
    )
}
