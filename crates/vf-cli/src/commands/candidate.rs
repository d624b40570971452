use serde::Serialize;
use vf_core::entities::{CandidateVendorUrl, VendorRegistryEntry};
use vf_core::enums::CandidateStatus;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::CandidateCommands;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct PromoteResponse {
    candidate: CandidateVendorUrl,
    registry: VendorRegistryEntry,
}

/// Handle `vfc candidate`.
pub async fn handle(
    action: &CandidateCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        CandidateCommands::List { vendor, status } => {
            let status = status
                .as_deref()
                .map(|raw| parse_enum::<CandidateStatus>(raw, "status"))
                .transpose()?;
            let candidates = ctx.service.list_candidates(vendor.as_deref(), status).await?;
            output(&candidates, flags.format)
        }
        CandidateCommands::Review {
            id,
            decision,
            by,
            notes,
        } => {
            let decision = parse_enum::<CandidateStatus>(decision, "decision")?;
            let candidate = ctx
                .service
                .review_candidate(id, decision, by, notes.as_deref())
                .await?;
            output(&candidate, flags.format)
        }
        CandidateCommands::Promote { id, by } => {
            let (candidate, registry) = ctx.service.promote_candidate(id, by).await?;
            output(
                &PromoteResponse {
                    candidate,
                    registry,
                },
                flags.format,
            )
        }
    }
}
