use serde::Serialize;
use vf_classify::{CandidateAnalyzer, Resolution, UrlSource, resolve};
use vf_core::entities::CandidateVendorUrl;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ResolveArgs;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct ResolveResponse {
    vendor_name: String,
    #[serde(flatten)]
    resolution: Resolution,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    recorded: Vec<CandidateVendorUrl>,
}

/// Handle `vfc resolve`.
pub async fn handle(args: &ResolveArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let entry = ctx.service.lookup_registry(&args.vendor).await?;
    let resolution = resolve(
        entry.as_ref(),
        &args.discovered,
        &args.vendor,
        &CandidateAnalyzer::default(),
    );

    let mut recorded = Vec::new();
    if args.record && resolution.source == UrlSource::Candidates {
        for candidate in &resolution.candidates {
            let Some(domain) = candidate.normalized_domain.as_deref() else {
                continue;
            };
            recorded.push(
                ctx.service
                    .record_candidate(
                        &args.vendor,
                        &candidate.url,
                        domain,
                        candidate.candidate_type,
                        candidate.confidence,
                    )
                    .await?,
            );
        }
    }

    output(
        &ResolveResponse {
            vendor_name: entry.map_or_else(|| args.vendor.clone(), |e| e.vendor_name),
            resolution,
            recorded,
        },
        flags.format,
    )
}
