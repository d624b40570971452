use std::sync::Arc;

use chrono::Utc;
use vf_core::enums::ResearchMode;
use vf_research::{CancellationFlag, ResearchRequest, Researcher, SessionSettings};

use crate::checker::HttpSourceChecker;
use crate::cli::GlobalFlags;
use crate::cli::root_commands::RecheckArgs;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::{parse_enum, parse_research_key};
use crate::context::AppContext;
use crate::discovery::FileDiscovery;
use crate::output::output;

/// Handle `vfc recheck`.
pub async fn handle(args: &RecheckArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let checker = HttpSourceChecker::new(&ctx.config.http)?;
    let discovery = FileDiscovery::new(args.extraction.clone(), args.report.clone());
    let researcher = Researcher::new(
        Arc::clone(&ctx.service),
        Arc::new(checker),
        Arc::new(discovery),
        SessionSettings::from_config(&ctx.config.research),
    );

    let cancel = CancellationFlag::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupted, finishing work in flight");
                cancel.cancel();
            }
        })
    };

    let result = run(args, &researcher, ctx, flags, &cancel).await;
    interrupt.abort();
    result
}

async fn run(
    args: &RecheckArgs,
    researcher: &Researcher,
    ctx: &AppContext,
    flags: &GlobalFlags,
    cancel: &CancellationFlag,
) -> anyhow::Result<()> {
    if args.due {
        let limit = effective_limit(None, flags.limit, 50);
        let run = researcher
            .recheck_due(Utc::now(), usize::try_from(limit)?, cancel)
            .await?;
        return output(&run, flags.format);
    }

    let Some(vendor) = args.vendor.as_deref() else {
        anyhow::bail!("a vendor is required unless --due is given");
    };
    let request = build_request(args, vendor, ctx.config.research.default_mode)?;
    let report = researcher.run(&request, cancel).await?;
    output(&report, flags.format)
}

fn build_request(
    args: &RecheckArgs,
    vendor: &str,
    default_mode: ResearchMode,
) -> anyhow::Result<ResearchRequest> {
    let mode = args
        .mode
        .as_deref()
        .map(|raw| parse_enum::<ResearchMode>(raw, "mode"))
        .transpose()?
        .unwrap_or(default_mode);
    let keys = args
        .keys
        .iter()
        .map(|raw| parse_research_key(raw))
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(ResearchRequest::new(vendor, args.product.as_str(), mode).with_keys(keys))
}
