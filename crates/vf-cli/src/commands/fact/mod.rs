mod list;
mod transition;

use chrono::Utc;
use vf_core::entities::FactKey;
use vf_core::enums::{FactCategory, VerificationMethod};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::FactCommands;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `vfc fact`.
pub async fn handle(action: &FactCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        FactCommands::List {
            vendor,
            product,
            category,
            status,
            history,
            limit,
        } => {
            let filter = list::build_filter(
                vendor.as_deref(),
                product.as_deref(),
                category.as_deref(),
                status.as_deref(),
                *history,
                effective_limit(*limit, flags.limit, 50),
            )?;
            output(&ctx.service.list_facts(&filter).await?, flags.format)
        }
        FactCommands::Get { id } => output(&ctx.service.get_fact(id).await?, flags.format),
        FactCommands::History {
            vendor,
            category,
            key,
            product,
        } => {
            let key = FactKey::new(
                vendor.as_str(),
                product.as_str(),
                parse_enum::<FactCategory>(category, "category")?,
                key.as_str(),
            );
            output(&ctx.service.fact_history(&key).await?, flags.format)
        }
        FactCommands::Log { id } => output(&ctx.service.fact_log(id).await?, flags.format),
        FactCommands::Verify { id, by, method } => {
            let method = parse_enum::<VerificationMethod>(method, "method")?;
            let fact = ctx.service.verify_fact(id, by, method, None).await?;
            output(&fact, flags.format)
        }
        FactCommands::Dispute {
            id,
            value,
            by,
            notes,
        } => {
            let outcome = ctx
                .service
                .dispute_fact(id, value.as_deref(), by, notes.as_deref())
                .await?;
            output(&outcome, flags.format)
        }
        FactCommands::Stale { id, by, notes } => {
            transition::stale(id, by, notes.as_deref(), ctx, flags).await
        }
        FactCommands::Due { limit } => {
            let limit = effective_limit(*limit, flags.limit, 50);
            let due = ctx
                .service
                .list_due_for_recheck(Utc::now(), usize::try_from(limit)?)
                .await?;
            output(&due, flags.format)
        }
        FactCommands::Sweep => transition::sweep(ctx, flags).await,
    }
}
