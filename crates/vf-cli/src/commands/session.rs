use crate::cli::GlobalFlags;
use crate::cli::subcommands::SessionCommands;
use crate::commands::shared::limit::effective_limit;
use crate::context::AppContext;
use crate::output::output;

/// Handle `vfc session`.
pub async fn handle(
    action: &SessionCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        SessionCommands::List { vendor, limit } => {
            let limit = effective_limit(*limit, flags.limit, 20);
            let logs = ctx
                .service
                .list_research_logs(vendor.as_deref(), limit)
                .await?;
            output(&logs, flags.format)
        }
        SessionCommands::Get { id } => output(&ctx.service.get_research_log(id).await?, flags.format),
    }
}
