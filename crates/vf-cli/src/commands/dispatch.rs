use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Classify(args) => commands::classify::handle(&args, ctx, flags).await,
        Commands::Resolve(args) => commands::resolve::handle(&args, ctx, flags).await,
        Commands::Fact { action } => commands::fact::handle(&action, ctx, flags).await,
        Commands::Candidate { action } => commands::candidate::handle(&action, ctx, flags).await,
        Commands::Registry { action } => commands::registry::handle(&action, ctx, flags).await,
        Commands::Recheck(args) => commands::recheck::handle(&args, ctx, flags).await,
        Commands::Session { action } => commands::session::handle(&action, ctx, flags).await,
        Commands::Analyze(_) | Commands::Audit(_) => {
            unreachable!("analyze/audit are pre-dispatched in main")
        }
    }
}
