use clap::Subcommand;

/// Research session log commands.
#[derive(Clone, Debug, Subcommand)]
pub enum SessionCommands {
    /// List research sessions, newest first.
    List {
        #[arg(long)]
        vendor: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Get a research session by ID.
    Get { id: String },
}
