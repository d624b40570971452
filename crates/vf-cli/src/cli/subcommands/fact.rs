use clap::Subcommand;

/// Vendor fact commands.
#[derive(Clone, Debug, Subcommand)]
pub enum FactCommands {
    /// List facts.
    List {
        #[arg(long)]
        vendor: Option<String>,
        #[arg(long)]
        product: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        status: Option<String>,
        /// Include superseded rows.
        #[arg(long)]
        history: bool,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Get a fact by ID.
    Get { id: String },
    /// Every row stored for one key, oldest first.
    History {
        vendor: String,
        category: String,
        key: String,
        #[arg(long, default_value = "")]
        product: String,
    },
    /// Verification log of a fact.
    Log { id: String },
    /// Mark a fact verified.
    Verify {
        id: String,
        #[arg(long, default_value = "analyst")]
        by: String,
        #[arg(long, default_value = "manual")]
        method: String,
    },
    /// Flag a fact as disputed, optionally recording the conflicting value.
    Dispute {
        id: String,
        #[arg(long)]
        value: Option<String>,
        #[arg(long, default_value = "analyst")]
        by: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Mark a fact stale.
    Stale {
        id: String,
        #[arg(long, default_value = "analyst")]
        by: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Facts due for a recheck.
    Due {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Mark every expired verified fact stale.
    Sweep,
}
