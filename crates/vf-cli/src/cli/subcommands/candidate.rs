use clap::Subcommand;

/// Candidate URL commands.
#[derive(Clone, Debug, Subcommand)]
pub enum CandidateCommands {
    /// List candidates.
    List {
        #[arg(long)]
        vendor: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Confirm or reject a pending candidate.
    Review {
        id: String,
        /// confirmed or rejected
        #[arg(long)]
        decision: String,
        #[arg(long, default_value = "analyst")]
        by: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Write a confirmed candidate into the vendor registry.
    Promote {
        id: String,
        #[arg(long, default_value = "analyst")]
        by: String,
    },
}
