use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::cli::subcommands::{
    CandidateCommands, FactCommands, RegistryCommands, SessionCommands,
};

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Classify a source URL as vendor or third-party.
    Classify(ClassifyArgs),
    /// Guess whether URLs are authoritative vendor pages.
    Analyze(AnalyzeArgs),
    /// Resolve the effective URL set for a vendor.
    Resolve(ResolveArgs),
    /// Cross-check a report against the facts it was written from.
    Audit(AuditArgs),
    /// Cached vendor facts.
    Fact {
        #[command(subcommand)]
        action: FactCommands,
    },
    /// Discovered candidate URLs awaiting review.
    Candidate {
        #[command(subcommand)]
        action: CandidateCommands,
    },
    /// Authoritative vendor URL registry.
    Registry {
        #[command(subcommand)]
        action: RegistryCommands,
    },
    /// Research a vendor: serve fresh facts, recheck expired ones over HTTP,
    /// hand the rest to discovery.
    Recheck(RecheckArgs),
    /// Past research sessions.
    Session {
        #[command(subcommand)]
        action: SessionCommands,
    },
}

#[derive(Clone, Debug, Args)]
pub struct ClassifyArgs {
    /// URL to classify.
    pub url: String,

    /// Authoritative vendor URL as `type=url` (repeatable).
    #[arg(long = "vendor-url")]
    pub vendor_urls: Vec<String>,

    /// Classify against this vendor's registry entry instead.
    #[arg(long, conflicts_with = "vendor_urls")]
    pub vendor: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct AnalyzeArgs {
    /// URLs to analyze.
    #[arg(required = true)]
    pub urls: Vec<String>,
}

#[derive(Clone, Debug, Args)]
pub struct ResolveArgs {
    pub vendor: String,

    /// URL seen during research (repeatable).
    #[arg(long = "discovered")]
    pub discovered: Vec<String>,

    /// Record surviving candidates for a vendor with no registry entry.
    #[arg(long)]
    pub record: bool,
}

#[derive(Clone, Debug, Args)]
pub struct AuditArgs {
    /// JSON file with the extracted facts (an array or `{"facts": [...]}`).
    #[arg(long)]
    pub facts: PathBuf,

    /// Report text to check.
    #[arg(long)]
    pub report: PathBuf,

    /// Reviewer findings to reconcile instead of running detection.
    #[arg(long)]
    pub review: Option<PathBuf>,
}

#[derive(Clone, Debug, Args)]
pub struct RecheckArgs {
    #[arg(required_unless_present = "due")]
    pub vendor: Option<String>,

    #[arg(long, default_value = "")]
    pub product: String,

    /// Research mode: cached or full (defaults to `research.default_mode`).
    #[arg(long)]
    pub mode: Option<String>,

    /// Key to research as `category:key` (repeatable; defaults to the standard set).
    #[arg(long = "key")]
    pub keys: Vec<String>,

    /// Extraction JSON to use as the discovery result for gaps.
    #[arg(long)]
    pub extraction: Option<PathBuf>,

    /// Report written from the extraction, audited when given.
    #[arg(long, requires = "extraction")]
    pub report: Option<PathBuf>,

    /// Recheck every due fact across vendors instead of one vendor.
    #[arg(long, conflicts_with_all = ["vendor", "keys", "extraction", "mode"])]
    pub due: bool,
}
