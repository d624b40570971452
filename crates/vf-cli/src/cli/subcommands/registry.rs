use clap::Subcommand;

/// Vendor registry commands.
#[derive(Clone, Debug, Subcommand)]
pub enum RegistryCommands {
    /// Look up a vendor by name or alias.
    Get { name: String },
    /// List registered vendors.
    List,
    /// Create a vendor or update its aliases and URLs.
    Set {
        vendor: String,
        /// Alias (repeatable; replaces the stored list).
        #[arg(long = "alias")]
        aliases: Vec<String>,
        /// URL as `type=url` (repeatable); an empty url clears the slot.
        #[arg(long = "url")]
        urls: Vec<String>,
    },
}
