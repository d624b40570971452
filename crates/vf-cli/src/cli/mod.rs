use std::path::PathBuf;

use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `vfc` binary.
#[derive(Debug, Parser)]
#[command(
    name = "vfc",
    version,
    about = "Vendor fact verification and caching engine"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Max results to return
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file layered above the standard config files
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Fact store path, overriding `store.db_path`
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,
}

impl Cli {
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            limit: self.limit,
            quiet: self.quiet,
            verbose: self.verbose,
            config: self.config.clone(),
            db: self.db.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::subcommands::{CandidateCommands, FactCommands};
    use super::{Cli, Commands, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from([
            "vfc",
            "--format",
            "table",
            "--limit",
            "10",
            "--verbose",
            "fact",
            "due",
        ])
        .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Table);
        assert_eq!(cli.limit, Some(10));
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Fact {
                action: FactCommands::Due { .. }
            }
        ));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["vfc", "candidate", "list", "--format", "raw", "--quiet"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.quiet);
        assert!(matches!(
            cli.command,
            Commands::Candidate {
                action: CandidateCommands::List { .. }
            }
        ));
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        let parsed = Cli::try_parse_from(["vfc", "--format", "xml", "fact", "due"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn classify_takes_repeated_vendor_urls() {
        let cli = Cli::try_parse_from([
            "vfc",
            "classify",
            "https://trust.tabnine.com/soc2",
            "--vendor-url",
            "trust_center=https://trust.tabnine.com",
            "--vendor-url",
            "security_page=https://www.tabnine.com/security",
        ])
        .expect("cli should parse");
        let Commands::Classify(args) = cli.command else {
            panic!("expected classify");
        };
        assert_eq!(args.vendor_urls.len(), 2);
    }

    #[test]
    fn recheck_needs_a_vendor_unless_sweeping_due_facts() {
        assert!(Cli::try_parse_from(["vfc", "recheck"]).is_err());
        assert!(Cli::try_parse_from(["vfc", "recheck", "--due"]).is_ok());
        let cli = Cli::try_parse_from([
            "vfc",
            "recheck",
            "Tabnine",
            "--key",
            "contract:hipaa_baa",
            "--mode",
            "full",
        ])
        .expect("cli should parse");
        let Commands::Recheck(args) = cli.command else {
            panic!("expected recheck");
        };
        assert_eq!(args.vendor.as_deref(), Some("Tabnine"));
        assert_eq!(args.keys, vec!["contract:hipaa_baa".to_string()]);
    }
}
