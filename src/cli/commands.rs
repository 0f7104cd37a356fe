//! CLI argument definitions.
//!
//! This module defines the command-line surface using clap.

use clap::Parser;
use std::path::PathBuf;

/// tfremap - turn Terraform destroy/create pairs into moves.
///
/// tfremap plans each module, matches resources Terraform plans to delete
/// with resources it plans to create, and writes the resulting moves as
/// `moved` blocks or `terraform state mv` commands.
#[derive(Parser, Debug)]
#[command(name = "tfremap")]
#[command(author, version, about)]
pub struct Cli {
    /// Module directories to plan and reconcile. Defaults to the current
    /// directory.
    #[arg(value_name = "MODULE")]
    pub modules: Vec<PathBuf>,

    /// Ignore differences based on a rule (kind:type:key[:parameter]).
    /// May be repeated.
    #[arg(long = "ignore", value_name = "RULE")]
    pub ignore: Vec<String>,

    /// Output format of moves.
    #[arg(short, long, value_enum, default_value = "blocks")]
    pub output: OutputFormat,

    /// Terraform binary to use.
    #[arg(long, default_value = "terraform", env = "TFREMAP_TERRAFORM_BIN")]
    pub terraform_bin: String,

    /// Skip running terraform init.
    #[arg(short = 's', long)]
    pub skip_init: bool,

    /// Skip running terraform refresh.
    #[arg(short = 'S', long)]
    pub skip_refresh: bool,

    /// Suppress all human-readable output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase explanation verbosity (can be specified multiple times).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable color in output.
    #[arg(long)]
    pub no_color: bool,
}

/// How resolved moves are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Append `moved` blocks to a moves.tf file in the module directory.
    /// Only valid for single-module invocations.
    #[default]
    Blocks,
    /// Write `terraform state mv` commands to standard output. Supports
    /// moves between modules.
    Commands,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["tfremap"]);

        assert!(cli.modules.is_empty());
        assert!(cli.ignore.is_empty());
        assert_eq!(cli.output, OutputFormat::Blocks);
        assert_eq!(cli.terraform_bin, "terraform");
        assert!(!cli.skip_init);
        assert!(!cli.skip_refresh);
        assert!(!cli.quiet);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_parse_full_invocation() {
        let cli = Cli::parse_from([
            "tfremap",
            "--ignore=everything:random_pet:length",
            "--ignore=whitespace:aws_iam_policy:policy",
            "-o",
            "commands",
            "--terraform-bin=terragrunt",
            "-sS",
            "-vv",
            "envs/staging",
            "envs/production",
        ]);

        assert_eq!(cli.modules.len(), 2);
        assert_eq!(cli.ignore.len(), 2);
        assert_eq!(cli.output, OutputFormat::Commands);
        assert_eq!(cli.terraform_bin, "terragrunt");
        assert!(cli.skip_init);
        assert!(cli.skip_refresh);
        assert_eq!(cli.verbose, 2);
    }
}
