//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for CASL using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// CASL - SUDOC/Alma holdings reconciliation
#[derive(Parser, Debug)]
#[command(name = "casl")]
#[command(version, about, long_about = None)]
#[command(author = "CASL Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "casl.toml", env = "CASL_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "CASL_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare SUDOC and Alma holdings for a list of PPNs
    Reconcile(commands::reconcile::ReconcileArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_cli_parse_reconcile() {
        let cli = Cli::parse_from(["casl", "reconcile", "ppn.txt", "more.txt"]);
        assert_eq!(cli.config, "casl.toml");
        match cli.command {
            Commands::Reconcile(args) => {
                assert_eq!(
                    args.files,
                    vec![PathBuf::from("ppn.txt"), PathBuf::from("more.txt")]
                );
                assert!(!args.complete_only);
                assert!(args.concurrency.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_reconcile_requires_files() {
        assert!(Cli::try_parse_from(["casl", "reconcile"]).is_err());
    }

    #[test]
    fn test_cli_parse_reconcile_overrides() {
        let cli = Cli::parse_from([
            "casl",
            "reconcile",
            "--concurrency",
            "8",
            "--complete-only",
            "-o",
            "reports",
            "ppn.txt",
        ]);
        match cli.command {
            Commands::Reconcile(args) => {
                assert_eq!(args.concurrency, Some(8));
                assert!(args.complete_only);
                assert_eq!(args.output_dir.as_deref(), Some("reports"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["casl", "--config", "custom.toml", "reconcile", "ppn.txt"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["casl", "--log-level", "debug", "validate-config"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["casl", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["casl", "init", "--with-examples"]);
        assert!(matches!(cli.command, Commands::Init(ref args) if args.with_examples));
    }
}
