//! Reconcile command implementation
//!
//! This module implements the `reconcile` command: read PPN files, compare
//! SUDOC and Alma holdings and write the anomaly report.

use crate::adapters::input::read_identifiers;
use crate::config::{load_config, RecordPolicy};
use crate::core::reconcile::{ReconcileCoordinator, ReconcileSummary};
use clap::Args;
use std::path::PathBuf;
use tokio::sync::watch;

/// Failures listed on the console before truncation
const SHOWN_FAILURES: usize = 10;

/// Arguments for the reconcile command
#[derive(Args, Debug)]
pub struct ReconcileArgs {
    /// Files holding one PPN per line
    #[arg(required = true, value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Override the report directory
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Override the maximum number of fetches in flight
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Leave out PPNs whose SUDOC or Alma holdings could not be fetched
    #[arg(long)]
    pub complete_only: bool,
}

impl ReconcileArgs {
    /// Execute the reconcile command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting reconcile command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        // Apply CLI overrides
        if let Some(dir) = &self.output_dir {
            tracing::info!(directory = %dir, "Overriding output directory from CLI");
            config.output.directory = dir.clone();
        }
        if let Some(concurrency) = self.concurrency {
            tracing::info!(concurrency, "Overriding max concurrency from CLI");
            config.dispatch.max_concurrency = concurrency;
        }
        if self.complete_only {
            config.dispatch.record_policy = RecordPolicy::Complete;
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let batch = match read_identifiers(&self.files) {
            Ok(batch) => batch,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read identifiers");
                eprintln!("Failed to read identifiers: {e}");
                return Ok(2);
            }
        };
        if batch.invalid > 0 {
            println!("⚠️  {} invalid PPN line(s) skipped", batch.invalid);
        }
        if batch.is_empty() {
            tracing::error!(invalid = batch.invalid, "No valid PPN in the identifier files");
            eprintln!("No valid PPN to reconcile.");
            return Ok(2);
        }

        tracing::info!("Creating reconcile coordinator");
        let coordinator = match ReconcileCoordinator::new(&config, shutdown_signal).await {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create reconcile coordinator");
                eprintln!("Failed to initialize reconciliation: {e}");
                return Ok(4);
            }
        };

        println!("🚀 Reconciling {} PPN(s)...", batch.len());
        println!();

        let summary = match coordinator.execute(batch.identifiers).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Reconciliation failed");
                eprintln!("Reconciliation failed: {e}");
                return Ok(5);
            }
        };

        summary.log_summary();
        print_summary(&summary);
        Ok(exit_code(&summary))
    }
}

fn print_summary(summary: &ReconcileSummary) {
    println!("📊 Reconciliation Summary:");
    println!("  PPNs: {}", summary.total_identifiers);
    println!("  Compared: {}", summary.compared_records);
    println!("  Missing in Alma: {}", summary.missing_in_target);
    println!("  Missing in SUDOC: {}", summary.missing_in_source);
    println!("  Electronic excluded: {}", summary.electronic_excluded);
    if summary.unclassified_identifiers > 0 {
        println!("  Not classified: {}", summary.unclassified_identifiers);
    }
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    if let Some(path) = &summary.report_path {
        println!("  Report: {}", path.display());
    }
    println!();

    if !summary.failures.is_empty() {
        println!("⚠️  Fetch failures: {}", summary.failures.len());
        for failure in summary.failures.iter().take(SHOWN_FAILURES) {
            println!(
                "  - {} ({}, {}): {}",
                failure.identifier, failure.side, failure.kind, failure.message
            );
        }
        if summary.failures.len() > SHOWN_FAILURES {
            println!("    ... and {} more", summary.failures.len() - SHOWN_FAILURES);
        }
        println!();
    }
}

/// Process exit code for a finished run
pub fn exit_code(summary: &ReconcileSummary) -> i32 {
    if summary.interrupted {
        println!("⚠️  Reconciliation interrupted, report covers completed PPNs only.");
        130
    } else if summary.is_successful() {
        println!("✅ Reconciliation completed successfully!");
        0
    } else {
        println!("⚠️  Reconciliation completed with fetch failures");
        1
    }
}
