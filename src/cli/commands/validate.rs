//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the CASL configuration file.

use crate::config::load_config;
use clap::Args;
use std::path::Path;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading also validates
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Mapping File: {}", config.mapping.file_path);
        println!("  SUDOC: {}", config.sudoc.base_url);
        println!("  ILNs: {:?}", config.sudoc.ilns);
        println!("  Ignored RCRs: {}", config.sudoc.ignored_rcrs.len());
        println!(
            "  Multi-building RCRs: {}",
            config.sudoc.multi_building_rcrs.len()
        );
        println!("  Alma: {}", config.alma.base_url);
        println!(
            "  Excluded Process Codes: {:?}",
            config.alma.excluded_process_codes
        );
        println!("  Max Concurrency: {}", config.dispatch.max_concurrency);
        println!(
            "  SUDOC Rate: {} / {}ms",
            config.dispatch.source_rate.requests, config.dispatch.source_rate.period_ms
        );
        println!(
            "  Alma Rate: {} / {}ms",
            config.dispatch.target_rate.requests, config.dispatch.target_rate.period_ms
        );
        println!("  Record Policy: {:?}", config.dispatch.record_policy);
        println!("  Exclude Electronic: {}", config.filter.exclude_electronic);
        println!("  Output Directory: {}", config.output.directory);

        if !Path::new(&config.mapping.file_path).exists() {
            println!();
            println!(
                "⚠️  Mapping file not found: {}",
                config.mapping.file_path
            );
        }
        println!();
        Ok(0)
    }
}
