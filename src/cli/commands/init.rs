//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "casl.toml")]
    pub output: String,

    /// Include every option with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing CASL configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your ILNs and mapping file", self.output);
                println!("  2. Create a .env file with CASL_ALMA_API_KEY=<your Alma API key>");
                println!("  3. Validate configuration: casl validate-config");
                println!("  4. Run: casl reconcile ppn.txt");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# CASL Configuration File
# SUDOC / Alma holdings reconciliation

[mapping]
file_path = "alma_rcr.csv"

[sudoc]
ilns = ["15"]
ignored_rcrs = []
multi_building_rcrs = []

[alma]
api_key = "${CASL_ALMA_API_KEY}"
ignored_collections = []

[output]
directory = "."
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# CASL Configuration File
# SUDOC / Alma holdings reconciliation
#
# This file contains all configuration options with their defaults.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# Code Mapping
# ============================================================================
[mapping]
# CSV rows: "Alma library name","Alma library code",RCR,ILN[,"SUDOC name"]
# A library with no SUDOC counterpart leaves RCR and ILN empty.
file_path = "alma_rcr.csv"

# Whether the first row is a header line
has_headers = false

# ============================================================================
# SUDOC
# ============================================================================
[sudoc]
# MARCXML records are read from {base_url}{ppn}.xml
base_url = "https://www.sudoc.fr/"

# Holder directory service, queried once with the tracked ILNs
iln2rcr_url = "https://www.idref.fr/services/iln2rcr/"

# ILNs whose libraries are reconciled
ilns = ["15"]

# RCRs left out of the comparison
ignored_rcrs = []

# RCRs spread over several buildings; reported with their sub-locations
multi_building_rcrs = []

# Request timeout in seconds
timeout_seconds = 30

# ============================================================================
# Alma
# ============================================================================
[alma]
# Regional API gateway
base_url = "https://api-eu.hosted.exlibrisgroup.com/almaws/v1/"

# API key with read access to bibs (use environment variable)
api_key = "${CASL_ALMA_API_KEY}"

# Location codes whose holdings are ignored
ignored_collections = []

# Items in these processes do not count as available copies
excluded_process_codes = ["ACQ"]

# Request timeout in seconds
timeout_seconds = 30

# ============================================================================
# Dispatch
# ============================================================================
[dispatch]
# Maximum fetches in flight, both catalogues together (1-500)
max_concurrency = 50

# "partial" keeps PPNs with a failed side, "complete" leaves them out
record_policy = "partial"

# Retries after a rate-limit answer, and the wait before each one
max_rate_limit_retries = 3
rate_limit_backoff_ms = 1000

# SUDOC call starts per period
[dispatch.source_rate]
requests = 10
period_ms = 1000

# Alma call starts per period; one lookup issues at least two requests
[dispatch.target_rate]
requests = 12
period_ms = 1000

# ============================================================================
# Filters
# ============================================================================
[filter]
# Drop anomalies of electronic resources (008 position 0 = "O")
exclude_electronic = true

# ============================================================================
# Output
# ============================================================================
[output]
# Reports are written as resultats_YYYYMMDD-HHMMSS.csv
directory = "."

# ============================================================================
# Logging Configuration
# ============================================================================
[logging]
# Enable local JSON file logging
local_enabled = false

# Local log directory
local_path = "logs"

# Log rotation (daily, hourly or never)
local_rotation = "daily"

# Maximum log file size in MB
local_max_size_mb = 100
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CaslConfig;
    use tempfile::TempDir;

    #[test]
    fn test_init_args_defaults() {
        let args = InitArgs {
            output: "casl.toml".to_string(),
            with_examples: false,
            force: false,
        };

        assert_eq!(args.output, "casl.toml");
        assert!(!args.with_examples);
        assert!(!args.force);
    }

    #[test]
    fn test_generated_configs_parse() {
        for content in [
            InitArgs::generate_minimal_config(),
            InitArgs::generate_config_with_examples(),
        ] {
            let content = content.replace("${CASL_ALMA_API_KEY}", "l8xx-test");
            let config: CaslConfig = toml::from_str(&content).unwrap();
            assert!(config.validate().is_ok());
            assert_eq!(config.sudoc.ilns, vec!["15"]);
        }
    }

    #[tokio::test]
    async fn test_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("casl.toml");
        let mut args = InitArgs {
            output: path.to_string_lossy().to_string(),
            with_examples: false,
            force: false,
        };

        assert_eq!(args.execute().await.unwrap(), 0);
        assert_eq!(args.execute().await.unwrap(), 2);

        args.force = true;
        args.with_examples = true;
        assert_eq!(args.execute().await.unwrap(), 0);
        assert!(fs::read_to_string(&path).unwrap().contains("[dispatch.target_rate]"));
    }
}
