//! Configuration management for CASL.
//!
//! CASL uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `CASL_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation with explicit messages
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use casl::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("casl.toml")?;
//! println!("Tracked ILNs: {:?}", config.sudoc.ilns);
//! println!("Concurrency: {}", config.dispatch.max_concurrency);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`MappingConfig`] - Library code mapping table
//! - [`SudocConfig`] - SUDOC endpoints, tracked ILNs, ignored and multi-building RCRs
//! - [`AlmaConfig`] - Alma endpoint, API key, ignored collections, excluded process codes
//! - [`DispatchConfig`] - Concurrency, per-fetcher rates, retries, record policy
//! - [`FilterConfig`] - Electronic resource filter
//! - [`OutputConfig`] - Result file directory
//! - [`LoggingConfig`] - Logging configuration
//!
//! # Example Configuration
//!
//! ```toml
//! [mapping]
//! file_path = "alma_rcr.csv"
//!
//! [sudoc]
//! ilns = ["15"]
//! multi_building_rcrs = ["341722102"]
//!
//! [alma]
//! api_key = "${CASL_ALMA_API_KEY}"
//! ignored_collections = ["PERDU"]
//!
//! [dispatch]
//! max_concurrency = 50
//!
//! [dispatch.target_rate]
//! requests = 12
//! period_ms = 1000
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    AlmaConfig, ApplicationConfig, CaslConfig, DispatchConfig, FilterConfig, LoggingConfig,
    MappingConfig, OutputConfig, RateConfig, RecordPolicy, SudocConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
