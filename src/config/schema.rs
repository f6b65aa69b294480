//! Configuration schema types
//!
//! This module defines the configuration structure for CASL.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};

/// What the dispatcher emits when one side of a record could not be fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecordPolicy {
    /// Emit the record with whatever side was fetched
    #[default]
    Partial,
    /// Drop records with a failed side
    Complete,
}

impl std::str::FromStr for RecordPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "partial" => Ok(RecordPolicy::Partial),
            "complete" => Ok(RecordPolicy::Complete),
            other => Err(format!(
                "Invalid record_policy '{other}'. Must be one of: partial, complete"
            )),
        }
    }
}

/// Main CASL configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaslConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Library code mapping table
    pub mapping: MappingConfig,

    /// SUDOC (source catalogue) settings
    pub sudoc: SudocConfig,

    /// Alma (target catalogue) settings
    pub alma: AlmaConfig,

    /// Concurrency, rate limits and retries
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Post-reconciliation filters
    #[serde(default)]
    pub filter: FilterConfig,

    /// Result file settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CaslConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.mapping.validate()?;
        self.sudoc.validate()?;
        self.alma.validate()?;
        self.dispatch.validate()?;
        self.output.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Code mapping table location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingConfig {
    /// CSV file with rows `Alma name, Alma code, RCR, ILN[, SUDOC name]`
    pub file_path: String,

    /// Whether the first row is a header line
    #[serde(default)]
    pub has_headers: bool,
}

impl MappingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.file_path.trim().is_empty() {
            return Err("mapping.file_path cannot be empty".to_string());
        }
        Ok(())
    }
}

/// SUDOC endpoints and holder scope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SudocConfig {
    /// Base URL serving `{ppn}.xml` MARCXML records
    #[serde(default = "default_sudoc_base_url")]
    pub base_url: String,

    /// Base URL of the iln2rcr service
    #[serde(default = "default_iln2rcr_url")]
    pub iln2rcr_url: String,

    /// ILNs whose libraries are reconciled
    pub ilns: Vec<String>,

    /// RCRs excluded from reconciliation
    #[serde(default)]
    pub ignored_rcrs: Vec<String>,

    /// RCRs spread over several buildings; their sub-locations are reported
    #[serde(default)]
    pub multi_building_rcrs: Vec<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl SudocConfig {
    fn validate(&self) -> Result<(), String> {
        validate_url("sudoc.base_url", &self.base_url)?;
        validate_url("sudoc.iln2rcr_url", &self.iln2rcr_url)?;

        if self.ilns.is_empty() {
            return Err("sudoc.ilns must list at least one ILN".to_string());
        }
        if self.ilns.iter().any(|iln| iln.trim().is_empty()) {
            return Err("sudoc.ilns cannot contain empty values".to_string());
        }
        if self.timeout_seconds == 0 {
            return Err("sudoc.timeout_seconds must be > 0".to_string());
        }
        Ok(())
    }
}

/// Alma API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlmaConfig {
    /// Base URL of the Alma REST API
    #[serde(default = "default_alma_base_url")]
    pub base_url: String,

    /// API key sent as the `apikey` query parameter
    /// Stored securely in memory and automatically zeroized on drop
    pub api_key: SecretString,

    /// Location codes whose holdings are ignored
    #[serde(default)]
    pub ignored_collections: Vec<String>,

    /// Process type codes that make an item ineligible
    #[serde(default = "default_excluded_process_codes")]
    pub excluded_process_codes: Vec<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl AlmaConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        validate_url("alma.base_url", &self.base_url)?;

        if self.api_key.expose_secret().is_empty() {
            return Err("alma.api_key cannot be empty".to_string());
        }
        if self.timeout_seconds == 0 {
            return Err("alma.timeout_seconds must be > 0".to_string());
        }
        Ok(())
    }
}

/// Request rate for one fetcher: at most `requests` call starts per `period_ms`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateConfig {
    pub requests: usize,
    pub period_ms: u64,
}

impl RateConfig {
    fn validate(&self, name: &str) -> Result<(), String> {
        if self.requests == 0 {
            return Err(format!("dispatch.{name}.requests must be > 0"));
        }
        if self.period_ms == 0 {
            return Err(format!("dispatch.{name}.period_ms must be > 0"));
        }
        Ok(())
    }
}

/// Dispatcher settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Maximum fetch calls in flight across both fetchers
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Emission policy for records with a failed side
    #[serde(default)]
    pub record_policy: RecordPolicy,

    /// Retries allowed after a rate-limit answer
    #[serde(default = "default_max_rate_limit_retries")]
    pub max_rate_limit_retries: usize,

    /// Wait before retrying a rate-limited request, in milliseconds
    #[serde(default = "default_rate_limit_backoff_ms")]
    pub rate_limit_backoff_ms: u64,

    /// SUDOC request rate
    #[serde(default = "default_source_rate")]
    pub source_rate: RateConfig,

    /// Alma request rate; one lookup issues at least two HTTP requests
    #[serde(default = "default_target_rate")]
    pub target_rate: RateConfig,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            record_policy: RecordPolicy::default(),
            max_rate_limit_retries: default_max_rate_limit_retries(),
            rate_limit_backoff_ms: default_rate_limit_backoff_ms(),
            source_rate: default_source_rate(),
            target_rate: default_target_rate(),
        }
    }
}

impl DispatchConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_concurrency == 0 || self.max_concurrency > 500 {
            return Err("dispatch.max_concurrency must be between 1 and 500".to_string());
        }
        if self.max_rate_limit_retries > 10 {
            return Err("dispatch.max_rate_limit_retries must be <= 10".to_string());
        }
        self.source_rate.validate("source_rate")?;
        self.target_rate.validate("target_rate")?;
        Ok(())
    }
}

/// Post-reconciliation filters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Drop anomalies of electronic-only resources
    #[serde(default = "default_true")]
    pub exclude_electronic: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            exclude_electronic: true,
        }
    }
}

/// Result file settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving `resultats_YYYYMMDD-HHMMSS.csv`
    #[serde(default = "default_output_directory")]
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}

impl OutputConfig {
    fn validate(&self) -> Result<(), String> {
        if self.directory.trim().is_empty() {
            return Err("output.directory cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log file path
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,

    /// Maximum log file size in MB
    #[serde(default = "default_local_max_size_mb")]
    pub local_max_size_mb: usize,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_max_size_mb == 0 {
            return Err("logging.local_max_size_mb must be > 0".to_string());
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }

        Ok(())
    }

    /// Console-only configuration
    pub fn console_only() -> Self {
        Self {
            local_enabled: false,
            ..Self::default()
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
            local_max_size_mb: default_local_max_size_mb(),
        }
    }
}

fn validate_url(name: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{name} cannot be empty"));
    }
    if !value.starts_with("http://") && !value.starts_with("https://") {
        return Err(format!("{name} must start with http:// or https://"));
    }
    Ok(())
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_sudoc_base_url() -> String {
    "https://www.sudoc.fr/".to_string()
}

fn default_iln2rcr_url() -> String {
    "https://www.idref.fr/services/iln2rcr/".to_string()
}

fn default_alma_base_url() -> String {
    "https://api-eu.hosted.exlibrisgroup.com/almaws/v1/".to_string()
}

fn default_excluded_process_codes() -> Vec<String> {
    vec!["ACQ".to_string()]
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_max_concurrency() -> usize {
    50
}

fn default_max_rate_limit_retries() -> usize {
    3
}

fn default_rate_limit_backoff_ms() -> u64 {
    1000
}

fn default_source_rate() -> RateConfig {
    RateConfig {
        requests: 10,
        period_ms: 1000,
    }
}

fn default_target_rate() -> RateConfig {
    RateConfig {
        requests: 12,
        period_ms: 1000,
    }
}

fn default_output_directory() -> String {
    ".".to_string()
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

fn default_local_max_size_mb() -> usize {
    100
}
