//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::CaslConfig;
use super::secret::secret_string;
use crate::domain::errors::CaslError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into CaslConfig
/// 4. Applies environment variable overrides (CASL_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use casl::config::loader::load_config;
///
/// let config = load_config("casl.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<CaslConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(CaslError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        CaslError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: CaslConfig = toml::from_str(&contents)
        .map_err(|e| CaslError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        CaslError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| CaslError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let processed = re.replace_all(line, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    caps[0].to_string()
                }
            }
        });
        lines.push(processed.into_owned());
    }

    if !missing_vars.is_empty() {
        return Err(CaslError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

/// Splits a comma separated override into trimmed, non-empty values
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Applies environment variable overrides using CASL_* prefix
///
/// Environment variables follow the pattern: CASL_<SECTION>_<KEY>
/// For example: CASL_ALMA_API_KEY, CASL_DISPATCH_MAX_CONCURRENCY.
/// List values are comma separated.
fn apply_env_overrides(config: &mut CaslConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("CASL_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Mapping overrides
    if let Ok(val) = std::env::var("CASL_MAPPING_FILE_PATH") {
        config.mapping.file_path = val;
    }

    // SUDOC overrides
    if let Ok(val) = std::env::var("CASL_SUDOC_BASE_URL") {
        config.sudoc.base_url = val;
    }
    if let Ok(val) = std::env::var("CASL_SUDOC_ILN2RCR_URL") {
        config.sudoc.iln2rcr_url = val;
    }
    if let Ok(val) = std::env::var("CASL_SUDOC_ILNS") {
        config.sudoc.ilns = parse_list(&val);
    }
    if let Ok(val) = std::env::var("CASL_SUDOC_IGNORED_RCRS") {
        config.sudoc.ignored_rcrs = parse_list(&val);
    }
    if let Ok(val) = std::env::var("CASL_SUDOC_MULTI_BUILDING_RCRS") {
        config.sudoc.multi_building_rcrs = parse_list(&val);
    }

    // Alma overrides
    if let Ok(val) = std::env::var("CASL_ALMA_BASE_URL") {
        config.alma.base_url = val;
    }
    if let Ok(val) = std::env::var("CASL_ALMA_API_KEY") {
        config.alma.api_key = secret_string(val);
    }
    if let Ok(val) = std::env::var("CASL_ALMA_IGNORED_COLLECTIONS") {
        config.alma.ignored_collections = parse_list(&val);
    }
    if let Ok(val) = std::env::var("CASL_ALMA_EXCLUDED_PROCESS_CODES") {
        config.alma.excluded_process_codes = parse_list(&val);
    }

    // Dispatch overrides
    if let Ok(val) = std::env::var("CASL_DISPATCH_MAX_CONCURRENCY") {
        if let Ok(concurrency) = val.parse() {
            config.dispatch.max_concurrency = concurrency;
        }
    }
    if let Ok(val) = std::env::var("CASL_DISPATCH_RECORD_POLICY") {
        config.dispatch.record_policy = val.parse().map_err(CaslError::Configuration)?;
    }
    if let Ok(val) = std::env::var("CASL_DISPATCH_MAX_RATE_LIMIT_RETRIES") {
        if let Ok(retries) = val.parse() {
            config.dispatch.max_rate_limit_retries = retries;
        }
    }

    // Filter overrides
    if let Ok(val) = std::env::var("CASL_FILTER_EXCLUDE_ELECTRONIC") {
        config.filter.exclude_electronic = val.parse().unwrap_or(true);
    }

    // Output overrides
    if let Ok(val) = std::env::var("CASL_OUTPUT_DIRECTORY") {
        config.output.directory = val;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("CASL_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("CASL_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
