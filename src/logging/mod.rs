//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Configurable log levels
//! - Console output
//! - JSON file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use casl::logging::init_logging;
//! use casl::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(ppn = "123456789", "Reconciling");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log a failed fetch for one identifier
///
/// # Example
///
/// ```no_run
/// use casl::log_fetch_failure;
/// use casl::domain::FetchError;
///
/// let error = FetchError::TransientNetwork("timeout".to_string());
/// log_fetch_failure!("123456789", "alma", &error);
/// ```
#[macro_export]
macro_rules! log_fetch_failure {
    ($ppn:expr, $fetcher:expr, $error:expr) => {
        tracing::warn!(
            ppn = %$ppn,
            fetcher = $fetcher,
            error_kind = $error.kind(),
            error = %$error,
            "Fetch failed"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use casl::log_retry_attempt;
///
/// log_retry_attempt!(2, 3, "PER_SECOND_THRESHOLD");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = %$reason,
            "Retrying request"
        );
    };
}

/// Log dispatch progress
///
/// # Example
///
/// ```no_run
/// use casl::log_dispatch_progress;
///
/// log_dispatch_progress!(100, 1000);
/// ```
#[macro_export]
macro_rules! log_dispatch_progress {
    ($done:expr, $total:expr) => {
        tracing::debug!(
            done = $done,
            total = $total,
            progress_pct = ($done as f64 / $total as f64 * 100.0),
            "Dispatch progress"
        );
    };
}
