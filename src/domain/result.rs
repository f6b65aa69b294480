//! Result type alias for CASL

use super::errors::CaslError;

/// Result type alias for CASL operations
///
/// # Examples
///
/// ```
/// use casl::domain::result::Result;
/// use casl::domain::errors::CaslError;
///
/// fn failing_function() -> Result<()> {
///     Err(CaslError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, CaslError>;
