//! Domain identifier types with validation
//!
//! The work identifier of the union catalogue is the PPN: eight digits
//! followed by a check character that is either a digit or `X`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

fn ppn_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]{8}[0-9xX]$").expect("valid PPN pattern"))
}

/// PPN newtype wrapper
///
/// Identifies one bibliographic work in both catalogues. Alma stores it
/// as an `other_system_id` prefixed with `(PPN)`.
///
/// # Examples
///
/// ```
/// use casl::domain::ids::Ppn;
/// use std::str::FromStr;
///
/// let ppn = Ppn::from_str("12345678X").unwrap();
/// assert_eq!(ppn.as_str(), "12345678X");
/// assert_eq!(ppn.network_number(), "(PPN)12345678X");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ppn(String);

impl Ppn {
    /// Creates a new Ppn from a string
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Returns
    ///
    /// Returns `Ok(Ppn)` if the value is a well-formed PPN, `Err` otherwise
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err("PPN cannot be empty".to_string());
        }
        if !ppn_pattern().is_match(trimmed) {
            return Err(format!(
                "Invalid PPN format. Expected 8 digits followed by a digit or X, got: {trimmed}"
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the PPN as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }

    /// The form under which Alma records the PPN in `network_number`
    pub fn network_number(&self) -> String {
        format!("(PPN){}", self.0)
    }
}

impl fmt::Display for Ppn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Ppn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Ppn {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Ppn> for String {
    fn from(ppn: Ppn) -> Self {
        ppn.0
    }
}

impl AsRef<str> for Ppn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
