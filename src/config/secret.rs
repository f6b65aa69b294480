//! Secure credential handling using the secrecy crate
//!
//! The Alma API key travels in every request URL, so it is kept wrapped
//! until the moment a URL is built. `Secret<T>` zeros its memory on drop
//! and redacts itself from `Debug` output.
//!
//! # Example
//!
//! ```rust
//! use casl::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let api_key = secret_string("l8xx-my-key".to_string());
//! assert_eq!(api_key.expose_secret().as_ref(), "l8xx-my-key");
//! println!("{:?}", api_key); // Prints: Secret([REDACTED ...])
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// Newtype wrapper for String that implements the required traits for Secret
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    /// Check if the secret value is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// Type alias for a secret string
pub type SecretString = Secret<SecretValue>;

/// Helper function to create a SecretString from a String
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_secret_string_creation() {
        let secret = secret_string("l8xx-test".to_string());
        assert_eq!(secret.expose_secret(), "l8xx-test");
        assert!(!secret.expose_secret().is_empty());
    }

    #[test]
    fn test_secret_debug_redacted() {
        let secret = secret_string("sensitive-key".to_string());
        let debug_output = format!("{secret:?}");

        assert!(!debug_output.contains("sensitive-key"));
        assert!(debug_output.contains("REDACTED") || debug_output.contains("Secret"));
    }

    #[test]
    fn test_secret_toml_roundtrip() {
        #[derive(Serialize, Deserialize)]
        struct TestConfig {
            api_key: SecretString,
        }

        let config: TestConfig = toml::from_str(r#"api_key = "l8xx-123""#).unwrap();
        assert_eq!(config.api_key.expose_secret(), "l8xx-123");

        let text = toml::to_string(&config).unwrap();
        assert!(text.contains("l8xx-123"));
    }
}
