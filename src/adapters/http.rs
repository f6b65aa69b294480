//! Shared HTTP plumbing for the catalogue clients

use crate::domain::{CaslError, FetchError, Result};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

const MAX_ERROR_BODY: usize = 300;

/// Builds the reqwest client used by a catalogue adapter
pub fn build_http_client(timeout_seconds: u64) -> Result<Client> {
    ClientBuilder::new()
        .timeout(Duration::from_secs(timeout_seconds))
        .connect_timeout(Duration::from_secs(30))
        .user_agent(concat!("casl/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| CaslError::Configuration(format!("Failed to build HTTP client: {e}")))
}

/// Maps a transport failure (connect, timeout, body read)
pub fn transport_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::TransientNetwork(format!("Request timeout: {err}"))
    } else {
        FetchError::TransientNetwork(err.to_string())
    }
}

/// Maps a non-success HTTP status when the body carries nothing better
pub fn classify_status(status: u16, body: &str) -> FetchError {
    let message = truncate(body);
    match status {
        404 => FetchError::NotFound(message),
        429 => FetchError::RateLimited(message),
        500..=599 => FetchError::RemoteServerError { status, message },
        _ => FetchError::RemoteRejected { status, message },
    }
}

/// Ensures a base URL ends with `/` so paths can be appended
pub fn with_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}

fn truncate(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(404, "not_found" ; "not found")]
    #[test_case(429, "rate_limited" ; "too many requests")]
    #[test_case(500, "remote_server_error" ; "internal error")]
    #[test_case(503, "remote_server_error" ; "unavailable")]
    #[test_case(400, "remote_rejected" ; "bad request")]
    #[test_case(403, "remote_rejected" ; "forbidden")]
    fn test_classify_status(status: u16, kind: &str) {
        assert_eq!(classify_status(status, "body").kind(), kind);
    }

    #[test]
    fn test_error_body_is_truncated() {
        let body = "x".repeat(1000);
        match classify_status(400, &body) {
            FetchError::RemoteRejected { message, .. } => {
                assert_eq!(message.len(), MAX_ERROR_BODY + 3);
                assert!(message.ends_with("..."));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_with_trailing_slash() {
        assert_eq!(with_trailing_slash("https://www.sudoc.fr"), "https://www.sudoc.fr/");
        assert_eq!(with_trailing_slash("https://www.sudoc.fr/"), "https://www.sudoc.fr/");
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(5).is_ok());
    }
}
