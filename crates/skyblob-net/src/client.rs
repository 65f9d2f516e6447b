use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::error::ClientError;

/// User agent sent when the caller does not configure one.
pub const DEFAULT_USER_AGENT: &str = concat!("skyblob/", env!("CARGO_PKG_VERSION"));

/// Build the shared HTTP client used by the directory and host clients.
///
/// `timeout` bounds each request end to end. Redirects follow reqwest's
/// default policy.
pub fn build_http_client(
    timeout: Duration,
    user_agent: &str,
) -> Result<reqwest::Client, ClientError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(user_agent)
            .map_err(|_| ClientError::InvalidUserAgent(user_agent.to_string()))?,
    );
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_default_agent() {
        assert!(build_http_client(Duration::from_secs(5), DEFAULT_USER_AGENT).is_ok());
        assert!(DEFAULT_USER_AGENT.starts_with("skyblob/"));
    }

    #[test]
    fn rejects_header_unsafe_agent() {
        let err = build_http_client(Duration::from_secs(5), "bad\nagent").unwrap_err();
        assert!(matches!(err, ClientError::InvalidUserAgent(_)));
    }
}
