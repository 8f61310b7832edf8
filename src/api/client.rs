//! Synchronous HTTP client for the medicine catalog API.
//!
//! Built on `ureq`. One client is created per CLI invocation (or per web
//! server process) from the resolved [`ApiConfig`] and reused for every call.
//! No retries: a failed call is reported once and the caller renders its
//! fallback.
use std::io::Read;
use std::time::Duration;

use super::{Api, ApiError};
use crate::config::schema::ApiConfig;

/// `ureq`-backed implementation of [`Api`].
#[derive(Debug)]
pub struct HttpClient {
    base_url: String,
    timeout: Duration,
    agent: ureq::Agent,
}

impl HttpClient {
    /// Build a client from the resolved config.
    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(&config.base_url, Duration::from_millis(config.timeout_ms))
    }

    /// Build a client for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        // "localhost" may resolve to ::1 first while the API binds IPv4 only.
        let base_url = base_url
            .trim_end_matches('/')
            .replace("://localhost", "://127.0.0.1");
        Self {
            base_url,
            timeout,
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    /// Base URL all endpoint paths are joined onto.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Api for HttpClient {
    fn get_json(&self, path: &str) -> Result<serde_json::Value, ApiError> {
        let resp = self
            .agent
            .get(&self.url(path))
            .timeout(self.timeout)
            .call()
            .map_err(map_ureq_error)?;

        resp.into_json::<serde_json::Value>()
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    fn post_json_bytes(&self, path: &str, body: &serde_json::Value) -> Result<Vec<u8>, ApiError> {
        let resp = self
            .agent
            .post(&self.url(path))
            .timeout(self.timeout)
            .set("Content-Type", "application/json")
            .send_json(body)
            .map_err(map_ureq_error)?;

        let mut bytes = Vec::new();
        resp.into_reader()
            .read_to_end(&mut bytes)
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(bytes)
    }
}

/// Normalize `ureq` failures into the [`ApiError`] taxonomy.
fn map_ureq_error(err: ureq::Error) -> ApiError {
    match err {
        ureq::Error::Status(status, resp) => ApiError::Http {
            status,
            reason: resp.status_text().to_string(),
        },
        ureq::Error::Transport(t) => ApiError::Network(t.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_from_default_config() {
        let config = ApiConfig::default();
        let client = HttpClient::from_config(&config);
        assert_eq!(client.base_url, "http://127.0.0.1:8000");
        assert_eq!(client.timeout, Duration::from_millis(10_000));
    }

    #[test]
    fn client_strips_trailing_slash_and_localhost() {
        let client = HttpClient::new("http://localhost:8000/", Duration::from_secs(1));
        assert_eq!(client.base_url(), "http://127.0.0.1:8000");
        assert_eq!(client.url("/health"), "http://127.0.0.1:8000/health");
    }

    #[test]
    fn unreachable_host_is_network_error() {
        // Port 9 (discard) on loopback is essentially never listening.
        let client = HttpClient::new("http://127.0.0.1:9", Duration::from_millis(500));
        let err = client.get_json("/health").unwrap_err();
        assert!(matches!(err, ApiError::Network(_)), "got {err:?}");
    }
}
