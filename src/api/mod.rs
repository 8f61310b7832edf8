//! REST API access for the medicine catalog.
//!
//! The dashboard never talks to the network directly. Everything goes through
//! the [`Api`] trait so the UI pipeline can be driven by the real
//! [`HttpClient`](client::HttpClient) or by an in-memory fake in tests.
//!
//! Endpoint paths are built here, in one place, so the rest of the crate only
//! deals in typed requests.

pub mod client;
pub mod types;

/// Test support, not part of the client API: an in-memory [`Api`] double
/// shared by this crate's unit tests and the integration tests in `tests/`.
/// Nothing outside tests constructs it.
#[doc(hidden)]
pub mod testing;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::ui::filters::{FilterKey, FilterSet};

pub use client::HttpClient;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure of a single API call.
///
/// Callers never retry. Each UI component catches this at its own boundary
/// and renders a fixed fallback; only the export status line shows the
/// message text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The transport failed before a response arrived.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status} {reason}")]
    Http { status: u16, reason: String },

    /// The body was not the JSON shape we expected.
    #[error("malformed response: {0}")]
    Parse(String),
}

impl ApiError {
    /// Whether callers should treat this as a transport-level failure.
    ///
    /// Parse failures are handled exactly like network failures.
    pub fn is_transport_like(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Parse(_))
    }

    /// HTTP status code, if the server responded at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Transport seam
// ---------------------------------------------------------------------------

/// Minimal transport the dashboard needs: JSON GETs and one binary POST.
pub trait Api {
    /// `GET path` and return the decoded JSON body.
    fn get_json(&self, path: &str) -> Result<serde_json::Value, ApiError>;

    /// `POST path` with a JSON body and return the raw response bytes.
    fn post_json_bytes(&self, path: &str, body: &serde_json::Value) -> Result<Vec<u8>, ApiError>;
}

impl<T: Api + ?Sized> Api for &T {
    fn get_json(&self, path: &str) -> Result<serde_json::Value, ApiError> {
        (**self).get_json(path)
    }

    fn post_json_bytes(&self, path: &str, body: &serde_json::Value) -> Result<Vec<u8>, ApiError> {
        (**self).post_json_bytes(path, body)
    }
}

/// Fetch `path` and decode it into `T`.
pub fn fetch<T: DeserializeOwned>(api: &impl Api, path: &str) -> Result<T, ApiError> {
    let value = api.get_json(path)?;
    decode(value)
}

/// Decode an already-fetched JSON value into `T`.
pub fn decode<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Parse(e.to_string()))
}

// ---------------------------------------------------------------------------
// Endpoint paths
// ---------------------------------------------------------------------------

pub const HEALTH: &str = "/health";
pub const OVERVIEW: &str = "/api/insights/overview";
pub const CATEGORY_DISTRIBUTION: &str = "/api/insights/categories/distribution";
pub const CATEGORY_CLASSIFICATION: &str = "/api/insights/categories/classification";
pub const FILTER_OPTIONS: &str = "/api/medicines/filters";
pub const EXPORT_PDF: &str = "/api/export/pdf";

/// `GET /api/insights/manufacturers/ranking?limit=N`
pub fn manufacturer_ranking(limit: u32) -> String {
    format!("/api/insights/manufacturers/ranking?limit={limit}")
}

/// `GET /api/insights/categories/{name}` with the name URL-escaped.
pub fn category_detail(name: &str) -> String {
    format!("/api/insights/categories/{}", urlencoding::encode(name))
}

/// `GET /api/insights/manufacturers/{name}` with the name URL-escaped.
pub fn manufacturer_detail(name: &str) -> String {
    format!("/api/insights/manufacturers/{}", urlencoding::encode(name))
}

/// Free-text medicine search: `GET /api/medicines?q=...`.
pub fn medicine_search(query: &str) -> String {
    format!("/api/medicines?q={}", urlencoding::encode(query))
}

/// Filtered medicine listing used for the export preview count.
///
/// The search endpoint understands `q`, `category` and `manufacturer`.
/// Classification is not a search parameter, so it is left out of the query
/// even when present in the filter set.
pub fn medicine_count(filters: &FilterSet, limit: u32) -> String {
    let mut params: Vec<String> = [FilterKey::Query, FilterKey::Category, FilterKey::Manufacturer]
        .into_iter()
        .filter_map(|key| {
            filters
                .get(key)
                .map(|v| format!("{}={}", key.as_str(), urlencoding::encode(v)))
        })
        .collect();
    params.push(format!("limit={limit}"));
    format!("/api/medicines?{}", params.join("&"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_paths_escape_names() {
        assert_eq!(
            category_detail("Pain Relief"),
            "/api/insights/categories/Pain%20Relief"
        );
        assert_eq!(
            manufacturer_detail("Smith & Sons/Co"),
            "/api/insights/manufacturers/Smith%20%26%20Sons%2FCo"
        );
    }

    #[test]
    fn ranking_path_carries_limit() {
        assert_eq!(
            manufacturer_ranking(10),
            "/api/insights/manufacturers/ranking?limit=10"
        );
    }

    #[test]
    fn count_path_without_filters_only_has_limit() {
        assert_eq!(
            medicine_count(&FilterSet::default(), 10_000),
            "/api/medicines?limit=10000"
        );
    }

    #[test]
    fn count_path_skips_classification() {
        let filters = FilterSet::from_pairs([
            (FilterKey::Query, "ibu profen"),
            (FilterKey::Classification, "Prescription"),
            (FilterKey::Manufacturer, "Acme"),
        ]);
        assert_eq!(
            medicine_count(&filters, 50),
            "/api/medicines?q=ibu%20profen&manufacturer=Acme&limit=50"
        );
    }

    #[test]
    fn parse_and_network_are_transport_like() {
        assert!(ApiError::Network("refused".into()).is_transport_like());
        assert!(ApiError::Parse("eof".into()).is_transport_like());
        let http = ApiError::Http {
            status: 503,
            reason: "Service Unavailable".into(),
        };
        assert!(!http.is_transport_like());
        assert_eq!(http.status(), Some(503));
        assert_eq!(http.to_string(), "HTTP 503 Service Unavailable");
    }
}
