//! In-memory [`Api`] double used only by tests.
//!
//! Responses are registered per exact path. Unregistered paths fail with a
//! 404 so a test that forgets a route fails loudly instead of hanging.
use std::cell::RefCell;
use std::collections::HashMap;

use super::{Api, ApiError};

/// A request the fake has seen, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Get(String),
    Post(String, serde_json::Value),
}

/// Canned-response API.
#[derive(Debug, Default)]
pub struct FakeApi {
    gets: RefCell<HashMap<String, Result<serde_json::Value, ApiError>>>,
    posts: RefCell<HashMap<String, Result<Vec<u8>, ApiError>>>,
    log: RefCell<Vec<Recorded>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `GET path` with `body`.
    pub fn with_json(self, path: impl Into<String>, body: serde_json::Value) -> Self {
        self.set_json(path, body);
        self
    }

    /// Answer `GET path` with an error.
    pub fn with_error(self, path: impl Into<String>, err: ApiError) -> Self {
        self.set_error(path, err);
        self
    }

    /// Answer `POST path` with raw bytes (or an error).
    pub fn with_post(self, path: impl Into<String>, resp: Result<Vec<u8>, ApiError>) -> Self {
        self.posts.borrow_mut().insert(path.into(), resp);
        self
    }

    /// Replace the response for `GET path` after construction.
    pub fn set_json(&self, path: impl Into<String>, body: serde_json::Value) {
        self.gets.borrow_mut().insert(path.into(), Ok(body));
    }

    pub fn set_error(&self, path: impl Into<String>, err: ApiError) {
        self.gets.borrow_mut().insert(path.into(), Err(err));
    }

    /// All requests seen so far.
    pub fn requests(&self) -> Vec<Recorded> {
        self.log.borrow().clone()
    }

    /// Number of `GET`s issued for `path`.
    pub fn get_count(&self, path: &str) -> usize {
        self.log
            .borrow()
            .iter()
            .filter(|r| matches!(r, Recorded::Get(p) if p == path))
            .count()
    }

    pub fn clear_requests(&self) {
        self.log.borrow_mut().clear();
    }
}

fn not_found() -> ApiError {
    ApiError::Http {
        status: 404,
        reason: "Not Found".to_string(),
    }
}

impl Api for FakeApi {
    fn get_json(&self, path: &str) -> Result<serde_json::Value, ApiError> {
        self.log.borrow_mut().push(Recorded::Get(path.to_string()));
        self.gets
            .borrow()
            .get(path)
            .cloned()
            .unwrap_or_else(|| Err(not_found()))
    }

    fn post_json_bytes(&self, path: &str, body: &serde_json::Value) -> Result<Vec<u8>, ApiError> {
        self.log
            .borrow_mut()
            .push(Recorded::Post(path.to_string(), body.clone()));
        self.posts
            .borrow()
            .get(path)
            .cloned()
            .unwrap_or_else(|| Err(not_found()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_paths_are_not_found_and_recorded() {
        let api = FakeApi::new().with_json("/health", serde_json::json!({"api": "ok"}));
        assert!(api.get_json("/health").is_ok());
        assert_eq!(api.get_json("/missing"), Err(not_found()));
        assert_eq!(
            api.post_json_bytes("/api/export/pdf", &serde_json::json!({})),
            Err(not_found())
        );
        assert_eq!(api.get_count("/missing"), 1);
        assert_eq!(api.requests().len(), 3);

        api.clear_requests();
        assert!(api.requests().is_empty());
    }
}
