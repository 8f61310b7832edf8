//! Startup health check.
use crate::activity;
use crate::api::types::HealthResponse;
use crate::api::{self, Api, ApiError};

use super::view::{Node, el};

pub const DATABASE_ALERT: &str = "Database connection failed. Check PostgreSQL.";

/// Outcome of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// API up; carries the reported database status.
    Reachable { database: String },
    /// The call itself failed. Logged only, never shown.
    Unreachable(ApiError),
}

impl HealthStatus {
    pub fn check(api: &impl Api) -> Self {
        match api::fetch::<HealthResponse>(api, api::HEALTH) {
            Ok(resp) => {
                activity::log_health(&resp.database.status);
                Self::Reachable {
                    database: resp.database.status,
                }
            }
            Err(err) => {
                activity::log_fetch_failure("health", api::HEALTH, &err);
                Self::Unreachable(err)
            }
        }
    }

    /// Alert text to show the user, if any.
    pub fn alert(&self) -> Option<&'static str> {
        match self {
            Self::Reachable { database } if database == "error" => Some(DATABASE_ALERT),
            _ => None,
        }
    }

    pub fn render_alert(&self) -> Node {
        match self.alert() {
            Some(msg) => el("div").class("alert alert-error").attr("role", "alert").text(msg).into(),
            None => Node::Fragment(Vec::new()),
        }
    }
}
