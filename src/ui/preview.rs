//! Export preview: how many medicines the current filters would export.
//!
//! The preview is advisory. It never blocks or disables the export trigger,
//! and a failed count renders a fixed fallback line.

use crate::activity;
use crate::api::types::SearchResponse;
use crate::api::{self, Api, ApiError};

use super::filters::FilterSet;
use super::format::format_number;
use super::sequence::{RequestTracker, Ticket};
use super::view::{Node, el, text};

pub const LOADING_TEXT: &str = "Loading record count...";
pub const FALLBACK_TEXT: &str = "Unable to preview count";

/// Default upper-bound page size for the count query.
pub const DEFAULT_LIMIT: u32 = 10_000;

/// What the preview line currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewState {
    Loading,
    Count { count: u64, filtered: bool },
    Unavailable,
}

/// An issued count request.
#[derive(Debug, Clone)]
pub struct PreviewRequest {
    pub ticket: Ticket,
    pub path: String,
    pub filters: FilterSet,
}

/// Owns the preview line and its request sequence.
#[derive(Debug, Clone)]
pub struct PreviewUpdater {
    limit: u32,
    tracker: RequestTracker,
    state: PreviewState,
}

impl PreviewUpdater {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            tracker: RequestTracker::new(),
            state: PreviewState::Loading,
        }
    }

    pub fn state(&self) -> &PreviewState {
        &self.state
    }

    /// Issue a count request for `filters`. The line keeps its previous
    /// content until the response arrives.
    pub fn begin(&mut self, filters: FilterSet) -> PreviewRequest {
        PreviewRequest {
            ticket: self.tracker.issue(),
            path: api::medicine_count(&filters, self.limit),
            filters,
        }
    }

    /// Apply a response. Returns `false` if a newer request superseded it.
    pub fn complete(
        &mut self,
        request: &PreviewRequest,
        result: Result<SearchResponse, ApiError>,
    ) -> bool {
        if !self.tracker.is_current(request.ticket) {
            return false;
        }
        self.state = match result {
            Ok(resp) => PreviewState::Count {
                count: resp.results.len() as u64,
                filtered: !request.filters.is_empty(),
            },
            Err(err) => {
                activity::log_fetch_failure("export-preview", &request.path, &err);
                PreviewState::Unavailable
            }
        };
        true
    }

    /// Begin, fetch and complete in one step.
    pub fn refresh(&mut self, api: &impl Api, filters: FilterSet) {
        let request = self.begin(filters);
        let result = api::fetch::<SearchResponse>(api, &request.path);
        self.complete(&request, result);
    }

    pub fn render(&self) -> Node {
        render_preview(&self.state)
    }
}

impl Default for PreviewUpdater {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT)
    }
}

/// Render the preview line content.
pub fn render_preview(state: &PreviewState) -> Node {
    match state {
        PreviewState::Loading => text(LOADING_TEXT),
        PreviewState::Unavailable => text(FALLBACK_TEXT),
        PreviewState::Count { count, filtered } => {
            let suffix = if *filtered {
                "with current filters"
            } else {
                "(no filters applied)"
            };
            Node::Fragment(vec![
                el("strong").text(format_number(*count)).into(),
                text(format!(" medicines will be exported {suffix}")),
            ])
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
