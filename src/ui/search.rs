//! Free-text medicine search and the select options for the export filters.
use crate::activity;
use crate::api::types::{FilterOptions, MedicineHit, SearchResponse};
use crate::api::{self, Api, ApiError};

use super::sequence::{RequestTracker, Ticket};
use super::view::{Node, el};

pub const SEARCHING_TEXT: &str = "Searching...";
pub const NO_RESULTS_TEXT: &str = "No results found.";
pub const ERROR_TEXT: &str = "Error.";

/// The results region.
#[derive(Debug, Clone, Default)]
pub enum SearchState {
    #[default]
    Idle,
    Searching,
    Results(Vec<MedicineHit>),
    Failed,
}

#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub ticket: Ticket,
    pub query: String,
    pub path: String,
}

/// Search box plus results list.
#[derive(Debug, Clone, Default)]
pub struct SearchWidget {
    tracker: RequestTracker,
    query: String,
    state: SearchState,
}

impl SearchWidget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Start a search for the trimmed `query`.
    pub fn begin(&mut self, query: &str) -> SearchRequest {
        self.query = query.trim().to_string();
        self.state = SearchState::Searching;
        SearchRequest {
            ticket: self.tracker.issue(),
            path: api::medicine_search(&self.query),
            query: self.query.clone(),
        }
    }

    pub fn complete(
        &mut self,
        request: &SearchRequest,
        result: Result<SearchResponse, ApiError>,
    ) -> bool {
        if !self.tracker.is_current(request.ticket) {
            return false;
        }
        self.state = match result {
            Ok(resp) => SearchState::Results(resp.results),
            Err(err) => {
                activity::log_fetch_failure("results", &request.path, &err);
                SearchState::Failed
            }
        };
        true
    }

    pub fn search(&mut self, api: &impl Api, query: &str) {
        let request = self.begin(query);
        let result = api::fetch::<SearchResponse>(api, &request.path);
        self.complete(&request, result);
    }

    pub fn render(&self) -> Node {
        el("div")
            .class("search-panel")
            .child(
                el("div")
                    .class("search-bar")
                    .child(
                        el("input")
                            .id("search-input")
                            .class("search-input")
                            .attr("type", "text")
                            .attr("name", "q")
                            .attr("placeholder", "Search by name or indication...")
                            .attr("value", self.query.as_str()),
                    )
                    .child(el("button").id("search-btn").class("btn").text("Search")),
            )
            .child(el("div").id("results").child(render_results(&self.state)))
            .into()
    }
}

/// Render the results region for `state`.
pub fn render_results(state: &SearchState) -> Node {
    match state {
        SearchState::Idle => Node::Fragment(Vec::new()),
        SearchState::Searching => el("p").text(SEARCHING_TEXT).into(),
        SearchState::Failed => el("p").text(ERROR_TEXT).into(),
        SearchState::Results(hits) if hits.is_empty() => el("p").text(NO_RESULTS_TEXT).into(),
        SearchState::Results(hits) => Node::Fragment(hits.iter().map(render_hit).collect()),
    }
}

fn render_hit(hit: &MedicineHit) -> Node {
    let meta = format!(
        "{} — {}",
        hit.indication.as_deref().unwrap_or("-"),
        hit.manufacturer_name.as_deref().unwrap_or("-")
    );
    el("div")
        .class("result-item")
        .attr("data-medicine-id", hit.medicine_id)
        .child(el("strong").text(hit.name.as_str()))
        .child(el("br"))
        .child(el("small").text(meta))
        .into()
}

// ---------------------------------------------------------------------------
// Filter options
// ---------------------------------------------------------------------------

/// Fixed classification choices.
pub const CLASSIFICATIONS: [&str; 2] = ["Prescription", "Over-the-Counter"];

/// Option lists for the three export selects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectOptions {
    pub categories: Vec<String>,
    pub manufacturers: Vec<String>,
}

impl SelectOptions {
    /// Fetch the category and manufacturer lists. On failure the selects keep
    /// only their "All ..." entries.
    pub fn load(api: &impl Api) -> Self {
        match api::fetch::<FilterOptions>(api, api::FILTER_OPTIONS) {
            Ok(opts) => Self::from(opts),
            Err(err) => {
                activity::log_fetch_failure("export-filters", api::FILTER_OPTIONS, &err);
                Self::default()
            }
        }
    }
}

impl From<FilterOptions> for SelectOptions {
    fn from(opts: FilterOptions) -> Self {
        Self {
            categories: opts.categories.into_iter().map(|c| c.name).collect(),
            manufacturers: opts.manufacturers.into_iter().map(|m| m.name).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeApi;
    use serde_json::json;

    #[test]
    fn results_render_name_and_meta() {
        let api = FakeApi::new().with_json(
            "/api/medicines?q=amox",
            json!({"results": [{
                "medicine_id": 7, "name": "Amoxicillin",
                "indication": "Infection", "manufacturer_name": "Acme"
            }]}),
        );
        let mut w = SearchWidget::new();
        w.search(&api, "  amox ");
        let html = render_results(w.state()).to_html();
        assert_eq!(
            html,
            "<div class=\"result-item\" data-medicine-id=\"7\"><strong>Amoxicillin</strong><br/><small>Infection — Acme</small></div>"
        );
    }

    #[test]
    fn empty_and_failed_searches() {
        let api = FakeApi::new().with_json("/api/medicines?q=zzz", json!({"results": []}));
        let mut w = SearchWidget::new();
        w.search(&api, "zzz");
        assert_eq!(render_results(w.state()).text_content(), NO_RESULTS_TEXT);

        w.search(&api, "unregistered");
        assert_eq!(render_results(w.state()).text_content(), ERROR_TEXT);
    }

    #[test]
    fn pending_search_shows_progress_and_drops_stale() {
        let mut w = SearchWidget::new();
        let old = w.begin("a");
        assert_eq!(render_results(w.state()).text_content(), SEARCHING_TEXT);
        let new = w.begin("ab");
        assert!(!w.complete(&old, Ok(SearchResponse::default())));
        assert!(w.complete(&new, Ok(SearchResponse::default())));
        assert_eq!(w.query(), "ab");
    }

    #[test]
    fn filter_options_load_or_fall_back() {
        let api = FakeApi::new().with_json(
            api::FILTER_OPTIONS,
            json!({"categories": [{"name": "Antibiotics"}], "manufacturers": [{"name": "Acme"}]}),
        );
        let opts = SelectOptions::load(&api);
        assert_eq!(opts.categories, ["Antibiotics"]);
        assert_eq!(opts.manufacturers, ["Acme"]);

        assert_eq!(SelectOptions::load(&FakeApi::new()), SelectOptions::default());
    }
}
