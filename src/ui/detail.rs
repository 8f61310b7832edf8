//! Shared drill-down panel for a clicked category or manufacturer.
//!
//! One panel serves both kinds. Opening it shows a loading placeholder and
//! issues a fetch tagged with a fresh [`Ticket`]; a response is applied only
//! if its ticket is still the latest *and* the panel is still open. Closing
//! the panel invalidates the outstanding ticket, so a late response can never
//! re-show it or overwrite newer content.

use crate::activity;
use crate::api::types::{CategoryDetail, ManufacturerDetail};
use crate::api::{self, Api, ApiError};

use super::format::format_number;
use super::sequence::{RequestTracker, Ticket};
use super::view::{Element, Node, el, text};

pub const FAILURE_TEXT: &str = "Failed to load details";

/// Manufacturer detail shows at most this many categories.
const MANUFACTURER_TOP_CATEGORIES: usize = 5;

/// Identity of a drill-down target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DetailKey {
    Category(String),
    Manufacturer(String),
}

impl DetailKey {
    pub fn name(&self) -> &str {
        match self {
            Self::Category(n) | Self::Manufacturer(n) => n,
        }
    }

    /// API path of the detail endpoint (name URL-escaped).
    pub fn api_path(&self) -> String {
        match self {
            Self::Category(n) => api::category_detail(n),
            Self::Manufacturer(n) => api::manufacturer_detail(n),
        }
    }

    /// Route of the rendered fragment on the web front-end.
    pub fn route(&self) -> String {
        let kind = match self {
            Self::Category(_) => "category",
            Self::Manufacturer(_) => "manufacturer",
        };
        format!("/detail/{kind}/{}", urlencoding::encode(self.name()))
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Category(_) => "Category Details",
            Self::Manufacturer(_) => "Manufacturer Details",
        }
    }
}

/// Decoded detail payload.
#[derive(Debug, Clone)]
pub enum DetailData {
    Category(CategoryDetail),
    Manufacturer(ManufacturerDetail),
}

impl DetailData {
    /// Decode `value` according to the kind of `key`.
    pub fn decode(key: &DetailKey, value: serde_json::Value) -> Result<Self, ApiError> {
        match key {
            DetailKey::Category(_) => api::decode(value).map(Self::Category),
            DetailKey::Manufacturer(_) => api::decode(value).map(Self::Manufacturer),
        }
    }
}

/// Panel body.
#[derive(Debug, Clone)]
pub enum DetailContent {
    Loading,
    Loaded(DetailData),
    Failed,
}

/// An issued detail fetch.
#[derive(Debug, Clone)]
pub struct DetailRequest {
    pub ticket: Ticket,
    pub key: DetailKey,
    pub path: String,
}

/// The detail panel state.
#[derive(Debug, Clone, Default)]
pub struct DetailPanel {
    tracker: RequestTracker,
    visible: bool,
    key: Option<DetailKey>,
    content: Option<DetailContent>,
}

impl DetailPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn key(&self) -> Option<&DetailKey> {
        self.key.as_ref()
    }

    pub fn content(&self) -> Option<&DetailContent> {
        self.content.as_ref()
    }

    /// Show the panel for `key` with a loading placeholder.
    pub fn open(&mut self, key: DetailKey) -> DetailRequest {
        self.visible = true;
        self.content = Some(DetailContent::Loading);
        self.key = Some(key.clone());
        DetailRequest {
            ticket: self.tracker.issue(),
            path: key.api_path(),
            key,
        }
    }

    /// Hide the panel. Any in-flight fetch becomes stale.
    pub fn close(&mut self) {
        self.visible = false;
        self.tracker.invalidate();
    }

    /// Apply a fetch result. Returns `false` when the result was discarded.
    pub fn complete(
        &mut self,
        request: &DetailRequest,
        result: Result<serde_json::Value, ApiError>,
    ) -> bool {
        if !self.visible || !self.tracker.is_current(request.ticket) {
            return false;
        }
        let decoded = result.and_then(|v| DetailData::decode(&request.key, v));
        self.content = Some(match decoded {
            Ok(data) => DetailContent::Loaded(data),
            Err(err) => {
                activity::log_fetch_failure("detail", &request.path, &err);
                DetailContent::Failed
            }
        });
        true
    }

    /// Open, fetch and complete in one step.
    pub fn show(&mut self, api: &impl Api, key: DetailKey) {
        let request = self.open(key);
        let result = api.get_json(&request.path);
        self.complete(&request, result);
    }

    /// Render the whole panel (hidden panels render with `display:none`).
    pub fn render(&self) -> Node {
        let title = self.key.as_ref().map(DetailKey::title).unwrap_or("Details");
        let body = match &self.content {
            None => Node::Fragment(Vec::new()),
            Some(content) => render_detail_content(content),
        };
        let mut panel = el("div")
            .id("detail-panel")
            .class("detail-panel")
            .child(el("h3").class("panel-title").text(title))
            .child(el("div").id("detail-content").child(body));
        if !self.visible {
            panel.set_attr("style", "display:none");
        }
        panel.into()
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render the panel body for a given content state.
pub fn render_detail_content(content: &DetailContent) -> Node {
    match content {
        DetailContent::Loading => el("div").class("loading-spinner").into(),
        DetailContent::Failed => Node::Fragment(vec![
            el("p").class("detail-error").text(FAILURE_TEXT).into(),
            close_button(),
        ]),
        DetailContent::Loaded(DetailData::Category(d)) => Node::Fragment(vec![
            columns([
                summary_column(
                    "Category",
                    &d.category.category,
                    format!(
                        "{} medicines from {} manufacturers",
                        format_number(d.category.medicine_count),
                        d.category.manufacturer_count
                    ),
                ),
                list_column(
                    "Top Manufacturers",
                    d.top_manufacturers
                        .iter()
                        .map(|m| (m.manufacturer.as_str(), m.count)),
                ),
                list_column(
                    "Dosage Forms",
                    d.dosage_forms
                        .iter()
                        .map(|f| (f.dosage_form.as_deref().unwrap_or("Unspecified"), f.count)),
                ),
            ]),
            close_button(),
        ]),
        DetailContent::Loaded(DetailData::Manufacturer(d)) => Node::Fragment(vec![
            columns([
                summary_column(
                    "Manufacturer",
                    &d.manufacturer.manufacturer,
                    format!(
                        "{} medicines across {} categories",
                        format_number(d.manufacturer.medicine_count),
                        d.manufacturer.category_count
                    ),
                ),
                list_column(
                    "Categories",
                    d.categories
                        .iter()
                        .take(MANUFACTURER_TOP_CATEGORIES)
                        .map(|c| (c.category.as_str(), c.count)),
                ),
                list_column(
                    "Classification Split",
                    d.classifications.iter().map(|c| {
                        (c.classification.as_deref().unwrap_or("Unspecified"), c.count)
                    }),
                ),
            ]),
            close_button(),
        ]),
    }
}

fn columns(cols: [Element; 3]) -> Node {
    el("div").class("detail-grid").children(cols).into()
}

fn summary_column(heading: &str, name: &str, line: String) -> Element {
    el("div")
        .class("detail-column")
        .child(el("h4").text(heading))
        .child(el("p").class("detail-name").text(name))
        .child(el("p").class("detail-meta").text(line))
}

fn list_column<'a>(heading: &str, rows: impl Iterator<Item = (&'a str, u64)>) -> Element {
    el("div")
        .class("detail-column")
        .child(el("h4").text(heading))
        .child(el("ul").class("detail-list").children(rows.map(|(label, count)| {
            el("li")
                .child(el("span").class("detail-label").text(label))
                .child(el("span").class("detail-count").text(count.to_string()))
        })))
}

fn close_button() -> Node {
    el("button")
        .class("btn btn-secondary detail-close")
        .attr("data-action", "close-detail")
        .text("Close")
        .into()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
