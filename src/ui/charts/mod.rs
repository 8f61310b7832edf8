//! Bar-chart rendering for the insights tab.
//!
//! Every chart follows one contract, implemented by [`ChartRegion`]:
//!
//! 1. `begin` replaces the container with a loading placeholder and issues a
//!    tagged request for the chart's endpoint.
//! 2. `complete` either renders the dataset or, on any failure, a fixed error
//!    placeholder. Nothing is retried or propagated.
//! 3. Rendering is pure: `(dataset, container width) → ChartView`, where the
//!    view carries both the SVG tree and the bar/label geometry used for
//!    pointer interaction.
//!
//! A resize re-runs the whole contract for every chart; there is no
//! incremental re-layout.

mod axis;
pub mod category;
pub mod classification;
pub mod manufacturer;
pub mod scale;

use crate::activity;
use crate::api::types::{CategoryShare, ClassificationRow, DataEnvelope, ManufacturerRank};
use crate::api::{self, Api, ApiError};

use super::detail::DetailKey;
use super::sequence::{RequestTracker, Ticket};
use super::view::{Element, Node, el, text};

/// Entry animation length for bars and labels.
pub const ENTRY_DURATION_MS: u64 = 600;

/// Default number of manufacturers in the ranking chart.
pub const DEFAULT_RANKING_LIMIT: u32 = 10;

/// Categorical palette, cycled by datum index.
pub const CHART_COLORS: [&str; 8] = [
    "#2563eb", "#7c3aed", "#06b6d4", "#10b981", "#f59e0b", "#ef4444", "#ec4899", "#8b5cf6",
];

pub fn chart_color(i: usize) -> &'static str {
    CHART_COLORS[i % CHART_COLORS.len()]
}

// ---------------------------------------------------------------------------
// Chart kinds
// ---------------------------------------------------------------------------

/// The three analytics charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    CategoryDistribution,
    ManufacturerRanking,
    ClassificationBreakdown,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [
        ChartKind::CategoryDistribution,
        ChartKind::ManufacturerRanking,
        ChartKind::ClassificationBreakdown,
    ];

    /// DOM id of the chart container.
    pub fn container_id(self) -> &'static str {
        match self {
            Self::CategoryDistribution => "category-chart",
            Self::ManufacturerRanking => "manufacturer-chart",
            Self::ClassificationBreakdown => "classification-chart",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::CategoryDistribution => "Medicines by Category",
            Self::ManufacturerRanking => "Top Manufacturers",
            Self::ClassificationBreakdown => "Prescription vs Over-the-Counter",
        }
    }

    /// Endpoint the chart's dataset comes from.
    pub fn path(self, ranking_limit: u32) -> String {
        match self {
            Self::CategoryDistribution => api::CATEGORY_DISTRIBUTION.to_string(),
            Self::ManufacturerRanking => api::manufacturer_ranking(ranking_limit),
            Self::ClassificationBreakdown => api::CATEGORY_CLASSIFICATION.to_string(),
        }
    }

    /// Fixed text shown when the fetch fails.
    pub fn error_text(self) -> &'static str {
        match self {
            Self::CategoryDistribution => "Failed to load category data",
            Self::ManufacturerRanking => "Failed to load manufacturer data",
            Self::ClassificationBreakdown => "Failed to load classification data",
        }
    }
}

// ---------------------------------------------------------------------------
// Layout and view
// ---------------------------------------------------------------------------

/// Space reserved around the plot area for axes and labels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// Outer size of the SVG and the plot area inside the margins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartLayout {
    pub margin: Margin,
    pub inner_width: f64,
    pub inner_height: f64,
}

impl ChartLayout {
    /// Width is driven by the container; the plot never goes negative.
    pub fn new(container_width: f64, outer_height: f64, margin: Margin) -> Self {
        Self {
            margin,
            inner_width: (container_width - margin.left - margin.right).max(0.0),
            inner_height: (outer_height - margin.top - margin.bottom).max(0.0),
        }
    }

    pub fn outer_width(&self) -> f64 {
        self.inner_width + self.margin.left + self.margin.right
    }

    pub fn outer_height(&self) -> f64 {
        self.inner_height + self.margin.top + self.margin.bottom
    }
}

/// Which dimension a bar grows along during its entry animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Growth {
    /// Horizontal bar growing rightwards from the left axis.
    Rightward,
    /// Vertical bar growing upwards from the bottom axis.
    Upward,
}

/// One drawn bar, in plot coordinates, at its final extent.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    /// Category or manufacturer the bar belongs to.
    pub key: String,
    /// Series within a group (grouped charts only).
    pub series: Option<&'static str>,
    pub value: u64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: String,
    pub corner_radius: f64,
    pub growth: Growth,
    /// Entry animation start offset.
    pub delay_ms: u64,
    /// Tooltip lines; the first is emphasized.
    pub tooltip: Vec<String>,
    pub detail: Option<DetailKey>,
}

/// A clickable axis label.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisLabel {
    /// Text shown (possibly truncated).
    pub text: String,
    /// Full key the label stands for.
    pub key: String,
    pub detail: Option<DetailKey>,
}

/// A rendered chart.
#[derive(Debug, Clone)]
pub struct ChartView {
    pub kind: ChartKind,
    pub layout: ChartLayout,
    pub bars: Vec<Bar>,
    pub labels: Vec<AxisLabel>,
    pub svg: Node,
}

/// Decode `value` into the chart's dataset and render it.
pub fn render_chart(
    kind: ChartKind,
    value: serde_json::Value,
    container_width: f64,
) -> Result<ChartView, ApiError> {
    Ok(match kind {
        ChartKind::CategoryDistribution => {
            let data: DataEnvelope<CategoryShare> = api::decode(value)?;
            category::render(&data.data, container_width)
        }
        ChartKind::ManufacturerRanking => {
            let data: DataEnvelope<ManufacturerRank> = api::decode(value)?;
            manufacturer::render(&data.data, container_width)
        }
        ChartKind::ClassificationBreakdown => {
            let data: DataEnvelope<ClassificationRow> = api::decode(value)?;
            classification::render(&data.data, container_width)
        }
    })
}

// ---------------------------------------------------------------------------
// Region (the fetch/render contract)
// ---------------------------------------------------------------------------

/// What a chart container currently holds.
#[derive(Debug, Clone)]
pub enum ChartContent {
    Empty,
    Loading,
    Failed,
    Ready(ChartView),
}

/// An issued chart fetch.
#[derive(Debug, Clone)]
pub struct ChartRequest {
    pub ticket: Ticket,
    pub kind: ChartKind,
    pub path: String,
}

/// One chart container and its request sequence.
#[derive(Debug, Clone)]
pub struct ChartRegion {
    kind: ChartKind,
    tracker: RequestTracker,
    content: ChartContent,
}

impl ChartRegion {
    pub fn new(kind: ChartKind) -> Self {
        Self {
            kind,
            tracker: RequestTracker::new(),
            content: ChartContent::Empty,
        }
    }

    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    pub fn content(&self) -> &ChartContent {
        &self.content
    }

    pub fn view(&self) -> Option<&ChartView> {
        match &self.content {
            ChartContent::Ready(view) => Some(view),
            _ => None,
        }
    }

    /// Show the loading placeholder and issue a request.
    pub fn begin(&mut self, ranking_limit: u32) -> ChartRequest {
        self.content = ChartContent::Loading;
        ChartRequest {
            ticket: self.tracker.issue(),
            kind: self.kind,
            path: self.kind.path(ranking_limit),
        }
    }

    /// Render the fetched dataset (or the error placeholder).
    ///
    /// Returns `false` when a newer request for this container superseded it.
    pub fn complete(
        &mut self,
        request: &ChartRequest,
        container_width: f64,
        result: Result<serde_json::Value, ApiError>,
    ) -> bool {
        if !self.tracker.is_current(request.ticket) {
            return false;
        }
        let rendered = result.and_then(|v| render_chart(self.kind, v, container_width));
        self.content = match rendered {
            Ok(view) => ChartContent::Ready(view),
            Err(err) => {
                activity::log_fetch_failure(self.kind.container_id(), &request.path, &err);
                ChartContent::Failed
            }
        };
        true
    }

    /// Begin, fetch and complete in one step.
    pub fn load(&mut self, api: &impl Api, ranking_limit: u32, container_width: f64) {
        let request = self.begin(ranking_limit);
        let result = api.get_json(&request.path);
        self.complete(&request, container_width, result);
    }

    /// Render the container's inner content.
    pub fn render(&self) -> Node {
        match &self.content {
            ChartContent::Empty => Node::Fragment(Vec::new()),
            ChartContent::Loading => el("div").class("loading-spinner").into(),
            ChartContent::Failed => el("div")
                .class("chart-error")
                .text(self.kind.error_text())
                .into(),
            ChartContent::Ready(view) => view.svg.clone(),
        }
    }

    /// Like [`render`](Self::render), with the pointer's hovered bar dimmed.
    pub fn render_with(&self, pointer: Option<&ChartInteraction>) -> Node {
        let mut node = self.render();
        if let (ChartContent::Ready(_), Some(pointer)) = (&self.content, pointer) {
            pointer.dim_hovered(&mut node);
        }
        node
    }
}

// ---------------------------------------------------------------------------
// Pointer interaction
// ---------------------------------------------------------------------------

/// Opacity of a hovered bar.
pub const HOVER_OPACITY: f64 = 0.8;

/// Something on the chart the pointer can hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Bar(usize),
    Label(usize),
}

/// Pointer input, in page coordinates for `Move`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Over(Target),
    Move { x: f64, y: f64 },
    Out,
    Click(Target),
}

/// Floating tooltip near the pointer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tooltip {
    pub lines: Vec<String>,
    pub left: f64,
    pub top: f64,
    pub visible: bool,
}

impl Tooltip {
    /// Offset from the pointer so the tooltip does not sit under it.
    pub fn move_to(&mut self, x: f64, y: f64) {
        self.left = x + 15.0;
        self.top = y - 10.0;
    }

    pub fn render(&self) -> Node {
        let mut children: Vec<Node> = Vec::new();
        for (i, line) in self.lines.iter().enumerate() {
            if i == 0 {
                children.push(el("strong").text(line.as_str()).into());
            } else {
                children.push(el("br").into());
                children.push(text(line.as_str()));
            }
        }
        let class = if self.visible { "tooltip visible" } else { "tooltip" };
        el("div")
            .class(class)
            .attr("style", format!("left: {}px; top: {}px", self.left, self.top))
            .children(children)
            .into()
    }
}

/// Hover/tooltip state for one chart.
#[derive(Debug, Clone, Default)]
pub struct ChartInteraction {
    hovered: Option<usize>,
    tooltip: Tooltip,
}

impl ChartInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// Current opacity of bar `i`.
    pub fn bar_opacity(&self, i: usize) -> f64 {
        if self.hovered == Some(i) {
            HOVER_OPACITY
        } else {
            1.0
        }
    }

    /// Set the hovered bar's opacity in a rendered chart.
    fn dim_hovered(&self, svg: &mut Node) {
        let Some(hovered) = self.hovered else {
            return;
        };
        let index = hovered.to_string();
        svg.for_each_element_mut(&mut |e| {
            if e.has_class("bar") && e.get_attr("data-index") == Some(index.as_str()) {
                e.set_attr("opacity", self.bar_opacity(hovered));
            }
        });
    }

    /// Apply a pointer event. A click on a bar or label returns the
    /// drill-down target to open.
    pub fn handle(&mut self, view: &ChartView, event: PointerEvent) -> Option<DetailKey> {
        match event {
            PointerEvent::Over(Target::Bar(i)) => {
                if let Some(bar) = view.bars.get(i) {
                    self.hovered = Some(i);
                    self.tooltip.lines = bar.tooltip.clone();
                    self.tooltip.visible = true;
                }
                None
            }
            PointerEvent::Over(Target::Label(_)) => None,
            PointerEvent::Move { x, y } => {
                self.tooltip.move_to(x, y);
                None
            }
            PointerEvent::Out => {
                self.hovered = None;
                self.tooltip.visible = false;
                None
            }
            PointerEvent::Click(Target::Bar(i)) => view.bars.get(i).and_then(|b| b.detail.clone()),
            PointerEvent::Click(Target::Label(i)) => {
                view.labels.get(i).and_then(|l| l.detail.clone())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Shared SVG pieces
// ---------------------------------------------------------------------------

/// Outer `<svg>` with the translated plot group.
fn svg_frame(kind: ChartKind, layout: &ChartLayout, plot: Vec<Node>, defs: Option<Element>) -> Node {
    let mut svg = el("svg")
        .class("chart")
        .attr("data-chart", kind.container_id())
        .attr("width", layout.outer_width())
        .attr("height", layout.outer_height())
        .attr("xmlns", "http://www.w3.org/2000/svg");
    if let Some(defs) = defs {
        svg = svg.child(defs);
    }
    svg.child(
        el("g")
            .attr(
                "transform",
                format!("translate({},{})", layout.margin.left, layout.margin.top),
            )
            .children(plot),
    )
    .into()
}

/// Attributes that let a page script attach hover and click behavior.
fn interaction_attrs(mut e: Element, tooltip: &[String], detail: Option<&DetailKey>) -> Element {
    e.set_attr("data-tooltip", tooltip.join("\n"));
    if let Some(key) = detail {
        e.set_attr("data-detail", key.route());
        e.set_attr("style", "cursor: pointer");
    }
    e
}

/// `<rect>` drawn at zero extent that animates to the bar's final geometry.
fn bar_rect(bar: &Bar, index: usize) -> Element {
    let dur = format!("{ENTRY_DURATION_MS}ms");
    let begin = format!("{}ms", bar.delay_ms);
    let rect = el("rect")
        .class("bar")
        .attr("data-index", index)
        .attr("x", bar.x)
        .attr("fill", bar.fill.as_str())
        .attr("rx", bar.corner_radius);

    let rect = match bar.growth {
        Growth::Rightward => rect
            .attr("y", bar.y)
            .attr("height", bar.height)
            .attr("width", 0)
            .child(grow("width", 0.0, bar.width, &dur, &begin)),
        Growth::Upward => rect
            .attr("width", bar.width)
            .attr("y", bar.y + bar.height)
            .attr("height", 0)
            .child(grow("y", bar.y + bar.height, bar.y, &dur, &begin))
            .child(grow("height", 0.0, bar.height, &dur, &begin)),
    };
    interaction_attrs(rect, &bar.tooltip, bar.detail.as_ref())
}

/// `<text>` that fades in after its bar.
fn fade_in_label(x: f64, y: f64, label: String, delay_ms: u64, font_size: &str, weight: &str) -> Element {
    el("text")
        .class("bar-label")
        .attr("x", x)
        .attr("y", y)
        .attr("dy", "0.35em")
        .attr("fill", "#64748b")
        .attr("font-size", font_size)
        .attr("font-weight", weight)
        .attr("opacity", 0)
        .text(label)
        .child(grow(
            "opacity",
            0.0,
            1.0,
            &format!("{ENTRY_DURATION_MS}ms"),
            &format!("{delay_ms}ms"),
        ))
}

fn grow(attribute: &str, from: f64, to: f64, dur: &str, begin: &str) -> Element {
    el("animate")
        .attr("attributeName", attribute)
        .attr("from", from)
        .attr("to", to)
        .attr("dur", dur)
        .attr("begin", begin)
        .attr("fill", "freeze")
}

/// Largest of `values`, or zero for an empty dataset.
fn max_value(values: impl Iterator<Item = u64>) -> f64 {
    values.max().unwrap_or(0) as f64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
