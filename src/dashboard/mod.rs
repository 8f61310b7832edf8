//! The dashboard controller.
//!
//! [`Dashboard`] owns every piece of UI state (active tab, filter controls,
//! preview line, charts, detail panel, export status) and turns user events
//! into API calls and re-renders. It is generic over the transport and the
//! clock so the whole page can be driven from tests with a fake API and a
//! manual clock.
//!
//! Timers are not threads: debounced work is due at a deadline and runs on
//! the next [`Dashboard::tick`] at or after it.

use std::collections::HashMap;
use std::time::Duration;

use crate::api::Api;
use crate::config::MdvsConfig;
use crate::ui::charts::{ChartInteraction, ChartKind, ChartRegion, PointerEvent};
use crate::ui::debounce::{Clock, Debouncer};
use crate::ui::detail::{DetailKey, DetailPanel};
use crate::ui::export::{Download, Exporter, render_export_panel};
use crate::ui::filters::{FilterCollector, FilterControl, FilterControls, FilterSet};
use crate::ui::health::HealthStatus;
use crate::ui::overview::OverviewState;
use crate::ui::preview::PreviewUpdater;
use crate::ui::search::{SearchWidget, SelectOptions};
use crate::ui::tabs::{Tab, TabController};
use crate::ui::view::{Node, el};

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// The subset of configuration the controller runs on.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub initial_tab: Tab,
    pub input_debounce: Duration,
    pub resize_debounce: Duration,
    pub preview_limit: u32,
    pub ranking_limit: u32,
    pub container_width: f64,
    pub status_hide: Duration,
}

impl Settings {
    pub fn from_config(config: &MdvsConfig) -> Self {
        let d = &config.dashboard;
        Self {
            initial_tab: d.initial_tab.parse().unwrap_or(Tab::Search),
            input_debounce: Duration::from_millis(d.preview_debounce_ms),
            resize_debounce: Duration::from_millis(d.resize_debounce_ms),
            preview_limit: d.preview_limit,
            ranking_limit: d.ranking_limit,
            container_width: config.charts.container_width,
            status_hide: Duration::from_millis(config.export.status_hide_ms),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_config(&MdvsConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

pub struct Dashboard<A, C> {
    api: A,
    clock: C,
    settings: Settings,
    tabs: TabController,
    health: Option<HealthStatus>,
    search: SearchWidget,
    filters: FilterCollector,
    options: SelectOptions,
    preview: PreviewUpdater,
    exporter: Exporter,
    overview: OverviewState,
    charts: Vec<ChartRegion>,
    pointers: HashMap<ChartKind, ChartInteraction>,
    container_width: f64,
    resize: Debouncer<f64>,
    detail: DetailPanel,
}

impl<A: Api, C: Clock> Dashboard<A, C> {
    pub fn new(api: A, clock: C, settings: Settings) -> Self {
        Self {
            tabs: TabController::new(settings.initial_tab),
            health: None,
            search: SearchWidget::new(),
            filters: FilterCollector::new(settings.input_debounce),
            options: SelectOptions::default(),
            preview: PreviewUpdater::new(settings.preview_limit),
            exporter: Exporter::new(settings.status_hide),
            overview: OverviewState::default(),
            charts: ChartKind::ALL.into_iter().map(ChartRegion::new).collect(),
            pointers: HashMap::new(),
            container_width: settings.container_width,
            resize: Debouncer::new(settings.resize_debounce),
            detail: DetailPanel::new(),
            api,
            clock,
            settings,
        }
    }

    /// Page load: health check, export filter options, first preview, and
    /// the initial tab (which may start the insights load).
    pub fn start(&mut self) {
        self.health = Some(HealthStatus::check(&self.api));
        self.options = SelectOptions::load(&self.api);
        self.refresh_preview(self.filters.current());
        self.activate_tab(self.settings.initial_tab);
    }

    // -- tabs ---------------------------------------------------------------

    /// Switch tabs. Returns `true` if this activation loaded the insights.
    pub fn activate_tab(&mut self, tab: Tab) -> bool {
        let first = self.tabs.activate(tab);
        if first {
            self.load_insights();
        }
        first
    }

    /// Overview stats and all three charts.
    fn load_insights(&mut self) {
        self.overview = OverviewState::load(&self.api);
        self.render_charts();
    }

    fn render_charts(&mut self) {
        for region in &mut self.charts {
            region.load(&self.api, self.settings.ranking_limit, self.container_width);
        }
        // Old geometry is gone; so is any hover on it.
        self.pointers.clear();
    }

    // -- search -------------------------------------------------------------

    pub fn search(&mut self, query: &str) {
        self.search.search(&self.api, query);
    }

    // -- filters and preview -------------------------------------------------

    /// Text typed into a control. The preview refresh waits for quiet.
    pub fn filter_input(&mut self, control: FilterControl, value: &str) {
        let now = self.clock.now();
        self.filters.on_input(control, value, now);
    }

    /// A select changed. The preview refreshes immediately.
    pub fn filter_change(&mut self, control: FilterControl, value: &str) {
        let filters = self.filters.on_change(control, value);
        self.refresh_preview(filters);
    }

    /// Replace every control at once (a submitted filter form) and refresh.
    pub fn apply_filters(&mut self, controls: FilterControls) {
        let filters = self.filters.replace(controls);
        self.refresh_preview(filters);
    }

    fn refresh_preview(&mut self, filters: FilterSet) {
        self.preview.refresh(&self.api, filters);
    }

    // -- resize -------------------------------------------------------------

    /// The chart container width changed.
    pub fn resize(&mut self, width: f64) {
        let now = self.clock.now();
        self.resize.schedule(now, width);
    }

    /// Apply a settled container width: every loaded chart is fetched and
    /// rendered again from scratch. Charts that were never loaded pick the
    /// width up on first load.
    pub fn set_container_width(&mut self, width: f64) {
        self.container_width = width;
        if self.tabs.is_insights_loaded() {
            self.render_charts();
        }
    }

    // -- timers -------------------------------------------------------------

    /// Run whatever debounced work is due. Returns `true` if anything ran.
    pub fn tick(&mut self) -> bool {
        let now = self.clock.now();
        let mut ran = false;

        if let Some(filters) = self.filters.poll(now) {
            self.refresh_preview(filters);
            ran = true;
        }
        if let Some(width) = self.resize.poll(now) {
            self.set_container_width(width);
            ran = true;
        }
        self.exporter.tick(now);
        ran
    }

    /// Earliest pending deadline, if any timer is armed.
    pub fn next_deadline(&self) -> Option<Duration> {
        [self.filters.deadline(), self.resize.deadline()]
            .into_iter()
            .flatten()
            .min()
    }

    // -- charts and detail ----------------------------------------------------

    /// Pointer input on a chart. A click opens the detail panel.
    pub fn pointer(&mut self, kind: ChartKind, event: PointerEvent) {
        let Some(view) = self.chart(kind).and_then(ChartRegion::view) else {
            return;
        };
        let view = view.clone();
        let target = self.pointers.entry(kind).or_default().handle(&view, event);
        if let Some(key) = target {
            self.open_detail(key);
        }
    }

    pub fn open_detail(&mut self, key: DetailKey) {
        self.detail.show(&self.api, key);
    }

    pub fn close_detail(&mut self) {
        self.detail.close();
    }

    // -- export ---------------------------------------------------------------

    /// Export with the current filters, naming the file after the wall clock.
    pub fn export(&mut self) -> Option<Download> {
        self.export_at(chrono::Utc::now().timestamp_millis())
    }

    /// Export with the current filters, naming the file `epoch_millis`.
    pub fn export_at(&mut self, epoch_millis: i64) -> Option<Download> {
        let filters = self.filters.current();
        let now = self.clock.now();
        self.exporter.export(&self.api, &filters, now, epoch_millis)
    }

    // -- accessors ------------------------------------------------------------

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn tabs(&self) -> &TabController {
        &self.tabs
    }

    pub fn health(&self) -> Option<&HealthStatus> {
        self.health.as_ref()
    }

    pub fn search_widget(&self) -> &SearchWidget {
        &self.search
    }

    pub fn filters(&self) -> &FilterCollector {
        &self.filters
    }

    pub fn preview(&self) -> &PreviewUpdater {
        &self.preview
    }

    pub fn exporter(&self) -> &Exporter {
        &self.exporter
    }

    pub fn overview(&self) -> &OverviewState {
        &self.overview
    }

    pub fn chart(&self, kind: ChartKind) -> Option<&ChartRegion> {
        self.charts.iter().find(|r| r.kind() == kind)
    }

    pub fn interaction(&self, kind: ChartKind) -> Option<&ChartInteraction> {
        self.pointers.get(&kind)
    }

    pub fn container_width(&self) -> f64 {
        self.container_width
    }

    pub fn detail(&self) -> &DetailPanel {
        &self.detail
    }

    // -- rendering ------------------------------------------------------------

    /// The whole dashboard body.
    pub fn render_page(&self) -> Node {
        let health = self
            .health
            .as_ref()
            .map(HealthStatus::render_alert)
            .unwrap_or_else(|| Node::Fragment(Vec::new()));
        let tooltip = self
            .pointers
            .values()
            .find(|p| p.tooltip().visible)
            .map(|p| p.tooltip().render())
            .unwrap_or_else(|| el("div").class("tooltip").into());

        el("div")
            .class("app")
            .child(
                el("header")
                    .child(el("h1").text("Medicine Data Visualization System"))
                    .child(self.tabs.render_nav()),
            )
            .child(health)
            .child(el("main").children([
                self.tabs.render_panel(Tab::Search, self.search.render()),
                self.tabs.render_panel(Tab::Insights, self.render_insights()),
                self.tabs.render_panel(Tab::Export, self.render_export()),
            ]))
            .child(tooltip)
            .into()
    }

    /// Stat cards, the three chart cards and the detail panel.
    pub fn render_insights(&self) -> Node {
        Node::Fragment(vec![
            self.overview.render(),
            self.render_charts_grid(),
            self.detail.render(),
        ])
    }

    pub fn render_charts_grid(&self) -> Node {
        el("div")
            .id("charts")
            .class("charts-grid")
            .children(self.charts.iter().map(|region| {
                let kind = region.kind();
                el("div")
                    .class("chart-card")
                    .child(el("h3").class("chart-title").text(kind.title()))
                    .child(
                        el("div")
                            .id(kind.container_id())
                            .class("chart-container")
                            .child(region.render_with(self.pointers.get(&kind))),
                    )
            }))
            .into()
    }

    pub fn render_export(&self) -> Node {
        el("div")
            .id("export-container")
            .child(render_export_panel(
                self.filters.controls(),
                &self.options,
                self.preview.render(),
                self.exporter.render_status(),
            ))
            .into()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeApi;
    use crate::ui::debounce::ManualClock;
    use std::rc::Rc;

    fn dashboard(settings: Settings) -> (Dashboard<FakeApi, Rc<ManualClock>>, Rc<ManualClock>) {
        let clock = Rc::new(ManualClock::new());
        (Dashboard::new(FakeApi::new(), Rc::clone(&clock), settings), clock)
    }

    #[test]
    fn settings_follow_config() {
        let mut config = MdvsConfig::default();
        config.dashboard.initial_tab = "insights".into();
        config.dashboard.resize_debounce_ms = 100;
        config.charts.container_width = 640.0;
        let s = Settings::from_config(&config);
        assert_eq!(s.initial_tab, Tab::Insights);
        assert_eq!(s.resize_debounce, Duration::from_millis(100));
        assert_eq!(s.container_width, 640.0);

        config.dashboard.initial_tab = "bogus".into();
        assert_eq!(Settings::from_config(&config).initial_tab, Tab::Search);
    }

    #[test]
    fn next_deadline_is_earliest_timer() {
        let (mut d, clock) = dashboard(Settings::default());
        assert_eq!(d.next_deadline(), None);
        d.filter_input(FilterControl::Search, "a");
        clock.advance_ms(100);
        d.resize(500.0);
        assert_eq!(d.next_deadline(), Some(Duration::from_millis(300)));
    }

    #[test]
    fn resize_before_insights_only_records_width() {
        let (mut d, clock) = dashboard(Settings::default());
        d.resize(500.0);
        clock.advance_ms(250);
        assert!(d.tick());
        assert_eq!(d.container_width(), 500.0);
        assert!(d.api().requests().is_empty());
    }

    #[test]
    fn page_has_one_panel_per_tab() {
        let (d, _) = dashboard(Settings::default());
        let page = d.render_page();
        for tab in Tab::ALL {
            assert!(page.find_by_id(tab.id()).is_some(), "{tab}");
        }
        assert!(page.find_by_id("detail-panel").is_some());
        assert!(page.find_by_id("export-preview").is_some());
    }
}
