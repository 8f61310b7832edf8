/// Chart region tests.
///
/// Covers the fetch/render contract of each chart container (loading, empty,
/// error placeholder, stale responses), the grouped classification chart,
/// resize re-rendering and pointer interaction.
use std::rc::Rc;

use serde_json::json;

use mdvs::activity;
use mdvs::api::ApiError;
use mdvs::api::testing::FakeApi;
use mdvs::config::schema::LoggingConfig;
use mdvs::dashboard::{Dashboard, Settings};
use mdvs::ui::charts::classification::{OVER_THE_COUNTER, PRESCRIPTION};
use mdvs::ui::charts::{
    ChartContent, ChartKind, ChartRegion, HOVER_OPACITY, PointerEvent, Target,
};
use mdvs::ui::debounce::ManualClock;
use mdvs::ui::tabs::Tab;

const DISTRIBUTION: &str = "/api/insights/categories/distribution";
const RANKING: &str = "/api/insights/manufacturers/ranking?limit=10";
const CLASSIFICATION: &str = "/api/insights/categories/classification";

fn quiet_log() {
    activity::init(&LoggingConfig {
        enabled: false,
        ..LoggingConfig::default()
    });
}

fn charts_api() -> FakeApi {
    FakeApi::new()
        .with_json(
            "/api/insights/overview",
            json!({"total_medicines": 0, "total_manufacturers": 0, "total_categories": 0}),
        )
        .with_json(
            DISTRIBUTION,
            json!({"data": [
                {"category": "Pain Relief", "count": 100, "percentage": "62.5"},
                {"category": "Antibiotics", "count": 60, "percentage": 37.5}
            ]}),
        )
        .with_json(
            RANKING,
            json!({"data": [
                {"manufacturer": "Acme", "medicine_count": 80, "category_count": 4, "market_share": 50.0},
                {"manufacturer": "Globex", "medicine_count": 40, "category_count": 2, "market_share": 25.0}
            ]}),
        )
        .with_json(
            CLASSIFICATION,
            json!({"data": [
                {"category": "Pain Relief", "Prescription": 40, "Over-the-Counter": 60}
            ]}),
        )
}

fn insights(api: FakeApi) -> (Dashboard<FakeApi, Rc<ManualClock>>, Rc<ManualClock>) {
    quiet_log();
    let clock = Rc::new(ManualClock::new());
    let mut d = Dashboard::new(api, Rc::clone(&clock), Settings::default());
    d.activate_tab(Tab::Insights);
    (d, clock)
}

// ---------------------------------------------------------------------------
// Region contract
// ---------------------------------------------------------------------------

#[test]
fn empty_dataset_draws_zero_bars_not_error() {
    quiet_log();
    let api = FakeApi::new().with_json(DISTRIBUTION, json!({"data": []}));
    let mut region = ChartRegion::new(ChartKind::CategoryDistribution);
    region.load(&api, 10, 800.0);

    let ChartContent::Ready(view) = region.content() else {
        panic!("expected a rendered chart, got {:?}", region.content());
    };
    assert!(view.bars.is_empty());
    let html = region.render().to_html();
    assert!(html.starts_with("<svg"));
    assert!(!html.contains("Failed to load"));
}

#[test]
fn fetch_error_shows_placeholder_text() {
    quiet_log();
    let api = FakeApi::new().with_error(
        RANKING,
        ApiError::Http {
            status: 503,
            reason: "Service Unavailable".into(),
        },
    );
    let mut region = ChartRegion::new(ChartKind::ManufacturerRanking);
    region.load(&api, 10, 800.0);

    assert!(matches!(region.content(), ChartContent::Failed));
    assert_eq!(
        region.render().to_html(),
        "<div class=\"chart-error\">Failed to load manufacturer data</div>"
    );
}

#[test]
fn malformed_payload_is_treated_as_failure() {
    quiet_log();
    let api = FakeApi::new().with_json(CLASSIFICATION, json!({"data": [{"nope": 1}]}));
    let mut region = ChartRegion::new(ChartKind::ClassificationBreakdown);
    region.load(&api, 10, 800.0);
    assert!(region.render().to_html().contains("Failed to load classification data"));
}

#[test]
fn loading_spinner_until_response_and_stale_response_dropped() {
    quiet_log();
    let mut region = ChartRegion::new(ChartKind::CategoryDistribution);
    let old = region.begin(10);
    assert!(region.render().to_html().contains("loading-spinner"));

    let new = region.begin(10);
    assert!(!region.complete(&old, 800.0, Err(ApiError::Network("late".into()))));
    assert!(matches!(region.content(), ChartContent::Loading));

    assert!(region.complete(&new, 800.0, Ok(json!({"data": []}))));
    assert!(matches!(region.content(), ChartContent::Ready(_)));
}

// ---------------------------------------------------------------------------
// Rendered charts
// ---------------------------------------------------------------------------

#[test]
fn classification_groups_prescription_and_otc() {
    let (d, _) = insights(charts_api());
    let view = d
        .chart(ChartKind::ClassificationBreakdown)
        .and_then(ChartRegion::view)
        .expect("classification chart");

    assert_eq!(view.bars.len(), 2);
    assert_eq!(view.bars[0].series, Some(PRESCRIPTION));
    assert_eq!(view.bars[1].series, Some(OVER_THE_COUNTER));
    assert_eq!(view.bars[0].value, 40);
    assert_eq!(view.bars[1].value, 60);
    assert!(view.bars[1].height > view.bars[0].height);
    assert!((view.bars[0].height / view.bars[1].height - 40.0 / 60.0).abs() < 1e-9);
}

#[test]
fn category_bars_follow_input_order_and_are_clickable() {
    let (d, _) = insights(charts_api());
    let view = d
        .chart(ChartKind::CategoryDistribution)
        .and_then(ChartRegion::view)
        .expect("category chart");

    let keys: Vec<&str> = view.bars.iter().map(|b| b.key.as_str()).collect();
    assert_eq!(keys, vec!["Pain Relief", "Antibiotics"]);
    assert!(view.bars.iter().all(|b| b.detail.is_some()));
    assert!(view.bars[0].width > view.bars[1].width);
}

#[test]
fn charts_grid_has_one_card_per_chart() {
    let (d, _) = insights(charts_api());
    let grid = d.render_charts_grid();
    assert_eq!(grid.find_by_class("chart-card").len(), 3);
    for kind in ChartKind::ALL {
        assert!(grid.find_by_id(kind.container_id()).is_some(), "{kind:?}");
    }
}

// ---------------------------------------------------------------------------
// Resize
// ---------------------------------------------------------------------------

#[test]
fn settled_resize_refetches_every_chart_at_new_width() {
    let (mut d, clock) = insights(charts_api());
    assert_eq!(d.api().get_count(DISTRIBUTION), 1);

    d.resize(700.0);
    clock.advance_ms(100);
    d.resize(500.0);
    clock.advance_ms(249);
    assert!(!d.tick());
    clock.advance_ms(1);
    assert!(d.tick());

    for path in [DISTRIBUTION, RANKING, CLASSIFICATION] {
        assert_eq!(d.api().get_count(path), 2, "{path}");
    }
    assert_eq!(d.api().get_count("/api/insights/overview"), 1);
    let view = d
        .chart(ChartKind::ManufacturerRanking)
        .and_then(ChartRegion::view)
        .expect("manufacturer chart");
    assert!((view.layout.outer_width() - 500.0).abs() < 1e-9);
}

// ---------------------------------------------------------------------------
// Pointer interaction
// ---------------------------------------------------------------------------

#[test]
fn hover_shows_tooltip_and_dims_bar() {
    let (mut d, _) = insights(charts_api());
    let kind = ChartKind::ManufacturerRanking;

    d.pointer(kind, PointerEvent::Over(Target::Bar(1)));
    d.pointer(kind, PointerEvent::Move { x: 100.0, y: 50.0 });

    let pointer = d.interaction(kind).expect("interaction");
    assert_eq!(pointer.hovered(), Some(1));
    assert_eq!(pointer.bar_opacity(1), HOVER_OPACITY);
    assert_eq!(pointer.bar_opacity(0), 1.0);
    assert!(pointer.tooltip().visible);
    assert_eq!(pointer.tooltip().lines[0], "Globex");
    assert_eq!((pointer.tooltip().left, pointer.tooltip().top), (115.0, 40.0));

    d.pointer(kind, PointerEvent::Out);
    let pointer = d.interaction(kind).expect("interaction");
    assert_eq!(pointer.hovered(), None);
    assert!(!pointer.tooltip().visible);
}

#[test]
fn hovered_bar_is_dimmed_in_rendered_grid() {
    let (mut d, _) = insights(charts_api());
    let kind = ChartKind::ManufacturerRanking;
    let dimmed = |d: &Dashboard<FakeApi, Rc<ManualClock>>| -> Vec<String> {
        d.render_charts_grid()
            .find_all(|e| e.has_class("bar") && e.get_attr("opacity").is_some())
            .into_iter()
            .map(|e| {
                format!(
                    "{}@{}",
                    e.get_attr("data-tooltip").unwrap_or_default(),
                    e.get_attr("opacity").unwrap_or_default()
                )
            })
            .collect()
    };
    assert!(dimmed(&d).is_empty());

    d.pointer(kind, PointerEvent::Over(Target::Bar(1)));
    let shown = dimmed(&d);
    assert_eq!(shown.len(), 1);
    assert!(shown[0].starts_with("Globex\n"), "{shown:?}");
    assert!(shown[0].ends_with(&format!("@{HOVER_OPACITY}")), "{shown:?}");

    d.pointer(kind, PointerEvent::Out);
    assert!(dimmed(&d).is_empty());
}

#[test]
fn clicking_manufacturer_label_requests_detail() {
    let api = charts_api().with_error(
        "/api/insights/manufacturers/Acme",
        ApiError::Network("down".into()),
    );
    let (mut d, _) = insights(api);

    d.pointer(ChartKind::ManufacturerRanking, PointerEvent::Click(Target::Label(0)));
    assert_eq!(d.api().get_count("/api/insights/manufacturers/Acme"), 1);
    assert!(d.detail().is_visible());
    assert!(d.detail().render().to_html().contains("Failed to load details"));
}
