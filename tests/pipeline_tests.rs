/// Pipeline tests.
///
/// Exercises the pieces between a user event and a rendered region without
/// the dashboard controller: filter collection, the preview updater's
/// request sequencing, config layering, report saving and the web routes.
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde_json::json;
use tiny_http::Method;

use mdvs::activity;
use mdvs::api::ApiError;
use mdvs::api::testing::FakeApi;
use mdvs::api::types::SearchResponse;
use mdvs::config::{self, schema::LoggingConfig};
use mdvs::dashboard::{Dashboard, Settings};
use mdvs::ui::debounce::ManualClock;
use mdvs::ui::export::Download;
use mdvs::ui::filters::{FilterCollector, FilterControl, FilterKey};
use mdvs::ui::preview::{PreviewState, PreviewUpdater};
use mdvs::web::dispatch;

fn quiet_log() {
    activity::init(&LoggingConfig {
        enabled: false,
        ..LoggingConfig::default()
    });
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

// ---------------------------------------------------------------------------
// Filter collection
// ---------------------------------------------------------------------------

#[test]
fn collector_coalesces_inputs_into_one_filter_set() {
    let mut filters = FilterCollector::new(ms(300));
    filters.on_input(FilterControl::Search, "a", ms(0));
    filters.on_input(FilterControl::Search, "as", ms(120));
    filters.on_input(FilterControl::Search, "  aspirin ", ms(250));

    assert_eq!(filters.poll(ms(500)), None);
    let fired = filters.poll(ms(550)).expect("debounced update");
    assert_eq!(fired.get(FilterKey::Query), Some("aspirin"));
    assert_eq!(fired.len(), 1);
    assert_eq!(filters.poll(ms(10_000)), None);
}

#[test]
fn empty_and_whitespace_controls_are_absent() {
    let mut filters = FilterCollector::new(ms(300));
    filters.on_input(FilterControl::Search, "   ", ms(0));
    let set = filters.on_change(FilterControl::Manufacturer, "");
    assert!(set.is_empty());
    assert_eq!(serde_json::to_value(&set).unwrap(), json!({}));
}

// ---------------------------------------------------------------------------
// Preview sequencing
// ---------------------------------------------------------------------------

#[test]
fn slow_older_count_never_overwrites_newer() {
    quiet_log();
    let mut preview = PreviewUpdater::new(10_000);
    let mut filters = FilterCollector::new(ms(300));

    let first = preview.begin(filters.on_change(FilterControl::Category, "Antibiotics"));
    let second = preview.begin(filters.on_change(FilterControl::Category, "Vitamins"));
    assert_eq!(second.path, "/api/medicines?category=Vitamins&limit=10000");

    let newer = SearchResponse {
        results: serde_json::from_value(json!([{"medicine_id": 1, "name": "C"}])).unwrap(),
    };
    assert!(preview.complete(&second, Ok(newer)));
    assert!(!preview.complete(&first, Err(ApiError::Network("late".into()))));

    assert_eq!(
        preview.state(),
        &PreviewState::Count {
            count: 1,
            filtered: true
        }
    );
}

#[test]
fn preview_count_uses_search_endpoint_with_limit() {
    quiet_log();
    let api = FakeApi::new().with_json(
        "/api/medicines?q=para%20cet&manufacturer=Acme&limit=50",
        json!({"results": [{"medicine_id": 1, "name": "A"}, {"medicine_id": 2, "name": "B"}]}),
    );
    let mut preview = PreviewUpdater::new(50);
    let mut filters = FilterCollector::new(ms(300));
    filters.on_input(FilterControl::Search, "para cet", ms(0));
    preview.refresh(&api, filters.on_change(FilterControl::Manufacturer, "Acme"));

    assert_eq!(
        preview.render().to_html(),
        "<strong>2</strong> medicines will be exported with current filters"
    );
}

// ---------------------------------------------------------------------------
// Config layering
// ---------------------------------------------------------------------------

#[test]
fn project_layer_overrides_global_key_by_key() {
    let dir = tempfile::tempdir().unwrap();
    let global = dir.path().join("config.toml");
    let project = dir.path().join(".mdvs.toml");
    fs::write(
        &global,
        "[api]\nbase_url = \"http://api.internal:8000\"\ntimeout_ms = 2000\n",
    )
    .unwrap();
    fs::write(&project, "[api]\ntimeout_ms = 500\n[charts]\ncontainer_width = 640.0\n").unwrap();

    let cfg = config::load_layers(&[Some(global), Some(project)]);
    assert_eq!(cfg.api.base_url, "http://api.internal:8000");
    assert_eq!(cfg.api.timeout_ms, 500);
    assert_eq!(cfg.charts.container_width, 640.0);
    assert_eq!(cfg.dashboard.preview_debounce_ms, 300);

    let settings = Settings::from_config(&cfg);
    assert_eq!(settings.container_width, 640.0);
}

#[test]
fn malformed_and_missing_layers_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken.toml");
    fs::write(&broken, "[api\nbase_url = ").unwrap();

    let cfg = config::load_layers(&[
        Some(broken),
        Some(PathBuf::from("/definitely/not/here.toml")),
        None,
    ]);
    assert_eq!(cfg, config::MdvsConfig::default());
}

#[test]
fn ill_typed_layer_is_dropped_without_losing_others() {
    let dir = tempfile::tempdir().unwrap();
    let global = dir.path().join("config.toml");
    let project = dir.path().join(".mdvs.toml");
    fs::write(&global, "[api]\nbase_url = \"http://api.internal:8000\"\n").unwrap();
    fs::write(
        &project,
        "[dashboard]\nranking_limit = 5\n[charts]\ncontainer_width = \"wide\"\n",
    )
    .unwrap();

    let cfg = config::load_layers(&[Some(global), Some(project)]);
    assert_eq!(cfg.api.base_url, "http://api.internal:8000");
    // The whole project file goes, including its well-typed keys.
    assert_eq!(cfg.dashboard.ranking_limit, 10);
    assert_eq!(cfg.charts.container_width, 800.0);
}

// ---------------------------------------------------------------------------
// Report saving
// ---------------------------------------------------------------------------

#[test]
fn download_is_written_under_its_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("reports");
    let download = Download {
        file_name: "medicine_report_42.pdf".into(),
        bytes: b"%PDF-1.4".to_vec(),
    };

    let path = download.save_to(&target).unwrap();
    assert_eq!(path, target.join("medicine_report_42.pdf"));
    assert_eq!(fs::read(path).unwrap(), b"%PDF-1.4");
}

// ---------------------------------------------------------------------------
// Web routes
// ---------------------------------------------------------------------------

#[test]
fn search_route_returns_results_fragment() {
    quiet_log();
    let api = FakeApi::new().with_json(
        "/api/medicines?q=ibuprofen",
        json!({"results": [{
            "medicine_id": 7, "name": "Ibuprofen",
            "indication": "Pain", "manufacturer_name": "Acme"
        }]}),
    );
    let mut d = Dashboard::new(api, ManualClock::new(), Settings::default());
    let reply = dispatch(&mut d, &Method::Get, "/search?q=+ibuprofen+", None).unwrap();

    assert_eq!(reply.status, 200);
    assert_eq!(
        reply.body_text(),
        "<div id=\"results\"><div class=\"result-item\" data-medicine-id=\"7\">\
         <strong>Ibuprofen</strong><br/><small>Pain — Acme</small></div></div>"
    );
}

#[test]
fn search_route_failure_renders_error_text() {
    quiet_log();
    let api = FakeApi::new().with_error("/api/medicines?q=x", ApiError::Parse("bad json".into()));
    let mut d = Dashboard::new(api, ManualClock::new(), Settings::default());
    let reply = dispatch(&mut d, &Method::Get, "/search?q=x", None).unwrap();
    assert_eq!(reply.body_text(), "<div id=\"results\"><p>Error.</p></div>");
}

#[test]
fn charts_route_before_insights_renders_empty_containers() {
    quiet_log();
    let mut d = Dashboard::new(FakeApi::new(), ManualClock::new(), Settings::default());
    let reply = dispatch(&mut d, &Method::Get, "/charts?width=640", None).unwrap();

    assert_eq!(reply.status, 200);
    assert_eq!(d.container_width(), 640.0);
    assert!(d.api().requests().is_empty());
    assert!(reply.body_text().starts_with("<div id=\"charts\" class=\"charts-grid\">"));
}
