//! CLI command implementations for mdvs.
//!
//! Provides subcommand handlers for:
//! - `mdvs health`: config files, API and database reachability, activity log
//! - `mdvs search <query>`: medicine search
//! - `mdvs preview`: how many medicines the given filters would export
//! - `mdvs export`: download the filtered PDF report
//! - `mdvs insights`: overview stats and the three charts (optionally as HTML)
//! - `mdvs detail category|manufacturer <name>`: drill-down details
//! - `mdvs web`: serve the dashboard in a browser
//! - `mdvs config show|init|set|reset`: configuration management

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::activity::{self, Level};
use crate::api::types::{MedicineHit, SearchResponse};
use crate::api::{self, HttpClient};
use crate::config::{self, MdvsConfig};
use crate::dashboard::{Dashboard, Settings};
use crate::ui::charts::{ChartContent, ChartKind, ChartRegion};
use crate::ui::debounce::{Clock, SystemClock};
use crate::ui::detail::{DetailContent, DetailData, DetailKey, DetailPanel, FAILURE_TEXT};
use crate::ui::export::{ExportStatus, Exporter, resolve_output_dir};
use crate::ui::filters::FilterControls;
use crate::ui::format::format_number;
use crate::ui::health::HealthStatus;
use crate::ui::overview::OverviewState;
use crate::ui::preview::PreviewUpdater;
use crate::ui::search::{SearchState, SearchWidget};
use crate::ui::tabs::Tab;
use crate::web;

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// mdvs health
// ---------------------------------------------------------------------------

/// Check config files, API and database reachability, and the activity log.
pub fn run_health(cfg: &MdvsConfig) -> Result<()> {
    println!("{}", "MDVS Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.mdvs/config.toml found"
        } else {
            "not found (run `mdvs config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".mdvs.toml found"
        } else {
            "none (optional)"
        },
    );

    let client = HttpClient::from_config(&cfg.api);
    match HealthStatus::check(&client) {
        HealthStatus::Reachable { database } => {
            print_health_item("API", true, &format!("reachable at {}", client.base_url()));
            let db_ok = database != "error";
            print_health_item("Database", db_ok, &database);
        }
        HealthStatus::Unreachable(err) => {
            print_health_item(
                "API",
                false,
                &format!("{} ({err})", client.base_url()),
            );
        }
    }

    let log_path = activity::log_path();
    let log_exists = log_path.as_ref().map(|p| p.exists()).unwrap_or(false);
    let recent = if log_exists {
        activity::read_recent(200)
    } else {
        Vec::new()
    };
    let failures = recent.iter().filter(|e| e.level >= Level::Error).count();
    print_health_item(
        "Activity log",
        log_exists && cfg.logging.enabled,
        &match (&log_path, log_exists) {
            (Some(p), true) => format!(
                "{} ({} recent entries, {} failures)",
                p.display(),
                recent.len(),
                failures
            ),
            _ if !cfg.logging.enabled => "disabled".to_string(),
            _ => "no log file yet".to_string(),
        },
    );

    if let Some(last) = recent.iter().rev().find(|e| e.level >= Level::Error) {
        println!();
        println!(
            "  {} {} {} {}",
            "Last failure:".dimmed(),
            last.timestamp,
            last.region.as_deref().unwrap_or("-"),
            last.detail.as_deref().unwrap_or("").red()
        );
    }

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<18} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// mdvs search
// ---------------------------------------------------------------------------

pub fn run_search(cfg: &MdvsConfig, query: &str, format: OutputFormat) -> Result<()> {
    let client = HttpClient::from_config(&cfg.api);

    if format == OutputFormat::Json {
        let resp: SearchResponse = api::fetch(&client, &api::medicine_search(query.trim()))
            .context("search request failed")?;
        let rows: Vec<serde_json::Value> = resp.results.iter().map(hit_json).collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let mut widget = SearchWidget::new();
    widget.search(&client, query);
    match widget.state() {
        SearchState::Results(hits) if hits.is_empty() => {
            println!("{}", "No results found.".yellow());
        }
        SearchState::Results(hits) => {
            for hit in hits {
                println!("{}", hit.name.bold());
                println!(
                    "  {} — {}",
                    hit.indication.as_deref().unwrap_or("-").dimmed(),
                    hit.manufacturer_name.as_deref().unwrap_or("-").dimmed()
                );
            }
            println!();
            println!("{} results", format_number(hits.len() as u64));
        }
        _ => anyhow::bail!("search failed (see `mdvs health` for the last error)"),
    }
    Ok(())
}

fn hit_json(hit: &MedicineHit) -> serde_json::Value {
    serde_json::json!({
        "medicine_id": hit.medicine_id,
        "name": hit.name,
        "indication": hit.indication,
        "manufacturer_name": hit.manufacturer_name,
    })
}

// ---------------------------------------------------------------------------
// mdvs preview / export
// ---------------------------------------------------------------------------

/// Print the export preview line for the given filters.
pub fn run_preview(cfg: &MdvsConfig, controls: &FilterControls) -> Result<()> {
    let client = HttpClient::from_config(&cfg.api);
    let mut preview = PreviewUpdater::new(cfg.dashboard.preview_limit);
    preview.refresh(&client, controls.collect());
    println!("{}", preview.render().text_content());
    Ok(())
}

/// Export the filtered PDF report into `out` (or the configured directory).
pub fn run_export(cfg: &MdvsConfig, controls: &FilterControls, out: Option<&Path>) -> Result<()> {
    let client = HttpClient::from_config(&cfg.api);
    let filters = controls.collect();

    let mut preview = PreviewUpdater::new(cfg.dashboard.preview_limit);
    preview.refresh(&client, filters.clone());
    println!("  {}", preview.render().text_content().dimmed());

    let clock = SystemClock::new();
    let mut exporter = Exporter::new(Duration::from_millis(cfg.export.status_hide_ms));
    println!("{}", crate::ui::export::GENERATING_TEXT);
    let download = exporter.export(
        &client,
        &filters,
        clock.now(),
        chrono::Utc::now().timestamp_millis(),
    );

    match (download, exporter.status()) {
        (Some(download), _) => {
            let dir = match out {
                Some(dir) => dir.to_path_buf(),
                None => resolve_output_dir(Some(&cfg.export.output_dir)),
            };
            let path = download.save_to(&dir)?;
            println!(
                "{} Saved {} ({} bytes)",
                "✓".green().bold(),
                path.display(),
                format_number(download.bytes.len() as u64)
            );
            Ok(())
        }
        (None, ExportStatus::Failed(msg)) => anyhow::bail!("Export failed: {msg}"),
        (None, _) => anyhow::bail!("Export failed"),
    }
}

// ---------------------------------------------------------------------------
// mdvs insights
// ---------------------------------------------------------------------------

/// Load the insights tab and print it, or write the rendered page to `out`.
pub fn run_insights(cfg: &MdvsConfig, width: Option<f64>, out: Option<&Path>) -> Result<()> {
    let mut settings = Settings::from_config(cfg);
    if let Some(width) = width.filter(|w| *w > 0.0) {
        settings.container_width = width;
    }
    let mut dashboard = Dashboard::new(
        HttpClient::from_config(&cfg.api),
        SystemClock::new(),
        settings,
    );
    dashboard.activate_tab(Tab::Insights);

    if let Some(path) = out {
        fs::write(path, web::render_document(&dashboard))
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("{} Wrote {}", "✓".green().bold(), path.display());
        return Ok(());
    }

    println!("{}", "Overview".bold().cyan());
    match dashboard.overview() {
        OverviewState::Loaded(cards) => {
            for card in cards {
                println!("  {:<18} {}", card.label, card.value.bold());
            }
        }
        _ => println!("  {}", "Failed to load data".red()),
    }

    for kind in ChartKind::ALL {
        println!();
        println!("{}", kind.title().bold().cyan());
        if let Some(region) = dashboard.chart(kind) {
            print_chart(region);
        }
    }
    Ok(())
}

fn print_chart(region: &ChartRegion) {
    match region.content() {
        ChartContent::Ready(view) if view.bars.is_empty() => println!("  {}", "(no data)".dimmed()),
        ChartContent::Ready(view) => {
            let max = view.bars.iter().map(|b| b.value).max().unwrap_or(0).max(1);
            for bar in &view.bars {
                let label = match bar.series {
                    Some(series) => format!("{} / {series}", bar.key),
                    None => bar.key.clone(),
                };
                let len = (bar.value * 30).div_ceil(max) as usize;
                println!(
                    "  {:<36} {:>8} {}",
                    truncate(&label, 36),
                    format_number(bar.value),
                    "█".repeat(len).blue()
                );
            }
        }
        ChartContent::Failed => println!("  {}", region.kind().error_text().red()),
        ChartContent::Loading | ChartContent::Empty => {}
    }
}

// ---------------------------------------------------------------------------
// mdvs detail
// ---------------------------------------------------------------------------

pub fn run_detail(cfg: &MdvsConfig, key: DetailKey) -> Result<()> {
    let client = HttpClient::from_config(&cfg.api);
    let mut panel = DetailPanel::new();
    panel.show(&client, key.clone());

    println!("{}", key.title().bold().cyan());
    println!("{}", "=".repeat(40));
    match panel.content() {
        Some(DetailContent::Loaded(DetailData::Category(d))) => {
            println!(
                "{} — {} medicines from {} manufacturers",
                d.category.category.bold(),
                format_number(d.category.medicine_count),
                d.category.manufacturer_count
            );
            print_list(
                "Top Manufacturers",
                d.top_manufacturers.iter().map(|m| (m.manufacturer.as_str(), m.count)),
            );
            print_list(
                "Dosage Forms",
                d.dosage_forms
                    .iter()
                    .map(|f| (f.dosage_form.as_deref().unwrap_or("Unspecified"), f.count)),
            );
        }
        Some(DetailContent::Loaded(DetailData::Manufacturer(d))) => {
            println!(
                "{} — {} medicines across {} categories",
                d.manufacturer.manufacturer.bold(),
                format_number(d.manufacturer.medicine_count),
                d.manufacturer.category_count
            );
            print_list(
                "Categories",
                d.categories.iter().take(5).map(|c| (c.category.as_str(), c.count)),
            );
            print_list(
                "Classification Split",
                d.classifications
                    .iter()
                    .map(|c| (c.classification.as_deref().unwrap_or("Unspecified"), c.count)),
            );
        }
        _ => anyhow::bail!("{FAILURE_TEXT}"),
    }
    Ok(())
}

fn print_list<'a>(heading: &str, rows: impl Iterator<Item = (&'a str, u64)>) {
    println!();
    println!("{}", heading.bold());
    for (label, count) in rows {
        println!("  {:<32} {:>8}", truncate(label, 32), format_number(count));
    }
}

// ---------------------------------------------------------------------------
// mdvs web
// ---------------------------------------------------------------------------

pub fn run_web(cfg: &MdvsConfig, addr: Option<&str>, open: bool) -> Result<()> {
    let addr = addr.unwrap_or(&cfg.web.addr);
    web::serve(cfg, addr, open)
}

// ---------------------------------------------------------------------------
// mdvs config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective MDVS Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source(global_exists, "~/.mdvs/config.toml");
    print_source(project_exists, ".mdvs.toml");
    println!(
        "  {} {}",
        "·".dimmed(),
        "MDVS_* environment variables".dimmed()
    );
    Ok(())
}

fn print_source(exists: bool, name: &str) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.mdvs/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    println!("  {}", "Edit the file to point mdvs at your API.".dimmed());
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_defaults_to_table() {
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_opt(Some("csv")), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
    }

    #[test]
    fn truncate_keeps_short_and_cuts_long() {
        assert_eq!(truncate("Acme", 10), "Acme");
        assert_eq!(truncate("Globex Pharmaceutical", 10), "Globex ...");
    }

    #[test]
    fn hit_json_keeps_nulls() {
        let hit = MedicineHit {
            medicine_id: 3,
            name: "Ibuprofen".into(),
            indication: None,
            manufacturer_name: Some("Acme".into()),
        };
        assert_eq!(
            hit_json(&hit),
            serde_json::json!({
                "medicine_id": 3, "name": "Ibuprofen",
                "indication": null, "manufacturer_name": "Acme"
            })
        );
    }
}
