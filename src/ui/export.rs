//! PDF export: request body, status line, file naming and the filter panel.
//!
//! The export call is the one place where an API error's message reaches the
//! user, through the status line.
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::json;

use crate::activity;
use crate::api::{self, Api, ApiError};

use super::filters::{FilterControl, FilterControls, FilterSet};
use super::search::{CLASSIFICATIONS, SelectOptions};
use super::view::{Element, Node, el};

pub const GENERATING_TEXT: &str = "Generating PDF...";
pub const SUCCESS_TEXT: &str = "PDF exported successfully! Check your downloads.";

/// How long the success message stays up.
pub const STATUS_HIDE_MS: u64 = 3000;

/// JSON body for `POST /api/export/pdf`.
pub fn export_body(filters: &FilterSet) -> serde_json::Value {
    json!({ "filters": filters })
}

/// `medicine_report_<epoch-millis>.pdf`
pub fn report_file_name(epoch_millis: i64) -> String {
    format!("medicine_report_{epoch_millis}.pdf")
}

/// A downloaded report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Download {
    /// Write the report into `dir` (created if missing).
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output dir {}", dir.display()))?;
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.bytes)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }
}

/// Where reports go: the configured dir, else the OS download dir, else cwd.
pub fn resolve_output_dir(configured: Option<&str>) -> PathBuf {
    if let Some(dir) = configured.filter(|d| !d.trim().is_empty()) {
        if let Some(expanded) = activity::expand_home(dir) {
            return expanded;
        }
    }
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}

// ---------------------------------------------------------------------------
// Status line
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStatus {
    Hidden,
    Generating,
    /// Shown until `hide_at`.
    Success { hide_at: Duration },
    Failed(String),
}

/// Export trigger state.
#[derive(Debug, Clone)]
pub struct Exporter {
    status: ExportStatus,
    hide_after: Duration,
}

impl Exporter {
    pub fn new(hide_after: Duration) -> Self {
        Self {
            status: ExportStatus::Hidden,
            hide_after,
        }
    }

    pub fn status(&self) -> &ExportStatus {
        &self.status
    }

    /// The button was clicked.
    pub fn begin(&mut self) {
        self.status = ExportStatus::Generating;
    }

    /// Apply the export response. On success returns the file to save.
    pub fn finish(
        &mut self,
        filters: &FilterSet,
        result: Result<Vec<u8>, ApiError>,
        now: Duration,
        epoch_millis: i64,
    ) -> Option<Download> {
        match result {
            Ok(bytes) => {
                let download = Download {
                    file_name: report_file_name(epoch_millis),
                    bytes,
                };
                activity::log_export(&download.file_name, download.bytes.len(), filters);
                self.status = ExportStatus::Success {
                    hide_at: now + self.hide_after,
                };
                Some(download)
            }
            Err(err) => {
                activity::log_fetch_failure("export-status", api::EXPORT_PDF, &err);
                self.status = ExportStatus::Failed(err.to_string());
                None
            }
        }
    }

    /// Post the filters and apply the response.
    pub fn export(
        &mut self,
        api: &impl Api,
        filters: &FilterSet,
        now: Duration,
        epoch_millis: i64,
    ) -> Option<Download> {
        self.begin();
        let result = api.post_json_bytes(api::EXPORT_PDF, &export_body(filters));
        self.finish(filters, result, now, epoch_millis)
    }

    /// Hide the success message once its time is up.
    pub fn tick(&mut self, now: Duration) {
        if let ExportStatus::Success { hide_at } = self.status {
            if now >= hide_at {
                self.status = ExportStatus::Hidden;
            }
        }
    }

    pub fn render_status(&self) -> Node {
        let status = el("div").id("export-status");
        match &self.status {
            ExportStatus::Hidden => status.attr("style", "display: none;").into(),
            ExportStatus::Generating => status_line(status, "loading", "⏳", GENERATING_TEXT),
            ExportStatus::Success { .. } => status_line(status, "success", "✅", SUCCESS_TEXT),
            ExportStatus::Failed(msg) => {
                status_line(status, "error", "❌", &format!("Export failed: {msg}"))
            }
        }
    }
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(Duration::from_millis(STATUS_HIDE_MS))
    }
}

fn status_line(div: Element, kind: &str, icon: &str, message: &str) -> Node {
    div.class(&format!("export-status {kind}"))
        .child(el("span").text(icon))
        .child(el("span").text(message))
        .into()
}

// ---------------------------------------------------------------------------
// Panel
// ---------------------------------------------------------------------------

/// The export tab: filters, preview line, button and status.
pub fn render_export_panel(
    controls: &FilterControls,
    options: &SelectOptions,
    preview: Node,
    status: Node,
) -> Node {
    let search = el("input")
        .id(FilterControl::Search.element_id())
        .class("search-input")
        .attr("type", "text")
        .attr("name", "q")
        .attr("placeholder", "Search by name or indication...")
        .attr("value", controls.value(FilterControl::Search));

    let filters = el("div")
        .class("export-filters-section")
        .child(el("div").class("export-filters-title").text("Filter Data to Export"))
        .child(
            el("div")
                .class("export-filters-grid")
                .child(search)
                .child(select(
                    FilterControl::Category,
                    "All Categories",
                    &options.categories,
                    controls,
                ))
                .child(select(
                    FilterControl::Manufacturer,
                    "All Manufacturers",
                    &options.manufacturers,
                    controls,
                ))
                .child(select(
                    FilterControl::Classification,
                    "All Classifications",
                    CLASSIFICATIONS.iter(),
                    controls,
                )),
        )
        .child(el("div").id("export-preview").child(preview));

    el("div")
        .class("export-panel")
        .child(el("div").class("export-header").child(el("h3").text("Export to PDF")))
        .child(filters)
        .child(
            el("button")
                .id("export-btn")
                .class("export-btn-main")
                .text("Download PDF Report"),
        )
        .child(status)
        .child(el("div").class("export-tip").text(
            "Tip: Use the filters above to narrow down the data before exporting. \
             Leave filters empty to export all medicines.",
        ))
        .into()
}

fn select<I, S>(control: FilterControl, all_label: &str, values: I, controls: &FilterControls) -> Element
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let current = controls.value(control);
    let mut options = vec![option("", all_label, current.is_empty())];
    options.extend(
        values
            .into_iter()
            .map(|v| option(v.as_ref(), v.as_ref(), v.as_ref() == current)),
    );
    el("select")
        .id(control.element_id())
        .class("filter-select")
        .attr("name", control.key().as_str())
        .children(options)
}

fn option(value: &str, label: &str, selected: bool) -> Element {
    let opt = el("option").attr("value", value);
    let opt = if selected { opt.attr("selected", "selected") } else { opt };
    opt.text(label)
}
