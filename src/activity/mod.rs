//! Activity log: one JSON object per line in `~/.mdvs/activity.jsonl`.
//!
//! Records fetch failures (the dashboard shows only generic fallback text, so
//! the underlying error lands here), exports and health checks. Logging is
//! best-effort: an unwritable log never affects the dashboard.

use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::ApiError;
use crate::config::schema::LoggingConfig;
use crate::ui::filters::FilterSet;

static SETTINGS: OnceLock<LoggingConfig> = OnceLock::new();

/// Install the logging settings for this process. Later calls are ignored.
pub fn init(config: &LoggingConfig) {
    let _ = SETTINGS.set(config.clone());
}

fn settings() -> &'static LoggingConfig {
    SETTINGS.get_or_init(fallback_settings)
}

/// Settings used when `init` was never called.
#[cfg(not(test))]
fn fallback_settings() -> LoggingConfig {
    crate::config::load().logging
}

/// Unit tests never write to the user's activity log.
#[cfg(test)]
fn fallback_settings() -> LoggingConfig {
    LoggingConfig {
        enabled: false,
        ..LoggingConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Event entry
// ---------------------------------------------------------------------------

/// Severity of an activity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// A single activity log line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub timestamp: String,
    pub level: Level,
    /// `"fetch_failed"`, `"export"`, `"health"`, ...
    pub kind: String,
    /// UI region the event belongs to (`"detail"`, `"category-chart"`, ...).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub region: Option<String>,
    /// API path involved, if any.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub filters: Option<serde_json::Value>,
}

impl ActivityEvent {
    pub fn new(level: Level, kind: &str) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            level,
            kind: kind.to_string(),
            region: None,
            path: None,
            detail: None,
            bytes: None,
            filters: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Logging functions
// ---------------------------------------------------------------------------

/// Append `event` to the configured log, honoring `enabled` and `level`.
pub fn log_event(event: &ActivityEvent) {
    let cfg = settings();
    if !cfg.enabled {
        return;
    }
    let min = Level::parse(&cfg.level).unwrap_or(Level::Info);
    if event.level < min {
        return;
    }
    if let Some(path) = log_path() {
        let _ = append_to(&path, event);
    }
}

/// A fetch for `region` failed; the UI showed its fallback.
pub fn log_fetch_failure(region: &str, path: &str, err: &ApiError) {
    let mut event = ActivityEvent::new(Level::Error, "fetch_failed");
    event.region = Some(region.to_string());
    event.path = Some(path.to_string());
    event.detail = Some(err.to_string());
    log_event(&event);
}

/// A PDF export completed and was saved as `file_name`.
pub fn log_export(file_name: &str, bytes: usize, filters: &FilterSet) {
    let mut event = ActivityEvent::new(Level::Info, "export");
    event.detail = Some(file_name.to_string());
    event.bytes = Some(bytes);
    event.filters = serde_json::to_value(filters).ok();
    log_event(&event);
}

/// Result of the startup health check.
pub fn log_health(database_status: &str) {
    let level = if database_status == "error" {
        Level::Warn
    } else {
        Level::Debug
    };
    let mut event = ActivityEvent::new(level, "health");
    event.detail = Some(format!("database: {database_status}"));
    log_event(&event);
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// The last `n` entries of the log, oldest first. Malformed lines are skipped.
pub fn read_recent(n: usize) -> Vec<ActivityEvent> {
    let Some(path) = log_path() else {
        return Vec::new();
    };
    read_from(&path, n)
}

/// Read the last `n` entries from a specific file.
pub fn read_from(path: &Path, n: usize) -> Vec<ActivityEvent> {
    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };
    let entries: Vec<ActivityEvent> = BufReader::new(file)
        .lines()
        .map_while(Result::ok)
        .filter_map(|line| serde_json::from_str(&line).ok())
        .collect();
    let skip = entries.len().saturating_sub(n);
    entries.into_iter().skip(skip).collect()
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

/// Append one entry to `path`, creating parent directories as needed.
pub fn append_to(path: &Path, event: &ActivityEvent) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(event)?;
    writeln!(file, "{json}")?;
    Ok(())
}

/// Resolved path of the activity log (`~` expanded).
pub fn log_path() -> Option<PathBuf> {
    expand_home(&settings().path)
}

/// Expand a leading `~/` against the home directory.
pub fn expand_home(raw: &str) -> Option<PathBuf> {
    match raw.strip_prefix("~/") {
        Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
        None if raw == "~" => dirs::home_dir(),
        None => Some(PathBuf::from(raw)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
