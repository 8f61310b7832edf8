/// Configuration schema and defaults for the mdvs dashboard client.
///
/// Defines the TOML-serializable configuration structure with all sections:
/// `[api]`, `[dashboard]`, `[charts]`, `[export]`, `[logging]` and `[web]`.
///
/// Every field has a built-in default. Users only need to set the values
/// they want to override.
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level mdvs configuration.
///
/// Maps directly to the `~/.mdvs/config.toml` and `.mdvs.toml` file
/// schemas. All sections and fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MdvsConfig {
    pub api: ApiConfig,
    pub dashboard: DashboardConfig,
    pub charts: ChartsConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
    pub web: WebConfig,
}

// ---------------------------------------------------------------------------
// [api]
// ---------------------------------------------------------------------------

/// Where the catalog REST API lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL; endpoint paths are appended to it.
    pub base_url: String,
    /// Per-request timeout (milliseconds).
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_ms: 10_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [dashboard]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Tab shown first: `search`, `insights` or `export`.
    pub initial_tab: String,
    /// Quiet window for filter text input.
    pub preview_debounce_ms: u64,
    /// Quiet window after the last resize before charts re-render.
    pub resize_debounce_ms: u64,
    /// Page size requested by the export preview count.
    pub preview_limit: u32,
    /// Manufacturers shown in the ranking chart.
    pub ranking_limit: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            initial_tab: "search".to_string(),
            preview_debounce_ms: 300,
            resize_debounce_ms: 250,
            preview_limit: 10_000,
            ranking_limit: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// [charts]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartsConfig {
    /// Container width used when no live width is known (CLI, first page
    /// load).
    pub container_width: f64,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            container_width: 800.0,
        }
    }
}

// ---------------------------------------------------------------------------
// [export]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory reports are saved to. Empty means the OS download dir.
    pub output_dir: String,
    /// How long the success message stays visible (milliseconds).
    pub status_hide_ms: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: String::new(),
            status_hide_ms: 3000,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Activity log settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether activity logging is enabled.
    pub enabled: bool,
    /// Path to the JSONL log. `~` is expanded to the home directory.
    pub path: String,
    /// Minimum level: `"debug"`, `"info"`, `"warn"`, `"error"`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "~/.mdvs/activity.jsonl".to_string(),
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [web]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Listen address for `mdvs web`.
    pub addr: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9812".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Annotated default file
// ---------------------------------------------------------------------------

impl MdvsConfig {
    /// The commented config written by `mdvs config init`.
    pub fn default_toml() -> String {
        r#"# mdvs configuration
# Medicine catalog dashboard client
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (MDVS_*)
#   2. Project config (.mdvs.toml in current directory)
#   3. User global config (~/.mdvs/config.toml)
#   4. Built-in defaults

[api]
base_url = "http://127.0.0.1:8000"   # or MDVS_API_URL
timeout_ms = 10000                   # or MDVS_TIMEOUT_MS

[dashboard]
initial_tab = "search"               # search | insights | export
preview_debounce_ms = 300
resize_debounce_ms = 250
preview_limit = 10000
ranking_limit = 10

[charts]
container_width = 800.0              # or MDVS_CHART_WIDTH

[export]
output_dir = ""                      # empty -> OS download directory
status_hide_ms = 3000

[logging]
enabled = true                       # or MDVS_LOG=0 to disable
path = "~/.mdvs/activity.jsonl"
level = "info"                       # debug | info | warn | error

[web]
addr = "127.0.0.1:9812"              # or MDVS_WEB_ADDR
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = MdvsConfig::default();
        assert_eq!(config.api.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.api.timeout_ms, 10_000);
        assert_eq!(config.dashboard.initial_tab, "search");
        assert_eq!(config.dashboard.preview_debounce_ms, 300);
        assert_eq!(config.dashboard.resize_debounce_ms, 250);
        assert_eq!(config.dashboard.preview_limit, 10_000);
        assert_eq!(config.dashboard.ranking_limit, 10);
        assert_eq!(config.charts.container_width, 800.0);
        assert!(config.export.output_dir.is_empty());
        assert_eq!(config.export.status_hide_ms, 3000);
        assert!(config.logging.enabled);
        assert_eq!(config.web.addr, "127.0.0.1:9812");
    }

    #[test]
    fn deserialize_minimal_toml() {
        let toml_str = r#"
[api]
base_url = "http://catalog.internal:8000"
"#;
        let config: MdvsConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api.base_url, "http://catalog.internal:8000");
        // All other fields fall back to defaults
        assert_eq!(config.api.timeout_ms, 10_000);
        assert_eq!(config.dashboard.ranking_limit, 10);
    }

    #[test]
    fn default_toml_parses_back_to_defaults() {
        let config: MdvsConfig = toml::from_str(&MdvsConfig::default_toml()).unwrap();
        assert_eq!(config, MdvsConfig::default());
    }

    #[test]
    fn serialize_roundtrip_keeps_sections() {
        let toml_str = toml::to_string_pretty(&MdvsConfig::default()).unwrap();
        for section in ["[api]", "[dashboard]", "[charts]", "[export]", "[logging]", "[web]"] {
            assert!(toml_str.contains(section), "missing {section}");
        }
    }
}
