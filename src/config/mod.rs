/// Configuration system for mdvs.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: hardcoded in [`schema::MdvsConfig::default()`]
/// 2. **User global config**: `~/.mdvs/config.toml`
/// 3. **Project local config**: `.mdvs.toml` in the current working directory
/// 4. **Environment variables**: `MDVS_*` overrides (highest precedence)
///
/// Layers are merged key by key: a file that sets only `api.base_url`
/// leaves every other value from the layer below untouched.
///
/// # Usage
///
/// ```rust,ignore
/// use mdvs::config;
///
/// let cfg = config::load();
/// let client = mdvs::api::HttpClient::from_config(&cfg.api);
/// ```
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use schema::MdvsConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars.
pub fn load() -> MdvsConfig {
    let mut config = load_layers(&[global_config_path(), project_config_path()]);
    apply_env_overrides(&mut config);
    config
}

/// Merge the given TOML files over the defaults, in order.
///
/// Missing or malformed files are skipped; a bad config never stops the
/// dashboard from starting. A file that parses but holds a value of the
/// wrong type is skipped as a whole; the layers around it still apply.
pub fn load_layers(paths: &[Option<PathBuf>]) -> MdvsConfig {
    let mut config = MdvsConfig::default();
    for path in paths.iter().flatten() {
        let Some(layer) = load_toml_value(path) else {
            continue;
        };
        if let Some(next) = apply_layer(&config, layer) {
            config = next;
        }
    }
    config
}

/// `config` with `layer` merged over it, or `None` if the result no longer
/// deserializes.
fn apply_layer(config: &MdvsConfig, layer: toml::Value) -> Option<MdvsConfig> {
    let mut merged = toml::Value::try_from(config).ok()?;
    merge_values(&mut merged, layer);
    merged.try_into().ok()
}

/// Read a TOML file as a raw value tree (if it exists and parses).
fn load_toml_value(path: &Path) -> Option<toml::Value> {
    let content = fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Overlay `overlay` onto `base`. Tables merge recursively; any other value
/// replaces the base value.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.mdvs/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".mdvs").join("config.toml"))
}

/// Path to the project local config: `.mdvs.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir().ok().map(|cwd| cwd.join(".mdvs.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `MDVS_API_URL`: API base URL
/// - `MDVS_TIMEOUT_MS`: per-request timeout
/// - `MDVS_CHART_WIDTH`: default chart container width
/// - `MDVS_LOG`: activity logging on/off (`1`/`true`/`yes`/`on`)
/// - `MDVS_WEB_ADDR`: listen address for `mdvs web`
fn apply_env_overrides(config: &mut MdvsConfig) {
    apply_overrides(config, |name| std::env::var(name).ok());
}

/// Apply overrides from any variable source (the process env in practice).
fn apply_overrides(config: &mut MdvsConfig, var: impl Fn(&str) -> Option<String>) {
    if let Some(val) = var("MDVS_API_URL")
        && !val.is_empty()
    {
        config.api.base_url = val;
    }
    if let Some(val) = var("MDVS_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.api.timeout_ms = ms;
    }
    if let Some(val) = var("MDVS_CHART_WIDTH")
        && let Ok(width) = val.parse::<f64>()
        && width > 0.0
    {
        config.charts.container_width = width;
    }
    if let Some(val) = var("MDVS_LOG") {
        config.logging.enabled = is_truthy(&val);
    }
    if let Some(val) = var("MDVS_WEB_ADDR")
        && !val.is_empty()
    {
        config.web.addr = val;
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.mdvs/config.toml`.
///
/// Returns an error if the file already exists (use `force = true` to
/// overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;
    init_config_at(&path, force)?;
    Ok(path)
}

fn init_config_at(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.mdvs/ directory")?;
    }
    fs::write(path, MdvsConfig::default_toml()).context("failed to write config file")?;
    Ok(())
}

/// Set a single config key in the global config file.
///
/// Supports dotted keys like `api.base_url`. Starts from the defaults when
/// no file exists yet.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;
    set_config_value_at(&path, key, value)
}

fn set_config_value_at(path: &Path, key: &str, value: &str) -> Result<()> {
    let mut root: toml::Value = if path.exists() {
        let content = fs::read_to_string(path).context("failed to read config file")?;
        toml::from_str(&content).context("failed to parse config as TOML value")?
    } else {
        toml::Value::try_from(MdvsConfig::default())
            .context("failed to serialize default config")?
    };

    set_toml_value(&mut root, key, value)?;

    // Reject edits that would no longer load.
    let _: MdvsConfig = root
        .clone()
        .try_into()
        .with_context(|| format!("invalid value '{value}' for '{key}'"))?;

    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(path, output).context("failed to write config file")?;
    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let Some((section_path, leaf)) = key.rsplit_once('.') else {
        anyhow::bail!("config key must be 'section.key', got '{key}'");
    };

    let mut current = root;
    for part in section_path.split('.') {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }
    let table = current
        .as_table_mut()
        .with_context(|| format!("expected table at '{section_path}'"))?;

    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Float(_)) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected number for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        Some(_) => toml::Value::String(raw_value.to_string()),
        None => anyhow::bail!("unknown config key '{key}'"),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
