use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use mdvs::{activity, cli, config};
use mdvs::ui::detail::DetailKey;
use mdvs::ui::filters::{FilterControl, FilterControls};

#[derive(Debug, Parser)]
#[command(name = "mdvs")]
#[command(about = "Medicine Data Visualization System dashboard")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check configuration, API and database reachability, and the activity log
    Health,
    /// Search medicines by name or indication
    Search {
        /// Search text
        query: String,
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Show how many medicines the given filters would export
    Preview {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Download the PDF report for the given filters
    Export {
        #[command(flatten)]
        filters: FilterArgs,
        /// Directory to save the report into
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Show overview stats and charts
    Insights {
        /// Chart container width in pixels
        #[arg(long)]
        width: Option<f64>,
        /// Write the rendered dashboard page to this HTML file instead
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Show category or manufacturer details
    Detail {
        #[command(subcommand)]
        target: DetailTarget,
    },
    /// Serve the dashboard in a browser
    Web {
        /// Address to bind (default from config: 127.0.0.1:9812)
        #[arg(long)]
        addr: Option<String>,
        /// Don't open the browser automatically
        #[arg(long)]
        no_open: bool,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum DetailTarget {
    /// Details for a therapeutic category
    Category { name: String },
    /// Details for a manufacturer
    Manufacturer { name: String },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write a default config file to ~/.mdvs/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a value, e.g. `mdvs config set api.base_url http://localhost:8000`
    Set { key: String, value: String },
    /// Reset the global config file to defaults
    Reset,
}

/// Export filter controls, as the export tab exposes them.
#[derive(Debug, Args)]
struct FilterArgs {
    /// Search text
    #[arg(long)]
    q: Option<String>,
    /// Therapeutic category
    #[arg(long)]
    category: Option<String>,
    /// Manufacturer name
    #[arg(long)]
    manufacturer: Option<String>,
    /// Classification (Prescription or Over-the-Counter)
    #[arg(long)]
    classification: Option<String>,
}

impl FilterArgs {
    fn controls(&self) -> FilterControls {
        let mut controls = FilterControls::default();
        let values = [
            (FilterControl::Search, &self.q),
            (FilterControl::Category, &self.category),
            (FilterControl::Manufacturer, &self.manufacturer),
            (FilterControl::Classification, &self.classification),
        ];
        for (control, value) in values {
            if let Some(value) = value {
                controls.set(control, value.as_str());
            }
        }
        controls
    }
}

fn main() -> Result<()> {
    let app = App::parse();
    let cfg = config::load();
    activity::init(&cfg.logging);

    match app.command {
        Commands::Health => cli::run_health(&cfg),
        Commands::Search { query, format } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(format.as_str()));
            cli::run_search(&cfg, &query, fmt)
        }
        Commands::Preview { filters } => cli::run_preview(&cfg, &filters.controls()),
        Commands::Export { filters, out } => {
            cli::run_export(&cfg, &filters.controls(), out.as_deref())
        }
        Commands::Insights { width, out } => cli::run_insights(&cfg, width, out.as_deref()),
        Commands::Detail { target } => {
            let key = match target {
                DetailTarget::Category { name } => DetailKey::Category(name),
                DetailTarget::Manufacturer { name } => DetailKey::Manufacturer(name),
            };
            cli::run_detail(&cfg, key)
        }
        Commands::Web { addr, no_open } => cli::run_web(&cfg, addr.as_deref(), !no_open),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
