//! Overview stat cards at the top of the insights tab.
use crate::activity;
use crate::api::types::Overview;
use crate::api::{self, Api, ApiError};

use super::format::format_number;
use super::view::{Node, el};

/// A single headline figure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCard {
    pub icon: &'static str,
    pub value: String,
    pub label: &'static str,
}

/// The six cards for a loaded overview, in display order.
pub fn stat_cards(o: &Overview) -> Vec<StatCard> {
    fn card(icon: &'static str, value: String, label: &'static str) -> StatCard {
        StatCard { icon, value, label }
    }
    vec![
        card("💊", format_number(o.total_medicines), "Total Medicines"),
        card("🏭", format_number(o.total_manufacturers), "Manufacturers"),
        card("📁", o.total_categories.to_string(), "Categories"),
        card(
            "📋",
            format_number(o.classification_split.prescription),
            "Prescription",
        ),
        card(
            "🛒",
            format_number(o.classification_split.over_the_counter),
            "Over-the-Counter",
        ),
        card(
            "🏆",
            o.top_manufacturer
                .as_ref()
                .map(|m| m.name.clone())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "N/A".to_string()),
            "Top Manufacturer",
        ),
    ]
}

/// State of the stats container.
#[derive(Debug, Clone, Default)]
pub enum OverviewState {
    #[default]
    Empty,
    Loaded(Vec<StatCard>),
    Failed,
}

impl OverviewState {
    /// Fetch the overview and build its cards. Failures are logged.
    pub fn load(api: &impl Api) -> Self {
        Self::from_result(api::fetch::<Overview>(api, api::OVERVIEW))
    }

    pub fn from_result(result: Result<Overview, ApiError>) -> Self {
        match result {
            Ok(o) => Self::Loaded(stat_cards(&o)),
            Err(err) => {
                activity::log_fetch_failure("stats-container", api::OVERVIEW, &err);
                Self::Failed
            }
        }
    }

    pub fn cards(&self) -> &[StatCard] {
        match self {
            Self::Loaded(cards) => cards,
            _ => &[],
        }
    }

    pub fn render(&self) -> Node {
        let cards: Vec<Node> = match self {
            Self::Empty => Vec::new(),
            Self::Loaded(cards) => cards
                .iter()
                .map(|c| render_card(c.icon, &c.value, c.label, None))
                .collect(),
            Self::Failed => vec![render_card(
                "⚠️",
                "Failed to load data",
                "Check console for details",
                Some("stat-card-error"),
            )],
        };
        el("div")
            .id("stats-container")
            .class("stats-grid")
            .children(cards)
            .into()
    }
}

fn render_card(icon: &str, value: &str, label: &str, extra: Option<&str>) -> Node {
    let class = match extra {
        Some(extra) => format!("stat-card {extra}"),
        None => "stat-card".to_string(),
    };
    el("div")
        .class(&class)
        .child(el("div").class("stat-icon").text(icon))
        .child(el("div").class("stat-value").text(value))
        .child(el("div").class("stat-label").text(label))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn values(state: &OverviewState) -> Vec<String> {
        state.cards().iter().map(|c| c.value.clone()).collect()
    }

    #[test]
    fn loaded_overview_formats_every_card() {
        let overview: Overview = serde_json::from_value(json!({
            "total_medicines": 1200,
            "total_manufacturers": 45,
            "total_categories": 8,
            "classification_split": {"Prescription": 900, "Over-the-Counter": 300},
            "top_manufacturer": {"name": "Acme"},
        }))
        .unwrap();
        let state = OverviewState::from_result(Ok(overview));
        assert_eq!(values(&state), ["1,200", "45", "8", "900", "300", "Acme"]);
    }

    #[test]
    fn missing_split_and_top_manufacturer_fall_back() {
        let overview: Overview = serde_json::from_value(json!({
            "total_medicines": 0,
            "total_manufacturers": 0,
            "total_categories": 0,
            "classification_split": {},
            "top_manufacturer": null,
        }))
        .unwrap();
        let state = OverviewState::from_result(Ok(overview));
        assert_eq!(values(&state), ["0", "0", "0", "0", "0", "N/A"]);
    }

    #[test]
    fn failure_renders_single_error_card() {
        let state = OverviewState::from_result(Err(ApiError::Network("down".into())));
        let node = state.render();
        assert_eq!(node.find_by_class("stat-card").len(), 1);
        assert!(node.text_content().contains("Failed to load data"));
        assert!(node.text_content().contains("Check console for details"));
    }
}
