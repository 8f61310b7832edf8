//! Tab navigation and the one-shot insights latch.
use std::fmt;
use std::str::FromStr;

use super::view::{Node, el};

/// Dashboard tabs, in navigation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    Search,
    Insights,
    Export,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Search, Tab::Insights, Tab::Export];

    /// Identifier used in markup (`data-tab`, panel id) and in `?tab=`.
    pub fn id(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Insights => "insights",
            Self::Export => "export",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Search => "Search",
            Self::Insights => "Insights",
            Self::Export => "Export",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tab::ALL
            .into_iter()
            .find(|t| t.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown tab '{s}' (expected search, insights or export)"))
    }
}

/// Owns the active tab and whether the insights pipeline has been started.
#[derive(Debug, Clone)]
pub struct TabController {
    active: Tab,
    insights_loaded: bool,
}

impl TabController {
    pub fn new(initial: Tab) -> Self {
        Self {
            active: initial,
            insights_loaded: false,
        }
    }

    pub fn active(&self) -> Tab {
        self.active
    }

    pub fn is_insights_loaded(&self) -> bool {
        self.insights_loaded
    }

    /// Make `tab` active.
    ///
    /// Returns `true` exactly once: the first time the insights tab becomes
    /// active. The caller runs the overview and chart load when it does.
    pub fn activate(&mut self, tab: Tab) -> bool {
        self.active = tab;
        if tab == Tab::Insights && !self.insights_loaded {
            self.insights_loaded = true;
            return true;
        }
        false
    }

    /// Navigation bar with the active link highlighted.
    pub fn render_nav(&self) -> Node {
        el("nav")
            .class("nav")
            .children(Tab::ALL.into_iter().map(|t| {
                let class = if t == self.active { "nav-link active" } else { "nav-link" };
                el("a")
                    .class(class)
                    .attr("href", format!("/?tab={}", t.id()))
                    .attr("data-tab", t.id())
                    .text(t.label())
            }))
            .into()
    }

    /// Wrap `content` in the panel for `tab`; only the active one is shown.
    pub fn render_panel(&self, tab: Tab, content: Node) -> Node {
        let class = if tab == self.active { "tab-panel active" } else { "tab-panel" };
        el("section").id(tab.id()).class(class).child(content).into()
    }
}

impl Default for TabController {
    fn default() -> Self {
        Self::new(Tab::Search)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insights_load_triggers_once() {
        let mut tabs = TabController::default();
        assert!(!tabs.is_insights_loaded());
        assert!(!tabs.activate(Tab::Export));
        assert!(tabs.activate(Tab::Insights));
        assert!(tabs.is_insights_loaded());
        assert!(!tabs.activate(Tab::Search));
        assert!(!tabs.activate(Tab::Insights));
        assert_eq!(tabs.active(), Tab::Insights);
    }

    #[test]
    fn starting_on_insights_still_requires_activation() {
        let mut tabs = TabController::new(Tab::Insights);
        assert!(!tabs.is_insights_loaded());
        assert!(tabs.activate(Tab::Insights));
    }

    #[test]
    fn parse_tab_ids() {
        assert_eq!("Insights".parse::<Tab>(), Ok(Tab::Insights));
        assert!("settings".parse::<Tab>().is_err());
    }

    #[test]
    fn nav_marks_active_link() {
        let mut tabs = TabController::default();
        tabs.activate(Tab::Export);
        let nav = tabs.render_nav();
        let active: Vec<_> = nav
            .find_by_class("active")
            .into_iter()
            .filter_map(|e| e.get_attr("data-tab"))
            .collect();
        assert_eq!(active, ["export"]);

        let panel = tabs.render_panel(Tab::Search, Node::Fragment(vec![]));
        assert_eq!(panel.to_html(), "<section id=\"search\" class=\"tab-panel\"></section>");
    }
}
