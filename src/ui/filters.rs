//! Filter controls and the debounced collector that turns them into a
//! [`FilterSet`].
//!
//! The set is never edited in place: every read of the controls builds a
//! fresh one, and only non-empty values become keys.
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use super::debounce::Debouncer;

/// Default quiescence window for text input.
pub const INPUT_DEBOUNCE_MS: u64 = 300;

// ---------------------------------------------------------------------------
// FilterSet
// ---------------------------------------------------------------------------

/// The four filter dimensions understood by the export endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterKey {
    Query,
    Category,
    Manufacturer,
    Classification,
}

impl FilterKey {
    pub const ALL: [FilterKey; 4] = [
        FilterKey::Query,
        FilterKey::Category,
        FilterKey::Manufacturer,
        FilterKey::Classification,
    ];

    /// Wire name of the key.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Query => "q",
            Self::Category => "category",
            Self::Manufacturer => "manufacturer",
            Self::Classification => "classification",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Present-only filter constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet(BTreeMap<FilterKey, String>);

impl FilterSet {
    /// Build from key/value pairs, dropping empty values.
    pub fn from_pairs<I, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (FilterKey, V)>,
        V: AsRef<str>,
    {
        Self(
            pairs
                .into_iter()
                .filter(|(_, v)| !v.as_ref().is_empty())
                .map(|(k, v)| (k, v.as_ref().to_string()))
                .collect(),
        )
    }

    pub fn get(&self, key: FilterKey) -> Option<&str> {
        self.0.get(&key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilterKey, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

impl Serialize for FilterSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k.as_str(), v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FilterSet {
    /// Unknown keys are ignored; empty values are dropped.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
        Ok(Self::from_pairs(
            raw.iter()
                .filter_map(|(k, v)| FilterKey::parse(k).map(|key| (key, v.as_str()))),
        ))
    }
}

// ---------------------------------------------------------------------------
// Controls
// ---------------------------------------------------------------------------

/// One of the four input controls on the export panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterControl {
    Search,
    Category,
    Manufacturer,
    Classification,
}

impl FilterControl {
    pub fn key(self) -> FilterKey {
        match self {
            Self::Search => FilterKey::Query,
            Self::Category => FilterKey::Category,
            Self::Manufacturer => FilterKey::Manufacturer,
            Self::Classification => FilterKey::Classification,
        }
    }

    /// DOM id of the control.
    pub fn element_id(self) -> &'static str {
        match self {
            Self::Search => "export-search",
            Self::Category => "export-category",
            Self::Manufacturer => "export-manufacturer",
            Self::Classification => "export-classification",
        }
    }

    pub fn is_select(self) -> bool {
        !matches!(self, Self::Search)
    }
}

/// Current raw values of the four controls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterControls {
    pub search: String,
    pub category: String,
    pub manufacturer: String,
    pub classification: String,
}

impl FilterControls {
    pub fn set(&mut self, control: FilterControl, value: impl Into<String>) {
        let value = value.into();
        match control {
            FilterControl::Search => self.search = value,
            FilterControl::Category => self.category = value,
            FilterControl::Manufacturer => self.manufacturer = value,
            FilterControl::Classification => self.classification = value,
        }
    }

    pub fn value(&self, control: FilterControl) -> &str {
        match control {
            FilterControl::Search => &self.search,
            FilterControl::Category => &self.category,
            FilterControl::Manufacturer => &self.manufacturer,
            FilterControl::Classification => &self.classification,
        }
    }

    /// Controls showing exactly the values of `set`.
    pub fn from_set(set: &FilterSet) -> Self {
        let value = |key| set.get(key).unwrap_or_default().to_string();
        Self {
            search: value(FilterKey::Query),
            category: value(FilterKey::Category),
            manufacturer: value(FilterKey::Manufacturer),
            classification: value(FilterKey::Classification),
        }
    }

    /// Read the controls into a fresh [`FilterSet`]. Search text is trimmed.
    pub fn collect(&self) -> FilterSet {
        FilterSet::from_pairs([
            (FilterKey::Query, self.search.trim()),
            (FilterKey::Category, self.category.as_str()),
            (FilterKey::Manufacturer, self.manufacturer.as_str()),
            (FilterKey::Classification, self.classification.as_str()),
        ])
    }
}

// ---------------------------------------------------------------------------
// Collector
// ---------------------------------------------------------------------------

/// Owns the control values and decides when the update action runs.
///
/// `input` events are coalesced through a [`Debouncer`]; `change` events run
/// the update immediately and drop any pending input timer, since the
/// immediate run already reflects the latest values.
#[derive(Debug, Clone)]
pub struct FilterCollector {
    controls: FilterControls,
    debouncer: Debouncer<()>,
}

impl FilterCollector {
    pub fn new(window: Duration) -> Self {
        Self {
            controls: FilterControls::default(),
            debouncer: Debouncer::new(window),
        }
    }

    pub fn controls(&self) -> &FilterControls {
        &self.controls
    }

    /// Current filter set, rebuilt from the controls.
    pub fn current(&self) -> FilterSet {
        self.controls.collect()
    }

    /// An `input` event: record the value and (re)start the quiet window.
    pub fn on_input(&mut self, control: FilterControl, value: impl Into<String>, now: Duration) {
        self.controls.set(control, value);
        self.debouncer.schedule(now, ());
    }

    /// A `change` event: record the value and fire now.
    pub fn on_change(&mut self, control: FilterControl, value: impl Into<String>) -> FilterSet {
        self.controls.set(control, value);
        self.debouncer.cancel_pending();
        self.current()
    }

    /// Replace every control at once (a submitted form). Fires now, like a
    /// `change`.
    pub fn replace(&mut self, controls: FilterControls) -> FilterSet {
        self.controls = controls;
        self.debouncer.cancel_pending();
        self.current()
    }

    /// Fire the debounced update if its window elapsed.
    pub fn poll(&mut self, now: Duration) -> Option<FilterSet> {
        self.debouncer.poll(now).map(|()| self.current())
    }

    pub fn cancel_pending(&mut self) {
        self.debouncer.cancel_pending();
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.debouncer.deadline()
    }
}

impl Default for FilterCollector {
    fn default() -> Self {
        Self::new(Duration::from_millis(INPUT_DEBOUNCE_MS))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
