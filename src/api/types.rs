//! Wire types for the catalog API responses.
//!
//! Shapes follow the server's JSON exactly. Aggregate percentages come out of
//! SQL `ROUND(..)` and may arrive either as numbers or as decimal strings, so
//! those fields go through [`flexible_f64`].
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Health / overview
// ---------------------------------------------------------------------------

/// `GET /health`
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub api: Option<String>,
    pub database: DatabaseHealth,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseHealth {
    pub status: String,
}

/// `GET /api/insights/overview`
#[derive(Debug, Clone, Deserialize)]
pub struct Overview {
    pub total_medicines: u64,
    pub total_manufacturers: u64,
    pub total_categories: u64,
    #[serde(default)]
    pub classification_split: ClassificationSplit,
    #[serde(default)]
    pub top_manufacturer: Option<NamedRef>,
}

/// Medicine counts per classification. Missing keys count as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationSplit {
    #[serde(rename = "Prescription", default)]
    pub prescription: u64,
    #[serde(rename = "Over-the-Counter", default)]
    pub over_the_counter: u64,
}

/// Any `{ "name": ... }` reference (top manufacturer, filter options).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

// ---------------------------------------------------------------------------
// Chart datasets
// ---------------------------------------------------------------------------

/// The `{ "data": [...] }` wrapper every chart endpoint uses.
#[derive(Debug, Clone, Deserialize)]
pub struct DataEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// One row of `/api/insights/categories/distribution`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CategoryShare {
    pub category: String,
    pub count: u64,
    #[serde(deserialize_with = "flexible_f64", default)]
    pub percentage: f64,
}

/// One row of `/api/insights/manufacturers/ranking`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ManufacturerRank {
    pub manufacturer: String,
    pub medicine_count: u64,
    pub category_count: u64,
    #[serde(deserialize_with = "flexible_f64", default)]
    pub market_share: f64,
}

/// One row of `/api/insights/categories/classification`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClassificationRow {
    pub category: String,
    #[serde(rename = "Prescription", default)]
    pub prescription: u64,
    #[serde(rename = "Over-the-Counter", default)]
    pub over_the_counter: u64,
}

// ---------------------------------------------------------------------------
// Detail views
// ---------------------------------------------------------------------------

/// `GET /api/insights/categories/{name}`
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryDetail {
    pub category: CategorySummary,
    #[serde(default)]
    pub top_manufacturers: Vec<ManufacturerCount>,
    #[serde(default)]
    pub dosage_forms: Vec<DosageFormCount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategorySummary {
    pub category: String,
    pub medicine_count: u64,
    pub manufacturer_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManufacturerCount {
    pub manufacturer: String,
    pub count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DosageFormCount {
    pub dosage_form: Option<String>,
    pub count: u64,
}

/// `GET /api/insights/manufacturers/{name}`
#[derive(Debug, Clone, Deserialize)]
pub struct ManufacturerDetail {
    pub manufacturer: ManufacturerSummary,
    #[serde(default)]
    pub categories: Vec<CategoryCount>,
    #[serde(default)]
    pub classifications: Vec<ClassificationCount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManufacturerSummary {
    pub manufacturer: String,
    pub medicine_count: u64,
    pub category_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassificationCount {
    pub classification: Option<String>,
    pub count: u64,
}

// ---------------------------------------------------------------------------
// Medicines
// ---------------------------------------------------------------------------

/// `GET /api/medicines?...`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<MedicineHit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MedicineHit {
    pub medicine_id: i64,
    pub name: String,
    #[serde(default)]
    pub indication: Option<String>,
    #[serde(default)]
    pub manufacturer_name: Option<String>,
}

/// `GET /api/medicines/filters`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterOptions {
    #[serde(default)]
    pub categories: Vec<NamedRef>,
    #[serde(default)]
    pub manufacturers: Vec<NamedRef>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Accept `12.5`, `"12.50"` or `null` (as 0.0).
fn flexible_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
        Null,
    }

    match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Num(n)) => Ok(n),
        Some(Raw::Text(s)) => s.trim().parse().map_err(serde::de::Error::custom),
        Some(Raw::Null) | None => Ok(0.0),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
