//! Semantic schema configuration
//!
//! The schema maps business metric and dimension names onto physical
//! columns of the sales store, names the columns carrying order date and
//! order id, and holds the decision thresholds used by the insight engine.
//!
//! ## Configuration Resolution
//!
//! The schema is loaded with a three-layer resolution:
//! 1. An explicit path (`--schema`), which must exist
//! 2. An override in the data dir (~/.local/share/sightline/schema.toml)
//! 3. The embedded default (compiled into binary)

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Embedded default schema (compiled into binary)
const DEFAULT_SCHEMA: &str = include_str!("../../../config/schema.toml");

/// Metric key the revenue-based workflows resolve
pub const REVENUE_METRIC: &str = "revenue";

/// Dimension used when a question names none
pub const DEFAULT_DIMENSION: &str = "region";

/// Separator between the parts of a composite dimension value
pub const COMPOSITE_SEPARATOR: &str = " > ";

pub const DEFAULT_ANOMALY_PCT: f64 = 10.0;
pub const DEFAULT_CHANGE_REASON_BAND_PCT: f64 = 5.0;
pub const DEFAULT_PRIMARY_DRIVER_PCT: f64 = 60.0;
pub const DEFAULT_HIGH_CONFIDENCE_CHANGE_PCT: f64 = 20.0;
pub const DEFAULT_HIGH_CONFIDENCE_DRIVER_PCT: f64 = 60.0;
pub const DEFAULT_MEDIUM_CONFIDENCE_CHANGE_PCT: f64 = 10.0;

/// Percentage-point thresholds behind every insight decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Minimum |change| for the anomaly check to flag a swing
    pub anomaly_pct: f64,
    /// Half-width of the "roughly unchanged" band in change-reason analysis
    pub change_reason_band_pct: f64,
    /// Minimum |contribution| for a dimension value to be the primary driver
    pub primary_driver_pct: f64,
    pub high_confidence_change_pct: f64,
    pub high_confidence_driver_pct: f64,
    pub medium_confidence_change_pct: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            anomaly_pct: DEFAULT_ANOMALY_PCT,
            change_reason_band_pct: DEFAULT_CHANGE_REASON_BAND_PCT,
            primary_driver_pct: DEFAULT_PRIMARY_DRIVER_PCT,
            high_confidence_change_pct: DEFAULT_HIGH_CONFIDENCE_CHANGE_PCT,
            high_confidence_driver_pct: DEFAULT_HIGH_CONFIDENCE_DRIVER_PCT,
            medium_confidence_change_pct: DEFAULT_MEDIUM_CONFIDENCE_CHANGE_PCT,
        }
    }
}

/// Columns that identify each order and when it happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceColumns {
    pub date_column: String,
    pub order_column: String,
}

impl Default for SourceColumns {
    fn default() -> Self {
        Self {
            date_column: "order_date".to_string(),
            order_column: "order_id".to_string(),
        }
    }
}

/// Words that select a metric when they appear in a question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricVocabulary {
    pub metric: String,
    pub words: Vec<String>,
}

/// Immutable mapping from business names to physical columns
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SemanticSchema {
    pub source: SourceColumns,
    /// Metric name -> column
    pub metrics: BTreeMap<String, String>,
    /// Dimension name -> columns whose values are joined into one label
    pub dimensions: BTreeMap<String, Vec<String>>,
    /// Ordered metric vocabulary (first match wins)
    pub vocabulary: Vec<MetricVocabulary>,
    pub thresholds: Thresholds,
}

impl SemanticSchema {
    /// Load the schema, honoring the resolution order described above
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        if let Some(path) = default_schema_path() {
            if path.exists() {
                tracing::debug!(path = %path.display(), "Using schema override");
                return Self::from_file(&path);
            }
        }

        Self::embedded()
    }

    /// The schema compiled into the binary
    pub fn embedded() -> Result<Self> {
        Self::parse(DEFAULT_SCHEMA)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read schema {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Parse schema TOML, filling anything left out with defaults
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawSchema = toml::from_str(content)?;
        let mut schema = SemanticSchema::default();

        if let Some(source) = raw.source {
            if let Some(date_column) = source.date_column {
                schema.source.date_column = date_column;
            }
            if let Some(order_column) = source.order_column {
                schema.source.order_column = order_column;
            }
        }

        // Blank mappings are treated the same as absent ones
        for (name, column) in raw.metrics.unwrap_or_default() {
            let column = column.trim();
            if !column.is_empty() {
                check_column(column)?;
                schema.metrics.insert(name, column.to_string());
            }
        }

        for (name, columns) in raw.dimensions.unwrap_or_default() {
            let columns: Vec<String> = columns
                .into_iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect();
            for column in &columns {
                check_column(column)?;
            }
            if !columns.is_empty() {
                schema.dimensions.insert(name, columns);
            }
        }

        schema.vocabulary = raw.vocabulary.unwrap_or_default();

        if let Some(t) = raw.thresholds {
            let defaults = Thresholds::default();
            schema.thresholds = Thresholds {
                anomaly_pct: t.anomaly_pct.unwrap_or(defaults.anomaly_pct),
                change_reason_band_pct: t
                    .change_reason_band_pct
                    .unwrap_or(defaults.change_reason_band_pct),
                primary_driver_pct: t.primary_driver_pct.unwrap_or(defaults.primary_driver_pct),
                high_confidence_change_pct: t
                    .high_confidence_change_pct
                    .unwrap_or(defaults.high_confidence_change_pct),
                high_confidence_driver_pct: t
                    .high_confidence_driver_pct
                    .unwrap_or(defaults.high_confidence_driver_pct),
                medium_confidence_change_pct: t
                    .medium_confidence_change_pct
                    .unwrap_or(defaults.medium_confidence_change_pct),
            };
        }

        Ok(schema)
    }

    /// Columns making up a dimension, if it is mapped
    pub fn dimension_columns(&self, dimension: &str) -> Option<&[String]> {
        self.dimensions.get(dimension).map(|c| c.as_slice())
    }
}

/// Column names end up inside JSON paths, which cannot carry a double quote
fn check_column(column: &str) -> Result<()> {
    if column.contains('"') {
        return Err(Error::Config(format!(
            "Column name may not contain '\"': {}",
            column
        )));
    }
    Ok(())
}

/// Default schema override path
pub fn default_schema_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("sightline").join("schema.toml"))
}

/// Raw schema structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawSchema {
    source: Option<RawSource>,
    metrics: Option<BTreeMap<String, String>>,
    dimensions: Option<BTreeMap<String, Vec<String>>>,
    vocabulary: Option<Vec<MetricVocabulary>>,
    thresholds: Option<RawThresholds>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    date_column: Option<String>,
    order_column: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawThresholds {
    anomaly_pct: Option<f64>,
    change_reason_band_pct: Option<f64>,
    primary_driver_pct: Option<f64>,
    high_confidence_change_pct: Option<f64>,
    high_confidence_driver_pct: Option<f64>,
    medium_confidence_change_pct: Option<f64>,
}
