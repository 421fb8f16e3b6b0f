//! Data models for Sightline

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Aggregation applied to a metric column when bucketing by period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AggregationKind {
    #[default]
    Sum,
    Avg,
    Min,
    Max,
    Count,
}

impl AggregationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sum => "SUM",
            Self::Avg => "AVG",
            Self::Min => "MIN",
            Self::Max => "MAX",
            Self::Count => "COUNT",
        }
    }
}

impl std::fmt::Display for AggregationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AggregationKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sum" => Ok(Self::Sum),
            "avg" => Ok(Self::Avg),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            "count" => Ok(Self::Count),
            _ => Err(format!(
                "Unknown aggregation: {} (valid: sum, avg, min, max, count)",
                s
            )),
        }
    }
}

/// Calendar unit a period key is bucketed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodGrain {
    #[default]
    Day,
    Month,
    Year,
}

impl PeriodGrain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// strftime pattern producing sortable period keys
    pub fn key_format(&self) -> &'static str {
        match self {
            Self::Day => "%Y-%m-%d",
            Self::Month => "%Y-%m",
            Self::Year => "%Y",
        }
    }
}

impl std::str::FromStr for PeriodGrain {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" | "daily" => Ok(Self::Day),
            "month" | "monthly" => Ok(Self::Month),
            "year" | "yearly" => Ok(Self::Year),
            _ => Err(format!("Unknown grain: {} (valid: day, month, year)", s)),
        }
    }
}

/// Order count, revenue and average order value for one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRow {
    pub period_key: String,
    pub order_count: f64,
    pub revenue: f64,
    pub average_order_value: f64,
}

/// Which figure of a `PeriodRow` to compare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodMetric {
    OrderCount,
    Revenue,
    AverageOrderValue,
}

impl PeriodRow {
    pub fn value(&self, metric: PeriodMetric) -> f64 {
        match metric {
            PeriodMetric::OrderCount => self.order_count,
            PeriodMetric::Revenue => self.revenue,
            PeriodMetric::AverageOrderValue => self.average_order_value,
        }
    }

    pub fn to_value(&self, metric: PeriodMetric) -> PeriodValue {
        PeriodValue {
            period_key: self.period_key.clone(),
            value: self.value(metric),
        }
    }
}

/// One aggregated metric value for one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodValue {
    pub period_key: String,
    pub value: f64,
}

/// A dimension value's metric in the two most recent periods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionChangeRow {
    pub label: String,
    pub current_value: f64,
    pub previous_value: f64,
}

/// Per-value breakdown of a metric across the two most recent periods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionBreakdown {
    pub current_period: String,
    pub previous_period: String,
    pub rows: Vec<RegionChangeRow>,
}

/// Equality constraint on one (possibly composite) dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterClause {
    pub dimension: String,
    pub columns: Vec<String>,
    pub value: String,
}

/// Per-request filter passed into every data-access call
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryFilter {
    pub clauses: Vec<FilterClause>,
}

impl QueryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clause(
        mut self,
        dimension: impl Into<String>,
        columns: Vec<String>,
        value: impl Into<String>,
    ) -> Self {
        self.clauses.push(FilterClause {
            dimension: dimension.into(),
            columns,
            value: value.into(),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Short human-readable form, e.g. `region = West`
    pub fn describe(&self) -> String {
        self.clauses
            .iter()
            .map(|c| format!("{} = {}", c.dimension, c.value))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A sales row parsed from CSV, ready to insert
#[derive(Debug, Clone)]
pub struct NewSale {
    pub order_id: String,
    pub order_date: NaiveDate,
    /// Remaining CSV columns as a JSON object
    pub attributes: String,
    pub import_hash: String,
}

/// Outcome of importing a CSV file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportStats {
    pub parsed: usize,
    pub imported: usize,
    pub duplicates: usize,
    pub skipped: usize,
}

/// Rows held by the store and the dates they span
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStatus {
    pub row_count: i64,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
}
