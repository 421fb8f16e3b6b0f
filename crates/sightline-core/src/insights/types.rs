//! Core types for the Insight Engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a question is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    /// How did the latest period go
    DailySummary,
    /// Did anything unusual happen
    AnomalyCheck,
    /// Why did the metric move (orders vs order value)
    ChangeReason,
    /// Which dimension value caused the move
    DriverAnalysis,
    Unsupported,
    /// Whole-dataset aggregate, asked for through `summarize`
    Summary,
    /// Latest year against the one before, asked for through `summarize`
    YearComparison,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::DailySummary => "DAILY_SUMMARY",
            Intent::AnomalyCheck => "ANOMALY_CHECK",
            Intent::ChangeReason => "CHANGE_REASON",
            Intent::DriverAnalysis => "DRIVER_ANALYSIS",
            Intent::Unsupported => "UNSUPPORTED",
            Intent::Summary => "SUMMARY",
            Intent::YearComparison => "YEAR_COMPARISON",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of looking a metric up in the schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricResolution {
    Ok { column: String },
    MissingMetric { metric: String },
}

/// How much to trust a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "High",
            ConfidenceLevel::Medium => "Medium",
            ConfidenceLevel::Low => "Low",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A percent change, with the zero-baseline policy made visible
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentChange {
    pub value: f64,
    /// Previous value was zero, so `value` was forced to 0
    pub zero_baseline: bool,
}

/// Current vs previous period for one metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub current_period: String,
    pub previous_period: String,
    pub current_value: f64,
    pub previous_value: f64,
    pub percent_change: f64,
    pub zero_baseline: bool,
}

/// Outcome of comparing the two most recent periods
#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    Compared(ComparisonResult),
    /// Fewer than two periods were available
    InsufficientData { available: usize },
}

/// Direction of a significant swing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Increased,
    Decreased,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Increased => "increased",
            Direction::Decreased => "decreased",
        }
    }
}

/// Anomaly check verdict over a comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyVerdict {
    pub comparison: ComparisonResult,
    /// `Some` when |change| reached the anomaly threshold
    pub direction: Option<Direction>,
}

impl AnomalyVerdict {
    pub fn is_anomaly(&self) -> bool {
        self.direction.is_some()
    }
}

/// Attributed cause of a period-over-period revenue change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeCause {
    FewerOrders,
    LowerOrderValue,
    BothDeclined,
    BothImproved,
    MixedSignals,
}

impl ChangeCause {
    pub fn label(&self) -> &'static str {
        match self {
            ChangeCause::FewerOrders => "fewer orders (demand issue)",
            ChangeCause::LowerOrderValue => "lower average order value (pricing or mix issue)",
            ChangeCause::BothDeclined => {
                "both fewer orders and lower order value (serious performance issue)"
            }
            ChangeCause::BothImproved => {
                "both higher demand and higher order value (healthy growth)"
            }
            ChangeCause::MixedSignals => "mixed signals with no clear single driver",
        }
    }
}

/// Orders vs average-order-value decomposition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeReason {
    pub orders_change_pct: f64,
    pub aov_change_pct: f64,
    pub cause: ChangeCause,
}

/// One dimension value's share of the total change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverContribution {
    pub label: String,
    pub change: f64,
    pub contribution_pct: f64,
}

/// Decomposition of a change across a dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionResult {
    /// In input order; empty when there was no overall change
    pub contributions: Vec<DriverContribution>,
    /// Set only when the top |contribution| reached the driver threshold
    pub primary_driver: Option<String>,
    pub total_change: f64,
    /// Largest |contribution_pct| seen
    pub max_contribution: f64,
}

impl AttributionResult {
    pub fn has_change(&self) -> bool {
        self.total_change != 0.0
    }
}

/// Why a question could not be answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    MissingMetric,
    MissingDimension,
    UnsupportedIntent,
    InsufficientData,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::MissingMetric => "MISSING_METRIC",
            FailureKind::MissingDimension => "MISSING_DIMENSION",
            FailureKind::UnsupportedIntent => "UNSUPPORTED_INTENT",
            FailureKind::InsufficientData => "INSUFFICIENT_DATA",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Display hints attached to a successful insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InsightFlag {
    /// A percent change had a zero baseline and was reported as 0
    DivisionPolicyApplied,
}

/// A successfully answered question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub intent: Intent,
    pub title: String,
    /// Narrative lines in display order
    pub lines: Vec<String>,
    pub confidence: Option<ConfidenceLevel>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<InsightFlag>,
    /// Workflow-specific structured data
    pub data: serde_json::Value,
}

impl Insight {
    pub fn new(intent: Intent, title: impl Into<String>) -> Self {
        Self {
            intent,
            title: title.into(),
            lines: Vec::new(),
            confidence: None,
            flags: Vec::new(),
            data: serde_json::Value::Null,
        }
    }

    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    pub fn with_confidence(mut self, confidence: ConfidenceLevel) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    /// Add a flag once, however many comparisons triggered it
    pub fn flag(mut self, flag: InsightFlag) -> Self {
        if !self.flags.contains(&flag) {
            self.flags.push(flag);
        }
        self
    }
}

/// Answer to a question: an insight or a named failure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InsightResult {
    Ok(Insight),
    Failure { kind: FailureKind, message: String },
}

impl InsightResult {
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        InsightResult::Failure {
            kind,
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, InsightResult::Ok(_))
    }

    pub fn insight(&self) -> Option<&Insight> {
        match self {
            InsightResult::Ok(insight) => Some(insight),
            InsightResult::Failure { .. } => None,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            InsightResult::Ok(_) => None,
            InsightResult::Failure { kind, .. } => Some(*kind),
        }
    }
}
