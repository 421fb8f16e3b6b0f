//! Insight Engine - Answers analytical questions about sales data
//!
//! A question is classified into an intent, its metric, dimension, grain
//! and filters are pulled out of the text, and the matching workflow reads
//! the two most recent periods through a [`PeriodSource`].
//!
//! ## Workflows
//!
//! - **Daily Summary** - Latest period's revenue, orders and AOV vs the one before
//! - **Anomaly Check** - Flags swings of 10% or more
//! - **Change Reason** - Splits a revenue change into order count vs order value
//! - **Driver Analysis** - Finds the dimension value that dominates a change
//!
//! Every workflow grades its finding with a [`ConfidenceLevel`].
//!
//! [`InsightEngine::summarize`] skips classification and reports the
//! detected aggregation of a metric over the whole store, or the latest year
//! against the one before when the question mentions a year.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sightline_core::insights::InsightEngine;
//!
//! let engine = InsightEngine::new(&schema, &db);
//! let result = engine.answer("Why did revenue drop?")?;
//! ```

pub mod change_reason;
pub mod compare;
pub mod confidence;
pub mod drivers;
pub mod engine;
pub mod intent;
pub mod metric;
pub mod question;
pub mod source;
pub mod types;

pub use change_reason::{analyze_change_reason, attribute_cause};
pub use compare::{compare_latest, compare_pair, detect_anomaly, percent_change, round2};
pub use confidence::confidence_level;
pub use drivers::attribute_drivers;
pub use engine::{answer, summarize, InsightEngine};
pub use intent::{classify_intent, IntentRule, INTENT_RULES};
pub use metric::{detect_aggregation, resolve_metric};
pub use question::ParsedQuestion;
pub use source::PeriodSource;
pub use types::{
    AnomalyVerdict, AttributionResult, ChangeCause, ChangeReason, Comparison, ComparisonResult,
    ConfidenceLevel, Direction, DriverContribution, FailureKind, Insight, InsightFlag,
    InsightResult, Intent, MetricResolution, PercentChange,
};
