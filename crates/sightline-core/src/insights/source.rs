//! Period data access interface
//!
//! The engine reads already-aggregated rows through this trait. Every call
//! is blocking, read-only and idempotent, and returns rows ordered most
//! recent period first, apart from `overall_value` which is unbucketed.
//! `Database` is the bundled implementation.

use crate::error::Result;
use crate::models::{
    AggregationKind, DimensionBreakdown, PeriodGrain, PeriodRow, PeriodValue, QueryFilter,
};

pub trait PeriodSource {
    /// One aggregated value of `metric_column` per period, newest first
    fn latest_periods(
        &self,
        metric_column: &str,
        aggregation: AggregationKind,
        grain: PeriodGrain,
        filter: &QueryFilter,
        limit: usize,
    ) -> Result<Vec<PeriodValue>>;

    /// Per-value totals of `metric_column` for the two most recent periods
    ///
    /// Returns `None` when fewer than two periods exist.
    fn latest_dimension_breakdown(
        &self,
        dimension_columns: &[String],
        metric_column: &str,
        grain: PeriodGrain,
        filter: &QueryFilter,
    ) -> Result<Option<DimensionBreakdown>>;

    /// One aggregated value of `metric_column` over every matching row
    ///
    /// Returns `None` when the aggregate is NULL (no rows or no values).
    fn overall_value(
        &self,
        metric_column: &str,
        aggregation: AggregationKind,
        filter: &QueryFilter,
    ) -> Result<Option<f64>>;

    /// Order count, revenue and average order value per period, newest first
    fn daily_metrics(
        &self,
        revenue_column: &str,
        grain: PeriodGrain,
        filter: &QueryFilter,
        limit: usize,
    ) -> Result<Vec<PeriodRow>>;
}
