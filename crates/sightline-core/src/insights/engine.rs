//! Insight Engine - routes a question to its workflow and builds the answer

use serde_json::json;

use crate::config::{SemanticSchema, REVENUE_METRIC};
use crate::error::{Error, Result};
use crate::models::{AggregationKind, PeriodGrain, PeriodMetric, PeriodRow, PeriodValue};

use super::change_reason::analyze_change_reason;
use super::compare::{compare_latest, compare_pair, detect_anomaly, percent_change};
use super::confidence::confidence_level;
use super::drivers::attribute_drivers;
use super::intent::classify_intent;
use super::metric::resolve_metric;
use super::question::ParsedQuestion;
use super::source::PeriodSource;
use super::types::{
    Comparison, FailureKind, Insight, InsightFlag, InsightResult, Intent, MetricResolution,
};

/// Number of periods every workflow compares
const PERIODS: usize = 2;

/// Answers questions against one schema and one period source
pub struct InsightEngine<'a> {
    schema: &'a SemanticSchema,
    source: &'a dyn PeriodSource,
}

impl<'a> InsightEngine<'a> {
    pub fn new(schema: &'a SemanticSchema, source: &'a dyn PeriodSource) -> Self {
        Self { schema, source }
    }

    /// Answer a free-text question
    ///
    /// Domain conditions (unmapped metric, unsupported question, too little
    /// data) come back as `InsightResult::Failure`. `Err` is reserved for the
    /// data source failing or returning malformed rows.
    pub fn answer(&self, question: &str) -> Result<InsightResult> {
        let intent = classify_intent(question);
        let parsed = ParsedQuestion::parse(question, self.schema);

        tracing::debug!(
            intent = intent.as_str(),
            metric = %parsed.metric,
            aggregation = parsed.aggregation.as_str(),
            dimension = %parsed.dimension,
            grain = parsed.grain.as_str(),
            filters = parsed.filter.clauses.len(),
            "Routing question"
        );

        match intent {
            Intent::DailySummary => self.daily_summary(&parsed),
            Intent::AnomalyCheck => self.anomaly_check(&parsed),
            Intent::ChangeReason => self.change_reason(&parsed),
            Intent::DriverAnalysis => self.driver_analysis(&parsed),
            Intent::Summary | Intent::YearComparison => self.summarize(question),
            Intent::Unsupported => Ok(InsightResult::failure(
                FailureKind::UnsupportedIntent,
                "This analysis is not supported yet.",
            )),
        }
    }

    /// Aggregate the metric a question names, without classifying it
    ///
    /// Questions mentioning a year compare the latest year with the one
    /// before; everything else is aggregated over the whole store.
    pub fn summarize(&self, question: &str) -> Result<InsightResult> {
        let parsed = ParsedQuestion::parse(question, self.schema);

        tracing::debug!(
            metric = %parsed.metric,
            aggregation = parsed.aggregation.as_str(),
            grain = parsed.grain.as_str(),
            filters = parsed.filter.clauses.len(),
            "Summarizing question"
        );

        match parsed.grain {
            PeriodGrain::Year => self.year_comparison(&parsed),
            PeriodGrain::Day | PeriodGrain::Month => self.basic_summary(&parsed),
        }
    }

    /// `AGG(metric)` over every matching row
    pub fn basic_summary(&self, parsed: &ParsedQuestion) -> Result<InsightResult> {
        let column = match self.resolve(&parsed.metric) {
            Ok(column) => column,
            Err(failure) => return Ok(failure),
        };

        let value = self
            .source
            .overall_value(&column, parsed.aggregation, &parsed.filter)?
            .unwrap_or(0.0);
        ensure_finite(value)?;

        let insight = with_filter_lines(Insight::new(Intent::Summary, "Summary"), parsed)
            .line(format!(
                "{}({}) = {:.2}",
                parsed.aggregation.as_str(),
                parsed.metric,
                value
            ))
            .with_data(json!({
                "metric": parsed.metric,
                "aggregation": parsed.aggregation,
                "value": value,
            }));

        Ok(InsightResult::Ok(insight))
    }

    /// Latest year's aggregate against the year before
    pub fn year_comparison(&self, parsed: &ParsedQuestion) -> Result<InsightResult> {
        let column = match self.resolve(&parsed.metric) {
            Ok(column) => column,
            Err(failure) => return Ok(failure),
        };

        let values = self.source.latest_periods(
            &column,
            parsed.aggregation,
            PeriodGrain::Year,
            &parsed.filter,
            PERIODS,
        )?;
        ensure_values_ordered(&values)?;
        let comparison = match compare_latest(&values) {
            Comparison::Compared(comparison) => comparison,
            Comparison::InsufficientData { available } => {
                return Ok(insufficient(PeriodGrain::Year, available))
            }
        };

        let mut insight = with_filter_lines(
            Insight::new(Intent::YearComparison, "Year Comparison"),
            parsed,
        )
        .line(format!(
            "{}: {:.2}",
            comparison.current_period, comparison.current_value
        ))
        .line(format!(
            "{}: {:.2}",
            comparison.previous_period, comparison.previous_value
        ))
        .line(format!("Change: {:.2}%", comparison.percent_change))
        .with_confidence(confidence_level(
            comparison.percent_change,
            None,
            &self.schema.thresholds,
        ));

        if comparison.zero_baseline {
            insight = insight.flag(InsightFlag::DivisionPolicyApplied);
        }

        let insight = insight.with_data(json!({
            "metric": parsed.metric,
            "aggregation": parsed.aggregation,
            "comparison": comparison,
        }));

        Ok(InsightResult::Ok(insight))
    }

    /// Latest period's headline numbers and its revenue change
    pub fn daily_summary(&self, parsed: &ParsedQuestion) -> Result<InsightResult> {
        let column = match self.resolve(REVENUE_METRIC) {
            Ok(column) => column,
            Err(failure) => return Ok(failure),
        };

        let rows = self
            .source
            .daily_metrics(&column, parsed.grain, &parsed.filter, PERIODS)?;
        ensure_rows_ordered(&rows)?;
        let [current, previous, ..] = rows.as_slice() else {
            return Ok(insufficient(parsed.grain, rows.len()));
        };

        let comparison = compare_pair(
            &current.to_value(PeriodMetric::Revenue),
            &previous.to_value(PeriodMetric::Revenue),
        );
        let change = comparison.percent_change;
        let grain = parsed.grain.as_str();

        let trend = if change > 0.0 {
            format!(
                "Revenue increased by {:.2}% compared to the previous {}.",
                change, grain
            )
        } else if change < 0.0 {
            format!(
                "Revenue decreased by {:.2}% compared to the previous {}.",
                change.abs(),
                grain
            )
        } else {
            format!("Revenue remained flat compared to the previous {}.", grain)
        };

        let mut insight = Insight::new(
            Intent::DailySummary,
            format!("{} Sales Summary", grain_adjective(parsed.grain)),
        );
        insight = with_filter_lines(insight, parsed)
            .line(format!("Date: {}", current.period_key))
            .line(format!("Revenue: {:.2}", current.revenue))
            .line(format!("Orders: {:.0}", current.order_count))
            .line(format!("AOV: {:.2}", current.average_order_value))
            .line(trend)
            .with_confidence(confidence_level(change, None, &self.schema.thresholds))
            .with_data(json!({
                "current": current,
                "previous": previous,
                "comparison": comparison,
            }));

        if comparison.zero_baseline {
            insight = insight.flag(InsightFlag::DivisionPolicyApplied);
        }

        Ok(InsightResult::Ok(insight))
    }

    /// Flag a significant swing in the requested metric
    pub fn anomaly_check(&self, parsed: &ParsedQuestion) -> Result<InsightResult> {
        let column = match self.resolve(&parsed.metric) {
            Ok(column) => column,
            Err(failure) => return Ok(failure),
        };

        let values = self.source.latest_periods(
            &column,
            parsed.aggregation,
            parsed.grain,
            &parsed.filter,
            PERIODS,
        )?;
        ensure_values_ordered(&values)?;
        let comparison = match compare_latest(&values) {
            Comparison::Compared(comparison) => comparison,
            Comparison::InsufficientData { available } => {
                return Ok(insufficient(parsed.grain, available))
            }
        };

        let label = metric_label(&parsed.metric, parsed.aggregation);
        let change = comparison.percent_change;
        let verdict = detect_anomaly(comparison, &self.schema.thresholds);

        let summary = match verdict.direction {
            Some(direction) => format!(
                "Yes. {} {} significantly by {:.2}% on {}.",
                label,
                direction.as_str(),
                change.abs(),
                verdict.comparison.current_period
            ),
            None if verdict.comparison.zero_baseline => format!(
                "No significant anomalies detected. {} had no activity in the previous {}, so the change is treated as flat.",
                label,
                parsed.grain.as_str()
            ),
            None => format!(
                "No significant anomalies detected. {} changed by only {:.2}%.",
                label,
                change.abs()
            ),
        };

        let mut insight = with_filter_lines(
            Insight::new(Intent::AnomalyCheck, "Anomaly Check"),
            parsed,
        )
        .line(summary)
        .with_confidence(confidence_level(change, None, &self.schema.thresholds));

        if verdict.comparison.zero_baseline {
            insight = insight.flag(InsightFlag::DivisionPolicyApplied);
        }

        let insight = insight.with_data(json!({
            "metric": parsed.metric,
            "aggregation": parsed.aggregation,
            "verdict": verdict,
        }));

        Ok(InsightResult::Ok(insight))
    }

    /// Attribute a revenue change to order count or order value
    pub fn change_reason(&self, parsed: &ParsedQuestion) -> Result<InsightResult> {
        let column = match self.resolve(REVENUE_METRIC) {
            Ok(column) => column,
            Err(failure) => return Ok(failure),
        };

        let rows = self
            .source
            .daily_metrics(&column, parsed.grain, &parsed.filter, PERIODS)?;
        ensure_rows_ordered(&rows)?;
        let [current, previous, ..] = rows.as_slice() else {
            return Ok(insufficient(parsed.grain, rows.len()));
        };

        let revenue = percent_change(current.revenue, previous.revenue);
        let (reason, factor_zero) =
            analyze_change_reason(current, previous, &self.schema.thresholds);

        let mut insight = with_filter_lines(
            Insight::new(Intent::ChangeReason, "Change Reason Analysis"),
            parsed,
        )
        .line(format!(
            "Comparing {} with {}",
            current.period_key, previous.period_key
        ))
        .line(format!("Revenue change: {:.2}%", revenue.value))
        .line(format!("Orders change: {:.2}%", reason.orders_change_pct))
        .line(format!("AOV change: {:.2}%", reason.aov_change_pct))
        .line(format!("Primary reason for change: {}", reason.cause.label()))
        .with_confidence(confidence_level(
            revenue.value,
            None,
            &self.schema.thresholds,
        ))
        .with_data(json!({
            "current": current,
            "previous": previous,
            "revenue_change_pct": revenue.value,
            "reason": reason,
        }));

        if revenue.zero_baseline || factor_zero {
            insight = insight.flag(InsightFlag::DivisionPolicyApplied);
        }

        Ok(InsightResult::Ok(insight))
    }

    /// Find the dimension value that dominates a change
    pub fn driver_analysis(&self, parsed: &ParsedQuestion) -> Result<InsightResult> {
        let column = match self.resolve(&parsed.metric) {
            Ok(column) => column,
            Err(failure) => return Ok(failure),
        };

        let Some(dimension_columns) = self.schema.dimension_columns(&parsed.dimension) else {
            return Ok(InsightResult::failure(
                FailureKind::MissingDimension,
                format!("{} not mapped", parsed.dimension),
            ));
        };

        let breakdown = self.source.latest_dimension_breakdown(
            dimension_columns,
            &column,
            parsed.grain,
            &parsed.filter,
        )?;
        let Some(breakdown) = breakdown.filter(|b| !b.rows.is_empty()) else {
            return Ok(insufficient(parsed.grain, 0));
        };
        if breakdown.current_period <= breakdown.previous_period {
            return Err(Error::DataSource(format!(
                "breakdown periods out of order: {} then {}",
                breakdown.current_period, breakdown.previous_period
            )));
        }
        for row in &breakdown.rows {
            ensure_finite(row.current_value)?;
            ensure_finite(row.previous_value)?;
        }

        let attribution = attribute_drivers(&breakdown.rows, &self.schema.thresholds);
        let current_total: f64 = breakdown.rows.iter().map(|r| r.current_value).sum();
        let previous_total: f64 = breakdown.rows.iter().map(|r| r.previous_value).sum();
        let overall = percent_change(current_total, previous_total);

        let dimension = &parsed.dimension;
        let mut insight = with_filter_lines(
            Insight::new(
                Intent::DriverAnalysis,
                format!("Driver Analysis ({})", capitalize(dimension)),
            ),
            parsed,
        )
        .line(format!(
            "Comparing {} with {}",
            breakdown.current_period, breakdown.previous_period
        ));

        if !attribution.has_change() {
            insight = insight.line(format!("No overall {} change detected.", parsed.metric));
        } else {
            for c in &attribution.contributions {
                insight = insight.line(format!(
                    "{}: change = {:.2}, contribution = {:.2}%",
                    c.label, c.change, c.contribution_pct
                ));
            }
            insight = match &attribution.primary_driver {
                Some(driver) => insight.line(format!(
                    "Primary driver of change: {} {}.",
                    driver, dimension
                )),
                None => insight.line(format!(
                    "No single {} explains most of the change.",
                    dimension
                )),
            };
        }

        insight = insight
            .with_confidence(confidence_level(
                overall.value,
                Some(attribution.max_contribution),
                &self.schema.thresholds,
            ))
            .with_data(json!({
                "dimension": dimension,
                "metric": parsed.metric,
                "overall_change_pct": overall.value,
                "breakdown": breakdown,
                "attribution": attribution,
            }));

        if overall.zero_baseline {
            insight = insight.flag(InsightFlag::DivisionPolicyApplied);
        }

        Ok(InsightResult::Ok(insight))
    }

    /// Column for a metric, or the failure to hand back
    fn resolve(&self, metric: &str) -> std::result::Result<String, InsightResult> {
        match resolve_metric(self.schema, metric) {
            MetricResolution::Ok { column } => Ok(column),
            MetricResolution::MissingMetric { metric } => Err(InsightResult::failure(
                FailureKind::MissingMetric,
                format!("{} not mapped", metric),
            )),
        }
    }
}

/// Answer one question with a throwaway engine
pub fn answer(
    question: &str,
    schema: &SemanticSchema,
    source: &dyn PeriodSource,
) -> Result<InsightResult> {
    InsightEngine::new(schema, source).answer(question)
}

/// Summarize one question with a throwaway engine
pub fn summarize(
    question: &str,
    schema: &SemanticSchema,
    source: &dyn PeriodSource,
) -> Result<InsightResult> {
    InsightEngine::new(schema, source).summarize(question)
}

fn insufficient(grain: PeriodGrain, available: usize) -> InsightResult {
    InsightResult::failure(
        FailureKind::InsufficientData,
        format!(
            "Not enough data: need {} {}s to compare, found {}.",
            PERIODS,
            grain.as_str(),
            available
        ),
    )
}

/// Applied and dropped filters, ahead of the narrative
fn with_filter_lines(mut insight: Insight, parsed: &ParsedQuestion) -> Insight {
    if !parsed.filter.is_empty() {
        insight = insight.line(format!("Filter: {}", parsed.filter.describe()));
    }
    for dimension in &parsed.ignored_filters {
        insight = insight.line(format!("Filter ignored: {}", dimension));
    }
    insight
}

fn grain_adjective(grain: PeriodGrain) -> &'static str {
    match grain {
        PeriodGrain::Day => "Daily",
        PeriodGrain::Month => "Monthly",
        PeriodGrain::Year => "Yearly",
    }
}

fn metric_label(metric: &str, aggregation: AggregationKind) -> String {
    match aggregation {
        AggregationKind::Sum => capitalize(metric),
        other => format!("{} {}", other.as_str(), metric),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn ensure_finite(value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::DataSource(format!("non-finite value {}", value)))
    }
}

/// Period keys must be strictly descending
fn ensure_keys_descending<'k>(keys: impl Iterator<Item = &'k str>) -> Result<()> {
    let keys: Vec<&str> = keys.collect();
    for pair in keys.windows(2) {
        if pair[0] <= pair[1] {
            return Err(Error::DataSource(format!(
                "periods not ordered most recent first: {} then {}",
                pair[0], pair[1]
            )));
        }
    }
    Ok(())
}

fn ensure_rows_ordered(rows: &[PeriodRow]) -> Result<()> {
    for row in rows {
        ensure_finite(row.order_count)?;
        ensure_finite(row.revenue)?;
        ensure_finite(row.average_order_value)?;
    }
    ensure_keys_descending(rows.iter().map(|r| r.period_key.as_str()))
}

fn ensure_values_ordered(values: &[PeriodValue]) -> Result<()> {
    for value in values {
        ensure_finite(value.value)?;
    }
    ensure_keys_descending(values.iter().map(|v| v.period_key.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::types::ConfidenceLevel;
    use crate::models::{DimensionBreakdown, FilterClause, QueryFilter, RegionChangeRow};
    use std::cell::RefCell;

    /// Canned period source that records the filters it was given
    #[derive(Default)]
    struct FakeSource {
        daily: Vec<PeriodRow>,
        values: Vec<PeriodValue>,
        breakdown: Option<DimensionBreakdown>,
        overall: Option<f64>,
        fail: bool,
        seen_filters: RefCell<Vec<Vec<FilterClause>>>,
        seen_aggregations: RefCell<Vec<AggregationKind>>,
    }

    impl FakeSource {
        fn check(&self, filter: &QueryFilter) -> Result<()> {
            self.seen_filters.borrow_mut().push(filter.clauses.clone());
            if self.fail {
                return Err(Error::DataSource("connection refused".into()));
            }
            Ok(())
        }
    }

    impl PeriodSource for FakeSource {
        fn latest_periods(
            &self,
            _metric_column: &str,
            aggregation: AggregationKind,
            _grain: PeriodGrain,
            filter: &QueryFilter,
            limit: usize,
        ) -> Result<Vec<PeriodValue>> {
            self.check(filter)?;
            self.seen_aggregations.borrow_mut().push(aggregation);
            Ok(self.values.iter().take(limit).cloned().collect())
        }

        fn latest_dimension_breakdown(
            &self,
            _dimension_columns: &[String],
            _metric_column: &str,
            _grain: PeriodGrain,
            filter: &QueryFilter,
        ) -> Result<Option<DimensionBreakdown>> {
            self.check(filter)?;
            Ok(self.breakdown.clone())
        }

        fn overall_value(
            &self,
            _metric_column: &str,
            aggregation: AggregationKind,
            filter: &QueryFilter,
        ) -> Result<Option<f64>> {
            self.check(filter)?;
            self.seen_aggregations.borrow_mut().push(aggregation);
            Ok(self.overall)
        }

        fn daily_metrics(
            &self,
            _revenue_column: &str,
            _grain: PeriodGrain,
            filter: &QueryFilter,
            limit: usize,
        ) -> Result<Vec<PeriodRow>> {
            self.check(filter)?;
            Ok(self.daily.iter().take(limit).cloned().collect())
        }
    }

    fn day(key: &str, orders: f64, revenue: f64) -> PeriodRow {
        PeriodRow {
            period_key: key.to_string(),
            order_count: orders,
            revenue,
            average_order_value: if orders > 0.0 { revenue / orders } else { 0.0 },
        }
    }

    fn value(key: &str, value: f64) -> PeriodValue {
        PeriodValue {
            period_key: key.to_string(),
            value,
        }
    }

    fn schema() -> SemanticSchema {
        SemanticSchema::embedded().unwrap()
    }

    fn region(label: &str, current: f64, previous: f64) -> RegionChangeRow {
        RegionChangeRow {
            label: label.to_string(),
            current_value: current,
            previous_value: previous,
        }
    }

    #[test]
    fn test_daily_summary_increase() {
        let source = FakeSource {
            daily: vec![day("2024-03-02", 10.0, 1200.0), day("2024-03-01", 10.0, 1000.0)],
            ..Default::default()
        };
        let schema = schema();
        let result = answer("How did sales perform yesterday?", &schema, &source).unwrap();

        let insight = result.insight().unwrap();
        assert_eq!(insight.intent, Intent::DailySummary);
        assert_eq!(insight.title, "Daily Sales Summary");
        assert_eq!(insight.lines[0], "Date: 2024-03-02");
        assert_eq!(insight.lines[1], "Revenue: 1200.00");
        assert_eq!(insight.lines[2], "Orders: 10");
        assert_eq!(insight.lines[3], "AOV: 120.00");
        assert_eq!(
            insight.lines[4],
            "Revenue increased by 20.00% compared to the previous day."
        );
        assert_eq!(insight.confidence, Some(ConfidenceLevel::Medium));
        assert!(insight.flags.is_empty());
    }

    #[test]
    fn test_daily_summary_zero_baseline_is_flat() {
        let source = FakeSource {
            daily: vec![day("2024-03-02", 5.0, 500.0), day("2024-03-01", 0.0, 0.0)],
            ..Default::default()
        };
        let schema = schema();
        let result = answer("today?", &schema, &source).unwrap();

        let insight = result.insight().unwrap();
        assert_eq!(
            insight.lines.last().unwrap(),
            "Revenue remained flat compared to the previous day."
        );
        assert_eq!(insight.flags, vec![InsightFlag::DivisionPolicyApplied]);
        assert_eq!(insight.confidence, Some(ConfidenceLevel::Low));
    }

    #[test]
    fn test_daily_summary_insufficient_data() {
        let source = FakeSource {
            daily: vec![day("2024-03-02", 5.0, 500.0)],
            ..Default::default()
        };
        let schema = schema();
        let result = answer("yesterday", &schema, &source).unwrap();
        assert_eq!(result.failure_kind(), Some(FailureKind::InsufficientData));
    }

    #[test]
    fn test_daily_summary_missing_revenue() {
        let schema = SemanticSchema::parse("[metrics]\nquantity = \"qty\"").unwrap();
        let source = FakeSource::default();
        let result = answer("how was today", &schema, &source).unwrap();

        match result {
            InsightResult::Failure { kind, message } => {
                assert_eq!(kind, FailureKind::MissingMetric);
                assert_eq!(message, "revenue not mapped");
            }
            other => panic!("expected failure, got {:?}", other),
        }
        // Nothing was fetched
        assert!(source.seen_filters.borrow().is_empty());
    }

    #[test]
    fn test_rule_order_routes_to_daily_summary() {
        let source = FakeSource {
            daily: vec![day("2024-03-02", 9.0, 900.0), day("2024-03-01", 10.0, 1000.0)],
            ..Default::default()
        };
        let schema = schema();
        let result = answer("Why did sales drop yesterday?", &schema, &source).unwrap();
        assert_eq!(result.insight().unwrap().intent, Intent::DailySummary);
    }

    #[test]
    fn test_anomaly_detected() {
        let source = FakeSource {
            values: vec![value("2024-03-02", 850.0), value("2024-03-01", 1000.0)],
            ..Default::default()
        };
        let schema = schema();
        let result = answer("Anything unusual?", &schema, &source).unwrap();

        let insight = result.insight().unwrap();
        assert_eq!(
            insight.lines[0],
            "Yes. Revenue decreased significantly by 15.00% on 2024-03-02."
        );
        assert_eq!(insight.confidence, Some(ConfidenceLevel::Medium));
    }

    #[test]
    fn test_anomaly_not_detected_uses_aggregation() {
        let source = FakeSource {
            values: vec![value("2024-03-02", 103.0), value("2024-03-01", 100.0)],
            ..Default::default()
        };
        let schema = schema();
        let result = answer("anything weird with average sales", &schema, &source).unwrap();

        let insight = result.insight().unwrap();
        assert_eq!(
            insight.lines[0],
            "No significant anomalies detected. AVG revenue changed by only 3.00%."
        );
        assert_eq!(insight.confidence, Some(ConfidenceLevel::Low));
        assert_eq!(*source.seen_aggregations.borrow(), vec![AggregationKind::Avg]);
    }

    #[test]
    fn test_anomaly_missing_metric() {
        let schema = SemanticSchema::parse(
            r#"
            [metrics]
            revenue = "revenue"

            [[vocabulary]]
            metric = "discount"
            words = ["discount"]
            "#,
        )
        .unwrap();
        let source = FakeSource::default();
        let result = answer("anything unusual in discount", &schema, &source).unwrap();
        assert_eq!(result.failure_kind(), Some(FailureKind::MissingMetric));
    }

    #[test]
    fn test_change_reason_fewer_orders() {
        let source = FakeSource {
            // orders -8%, AOV +1%
            daily: vec![day("2024-03-02", 92.0, 4646.0), day("2024-03-01", 100.0, 5000.0)],
            ..Default::default()
        };
        let schema = schema();
        let result = answer("Why did revenue drop?", &schema, &source).unwrap();

        let insight = result.insight().unwrap();
        assert_eq!(insight.title, "Change Reason Analysis");
        assert!(insight.lines.contains(&"Orders change: -8.00%".to_string()));
        assert!(insight.lines.contains(&"AOV change: 1.00%".to_string()));
        assert_eq!(
            insight.lines.last().unwrap(),
            "Primary reason for change: fewer orders (demand issue)"
        );
    }

    #[test]
    fn test_driver_analysis_primary_driver() {
        let source = FakeSource {
            breakdown: Some(DimensionBreakdown {
                current_period: "2024-03-02".into(),
                previous_period: "2024-03-01".into(),
                rows: vec![region("East", 180.0, 100.0), region("West", 120.0, 100.0)],
            }),
            ..Default::default()
        };
        let schema = schema();
        let result = answer("Which region caused this?", &schema, &source).unwrap();

        let insight = result.insight().unwrap();
        assert_eq!(insight.title, "Driver Analysis (Region)");
        assert_eq!(insight.lines[1], "East: change = 80.00, contribution = 80.00%");
        assert_eq!(insight.lines[2], "West: change = 20.00, contribution = 20.00%");
        assert_eq!(insight.lines[3], "Primary driver of change: East region.");
        // +50% overall with an 80% driver
        assert_eq!(insight.confidence, Some(ConfidenceLevel::High));
    }

    #[test]
    fn test_driver_analysis_no_overall_change() {
        let source = FakeSource {
            breakdown: Some(DimensionBreakdown {
                current_period: "2024-03-02".into(),
                previous_period: "2024-03-01".into(),
                rows: vec![region("East", 150.0, 100.0), region("West", 50.0, 100.0)],
            }),
            ..Default::default()
        };
        let schema = schema();
        let result = answer("which region?", &schema, &source).unwrap();

        let insight = result.insight().unwrap();
        assert_eq!(insight.lines.len(), 2);
        assert_eq!(insight.lines[1], "No overall revenue change detected.");
    }

    #[test]
    fn test_driver_analysis_missing_dimension() {
        let schema = SemanticSchema::parse("[metrics]\nrevenue = \"revenue\"").unwrap();
        let source = FakeSource::default();
        let result = answer("which region caused it", &schema, &source).unwrap();
        assert_eq!(result.failure_kind(), Some(FailureKind::MissingDimension));
    }

    #[test]
    fn test_driver_analysis_insufficient() {
        let source = FakeSource::default();
        let schema = schema();
        let result = answer("which product caused it", &schema, &source).unwrap();
        assert_eq!(result.failure_kind(), Some(FailureKind::InsufficientData));
    }

    #[test]
    fn test_unsupported_intent() {
        let source = FakeSource::default();
        let schema = schema();
        let result = answer("forecast next quarter", &schema, &source).unwrap();
        assert_eq!(result.failure_kind(), Some(FailureKind::UnsupportedIntent));
    }

    #[test]
    fn test_data_source_error_propagates() {
        let source = FakeSource {
            fail: true,
            ..Default::default()
        };
        let schema = schema();
        let err = answer("anything unusual", &schema, &source).unwrap_err();
        assert!(err.is_data_source());
    }

    #[test]
    fn test_out_of_order_rows_are_data_source_error() {
        let source = FakeSource {
            daily: vec![day("2024-03-01", 10.0, 100.0), day("2024-03-02", 10.0, 100.0)],
            ..Default::default()
        };
        let schema = schema();
        let err = answer("yesterday", &schema, &source).unwrap_err();
        assert!(matches!(err, Error::DataSource(_)));
    }

    #[test]
    fn test_filter_is_passed_to_source() {
        let source = FakeSource {
            values: vec![value("2024-03-02", 100.0), value("2024-03-01", 100.0)],
            ..Default::default()
        };
        let schema = schema();
        let result = answer("anything unusual where region = West", &schema, &source).unwrap();

        let seen = source.seen_filters.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0][0].value, "West");
        assert_eq!(
            result.insight().unwrap().lines[0],
            "Filter: region = West"
        );
    }

    #[test]
    fn test_ignored_filter_is_reported() {
        let source = FakeSource {
            values: vec![value("2024-03-02", 100.0), value("2024-03-01", 100.0)],
            ..Default::default()
        };
        let schema = schema();
        let result = answer("anything unusual where store = 12", &schema, &source).unwrap();

        let insight = result.insight().unwrap();
        assert_eq!(insight.lines[0], "Filter ignored: store");
        assert!(source.seen_filters.borrow()[0].is_empty());
    }

    #[test]
    fn test_answer_leaves_summary_questions_unsupported() {
        let source = FakeSource::default();
        let schema = schema();
        let result = answer("total sales", &schema, &source).unwrap();
        assert_eq!(result.failure_kind(), Some(FailureKind::UnsupportedIntent));
    }

    #[test]
    fn test_summarize_uses_detected_aggregation() {
        let source = FakeSource {
            overall: Some(42.5),
            ..Default::default()
        };
        let schema = schema();
        let result = summarize("average sales", &schema, &source).unwrap();

        let insight = result.insight().unwrap();
        assert_eq!(insight.intent, Intent::Summary);
        assert_eq!(insight.title, "Summary");
        assert_eq!(insight.lines, vec!["AVG(revenue) = 42.50"]);
        assert!(insight.confidence.is_none());
        assert_eq!(*source.seen_aggregations.borrow(), vec![AggregationKind::Avg]);
    }

    #[test]
    fn test_summarize_empty_store_is_zero() {
        let source = FakeSource::default();
        let schema = schema();
        let result = summarize("total units", &schema, &source).unwrap();
        assert_eq!(result.insight().unwrap().lines, vec!["SUM(quantity) = 0.00"]);
    }

    #[test]
    fn test_summarize_missing_metric() {
        let schema = SemanticSchema::parse("[metrics]\nquantity = \"qty\"").unwrap();
        let source = FakeSource::default();
        let result = summarize("total sales", &schema, &source).unwrap();
        assert_eq!(result.failure_kind(), Some(FailureKind::MissingMetric));
        assert!(source.seen_filters.borrow().is_empty());
    }

    #[test]
    fn test_year_comparison() {
        let source = FakeSource {
            values: vec![value("2024", 1500.0), value("2023", 1200.0)],
            ..Default::default()
        };
        let schema = schema();
        let result = summarize("sales this year", &schema, &source).unwrap();

        let insight = result.insight().unwrap();
        assert_eq!(insight.intent, Intent::YearComparison);
        assert_eq!(
            insight.lines,
            vec!["2024: 1500.00", "2023: 1200.00", "Change: 25.00%"]
        );
        assert_eq!(insight.confidence, Some(ConfidenceLevel::Medium));
    }

    #[test]
    fn test_year_comparison_insufficient() {
        let source = FakeSource {
            values: vec![value("2024", 1500.0)],
            ..Default::default()
        };
        let schema = schema();
        let result = summarize("revenue by year", &schema, &source).unwrap();
        assert_eq!(result.failure_kind(), Some(FailureKind::InsufficientData));
    }
}
