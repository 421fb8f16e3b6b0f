//! Metric resolution and aggregation detection

use crate::config::SemanticSchema;
use crate::models::AggregationKind;

use super::types::MetricResolution;

/// Keyword families checked in order; the first family with a hit wins.
/// Keywords are plain substrings, so "discount" counts and "admin" is MIN.
const AGGREGATION_KEYWORDS: &[(AggregationKind, &[&str])] = &[
    (AggregationKind::Avg, &["avg", "average", "mean"]),
    (AggregationKind::Min, &["min", "minimum", "lowest"]),
    (AggregationKind::Max, &["max", "maximum", "highest"]),
    (AggregationKind::Count, &["count", "how many"]),
];

/// Look up the column behind a metric name
pub fn resolve_metric(schema: &SemanticSchema, metric: &str) -> MetricResolution {
    match schema.metrics.get(metric) {
        Some(column) if !column.trim().is_empty() => MetricResolution::Ok {
            column: column.clone(),
        },
        _ => MetricResolution::MissingMetric {
            metric: metric.to_string(),
        },
    }
}

/// Infer the aggregation a question asks for, defaulting to SUM
pub fn detect_aggregation(question: &str) -> AggregationKind {
    let text = question.to_lowercase();

    AGGREGATION_KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| text.contains(w)))
        .map(|(kind, _)| *kind)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> SemanticSchema {
        SemanticSchema::parse(
            r#"
            [metrics]
            revenue = "sales_amount"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_mapped_metric() {
        assert_eq!(
            resolve_metric(&schema(), "revenue"),
            MetricResolution::Ok {
                column: "sales_amount".to_string()
            }
        );
    }

    #[test]
    fn test_resolve_unmapped_metric_echoes_key() {
        assert_eq!(
            resolve_metric(&schema(), "discount"),
            MetricResolution::MissingMetric {
                metric: "discount".to_string()
            }
        );
    }

    #[test]
    fn test_resolve_blank_column_is_missing() {
        let mut schema = schema();
        schema.metrics.insert("quantity".into(), "".into());
        assert!(matches!(
            resolve_metric(&schema, "quantity"),
            MetricResolution::MissingMetric { .. }
        ));
    }

    #[test]
    fn test_detect_each_family() {
        assert_eq!(detect_aggregation("average order size"), AggregationKind::Avg);
        assert_eq!(detect_aggregation("Lowest revenue day"), AggregationKind::Min);
        assert_eq!(detect_aggregation("highest sales"), AggregationKind::Max);
        assert_eq!(detect_aggregation("How many orders"), AggregationKind::Count);
        assert_eq!(detect_aggregation("order count"), AggregationKind::Count);
        assert_eq!(detect_aggregation("total revenue"), AggregationKind::Sum);
    }

    #[test]
    fn test_detect_priority_avg_before_max() {
        assert_eq!(
            detect_aggregation("mean of the maximum"),
            AggregationKind::Avg
        );
        assert_eq!(detect_aggregation("max and min"), AggregationKind::Min);
    }

    #[test]
    fn test_keywords_match_inside_words() {
        assert_eq!(detect_aggregation("total discount"), AggregationKind::Count);
        assert_eq!(detect_aggregation("admin report"), AggregationKind::Min);
        assert_eq!(detect_aggregation("maximal revenue"), AggregationKind::Max);
        assert_eq!(detect_aggregation("minimal sales"), AggregationKind::Min);
        assert_eq!(detect_aggregation("a meaningful change"), AggregationKind::Avg);
        assert_eq!(detect_aggregation("sales by country"), AggregationKind::Count);
    }
}
