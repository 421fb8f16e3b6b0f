//! Question parsing
//!
//! Pulls the pieces a workflow needs out of free text: which metric, which
//! aggregation, which dimension, the period grain, and any explicit
//! `where <dimension> = <value>` filters.

use std::sync::OnceLock;

use regex::Regex;

use crate::config::{SemanticSchema, DEFAULT_DIMENSION, REVENUE_METRIC};
use crate::models::{AggregationKind, PeriodGrain, QueryFilter};

use super::metric::detect_aggregation;

/// Everything extracted from one question
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuestion {
    pub metric: String,
    pub aggregation: AggregationKind,
    pub dimension: String,
    pub grain: PeriodGrain,
    pub filter: QueryFilter,
    /// Filter dimensions that are not in the schema
    pub ignored_filters: Vec<String>,
}

impl ParsedQuestion {
    pub fn parse(question: &str, schema: &SemanticSchema) -> Self {
        let text = question.to_lowercase();
        let (filter, ignored_filters) = detect_filters(question, schema);

        Self {
            metric: detect_metric(&text, schema),
            aggregation: detect_aggregation(&text),
            dimension: detect_dimension(&text, schema),
            grain: detect_grain(&text),
            filter,
            ignored_filters,
        }
    }
}

/// Metric named by the question: vocabulary words first, then bare metric
/// names, falling back to revenue
pub fn detect_metric(text: &str, schema: &SemanticSchema) -> String {
    let text = text.to_lowercase();

    for entry in &schema.vocabulary {
        if entry.words.iter().any(|w| text.contains(&w.to_lowercase())) {
            return entry.metric.clone();
        }
    }

    schema
        .metrics
        .keys()
        .find(|name| text.contains(&name.to_lowercase()))
        .cloned()
        .unwrap_or_else(|| REVENUE_METRIC.to_string())
}

/// First schema dimension (by name) mentioned in the question
pub fn detect_dimension(text: &str, schema: &SemanticSchema) -> String {
    let text = text.to_lowercase();
    schema
        .dimensions
        .keys()
        .find(|name| text.contains(&name.to_lowercase()))
        .cloned()
        .unwrap_or_else(|| DEFAULT_DIMENSION.to_string())
}

pub fn detect_grain(text: &str) -> PeriodGrain {
    let text = text.to_lowercase();
    if text.contains("year") {
        PeriodGrain::Year
    } else if text.contains("month") {
        PeriodGrain::Month
    } else {
        PeriodGrain::Day
    }
}

fn filter_regex() -> &'static Regex {
    static FILTER_RE: OnceLock<Regex> = OnceLock::new();
    FILTER_RE.get_or_init(|| {
        Regex::new(r#"(?i)\bwhere\s+(\w+)\s*=\s*(?:"([^"]+)"|'([^']+)'|([\w\-]+))"#)
            .expect("valid regex")
    })
}

/// Explicit equality filters, split into mapped and unknown dimensions
pub fn detect_filters(question: &str, schema: &SemanticSchema) -> (QueryFilter, Vec<String>) {
    let mut filter = QueryFilter::new();
    let mut ignored = Vec::new();

    for caps in filter_regex().captures_iter(question) {
        let dimension = caps[1].to_lowercase();
        let Some(value) = caps.get(2).or(caps.get(3)).or(caps.get(4)) else {
            continue;
        };

        match schema.dimension_columns(&dimension) {
            Some(columns) => {
                filter = filter.with_clause(&dimension, columns.to_vec(), value.as_str().trim());
            }
            None => {
                tracing::warn!(dimension = %dimension, "Ignoring filter on unmapped dimension");
                ignored.push(dimension);
            }
        }
    }

    (filter, ignored)
}
