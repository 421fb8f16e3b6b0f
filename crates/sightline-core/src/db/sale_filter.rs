//! SQL fragments for sales queries
//!
//! Metric and dimension columns live inside the `attributes` JSON object,
//! so lookups go through `json_extract`. Column names come from the
//! semantic schema and are embedded as quoted JSON paths; filter values are
//! always bound as parameters.

use crate::config::COMPOSITE_SEPARATOR;
use crate::models::QueryFilter;

/// JSON path literal for an attribute column, quoted for SQL
fn path_literal(column: &str) -> String {
    format!("'$.\"{}\"'", column.replace('\'', "''"))
}

/// Numeric value of a metric column (currency symbols and separators stripped)
pub fn metric_expr(column: &str) -> String {
    format!(
        "CAST(REPLACE(REPLACE(json_extract(attributes, {}), ',', ''), '$', '') AS REAL)",
        path_literal(column)
    )
}

/// Label of a (possibly composite) dimension
pub fn dimension_expr(columns: &[String]) -> String {
    let separator = format!(" || '{}' || ", COMPOSITE_SEPARATOR.replace('\'', "''"));
    columns
        .iter()
        .map(|c| format!("COALESCE(json_extract(attributes, {}), '')", path_literal(c)))
        .collect::<Vec<_>>()
        .join(&separator)
}

/// SQL conditions and bound values for a request filter
pub struct FilterSql {
    /// Conditions to AND together (empty if the filter is empty)
    pub conditions: Vec<String>,
    /// Values for the `?N` placeholders, in placeholder order
    pub params: Vec<String>,
}

impl FilterSql {
    /// Build conditions whose placeholders start at `?{first_param}`
    pub fn build(filter: &QueryFilter, first_param: usize) -> Self {
        let mut conditions = Vec::with_capacity(filter.clauses.len());
        let mut params = Vec::with_capacity(filter.clauses.len());

        for (i, clause) in filter.clauses.iter().enumerate() {
            conditions.push(format!(
                "{} = ?{} COLLATE NOCASE",
                dimension_expr(&clause.columns),
                first_param + i
            ));
            params.push(clause.value.clone());
        }

        Self { conditions, params }
    }

    /// `WHERE ...` clause, or an empty string
    pub fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    /// `AND ...` suffix for a query that already has a WHERE
    pub fn and_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("AND {}", self.conditions.join(" AND "))
        }
    }
}
