//! Period aggregation queries
//!
//! Sales rows are bucketed with `strftime` on `order_date`, so period keys
//! sort lexically in time order and every query can simply order by key.

use rusqlite::ToSql;
use tracing::debug;

use super::sale_filter::{dimension_expr, metric_expr, FilterSql};
use super::Database;
use crate::error::Result;
use crate::insights::PeriodSource;
use crate::models::{
    AggregationKind, DimensionBreakdown, PeriodGrain, PeriodRow, PeriodValue, QueryFilter,
    RegionChangeRow,
};

/// Label shown for rows with no value in the dimension columns
const BLANK_LABEL: &str = "(blank)";

fn aggregate_expr(aggregation: AggregationKind, metric_column: &str) -> String {
    match aggregation {
        // Counting is of orders, whatever the metric column holds
        AggregationKind::Count => "COUNT(order_id)".to_string(),
        other => format!("{}({})", other.as_str(), metric_expr(metric_column)),
    }
}

fn period_expr(grain: PeriodGrain) -> String {
    format!("strftime('{}', order_date)", grain.key_format())
}

impl Database {
    /// The most recent `limit` distinct period keys, newest first
    fn latest_period_keys(
        &self,
        grain: PeriodGrain,
        filter: &QueryFilter,
        limit: usize,
    ) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let filter_sql = FilterSql::build(filter, 1);
        let sql = format!(
            r#"
            SELECT DISTINCT {} AS period
            FROM sales_transactions
            {}
            ORDER BY period DESC
            LIMIT ?{}
            "#,
            period_expr(grain),
            filter_sql.where_clause(),
            filter_sql.params.len() + 1
        );

        let limit = limit as i64;
        let mut query_params: Vec<&dyn ToSql> =
            filter_sql.params.iter().map(|p| p as &dyn ToSql).collect();
        query_params.push(&limit);

        let mut stmt = conn.prepare(&sql)?;
        let keys = stmt
            .query_map(query_params.as_slice(), |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}

impl PeriodSource for Database {
    fn latest_periods(
        &self,
        metric_column: &str,
        aggregation: AggregationKind,
        grain: PeriodGrain,
        filter: &QueryFilter,
        limit: usize,
    ) -> Result<Vec<PeriodValue>> {
        let conn = self.conn()?;
        let filter_sql = FilterSql::build(filter, 1);
        let sql = format!(
            r#"
            SELECT {} AS period, {} AS value
            FROM sales_transactions
            {}
            GROUP BY period
            ORDER BY period DESC
            LIMIT ?{}
            "#,
            period_expr(grain),
            aggregate_expr(aggregation, metric_column),
            filter_sql.where_clause(),
            filter_sql.params.len() + 1
        );

        let limit = limit as i64;
        let mut query_params: Vec<&dyn ToSql> =
            filter_sql.params.iter().map(|p| p as &dyn ToSql).collect();
        query_params.push(&limit);

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(query_params.as_slice(), |row| {
            let value: Option<f64> = row.get(1)?;
            Ok(PeriodValue {
                period_key: row.get(0)?,
                value: value.unwrap_or(0.0),
            })
        })?;
        let values = rows.collect::<std::result::Result<Vec<_>, _>>()?;

        debug!(
            metric = metric_column,
            aggregation = %aggregation,
            grain = grain.as_str(),
            periods = values.len(),
            "Loaded period values"
        );
        Ok(values)
    }

    fn latest_dimension_breakdown(
        &self,
        dimension_columns: &[String],
        metric_column: &str,
        grain: PeriodGrain,
        filter: &QueryFilter,
    ) -> Result<Option<DimensionBreakdown>> {
        let keys = self.latest_period_keys(grain, filter, 2)?;
        let [current_period, previous_period] = match <[String; 2]>::try_from(keys) {
            Ok(pair) => pair,
            Err(_) => return Ok(None),
        };

        let conn = self.conn()?;
        let period = period_expr(grain);
        let value = metric_expr(metric_column);
        let filter_sql = FilterSql::build(filter, 3);
        let sql = format!(
            r#"
            SELECT
                {label} AS label,
                COALESCE(SUM(CASE WHEN {period} = ?1 THEN {value} ELSE 0 END), 0) AS current_value,
                COALESCE(SUM(CASE WHEN {period} = ?2 THEN {value} ELSE 0 END), 0) AS previous_value
            FROM sales_transactions
            WHERE {period} IN (?1, ?2) {filter}
            GROUP BY label
            ORDER BY label
            "#,
            label = dimension_expr(dimension_columns),
            period = period,
            value = value,
            filter = filter_sql.and_clause(),
        );

        let mut query_params: Vec<&dyn ToSql> = vec![&current_period, &previous_period];
        query_params.extend(filter_sql.params.iter().map(|p| p as &dyn ToSql));

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(query_params.as_slice(), |row| {
            let label: String = row.get(0)?;
            Ok(RegionChangeRow {
                label: if label.is_empty() {
                    BLANK_LABEL.to_string()
                } else {
                    label
                },
                current_value: row.get(1)?,
                previous_value: row.get(2)?,
            })
        })?;
        let rows = rows.collect::<std::result::Result<Vec<_>, _>>()?;

        debug!(
            dimension = ?dimension_columns,
            current = %current_period,
            previous = %previous_period,
            values = rows.len(),
            "Loaded dimension breakdown"
        );

        Ok(Some(DimensionBreakdown {
            current_period,
            previous_period,
            rows,
        }))
    }

    fn overall_value(
        &self,
        metric_column: &str,
        aggregation: AggregationKind,
        filter: &QueryFilter,
    ) -> Result<Option<f64>> {
        let conn = self.conn()?;
        let filter_sql = FilterSql::build(filter, 1);
        let sql = format!(
            "SELECT {} FROM sales_transactions {}",
            aggregate_expr(aggregation, metric_column),
            filter_sql.where_clause()
        );

        let value: Option<f64> = conn.query_row(
            &sql,
            rusqlite::params_from_iter(filter_sql.params.iter()),
            |row| row.get(0),
        )?;

        debug!(
            metric = metric_column,
            aggregation = %aggregation,
            value = ?value,
            "Loaded overall value"
        );
        Ok(value)
    }

    fn daily_metrics(
        &self,
        revenue_column: &str,
        grain: PeriodGrain,
        filter: &QueryFilter,
        limit: usize,
    ) -> Result<Vec<PeriodRow>> {
        let conn = self.conn()?;
        let filter_sql = FilterSql::build(filter, 1);
        let sql = format!(
            r#"
            SELECT
                {} AS period,
                COUNT(order_id) AS orders,
                COALESCE(SUM({}), 0) AS revenue
            FROM sales_transactions
            {}
            GROUP BY period
            ORDER BY period DESC
            LIMIT ?{}
            "#,
            period_expr(grain),
            metric_expr(revenue_column),
            filter_sql.where_clause(),
            filter_sql.params.len() + 1
        );

        let limit = limit as i64;
        let mut query_params: Vec<&dyn ToSql> =
            filter_sql.params.iter().map(|p| p as &dyn ToSql).collect();
        query_params.push(&limit);

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(query_params.as_slice(), |row| {
            let orders: i64 = row.get(1)?;
            let revenue: f64 = row.get(2)?;
            let orders = orders as f64;
            Ok(PeriodRow {
                period_key: row.get(0)?,
                order_count: orders,
                revenue,
                average_order_value: if orders > 0.0 { revenue / orders } else { 0.0 },
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}
