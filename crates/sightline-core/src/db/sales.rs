//! Sales row operations

use rusqlite::params;
use tracing::{debug, info};

use super::Database;
use crate::error::Result;
use crate::models::{NewSale, StoreStatus};

/// Rows written and skipped by a batch insert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertOutcome {
    pub inserted: usize,
    pub duplicates: usize,
}

impl Database {
    /// Insert a batch of sales in one transaction, skipping duplicates
    pub fn insert_sales(&self, sales: &[NewSale]) -> Result<InsertOutcome> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut outcome = InsertOutcome::default();

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT OR IGNORE INTO sales_transactions (order_id, order_date, attributes, import_hash)
                VALUES (?, ?, ?, ?)
                "#,
            )?;

            for sale in sales {
                let changed = stmt.execute(params![
                    sale.order_id,
                    sale.order_date.to_string(),
                    sale.attributes,
                    sale.import_hash,
                ])?;
                if changed == 0 {
                    debug!(order_id = %sale.order_id, "Skipping duplicate sale");
                    outcome.duplicates += 1;
                } else {
                    outcome.inserted += 1;
                }
            }
        }

        tx.commit()?;
        info!(
            inserted = outcome.inserted,
            duplicates = outcome.duplicates,
            "Inserted sales batch"
        );
        Ok(outcome)
    }

    /// Row count and date span of the store
    pub fn status(&self) -> Result<StoreStatus> {
        let conn = self.conn()?;
        let status = conn.query_row(
            "SELECT COUNT(*), MIN(order_date), MAX(order_date) FROM sales_transactions",
            [],
            |row| {
                Ok(StoreStatus {
                    row_count: row.get(0)?,
                    first_date: row.get(1)?,
                    last_date: row.get(2)?,
                })
            },
        )?;
        Ok(status)
    }
}
