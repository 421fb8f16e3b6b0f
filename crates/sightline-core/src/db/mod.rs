//! Database access layer with connection pooling and migrations
//!
//! This module is organized by concern:
//! - `sales` - Inserting imported sales rows and store status
//! - `periods` - Period aggregation queries (the `PeriodSource` implementation)
//! - `sale_filter` - SQL fragments for attribute lookups and request filters

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use crate::error::Result;

mod periods;
mod sale_filter;
mod sales;


pub use sale_filter::{dimension_expr, metric_expr, FilterSql};

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
}

impl Database {
    /// Open (or create) the sales store at `path`
    pub fn new(path: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder().max_size(10).build(manager)?;

        let db = Self {
            pool,
            db_path: path.to_string(),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create a scratch database (for testing)
    ///
    /// Note: Uses a temporary file rather than `:memory:` because every
    /// pooled connection would otherwise see its own empty database.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "sightline_test_{}_{}.db",
            std::process::id(),
            id
        ));

        // Remove any existing file
        let _ = std::fs::remove_file(&path);

        Self::new(&path.to_string_lossy())
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Delete every imported sales row
    pub fn clear_sales(&self) -> Result<usize> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM sales_transactions", [])?;
        info!(deleted, "Cleared sales data");
        Ok(deleted)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- WAL mode: readers don't block the importer
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;

            -- One row per imported CSV line. Every CSV column is kept in
            -- `attributes` (a JSON object of strings) so the semantic schema
            -- can map metrics and dimensions onto any of them.
            CREATE TABLE IF NOT EXISTS sales_transactions (
                id INTEGER PRIMARY KEY,
                order_id TEXT NOT NULL,
                order_date DATE NOT NULL,
                attributes TEXT NOT NULL DEFAULT '{}',
                import_hash TEXT NOT NULL UNIQUE,
                imported_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_sales_order_date ON sales_transactions(order_date);
            "#,
        )?;

        info!(path = %self.db_path, "Database migrations complete");
        Ok(())
    }
}
