//! Sightline Core Library
//!
//! Shared functionality for the Sightline sales insight tool:
//! - Semantic schema mapping business names onto sales columns
//! - Database access and migrations
//! - CSV import of sales data
//! - Insight engine answering analytical questions

pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod insights;
pub mod models;

pub use config::{SemanticSchema, SourceColumns, Thresholds};
pub use db::Database;
pub use error::{Error, Result};
pub use import::{import_csv, parse_csv, ParsedSales};
pub use insights::{
    answer, summarize, ConfidenceLevel, FailureKind, Insight, InsightEngine, InsightFlag,
    InsightResult, Intent, PeriodSource,
};
pub use models::{ImportStats, QueryFilter, StoreStatus};
