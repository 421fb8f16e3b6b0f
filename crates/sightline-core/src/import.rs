//! CSV import for sales data
//!
//! Any CSV with a header row can be loaded. The schema's source columns say
//! which header holds the order date and which the order id; every column
//! is kept as a JSON attribute object so metrics and dimensions can be
//! remapped later without re-importing.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::config::SourceColumns;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{ImportStats, NewSale};

/// Rows parsed from one CSV, plus how many were unusable
#[derive(Debug, Clone, Default)]
pub struct ParsedSales {
    pub sales: Vec<NewSale>,
    pub skipped: usize,
}

/// Convert a CSV record to a JSON object using headers as keys
fn record_to_json(headers: &StringRecord, record: &StringRecord) -> String {
    let mut map = Map::new();
    for (i, header) in headers.iter().enumerate() {
        if let Some(value) = record.get(i) {
            map.insert(header.trim().to_string(), Value::String(value.trim().to_string()));
        }
    }
    Value::Object(map).to_string()
}

/// Content hash used to skip rows already imported
fn generate_hash(record: &StringRecord) -> String {
    let mut hasher = Sha256::new();
    for field in record.iter() {
        hasher.update(field.trim().as_bytes());
        // Field boundary, so "a,bc" and "ab,c" differ
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}

/// Position of a header, exact match first, then case-insensitive
fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .or_else(|| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name)))
}

/// Parse a date string in the supported formats
fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%m/%d/%Y", // 01/15/2024
        "%Y/%m/%d", // 2024/01/15
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    // Timestamps such as "2024-01-15 10:30:00" keep only the date part
    if let Some((date_part, _)) = s.split_once([' ', 'T']) {
        if let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
            return Ok(date);
        }
    }

    Err(Error::Import(format!("Unable to parse date: {}", s)))
}

/// Parse sales rows from CSV data
pub fn parse_csv<R: Read>(reader: R, source: &SourceColumns) -> Result<ParsedSales> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let date_idx = find_column(&headers, &source.date_column).ok_or_else(|| {
        Error::Import(format!("Missing date column: {}", source.date_column))
    })?;
    let order_idx = find_column(&headers, &source.order_column);
    if order_idx.is_none() {
        debug!(column = %source.order_column, "No order column, using row numbers");
    }

    let mut parsed = ParsedSales::default();

    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        // Header is line 1
        let line = i + 2;

        let date_str = record.get(date_idx).unwrap_or_default();
        let order_date = match parse_date(date_str) {
            Ok(date) => date,
            Err(e) => {
                warn!(line, error = %e, "Skipping CSV row");
                parsed.skipped += 1;
                continue;
            }
        };

        let order_id = order_idx
            .and_then(|idx| record.get(idx))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| (i + 1).to_string());

        parsed.sales.push(NewSale {
            order_id,
            order_date,
            attributes: record_to_json(&headers, &record),
            import_hash: generate_hash(&record),
        });
    }

    debug!(
        parsed = parsed.sales.len(),
        skipped = parsed.skipped,
        "Parsed sales CSV"
    );
    Ok(parsed)
}

/// Parse a CSV file and store its rows
pub fn import_csv(db: &Database, path: &Path, source: &SourceColumns) -> Result<ImportStats> {
    let file = File::open(path)
        .map_err(|e| Error::Import(format!("Failed to open {}: {}", path.display(), e)))?;
    let parsed = parse_csv(file, source)?;
    let outcome = db.insert_sales(&parsed.sales)?;

    let stats = ImportStats {
        parsed: parsed.sales.len(),
        imported: outcome.inserted,
        duplicates: outcome.duplicates,
        skipped: parsed.skipped,
    };

    info!(
        file = %path.display(),
        imported = stats.imported,
        duplicates = stats.duplicates,
        skipped = stats.skipped,
        "Import complete"
    );
    Ok(stats)
}
