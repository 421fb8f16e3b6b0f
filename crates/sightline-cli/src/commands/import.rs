//! Import command implementation

use std::path::Path;

use anyhow::{Context, Result};
use sightline_core::import::import_csv;

use super::{load_schema, open_db};

pub fn cmd_import(db_path: &Path, file: &Path, schema_path: Option<&Path>) -> Result<()> {
    let schema = load_schema(schema_path)?;

    println!("📥 Importing sales from {}...", file.display());

    let db = open_db(db_path)?;
    let stats = import_csv(&db, file, &schema.source)
        .with_context(|| format!("Failed to import {}", file.display()))?;

    println!();
    println!("✅ Import complete!");
    println!("   Imported: {}", stats.imported);
    if stats.duplicates > 0 {
        println!("   Skipped (duplicates): {}", stats.duplicates);
    }
    if stats.skipped > 0 {
        println!(
            "   ⚠️  Skipped (unreadable {}): {}",
            schema.source.date_column, stats.skipped
        );
    }

    Ok(())
}
