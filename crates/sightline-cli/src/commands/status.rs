//! Status and reset command implementations

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use super::open_db;

pub fn cmd_status(db_path: &Path) -> Result<()> {
    println!();
    println!("📊 Sightline Status");
    println!("   ─────────────────────────────────────────────────────────────");

    println!("   Database: {}", db_path.display());

    // Check if database file exists and get size
    if !db_path.exists() {
        println!("   Size: (database not initialized)");
        println!();
        return Ok(());
    }

    if let Ok(metadata) = fs::metadata(db_path) {
        let size_kb = metadata.len() as f64 / 1024.0;
        if size_kb < 1024.0 {
            println!("   Size: {:.1} KB", size_kb);
        } else {
            println!("   Size: {:.1} MB", size_kb / 1024.0);
        }
    }

    match open_db(db_path).and_then(|db| db.status().context("Failed to read status")) {
        Ok(status) => {
            println!();
            println!("   Sales rows: {}", status.row_count);
            if let (Some(first), Some(last)) = (&status.first_date, &status.last_date) {
                println!("   Date range: {} to {}", first, last);
            }
        }
        Err(e) => {
            println!();
            println!("   ❌ Error opening database: {:#}", e);
        }
    }

    println!();
    Ok(())
}

pub fn cmd_reset(db_path: &Path, yes: bool) -> Result<()> {
    if !yes {
        bail!(
            "This deletes every imported sales row in {}. Re-run with --yes to confirm.",
            db_path.display()
        );
    }

    let db = open_db(db_path)?;
    let deleted = db.clear_sales()?;

    println!("🗑️  Deleted {} sales rows", deleted);
    Ok(())
}
