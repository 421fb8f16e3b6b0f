//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `load_schema` - Shared utility to resolve the semantic schema
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use sightline_core::{db::Database, SemanticSchema};

pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .with_context(|| format!("Database path is not valid UTF-8: {}", db_path.display()))?;
    Database::new(path_str).context("Failed to open database")
}

pub fn load_schema(schema_path: Option<&Path>) -> Result<SemanticSchema> {
    SemanticSchema::load(schema_path).context("Failed to load semantic schema")
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    open_db(db_path)?;

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Import sales: sightline import --file sales.csv");
    println!("  2. Ask a question: sightline ask \"How were sales yesterday?\"");

    Ok(())
}
