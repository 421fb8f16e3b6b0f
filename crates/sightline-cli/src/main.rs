//! Sightline CLI - Sales insight engine
//!
//! Usage:
//!   sightline init                       Initialize database
//!   sightline import --file sales.csv    Import sales rows
//!   sightline ask Why did revenue drop?  Answer a question
//!   sightline summary average discount   Aggregate a metric
//!   sightline schema                     Show the semantic schema

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let schema_path = cli.schema.as_deref();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Import { file } => commands::cmd_import(&cli.db, &file, schema_path),
        Commands::Ask { question, json } => {
            let db = commands::open_db(&cli.db)?;
            let schema = commands::load_schema(schema_path)?;
            commands::cmd_ask(&db, &schema, &question.join(" "), json)
        }
        Commands::Summary { question, json } => {
            let db = commands::open_db(&cli.db)?;
            let schema = commands::load_schema(schema_path)?;
            commands::cmd_summary(&db, &schema, &question.join(" "), json)
        }
        Commands::Schema => commands::cmd_schema(schema_path),
        Commands::Status => commands::cmd_status(&cli.db),
        Commands::Reset { yes } => commands::cmd_reset(&cli.db, yes),
    }
}
