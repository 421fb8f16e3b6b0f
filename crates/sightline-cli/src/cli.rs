//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Sightline - Ask plain-language questions about your sales data
#[derive(Parser)]
#[command(name = "sightline")]
#[command(about = "Sales insight engine for CSV sales data", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "sightline.db", global = true)]
    pub db: PathBuf,

    /// Semantic schema file (defaults to the data-dir override, then the built-in schema)
    #[arg(long, global = true)]
    pub schema: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Import sales rows from CSV
    Import {
        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Ask a question about the sales data
    Ask {
        /// The question, e.g. "Why did revenue drop?"
        #[arg(required = true, trailing_var_arg = true)]
        question: Vec<String>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Aggregate a metric over all data, or compare the last two years
    Summary {
        /// The question, e.g. "average discount" or "sales by year"
        #[arg(required = true, trailing_var_arg = true)]
        question: Vec<String>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the semantic schema in effect
    Schema,

    /// Show database status
    Status,

    /// Delete all imported sales data
    Reset {
        /// Skip the confirmation check
        #[arg(long)]
        yes: bool,
    },
}
