//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `ask` - Answering and summarizing questions through the insight engine
//! - `core` - Core commands (init) and shared utilities (open_db, load_schema)
//! - `import` - CSV import
//! - `schema` - Semantic schema display
//! - `status` - Status and reset commands

pub mod ask;
pub mod core;
pub mod import;
pub mod schema;
pub mod status;

// Re-export command functions for main.rs
pub use ask::*;
pub use core::*;
pub use import::*;
pub use schema::*;
pub use status::*;
