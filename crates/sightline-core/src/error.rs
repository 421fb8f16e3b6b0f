//! Error types for Sightline

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Schema config error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Import error: {0}")]
    Import(String),

    /// The period store returned something the engine cannot use
    #[error("Data source error: {0}")]
    DataSource(String),
}

impl Error {
    /// Whether this error came from the data-access side (store, pool, rows)
    pub fn is_data_source(&self) -> bool {
        matches!(
            self,
            Error::Database(_) | Error::Pool(_) | Error::DataSource(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
