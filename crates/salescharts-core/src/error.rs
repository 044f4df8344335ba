// crates/salescharts-core/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Database query failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Chart rendering failed: {0}")]
    Render(String),

    #[error("{report} query returned no rows")]
    EmptyResult { report: &'static str },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ReportError {
    /// Plotters errors are generic over the backend, so they are carried as text.
    pub fn render(err: impl std::fmt::Display) -> Self {
        ReportError::Render(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
