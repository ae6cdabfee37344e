//! Error types used by the crate.

use thiserror::Error;

/// Photomap error type.
#[derive(Debug, Error)]
pub enum PhotomapError {
    /// Network error while loading data.
    #[error("failed to load data: {0}")]
    IO(String),
    /// Error reading/writing data to the FS.
    #[error("failed to access file")]
    FsIo(#[from] std::io::Error),
    /// Tabular data could not be read.
    #[error("failed to read csv data")]
    Csv(#[from] csv::Error),
    /// JSON encoding or decoding error.
    #[error("failed to encode or decode json")]
    Json(#[from] serde_json::Error),
    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for PhotomapError {
    fn from(value: reqwest::Error) -> Self {
        Self::IO(value.to_string())
    }
}
