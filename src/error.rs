// src/error.rs

//! Unified error handling for the aggregator.

use std::fmt;

use thiserror::Error;

/// Result type alias for aggregator operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// A source adapter could not produce data
    #[error("Source {source_name} unavailable: {message}")]
    Source {
        source_name: String,
        message: String,
    },

    /// Dataset file could not be imported
    #[error("Import failed for {path}: {message}")]
    Import { path: String, message: String },

    /// Update/delete target does not exist
    #[error("No record with id {id} in {collection}")]
    RecordNotFound { collection: String, id: String },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a source failure with context.
    pub fn source(source_name: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Source {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    /// Create an import failure for the given path.
    pub fn import(path: impl fmt::Display, message: impl fmt::Display) -> Self {
        Self::Import {
            path: path.to_string(),
            message: message.to_string(),
        }
    }

    /// Create a missing-record error.
    pub fn not_found(collection: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::RecordNotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }
}
