// src/error.rs

//! Unified error handling for the bounty harvester.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::QuestionId;

/// Result type alias for harvester operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// The target-ID source is missing or unreadable
    #[error("Question ID source unavailable at {}: {message}", path.display())]
    SourceUnavailable { path: PathBuf, message: String },

    /// The result store exists but could not be read back
    #[error("Result store unreadable at {}: {message}", path.display())]
    StoreRead { path: PathBuf, message: String },

    /// A batch could not be appended to the result store
    #[error("Failed to append batch to {}: {message}", path.display())]
    StoreWrite { path: PathBuf, message: String },

    /// Fetching or rendering a single timeline failed
    #[error("Fetch error for question {question_id}: {message}")]
    Fetch {
        question_id: QuestionId,
        message: String,
    },

    /// The browser session is gone; no further page can be fetched
    #[error("Browser session error: {0}")]
    Session(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Parquet encoding/decoding failed
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Arrow array construction failed
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a transient fetch error for one question.
    pub fn fetch(question_id: QuestionId, message: impl fmt::Display) -> Self {
        Self::Fetch {
            question_id,
            message: message.to_string(),
        }
    }

    /// Create a browser session error.
    pub fn session(message: impl fmt::Display) -> Self {
        Self::Session(message.to_string())
    }

    /// Create a source-unavailable error.
    pub fn source_unavailable(path: &Path, message: impl fmt::Display) -> Self {
        Self::SourceUnavailable {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }

    /// Create a store read error.
    pub fn store_read(path: &Path, message: impl fmt::Display) -> Self {
        Self::StoreRead {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }

    /// Create a store write error.
    pub fn store_write(path: &Path, message: impl fmt::Display) -> Self {
        Self::StoreWrite {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }

    /// Whether the error only affects the current item.
    ///
    /// Transient errors are swallowed at the item boundary; everything else
    /// aborts the fetch loop.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Fetch { .. })
    }
}
