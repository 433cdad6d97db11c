//! Error handling for the risk forecasting engine
//!
//! Per-input conditions (a missing country, an empty history) are skippable:
//! batch runs log them and continue. Everything else aborts the run.

use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Missing inputs
    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Insufficient history for {country}")]
    InsufficientHistory { country: String },

    // Request errors
    #[error("Invalid year range {start}..={end}: {message}")]
    InvalidYearRange {
        start: i32,
        end: i32,
        message: String,
    },

    #[error("Validation error on {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Model errors
    #[error("Model returned a non-finite value for {country} {period}")]
    InvalidModelOutput { country: String, period: String },

    #[error("Invalid model artifact: {0}")]
    ModelArtifact(String),

    #[error(transparent)]
    Core(#[from] shared::CoreError),

    // I/O and serialization errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] validator::ValidationErrors),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Whether a batch run may skip the affected input and continue
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            AppError::MissingInput(_) | AppError::InsufficientHistory { .. }
        )
    }

    pub fn validation(field: &str, message: &str) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Result type alias for engine operations
pub type AppResult<T> = Result<T, AppError>;
