//! Core error types

use thiserror::Error;

/// Core error type for bridgewatch
#[derive(Debug, Error)]
pub enum CoreError {
    /// Unknown asset or region id
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record that was looked up ("asset", "region")
        entity: &'static str,
        /// The id that did not resolve
        id: String,
    },

    /// Axis values missing, non-numeric or non-finite
    #[error("Invalid reading: {0}")]
    InvalidReading(String),

    /// A calibrated baseline of zero makes the deviation ratio undefined
    #[error("Baseline is zero, deviation ratio is undefined")]
    DivisionByZeroBaseline,

    /// Registry input rejected
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Configuration could not be loaded or is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Shorthand for an unknown asset id.
    pub fn asset_not_found(id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: "asset",
            id: id.into(),
        }
    }

    /// Shorthand for an unknown region id.
    pub fn region_not_found(id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: "region",
            id: id.into(),
        }
    }

    /// True for errors caused by the caller's input rather than the system.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CoreError::NotFound { .. } | CoreError::InvalidReading(_) | CoreError::Validation(_)
        )
    }
}

/// Result alias used throughout the workspace
pub type Result<T> = std::result::Result<T, CoreError>;
