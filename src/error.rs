//! Error types for the geo collection.
//!
//! The index operations themselves are total; errors only surface from
//! input validation, configuration loading and diagnostic serialization.

use thiserror::Error;

/// Errors produced by the checked surfaces of the crate.
#[derive(Error, Debug)]
pub enum GeoCollectionError {
    /// Coordinates rejected by the validating write path.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Covering parameters that the region coverer cannot honor.
    #[error("Invalid covering parameters: {0}")]
    InvalidCoveringParameters(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error while reading a configuration file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for geo collection operations.
pub type Result<T> = std::result::Result<T, GeoCollectionError>;
