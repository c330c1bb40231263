//! Error types for the bikecast pipeline

use thiserror::Error;

/// Result type alias for bikecast operations
pub type Result<T> = std::result::Result<T, BikecastError>;

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum BikecastError {
    #[error("Dataset unavailable: {0}")]
    DataUnavailable(String),

    #[error("Split '{0}' has not been prepared; run `bikecast prepare-data` first")]
    SplitNotFound(String),

    #[error("Checkpoint not found: {0}")]
    CheckpointNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Model not fitted")]
    NotFitted,

    #[error("Unknown model kind: {0}")]
    UnknownModelKind(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Tracking error: {0}")]
    TrackingError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<polars::error::PolarsError> for BikecastError {
    fn from(err: polars::error::PolarsError) -> Self {
        BikecastError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for BikecastError {
    fn from(err: serde_json::Error) -> Self {
        BikecastError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BikecastError::SplitNotFound("train".to_string());
        assert!(err.to_string().contains("train"));

        let err = BikecastError::UnknownModelKind("xx".to_string());
        assert_eq!(err.to_string(), "Unknown model kind: xx");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: BikecastError = io_err.into();
        assert!(matches!(err, BikecastError::IoError(_)));
    }
}
