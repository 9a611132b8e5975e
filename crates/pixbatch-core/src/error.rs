//! Error types for the Pixbatch pipeline.
//!
//! Per-item errors (read, decode, filter, encode, write) are contained in the
//! stage that produced them and recorded in the run report. Only startup
//! failures and aborted stages propagate out of [`Pipeline::run`].
//!
//! [`Pipeline::run`]: crate::pipeline::Pipeline::run

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Pixbatch operations.
#[derive(Error, Debug)]
pub enum PixbatchError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Source file could not be read by the loader
    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Payload bytes are not a recognizable image
    #[error("Unsupported format for {name}")]
    UnsupportedFormat { name: String },

    /// Payload was recognized but could not be decoded
    #[error("Decode error for {name}: {message}")]
    Decode { name: String, message: String },

    /// Filter application failed
    #[error("Filter failed for {name}: {message}")]
    Filter { name: String, message: String },

    /// Re-encoding the filtered image failed
    #[error("Encode error for {name}: {message}")]
    Encode { name: String, message: String },

    /// Destination file could not be written by the saver
    #[error("Failed to write {path}: {message}")]
    FileWrite { path: PathBuf, message: String },

    /// The pipeline could not be started
    #[error("Cannot start pipeline: {message}")]
    FatalStartup { message: String },

    /// A stage task panicked or was cancelled
    #[error("{stage} stage aborted: {message}")]
    StageAborted { stage: String, message: String },
}

impl PipelineError {
    /// Whether this error aborts the whole run rather than a single item.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PipelineError::FatalStartup { .. } | PipelineError::StageAborted { .. }
        )
    }
}

/// Convenience type alias for Pixbatch results.
pub type Result<T> = std::result::Result<T, PixbatchError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        let fatal = PipelineError::FatalStartup {
            message: "output directory".to_string(),
        };
        assert!(fatal.is_fatal());

        let per_item = PipelineError::Decode {
            name: "c.jpg".to_string(),
            message: "bad header".to_string(),
        };
        assert!(!per_item.is_fatal());
    }

    #[test]
    fn test_error_messages_name_the_item() {
        let err = PipelineError::UnsupportedFormat {
            name: "c.jpg".to_string(),
        };
        assert!(err.to_string().contains("c.jpg"));

        let err = PipelineError::FileRead {
            path: PathBuf::from("images/missing.png"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.to_string().contains("missing.png"));
    }
}
