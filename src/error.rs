//! Error types for background removal operations

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for background removal operations
pub type Result<T> = std::result::Result<T, BgRemovalError>;

/// Coarse classification of a failure, used by callers to pick exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input file does not exist
    NotFound,
    /// The input could not be decoded as an image
    DecodeError,
    /// The removal collaborator (model load, inference, configuration) failed
    ModelError,
    /// The result could not be encoded or written
    EncodeError,
}

/// Error types for background removal operations
#[derive(Error, Debug)]
pub enum BgRemovalError {
    /// Input path does not refer to an existing filesystem entry
    #[error("Input file not found at {}", .path.display())]
    NotFound { path: PathBuf },

    /// Input file exists but is not a decodable image
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// Model loading or initialization errors
    #[error("Model error: {0}")]
    Model(String),

    /// Backend inference errors
    #[error("Inference error: {0}")]
    Inference(String),

    /// Output encoding or persistence errors
    #[error("Failed to encode image: {0}")]
    Encode(String),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input/output errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BgRemovalError {
    pub fn not_found<P: AsRef<Path>>(path: P) -> Self {
        Self::NotFound {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn decode<S: Into<String>>(msg: S) -> Self {
        Self::Decode(msg.into())
    }

    pub fn model<S: Into<String>>(msg: S) -> Self {
        Self::Model(msg.into())
    }

    pub fn inference<S: Into<String>>(msg: S) -> Self {
        Self::Inference(msg.into())
    }

    pub fn encode<S: Into<String>>(msg: S) -> Self {
        Self::Encode(msg.into())
    }

    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<Path>>(operation: &str, path: P, error: &std::io::Error) -> Self {
        Self::Io(std::io::Error::new(
            error.kind(),
            format!(
                "Failed to {} '{}': {}",
                operation,
                path.as_ref().display(),
                error
            ),
        ))
    }

    /// Create model error with troubleshooting context
    pub fn model_error_with_context<P: AsRef<Path>>(
        operation: &str,
        model_path: P,
        error: &str,
        suggestions: &[&str],
    ) -> Self {
        let suggestion_text = if suggestions.is_empty() {
            String::new()
        } else {
            format!(" Suggestions: {}", suggestions.join(", "))
        };

        Self::Model(format!(
            "Failed to {} model '{}': {}.{}",
            operation,
            model_path.as_ref().display(),
            error,
            suggestion_text
        ))
    }

    /// Create configuration error with valid ranges
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
    ) -> Self {
        Self::InvalidConfig(format!(
            "Invalid {}: {} (valid range: {})",
            parameter, value, valid_range
        ))
    }

    /// Classify this error for exit-code mapping
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Decode(_) => ErrorKind::DecodeError,
            Self::Model(_) | Self::Inference(_) | Self::InvalidConfig(_) => ErrorKind::ModelError,
            Self::Encode(_) | Self::Io(_) => ErrorKind::EncodeError,
        }
    }
}
