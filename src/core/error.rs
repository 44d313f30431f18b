//! Error types for the fliprate library.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using fliprate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while ingesting or analyzing test history.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The source yielded zero usable test-result records.
    #[error("No test results found in {origin}")]
    NoData { origin: String },

    /// A source file could not be interpreted as test-result records.
    #[error("Unsupported format in {path}: {message}")]
    UnsupportedFormat { path: PathBuf, message: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(String),
}

impl From<minijinja::Error> for Error {
    fn from(err: minijinja::Error) -> Self {
        Self::Template(err.to_string())
    }
}

impl Error {
    /// Create a no-data error for the given source description.
    pub fn no_data(origin: impl Into<String>) -> Self {
        Self::NoData {
            origin: origin.into(),
        }
    }

    /// Create an unsupported-format error for a file.
    pub fn unsupported_format(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
