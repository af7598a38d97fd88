//! Error types for descriptor parsing and for the surrounding tool
//!
//! Per-line parsing uses a four-way taxonomy (see crate-level docs):
//! - **Decode**: malformed base64, UTF-8 or JSON.
//! - **StructuralMismatch**: the link does not match the scheme grammar (missing `@`, bad port, missing name).
//! - **IncompleteRecord**: a required field is missing after an otherwise successful decode.
//! - **UnknownScheme**: the line does not start with a recognized scheme prefix.
//!
//! None of these abort a batch. [`SieveError`] covers file I/O, config loading and rendering.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for descriptor parsing operations
pub type Result<T> = std::result::Result<T, DescriptorError>;

/// Errors that can occur while turning one descriptor line into a node record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    /// Malformed base64, UTF-8 or JSON payload
    #[error("decode error: {0}")]
    Decode(String),
    /// Link does not match the expected scheme grammar
    #[error("structural mismatch: {0}")]
    StructuralMismatch(String),
    /// Required field missing after decoding
    #[error("incomplete node: {0}")]
    IncompleteRecord(String),
    /// Unrecognized scheme prefix
    #[error("unknown scheme: {0}")]
    UnknownScheme(String),
}

/// Serializable tag of a [`DescriptorError`], used in batch reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// See [`DescriptorError::Decode`]
    Decode,
    /// See [`DescriptorError::StructuralMismatch`]
    StructuralMismatch,
    /// See [`DescriptorError::IncompleteRecord`]
    IncompleteRecord,
    /// See [`DescriptorError::UnknownScheme`]
    UnknownScheme,
}

impl DescriptorError {
    /// Returns the category of this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            DescriptorError::Decode(_) => FailureKind::Decode,
            DescriptorError::StructuralMismatch(_) => FailureKind::StructuralMismatch,
            DescriptorError::IncompleteRecord(_) => FailureKind::IncompleteRecord,
            DescriptorError::UnknownScheme(_) => FailureKind::UnknownScheme,
        }
    }
}

impl From<base64::DecodeError> for DescriptorError {
    fn from(err: base64::DecodeError) -> Self {
        DescriptorError::Decode(format!("invalid base64: {}", err))
    }
}

impl From<serde_json::Error> for DescriptorError {
    fn from(err: serde_json::Error) -> Self {
        DescriptorError::Decode(format!("invalid JSON: {}", err))
    }
}

impl From<std::string::FromUtf8Error> for DescriptorError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        DescriptorError::Decode(format!("invalid UTF-8: {}", err))
    }
}

/// Errors raised outside the per-line core: reading input, loading config, writing outputs
#[derive(Debug, Error)]
pub enum SieveError {
    /// Reading or writing a file failed
    #[error("io error on {path}: {source}")]
    Io {
        /// File the operation was applied to
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
    /// Config file is not valid YAML for [`SieveConfig`](crate::SieveConfig)
    #[error("config error: {0}")]
    Config(#[from] serde_yaml::Error),
    /// A renderer failed to serialize its document
    #[error("render error: {0}")]
    Render(String),
}

impl From<serde_json::Error> for SieveError {
    fn from(err: serde_json::Error) -> Self {
        SieveError::Render(err.to_string())
    }
}
