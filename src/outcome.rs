//! Per-line parse outcomes and the failure entries reported for them.

use crate::constants::PREVIEW_ELLIPSIS;
use crate::error::{DescriptorError, FailureKind};
use crate::node::NodeRecord;
use serde::{Deserialize, Serialize};

/// Result of parsing one descriptor line
///
/// Every line handed to [`parse_descriptor`](crate::parse_descriptor) produces exactly one outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Line decoded into a canonical record
    Parsed(NodeRecord),
    /// Line could not be decoded
    Failed {
        /// The original (trimmed) line
        line: String,
        /// Why it failed
        error: DescriptorError,
    },
}

impl ParseOutcome {
    /// Returns the record if parsing succeeded.
    pub fn record(&self) -> Option<&NodeRecord> {
        match self {
            ParseOutcome::Parsed(record) => Some(record),
            ParseOutcome::Failed { .. } => None,
        }
    }

    /// Returns the error if parsing failed.
    pub fn error(&self) -> Option<&DescriptorError> {
        match self {
            ParseOutcome::Parsed(_) => None,
            ParseOutcome::Failed { error, .. } => Some(error),
        }
    }
}

/// A failed line as it appears in a batch report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    /// Original line, truncated for display
    pub line_preview: String,
    /// Short reason string
    pub reason: String,
    /// Error category
    pub kind: FailureKind,
}

impl Failure {
    /// Builds a report entry, truncating the line to `preview_len` characters.
    pub fn new(line: &str, error: &DescriptorError, preview_len: usize) -> Self {
        Failure {
            line_preview: preview(line, preview_len),
            reason: error.to_string(),
            kind: error.kind(),
        }
    }
}

/// Truncates `line` to `max_chars` characters, appending `...` when anything was cut.
pub fn preview(line: &str, max_chars: usize) -> String {
    match line.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &line[..cut], PREVIEW_ELLIPSIS),
        None => line.to_string(),
    }
}
