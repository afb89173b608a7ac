//! Error types for Recursa core.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or validating resolver output.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A textual symbol could not be parsed into a vertex key.
    #[error("Malformed symbol `{input}`: {reason}")]
    MalformedSymbol { input: String, reason: String },

    /// A declaration record is structurally invalid.
    #[error("Malformed record for `{symbol}`: {reason}")]
    MalformedRecord { symbol: String, reason: String },

    /// The record file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The record file is not valid record JSON.
    #[error("Invalid record JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl CoreError {
    pub(crate) fn malformed_symbol(input: &str, reason: impl Into<String>) -> Self {
        Self::MalformedSymbol {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
