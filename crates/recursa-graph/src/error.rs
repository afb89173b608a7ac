//! Error types for graph construction and analysis.

use recursa_core::{CoreError, VertexKey};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    /// The requested start symbol does not exist in the analyzed source.
    #[error("Unknown vertex: {0} is not declared or called in the analyzed source")]
    UnknownVertex(VertexKey),

    /// Malformed input record or symbol.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Failed to serialize graph: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GraphError>;
