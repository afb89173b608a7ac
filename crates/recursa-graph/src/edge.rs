//! Edge types for the call graph.
//!
//! A call graph only needs to know that a caller reaches a callee, so an
//! edge carries its kind and nothing else. Repeated calls to the same
//! callee collapse into one edge.

use serde::{Deserialize, Serialize};

/// Why a caller reaches a callee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Method A calls method B.
    Calls,

    /// A virtual call may run an override of its target.
    Dispatches,
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Calls => "calls",
            Self::Dispatches => "dispatches",
        };
        write!(f, "{}", s)
    }
}

/// An edge in the call graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallEdge {
    pub kind: EdgeKind,
}

impl CallEdge {
    pub fn new(kind: EdgeKind) -> Self {
        Self { kind }
    }

    pub fn calls() -> Self {
        Self::new(EdgeKind::Calls)
    }

    pub fn dispatches() -> Self {
        Self::new(EdgeKind::Dispatches)
    }
}

impl std::fmt::Display for CallEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)
    }
}

/// A simplified edge for graph export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
}
