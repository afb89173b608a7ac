//! Recursion verdicts.
//!
//! A verdict scopes the graph to an optional start vertex, runs cycle
//! detection, and turns the result into pass or fail. A failed verdict is
//! an expected outcome and is kept apart from graph errors such as an
//! unknown start vertex.

use crate::builder::SkippedCall;
use crate::cycles::CycleSet;
use crate::error::GraphError;
use crate::graph::CallGraph;
use recursa_core::VertexKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// What a check expects to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    /// The code must not recurse.
    NoRecursion,
    /// The code must recurse.
    Recursion,
}

/// Which assertion failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Recursion was found where none was allowed.
    NoRecursionAssertionFailed,
    /// No recursion was found where some was required.
    RecursionAssertionFailed,
}

/// The result of cycle detection over a (possibly scoped) graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analysis {
    pub start: Option<VertexKey>,
    pub cycles: CycleSet,
    /// Unresolved calls inside the analyzed scope.
    pub unresolved: Vec<SkippedCall>,
    pub vertex_count: usize,
    pub edge_count: usize,
}

impl Analysis {
    /// Applies an expectation to this analysis.
    pub fn verdict(&self, expectation: Expectation) -> Result<(), Diagnostic> {
        let kind = match expectation {
            Expectation::NoRecursion if !self.cycles.is_empty() => {
                DiagnosticKind::NoRecursionAssertionFailed
            }
            Expectation::Recursion if self.cycles.is_empty() => {
                DiagnosticKind::RecursionAssertionFailed
            }
            _ => return Ok(()),
        };

        Err(Diagnostic {
            kind,
            start: self.start.clone(),
            cycles: self.cycles.clone(),
            unresolved: self.unresolved.clone(),
        })
    }
}

/// An actionable description of a failed verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub start: Option<VertexKey>,
    pub cycles: CycleSet,
    pub unresolved: Vec<SkippedCall>,
}

impl Diagnostic {
    /// Methods implicated in recursion.
    pub fn implicated(&self) -> impl Iterator<Item = &VertexKey> {
        self.cycles.iter()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DiagnosticKind::NoRecursionAssertionFailed => {
                let listing: Vec<String> = self.cycles.iter().map(ToString::to_string).collect();
                write!(f, "Unwanted recursion found:\n{}", listing.join(", "))
            }
            DiagnosticKind::RecursionAssertionFailed => {
                write!(f, "Wanted recursion not found:\nNo recursive call detected")?;
                if let Some(start) = &self.start {
                    write!(f, " starting from {}", start)?;
                }
                if !self.unresolved.is_empty() {
                    write!(
                        f,
                        "\nNote: {} unresolved call(s) were skipped and may hide recursion:",
                        self.unresolved.len()
                    )?;
                    for call in &self.unresolved {
                        write!(f, "\n  {}", call)?;
                    }
                }
                Ok(())
            }
        }
    }
}

/// A failed verdict or a graph error.
#[derive(Error, Debug)]
pub enum VerdictError {
    #[error("{0}")]
    Failed(Diagnostic),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl VerdictError {
    /// True for an assertion failure, false for an infrastructure error.
    pub fn is_assertion_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Self::Failed(diagnostic) => Some(diagnostic),
            Self::Graph(_) => None,
        }
    }
}

/// Detects cycles in the whole graph, or in what `start` can reach.
pub fn analyze(graph: &CallGraph, start: Option<&VertexKey>) -> Result<Analysis, GraphError> {
    let analysis = match start {
        Some(start) => {
            let subgraph = graph.extract_subgraph(start)?;
            Analysis {
                start: Some(start.clone()),
                cycles: subgraph.find_cycles(),
                unresolved: subgraph.unresolved_calls().to_vec(),
                vertex_count: subgraph.vertex_count(),
                edge_count: subgraph.edge_count(),
            }
        }
        None => Analysis {
            start: None,
            cycles: graph.find_cycles(),
            unresolved: graph.unresolved_calls().to_vec(),
            vertex_count: graph.vertex_count(),
            edge_count: graph.edge_count(),
        },
    };
    Ok(analysis)
}

/// Checks `graph` against an expectation.
pub fn check(
    graph: &CallGraph,
    start: Option<&VertexKey>,
    expectation: Expectation,
) -> Result<(), VerdictError> {
    analyze(graph, start)?
        .verdict(expectation)
        .map_err(VerdictError::Failed)
}

/// Fails if any recursion is reachable.
pub fn assert_no_recursion(
    graph: &CallGraph,
    start: Option<&VertexKey>,
) -> Result<(), VerdictError> {
    check(graph, start, Expectation::NoRecursion)
}

/// Fails if no recursion is reachable.
pub fn assert_recursion(graph: &CallGraph, start: Option<&VertexKey>) -> Result<(), VerdictError> {
    check(graph, start, Expectation::Recursion)
}
