//! Recursa Graph - Call graphs and recursion detection
//!
//! This crate turns resolver records into a directed call graph and
//! answers one question about it: can a method get back to itself?
//!
//! # Architecture
//!
//! - [`GraphBuilder`] deduplicates vertices by [`VertexKey`] and edges by
//!   (caller, callee), then fans out virtual calls to every override
//! - [`CallGraph::extract_subgraph`] restricts the graph to what an entry
//!   point can reach
//! - [`CallGraph::find_cycles`] reports every vertex on a cycle, self-loops
//!   included
//! - [`assert_no_recursion`] and [`assert_recursion`] turn the cycle set
//!   into a verdict with a readable diagnostic
//!
//! One graph is built per analysis and dropped after the verdict; graphs
//! share no state, so independent analyses can run in parallel.
//!
//! # Example
//!
//! ```
//! use recursa_core::{DeclarationRecord, ResolvedSymbol};
//! use recursa_graph::{assert_no_recursion, build_graph, BuildConfig};
//!
//! let records = vec![
//!     DeclarationRecord::new(ResolvedSymbol::new("Math", "fact", ["int"]))
//!         .with_call(ResolvedSymbol::new("Math", "fact", ["int"])),
//! ];
//! let (graph, _report) = build_graph(&records, &BuildConfig::default()).unwrap();
//!
//! let err = assert_no_recursion(&graph, None).unwrap_err();
//! assert_eq!(err.to_string(), "Unwanted recursion found:\nMath.fact(int)");
//! ```

mod builder;
mod cycles;
mod edge;
mod error;
mod export;
mod graph;
mod subgraph;
mod verdict;

pub use builder::{
    build_graph, BuildConfig, BuildReport, DispatchPolicy, GraphBuilder, SkippedCall,
};
pub use cycles::CycleSet;
pub use edge::{CallEdge, EdgeKind, GraphEdge};
pub use error::{GraphError, Result};
pub use export::GraphExport;
pub use graph::{CallGraph, GraphStats, VertexId};
pub use recursa_core::VertexKey;
pub use verdict::{
    analyze, assert_no_recursion, assert_recursion, check, Analysis, Diagnostic, DiagnosticKind,
    Expectation, VerdictError,
};
