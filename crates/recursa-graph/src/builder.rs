//! Graph builder for constructing the call graph from resolver records.
//!
//! The builder handles a two-pass process:
//! 1. Add every declaration and its resolved calls as vertices and edges
//! 2. Fan out every virtual call to the implementations of its target
//!
//! Implementations can be declared after the calls that reach them, so the
//! second pass waits for the whole record stream. The result is independent
//! of record order.

use crate::edge::CallEdge;
use crate::error::Result;
use crate::graph::CallGraph;
use recursa_core::{
    CallSite, CanonicalizationConfig, DeclarationRecord, Dispatch, TypeCanonicalizer, VertexKey,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use tracing::{debug, info, warn};

/// How calls through a base type or interface are modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPolicy {
    /// Only the statically resolved target is called.
    StaticTarget,

    /// A virtual call also reaches every implementation of its target.
    /// Special calls (`super.f()`) never do.
    #[default]
    FanOut,
}

/// Settings that shape graph construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Rules applied to every type descriptor.
    pub canonicalization: CanonicalizationConfig,

    /// Treatment of calls through base types.
    pub dispatch: DispatchPolicy,

    /// Methods left out of the graph, as `Owner.name(T1, T2)`.
    pub exclude: Vec<String>,
}

/// A call site that produced no edge because it could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedCall {
    pub caller: VertexKey,
    pub expression: String,
    pub reason: Option<String>,
    pub line: Option<u32>,
}

impl fmt::Display for SkippedCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` in {}", self.expression, self.caller)?;
        if let Some(line) = self.line {
            write!(f, " (line {})", line)?;
        }
        if let Some(reason) = &self.reason {
            write!(f, ": {}", reason)?;
        }
        Ok(())
    }
}

/// Counters describing what went into a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    pub records: usize,
    pub merged_declarations: usize,
    pub excluded_declarations: usize,
    pub resolved_calls: usize,
    pub unresolved_calls: usize,
    pub excluded_calls: usize,
    pub dispatch_edges: usize,
}

/// Builds a CallGraph from declaration records.
pub struct GraphBuilder {
    graph: CallGraph,
    canon: TypeCanonicalizer,
    dispatch: DispatchPolicy,
    excluded: HashSet<VertexKey>,
    /// Declarations seen so far, for duplicate detection.
    declared: HashSet<VertexKey>,
    /// (base, implementation) pairs awaiting the dispatch pass.
    overrides: Vec<(VertexKey, VertexKey)>,
    /// (caller, target) of every virtual call, for the dispatch pass.
    virtual_calls: HashSet<(VertexKey, VertexKey)>,
    report: BuildReport,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    /// Creates a builder with the default configuration.
    pub fn new() -> Self {
        Self {
            graph: CallGraph::new(),
            canon: TypeCanonicalizer::default(),
            dispatch: DispatchPolicy::default(),
            excluded: HashSet::new(),
            declared: HashSet::new(),
            overrides: Vec::new(),
            virtual_calls: HashSet::new(),
            report: BuildReport::default(),
        }
    }

    /// Creates a builder from a configuration.
    ///
    /// Fails if an excluded method is not a well-formed symbol.
    pub fn with_config(config: &BuildConfig) -> Result<Self> {
        let canon = TypeCanonicalizer::new(config.canonicalization);
        let excluded = config
            .exclude
            .iter()
            .map(|symbol| -> Result<VertexKey> {
                Ok(symbol.parse::<VertexKey>()?.canonicalized(&canon))
            })
            .collect::<Result<HashSet<_>>>()?;

        Ok(Self {
            canon,
            dispatch: config.dispatch,
            excluded,
            ..Self::new()
        })
    }

    /// The canonicalizer applied to declarations and calls.
    pub fn canonicalizer(&self) -> &TypeCanonicalizer {
        &self.canon
    }

    /// Adds one declaration and its calls.
    ///
    /// A malformed record is rejected before anything is added.
    pub fn add_record(&mut self, record: &DeclarationRecord) -> Result<()> {
        record.validate()?;
        self.report.records += 1;

        let caller = VertexKey::from_symbol(&record.declaration, &self.canon);
        if self.excluded.contains(&caller) {
            debug!("Excluding declaration {}", caller);
            self.report.excluded_declarations += 1;
            return Ok(());
        }

        if !self.declared.insert(caller.clone()) {
            debug!("Merged duplicate declaration {}", caller);
            self.report.merged_declarations += 1;
        }
        let caller_id = self.graph.add_vertex(caller.clone());

        for base in &record.overrides {
            let base = VertexKey::from_symbol(base, &self.canon);
            if !self.excluded.contains(&base) {
                self.overrides.push((base, caller.clone()));
            }
        }

        for call in &record.calls {
            match call {
                CallSite::Resolved(resolved) => {
                    let callee = VertexKey::from_parts(
                        &resolved.target.owner,
                        &resolved.target.name,
                        resolved.signature_types(),
                        &self.canon,
                    );
                    if self.excluded.contains(&callee) {
                        self.report.excluded_calls += 1;
                        continue;
                    }

                    if resolved.dispatch == Dispatch::Virtual {
                        self.virtual_calls.insert((caller.clone(), callee.clone()));
                    }
                    let callee_id = self.graph.add_vertex(callee);
                    self.graph
                        .add_edge_between(caller_id, callee_id, CallEdge::calls());
                    self.report.resolved_calls += 1;
                }
                CallSite::Unresolved(unresolved) => {
                    warn!(
                        "Skipping unresolved call `{}` in {}",
                        unresolved.expression, caller
                    );
                    self.graph.record_unresolved(SkippedCall {
                        caller: caller.clone(),
                        expression: unresolved.expression.clone(),
                        reason: unresolved.reason.clone(),
                        line: unresolved.line,
                    });
                    self.report.unresolved_calls += 1;
                }
            }
        }

        Ok(())
    }

    /// Adds a batch of records, stopping at the first malformed one.
    pub fn add_records<'a, I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a DeclarationRecord>,
    {
        for record in records {
            self.add_record(record)?;
        }
        Ok(())
    }

    /// Adds an edge from each virtual caller to every implementation of
    /// its target, overrides of overrides included.
    fn resolve_dispatch(&mut self) {
        let overrides = std::mem::take(&mut self.overrides);
        let virtual_calls = std::mem::take(&mut self.virtual_calls);
        if self.dispatch == DispatchPolicy::StaticTarget {
            return;
        }

        let mut direct: HashMap<VertexKey, Vec<VertexKey>> = HashMap::new();
        for (base, implementation) in overrides {
            if base != implementation {
                direct.entry(base).or_default().push(implementation);
            }
        }
        if direct.is_empty() {
            return;
        }

        for (caller, target) in virtual_calls {
            let implementations = implementations_of(&direct, &target);
            if implementations.is_empty() {
                continue;
            }
            let caller_id = self.graph.add_vertex(caller);
            for implementation in implementations {
                let impl_id = self.graph.add_vertex(implementation.clone());
                if self
                    .graph
                    .add_edge_between(caller_id, impl_id, CallEdge::dispatches())
                {
                    self.report.dispatch_edges += 1;
                }
            }
        }
    }

    /// Finishes building and returns the graph with its report.
    pub fn finish(mut self) -> (CallGraph, BuildReport) {
        self.resolve_dispatch();

        info!(
            "Built call graph: {} vertices, {} edges ({} unresolved calls skipped)",
            self.graph.vertex_count(),
            self.graph.edge_count(),
            self.report.unresolved_calls
        );

        (self.graph, self.report)
    }

    /// Finishes building and returns the graph.
    pub fn build(self) -> CallGraph {
        self.finish().0
    }
}

/// Every transitive implementation of `base`, in key order.
fn implementations_of<'a>(
    direct: &'a HashMap<VertexKey, Vec<VertexKey>>,
    base: &VertexKey,
) -> BTreeSet<&'a VertexKey> {
    let mut found = BTreeSet::new();
    let mut stack: Vec<&VertexKey> = vec![base];
    while let Some(key) = stack.pop() {
        for implementation in direct.get(key).into_iter().flatten() {
            if found.insert(implementation) {
                stack.push(implementation);
            }
        }
    }
    found
}

/// Builds a graph from a complete record stream.
pub fn build_graph(
    records: &[DeclarationRecord],
    config: &BuildConfig,
) -> Result<(CallGraph, BuildReport)> {
    let mut builder = GraphBuilder::with_config(config)?;
    builder.add_records(records)?;
    Ok(builder.finish())
}
