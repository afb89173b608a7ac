//! Resolver records: one declaration plus the calls found in its body.
//!
//! Records arrive as JSON, either as a single array or as a stream of
//! objects (one per line is the usual layout).

use crate::error::{CoreError, Result};
use crate::symbol::ResolvedSymbol;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// A declaration and the call sites in its body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationRecord {
    /// The declared method, typed by its parameter types.
    pub declaration: ResolvedSymbol,

    /// Base-type or interface signatures this declaration implements.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<ResolvedSymbol>,

    /// Calls in source order.
    #[serde(default)]
    pub calls: Vec<CallSite>,
}

impl DeclarationRecord {
    /// Creates a record with no calls.
    pub fn new(declaration: ResolvedSymbol) -> Self {
        Self {
            declaration,
            overrides: Vec::new(),
            calls: Vec::new(),
        }
    }

    /// Adds a resolved call to `target`.
    pub fn with_call(mut self, target: ResolvedSymbol) -> Self {
        self.calls.push(CallSite::Resolved(ResolvedCall::new(target)));
        self
    }

    /// Adds a call the resolver could not resolve.
    pub fn with_unresolved_call(
        mut self,
        expression: impl Into<String>,
        reason: Option<String>,
    ) -> Self {
        self.calls.push(CallSite::Unresolved(UnresolvedCall {
            expression: expression.into(),
            reason,
            line: None,
        }));
        self
    }

    /// Adds a call that binds to `target` itself, such as `super.f()`.
    pub fn with_special_call(mut self, target: ResolvedSymbol) -> Self {
        let mut call = ResolvedCall::new(target);
        call.dispatch = Dispatch::Special;
        self.calls.push(CallSite::Resolved(call));
        self
    }

    /// Declares that this method implements `base`.
    pub fn with_override(mut self, base: ResolvedSymbol) -> Self {
        self.overrides.push(base);
        self
    }

    /// Checks the declaration and every resolved call target.
    pub fn validate(&self) -> Result<()> {
        if let Some(problem) = self.declaration.problem() {
            return Err(malformed(&self.declaration, problem));
        }
        for base in &self.overrides {
            if let Some(problem) = base.problem() {
                return Err(malformed(
                    &self.declaration,
                    format!("override `{base}`: {problem}"),
                ));
            }
        }
        for call in &self.calls {
            if let CallSite::Resolved(resolved) = call {
                if let Some(problem) = resolved.target.problem() {
                    return Err(malformed(
                        &self.declaration,
                        format!("call to `{}`: {problem}", resolved.target),
                    ));
                }
                if let Some(params) = &resolved.declared_params {
                    if params.iter().any(|p| p.trim().is_empty()) {
                        return Err(malformed(
                            &self.declaration,
                            format!("call to `{}`: empty declared parameter type", resolved.target),
                        ));
                    }
                }
            }
        }

        Ok(())
    }
}

fn malformed(symbol: &ResolvedSymbol, reason: impl Into<String>) -> CoreError {
    CoreError::MalformedRecord {
        symbol: symbol.to_string(),
        reason: reason.into(),
    }
}

/// One call site, resolved or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CallSite {
    /// The resolver identified the call target.
    Resolved(ResolvedCall),

    /// The resolver gave up (lambda target, reflective invocation, ...).
    Unresolved(UnresolvedCall),
}

/// A call whose target was identified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedCall {
    /// Target typed by the resolved argument types.
    pub target: ResolvedSymbol,

    /// Parameter types of the declaration the resolver selected.
    ///
    /// Takes precedence over argument types; covers widening such as an
    /// `int` argument bound to a `long` parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_params: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Dispatch::is_virtual")]
    pub dispatch: Dispatch,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

/// How a resolved call binds to its target at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dispatch {
    /// May run any override of the target.
    #[default]
    Virtual,

    /// Runs exactly the target: `super` calls, constructors, private and
    /// static methods.
    Special,
}

impl Dispatch {
    pub fn is_virtual(&self) -> bool {
        *self == Self::Virtual
    }
}

impl ResolvedCall {
    /// Creates a call identified by argument types only.
    pub fn new(target: ResolvedSymbol) -> Self {
        Self {
            target,
            declared_params: None,
            dispatch: Dispatch::Virtual,
            line: None,
        }
    }

    /// The type list that identifies the callee.
    pub fn signature_types(&self) -> &[String] {
        self.declared_params
            .as_deref()
            .unwrap_or(self.target.types.as_slice())
    }
}

/// A call the resolver could not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedCall {
    /// Source text of the call expression.
    pub expression: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

/// Parses records from a JSON array or a stream of JSON objects.
pub fn parse_records(input: &str) -> serde_json::Result<Vec<DeclarationRecord>> {
    if input.trim_start().starts_with('[') {
        serde_json::from_str(input)
    } else {
        serde_json::Deserializer::from_str(input)
            .into_iter::<DeclarationRecord>()
            .collect()
    }
}

/// Loads records from a file.
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<DeclarationRecord>> {
    let path = path.as_ref();
    let input = fs::read_to_string(path).map_err(|source| CoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parse_records(&input).map_err(|source| CoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}
