//! Resolved symbols and their canonical vertex identity.

use crate::canonical::TypeCanonicalizer;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A declaration or call target as disambiguated by the resolver.
///
/// For a declaration `types` are the declared parameter types; for a call
/// site they are the resolved argument types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedSymbol {
    /// Fully qualified name of the owning type.
    pub owner: String,

    /// Member name.
    pub name: String,

    /// Ordered parameter or argument type descriptors.
    #[serde(default)]
    pub types: Vec<String>,
}

impl ResolvedSymbol {
    /// Creates a new resolved symbol.
    pub fn new<I, S>(owner: impl Into<String>, name: impl Into<String>, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            owner: owner.into(),
            name: name.into(),
            types: types.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the first structural problem with this symbol, if any.
    pub(crate) fn problem(&self) -> Option<&'static str> {
        if self.owner.trim().is_empty() {
            Some("owner is empty")
        } else if self.name.trim().is_empty() {
            Some("member name is empty")
        } else if self.types.iter().any(|t| t.trim().is_empty()) {
            Some("empty type descriptor")
        } else {
            None
        }
    }
}

impl fmt::Display for ResolvedSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}({})", self.owner, self.name, self.types.join(", "))
    }
}

/// Canonical identity of one invocable symbol.
///
/// Two keys are equal iff owner, name and the ordered canonical type list
/// are equal. Keys are built once and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexKey {
    owner: String,
    name: String,
    params: Vec<String>,
}

impl VertexKey {
    /// Creates a key from parts that are already canonical.
    pub fn new<I, S>(owner: impl Into<String>, name: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            owner: owner.into(),
            name: name.into(),
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    /// Derives the key of a resolved symbol.
    pub fn from_symbol(symbol: &ResolvedSymbol, canon: &TypeCanonicalizer) -> Self {
        Self::from_parts(&symbol.owner, &symbol.name, &symbol.types, canon)
    }

    /// Derives a key from raw owner, name and type descriptors.
    pub fn from_parts<S: AsRef<str>>(
        owner: &str,
        name: &str,
        types: &[S],
        canon: &TypeCanonicalizer,
    ) -> Self {
        Self {
            owner: canon.canonicalize_owner(owner),
            name: name.trim().to_string(),
            params: canon.canonicalize_all(types),
        }
    }

    /// Re-applies canonicalization, e.g. to a key parsed from user input.
    pub fn canonicalized(&self, canon: &TypeCanonicalizer) -> Self {
        Self::from_parts(&self.owner, &self.name, &self.params, canon)
    }

    /// Owning type.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Member name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical parameter types.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Returns `Owner.name` without the parameter list.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.owner, self.name)
    }
}

impl fmt::Display for VertexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}({})", self.owner, self.name, self.params.join(", "))
    }
}

impl FromStr for VertexKey {
    type Err = CoreError;

    /// Parses `Owner.name(T1, T2)`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let s = input.trim();

        let open = s
            .find('(')
            .ok_or_else(|| CoreError::malformed_symbol(input, "missing parameter list"))?;
        let inner = s[open + 1..]
            .strip_suffix(')')
            .ok_or_else(|| CoreError::malformed_symbol(input, "parameter list is not closed"))?;

        let head = &s[..open];
        let dot = head
            .rfind('.')
            .ok_or_else(|| CoreError::malformed_symbol(input, "missing owning type"))?;
        let owner = head[..dot].trim();
        let name = head[dot + 1..].trim();
        if owner.is_empty() {
            return Err(CoreError::malformed_symbol(input, "owner is empty"));
        }
        if name.is_empty() {
            return Err(CoreError::malformed_symbol(input, "member name is empty"));
        }

        let params =
            split_parameters(inner).map_err(|reason| CoreError::malformed_symbol(input, reason))?;

        Ok(Self::new(owner, name, params))
    }
}

/// Splits a parameter list at commas outside angle brackets.
fn split_parameters(inner: &str) -> Result<Vec<String>, &'static str> {
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut params = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();

    for c in inner.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth -= 1,
            '(' | ')' => return Err("unexpected parenthesis in parameter list"),
            _ => {}
        }
        if depth < 0 {
            return Err("unbalanced generic brackets");
        }
        if c == ',' && depth == 0 {
            params.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    if depth != 0 {
        return Err("unbalanced generic brackets");
    }
    params.push(current);

    let params: Vec<String> = params.into_iter().map(|p| p.trim().to_string()).collect();
    if params.iter().any(String::is_empty) {
        return Err("empty parameter type");
    }

    Ok(params)
}
