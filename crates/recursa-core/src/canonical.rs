//! Canonical type descriptors.
//!
//! A declaration is typed by the parameter types written in source
//! (`List<String>`, `int...`) while a call site is typed by whatever the
//! resolver computed for its arguments (`java.util.List<java.lang.String>`,
//! `[I`). Both spellings pass through the same [`TypeCanonicalizer`] so a
//! method and its own recursive call land on the same vertex.

use serde::{Deserialize, Serialize};

/// Boxed wrapper types and the primitive they unbox to.
const BOXED_PRIMITIVES: &[(&str, &str)] = &[
    ("Boolean", "boolean"),
    ("Byte", "byte"),
    ("Character", "char"),
    ("Short", "short"),
    ("Integer", "int"),
    ("Long", "long"),
    ("Float", "float"),
    ("Double", "double"),
];

/// Switches for the canonicalization rules that are not always applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalizationConfig {
    /// Drop generic argument lists (`List<String>` -> `List`).
    pub erase_generics: bool,

    /// Reduce qualified names to simple names (`java.util.Date` -> `Date`).
    ///
    /// Merges genuine overloads such as `f(java.util.Date)` and
    /// `f(java.sql.Date)`. Types of the implicitly imported `java.lang`
    /// package are always reduced.
    pub strip_qualifiers: bool,

    /// Map boxed wrappers to primitives (`Integer` -> `int`).
    ///
    /// Merges genuine overloads such as `f(int)` and `f(Integer)`.
    pub unbox_primitives: bool,
}

impl Default for CanonicalizationConfig {
    fn default() -> Self {
        Self {
            erase_generics: true,
            strip_qualifiers: false,
            unbox_primitives: false,
        }
    }
}

/// The single canonical type-descriptor function.
#[derive(Debug, Clone, Default)]
pub struct TypeCanonicalizer {
    config: CanonicalizationConfig,
}

impl TypeCanonicalizer {
    /// Creates a canonicalizer with the given rules.
    pub fn new(config: CanonicalizationConfig) -> Self {
        Self { config }
    }

    /// Returns the active rules.
    pub fn config(&self) -> &CanonicalizationConfig {
        &self.config
    }

    /// Canonicalizes one parameter or argument type descriptor.
    pub fn canonicalize(&self, descriptor: &str) -> String {
        let trimmed = descriptor.trim();
        let mut ty = decode_binary_array(trimmed).unwrap_or_else(|| trimmed.to_string());

        ty = tighten_whitespace(&ty);
        if let Some(element) = ty.strip_suffix("...") {
            ty = format!("{element}[]");
        }
        ty = ty.replace('$', ".");

        if self.config.erase_generics {
            ty = erase_generics(&ty);
        }
        ty = if self.config.strip_qualifiers {
            rewrite_names(&ty, simple_name)
        } else {
            rewrite_names(&ty, without_implicit_package)
        };
        if self.config.unbox_primitives {
            if let Some(primitive) = unboxed(&ty) {
                ty = primitive.to_string();
            }
        }

        ty
    }

    /// Canonicalizes an ordered list of descriptors.
    pub fn canonicalize_all<S: AsRef<str>>(&self, descriptors: &[S]) -> Vec<String> {
        descriptors
            .iter()
            .map(|d| self.canonicalize(d.as_ref()))
            .collect()
    }

    /// Canonicalizes an owning type name.
    ///
    /// Owners stay qualified; only nested-type separators and type
    /// arguments are normalized.
    pub fn canonicalize_owner(&self, owner: &str) -> String {
        erase_generics(&tighten_whitespace(owner.trim()).replace('$', "."))
    }
}

/// Decodes a JVM binary array name (`[I`, `[[Ljava.lang.String;`).
fn decode_binary_array(descriptor: &str) -> Option<String> {
    let dims = descriptor.bytes().take_while(|&b| b == b'[').count();
    if dims == 0 {
        return None;
    }

    let element = &descriptor[dims..];
    let base = match element {
        "Z" => "boolean".to_string(),
        "B" => "byte".to_string(),
        "C" => "char".to_string(),
        "S" => "short".to_string(),
        "I" => "int".to_string(),
        "J" => "long".to_string(),
        "F" => "float".to_string(),
        "D" => "double".to_string(),
        _ => element.strip_prefix('L')?.strip_suffix(';')?.replace('/', "."),
    };
    if base.is_empty() {
        return None;
    }

    Some(format!("{base}{}", "[]".repeat(dims)))
}

fn is_type_punctuation(c: char) -> bool {
    matches!(c, '<' | '>' | '[' | ']' | ',' | '.' | '&')
}

/// Collapses whitespace runs and drops spaces next to type punctuation.
///
/// Spaces between words survive (`? extends Number`).
fn tighten_whitespace(input: &str) -> String {
    let collapsed: Vec<char> = input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .collect();

    let mut out = String::with_capacity(collapsed.len());
    for (i, &c) in collapsed.iter().enumerate() {
        if c == ' ' {
            let prev = i.checked_sub(1).map(|p| collapsed[p]);
            let next = collapsed.get(i + 1).copied();
            if prev.map_or(true, is_type_punctuation) || next.map_or(true, is_type_punctuation) {
                continue;
            }
        }
        out.push(c);
    }
    out
}

fn erase_generics(ty: &str) -> String {
    let mut depth = 0usize;
    let mut out = String::with_capacity(ty.len());
    for c in ty.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

/// Applies `rewrite` to every dotted name in a type descriptor.
fn rewrite_names(ty: &str, rewrite: fn(&str) -> &str) -> String {
    let mut out = String::with_capacity(ty.len());
    let mut name = String::new();

    for c in ty.chars() {
        if c.is_alphanumeric() || c == '_' || c == '.' {
            name.push(c);
        } else {
            out.push_str(rewrite(&name));
            name.clear();
            out.push(c);
        }
    }
    out.push_str(rewrite(&name));

    out
}

/// `java.util.Date` -> `Date`.
fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// `java.lang.String` -> `String`; `java.lang.reflect.Method` is kept.
fn without_implicit_package(name: &str) -> &str {
    match name.strip_prefix("java.lang.") {
        Some(simple) if !simple.is_empty() && !simple.contains('.') => simple,
        _ => name,
    }
}

fn unboxed(ty: &str) -> Option<&'static str> {
    let simple = ty.strip_prefix("java.lang.").unwrap_or(ty);
    BOXED_PRIMITIVES
        .iter()
        .find(|(boxed, _)| *boxed == simple)
        .map(|(_, primitive)| *primitive)
}
