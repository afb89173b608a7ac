//! Recursa Core - Resolved symbols and vertex identity
//!
//! This crate defines the data the external source resolver hands to
//! Recursa: declarations paired with the call sites found in their bodies,
//! each already disambiguated into owner, name and type descriptors.
//!
//! The central type is [`VertexKey`], the canonical identity of a callable
//! symbol. Declarations are typed by their parameter types while call sites
//! are typed by resolved argument types, so both go through the same
//! [`TypeCanonicalizer`] before they are compared.
//!
//! # Example
//!
//! ```
//! use recursa_core::{ResolvedSymbol, TypeCanonicalizer, VertexKey};
//!
//! let canon = TypeCanonicalizer::default();
//!
//! let declared = ResolvedSymbol::new("org.example.Util", "join", ["java.util.List<String>"]);
//! let called = ResolvedSymbol::new("org.example.Util", "join", ["java.util.List<java.lang.String>"]);
//!
//! assert_eq!(
//!     VertexKey::from_symbol(&declared, &canon),
//!     VertexKey::from_symbol(&called, &canon),
//! );
//! ```

mod canonical;
mod error;
mod record;
mod symbol;

pub use canonical::{CanonicalizationConfig, TypeCanonicalizer};
pub use error::{CoreError, Result};
pub use record::{
    load_records, parse_records, CallSite, DeclarationRecord, Dispatch, ResolvedCall,
    UnresolvedCall,
};
pub use symbol::{ResolvedSymbol, VertexKey};
