//! dmangle - symbol-name encoding for a template-capable systems language.
//!
//! Given a symbol (function, variable, aggregate, template instance) or a
//! type, dmangle produces a unique, linker-safe ASCII name that encodes the
//! enclosing scope chain, signature, calling convention, qualifiers and
//! template arguments. Repeated types and identifiers are compressed with
//! position-relative back-references.
//!
//! # Primary Usage
//!
//! ```
//! use dmangle::entity::{Symbol, SymbolKind, SymbolTable, Type, VarDecl};
//! use dmangle::core::MangleSession;
//!
//! let mut table = SymbolTable::new();
//! let m = table.add(Symbol::module("app"));
//! let count = table.add(
//!     Symbol::new(Some("count"), SymbolKind::Variable(VarDecl { ty: Some(Type::int()), ..Default::default() }))
//!         .in_scope(m),
//! );
//!
//! let session = MangleSession::new(&table);
//! assert_eq!(dmangle::mangle_symbol(&session, count), "_D3app5counti");
//! ```
//!
//! # Architecture
//!
//! - [`entity`] - Read-only input model (types, symbols, expressions)
//! - [`mangle`] - The encoding engine
//! - [`core`] - Shared infrastructure (errors, collaborators, session)

pub mod core;
pub mod entity;
pub mod mangle;

// Re-export common types from organized modules
pub use crate::core::{
    // Session management
    ExactCache, MangleOptions, MangleSession, SessionStats,
    // Collaborators
    CollectingDiagnostics, ConstFolder, Diagnostics, ForeignMangler, IdentityFolder, LogDiagnostics,
    // Errors
    MangleError, MangleResult,
};
pub use mangle::{
    mangle_exact, mangle_expr, mangle_func_signature, mangle_symbol, mangle_template_instance,
    mangle_type,
};
