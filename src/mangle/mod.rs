// This module is the entry point of the encoding engine. Every top-level request (mangle a
// symbol, a function exactly, a type, a template instance, a value, or a function signature)
// creates one Mangler that owns the output buffer, the back-reference tables and the
// function-type re-entrancy guard for exactly that request, walks the entity graph, and is
// discarded when the finished name is returned. The Mangler's behavior is split by concern
// into submodules: types (qualifier prefixes and the type variant dispatch), function
// (function signatures and parameter storage classes), symbol (symbol dispatch, the parent
// chain and foreign linkage), template (template instances and argument classification) and
// literal (value encodings). Exact function manglings are memoized in the session's
// ExactCache when one is configured. Finished names are optionally checked against the
// permitted alphabet before they are handed back.

//! The mangling engine.
//!
//! # Usage
//!
//! ```
//! use dmangle::entity::{FuncDecl, FunctionType, Symbol, SymbolKind, SymbolTable, Type};
//! use dmangle::core::MangleSession;
//!
//! let mut table = SymbolTable::new();
//! let m = table.add(Symbol::module("app"));
//! let ty = Type::function(FunctionType::new(vec![], Type::void()));
//! let foo = table.add(
//!     Symbol::new(Some("foo"), SymbolKind::Function(FuncDecl { ty: Some(ty), ..Default::default() }))
//!         .in_scope(m),
//! );
//!
//! let session = MangleSession::new(&table);
//! assert_eq!(dmangle::mangle::mangle_exact(&session, foo), "_D3app3fooFZv");
//! ```

pub mod backref;
pub mod buffer;
mod function;
mod literal;
mod symbol;
mod template;
mod types;

pub use backref::{decode_backref, encode_base26, resolve_backref, Backref};
pub use buffer::{first_invalid_char, is_mangle_char, is_valid_mangling, MangleBuffer};
pub use literal::{format_hex_float, real_to_mangle};

use crate::core::MangleSession;
use crate::entity::{Expr, FunctionType, SymbolId, SymbolKind, SymbolTable, Type};

/// Per-request encoder state.
pub(crate) struct Mangler<'s> {
    session: &'s MangleSession<'s>,
    symbols: &'s SymbolTable,
    buf: MangleBuffer,
    backref: Backref<'s>,
    /// Function types whose encoding is in progress.
    ///
    /// Types own their children, so a cycle can only come from an upstream
    /// resolver handing back a signature that is still being encoded.
    in_use: Vec<*const FunctionType>,
    /// Set once text not produced by this encoder (an override or a foreign
    /// name) was written; such text is not held to the mangling alphabet.
    verbatim: bool,
}

impl<'s> Mangler<'s> {
    pub(crate) fn new(session: &'s MangleSession<'s>, root: Option<&'s Type>) -> Self {
        Self {
            session,
            symbols: session.symbols(),
            buf: MangleBuffer::new(),
            backref: Backref::new(root),
            in_use: Vec::new(),
            verbatim: false,
        }
    }

    /// Write text taken as is from outside the encoder.
    fn push_verbatim(&mut self, text: &str) {
        self.verbatim = true;
        self.buf.push_str(text);
    }

    /// Hand back the finished name.
    fn finish(self, what: &str) -> String {
        let out = self.buf.into_string();
        if self.session.options().verify_alphabet && !self.verbatim {
            if let Some((pos, c)) = first_invalid_char(&out) {
                panic!("invalid character {:?} at offset {} in mangled {} `{}`", c, pos, what, out);
            }
        }
        self.session.record_request(out.len());
        log::debug!("mangled {} -> {}", what, out);
        out
    }
}

/// Mangle any symbol.
///
/// Unique functions get their exact mangling; overloaded ones share the name
/// of their overload set.
pub fn mangle_symbol(session: &MangleSession<'_>, sym: SymbolId) -> String {
    let mut m = Mangler::new(session, None);
    m.mangle_symbol(sym);
    m.finish("symbol")
}

/// Exact, overload-disambiguating mangling of one function.
///
/// Cached in the session's [`ExactCache`](crate::core::ExactCache) when one is
/// configured.
pub fn mangle_exact(session: &MangleSession<'_>, func: SymbolId) -> String {
    let func = session.symbols().to_alias_func(func);
    let compute = || {
        let mut m = Mangler::new(session, None);
        m.mangle_exact(func);
        m.finish("function")
    };

    match session.cache() {
        Some(cache) => {
            if let Some(hit) = cache.get(func) {
                log::trace!("exact mangling cache hit for {}", session.symbols().pretty_name(func));
                session.record_cache_hit();
                return hit.to_string();
            }
            match cache.get_or_insert_with(func, compute) {
                Some(stored) => stored.to_string(),
                None => compute(),
            }
        }
        None => compute(),
    }
}

/// Mangle a type on its own.
pub fn mangle_type(session: &MangleSession<'_>, ty: &Type) -> String {
    let mut m = Mangler::new(session, Some(ty));
    m.mangle_type(ty);
    m.finish("type")
}

/// Mangle a template instance without its parent chain.
pub fn mangle_template_instance(session: &MangleSession<'_>, instance: SymbolId) -> String {
    let mut m = Mangler::new(session, None);
    m.mangle_template_instance(instance);
    m.finish("template instance")
}

/// Value encoding of a constant expression.
pub fn mangle_expr(session: &MangleSession<'_>, expr: &Expr) -> String {
    let mut m = Mangler::new(session, None);
    m.mangle_value(expr);
    m.finish("expression")
}

/// Qualifiers, attributes, parameters and return type of a function.
///
/// Functions without a resolved function type produce an empty string.
pub fn mangle_func_signature(session: &MangleSession<'_>, func: SymbolId) -> String {
    let symbols = session.symbols();
    let ty = match &symbols.get(func).kind {
        SymbolKind::Function(fd) => fd.ty.as_ref(),
        _ => None,
    };
    let mut m = Mangler::new(session, None);
    match ty {
        Some(ty) => match ty.as_function() {
            Some(tf) => m.mangle_func_signature(ty, tf),
            None => log::warn!("{} has no function type", symbols.pretty_name(func)),
        },
        None => log::warn!("{} has no function type", symbols.pretty_name(func)),
    }
    m.finish("signature")
}
