// This module defines the collaborator traits through which the mangler talks to the parts of
// the compiler it does not own. ConstFolder is the bridge to the constant-expression engine:
// a cheap lvalue-preserving optimize() used to normalize template value arguments, and an
// evaluate() that either yields a literal or reports failure. ForeignMangler produces C++
// ABI names for C++-linkage declarations. Diagnostics receives recoverable errors in a
// fire-and-continue fashion so one malformed argument never aborts a mangling. The module
// also provides small ready-made implementations: IdentityFolder (literals evaluate to
// themselves), LogDiagnostics (forwards reports to the log crate) and CollectingDiagnostics
// (keeps reports for later inspection, mostly useful in tests and tools).

//! Collaborator interfaces.
//!
//! The mangler is only the encoding engine. Type checking, constant
//! evaluation, C++ name mangling and error reporting belong to the rest of
//! the compiler and are reached through the narrow traits below:
//! - [`ConstFolder`] folds and evaluates template value arguments.
//! - [`ForeignMangler`] mangles C++-linkage declarations.
//! - [`Diagnostics`] receives recoverable errors; it must never abort.

use std::cell::RefCell;

use super::error::MangleError;
use crate::entity::{Expr, ExprKind, Loc, SymbolId, SymbolTable};

/// Bridge to the constant-expression engine.
pub trait ConstFolder {
    /// Cheap, non-interpreting folding that keeps lvalues as lvalues.
    ///
    /// A reference to a variable must come back as [`ExprKind::Var`] so the
    /// mangler can treat it as a symbol argument.
    fn optimize(&self, expr: &Expr) -> Expr;

    /// Evaluate to a compile-time constant.
    ///
    /// `None` means evaluation failed; the evaluator has already reported why.
    fn evaluate(&self, expr: &Expr) -> Option<Expr>;
}

/// Mangler for the C++ ABI.
pub trait ForeignMangler {
    fn mangle_cpp(&self, symbols: &SymbolTable, sym: SymbolId) -> String;
}

/// Sink for recoverable errors.
pub trait Diagnostics {
    fn report(&self, loc: Loc, error: &MangleError);
}

/// Folder that treats literals as already evaluated.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityFolder;

impl ConstFolder for IdentityFolder {
    fn optimize(&self, expr: &Expr) -> Expr {
        expr.clone()
    }

    fn evaluate(&self, expr: &Expr) -> Option<Expr> {
        match expr.kind {
            ExprKind::Other(_) | ExprKind::Error => None,
            _ => Some(expr.clone()),
        }
    }
}

/// Forwards every report to `log::error!`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn report(&self, loc: Loc, error: &MangleError) {
        log::error!("{}: Error: {}", loc, error);
    }
}

/// Keeps every report.
#[derive(Debug, Default)]
pub struct CollectingDiagnostics {
    reports: RefCell<Vec<(Loc, MangleError)>>,
}

impl CollectingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.reports.borrow().len()
    }

    pub fn errors(&self) -> Vec<MangleError> {
        self.reports.borrow().iter().map(|(_, e)| e.clone()).collect()
    }

    pub fn take(&self) -> Vec<(Loc, MangleError)> {
        std::mem::take(&mut *self.reports.borrow_mut())
    }
}

impl Diagnostics for CollectingDiagnostics {
    fn report(&self, loc: Loc, error: &MangleError) {
        log::debug!("{}: {}", loc, error);
        self.reports.borrow_mut().push((loc, error.clone()));
    }
}
