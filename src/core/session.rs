// This module provides the mangling session: the bundle of collaborators and settings a run
// of the mangler works against. MangleSession borrows the symbol table and the collaborator
// implementations (constant folder, C++ mangler, diagnostics sink), carries MangleOptions
// (output length limit, alphabet verification), and records SessionStats such as the number
// of requests served, back-references emitted and errors reported. ExactCache is the
// write-once store for exact function manglings: one OnceLock slot per symbol, keyed by the
// symbol's stable index and kept outside the symbol itself, so it can be shared by several
// sessions and filled redundantly without any further synchronization. Per-call state (the
// back-reference tables and the output buffer) deliberately does not live here; it belongs
// to a single top-level request.

//! Mangling session management.
//!
//! A session ties one symbol table to its collaborators. It holds no per-call
//! state, so any number of requests may be served from the same session.

use std::cell::RefCell;
use std::fmt;
use std::sync::OnceLock;

use super::adaptor::{ConstFolder, Diagnostics, ForeignMangler, IdentityFolder, LogDiagnostics};
use super::error::MangleError;
use crate::entity::{Loc, SymbolId, SymbolTable};

/// Hard limit on the total length of a mangled name.
pub const MAX_MANGLED_LEN: usize = 8 * 1024 * 1024;

/// Tunables for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MangleOptions {
    /// Identifiers that would push the output past this length are not emitted.
    pub max_output_len: usize,
    /// Check every finished name against the permitted alphabet.
    pub verify_alphabet: bool,
}

impl Default for MangleOptions {
    fn default() -> Self {
        Self {
            max_output_len: MAX_MANGLED_LEN,
            verify_alphabet: cfg!(debug_assertions),
        }
    }
}

/// Write-once cache of exact function manglings.
#[derive(Debug, Default)]
pub struct ExactCache {
    slots: Vec<OnceLock<Box<str>>>,
}

impl ExactCache {
    /// Create a cache with one slot per symbol currently in `table`.
    pub fn for_table(table: &SymbolTable) -> Self {
        Self {
            slots: (0..table.len()).map(|_| OnceLock::new()).collect(),
        }
    }

    pub fn get(&self, id: SymbolId) -> Option<&str> {
        self.slots.get(id.index()).and_then(|slot| slot.get()).map(|s| &**s)
    }

    /// Return the cached value, computing it on first use.
    ///
    /// Symbols added to the table after the cache was created have no slot;
    /// their value is computed every time.
    pub fn get_or_insert_with<F>(&self, id: SymbolId, f: F) -> Option<&str>
    where
        F: FnOnce() -> String,
    {
        let slot = self.slots.get(id.index())?;
        Some(&**slot.get_or_init(|| f().into_boxed_str()))
    }

    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|slot| slot.get().is_some()).count()
    }
}

/// Collaborators and settings for mangling one symbol table.
pub struct MangleSession<'a> {
    symbols: &'a SymbolTable,
    folder: &'a dyn ConstFolder,
    foreign: Option<&'a dyn ForeignMangler>,
    diagnostics: &'a dyn Diagnostics,
    cache: Option<&'a ExactCache>,
    options: MangleOptions,
    stats: RefCell<SessionStats>,
}

impl<'a> MangleSession<'a> {
    /// Create a session with the identity folder and log-based diagnostics.
    pub fn new(symbols: &'a SymbolTable) -> Self {
        Self {
            symbols,
            folder: &IdentityFolder,
            foreign: None,
            diagnostics: &LogDiagnostics,
            cache: None,
            options: MangleOptions::default(),
            stats: RefCell::new(SessionStats::default()),
        }
    }

    pub fn with_folder(mut self, folder: &'a dyn ConstFolder) -> Self {
        self.folder = folder;
        self
    }

    pub fn with_foreign(mut self, foreign: &'a dyn ForeignMangler) -> Self {
        self.foreign = Some(foreign);
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: &'a dyn Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn with_cache(mut self, cache: &'a ExactCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_options(mut self, options: MangleOptions) -> Self {
        self.options = options;
        self
    }

    pub fn symbols(&self) -> &'a SymbolTable {
        self.symbols
    }

    pub fn folder(&self) -> &'a dyn ConstFolder {
        self.folder
    }

    pub fn foreign(&self) -> Option<&'a dyn ForeignMangler> {
        self.foreign
    }

    pub fn cache(&self) -> Option<&'a ExactCache> {
        self.cache
    }

    pub fn options(&self) -> &MangleOptions {
        &self.options
    }

    /// Report a recoverable error and keep going.
    pub fn report(&self, loc: Loc, error: MangleError) {
        self.stats.borrow_mut().errors_reported += 1;
        self.diagnostics.report(loc, &error);
    }

    pub fn record_request(&self, output_len: usize) {
        let mut stats = self.stats.borrow_mut();
        stats.requests += 1;
        stats.total_output += output_len;
        stats.longest_output = stats.longest_output.max(output_len);
    }

    pub fn record_type_backref(&self) {
        self.stats.borrow_mut().type_backrefs += 1;
    }

    pub fn record_ident_backref(&self) {
        self.stats.borrow_mut().ident_backrefs += 1;
    }

    pub fn record_cache_hit(&self) {
        self.stats.borrow_mut().cache_hits += 1;
    }

    /// Get mangling statistics.
    pub fn stats(&self) -> SessionStats {
        self.stats.borrow().clone()
    }
}

/// Mangling statistics.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionStats {
    /// Top-level requests served.
    pub requests: usize,
    /// Bytes produced over all requests.
    pub total_output: usize,
    pub longest_output: usize,
    pub type_backrefs: usize,
    pub ident_backrefs: usize,
    /// Exact manglings served from the cache.
    pub cache_hits: usize,
    pub errors_reported: usize,
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mangling Statistics:")?;
        writeln!(f, "  Requests: {}", self.requests)?;
        writeln!(f, "  Bytes emitted: {}", self.total_output)?;
        writeln!(f, "  Longest name: {} bytes", self.longest_output)?;
        writeln!(f, "  Type back-references: {}", self.type_backrefs)?;
        writeln!(f, "  Identifier back-references: {}", self.ident_backrefs)?;
        writeln!(f, "  Cache hits: {}", self.cache_hits)?;
        write!(f, "  Errors reported: {}", self.errors_reported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::adaptor::CollectingDiagnostics;
    use crate::entity::Symbol;

    #[test]
    fn test_exact_cache_write_once() {
        let mut table = SymbolTable::new();
        let m = table.add(Symbol::module("app"));
        let cache = ExactCache::for_table(&table);

        assert_eq!(cache.get(m), None);
        assert_eq!(cache.get_or_insert_with(m, || "_D3app".to_string()), Some("_D3app"));
        // A second writer never replaces the stored value.
        assert_eq!(cache.get_or_insert_with(m, || "other".to_string()), Some("_D3app"));
        assert_eq!(cache.filled(), 1);
    }

    #[test]
    fn test_exact_cache_unknown_symbol() {
        let mut table = SymbolTable::new();
        let cache = ExactCache::for_table(&table);
        let late = table.add(Symbol::module("late"));
        assert_eq!(cache.get_or_insert_with(late, || "x".to_string()), None);
    }

    #[test]
    fn test_session_reports_and_stats() {
        let table = SymbolTable::new();
        let diag = CollectingDiagnostics::new();
        let session = MangleSession::new(&table).with_diagnostics(&diag);

        session.report(Loc::new(1, 1), MangleError::SequenceValueArgument);
        session.record_request(12);
        session.record_request(30);
        session.record_type_backref();

        let stats = session.stats();
        assert_eq!(diag.count(), 1);
        assert_eq!(stats.errors_reported, 1);
        assert_eq!(stats.requests, 2);
        assert_eq!(stats.total_output, 42);
        assert_eq!(stats.longest_output, 30);
        assert_eq!(stats.type_backrefs, 1);
    }

    #[test]
    fn test_statistics_display() {
        let table = SymbolTable::new();
        let session = MangleSession::new(&table);
        session.record_request(16);
        session.record_cache_hit();

        let output = format!("{}", session.stats());
        assert!(output.contains("Requests: 1"));
        assert!(output.contains("Longest name: 16 bytes"));
        assert!(output.contains("Cache hits: 1"));
    }

    #[test]
    fn test_default_options() {
        let options = MangleOptions::default();
        assert_eq!(options.max_output_len, 8 * 1024 * 1024);
        assert_eq!(options.verify_alphabet, cfg!(debug_assertions));
    }
}
