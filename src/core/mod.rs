// This module serves as the central hub for the mangler's infrastructure, the pieces that
// sit around the encoding engine rather than inside it. It exports and organizes three
// subsystems: error types (the recoverable authoring errors and the result alias), the
// collaborator interfaces through which the engine reaches the rest of the compiler
// (constant folding, C++ name mangling, diagnostics), and session management (the bundle
// of collaborators, tunables, the exact-mangling cache and run statistics). Nothing here
// knows the encoding rules; the engine in crate::mangle depends on this module, never the
// other way round.

//! Core mangler infrastructure
//!
//! # Key Components
//!
//! ## Errors (`error`)
//! - Recoverable authoring errors, reported and never returned to callers
//!
//! ## Collaborators (`adaptor`)
//! - `ConstFolder`, `ForeignMangler` and `Diagnostics` traits
//! - Ready-made implementations for tools and tests
//!
//! ## Session Management (`session`)
//! - Collaborator bundle and `MangleOptions`
//! - Write-once exact-mangling cache
//! - Run statistics

pub mod adaptor;
pub mod error;
pub mod session;
pub mod test_utils;

// Re-export core components
pub use error::{
    MangleError,
    MangleResult,
};

pub use adaptor::{
    CollectingDiagnostics,
    ConstFolder,
    Diagnostics,
    ForeignMangler,
    IdentityFolder,
    LogDiagnostics,
};

pub use session::{
    ExactCache,
    MangleOptions,
    MangleSession,
    SessionStats,
    MAX_MANGLED_LEN,
};
