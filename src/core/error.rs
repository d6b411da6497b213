// This module defines error types for the mangler using the thiserror crate for idiomatic
// Rust error handling. MangleError is the main error enum covering the recoverable authoring
// errors the encoder can run into: template instances whose declaration was never resolved,
// symbol arguments that are forward references, sequences or non-constant expressions used
// as template value arguments, identifiers that would push the output past the length
// limit, non-native linkage declarations duplicated across scopes, and self-referential
// function signatures. Each variant carries the context (symbol names, lengths) needed for
// a readable diagnostic. These errors are normally handed to the Diagnostics collaborator
// rather than returned, so one bad argument never aborts the whole mangling. The module
// also provides MangleResult<T> as a convenience type alias for Result<T, MangleError>.

//! Error types for the mangler.
//!
//! Using thiserror for more idiomatic error handling.

use thiserror::Error;

/// Main error type for mangling.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MangleError {
    #[error("template instance `{name}` is not defined")]
    TemplateNotDefined {
        name: String,
    },

    #[error("template instance `{instance}` forward reference of {kind} `{name}`")]
    ForwardReference {
        instance: String,
        kind: &'static str,
        name: String,
    },

    #[error("sequence is not a valid template value argument")]
    SequenceValueArgument,

    #[error("expression `{expr}` is not a valid template value argument")]
    InvalidValueArgument {
        expr: String,
    },

    #[error("{kind} `{name}` excessive length {length} for symbol, possible recursive expansion?")]
    ExcessiveLength {
        kind: &'static str,
        name: String,
        length: usize,
    },

    #[error("{kind} `{name}` the same declaration cannot be in multiple scopes with non-D linkage")]
    MultipleScopesForeignLinkage {
        kind: &'static str,
        name: String,
    },

    #[error("{kind} `{name}` forward declaration")]
    ForwardDeclaration {
        kind: &'static str,
        name: String,
    },

    #[error("function type `{name}` is self-referential")]
    RecursiveSignature {
        name: String,
    },
}

/// Result type alias for mangle operations.
pub type MangleResult<T> = Result<T, MangleError>;
