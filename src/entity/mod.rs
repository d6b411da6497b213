// This module groups the read-only input model the mangler consumes: the type model
// (qualified structural types and function signatures), the symbol model (a flat table of
// scoped symbols linked by parent ids), and the expression model used for template value
// arguments. All of it is produced upstream by the type checker and outlives any mangle
// request; the encoder only reads it.

//! Input entities: types, symbols, expressions.

pub mod expr;
pub mod symbol;
pub mod types;

pub use expr::{Expr, ExprKind, StringValue};
pub use symbol::{
    AggregateKind, EntryPoint, FileType, FuncAliasDecl, FuncDecl, Identifier, Loc,
    OverloadSetDecl, Symbol, SymbolId, SymbolKind, SymbolTable, TemplateArg, TemplateDecl,
    TemplateInstanceDecl, TemplateParam, VarDecl,
};
pub use types::{
    BasicType, FuncAttrs, FunctionType, Linkage, Mod, Parameter, Stc, Trust, Type, TypeKind,
    VarArg,
};
