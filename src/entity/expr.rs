//! Expression model for template value arguments.
//!
//! Only the shapes the mangler can see after constant folding are modeled as
//! distinct variants. Anything else arrives as [`ExprKind::Other`] and must be
//! evaluated by the [`ConstFolder`](crate::core::ConstFolder) before it can be
//! encoded.

use std::fmt;

use super::symbol::{Loc, SymbolId};
use super::types::Type;

/// String literal contents by code unit width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringValue {
    Utf8(Vec<u8>),
    Utf16(Vec<u16>),
    Utf32(Vec<u32>),
    /// 8-byte units, only produced by hex strings cast to `long[]`.
    Wide64(Vec<u64>),
}

impl StringValue {
    /// Number of code units.
    pub fn len(&self) -> usize {
        match self {
            StringValue::Utf8(s) => s.len(),
            StringValue::Utf16(s) => s.len(),
            StringValue::Utf32(s) => s.len(),
            StringValue::Wide64(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Code unit at `i`, widened.
    pub fn unit(&self, i: usize) -> u64 {
        match self {
            StringValue::Utf8(s) => u64::from(s[i]),
            StringValue::Utf16(s) => u64::from(s[i]),
            StringValue::Utf32(s) => u64::from(s[i]),
            StringValue::Wide64(s) => s[i],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Raw 64-bit pattern; the sign comes from reading it as `i64`.
    Integer(u64),
    Real(f64),
    Complex { re: f64, im: f64 },
    Null,
    String(StringValue),
    ArrayLiteral(Vec<Expr>),
    AssocArrayLiteral { keys: Vec<Expr>, values: Vec<Expr> },
    /// `None` marks a field with no initializer.
    StructLiteral(Vec<Option<Expr>>),
    /// Function or lambda literal, backed by a function or template declaration.
    FuncLiteral(SymbolId),
    Var(SymbolId),
    This(SymbolId),
    /// Expression sequence.
    Tuple(Vec<Expr>),
    /// Not yet folded; carries its source text.
    Other(String),
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: Type,
    pub loc: Loc,
}

impl Expr {
    pub fn new(kind: ExprKind, ty: Type) -> Self {
        Self { kind, ty, loc: Loc::default() }
    }

    pub fn integer(value: i64, ty: Type) -> Self {
        Self::new(ExprKind::Integer(value as u64), ty)
    }

    pub fn real(value: f64, ty: Type) -> Self {
        Self::new(ExprKind::Real(value), ty)
    }

    pub fn string(value: StringValue, ty: Type) -> Self {
        Self::new(ExprKind::String(value), ty)
    }

    pub fn at(mut self, loc: Loc) -> Self {
        self.loc = loc;
        self
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, ExprKind::Error) || self.ty.is_error()
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Integer(v) => write!(f, "{}", *v as i64),
            ExprKind::Real(v) => write!(f, "{}", v),
            ExprKind::Complex { re, im } => write!(f, "{} + {}i", re, im),
            ExprKind::Null => f.write_str("null"),
            ExprKind::String(s) => write!(f, "<string of {} units>", s.len()),
            ExprKind::ArrayLiteral(elems) => write!(f, "[{} elements]", elems.len()),
            ExprKind::AssocArrayLiteral { keys, .. } => write!(f, "[{} entries]", keys.len()),
            ExprKind::StructLiteral(fields) => write!(f, "{}({} fields)", self.ty, fields.len()),
            ExprKind::FuncLiteral(id) => write!(f, "__lambda#{}", id.index()),
            ExprKind::Var(id) => write!(f, "var#{}", id.index()),
            ExprKind::This(_) => f.write_str("this"),
            ExprKind::Tuple(elems) => write!(f, "AliasSeq!({} elements)", elems.len()),
            ExprKind::Other(text) => f.write_str(text),
            ExprKind::Error => f.write_str("__error"),
        }
    }
}
