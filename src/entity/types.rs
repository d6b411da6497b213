// This module defines the type model consumed by the mangler. Types are immutable values
// produced upstream by the type checker: a qualifier set (Mod) plus a TypeKind variant with
// its children owned by value. Equality and hashing are structural, which is what the
// back-reference tables rely on to recognize a repeated type. The module also carries the
// pieces of a function signature: FunctionType (parameters, variadic style, return type,
// linkage and attributes), Parameter with its storage-class bitset (Stc), the Linkage and
// Trust enums, and the BasicType table of primitive types. Type::merged() canonicalizes
// function, delegate and pointer-to-function types by dropping the parts that never reach
// the output (parameter names and inferred scope/return flags).

//! Type model for the mangler.
//!
//! Types are closed sum types so every encoder dispatch is an exhaustive
//! `match`: adding a variant is a compile error until every encoder handles it.

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

use super::symbol::{Identifier, SymbolId};

/// Type qualifier set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Mod(u8);

impl Mod {
    pub const NONE: Mod = Mod(0);
    pub const CONST: Mod = Mod(1);
    pub const SHARED: Mod = Mod(2);
    pub const IMMUTABLE: Mod = Mod(4);
    pub const WILD: Mod = Mod(8);
    pub const WILD_CONST: Mod = Mod(8 | 1);
    pub const SHARED_CONST: Mod = Mod(2 | 1);
    pub const SHARED_WILD: Mod = Mod(2 | 8);
    pub const SHARED_WILD_CONST: Mod = Mod(2 | 8 | 1);

    /// Raw bit pattern.
    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Mod) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether this is one of the nine combinations the type system can produce.
    pub const fn is_valid(self) -> bool {
        matches!(self.0, 0 | 1 | 2 | 3 | 4 | 8 | 9 | 10 | 11)
    }
}

impl BitOr for Mod {
    type Output = Mod;

    fn bitor(self, rhs: Mod) -> Mod {
        Mod(self.0 | rhs.0)
    }
}

/// Primitive types. Each has a fixed one or two byte code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicType {
    Void,
    Byte,
    Ubyte,
    Short,
    Ushort,
    Int,
    Uint,
    Long,
    Ulong,
    Cent,
    Ucent,
    Float,
    Double,
    Real,
    Ifloat,
    Idouble,
    Ireal,
    Cfloat,
    Cdouble,
    Creal,
    Bool,
    Char,
    Wchar,
    Dchar,
}

impl BasicType {
    /// Mangled code for the primitive.
    pub const fn code(self) -> &'static str {
        match self {
            BasicType::Void => "v",
            BasicType::Byte => "g",
            BasicType::Ubyte => "h",
            BasicType::Short => "s",
            BasicType::Ushort => "t",
            BasicType::Int => "i",
            BasicType::Uint => "k",
            BasicType::Long => "l",
            BasicType::Ulong => "m",
            BasicType::Cent => "zi",
            BasicType::Ucent => "zk",
            BasicType::Float => "f",
            BasicType::Double => "d",
            BasicType::Real => "e",
            BasicType::Ifloat => "o",
            BasicType::Idouble => "p",
            BasicType::Ireal => "j",
            BasicType::Cfloat => "q",
            BasicType::Cdouble => "r",
            BasicType::Creal => "c",
            BasicType::Bool => "b",
            BasicType::Char => "a",
            BasicType::Wchar => "u",
            BasicType::Dchar => "w",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            BasicType::Void => "void",
            BasicType::Byte => "byte",
            BasicType::Ubyte => "ubyte",
            BasicType::Short => "short",
            BasicType::Ushort => "ushort",
            BasicType::Int => "int",
            BasicType::Uint => "uint",
            BasicType::Long => "long",
            BasicType::Ulong => "ulong",
            BasicType::Cent => "cent",
            BasicType::Ucent => "ucent",
            BasicType::Float => "float",
            BasicType::Double => "double",
            BasicType::Real => "real",
            BasicType::Ifloat => "ifloat",
            BasicType::Idouble => "idouble",
            BasicType::Ireal => "ireal",
            BasicType::Cfloat => "cfloat",
            BasicType::Cdouble => "cdouble",
            BasicType::Creal => "creal",
            BasicType::Bool => "bool",
            BasicType::Char => "char",
            BasicType::Wchar => "wchar",
            BasicType::Dchar => "dchar",
        }
    }
}

/// Calling convention / ABI family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Linkage {
    /// Not yet resolved by semantic analysis.
    Default,
    #[default]
    D,
    C,
    Cpp,
    Windows,
    ObjC,
    /// Platform dependent; always resolved to C or Windows before mangling.
    System,
}

/// Function trust level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Trust {
    #[default]
    Default,
    System,
    Trusted,
    Safe,
}

/// Variadic style of a parameter list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VarArg {
    #[default]
    None,
    /// C-style `...`
    Variadic,
    /// Typesafe `T[] args...`
    Typesafe,
}

/// Parameter storage classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Stc(u32);

impl Stc {
    pub const NONE: Stc = Stc(0);
    pub const IN: Stc = Stc(1 << 0);
    pub const OUT: Stc = Stc(1 << 1);
    pub const REF: Stc = Stc(1 << 2);
    pub const LAZY: Stc = Stc(1 << 3);
    pub const SCOPE: Stc = Stc(1 << 4);
    pub const RETURN: Stc = Stc(1 << 5);
    /// `scope` was added by inference, not written by the user.
    pub const SCOPE_INFERRED: Stc = Stc(1 << 6);
    /// `return` was added by inference, not written by the user.
    pub const RETURN_INFERRED: Stc = Stc(1 << 7);
    /// `return` binds to `scope` (`ref return scope`) rather than `ref`.
    pub const RETURN_SCOPE: Stc = Stc(1 << 8);

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Stc) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Stc) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Stc {
    type Output = Stc;

    fn bitor(self, rhs: Stc) -> Stc {
        Stc(self.0 | rhs.0)
    }
}

impl BitAnd for Stc {
    type Output = Stc;

    fn bitand(self, rhs: Stc) -> Stc {
        Stc(self.0 & rhs.0)
    }
}

impl Not for Stc {
    type Output = Stc;

    fn not(self) -> Stc {
        Stc(!self.0)
    }
}

/// A function parameter, or a member of a type tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    pub stc: Stc,
    pub ty: Type,
    pub ident: Option<Identifier>,
}

impl Parameter {
    pub fn new(ty: Type) -> Self {
        Self { stc: Stc::NONE, ty, ident: None }
    }

    pub fn with_stc(mut self, stc: Stc) -> Self {
        self.stc = stc;
        self
    }

    pub fn named(mut self, ident: impl Into<Identifier>) -> Self {
        self.ident = Some(ident.into());
        self
    }

    /// Storage class with inferred `scope`/`return` removed.
    pub fn explicit_stc(&self) -> Stc {
        let mut stc = self.stc;
        if stc.contains(Stc::SCOPE_INFERRED) {
            stc = stc & !(Stc::SCOPE | Stc::SCOPE_INFERRED);
        }
        if stc.contains(Stc::RETURN_INFERRED) {
            stc = stc & !(Stc::RETURN | Stc::RETURN_INFERRED);
        }
        stc
    }
}

/// Function attributes that take part in the signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FuncAttrs {
    pub purity: bool,
    pub nothrow: bool,
    pub is_ref: bool,
    pub property: bool,
    pub nogc: bool,
    pub live: bool,
    /// `scope` on the implicit `this`/context.
    pub scope: bool,
    pub scope_inferred: bool,
    /// `return` on the implicit `this`/context.
    pub is_return: bool,
    pub return_inferred: bool,
    /// `return scope` written in that order.
    pub return_scope: bool,
    pub trust: Trust,
}

/// Function signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionType {
    pub params: Vec<Parameter>,
    pub varargs: VarArg,
    /// Return type; absent while it is still being inferred.
    pub next: Option<Box<Type>>,
    pub linkage: Linkage,
    pub attrs: FuncAttrs,
}

impl FunctionType {
    pub fn new(params: Vec<Parameter>, next: Type) -> Self {
        Self {
            params,
            varargs: VarArg::None,
            next: Some(Box::new(next)),
            linkage: Linkage::D,
            attrs: FuncAttrs::default(),
        }
    }

    pub fn with_linkage(mut self, linkage: Linkage) -> Self {
        self.linkage = linkage;
        self
    }

    pub fn with_attrs(mut self, attrs: FuncAttrs) -> Self {
        self.attrs = attrs;
        self
    }

    pub fn with_varargs(mut self, varargs: VarArg) -> Self {
        self.varargs = varargs;
        self
    }

    /// Canonical form: parameter names and inferred flags dropped.
    pub fn merged(&self) -> FunctionType {
        let params = self
            .params
            .iter()
            .map(|p| Parameter {
                stc: p.explicit_stc(),
                ty: p.ty.clone(),
                ident: None,
            })
            .collect();

        let mut attrs = self.attrs;
        if attrs.scope_inferred {
            attrs.scope = false;
            attrs.scope_inferred = false;
        }
        if attrs.return_inferred {
            attrs.is_return = false;
            attrs.return_scope = false;
            attrs.return_inferred = false;
        }

        FunctionType {
            params,
            varargs: self.varargs,
            next: self.next.clone(),
            linkage: self.linkage,
            attrs,
        }
    }
}

/// Type variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Basic(BasicType),
    Pointer(Box<Type>),
    Reference(Box<Type>),
    /// Points at a function type.
    Delegate(Box<Type>),
    Slice(Box<Type>),
    StaticArray { elem: Box<Type>, dim: u64 },
    DynamicArray(Box<Type>),
    AssocArray { index: Box<Type>, value: Box<Type> },
    Function(FunctionType),
    /// Unresolved identifier placeholder.
    Ident(Identifier),
    Enum(SymbolId),
    Struct(SymbolId),
    Class(SymbolId),
    Tuple(Vec<Parameter>),
    /// `typeof(null)`
    Null,
    Vector(Box<Type>),
    NoReturn,
    /// Already reported upstream.
    Error,
}

/// A qualified type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Type {
    pub mods: Mod,
    pub kind: TypeKind,
}

impl Type {
    pub fn new(kind: TypeKind) -> Self {
        Self { mods: Mod::NONE, kind }
    }

    pub fn basic(ty: BasicType) -> Self {
        Self::new(TypeKind::Basic(ty))
    }

    pub fn void() -> Self {
        Self::basic(BasicType::Void)
    }

    pub fn int() -> Self {
        Self::basic(BasicType::Int)
    }

    pub fn pointer(next: Type) -> Self {
        Self::new(TypeKind::Pointer(Box::new(next)))
    }

    pub fn reference(next: Type) -> Self {
        Self::new(TypeKind::Reference(Box::new(next)))
    }

    pub fn delegate(func: FunctionType) -> Self {
        Self::new(TypeKind::Delegate(Box::new(Self::function(func))))
    }

    pub fn function(func: FunctionType) -> Self {
        Self::new(TypeKind::Function(func))
    }

    pub fn dynamic_array(elem: Type) -> Self {
        Self::new(TypeKind::DynamicArray(Box::new(elem)))
    }

    pub fn static_array(elem: Type, dim: u64) -> Self {
        Self::new(TypeKind::StaticArray { elem: Box::new(elem), dim })
    }

    pub fn assoc_array(index: Type, value: Type) -> Self {
        Self::new(TypeKind::AssocArray {
            index: Box::new(index),
            value: Box::new(value),
        })
    }

    pub fn vector(base: Type) -> Self {
        Self::new(TypeKind::Vector(Box::new(base)))
    }

    pub fn tuple(members: Vec<Parameter>) -> Self {
        Self::new(TypeKind::Tuple(members))
    }

    pub fn with_mods(mut self, mods: Mod) -> Self {
        self.mods = mods;
        self
    }

    pub fn is_basic(&self) -> bool {
        matches!(self.kind, TypeKind::Basic(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, TypeKind::Error)
    }

    pub fn as_function(&self) -> Option<&FunctionType> {
        match &self.kind {
            TypeKind::Function(tf) => Some(tf),
            _ => None,
        }
    }

    /// Function, delegate, or pointer to function.
    pub fn is_function_delegate_or_ptr_to_function(&self) -> bool {
        match &self.kind {
            TypeKind::Function(_) => true,
            TypeKind::Delegate(next) | TypeKind::Pointer(next) => next.as_function().is_some(),
            _ => false,
        }
    }

    /// Canonical form used as a back-reference key.
    ///
    /// Only function, delegate and pointer-to-function types change; every
    /// other type is already canonical.
    pub fn merged(&self) -> Type {
        let kind = match &self.kind {
            TypeKind::Function(tf) => TypeKind::Function(tf.merged()),
            TypeKind::Delegate(next) => TypeKind::Delegate(Box::new(next.merged())),
            TypeKind::Pointer(next) if next.as_function().is_some() => {
                TypeKind::Pointer(Box::new(next.merged()))
            }
            other => other.clone(),
        };
        Type { mods: self.mods, kind }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quals = match self.mods.bits() {
            0 => "",
            1 => "const ",
            2 => "shared ",
            3 => "shared const ",
            4 => "immutable ",
            8 => "inout ",
            9 => "inout const ",
            10 => "shared inout ",
            _ => "shared inout const ",
        };
        f.write_str(quals)?;
        match &self.kind {
            TypeKind::Basic(b) => f.write_str(b.name()),
            TypeKind::Pointer(next) => write!(f, "{}*", next),
            TypeKind::Reference(next) => write!(f, "ref {}", next),
            TypeKind::Delegate(next) => write!(f, "{} delegate", next),
            TypeKind::Slice(next) => write!(f, "{}[..]", next),
            TypeKind::StaticArray { elem, dim } => write!(f, "{}[{}]", elem, dim),
            TypeKind::DynamicArray(elem) => write!(f, "{}[]", elem),
            TypeKind::AssocArray { index, value } => write!(f, "{}[{}]", value, index),
            TypeKind::Function(tf) => {
                match &tf.next {
                    Some(next) => write!(f, "{}(", next)?,
                    None => f.write_str("auto(")?,
                }
                for (i, p) in tf.params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", p.ty)?;
                }
                f.write_str(")")
            }
            TypeKind::Ident(id) => f.write_str(id.as_str()),
            TypeKind::Enum(id) | TypeKind::Struct(id) | TypeKind::Class(id) => {
                write!(f, "#{}", id.index())
            }
            TypeKind::Tuple(members) => {
                f.write_str("(")?;
                for (i, p) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", p.ty)?;
                }
                f.write_str(")")
            }
            TypeKind::Null => f.write_str("typeof(null)"),
            TypeKind::Vector(base) => write!(f, "__vector({})", base),
            TypeKind::NoReturn => f.write_str("noreturn"),
            TypeKind::Error => f.write_str("_error_"),
        }
    }
}
