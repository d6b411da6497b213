// This module defines the symbol model consumed by the mangler. A SymbolTable owns every
// Symbol in a flat Vec and hands out SymbolId indices; parent links are ids, so the scope
// chain is a read-only, acyclic parent-pointer graph that the encoder walks but never owns
// or mutates. Each Symbol carries its identifier (optional for anonymous scopes), parent,
// linkage, local disambiguation number, an externally supplied mangle override, a source
// location for diagnostics, and a SymbolKind variant: module, function, function alias,
// overload set, variable, aggregate, template declaration, template instance, plain alias,
// or a generic scope. Template instances carry their argument list as TemplateArg values.
// The table also provides the small lookups the encoder needs: alias resolution, the
// effective parent that skips template mixins, kind names and dotted names for messages.

//! Symbol model and table.

use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use super::expr::Expr;
use super::types::{Linkage, Type};

/// Interned-style identifier. Cheap to clone, compared by content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(Arc<str>);

impl Identifier {
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Identifier {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source position, used only for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Loc {
    pub line: u32,
    pub column: u32,
}

impl Loc {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.line, self.column)
    }
}

/// Stable index of a symbol in its [`SymbolTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(u32);

impl SymbolId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Source format a module was compiled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileType {
    #[default]
    D,
    /// Imported C source.
    C,
}

/// Special program entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryPoint {
    #[default]
    None,
    Main,
    WinMain,
    DllMain,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FuncDecl {
    /// Resolved type; a `TypeKind::Function`, or absent before semantic analysis.
    pub ty: Option<Type>,
    /// Type as written, before attribute inference.
    pub original_ty: Option<Type>,
    pub needs_this: bool,
    pub is_nested: bool,
    /// Other functions share this name in the same scope.
    pub has_overloads: bool,
    pub is_csymbol: bool,
    pub entry: EntryPoint,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncAliasDecl {
    /// The selected function, or another function alias.
    pub target: SymbolId,
    pub has_overloads: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverloadSetDecl {
    pub aliassym: SymbolId,
    /// Further overloads follow this one.
    pub has_next: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct VarDecl {
    pub ty: Option<Type>,
    pub is_csymbol: bool,
    pub is_dataseg: bool,
    pub is_extern: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateKind {
    Struct,
    Union,
    Class,
    Interface,
    Enum,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateParam {
    pub ident: Identifier,
    pub has_specialization: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TemplateDecl {
    pub params: Vec<TemplateParam>,
    /// Last parameter is a sequence parameter.
    pub is_variadic: bool,
    pub has_next: bool,
}

impl TemplateDecl {
    /// Number of parameters excluding a trailing sequence parameter.
    pub fn non_variadic_count(&self) -> usize {
        self.params.len() - usize::from(self.is_variadic && !self.params.is_empty())
    }
}

/// A template argument.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateArg {
    Type(Type),
    Expr(Expr),
    Symbol(SymbolId),
    /// Spliced flat into the enclosing argument list; only valid last.
    Tuple(Vec<TemplateArg>),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TemplateInstanceDecl {
    pub tempdecl: Option<SymbolId>,
    pub args: Vec<TemplateArg>,
    /// Instantiated from a template with a member list (`__T`), as opposed to
    /// a constraint-only instantiation (`__U`).
    pub has_members: bool,
    pub is_mixin: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SymbolKind {
    Module { file_type: FileType },
    Function(FuncDecl),
    FuncAlias(FuncAliasDecl),
    OverloadSet(OverloadSetDecl),
    Variable(VarDecl),
    Aggregate(AggregateKind),
    TemplateDecl(TemplateDecl),
    TemplateInstance(TemplateInstanceDecl),
    Alias(SymbolId),
    Scope,
}

/// A named, scoped entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub ident: Option<Identifier>,
    pub parent: Option<SymbolId>,
    pub linkage: Linkage,
    /// Disambiguates same-named declarations nested in one scope.
    pub local_num: u32,
    pub mangle_override: Option<String>,
    pub loc: Loc,
    pub kind: SymbolKind,
}

impl Symbol {
    pub fn new(ident: Option<&str>, kind: SymbolKind) -> Self {
        Self {
            ident: ident.map(Identifier::new),
            parent: None,
            linkage: Linkage::D,
            local_num: 0,
            mangle_override: None,
            loc: Loc::default(),
            kind,
        }
    }

    pub fn module(name: &str) -> Self {
        Self::new(Some(name), SymbolKind::Module { file_type: FileType::D })
    }

    pub fn in_scope(mut self, parent: SymbolId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_linkage(mut self, linkage: Linkage) -> Self {
        self.linkage = linkage;
        self
    }

    pub fn with_local_num(mut self, local_num: u32) -> Self {
        self.local_num = local_num;
        self
    }

    pub fn with_override(mut self, mangled: &str) -> Self {
        self.mangle_override = Some(mangled.to_string());
        self
    }

    pub fn at(mut self, loc: Loc) -> Self {
        self.loc = loc;
        self
    }

    /// Textual name; anonymous symbols get a synthesized one.
    pub fn name(&self) -> &str {
        self.ident.as_ref().map_or("__anonymous", Identifier::as_str)
    }

    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            SymbolKind::Module { .. } => "module",
            SymbolKind::Function(_) | SymbolKind::FuncAlias(_) => "function",
            SymbolKind::OverloadSet(_) => "overloadset",
            SymbolKind::Variable(_) => "variable",
            SymbolKind::Aggregate(AggregateKind::Struct) => "struct",
            SymbolKind::Aggregate(AggregateKind::Union) => "union",
            SymbolKind::Aggregate(AggregateKind::Class) => "class",
            SymbolKind::Aggregate(AggregateKind::Interface) => "interface",
            SymbolKind::Aggregate(AggregateKind::Enum) => "enum",
            SymbolKind::TemplateDecl(_) => "template",
            SymbolKind::TemplateInstance(ti) if ti.is_mixin => "mixin",
            SymbolKind::TemplateInstance(_) => "template instance",
            SymbolKind::Alias(_) => "alias",
            SymbolKind::Scope => "scope",
        }
    }

    pub fn as_module(&self) -> Option<FileType> {
        match self.kind {
            SymbolKind::Module { file_type } => Some(file_type),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FuncDecl> {
        match &self.kind {
            SymbolKind::Function(fd) => Some(fd),
            _ => None,
        }
    }

    pub fn as_template_instance(&self) -> Option<&TemplateInstanceDecl> {
        match &self.kind {
            SymbolKind::TemplateInstance(ti) => Some(ti),
            _ => None,
        }
    }

    pub fn as_template_decl(&self) -> Option<&TemplateDecl> {
        match &self.kind {
            SymbolKind::TemplateDecl(td) => Some(td),
            _ => None,
        }
    }

    /// Template mixin instance.
    pub fn is_mixin(&self) -> bool {
        matches!(&self.kind, SymbolKind::TemplateInstance(ti) if ti.is_mixin)
    }

    /// Function, function alias, or variable.
    pub fn is_declaration(&self) -> bool {
        matches!(
            self.kind,
            SymbolKind::Function(_) | SymbolKind::FuncAlias(_) | SymbolKind::Variable(_)
        )
    }

    /// Resolved type of a typed declaration.
    pub fn decl_type(&self) -> Option<&Type> {
        match &self.kind {
            SymbolKind::Function(fd) => fd.ty.as_ref(),
            SymbolKind::Variable(vd) => vd.ty.as_ref(),
            _ => None,
        }
    }
}

/// Owner of all symbols of a compilation.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    pub fn get_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.index()]
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Follows plain aliases to their target.
    pub fn to_alias(&self, mut id: SymbolId) -> SymbolId {
        while let SymbolKind::Alias(target) = self.get(id).kind {
            id = target;
        }
        id
    }

    /// Follows function aliases to the underlying function.
    pub fn to_alias_func(&self, mut id: SymbolId) -> SymbolId {
        while let SymbolKind::FuncAlias(fa) = &self.get(id).kind {
            id = fa.target;
        }
        id
    }

    /// Parent, skipping template mixin instances.
    pub fn to_parent(&self, id: SymbolId) -> Option<SymbolId> {
        let mut parent = self.get(id).parent;
        while let Some(p) = parent {
            if !self.get(p).is_mixin() {
                break;
            }
            parent = self.get(p).parent;
        }
        parent
    }

    /// Dotted path from the root module, for messages.
    pub fn pretty_name(&self, id: SymbolId) -> String {
        let mut parts = Vec::new();
        let mut cur = Some(id);
        while let Some(s) = cur {
            let sym = self.get(s);
            parts.push(sym.name());
            cur = sym.parent;
        }
        parts.reverse();
        parts.join(".")
    }
}

impl Index<SymbolId> for SymbolTable {
    type Output = Symbol;

    fn index(&self, id: SymbolId) -> &Symbol {
        self.get(id)
    }
}
