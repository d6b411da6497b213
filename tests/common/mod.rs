//! Shared helpers for the integration tests.
//!
//! Builds small declaration graphs and provides stub collaborators standing in
//! for the parts of a compiler the mangler does not own.

#![allow(dead_code)]

use dmangle::core::{ConstFolder, ForeignMangler};
use dmangle::entity::{
    AggregateKind, Expr, ExprKind, FuncDecl, FunctionType, Symbol, SymbolId, SymbolKind,
    SymbolTable, TemplateArg, TemplateDecl, TemplateInstanceDecl, TemplateParam, Type, VarDecl,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// `void name()`
pub fn void_fn() -> Type {
    Type::function(FunctionType::new(vec![], Type::void()))
}

pub fn module(table: &mut SymbolTable, name: &str) -> SymbolId {
    table.add(Symbol::module(name))
}

pub fn function(table: &mut SymbolTable, parent: SymbolId, name: &str, ty: Type) -> SymbolId {
    let fd = FuncDecl { ty: Some(ty), ..Default::default() };
    table.add(Symbol::new(Some(name), SymbolKind::Function(fd)).in_scope(parent))
}

pub fn variable(table: &mut SymbolTable, parent: SymbolId, name: &str, ty: Type) -> SymbolId {
    let vd = VarDecl { ty: Some(ty), ..Default::default() };
    table.add(Symbol::new(Some(name), SymbolKind::Variable(vd)).in_scope(parent))
}

pub fn structure(table: &mut SymbolTable, parent: SymbolId, name: &str) -> SymbolId {
    table.add(Symbol::new(Some(name), SymbolKind::Aggregate(AggregateKind::Struct)).in_scope(parent))
}

pub fn template(table: &mut SymbolTable, parent: SymbolId, name: &str, params: &[&str]) -> SymbolId {
    let td = TemplateDecl {
        params: params
            .iter()
            .map(|p| TemplateParam { ident: (*p).into(), has_specialization: false })
            .collect(),
        ..Default::default()
    };
    table.add(Symbol::new(Some(name), SymbolKind::TemplateDecl(td)).in_scope(parent))
}

/// Instance of `tempdecl` declared next to it.
pub fn instance(table: &mut SymbolTable, tempdecl: SymbolId, args: Vec<TemplateArg>) -> SymbolId {
    let name = table.get(tempdecl).name().to_string();
    let parent = table.get(tempdecl).parent;
    let ti = TemplateInstanceDecl {
        tempdecl: Some(tempdecl),
        args,
        has_members: true,
        is_mixin: false,
    };
    let mut sym = Symbol::new(Some(&name), SymbolKind::TemplateInstance(ti));
    sym.parent = parent;
    table.add(sym)
}

/// C++ mangler returning a recognizable marker.
pub struct StubCpp;

impl ForeignMangler for StubCpp {
    fn mangle_cpp(&self, symbols: &SymbolTable, sym: SymbolId) -> String {
        let name = symbols.get(sym).name();
        format!("_Z{}{}v", name.len(), name)
    }
}

/// Folder that evaluates `Other("<n>")` to an int literal and fails on
/// anything else unevaluated.
pub struct ParsingFolder;

impl ConstFolder for ParsingFolder {
    fn optimize(&self, expr: &Expr) -> Expr {
        expr.clone()
    }

    fn evaluate(&self, expr: &Expr) -> Option<Expr> {
        match &expr.kind {
            ExprKind::Other(text) => text.parse::<i64>().ok().map(|v| Expr::integer(v, Type::int())),
            ExprKind::Error => None,
            _ => Some(expr.clone()),
        }
    }
}
