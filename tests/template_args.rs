//! Test template-instance mangling through the public entry points.
//!
//! Each test builds a template with a single instance and checks how its
//! arguments are classified: types, folded and evaluated values, symbols
//! (including reclassified variable references and function literals),
//! foreign-linkage symbols and spliced sequences.

mod common;

use common::*;
use dmangle::core::{CollectingDiagnostics, MangleError, MangleSession};
use dmangle::entity::{
    BasicType, Expr, ExprKind, Linkage, Mod, StringValue, Symbol, SymbolKind, SymbolTable,
    TemplateArg, Type, TypeKind,
};
use dmangle::{mangle_symbol, mangle_template_instance};

#[test]
fn test_folded_value_argument() {
    init_logging();
    let mut table = SymbolTable::new();
    let app = module(&mut table, "app");
    let td = template(&mut table, app, "Fix", &["n"]);
    let forty_two = Expr::new(ExprKind::Other("42".into()), Type::int());
    let ti = instance(&mut table, td, vec![TemplateArg::Expr(forty_two)]);

    let session = MangleSession::new(&table).with_folder(&ParsingFolder);
    assert_eq!(mangle_symbol(&session, ti), "3app__T3FixVii42Z");
}

#[test]
fn test_failed_evaluation_skips_value() {
    init_logging();
    let mut table = SymbolTable::new();
    let app = module(&mut table, "app");
    let td = template(&mut table, app, "Fix", &["a", "b"]);
    let bad = Expr::new(ExprKind::Other("not a constant".into()), Type::int());
    let ti = instance(
        &mut table,
        td,
        vec![TemplateArg::Expr(bad), TemplateArg::Expr(Expr::integer(1, Type::int()))],
    );

    let session = MangleSession::new(&table).with_folder(&ParsingFolder);
    assert_eq!(mangle_template_instance(&session, ti), "__T3FixVVii1Z");
}

#[test]
fn test_values_repeat_but_types_compress() {
    init_logging();
    let mut table = SymbolTable::new();
    let app = module(&mut table, "app");
    let td = template(&mut table, app, "Fix", &["a", "b"]);

    let ints = instance(
        &mut table,
        td,
        vec![
            TemplateArg::Expr(Expr::integer(42, Type::int())),
            TemplateArg::Expr(Expr::integer(42, Type::int())),
        ],
    );
    let int_ptr = Type::pointer(Type::int());
    let nulls = instance(
        &mut table,
        td,
        vec![
            TemplateArg::Expr(Expr::new(ExprKind::Null, int_ptr.clone())),
            TemplateArg::Expr(Expr::new(ExprKind::Null, int_ptr)),
        ],
    );

    let session = MangleSession::new(&table);
    assert_eq!(mangle_template_instance(&session, ints), "__T3FixVii42Vii42Z");
    assert_eq!(mangle_template_instance(&session, nulls), "__T3FixVPinVQenZ");
}

#[test]
fn test_string_value_argument() {
    init_logging();
    let mut table = SymbolTable::new();
    let app = module(&mut table, "app");
    let td = template(&mut table, app, "Named", &["name"]);
    let string_ty = Type::dynamic_array(Type::basic(BasicType::Char).with_mods(Mod::IMMUTABLE));
    let hello = Expr::string(StringValue::Utf8(b"hello".to_vec()), string_ty);
    let ti = instance(&mut table, td, vec![TemplateArg::Expr(hello)]);

    let session = MangleSession::new(&table);
    assert_eq!(mangle_template_instance(&session, ti), "__T5NamedVAyaa5_68656c6c6fZ");
}

#[test]
fn test_symbol_argument_shares_backrefs() {
    init_logging();
    let mut table = SymbolTable::new();
    let app = module(&mut table, "app");
    let foo = function(&mut table, app, "foo", void_fn());
    let td = template(&mut table, app, "Wrap", &["alias f"]);
    let ti = instance(&mut table, td, vec![TemplateArg::Symbol(foo)]);

    let session = MangleSession::new(&table);
    assert_eq!(mangle_template_instance(&session, ti), "__T4WrapS_D3app3fooFZvZ");
    assert_eq!(mangle_symbol(&session, ti), "3app__T4WrapS_DQp3fooFZvZ");
}

#[test]
fn test_function_literal_is_symbol_argument() {
    init_logging();
    let mut table = SymbolTable::new();
    let app = module(&mut table, "app");
    let lambda = function(&mut table, app, "__lambda1", void_fn());
    let td = template(&mut table, app, "Apply", &["alias f"]);
    let lit = Expr::new(ExprKind::FuncLiteral(lambda), void_fn());
    let ti = instance(&mut table, td, vec![TemplateArg::Expr(lit)]);

    let session = MangleSession::new(&table);
    assert_eq!(mangle_template_instance(&session, ti), "__T5ApplyS_D3app9__lambda1FZvZ");
}

#[test]
fn test_alias_argument_resolves() {
    init_logging();
    let mut table = SymbolTable::new();
    let app = module(&mut table, "app");
    let s = structure(&mut table, app, "S");
    let alias = table.add(Symbol::new(Some("T"), SymbolKind::Alias(s)).in_scope(app));
    let td = template(&mut table, app, "Wrap", &["alias a"]);
    let ti = instance(&mut table, td, vec![TemplateArg::Symbol(alias)]);

    let session = MangleSession::new(&table);
    assert_eq!(mangle_template_instance(&session, ti), "__T4WrapS3app1SZ");
}

#[test]
fn test_foreign_symbol_arguments() {
    init_logging();
    let mut table = SymbolTable::new();
    let app = module(&mut table, "app");
    let puts = function(&mut table, app, "puts", void_fn());
    table.get_mut(puts).linkage = Linkage::C;
    let bar = function(&mut table, app, "bar", void_fn());
    table.get_mut(bar).linkage = Linkage::Cpp;
    let td = template(&mut table, app, "Wrap", &["alias a", "alias b"]);
    let ti = instance(&mut table, td, vec![TemplateArg::Symbol(puts), TemplateArg::Symbol(bar)]);

    let session = MangleSession::new(&table).with_foreign(&StubCpp);
    assert_eq!(mangle_template_instance(&session, ti), "__T4WrapX4putsX7_Z3barvZ");
}

#[test]
fn test_sequence_argument_is_spliced() {
    init_logging();
    let mut table = SymbolTable::new();
    let app = module(&mut table, "app");
    let s = structure(&mut table, app, "S");
    let td = template(&mut table, app, "Seq", &["Args..."]);
    let ti = instance(
        &mut table,
        td,
        vec![TemplateArg::Tuple(vec![
            TemplateArg::Type(Type::int()),
            TemplateArg::Type(Type::new(TypeKind::Struct(s))),
            TemplateArg::Expr(Expr::integer(-1, Type::basic(BasicType::Long))),
        ])],
    );

    let session = MangleSession::new(&table);
    assert_eq!(mangle_template_instance(&session, ti), "__T3SeqTiTS3app1SVlN1Z");
}

#[test]
fn test_malformed_arguments_keep_going() {
    init_logging();
    let mut table = SymbolTable::new();
    let app = module(&mut table, "app");
    let td = template(&mut table, app, "Bad", &["a", "b", "c"]);
    let seq = Expr::new(
        ExprKind::Tuple(vec![Expr::integer(1, Type::int())]),
        Type::tuple(vec![]),
    );
    let ti = instance(
        &mut table,
        td,
        vec![
            TemplateArg::Expr(seq),
            TemplateArg::Type(Type::basic(BasicType::Bool)),
            TemplateArg::Expr(Expr::integer(3, Type::int())),
        ],
    );

    let diags = CollectingDiagnostics::new();
    let session = MangleSession::new(&table).with_diagnostics(&diags);
    assert_eq!(mangle_template_instance(&session, ti), "__T3BadVTbVii3Z");
    assert_eq!(diags.errors(), vec![MangleError::SequenceValueArgument]);
    assert_eq!(session.stats().errors_reported, 1);
}
