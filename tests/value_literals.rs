//! Test value encodings of constant expressions.

mod common;

use common::*;
use dmangle::core::MangleSession;
use dmangle::entity::{BasicType, Expr, ExprKind, StringValue, SymbolTable, Type};
use dmangle::mangle::{is_valid_mangling, real_to_mangle};
use dmangle::mangle_expr;

fn mangled(e: &Expr) -> String {
    let table = SymbolTable::new();
    let session = MangleSession::new(&table);
    mangle_expr(&session, e)
}

#[test]
fn test_negative_infinity() {
    init_logging();
    let e = Expr::real(f64::NEG_INFINITY, Type::basic(BasicType::Real));
    assert_eq!(mangled(&e), "eNINF");
}

#[test]
fn test_reals_stay_in_alphabet() {
    init_logging();
    for value in [0.0, 1.0, -1.5, 6.25, 0.1, 1e300, -1e-300, f64::MIN_POSITIVE, f64::MAX, f64::NAN] {
        let out = mangled(&Expr::real(value, Type::basic(BasicType::Double)));
        assert!(out.starts_with('e'), "{}", out);
        assert!(is_valid_mangling(&out), "{}", out);
        assert!(!out.contains(['+', '-', '.']), "{}", out);
    }
    assert_eq!(real_to_mangle(1e300), "17E43C8800759CP996");
}

#[test]
fn test_wide_string_always_uses_array() {
    init_logging();
    let hex = Expr::string(StringValue::Wide64(vec![0x41, 0x42]), Type::void());
    assert_eq!(mangled(&hex), "A2i65i66");
}

#[test]
fn test_strings_reencode_as_utf8() {
    init_logging();
    let utf16 = Expr::string(StringValue::Utf16("ab".encode_utf16().collect()), Type::void());
    let utf32 = Expr::string(StringValue::Utf32(vec!['a' as u32, 'b' as u32]), Type::void());
    assert_eq!(mangled(&utf16), "w2_6162");
    assert_eq!(mangled(&utf32), "d2_6162");
}

#[test]
fn test_nested_literals() {
    init_logging();
    let point = Expr::new(
        ExprKind::StructLiteral(vec![Some(Expr::integer(1, Type::int())), None]),
        Type::void(),
    );
    let arr = Expr::new(
        ExprKind::ArrayLiteral(vec![point.clone(), point]),
        Type::void(),
    );
    assert_eq!(mangled(&arr), "A2S2i1vS2i1v");

    let complex = Expr::new(
        ExprKind::Complex { re: 0.5, im: f64::NAN },
        Type::basic(BasicType::Creal),
    );
    assert_eq!(mangled(&complex), "c1PN1cNAN");
}

#[test]
fn test_function_literal_value() {
    init_logging();
    let mut table = SymbolTable::new();
    let app = module(&mut table, "app");
    let lambda = function(&mut table, app, "__lambda2", void_fn());
    let session = MangleSession::new(&table);
    let lit = Expr::new(ExprKind::FuncLiteral(lambda), void_fn());
    assert_eq!(mangle_expr(&session, &lit), "f_D3app9__lambda2FZv");
}
