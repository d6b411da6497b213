// This module encodes the values of template value arguments. Integers carry their sign as
// the tag (`i` or `N`) followed by the decimal magnitude. Reals are written as `NAN`, `INF`
// or a hexadecimal mantissa and exponent where minus signs become `N` and plus signs and the
// radix point are dropped, so the result stays inside the mangling alphabet. Complex values
// write both parts behind `c`. Strings are re-encoded as UTF-8 and written as hex bytes
// behind a width tag; strings that do not decode, and strings of 8-byte units, fall back to
// an array of integer elements. Array, associative-array and struct literals write a count
// and then their elements in order, and function literals write the mangling of the function
// or template behind them.

//! Value encoder.

use std::fmt::Write as _;

use super::Mangler;
use crate::core::MangleError;
use crate::entity::{Expr, ExprKind, StringValue};

/// C `%A` rendering of `value`, such as `0X1.9P+2` for 6.25.
///
/// Negative zero renders like zero.
pub fn format_hex_float(value: f64) -> String {
    if value.is_nan() {
        return "NAN".to_string();
    }
    let sign = if value < 0.0 { "-" } else { "" };
    if value.is_infinite() {
        return format!("{}INF", sign);
    }

    let bits = value.abs().to_bits();
    let biased = (bits >> 52) & 0x7ff;
    let fraction = bits & ((1u64 << 52) - 1);
    if biased == 0 && fraction == 0 {
        return "0X0P+0".to_string();
    }

    // subnormals keep the minimum exponent and a zero leading digit
    let (lead, exp) = if biased == 0 {
        (0, -1022i64)
    } else {
        (1, biased as i64 - 1023)
    };

    let mut digits = format!("{:013X}", fraction);
    while digits.ends_with('0') {
        digits.pop();
    }
    let mut out = format!("{}0X{}", sign, lead);
    if !digits.is_empty() {
        out.push('.');
        out.push_str(&digits);
    }
    let _ = write!(out, "P{}{}", if exp < 0 { '-' } else { '+' }, exp.abs());
    out
}

/// Real number in mangling form: `NAN`, `[N]INF` or the hex digits of
/// [`format_hex_float`] with `-` as `N` and `+`/`.` removed.
pub fn real_to_mangle(value: f64) -> String {
    if value.is_nan() {
        return "NAN".to_string();
    }
    let mut out = String::new();
    let mut value = value;
    if value < 0.0 {
        out.push('N');
        value = -value;
    }
    if value.is_infinite() {
        out.push_str("INF");
        return out;
    }

    // skip the "0X" prefix
    for c in format_hex_float(value).chars().skip(2) {
        match c {
            '-' => out.push('N'),
            '+' | '.' => {}
            c => out.push(c),
        }
    }
    out
}

/// UTF-8 form of a string literal, if it decodes cleanly.
fn to_utf8(value: &StringValue) -> Option<(char, Vec<u8>)> {
    match value {
        StringValue::Utf8(bytes) => Some(('a', bytes.clone())),
        StringValue::Utf16(units) => char::decode_utf16(units.iter().copied())
            .collect::<Result<String, _>>()
            .ok()
            .map(|s| ('w', s.into_bytes())),
        StringValue::Utf32(units) => units
            .iter()
            .map(|&u| char::from_u32(u))
            .collect::<Option<String>>()
            .map(|s| ('d', s.into_bytes())),
        StringValue::Wide64(_) => None,
    }
}

impl<'s> Mangler<'s> {
    /// `i<n>` or `N<magnitude>`.
    pub(crate) fn write_integer(&mut self, value: i64) {
        if value < 0 {
            self.buf.push('N');
            self.buf.push_decimal(value.unsigned_abs());
        } else {
            self.buf.push('i');
            self.buf.push_decimal(value as u64);
        }
    }

    fn write_string(&mut self, e: &Expr, value: &StringValue) {
        match to_utf8(value) {
            Some((tag, bytes)) => {
                self.buf.push(tag);
                self.buf.push_decimal(bytes.len() as u64);
                self.buf.push('_');
                let mut hex = String::with_capacity(2 * bytes.len());
                for b in &bytes {
                    let _ = write!(hex, "{:02x}", b);
                }
                self.buf.push_str(&hex);
            }
            None => {
                if !matches!(value, StringValue::Wide64(_)) {
                    log::warn!("string literal at {} does not decode, mangling it as an array", e.loc);
                }
                self.buf.push('A');
                self.buf.push_decimal(value.len() as u64);
                for i in 0..value.len() {
                    self.write_integer(value.unit(i) as i64);
                }
            }
        }
    }

    /// Encode the value of a constant expression.
    pub(crate) fn mangle_value(&mut self, e: &Expr) {
        match &e.kind {
            ExprKind::Integer(bits) => self.write_integer(*bits as i64),
            ExprKind::Real(value) => {
                self.buf.push('e');
                self.buf.push_str(&real_to_mangle(*value));
            }
            ExprKind::Complex { re, im } => {
                self.buf.push('c');
                self.buf.push_str(&real_to_mangle(*re));
                self.buf.push('c');
                self.buf.push_str(&real_to_mangle(*im));
            }
            ExprKind::Null => self.buf.push('n'),
            ExprKind::String(value) => self.write_string(e, value),
            ExprKind::ArrayLiteral(elems) => {
                self.buf.push('A');
                self.buf.push_decimal(elems.len() as u64);
                for elem in elems {
                    self.mangle_value(elem);
                }
            }
            ExprKind::AssocArrayLiteral { keys, values } => {
                assert_eq!(
                    keys.len(),
                    values.len(),
                    "associative array literal with mismatched keys and values"
                );
                self.buf.push('A');
                self.buf.push_decimal(keys.len() as u64);
                for (key, value) in keys.iter().zip(values) {
                    self.mangle_value(key);
                    self.mangle_value(value);
                }
            }
            ExprKind::StructLiteral(fields) => {
                self.buf.push('S');
                self.buf.push_decimal(fields.len() as u64);
                for field in fields {
                    match field {
                        Some(value) => self.mangle_value(value),
                        None => self.buf.push('v'),
                    }
                }
            }
            ExprKind::FuncLiteral(func) => {
                self.buf.push('f');
                self.mangle_symbol(*func);
            }
            ExprKind::Error => {}
            ExprKind::Var(_) | ExprKind::This(_) | ExprKind::Tuple(_) | ExprKind::Other(_) => {
                if !e.is_error() {
                    self.session.report(
                        e.loc,
                        MangleError::InvalidValueArgument { expr: e.to_string() },
                    );
                }
            }
        }
    }
}
