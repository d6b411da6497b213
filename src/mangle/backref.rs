// This module implements back-reference compression. A Backref holds two tables local to
// one top-level mangling request: types and identifiers, each mapped to the position where
// they were first emitted (stored as position + 1). On a repeat occurrence the encoder
// writes `Q` followed by the distance from the current position back to the first emission,
// in base 26 with uppercase letters for every digit but the last, which is lowercase, so a
// reader can find the end of the code without outside context. Basic types never take part
// since their codes are already at least as short as any reference. Function, delegate and
// pointer-to-function types are canonicalized before they are used as a key, except for the
// root type of a type mangling request. The module also provides the inverse operation,
// decode_backref, used by tests and the manglecheck tool.

//! Back-reference tables and codes.

use std::hash::Hash;

use hashbrown::hash_map::Entry;
use hashbrown::HashMap;

use super::buffer::MangleBuffer;
use crate::entity::{Identifier, Type};

/// Tag byte introducing a back-reference.
pub const BACKREF_TAG: char = 'Q';

const BASE: usize = 26;

/// Per-request back-reference state.
#[derive(Debug, Default)]
pub struct Backref<'r> {
    /// Type passed to a top-level type mangling; never canonicalized.
    root: Option<&'r Type>,
    types: HashMap<Type, usize>,
    idents: HashMap<Identifier, usize>,
}

impl<'r> Backref<'r> {
    pub fn new(root: Option<&'r Type>) -> Self {
        Self {
            root,
            types: HashMap::new(),
            idents: HashMap::new(),
        }
    }

    fn is_root(&self, t: &Type) -> bool {
        self.root.is_some_and(|root| std::ptr::eq(root, t))
    }

    /// Emit a reference if `t` was seen before, otherwise record it.
    ///
    /// Returns `true` when a reference was written and the caller must not
    /// emit the type.
    pub fn add_ref_to_type(&mut self, buf: &mut MangleBuffer, t: &Type) -> bool {
        if t.is_basic() {
            return false;
        }
        let key = if !self.is_root(t) && t.is_function_delegate_or_ptr_to_function() {
            t.merged()
        } else {
            t.clone()
        };
        backref_impl(buf, &mut self.types, key)
    }

    /// Emit a reference if `id` was seen before, otherwise record it.
    pub fn add_ref_to_identifier(&mut self, buf: &mut MangleBuffer, id: &Identifier) -> bool {
        backref_impl(buf, &mut self.idents, id.clone())
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn ident_count(&self) -> usize {
        self.idents.len()
    }
}

fn backref_impl<K: Hash + Eq>(buf: &mut MangleBuffer, table: &mut HashMap<K, usize>, key: K) -> bool {
    match table.entry(key) {
        Entry::Occupied(entry) => {
            let offset = *entry.get() - 1;
            let distance = buf.len() - offset;
            write_backref(buf, distance);
            true
        }
        Entry::Vacant(entry) => {
            entry.insert(buf.len() + 1);
            false
        }
    }
}

/// Base-26 digits of `pos`: uppercase except for the last digit.
pub fn encode_base26(mut pos: usize) -> String {
    let mut out = String::new();
    let mut mul = 1;
    while pos >= mul * BASE {
        mul *= BASE;
    }
    while mul >= BASE {
        let dig = pos / mul;
        out.push((b'A' + dig as u8) as char);
        pos -= dig * mul;
        mul /= BASE;
    }
    out.push((b'a' + pos as u8) as char);
    out
}

/// Write `Q` and the distance back to the first emission.
pub fn write_backref(buf: &mut MangleBuffer, pos: usize) {
    buf.push(BACKREF_TAG);
    buf.push_str(&encode_base26(pos));
}

/// Decode a back-reference code starting with `Q`.
///
/// Returns the distance and the number of bytes the code occupies.
pub fn decode_backref(code: &[u8]) -> Option<(usize, usize)> {
    let (&tag, digits) = code.split_first()?;
    if tag != BACKREF_TAG as u8 {
        return None;
    }
    let mut value: usize = 0;
    for (i, &c) in digits.iter().enumerate() {
        match c {
            b'A'..=b'Z' => {
                value = value.checked_mul(BASE)?.checked_add(usize::from(c - b'A'))?;
            }
            b'a'..=b'z' => {
                value = value.checked_mul(BASE)?.checked_add(usize::from(c - b'a'))?;
                return Some((value, i + 2));
            }
            _ => return None,
        }
    }
    None
}

/// Position of the first emission referenced by the code at `at`.
pub fn resolve_backref(mangled: &[u8], at: usize) -> Option<usize> {
    let (distance, _) = decode_backref(mangled.get(at..)?)?;
    at.checked_sub(distance)
}
