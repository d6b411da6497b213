//! Type encoder.
//!
//! Each type is written as an optional qualifier prefix (only when it differs
//! from the qualifiers of the enclosing context), then either a
//! back-reference or its structural encoding.

use super::Mangler;
use crate::entity::{Loc, Mod, Type, TypeKind};

/// Qualifier prefix code.
pub(crate) fn mod_code(mods: Mod) -> &'static str {
    match mods {
        Mod::NONE => "",
        Mod::CONST => "x",
        Mod::IMMUTABLE => "y",
        Mod::SHARED => "O",
        Mod::SHARED_CONST => "Ox",
        Mod::WILD => "Ng",
        Mod::WILD_CONST => "Ngx",
        Mod::SHARED_WILD => "ONg",
        Mod::SHARED_WILD_CONST => "ONgx",
        other => panic!("invalid type qualifier combination {:#04x}", other.bits()),
    }
}

impl<'s> Mangler<'s> {
    /// Encode `t` in a context without qualifiers.
    pub(crate) fn mangle_type(&mut self, t: &Type) {
        self.visit_with_mask(t, Mod::NONE);
    }

    /// Encode `t` inside a context qualified with `mod_mask`.
    pub(crate) fn visit_with_mask(&mut self, t: &Type, mod_mask: Mod) {
        // Already reported upstream.
        if t.is_error() {
            return;
        }
        if mod_mask != t.mods {
            self.buf.push_str(mod_code(t.mods));
        }
        if self.backref.add_ref_to_type(&mut self.buf, t) {
            log::trace!("type back-reference for {}", t);
            self.session.record_type_backref();
            return;
        }

        match &t.kind {
            TypeKind::Basic(basic) => self.buf.push_str(basic.code()),
            TypeKind::Pointer(next) => {
                self.buf.push('P');
                self.visit_with_mask(next, t.mods);
            }
            TypeKind::Reference(next) => {
                self.buf.push('R');
                self.visit_with_mask(next, t.mods);
            }
            TypeKind::Delegate(next) => {
                self.buf.push('D');
                self.visit_with_mask(next, t.mods);
            }
            TypeKind::Slice(next) => {
                self.buf.push('@');
                self.visit_with_mask(next, t.mods);
            }
            TypeKind::StaticArray { elem, dim } => {
                self.buf.push('G');
                self.buf.push_decimal(*dim);
                self.visit_with_mask(elem, t.mods);
            }
            TypeKind::DynamicArray(elem) => {
                self.buf.push('A');
                self.visit_with_mask(elem, t.mods);
            }
            TypeKind::AssocArray { index, value } => {
                self.buf.push('H');
                self.visit_with_mask(index, Mod::NONE);
                self.visit_with_mask(value, t.mods);
            }
            TypeKind::Function(tf) => {
                let tret = tf.next.as_deref();
                if let Err(err) = self.mangle_func_type(tf, t.mods, tf, t.mods, tret) {
                    self.session.report(Loc::default(), err);
                    // Parameter list only; the return type is what recursed.
                    let written = self.mangle_func_type(tf, t.mods, tf, t.mods, None);
                    debug_assert!(written.is_ok());
                }
            }
            TypeKind::Ident(id) => {
                self.buf.push('I');
                self.buf.push_length_prefixed(id.as_str());
            }
            TypeKind::Enum(sym) => {
                self.buf.push('E');
                self.mangle_symbol(*sym);
            }
            TypeKind::Struct(sym) => {
                self.buf.push('S');
                self.mangle_symbol(*sym);
            }
            TypeKind::Class(sym) => {
                self.buf.push('C');
                self.mangle_symbol(*sym);
            }
            TypeKind::Tuple(members) => {
                self.buf.push('B');
                for member in members {
                    self.mangle_parameter(member);
                    if let Some(name) = &member.ident {
                        self.buf.push_length_prefixed(name.as_str());
                    }
                }
                self.buf.push('Z');
            }
            TypeKind::Null => self.buf.push('n'),
            TypeKind::Vector(base) => {
                self.buf.push_str("Nh");
                self.visit_with_mask(base, t.mods);
            }
            TypeKind::NoReturn => self.buf.push_str("Nn"),
            TypeKind::Error => {}
        }
    }
}
