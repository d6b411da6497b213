// This module encodes function signatures and their parameters. The emission order is fixed:
// qualifier prefix, linkage tag, attribute flags (pure, nothrow, ref, property, @nogc, the
// combined scope/return flags, @live, trust), one encoding per parameter, the end-of-list
// tag chosen by the variadic style, and the return type when one was requested. Parameter
// storage classes first go through the scope/return combination table, whose byte orders
// are a fixed ABI rule rather than anything derivable, and the remaining in/out/ref/lazy flag
// selects a single tag. Inferred scope and return flags are never mangled. A re-entrancy
// guard turns a self-referential signature into an error for the caller instead of an
// unbounded recursion.

//! Function-type and parameter encoder.

use super::Mangler;
use crate::core::{MangleError, MangleResult};
use crate::entity::{FunctionType, Linkage, Mod, Parameter, Stc, Trust, Type, VarArg};

/// Observable combinations of `ref`, `scope` and `return` on a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScopeRef {
    None,
    Scope,
    Ref,
    Return,
    RefScope,
    /// `return scope`
    ReturnScope,
    /// `return ref`
    ReturnRef,
    /// `ref return scope`
    RefReturnScope,
    /// `return ref scope`
    ReturnRefScope,
}

impl ScopeRef {
    /// Classify a storage class with inferred flags already removed.
    pub(crate) fn build(stc: Stc) -> ScopeRef {
        let is_ref = stc.intersects(Stc::REF | Stc::OUT);
        let is_scope = stc.contains(Stc::SCOPE);
        let is_return = stc.contains(Stc::RETURN);
        match (is_ref, is_scope, is_return) {
            (false, false, false) => ScopeRef::None,
            (false, true, false) => ScopeRef::Scope,
            (true, false, false) => ScopeRef::Ref,
            (false, false, true) => ScopeRef::Return,
            (true, true, false) => ScopeRef::RefScope,
            (false, true, true) => ScopeRef::ReturnScope,
            (true, false, true) => ScopeRef::ReturnRef,
            (true, true, true) if stc.contains(Stc::RETURN_SCOPE) => ScopeRef::RefReturnScope,
            (true, true, true) => ScopeRef::ReturnRefScope,
        }
    }

    /// Combined code, for the combinations that have one.
    ///
    /// `return ref` and `ref return scope` put return first; `scope return ref`
    /// puts scope first.
    pub(crate) fn code(self, is_out: bool) -> Option<&'static str> {
        match self {
            ScopeRef::None
            | ScopeRef::Scope
            | ScopeRef::Ref
            | ScopeRef::Return
            | ScopeRef::RefScope => None,
            ScopeRef::ReturnScope => Some("NkM"),
            ScopeRef::ReturnRef => Some(if is_out { "NkJ" } else { "NkK" }),
            ScopeRef::ReturnRefScope => Some(if is_out { "MNkJ" } else { "MNkK" }),
            ScopeRef::RefReturnScope => Some(if is_out { "NkMJ" } else { "NkMK" }),
        }
    }
}

/// Linkage tag of a function type.
pub(crate) fn linkage_code(linkage: Linkage) -> char {
    match linkage {
        Linkage::Default | Linkage::D => 'F',
        Linkage::C => 'U',
        Linkage::Windows => 'W',
        Linkage::Cpp => 'R',
        Linkage::ObjC => 'Y',
        Linkage::System => panic!("system linkage must be resolved before mangling"),
    }
}

impl<'s> Mangler<'s> {
    /// Encode a function type.
    ///
    /// `ta` supplies the attributes; it differs from `t` only when mangling a
    /// function in parent position, where the attributes as written are used.
    /// With `tret` absent only the parameter list is written.
    pub(crate) fn mangle_func_type(
        &mut self,
        t: &FunctionType,
        mods: Mod,
        ta: &FunctionType,
        mod_mask: Mod,
        tret: Option<&Type>,
    ) -> MangleResult<()> {
        let key = t as *const FunctionType;
        if tret.is_some() && self.in_use.contains(&key) {
            return Err(MangleError::RecursiveSignature {
                name: Type::function(t.clone()).to_string(),
            });
        }
        self.in_use.push(key);

        if mod_mask != mods {
            self.buf.push_str(super::types::mod_code(mods));
        }
        self.buf.push(linkage_code(t.linkage));

        let attrs = &ta.attrs;
        if attrs.purity {
            self.buf.push_str("Na");
        }
        if attrs.nothrow {
            self.buf.push_str("Nb");
        }
        if attrs.is_ref {
            self.buf.push_str("Nc");
        }
        if attrs.property {
            self.buf.push_str("Nd");
        }
        if attrs.nogc {
            self.buf.push_str("Ni");
        }

        if attrs.return_scope && attrs.is_return && !attrs.return_inferred {
            self.buf.push_str("NjNl");
        } else {
            // with `return ref` the order is `scope return`
            if attrs.scope && !attrs.scope_inferred {
                self.buf.push_str("Nl");
            }
            if attrs.is_return && !attrs.return_inferred {
                self.buf.push_str("Nj");
            }
        }

        if attrs.live {
            self.buf.push_str("Nm");
        }

        match attrs.trust {
            Trust::Trusted => self.buf.push_str("Ne"),
            Trust::Safe => self.buf.push_str("Nf"),
            Trust::Default | Trust::System => {}
        }

        for param in &t.params {
            self.mangle_parameter(param);
        }
        self.buf.push(match t.varargs {
            VarArg::None => 'Z',
            VarArg::Variadic => 'Y',
            VarArg::Typesafe => 'X',
        });

        if let Some(tret) = tret {
            self.visit_with_mask(tret, Mod::NONE);
        }

        self.in_use.pop();
        Ok(())
    }

    /// Qualifier prefix followed by the full function type.
    pub(crate) fn mangle_func_signature(&mut self, ty: &Type, tf: &FunctionType) {
        self.buf.push_str(super::types::mod_code(ty.mods));
        if let Err(err) = self.mangle_func_type(tf, ty.mods, tf, ty.mods, tf.next.as_deref()) {
            self.session.report(Default::default(), err);
        }
    }

    /// Encode one parameter: storage class, then its type.
    pub(crate) fn mangle_parameter(&mut self, p: &Parameter) {
        let mut stc = p.explicit_stc();

        let is_out = stc.contains(Stc::OUT);
        if let Some(code) = ScopeRef::build(stc).code(is_out) {
            self.buf.push_str(code);
            stc = stc & !(Stc::OUT | Stc::SCOPE | Stc::REF | Stc::RETURN);
        }

        if stc.contains(Stc::SCOPE) {
            self.buf.push('M');
        }
        if stc.contains(Stc::RETURN) {
            self.buf.push_str("Nk");
        }

        match stc & (Stc::IN | Stc::OUT | Stc::REF | Stc::LAZY) {
            Stc::NONE => {}
            Stc::IN => self.buf.push('I'),
            Stc::OUT => self.buf.push('J'),
            Stc::REF => self.buf.push('K'),
            Stc::LAZY => self.buf.push('L'),
            io if io == Stc::IN | Stc::REF => self.buf.push_str("IK"),
            io => panic!("invalid parameter storage class {:#x}", io.bits()),
        }

        let mask = if stc.contains(Stc::IN) { Mod::CONST } else { Mod::NONE };
        self.visit_with_mask(&p.ty, mask);
    }
}
