// This module implements the symbol side of the encoder. mangle_symbol dispatches on the
// symbol kind: overrides are emitted verbatim, unique functions get their exact mangling,
// overloaded ones fall back to the name shared by the overload set, function aliases and
// single-entry overload sets resolve through to their target, variables take the generic
// declaration path, a handful of compiler-reserved aggregates are mangled without their
// parent scope, and template instances delegate to the template encoder. Declarations with
// foreign linkage at module scope bypass the native scheme and use their bare identifier or
// the C++ collaborator. The parent chain is emitted outermost first; enclosing functions add
// their parameter list so overloaded scopes stay distinct, anonymous scopes write a single
// `0`, and a nonzero local number appends a synthetic `__S<n>` scope. Identifiers go through
// the identifier back-reference table and the output length limit.

//! Symbol encoder and parent chain.

use super::Mangler;
use crate::core::MangleError;
use crate::entity::{
    EntryPoint, FileType, Identifier, Linkage, Mod, SymbolId, SymbolKind, SymbolTable, TypeKind,
};

/// Namespace for declarations of imported C modules.
const IMPORT_C: &str = "__C";

/// Signature written for functions whose type never got resolved.
const ERROR_SIGNATURE: &str = "9__error__FZ";

/// Prefix of every natively mangled declaration.
const DECL_PREFIX: &str = "_D";

/// Aggregates whose names must not depend on the declaring scope.
fn is_reserved_aggregate(symbols: &SymbolTable, s: SymbolId) -> bool {
    let sym = symbols.get(s);
    let Some(id) = &sym.ident else {
        return false;
    };
    let in_object = sym.parent.is_some_and(|p| {
        let parent = symbols.get(p);
        parent.as_module().is_some() && parent.ident.as_ref().is_some_and(|i| i.as_str() == "object")
    });
    match id.as_str() {
        "Exception" | "Object" => in_object,
        "ModuleInfo" | "TypeInfo" => true,
        name => name.starts_with("TypeInfo_"),
    }
}

impl<'s> Mangler<'s> {
    /// Dispatch on the symbol kind.
    pub(crate) fn mangle_symbol(&mut self, s: SymbolId) {
        let symbols = self.symbols;
        let sym = symbols.get(s);

        if let Some(mangled) = &sym.mangle_override {
            self.push_verbatim(mangled);
            return;
        }

        match &sym.kind {
            SymbolKind::Function(fd) => {
                if fd.has_overloads {
                    self.visit_dsymbol(s, false);
                } else {
                    self.mangle_exact(s);
                }
            }
            SymbolKind::FuncAlias(fa) => {
                let target_is_alias = matches!(symbols.get(fa.target).kind, SymbolKind::FuncAlias(_));
                if target_is_alias {
                    self.mangle_symbol(fa.target);
                } else if !fa.has_overloads {
                    self.mangle_exact(fa.target);
                } else {
                    self.visit_dsymbol(s, false);
                }
            }
            SymbolKind::OverloadSet(od) => {
                if od.has_next {
                    self.visit_dsymbol(s, false);
                    return;
                }
                match &symbols.get(od.aliassym).kind {
                    SymbolKind::Function(fd) if !fd.has_overloads => self.mangle_exact(od.aliassym),
                    SymbolKind::TemplateDecl(td) if !td.has_next => self.mangle_symbol(od.aliassym),
                    _ => self.visit_dsymbol(s, false),
                }
            }
            SymbolKind::Variable(_) => self.visit_declaration(s),
            SymbolKind::Aggregate(_) => {
                let skip_parent = is_reserved_aggregate(symbols, s);
                self.visit_dsymbol(s, skip_parent);
            }
            SymbolKind::TemplateInstance(_) => self.visit_template_instance(s),
            SymbolKind::Module { .. }
            | SymbolKind::TemplateDecl(_)
            | SymbolKind::Alias(_)
            | SymbolKind::Scope => self.visit_dsymbol(s, false),
        }
    }

    /// Exact mangling of one function, sharing this request's tables.
    pub(crate) fn mangle_exact(&mut self, s: SymbolId) {
        let sym = self.symbols.get(s);
        if let Some(mangled) = &sym.mangle_override {
            self.push_verbatim(mangled);
            return;
        }
        if let SymbolKind::Function(fd) = &sym.kind {
            match fd.entry {
                EntryPoint::Main => {
                    self.buf.push_str("_Dmain");
                    return;
                }
                EntryPoint::WinMain | EntryPoint::DllMain => {
                    self.buf.push_str(sym.name());
                    return;
                }
                EntryPoint::None => {}
            }
        }
        self.visit_declaration(s);
    }

    /// Foreign-linkage name, or the native `_D` encoding.
    fn visit_declaration(&mut self, s: SymbolId) {
        if let Some(id) = self.externally_mangled_identifier(s) {
            self.push_verbatim(&id);
            return;
        }
        self.buf.push_str(DECL_PREFIX);
        self.mangle_decl(s);
    }

    /// Parent chain, identifier, then signature or type.
    fn mangle_decl(&mut self, s: SymbolId) {
        let symbols = self.symbols;
        let sym = symbols.get(s);

        self.mangle_parent(s);
        match &sym.ident {
            Some(id) => self.mangle_identifier(id, s),
            None => self.to_buffer(sym.name(), s),
        }

        if sym.as_function().is_some() {
            self.mangle_func(s, false);
        } else if let Some(ty) = sym.decl_type() {
            self.mangle_type(ty);
        } else {
            // Semantic analysis types every declaration before it is mangled.
            panic!(
                "internal error: untyped {} `{}` reached the mangler",
                sym.kind_name(),
                symbols.pretty_name(s)
            );
        }
    }

    /// Signature of a function; in parent position only its parameters.
    fn mangle_func(&mut self, s: SymbolId, in_parent: bool) {
        let symbols = self.symbols;
        let Some(fd) = symbols.get(s).as_function() else {
            return;
        };
        if fd.needs_this || fd.is_nested {
            self.buf.push('M');
        }

        let ty = match &fd.ty {
            Some(ty) if !ty.is_error() => ty,
            _ => {
                // Failed speculative compilation can leave a function untyped.
                self.buf.push_str(ERROR_SIGNATURE);
                return;
            }
        };

        match &ty.kind {
            TypeKind::Function(tf) if in_parent => {
                let tfo = fd
                    .original_ty
                    .as_ref()
                    .and_then(|t| t.as_function())
                    .unwrap_or(tf);
                // No return type, so the re-entrancy guard cannot trigger.
                let written = self.mangle_func_type(tf, ty.mods, tfo, Mod::NONE, None);
                debug_assert!(written.is_ok());
            }
            _ => self.mangle_type(ty),
        }
    }

    /// Emit the scopes enclosing `s`, outermost first.
    pub(crate) fn mangle_parent(&mut self, s: SymbolId) {
        let symbols = self.symbols;
        let sym = symbols.get(s);

        let parent = match &sym.kind {
            SymbolKind::TemplateInstance(ti) if !ti.is_mixin => {
                ti.tempdecl.and_then(|td| symbols.get(td).parent)
            }
            _ => sym.parent,
        };
        let Some(p) = parent else {
            return;
        };

        let mut local_num = sym.local_num;
        self.mangle_parent(p);

        let psym = symbols.get(p);
        match &psym.kind {
            SymbolKind::TemplateInstance(ti) if !ti.is_mixin => {
                if let Some(td) = ti.tempdecl {
                    local_num = symbols.get(td).local_num;
                }
                self.mangle_template_instance(p);
            }
            _ => match &psym.ident {
                Some(id) => {
                    self.mangle_identifier(id, p);
                    if psym.as_function().is_some() {
                        self.mangle_func(p, true);
                    }
                }
                None => self.buf.push('0'),
            },
        }

        if local_num != 0 {
            self.write_local_parent(local_num);
        }
    }

    /// Synthetic scope `<len>__S<n>` separating same-named declarations.
    fn write_local_parent(&mut self, local_num: u32) {
        let name = format!("__S{}", local_num);
        self.buf.push_length_prefixed(&name);
    }

    /// Identifier, or a back-reference to its first occurrence.
    pub(crate) fn mangle_identifier(&mut self, id: &Identifier, s: SymbolId) {
        if self.backref.add_ref_to_identifier(&mut self.buf, id) {
            log::trace!("identifier back-reference for {}", id);
            self.session.record_ident_backref();
            return;
        }
        self.to_buffer(id.as_str(), s);
    }

    /// Length-prefixed text, unless it would exceed the output limit.
    pub(crate) fn to_buffer(&mut self, text: &str, s: SymbolId) {
        let length = self.buf.len() + text.len();
        if length >= self.session.options().max_output_len {
            let sym = self.symbols.get(s);
            self.session.report(
                sym.loc,
                MangleError::ExcessiveLength {
                    kind: sym.kind_name(),
                    name: self.symbols.pretty_name(s),
                    length,
                },
            );
            return;
        }
        self.buf.push_length_prefixed(text);
    }

    /// Any named symbol: parent chain and identifier.
    pub(crate) fn visit_dsymbol(&mut self, s: SymbolId, skip_parent: bool) {
        let symbols = self.symbols;
        let sym = symbols.get(s);

        if !skip_parent {
            if let (Some(p), Some(id)) = (sym.parent, &sym.ident) {
                if symbols.get(p).as_module() == Some(FileType::C) {
                    // Same mangling whichever module declares the C type.
                    self.mangle_identifier(&Identifier::new(IMPORT_C), s);
                    self.mangle_identifier(id, s);
                    return;
                }
            }
            self.mangle_parent(s);
        }

        match &sym.ident {
            Some(id) => self.mangle_identifier(id, s),
            None => self.to_buffer(sym.name(), s),
        }
    }

    /// Name used instead of the native scheme for foreign-linkage declarations.
    pub(crate) fn externally_mangled_identifier(&mut self, s: SymbolId) -> Option<String> {
        let symbols = self.symbols;
        let sym = symbols.get(s);
        let linkage = sym.linkage;

        let at_module_scope = symbols
            .to_parent(s)
            .map_or(true, |p| symbols.get(p).as_module().is_some());
        let c_extern = linkage == Linkage::C
            && match &sym.kind {
                SymbolKind::Function(fd) => fd.is_csymbol,
                SymbolKind::Variable(vd) => vd.is_csymbol && vd.is_dataseg && vd.is_extern,
                _ => false,
            };

        if !(at_module_scope || linkage == Linkage::Cpp || c_extern) {
            return None;
        }

        if linkage != Linkage::D && sym.local_num != 0 {
            self.session.report(
                sym.loc,
                MangleError::MultipleScopesForeignLinkage {
                    kind: sym.kind_name(),
                    name: symbols.pretty_name(s),
                },
            );
        }

        match linkage {
            Linkage::D => None,
            Linkage::C | Linkage::Windows | Linkage::ObjC => Some(sym.name().to_string()),
            Linkage::Cpp => match self.session.foreign() {
                Some(foreign) => Some(foreign.mangle_cpp(symbols, s)),
                None => {
                    log::warn!(
                        "no C++ mangler configured, using bare name for {}",
                        symbols.pretty_name(s)
                    );
                    Some(sym.name().to_string())
                }
            },
            Linkage::Default => {
                self.session.report(
                    sym.loc,
                    MangleError::ForwardDeclaration {
                        kind: sym.kind_name(),
                        name: symbols.pretty_name(s),
                    },
                );
                Some(sym.name().to_string())
            }
            Linkage::System => panic!("system linkage must be resolved before mangling"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_utils::test::Fixture;
    use crate::entity::{AggregateKind, Symbol, Type, VarDecl};

    #[test]
    fn test_reserved_aggregates() {
        let mut fx = Fixture::new();
        let object = fx.module("object");
        let app = fx.module("app");
        let exc = fx.aggregate(object, "Exception", AggregateKind::Class);
        let app_exc = fx.aggregate(app, "Exception", AggregateKind::Class);
        let ti = fx.aggregate(app, "TypeInfo_Foo", AggregateKind::Class);
        let plain = fx.aggregate(app, "Widget", AggregateKind::Struct);

        assert!(is_reserved_aggregate(&fx.table, exc));
        assert!(!is_reserved_aggregate(&fx.table, app_exc));
        assert!(is_reserved_aggregate(&fx.table, ti));
        assert!(!is_reserved_aggregate(&fx.table, plain));

        assert_eq!(fx.symbol(exc), "9Exception");
        assert_eq!(fx.symbol(app_exc), "3app9Exception");
        assert_eq!(fx.symbol(ti), "12TypeInfo_Foo");
    }

    #[test]
    fn test_anonymous_parent_writes_zero() {
        let mut fx = Fixture::new();
        let app = fx.module("app");
        let anon = fx.table.add(Symbol::new(None, SymbolKind::Scope).in_scope(app));
        let s = fx.aggregate(anon, "S", AggregateKind::Struct);
        assert_eq!(fx.symbol(s), "3app01S");
    }

    #[test]
    fn test_local_number_parent() {
        let mut fx = Fixture::new();
        let app = fx.module("app");
        let s = fx.aggregate(app, "S", AggregateKind::Struct);
        fx.table.get_mut(s).local_num = 3;
        assert_eq!(fx.symbol(s), "3app4__S31S");

        fx.table.get_mut(s).local_num = 12;
        assert_eq!(fx.symbol(s), "3app5__S121S");
    }

    #[test]
    fn test_import_c_namespace() {
        let mut fx = Fixture::new();
        let c_mod = fx.table.add(Symbol::new(
            Some("stdio"),
            SymbolKind::Module { file_type: FileType::C },
        ));
        let file = fx.aggregate(c_mod, "FILE", AggregateKind::Struct);
        assert_eq!(fx.symbol(file), "3__C4FILE");
    }

    #[test]
    fn test_excessive_length_is_reported() {
        let mut fx = Fixture::new();
        let app = fx.module("app");
        let s = fx.aggregate(app, "VeryLongName", AggregateKind::Struct);
        let (out, errors) = fx.symbol_with_limit(s, 8);
        assert_eq!(out, "3app");
        assert!(matches!(errors[0], MangleError::ExcessiveLength { length: 16, .. }));
    }

    #[test]
    fn test_exact_matches_symbol_for_plain_declaration() {
        let mut fx = Fixture::new();
        let app = fx.module("app");
        let count = fx.variable(app, "count", Type::int());
        assert_eq!(fx.exact(count), "_D3app5counti");
        assert_eq!(fx.symbol(count), fx.exact(count));
    }

    #[test]
    #[should_panic(expected = "internal error: untyped variable `app.x`")]
    fn test_untyped_variable_is_an_internal_error() {
        let mut fx = Fixture::new();
        let app = fx.module("app");
        let x = fx
            .table
            .add(Symbol::new(Some("x"), SymbolKind::Variable(VarDecl::default())).in_scope(app));
        fx.symbol(x);
    }
}
