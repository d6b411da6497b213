// This module encodes template instances. An instance is written as `__T` (or `__U` for
// instances created while checking a template constraint), the template's identifier, one
// encoding per argument and a closing `Z`. Arguments are classified in a fixed order: a
// position whose parameter has a specialization gets an `H` marker, types are `T` plus the
// type, value expressions are folded and then either reclassified as symbol arguments (for
// variables, `this` and function literals) or evaluated and written as `V`, the type and the
// value. Symbol arguments resolve through aliases and use the raw override or the foreign
// name under `X` when one applies, otherwise `S` and the symbol's own mangling. A sequence
// argument is always last and its elements are spliced into the argument list in place.
// Malformed arguments are reported and skipped so the rest of the instance still encodes.

//! Template-instance encoder.

use super::Mangler;
use crate::core::MangleError;
use crate::entity::{Expr, ExprKind, Mod, SymbolId, SymbolKind, TemplateArg};

impl<'s> Mangler<'s> {
    /// Symbol-position template instance: parent chain, then the instance.
    pub(crate) fn visit_template_instance(&mut self, s: SymbolId) {
        let symbols = self.symbols;
        let sym = symbols.get(s);
        let Some(ti) = sym.as_template_instance() else {
            return;
        };
        if ti.tempdecl.is_none() {
            self.session.report(
                sym.loc,
                MangleError::TemplateNotDefined {
                    name: symbols.pretty_name(s),
                },
            );
            return;
        }

        self.mangle_parent(s);
        match (&sym.ident, ti.is_mixin) {
            (Some(id), true) => self.mangle_identifier(id, s),
            _ => self.mangle_template_instance(s),
        }
    }

    /// `__T`/`__U`, template identifier, arguments, `Z`.
    pub(crate) fn mangle_template_instance(&mut self, s: SymbolId) {
        let symbols = self.symbols;
        let sym = symbols.get(s);
        let Some(ti) = sym.as_template_instance() else {
            return;
        };
        let Some(td_id) = ti.tempdecl else {
            self.session.report(
                sym.loc,
                MangleError::TemplateNotDefined {
                    name: symbols.pretty_name(s),
                },
            );
            return;
        };
        let td_sym = symbols.get(td_id);
        let params: &[_] = td_sym.as_template_decl().map_or(&[], |td| &td.params);
        let nparams = td_sym.as_template_decl().map_or(0, |td| td.non_variadic_count());

        self.buf.push_str(if ti.has_members { "__T" } else { "__U" });
        match &td_sym.ident {
            Some(id) => self.mangle_identifier(id, td_id),
            None => self.to_buffer(td_sym.name(), td_id),
        }

        let mut args: &[TemplateArg] = &ti.args;
        let mut i = 0;
        while i < args.len() {
            let arg = &args[i];
            if i < nparams && params[i].has_specialization {
                self.buf.push('H');
            }
            if let TemplateArg::Tuple(items) = arg {
                assert!(
                    i + 1 == args.len(),
                    "sequence argument of `{}` must be last",
                    symbols.pretty_name(s)
                );
                args = items;
                i = 0;
                continue;
            }
            self.mangle_template_arg(s, arg);
            i += 1;
        }
        self.buf.push('Z');
    }

    fn mangle_template_arg(&mut self, ti: SymbolId, arg: &TemplateArg) {
        match arg {
            TemplateArg::Type(t) => {
                self.buf.push('T');
                self.visit_with_mask(t, Mod::NONE);
            }
            TemplateArg::Expr(e) => self.mangle_value_arg(ti, e),
            TemplateArg::Symbol(sa) => self.mangle_symbol_arg(ti, *sa),
            // spliced by the caller
            TemplateArg::Tuple(_) => {}
        }
    }

    fn mangle_value_arg(&mut self, ti: SymbolId, e: &Expr) {
        let folder = self.session.folder();
        // It may still turn out to be an alias parameter, so only fold.
        let ea = folder.optimize(e);
        match ea.kind {
            ExprKind::Var(sa) | ExprKind::This(sa) | ExprKind::FuncLiteral(sa) => {
                return self.mangle_symbol_arg(ti, sa);
            }
            _ => {}
        }

        self.buf.push('V');
        if let ExprKind::Tuple(_) = ea.kind {
            self.session.report(ea.loc, MangleError::SequenceValueArgument);
            return;
        }

        let Some(value) = folder.evaluate(&ea) else {
            log::debug!("value argument `{}` did not evaluate", ea);
            return;
        };
        if value.is_error() {
            return;
        }

        // Same type encoding as a function parameter would get.
        self.visit_with_mask(&value.ty, Mod::NONE);
        self.mangle_value(&value);
    }

    fn mangle_symbol_arg(&mut self, ti: SymbolId, sa: SymbolId) {
        let symbols = self.symbols;
        let sa = symbols.to_alias(sa);
        let sym = symbols.get(sa);

        if sym.is_declaration() && !matches!(sym.kind, SymbolKind::OverloadSet(_)) {
            let d = match sym.kind {
                SymbolKind::FuncAlias(_) => symbols.to_alias_func(sa),
                _ => sa,
            };
            let dsym = symbols.get(d);

            if let Some(mangled) = &dsym.mangle_override {
                self.verbatim = true;
                self.buf.push('X');
                self.to_buffer(mangled, d);
                return;
            }
            if let Some(id) = self.externally_mangled_identifier(d) {
                self.verbatim = true;
                self.buf.push('X');
                self.to_buffer(&id, d);
                return;
            }
            if dsym.decl_type().is_none() {
                let tisym = symbols.get(ti);
                self.session.report(
                    tisym.loc,
                    MangleError::ForwardReference {
                        instance: symbols.pretty_name(ti),
                        kind: dsym.kind_name(),
                        name: dsym.name().to_string(),
                    },
                );
                return;
            }
        }

        self.buf.push('S');
        self.mangle_symbol(sa);
    }
}

#[cfg(test)]
mod tests {
    use crate::core::test_utils::test::Fixture;
    use crate::core::MangleError;
    use crate::entity::{AggregateKind, BasicType, Expr, ExprKind, TemplateArg, Type};

    #[test]
    fn test_type_arguments() {
        let mut fx = Fixture::new();
        let app = fx.module("app");
        let td = fx.template(app, "Box", &[("T", false)]);
        let ti = fx.instance(td, vec![TemplateArg::Type(Type::int())]);
        assert_eq!(fx.template_instance(ti), "__T3BoxTiZ");
        assert_eq!(fx.symbol(ti), "3app__T3BoxTiZ");
    }

    #[test]
    fn test_constraint_instance_uses_u() {
        let mut fx = Fixture::new();
        let app = fx.module("app");
        let td = fx.template(app, "isGood", &[("T", false)]);
        let ti = fx.instance(td, vec![TemplateArg::Type(Type::basic(BasicType::Char))]);
        fx.instance_mut(ti).has_members = false;
        assert_eq!(fx.template_instance(ti), "__U6isGoodTaZ");
    }

    #[test]
    fn test_specialized_parameter_marker() {
        let mut fx = Fixture::new();
        let app = fx.module("app");
        let td = fx.template(app, "Pair", &[("A", true), ("B", false)]);
        let ti = fx.instance(td, vec![TemplateArg::Type(Type::int()), TemplateArg::Type(Type::int())]);
        assert_eq!(fx.template_instance(ti), "__T4PairHTiTiZ");
    }

    #[test]
    fn test_value_argument() {
        let mut fx = Fixture::new();
        let app = fx.module("app");
        let td = fx.template(app, "Fix", &[("n", false)]);
        let ti = fx.instance(td, vec![TemplateArg::Expr(Expr::integer(42, Type::int()))]);
        assert_eq!(fx.template_instance(ti), "__T3FixVii42Z");

        let neg = fx.instance(td, vec![TemplateArg::Expr(Expr::integer(-7, Type::int()))]);
        assert_eq!(fx.template_instance(neg), "__T3FixViN7Z");
    }

    #[test]
    fn test_sequence_value_is_reported() {
        let mut fx = Fixture::new();
        let app = fx.module("app");
        let td = fx.template(app, "Fix", &[("n", false)]);
        let seq = Expr::new(ExprKind::Tuple(vec![]), Type::void());
        let ti = fx.instance(td, vec![TemplateArg::Expr(seq), TemplateArg::Type(Type::int())]);
        let (out, errors) = fx.template_instance_reporting(ti);
        assert_eq!(out, "__T3FixVTiZ");
        assert_eq!(errors, vec![MangleError::SequenceValueArgument]);
    }

    #[test]
    fn test_unevaluated_value_is_skipped() {
        let mut fx = Fixture::new();
        let app = fx.module("app");
        let td = fx.template(app, "Fix", &[("n", false)]);
        let runtime = Expr::new(ExprKind::Other("readln()".into()), Type::int());
        let ti = fx.instance(td, vec![TemplateArg::Expr(runtime), TemplateArg::Type(Type::int())]);
        assert_eq!(fx.template_instance(ti), "__T3FixVTiZ");
    }

    #[test]
    fn test_tuple_is_spliced() {
        let mut fx = Fixture::new();
        let app = fx.module("app");
        let td = fx.template(app, "Seq", &[("T", false)]);
        let ti = fx.instance(
            td,
            vec![
                TemplateArg::Type(Type::int()),
                TemplateArg::Tuple(vec![
                    TemplateArg::Type(Type::basic(BasicType::Char)),
                    TemplateArg::Expr(Expr::integer(1, Type::int())),
                ]),
            ],
        );
        assert_eq!(fx.template_instance(ti), "__T3SeqTiTaVii1Z");
    }

    #[test]
    #[should_panic(expected = "must be last")]
    fn test_tuple_not_last_panics() {
        let mut fx = Fixture::new();
        let app = fx.module("app");
        let td = fx.template(app, "Seq", &[("T", false)]);
        let ti = fx.instance(
            td,
            vec![TemplateArg::Tuple(vec![]), TemplateArg::Type(Type::int())],
        );
        fx.template_instance(ti);
    }

    #[test]
    fn test_symbol_argument() {
        let mut fx = Fixture::new();
        let app = fx.module("app");
        let s = fx.aggregate(app, "S", AggregateKind::Struct);
        let td = fx.template(app, "Wrap", &[("alias a", false)]);
        let ti = fx.instance(td, vec![TemplateArg::Symbol(s)]);
        assert_eq!(fx.template_instance(ti), "__T4WrapS3app1SZ");
    }

    #[test]
    fn test_variable_reference_becomes_symbol() {
        let mut fx = Fixture::new();
        let app = fx.module("app");
        let x = fx.variable(app, "x", Type::int());
        let td = fx.template(app, "Wrap", &[("alias a", false)]);
        let var = Expr::new(ExprKind::Var(x), Type::int());
        let ti = fx.instance(td, vec![TemplateArg::Expr(var)]);
        assert_eq!(fx.template_instance(ti), "__T4WrapS_D3app1xiZ");
    }

    #[test]
    fn test_forward_reference_is_reported() {
        let mut fx = Fixture::new();
        let app = fx.module("app");
        let f = fx.function(app, "x", None);
        let inner = fx.function(f, "y", None);
        let td = fx.template(app, "Wrap", &[("alias a", false)]);
        let ti = fx.instance(td, vec![TemplateArg::Symbol(inner)]);
        let (out, errors) = fx.template_instance_reporting(ti);
        assert_eq!(out, "__T4WrapZ");
        assert!(matches!(&errors[0], MangleError::ForwardReference { kind: "function", name, .. } if name == "y"));
    }

    #[test]
    fn test_override_argument() {
        let mut fx = Fixture::new();
        let app = fx.module("app");
        let x = fx.variable(app, "x", Type::int());
        fx.table.get_mut(x).mangle_override = Some("custom".into());
        let td = fx.template(app, "Wrap", &[("alias a", false)]);
        let ti = fx.instance(td, vec![TemplateArg::Symbol(x)]);
        assert_eq!(fx.template_instance(ti), "__T4WrapX6customZ");
    }

    #[test]
    fn test_undefined_template_is_reported() {
        let mut fx = Fixture::new();
        let app = fx.module("app");
        let td = fx.template(app, "Box", &[("T", false)]);
        let ti = fx.instance(td, vec![]);
        fx.instance_mut(ti).tempdecl = None;
        let (out, errors) = fx.symbol_reporting(ti);
        assert_eq!(out, "");
        assert!(matches!(errors[0], MangleError::TemplateNotDefined { .. }));
    }
}
