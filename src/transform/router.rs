// src/transform/router.rs
use swc_common::Spanned;
use swc_ecma_ast::*;

use super::ChangeLog;
use crate::parser::SourceContext;

const ROUTER: &str = "router";

const ROUTER_HOOKS: &str =
    "const navigate = useNavigate();\nconst params = useParams();\nconst location = useLocation();";

/// Navigation methods of the Next.js router that map onto `navigate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterMethod {
    Push,
    Replace,
    Back,
}

impl RouterMethod {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "push" => Some(RouterMethod::Push),
            "replace" => Some(RouterMethod::Replace),
            "back" => Some(RouterMethod::Back),
            _ => None,
        }
    }
}

/// `router.<prop>` → `prop`.
fn router_property(expr: &Expr) -> Option<&str> {
    let Expr::Member(MemberExpr {
        obj,
        prop: MemberProp::Ident(prop),
        ..
    }) = expr
    else {
        return None;
    };
    matches!(&**obj, Expr::Ident(ident) if &*ident.sym == ROUTER).then_some(&*prop.sym)
}

fn navigate(span: swc_common::Span) -> Callee {
    Callee::Expr(Box::new(Expr::Ident(Ident::new("navigate".into(), span))))
}

/// Rewrites `router.push|replace|back(...)`. Returns whether the call was a
/// router navigation, in which case its callee must not be visited again.
pub(crate) fn rewrite_call(call: &mut CallExpr, ctx: &SourceContext, log: &mut ChangeLog) -> bool {
    let Callee::Expr(callee) = &call.callee else {
        return false;
    };
    let Some(method) = router_property(callee).and_then(RouterMethod::from_name) else {
        return false;
    };
    let span = callee.span();

    match method {
        RouterMethod::Push | RouterMethod::Replace if call.args.is_empty() => {
            log.warn("router navigation without a target left unchanged");
            return true;
        }
        RouterMethod::Push => {
            if call.args.len() > 1 {
                call.args.truncate(1);
                log.warn("router.push() `as` and options arguments dropped");
            }
            call.callee = navigate(span);
            log.change("router.push() converted to navigate()");
        }
        RouterMethod::Replace => {
            let Some(options) = log.built(ctx.parse_expr("({ replace: true })")) else {
                return true;
            };
            if call.args.len() > 1 {
                log.warn("router.replace() `as` and options arguments dropped");
            }
            call.args.truncate(1);
            call.args.push(ExprOrSpread {
                spread: None,
                expr: options,
            });
            call.callee = navigate(span);
            log.change("router.replace() converted to navigate(path, { replace: true })");
        }
        RouterMethod::Back => {
            let Some(delta) = log.built(ctx.parse_expr("-1")) else {
                return true;
            };
            call.args = vec![ExprOrSpread {
                spread: None,
                expr: delta,
            }];
            call.callee = navigate(span);
            log.change("router.back() converted to navigate(-1)");
        }
    }
    true
}

/// Rewrites `router.query` and `router.pathname|asPath`; any other router
/// member is reported.
pub(crate) fn rewrite_member(expr: &mut Expr, ctx: &SourceContext, log: &mut ChangeLog) {
    let Some(property) = router_property(expr).map(str::to_string) else {
        return;
    };
    let span = expr.span();

    match property.as_str() {
        "query" => {
            *expr = Expr::Ident(Ident::new("params".into(), span));
            log.change("router.query converted to params");
        }
        "pathname" | "asPath" => {
            let Some(mut location) = log.built(ctx.parse_expr("location.pathname")) else {
                return;
            };
            if let Expr::Member(member) = &mut *location {
                member.span = span;
            }
            *expr = *location;
            log.change(format!("router.{property} converted to location.pathname"));
        }
        "push" | "replace" | "back" => {
            log.warn(format!("router.{property} used without being called; left unchanged"))
        }
        other => log.warn(format!(
            "router.{other} has no react-router-dom equivalent; left unchanged"
        )),
    }
}

/// `router = <use_router>()`, with or without a type annotation.
pub(crate) fn is_router_declarator(decl: &VarDeclarator, use_router: &str) -> bool {
    let Pat::Ident(BindingIdent { id, .. }) = &decl.name else {
        return false;
    };
    if &*id.sym != ROUTER {
        return false;
    }
    let Some(Expr::Call(CallExpr {
        callee: Callee::Expr(callee),
        args,
        ..
    })) = decl.init.as_deref()
    else {
        return false;
    };
    args.is_empty() && matches!(&**callee, Expr::Ident(ident) if &*ident.sym == use_router)
}

pub(crate) fn declares_router(var: &VarDecl, use_router: &str) -> bool {
    var.decls.iter().any(|decl| is_router_declarator(decl, use_router))
}

/// Replaces each `router = useRouter()` declarator with the three hook
/// declarations. Declarators before and after it stay in declarations of
/// their own, in their original order.
pub(crate) fn expand_declaration(
    mut var: VarDecl,
    use_router: &str,
    ctx: &SourceContext,
    log: &mut ChangeLog,
) -> Vec<Stmt> {
    let Some(items) = log.built(ctx.parse_items(ROUTER_HOOKS)) else {
        return vec![Stmt::Decl(Decl::Var(Box::new(var)))];
    };
    let hooks: Vec<Stmt> = items
        .into_iter()
        .filter_map(|item| match item {
            ModuleItem::Stmt(stmt) => Some(stmt),
            ModuleItem::ModuleDecl(_) => None,
        })
        .collect();

    let decls = std::mem::take(&mut var.decls);
    let mut out = Vec::new();
    let mut pending = Vec::new();
    for decl in decls {
        if is_router_declarator(&decl, use_router) {
            flush(&mut out, &var, &mut pending);
            out.extend(hooks.iter().cloned());
            log.change("const router = useRouter() expanded into useNavigate(), useParams() and useLocation()");
        } else {
            pending.push(decl);
        }
    }
    flush(&mut out, &var, &mut pending);

    if let Some(Stmt::Decl(Decl::Var(first))) = out.first_mut() {
        first.span = var.span;
    }
    out
}

fn flush(out: &mut Vec<Stmt>, template: &VarDecl, pending: &mut Vec<VarDeclarator>) {
    if pending.is_empty() {
        return;
    }
    let mut decl = template.clone();
    decl.decls = std::mem::take(pending);
    out.push(Stmt::Decl(Decl::Var(Box::new(decl))));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransformOptions;
    use crate::transform::AstTransformer;

    fn transform(source: &str) -> crate::model::TransformResult {
        AstTransformer::new(TransformOptions::default()).transform(source)
    }

    #[test]
    fn navigation_methods_become_navigate() {
        let result = transform(
            "router.push('/about');\nrouter.replace('/login', undefined, { shallow: true });\nrouter.back();\n",
        );
        assert!(result.code.contains("navigate('/about')"));
        assert!(result.code.contains("navigate('/login', {"));
        assert!(result.code.contains("replace: true"));
        assert!(result.code.contains("navigate(-1)"));
        assert!(!result.code.contains("shallow"));
        assert!(result.applied_transformations.iter().any(|c| c.contains("router.push")));
    }

    #[test]
    fn query_and_pathname_members() {
        let result = transform("const id = router.query.id;\nconst { slug } = router.query;\nconst p = router.asPath;\n");
        assert!(result.code.contains("const id = params.id;"));
        assert!(result.code.contains("} = params;"));
        assert!(result.code.contains("const p = location.pathname;"));
    }

    #[test]
    fn unknown_members_are_warned_not_rewritten() {
        let source = "router.prefetch('/a');\n";
        let result = transform(source);
        assert_eq!(result.code, source);
        assert!(result.warnings.iter().any(|w| w.contains("router.prefetch")));
    }

    #[test]
    fn other_receivers_are_ignored() {
        let source = "history.push('/a');\nthis.router.push('/b');\n";
        let result = transform(source);
        assert_eq!(result.code, source);
        assert!(result.applied_transformations.is_empty());
    }

    #[test]
    fn declaration_expands_in_place() {
        let result = transform(
            "import { useRouter } from 'next/router';\nexport default function Page() {\n  const router = useRouter(), tab = router.query.tab;\n  return tab;\n}\n",
        );
        let code = &result.code;
        assert!(!code.contains("useRouter"));
        assert!(code.contains("import { useNavigate, useParams, useLocation } from \"react-router-dom\""));
        let navigate = code.find("const navigate = useNavigate();").unwrap();
        let params = code.find("const params = useParams();").unwrap();
        let location = code.find("const location = useLocation();").unwrap();
        let tab = code.find("const tab = params.tab;").unwrap();
        assert!(navigate < params && params < location && location < tab);
    }
}
