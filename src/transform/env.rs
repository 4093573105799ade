// src/transform/env.rs
use swc_ecma_ast::*;

use super::ChangeLog;

const NEXT_PUBLIC: &str = "NEXT_PUBLIC_";

fn is_process_env(expr: &Expr) -> bool {
    let Expr::Member(member) = expr else {
        return false;
    };
    matches!(&*member.obj, Expr::Ident(object) if &*object.sym == "process")
        && matches!(&member.prop, MemberProp::Ident(prop) if &*prop.sym == "env")
}

/// `process.env.NEXT_PUBLIC_X` → `import.meta.env.VITE_X`.
pub(crate) fn rewrite_public_env(expr: &mut Expr, log: &mut ChangeLog) {
    let Expr::Member(member) = expr else {
        return;
    };
    let MemberProp::Ident(name) = &member.prop else {
        return;
    };
    let Some(rest) = name.sym.strip_prefix(NEXT_PUBLIC).map(str::to_string) else {
        return;
    };
    if !is_process_env(&member.obj) {
        return;
    }

    if let Expr::Member(env) = &mut *member.obj {
        env.obj = Box::new(Expr::MetaProp(MetaPropExpr {
            span: env.span,
            kind: MetaPropKind::ImportMeta,
        }));
    }
    let renamed = format!("VITE_{rest}");
    if let MemberProp::Ident(name) = &mut member.prop {
        name.sym = renamed.as_str().into();
    }
    log.change(format!(
        "process.env.{NEXT_PUBLIC}{rest} converted to import.meta.env.{renamed}"
    ));
}
