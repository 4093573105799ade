// src/transform/server.rs
//! API handlers and middleware, rewritten for an Express or Fetch API server
//! instead of the browser.

use swc_common::comments::{Comment, CommentKind, Comments, SingleThreadedComments};
use swc_common::{Spanned, DUMMY_SP};
use swc_ecma_ast::*;
use swc_ecma_visit::{Visit, VisitMut, VisitMutWith, VisitWith};

use super::imports::ImportBindings;
use super::ChangeLog;
use crate::routes::component_name;

const REGISTRATION: &str = "Express route registration:";

/// `NextResponse` statics that the Fetch API `Response` also has.
const RESPONSE_STATICS: &[&str] = &["redirect", "json", "error"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "PATCH" => Some(HttpMethod::Patch),
            "DELETE" => Some(HttpMethod::Delete),
            _ => None,
        }
    }

    /// Express router method: `app.get`, `app.post`, ...
    pub fn router_fn(self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
        }
    }

    fn title(self) -> &'static str {
        match self {
            HttpMethod::Get => "Get",
            HttpMethod::Post => "Post",
            HttpMethod::Put => "Put",
            HttpMethod::Patch => "Patch",
            HttpMethod::Delete => "Delete",
        }
    }
}

/// How a `middleware.*` file is converted, judged from its imports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiddlewareKind {
    /// Imports from `next/server`: a Fetch API handler.
    Edge,
    /// Uses the `NextApi*` types: an Express middleware.
    Api,
    /// Neither: client-side logic turned into a hook.
    Page,
}

impl MiddlewareKind {
    pub(crate) fn detect(bindings: &ImportBindings) -> Self {
        if bindings.imports_next_server() {
            MiddlewareKind::Edge
        } else if bindings.imports_api_types() {
            MiddlewareKind::Api
        } else {
            MiddlewareKind::Page
        }
    }
}

/// `handle<Method><Route>`, e.g. `handleGetApiUsersId`.
pub fn handler_name(method: Option<HttpMethod>, route: &str) -> String {
    format!("handle{}{}", method.map_or("", HttpMethod::title), component_name(route))
}

/// Renames a value use of a Next.js server type, e.g. `NextResponse` in
/// `NextResponse.redirect(url)`.
pub(crate) fn rename_server_value(expr: &mut Expr, bindings: &ImportBindings, log: &mut ChangeLog) {
    let Expr::Ident(ident) = expr else {
        return;
    };
    if let Some(replacement) = bindings.server_type(&ident.sym) {
        log.change(format!("{} renamed to {replacement}", ident.sym));
        ident.sym = replacement.into();
    }
}

pub(crate) fn rename_server_type(ty: &mut TsTypeRef, bindings: &ImportBindings, log: &mut ChangeLog) {
    let TsEntityName::Ident(ident) = &mut ty.type_name else {
        return;
    };
    if let Some(replacement) = bindings.server_type(&ident.sym) {
        log.change(format!("{} type renamed to {replacement}", ident.sym));
        ident.sym = replacement.into();
    }
}

/// Warns about `NextResponse.next()`, `.rewrite()` and other statics the
/// Fetch API `Response` lacks. Call before the object is renamed.
pub(crate) fn check_response_member(expr: &Expr, bindings: &ImportBindings, log: &mut ChangeLog) {
    let Expr::Member(MemberExpr {
        obj,
        prop: MemberProp::Ident(prop),
        ..
    }) = expr
    else {
        return;
    };
    let Expr::Ident(object) = &**obj else {
        return;
    };
    if bindings.server_type(&object.sym) == Some("Response")
        && &*object.sym != "NextApiResponse"
        && !RESPONSE_STATICS.contains(&&*prop.sym)
    {
        log.warn(format!(
            "{}.{} has no Fetch API equivalent; port it by hand",
            object.sym, prop.sym
        ));
    }
}

fn is_request_member(member: &MemberExpr, request: &str, name: &str) -> bool {
    matches!(&*member.obj, Expr::Ident(object) if &*object.sym == request)
        && matches!(&member.prop, MemberProp::Ident(prop) if &*prop.sym == name)
}

fn string_literal(expr: &Expr) -> Option<&str> {
    match expr {
        Expr::Lit(Lit::Str(text)) => Some(&*text.value),
        _ => None,
    }
}

/// What a handler does with its request object.
struct RequestScan<'a> {
    request: &'a str,
    methods: Vec<HttpMethod>,
    cookies: bool,
    query_uses: usize,
}

impl RequestScan<'_> {
    fn is_method(&self, expr: &Expr) -> bool {
        matches!(expr, Expr::Member(member) if is_request_member(member, self.request, "method"))
    }

    fn record(&mut self, name: &str) {
        if let Some(method) = HttpMethod::from_name(name) {
            if !self.methods.contains(&method) {
                self.methods.push(method);
            }
        }
    }

    /// The one method the handler checks for, if it checks for exactly one.
    fn single_method(&self) -> Option<HttpMethod> {
        match self.methods.as_slice() {
            [method] => Some(*method),
            _ => None,
        }
    }
}

impl Visit for RequestScan<'_> {
    fn visit_bin_expr(&mut self, bin: &BinExpr) {
        bin.visit_children_with(self);
        if !matches!(
            bin.op,
            BinaryOp::EqEqEq | BinaryOp::EqEq | BinaryOp::NotEqEq | BinaryOp::NotEq
        ) {
            return;
        }
        let compared = if self.is_method(&bin.left) {
            string_literal(&bin.right)
        } else if self.is_method(&bin.right) {
            string_literal(&bin.left)
        } else {
            None
        };
        if let Some(name) = compared {
            self.record(name);
        }
    }

    fn visit_switch_stmt(&mut self, switch: &SwitchStmt) {
        switch.visit_children_with(self);
        if !self.is_method(&switch.discriminant) {
            return;
        }
        for case in &switch.cases {
            if let Some(name) = case.test.as_deref().and_then(string_literal) {
                self.record(name);
            }
        }
    }

    fn visit_member_expr(&mut self, member: &MemberExpr) {
        member.visit_children_with(self);
        if is_request_member(member, self.request, "cookies") {
            self.cookies = true;
        }
        if is_request_member(member, self.request, "query") {
            self.query_uses += 1;
        }
    }
}

/// `req.query.<param>` → `req.params.<param>` for the route's dynamic
/// segments.
struct QueryToParams<'a> {
    request: &'a str,
    params: &'a [&'a str],
    rewritten: usize,
}

impl VisitMut for QueryToParams<'_> {
    fn visit_mut_member_expr(&mut self, member: &mut MemberExpr) {
        member.visit_mut_children_with(self);
        let MemberProp::Ident(param) = &member.prop else {
            return;
        };
        if !self.params.contains(&&*param.sym) {
            return;
        }
        let Expr::Member(inner) = &mut *member.obj else {
            return;
        };
        if !is_request_member(inner, self.request, "query") {
            return;
        }
        if let MemberProp::Ident(query) = &mut inner.prop {
            query.sym = "params".into();
            self.rewritten += 1;
        }
    }
}

fn is_default_export(item: &ModuleItem) -> bool {
    matches!(
        item,
        ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(_) | ModuleDecl::ExportDefaultExpr(_))
    )
}

/// Name of the handler's first parameter; `req` when it has none.
fn request_name(item: &ModuleItem) -> String {
    let first = match item {
        ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(ExportDefaultDecl {
            decl: DefaultDecl::Fn(function),
            ..
        })) => function.function.params.first().map(|param| &param.pat),
        ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(export)) => match &*export.expr {
            Expr::Arrow(arrow) => arrow.params.first(),
            Expr::Fn(function) => function.function.params.first().map(|param| &param.pat),
            _ => None,
        },
        _ => None,
    };
    match first {
        Some(Pat::Ident(binding)) => binding.id.sym.to_string(),
        _ => "req".to_string(),
    }
}

/// Converts the default-exported handler of `route`: dynamic segments are
/// read from `req.params`, an anonymous handler gets a name and, when
/// `notes` is given, an Express registration comment is attached.
pub(crate) fn rewrite_api_module(
    module: &mut Module,
    route: &str,
    notes: Option<&SingleThreadedComments>,
    log: &mut ChangeLog,
) {
    let Some(index) = module.body.iter().position(is_default_export) else {
        log.warn(format!("no default-exported handler found for {route}"));
        return;
    };
    let request = request_name(&module.body[index]);

    let mut scan = RequestScan {
        request: &request,
        methods: Vec::new(),
        cookies: false,
        query_uses: 0,
    };
    module.visit_with(&mut scan);
    let method = scan.single_method();

    let params: Vec<&str> = route.split('/').filter_map(|s| s.strip_prefix(':')).collect();
    let mut to_params = QueryToParams {
        request: &request,
        params: &params,
        rewritten: 0,
    };
    if !params.is_empty() {
        module.visit_mut_with(&mut to_params);
    }
    if to_params.rewritten > 0 {
        log.change(format!(
            "{} route parameter read(s) moved from {request}.query to {request}.params",
            to_params.rewritten
        ));
    }
    if scan.query_uses > to_params.rewritten {
        log.warn(format!(
            "{request}.query in Express holds only the query string; route parameters are in {request}.params"
        ));
    }
    if scan.cookies {
        log.warn(format!("Express needs the cookie-parser middleware for {request}.cookies"));
    }

    let derived = handler_name(method, route);
    let registered = match &mut module.body[index] {
        ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(ExportDefaultDecl {
            decl: DefaultDecl::Fn(function),
            ..
        })) => match &function.ident {
            Some(ident) => ident.sym.to_string(),
            None => {
                function.ident = Some(Ident::new(derived.as_str().into(), DUMMY_SP));
                log.change(format!("anonymous API handler named {derived}"));
                derived
            }
        },
        _ => derived,
    };

    let Some(comments) = notes else {
        return;
    };
    let pos = module.body[index].span().lo;
    let noted = comments
        .get_leading(pos)
        .is_some_and(|existing| existing.iter().any(|comment| comment.text.contains(REGISTRATION)));
    if noted {
        return;
    }
    let call = method.map_or("all", HttpMethod::router_fn);
    comments.add_leading(
        pos,
        Comment {
            kind: CommentKind::Line,
            span: DUMMY_SP,
            text: format!(" {REGISTRATION} app.{call}(\"{route}\", {registered});").into(),
        },
    );
    log.change(format!("Express registration note added for {route}"));
}

fn is_config_export(item: &ModuleItem) -> bool {
    let ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(ExportDecl {
        decl: Decl::Var(var), ..
    })) = item
    else {
        return false;
    };
    var.decls
        .iter()
        .any(|decl| matches!(&decl.name, Pat::Ident(binding) if &*binding.id.sym == "config"))
}

fn middleware_fn(item: &mut ModuleItem) -> Option<&mut FnDecl> {
    match item {
        ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(ExportDecl {
            decl: Decl::Fn(function),
            ..
        })) if &*function.ident.sym == "middleware" => Some(function),
        _ => None,
    }
}

/// Drops the `config` matcher export and adapts `export function
/// middleware` to `kind`.
pub(crate) fn rewrite_middleware_module(module: &mut Module, kind: MiddlewareKind, log: &mut ChangeLog) {
    let before = module.body.len();
    module.body.retain(|item| !is_config_export(item));
    if module.body.len() < before {
        log.change("middleware config export removed");
        log.warn("middleware matcher dropped; mount the middleware on those paths in the server");
    }

    let Some(function) = module.body.iter_mut().find_map(middleware_fn) else {
        return;
    };
    match kind {
        MiddlewareKind::Edge => {}
        MiddlewareKind::Api => {
            if function.function.params.len() == 2 {
                function.function.params.push(Param {
                    span: DUMMY_SP,
                    decorators: Vec::new(),
                    pat: Pat::Ident(Ident::new("next".into(), DUMMY_SP).into()),
                });
                log.change("middleware given the Express next parameter");
            }
        }
        MiddlewareKind::Page => {
            function.ident.sym = "useMiddleware".into();
            log.change("page middleware renamed to the useMiddleware hook");
            log.warn("useMiddleware runs in the browser; call it from the root layout");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ServerModule, SyntaxMode, TransformOptions};
    use crate::model::TransformResult;
    use crate::transform::AstTransformer;

    fn convert(source: &str, server: ServerModule) -> TransformResult {
        let options = TransformOptions {
            syntax: SyntaxMode::Typescript,
            rewrite_components: false,
            rewrite_routing: false,
            server: Some(server),
            ..TransformOptions::default()
        };
        AstTransformer::new(options).transform(source)
    }

    fn api(route: &str) -> ServerModule {
        ServerModule::Api {
            route: route.to_string(),
        }
    }

    const USER_HANDLER: &str = "import type { NextApiRequest, NextApiResponse } from 'next';\n\nexport default async function handler(req: NextApiRequest, res: NextApiResponse) {\n  if (req.method !== 'GET') {\n    return res.status(405).end();\n  }\n  const user = await findUser(req.query.id);\n  res.json(user);\n}\n";

    #[test]
    fn api_handler_uses_express_types_and_params() {
        let result = convert(USER_HANDLER, api("/api/users/:id"));
        let code = &result.code;
        assert!(code.contains("import type { Request, Response } from \"express\";"));
        assert!(!code.contains("NextApi"));
        assert!(code.contains("req: Request, res: Response"));
        assert!(code.contains("findUser(req.params.id)"));
        assert!(code.contains("// Express route registration: app.get(\"/api/users/:id\", handler);"));
    }

    #[test]
    fn api_handler_conversion_is_stable() {
        let first = convert(USER_HANDLER, api("/api/users/:id"));
        assert!(first.is_modified());
        let second = convert(&first.code, api("/api/users/:id"));
        assert!(second.applied_transformations.is_empty());
        assert_eq!(second.code, first.code);
    }

    #[test]
    fn anonymous_handler_is_named_after_route() {
        let source = "export default function (req, res) {\n  switch (req.method) {\n    case 'POST':\n      return res.status(201).end();\n  }\n}\n";
        let result = convert(source, api("/api/orders"));
        assert!(result.code.contains("export default function handlePostApiOrders(req, res)"));
        assert!(result.code.contains("app.post(\"/api/orders\", handlePostApiOrders);"));
    }

    #[test]
    fn handlers_for_several_methods_register_for_all() {
        let source = "export default (req, res) => {\n  if (req.method === 'GET') return res.json([]);\n  if (req.method === 'POST') return res.status(201).end();\n  res.setHeader('Cookie', req.cookies.session);\n};\n";
        let result = convert(source, api("/api/items"));
        assert!(result.code.contains("app.all(\"/api/items\", handleApiItems);"));
        assert!(result.warnings.iter().any(|w| w.contains("cookie-parser")));
    }

    #[test]
    fn handler_names_follow_method_and_route() {
        assert_eq!(handler_name(Some(HttpMethod::Get), "/api/users/:id"), "handleGetApiUsersId");
        assert_eq!(handler_name(None, "/api"), "handleApi");
    }

    #[test]
    fn edge_middleware_uses_fetch_globals() {
        let source = "import { NextResponse } from 'next/server';\nimport type { NextRequest } from 'next/server';\n\nexport function middleware(request: NextRequest) {\n  if (!request.cookies.get('token')) {\n    return NextResponse.redirect(new URL('/login', request.url));\n  }\n  return NextResponse.next();\n}\n\nexport const config = { matcher: ['/admin/:path*'] };\n";
        let result = convert(source, ServerModule::Middleware);
        let code = &result.code;
        assert!(!code.contains("next/server"));
        assert!(!code.contains("NextRe"));
        assert!(code.contains("export function middleware(request: Request)"));
        assert!(code.contains("Response.redirect("));
        assert!(!code.contains("matcher"));
        assert!(result.warnings.iter().any(|w| w.contains("NextResponse.next")));
    }

    #[test]
    fn api_middleware_gains_next_parameter() {
        let source = "import { NextApiRequest, NextApiResponse } from 'next';\nexport function middleware(req: NextApiRequest, res: NextApiResponse) {\n  res.setHeader('x-powered-by', 'shop');\n}\n";
        let result = convert(source, ServerModule::Middleware);
        assert!(result.code.contains("export function middleware(req: Request, res: Response, next)"));
    }

    #[test]
    fn page_middleware_becomes_a_hook() {
        let source = "export function middleware() {\n  console.log(window.location.pathname);\n}\n";
        let result = convert(source, ServerModule::Middleware);
        assert!(result.code.contains("export function useMiddleware()"));
    }
}
