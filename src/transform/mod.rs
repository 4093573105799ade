// src/transform/mod.rs
//! Structural Next.js → Vite rewriting on the SWC syntax tree.
//!
//! One `VisitMut` pass rewrites imports, JSX elements, router API usage,
//! `next/dynamic` calls, public env vars and exported data-fetching
//! functions. API handlers and middleware get their server-side conversion
//! on top. Replacement fragments are parsed from small templates in the
//! file's own source map; lists of items and statements are rebuilt rather
//! than edited in place.

use swc_common::comments::SingleThreadedComments;
use swc_ecma_ast::*;
use swc_ecma_visit::{VisitMut, VisitMutWith};
use tracing::{debug, warn};

use crate::config::{ServerModule, TransformOptions};
use crate::error::{ParseError, TransformError};
use crate::model::TransformResult;
use crate::parser::{ParsedModule, SourceContext};

mod data_fetching;
mod env;
mod imports;
mod jsx;
mod router;
mod server;

pub use data_fetching::DataFetchingFn;
pub use imports::NextModule;
pub use jsx::NextComponent;
pub use router::RouterMethod;
pub use server::{handler_name, HttpMethod, MiddlewareKind};

use imports::{ImportBindings, ImportRewrite};

const USE_QUERY_IMPORT: &str = "import { useQuery } from \"@tanstack/react-query\";";

pub struct AstTransformer {
    options: TransformOptions,
}

impl AstTransformer {
    pub fn new(options: TransformOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    /// Never fails: when the source cannot be transformed the original text
    /// is returned with the reason as its only warning.
    pub fn transform(&self, source: &str) -> TransformResult {
        self.try_transform("<source>", source).unwrap_or_else(|err| {
            warn!(error = %err, "syntax tree transform failed, keeping original text");
            TransformResult {
                code: source.to_string(),
                applied_transformations: Vec::new(),
                warnings: vec![err.to_string()],
            }
        })
    }

    /// Like [`transform`](Self::transform) but hands the failure back, so the
    /// caller can decide whether to fall back to the regex rules.
    pub fn try_transform(&self, name: &str, source: &str) -> Result<TransformResult, TransformError> {
        let ctx = SourceContext::new();
        let ParsedModule { mut module, comments } = ctx.parse(name, source, self.options.syntax)?;

        let mut rewriter = NextRewriter {
            ctx: &ctx,
            options: &self.options,
            notes: self.options.preserve_comments.then_some(&comments),
            bindings: ImportBindings::collect(&module),
            log: ChangeLog::default(),
            needs_use_query: false,
        };
        module.visit_mut_with(&mut rewriter);

        let ChangeLog {
            changes,
            warnings,
            failures,
        } = rewriter.log;
        if let Some(err) = failures.into_iter().next() {
            return Err(TransformError::Replacement(err));
        }
        if changes.is_empty() {
            return Ok(TransformResult {
                code: source.to_string(),
                applied_transformations: changes,
                warnings,
            });
        }

        let comments = self.options.preserve_comments.then_some(&comments);
        let code = ctx.print(&module, comments)?;
        debug!(file = name, changes = changes.len(), "transformed module");
        Ok(TransformResult {
            code,
            applied_transformations: changes,
            warnings,
        })
    }
}

/// Changes, warnings and template failures collected during one pass.
#[derive(Debug, Default)]
pub(crate) struct ChangeLog {
    changes: Vec<String>,
    warnings: Vec<String>,
    failures: Vec<ParseError>,
}

impl ChangeLog {
    pub(crate) fn change(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!(change = %message);
        self.changes.push(message);
    }

    pub(crate) fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!(warning = %message);
        self.warnings.push(message);
    }

    /// Unwraps a template parse, recording the failure.
    pub(crate) fn built<T>(&mut self, result: Result<T, ParseError>) -> Option<T> {
        result.map_err(|err| self.failures.push(err)).ok()
    }
}

struct NextRewriter<'a> {
    ctx: &'a SourceContext,
    options: &'a TransformOptions,
    /// Comment store for generated notes; `None` when comments are stripped.
    notes: Option<&'a SingleThreadedComments>,
    bindings: ImportBindings,
    log: ChangeLog,
    needs_use_query: bool,
}

impl NextRewriter<'_> {
    fn rewrite_dynamic_call(&mut self, call: &mut CallExpr) -> bool {
        let Some(local) = self.bindings.dynamic_local() else {
            return false;
        };
        let Callee::Expr(callee) = &mut call.callee else {
            return false;
        };
        let Expr::Ident(ident) = &mut **callee else {
            return false;
        };
        if &*ident.sym != local {
            return false;
        }

        ident.sym = "lazy".into();
        if call.args.len() > 1 {
            call.args.truncate(1);
            self.log
                .warn("dynamic() options (ssr, loading) dropped; render the component inside <Suspense>");
        }
        self.log.change("dynamic() call converted to lazy()");
        true
    }

    fn is_use_router_call(&self, call: &CallExpr) -> bool {
        let Some(local) = self.bindings.use_router_local() else {
            return false;
        };
        matches!(&call.callee, Callee::Expr(callee) if matches!(&**callee, Expr::Ident(ident) if &*ident.sym == local))
    }
}

impl VisitMut for NextRewriter<'_> {
    fn visit_mut_module(&mut self, module: &mut Module) {
        module.visit_mut_children_with(self);

        match &self.options.server {
            Some(ServerModule::Api { route }) => {
                server::rewrite_api_module(module, route, self.notes, &mut self.log)
            }
            Some(ServerModule::Middleware) => {
                let kind = server::MiddlewareKind::detect(&self.bindings);
                server::rewrite_middleware_module(module, kind, &mut self.log);
            }
            None => {}
        }

        if !self.needs_use_query || self.bindings.has_use_query() {
            return;
        }
        let Some(items) = self.log.built(self.ctx.parse_items(USE_QUERY_IMPORT)) else {
            return;
        };
        let at = module
            .body
            .iter()
            .rposition(|item| matches!(item, ModuleItem::ModuleDecl(ModuleDecl::Import(_))))
            .map_or(0, |last| last + 1);
        let tail = module.body.split_off(at);
        module.body.extend(items);
        module.body.extend(tail);
        self.log.change("useQuery import added from @tanstack/react-query");
    }

    fn visit_mut_module_items(&mut self, items: &mut Vec<ModuleItem>) {
        let mut out = Vec::with_capacity(items.len());

        for item in std::mem::take(items) {
            match item {
                ModuleItem::ModuleDecl(ModuleDecl::Import(import)) => {
                    match imports::rewrite_import(import, self.options, self.ctx, &mut self.log) {
                        ImportRewrite::Keep(import) => {
                            out.push(ModuleItem::ModuleDecl(ModuleDecl::Import(import)))
                        }
                        ImportRewrite::Replace(replacement) => out.extend(replacement),
                        ImportRewrite::Remove => {}
                    }
                }
                ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export))
                    if self.options.rewrite_data_fetching =>
                {
                    match data_fetching::rewrite_export(&export, self.ctx, &mut self.log) {
                        Some(mut hook) => {
                            self.needs_use_query = true;
                            hook.visit_mut_with(self);
                            out.push(hook);
                        }
                        None => {
                            let mut item = ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export));
                            item.visit_mut_with(self);
                            out.push(item);
                        }
                    }
                }
                mut item => {
                    item.visit_mut_with(self);
                    out.push(item);
                }
            }
        }

        *items = out;
    }

    fn visit_mut_stmts(&mut self, stmts: &mut Vec<Stmt>) {
        let use_router = self
            .options
            .rewrite_routing
            .then(|| self.bindings.use_router_local().map(str::to_string))
            .flatten();
        let mut out = Vec::with_capacity(stmts.len());

        for stmt in std::mem::take(stmts) {
            match (stmt, use_router.as_deref()) {
                (Stmt::Decl(Decl::Var(var)), Some(local)) if router::declares_router(&var, local) => {
                    for mut stmt in router::expand_declaration(*var, local, self.ctx, &mut self.log) {
                        stmt.visit_mut_with(self);
                        out.push(stmt);
                    }
                }
                (mut stmt, _) => {
                    stmt.visit_mut_with(self);
                    out.push(stmt);
                }
            }
        }

        *stmts = out;
    }

    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        if self.options.server.is_some() {
            server::check_response_member(expr, &self.bindings, &mut self.log);
        }
        if let Expr::Call(call) = expr {
            if self.options.rewrite_routing && router::rewrite_call(call, self.ctx, &mut self.log) {
                call.args.visit_mut_with(self);
                return;
            }
            if self.options.rewrite_components && self.rewrite_dynamic_call(call) {
                call.args.visit_mut_with(self);
                return;
            }
            if self.options.rewrite_routing && self.is_use_router_call(call) {
                self.log
                    .warn("useRouter() result is not assigned to `router`; call left unchanged");
            }
        }

        expr.visit_mut_children_with(self);

        if self.options.rewrite_routing {
            router::rewrite_member(expr, self.ctx, &mut self.log);
        }
        env::rewrite_public_env(expr, &mut self.log);
        if self.options.server.is_some() {
            server::rename_server_value(expr, &self.bindings, &mut self.log);
        }
    }

    fn visit_mut_ts_type_ref(&mut self, ty: &mut TsTypeRef) {
        ty.visit_mut_children_with(self);
        if self.options.server.is_some() {
            server::rename_server_type(ty, &self.bindings, &mut self.log);
        }
    }

    fn visit_mut_jsx_element(&mut self, element: &mut JSXElement) {
        element.visit_mut_children_with(self);

        if !self.options.rewrite_components {
            return;
        }
        let JSXElementName::Ident(tag) = &element.opening.name else {
            return;
        };
        if let Some(component) = self.bindings.component(&tag.sym) {
            jsx::rewrite_element(element, component, &mut self.log);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn transform(source: &str) -> TransformResult {
        AstTransformer::new(TransformOptions::default()).transform(source)
    }

    #[test]
    fn source_without_next_patterns_is_returned_verbatim() {
        let source = "import React from 'react';\n\n// a helper\nexport const double  = (n: number) => n * 2;\n";
        let result = transform(source);
        assert_eq!(result.code, source);
        assert!(result.applied_transformations.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn malformed_source_keeps_text_and_warns_once() {
        let source = "export default function Page() {\n  return <div>;\n";
        let result = transform(source);
        assert_eq!(result.code, source);
        assert!(result.applied_transformations.is_empty());
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].starts_with("failed to parse"));
    }

    #[test]
    fn use_query_import_follows_the_last_import() {
        let source = "import a from './a';\nimport b from './b';\nexport const getStaticProps = () => ({ props: {} });\n";
        let result = transform(source);
        let lines: Vec<&str> = result.code.lines().collect();
        assert!(lines[2].contains("useQuery") && lines[2].contains("@tanstack/react-query"));
        assert_eq!(result.code.matches("@tanstack/react-query").count(), 1);
    }

    #[test]
    fn existing_use_query_import_is_reused() {
        let source = "import { useQuery } from '@tanstack/react-query';\nexport async function getServerSideProps() {\n  return { props: {} };\n}\n";
        let result = transform(source);
        assert_eq!(result.code.matches("@tanstack/react-query").count(), 1);
        assert!(result.code.contains("export function useFetchData()"));
    }

    #[test]
    fn disabled_categories_are_left_alone() {
        let options = TransformOptions {
            rewrite_routing: false,
            ..TransformOptions::default()
        };
        let source = "import Link from 'next/link';\nrouter.push('/a');\nexport const A = () => <Link href=\"/b\">b</Link>;\n";
        let result = AstTransformer::new(options).transform(source);
        assert!(result.code.contains("router.push('/a')"));
        assert!(result.code.contains("to=\"/b\""));
    }

    #[test]
    fn comments_survive_unless_stripped() {
        let source = "// entry point\nimport Head from 'next/head';\nexport const A = () => <Head><title>x</title></Head>;\n";
        let kept = transform(source);
        assert!(kept.code.contains("// entry point"));

        let options = TransformOptions {
            preserve_comments: false,
            ..TransformOptions::default()
        };
        let stripped = AstTransformer::new(options).transform(source);
        assert!(!stripped.code.contains("entry point"));
        assert!(stripped.code.contains("<Helmet>"));
    }

    #[test]
    fn typescript_casts_parse_outside_tsx() {
        let options = TransformOptions {
            syntax: crate::config::SyntaxMode::Typescript,
            ..TransformOptions::default()
        };
        let source = "const el = <HTMLElement>document.body;\nrouter.push('/a');\n";
        let result = AstTransformer::new(options).transform(source);
        assert!(result.warnings.is_empty());
        assert!(result.code.contains("navigate('/a')"));
        assert!(result.code.contains("<HTMLElement>document.body"));
    }

    #[test]
    fn dynamic_calls_become_lazy() {
        let source = "import dynamic from 'next/dynamic';\nconst Chart = dynamic(() => import('../components/Chart'), { ssr: false });\n";
        let result = transform(source);
        assert!(result.code.contains("import { lazy, Suspense } from \"react\""));
        assert!(result.code.contains("const Chart = lazy("));
        assert!(result.code.contains("import('../components/Chart')"));
        assert!(!result.code.contains("ssr"));
        assert!(result.warnings.iter().any(|w| w.contains("dynamic() options")));
    }
}
