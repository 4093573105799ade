// src/transform/data_fetching.rs
use swc_ecma_ast::*;
use swc_ecma_visit::{VisitMut, VisitMutWith};

use super::ChangeLog;
use crate::parser::SourceContext;

/// Next.js data-fetching exports and the hooks that replace them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFetchingFn {
    ServerSideProps,
    StaticProps,
    StaticPaths,
}

impl DataFetchingFn {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "getServerSideProps" => Some(DataFetchingFn::ServerSideProps),
            "getStaticProps" => Some(DataFetchingFn::StaticProps),
            "getStaticPaths" => Some(DataFetchingFn::StaticPaths),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DataFetchingFn::ServerSideProps => "getServerSideProps",
            DataFetchingFn::StaticProps => "getStaticProps",
            DataFetchingFn::StaticPaths => "getStaticPaths",
        }
    }

    pub fn hook_name(self) -> &'static str {
        match self {
            DataFetchingFn::ServerSideProps => "useFetchData",
            DataFetchingFn::StaticProps => "useStaticData",
            DataFetchingFn::StaticPaths => "useAvailablePaths",
        }
    }

    pub fn query_key(self) -> String {
        self.name().to_lowercase()
    }

    /// Source text of the replacement hook with an empty `queryFn` body.
    pub(crate) fn hook_template(self, is_async: bool) -> String {
        format!(
            "export function {hook}() {{\n  return useQuery({{\n    queryKey: [\"{key}\"],\n    queryFn: {prefix}() => {{}},\n  }});\n}}",
            hook = self.hook_name(),
            key = self.query_key(),
            prefix = if is_async { "async " } else { "" },
        )
    }
}

struct Extracted {
    function: DataFetchingFn,
    body: Box<BlockStmtOrExpr>,
    is_async: bool,
    params: usize,
}

fn extract(export: &ExportDecl) -> Option<Extracted> {
    match &export.decl {
        Decl::Fn(decl) => Some(Extracted {
            function: DataFetchingFn::from_name(&decl.ident.sym)?,
            body: Box::new(BlockStmtOrExpr::BlockStmt(decl.function.body.clone()?)),
            is_async: decl.function.is_async,
            params: decl.function.params.len(),
        }),
        Decl::Var(var) => {
            let [decl] = var.decls.as_slice() else {
                return None;
            };
            let Pat::Ident(binding) = &decl.name else {
                return None;
            };
            let function = DataFetchingFn::from_name(&binding.id.sym)?;
            match decl.init.as_deref()? {
                Expr::Arrow(arrow) => Some(Extracted {
                    function,
                    body: arrow.body.clone(),
                    is_async: arrow.is_async,
                    params: arrow.params.len(),
                }),
                Expr::Fn(FnExpr { function: inner, .. }) => Some(Extracted {
                    function,
                    body: Box::new(BlockStmtOrExpr::BlockStmt(inner.body.clone()?)),
                    is_async: inner.is_async,
                    params: inner.params.len(),
                }),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Moves the original body into the template's `queryFn` arrow.
struct BodySplice {
    body: Option<Box<BlockStmtOrExpr>>,
}

impl VisitMut for BodySplice {
    fn visit_mut_arrow_expr(&mut self, arrow: &mut ArrowExpr) {
        if let Some(body) = self.body.take() {
            arrow.body = body;
        }
    }
}

/// Replacement hook for an exported data-fetching function, or `None` when
/// the export is something else.
pub(crate) fn rewrite_export(
    export: &ExportDecl,
    ctx: &SourceContext,
    log: &mut ChangeLog,
) -> Option<ModuleItem> {
    let extracted = extract(export)?;
    let function = extracted.function;

    let mut items = log.built(ctx.parse_items(&function.hook_template(extracted.is_async)))?;
    let mut hook = items.pop()?;
    hook.visit_mut_with(&mut BodySplice {
        body: Some(extracted.body),
    });
    if let ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(decl)) = &mut hook {
        decl.span = export.span;
    }

    if extracted.params > 0 {
        log.warn(format!(
            "{} context parameter dropped; read route params with useParams() inside {}",
            function.name(),
            function.hook_name()
        ));
    }
    if function == DataFetchingFn::StaticPaths {
        log.warn("getStaticPaths has no client-side equivalent; useAvailablePaths only exposes its data");
    }
    log.change(format!(
        "{} converted to {} using useQuery",
        function.name(),
        function.hook_name()
    ));
    Some(hook)
}
