// src/transform/imports.rs
use std::collections::{HashMap, HashSet};

use swc_ecma_ast::*;

use super::jsx::NextComponent;
use super::ChangeLog;
use crate::config::TransformOptions;
use crate::parser::SourceContext;

/// Next.js modules whose imports are rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NextModule {
    Image,
    Link,
    Head,
    Router,
    Dynamic,
    Script,
    /// `next/server` (middleware request and response).
    Server,
    /// The bare `next` package (type imports).
    Next,
}

impl NextModule {
    pub fn from_source(source: &str) -> Option<Self> {
        Some(match source {
            "next/image" => NextModule::Image,
            "next/link" => NextModule::Link,
            "next/head" => NextModule::Head,
            "next/router" => NextModule::Router,
            "next/dynamic" => NextModule::Dynamic,
            "next/script" => NextModule::Script,
            "next/server" => NextModule::Server,
            "next" => NextModule::Next,
            _ => return None,
        })
    }

    pub fn specifier(self) -> &'static str {
        match self {
            NextModule::Image => "next/image",
            NextModule::Link => "next/link",
            NextModule::Head => "next/head",
            NextModule::Router => "next/router",
            NextModule::Dynamic => "next/dynamic",
            NextModule::Script => "next/script",
            NextModule::Server => "next/server",
            NextModule::Next => "next",
        }
    }

    fn rewritten_by(self, options: &TransformOptions) -> bool {
        match self {
            NextModule::Router => options.rewrite_routing,
            NextModule::Server => options.server.is_some(),
            NextModule::Next => options.rewrite_data_fetching || options.server.is_some(),
            _ => options.rewrite_components,
        }
    }
}

const DATA_FETCHING_TYPES: &[&str] = &[
    "GetServerSideProps",
    "GetServerSidePropsContext",
    "GetServerSidePropsResult",
    "GetStaticProps",
    "GetStaticPropsContext",
    "GetStaticPropsResult",
    "GetStaticPaths",
    "GetStaticPathsResult",
    "InferGetServerSidePropsType",
    "InferGetStaticPropsType",
];

/// Next.js server types and their Express or Fetch API counterparts. Types
/// from `next/server` become globals; the others come from `express`.
pub(crate) const SERVER_TYPES: &[(NextModule, &str, &str)] = &[
    (NextModule::Next, "NextApiRequest", "Request"),
    (NextModule::Next, "NextApiResponse", "Response"),
    (NextModule::Next, "NextApiHandler", "RequestHandler"),
    (NextModule::Server, "NextRequest", "Request"),
    (NextModule::Server, "NextResponse", "Response"),
];

fn server_type(module: NextModule, imported: &str) -> Option<&'static str> {
    SERVER_TYPES
        .iter()
        .find(|(from, name, _)| *from == module && *name == imported)
        .map(|(_, _, replacement)| *replacement)
}

/// What the module's imports and top-level declarations bind, collected
/// before any rewrite so JSX and call handlers can tell Next.js components
/// from same-named locals.
#[derive(Debug, Default)]
pub(crate) struct ImportBindings {
    next_defaults: HashMap<String, NextModule>,
    foreign: HashSet<String>,
    /// Local name of a Next.js server type → its replacement.
    server_types: HashMap<String, &'static str>,
    /// Anything imported from `next/server`.
    next_server: bool,
    /// `NextApi*` types imported from `next`.
    api_types: bool,
    dynamic: Option<String>,
    use_router: Option<String>,
    use_query: bool,
}

impl ImportBindings {
    pub(crate) fn collect(module: &Module) -> Self {
        let mut bindings = Self::default();

        for item in &module.body {
            let import = match item {
                ModuleItem::ModuleDecl(ModuleDecl::Import(import)) => import,
                ModuleItem::Stmt(Stmt::Decl(decl)) => {
                    bindings.declare(decl);
                    continue;
                }
                ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => {
                    bindings.declare(&export.decl);
                    continue;
                }
                _ => continue,
            };
            let next = NextModule::from_source(&import.src.value);
            if next == Some(NextModule::Server) {
                bindings.next_server = true;
            }

            for specifier in &import.specifiers {
                match (next, specifier) {
                    (Some(next_module), ImportSpecifier::Default(default)) => {
                        let local = default.local.sym.to_string();
                        if next_module == NextModule::Dynamic {
                            bindings.dynamic = Some(local.clone());
                        }
                        bindings.next_defaults.insert(local, next_module);
                    }
                    (Some(NextModule::Router), ImportSpecifier::Named(named))
                        if imported_name(named) == "useRouter" =>
                    {
                        bindings.use_router = Some(named.local.sym.to_string());
                    }
                    (Some(next_module), ImportSpecifier::Named(named)) => {
                        if let Some(replacement) = server_type(next_module, imported_name(named)) {
                            bindings.api_types |= next_module == NextModule::Next;
                            bindings
                                .server_types
                                .insert(named.local.sym.to_string(), replacement);
                        }
                    }
                    (Some(_), _) => {}
                    (None, specifier) => {
                        let local = local_name(specifier);
                        if &*import.src.value == "@tanstack/react-query"
                            && matches!(specifier, ImportSpecifier::Named(named) if imported_name(named) == "useQuery")
                        {
                            bindings.use_query = true;
                        }
                        bindings.foreign.insert(local.to_string());
                    }
                }
            }
        }

        bindings
    }

    /// Top-level functions, classes and variables shadow the bare Next.js
    /// tag and hook names.
    fn declare(&mut self, decl: &Decl) {
        match decl {
            Decl::Fn(function) => {
                self.foreign.insert(function.ident.sym.to_string());
            }
            Decl::Class(class) => {
                self.foreign.insert(class.ident.sym.to_string());
            }
            Decl::Var(var) => {
                for declarator in &var.decls {
                    if let Pat::Ident(binding) = &declarator.name {
                        self.foreign.insert(binding.id.sym.to_string());
                    }
                }
            }
            _ => {}
        }
    }

    /// The Next.js component a JSX tag refers to: a default import of a Next
    /// module, or a well-known tag name that nothing imports or declares.
    pub(crate) fn component(&self, tag: &str) -> Option<NextComponent> {
        match self.next_defaults.get(tag) {
            Some(module) => NextComponent::for_module(*module),
            None if self.foreign.contains(tag) => None,
            None => NextComponent::from_tag(tag),
        }
    }

    pub(crate) fn dynamic_local(&self) -> Option<&str> {
        self.dynamic.as_deref()
    }

    /// Local name of `useRouter`: its import from `next/router`, or the bare
    /// name when nothing else binds it.
    pub(crate) fn use_router_local(&self) -> Option<&str> {
        match &self.use_router {
            Some(local) => Some(local),
            None if self.foreign.contains("useRouter") => None,
            None => Some("useRouter"),
        }
    }

    pub(crate) fn has_use_query(&self) -> bool {
        self.use_query
    }

    /// Replacement for a local bound to a Next.js server type.
    pub(crate) fn server_type(&self, local: &str) -> Option<&'static str> {
        self.server_types.get(local).copied()
    }

    pub(crate) fn imports_next_server(&self) -> bool {
        self.next_server
    }

    pub(crate) fn imports_api_types(&self) -> bool {
        self.api_types
    }
}

fn local_name(specifier: &ImportSpecifier) -> &str {
    match specifier {
        ImportSpecifier::Named(named) => &*named.local.sym,
        ImportSpecifier::Default(default) => &*default.local.sym,
        ImportSpecifier::Namespace(namespace) => &*namespace.local.sym,
    }
}

fn imported_name(named: &ImportNamedSpecifier) -> &str {
    match &named.imported {
        Some(ModuleExportName::Ident(ident)) => &*ident.sym,
        Some(ModuleExportName::Str(name)) => &*name.value,
        None => &*named.local.sym,
    }
}

pub(crate) enum ImportRewrite {
    Keep(ImportDecl),
    Replace(Vec<ModuleItem>),
    Remove,
}

/// Named specifiers of a replacement import, rendered as source text.
#[derive(Debug, Default)]
struct ImportPlan {
    names: Vec<String>,
}

impl ImportPlan {
    fn add(&mut self, imported: &str, local: &str) {
        let name = if imported == local {
            imported.to_string()
        } else {
            format!("{imported} as {local}")
        };
        if !self.names.contains(&name) {
            self.names.push(name);
        }
    }

    fn render(&self, source: &str) -> String {
        format!("import {{ {} }} from \"{source}\";", self.names.join(", "))
    }

    fn render_types(&self, source: &str) -> String {
        format!("import type {{ {} }} from \"{source}\";", self.names.join(", "))
    }
}

pub(crate) fn rewrite_import(
    import: ImportDecl,
    options: &TransformOptions,
    ctx: &SourceContext,
    log: &mut ChangeLog,
) -> ImportRewrite {
    let Some(module) = NextModule::from_source(&import.src.value) else {
        return ImportRewrite::Keep(import);
    };
    if !module.rewritten_by(options) {
        return ImportRewrite::Keep(import);
    }
    if import
        .specifiers
        .iter()
        .any(|specifier| matches!(specifier, ImportSpecifier::Namespace(_)))
    {
        log.warn(format!(
            "namespace import of {} left unchanged; convert its uses by hand",
            module.specifier()
        ));
        return ImportRewrite::Keep(import);
    }

    let mut plan = ImportPlan::default();
    let target = match module {
        NextModule::Image => {
            for_default(&import, module, log, |local| plan.add("Image", local));
            "@unpic/react"
        }
        NextModule::Link => {
            for_default(&import, module, log, |local| plan.add("Link", local));
            "react-router-dom"
        }
        NextModule::Head => {
            for_default(&import, module, log, |_| plan.add("Helmet", "Helmet"));
            "react-helmet-async"
        }
        NextModule::Dynamic => {
            for_default(&import, module, log, |_| {
                plan.add("lazy", "lazy");
                plan.add("Suspense", "Suspense");
            });
            "react"
        }
        NextModule::Router => {
            for specifier in &import.specifiers {
                match specifier {
                    ImportSpecifier::Named(named) if imported_name(named) == "useRouter" => {
                        plan.add("useNavigate", "useNavigate");
                        plan.add("useParams", "useParams");
                        plan.add("useLocation", "useLocation");
                    }
                    other => log.warn(format!(
                        "`{}` from next/router has no react-router-dom equivalent and was dropped",
                        local_name(other)
                    )),
                }
            }
            "react-router-dom"
        }
        NextModule::Script => {
            log.change("next/script import removed");
            return ImportRewrite::Remove;
        }
        NextModule::Server => return strip_server_types(import, log),
        NextModule::Next => return rewrite_next_types(import, options, ctx, log),
    };

    if plan.names.is_empty() {
        log.change(format!("{} import removed", module.specifier()));
        return ImportRewrite::Remove;
    }

    let text = plan.render(target);
    let Some(mut items) = log.built(ctx.parse_items(&text)) else {
        return ImportRewrite::Keep(import);
    };
    let Some(mut item) = items.pop() else {
        return ImportRewrite::Keep(import);
    };
    if let ModuleItem::ModuleDecl(ModuleDecl::Import(replacement)) = &mut item {
        replacement.span = import.span;
    }
    log.change(format!("{} import replaced with {target}", module.specifier()));
    ImportRewrite::Replace(vec![item])
}

/// Calls `each` with the local name of the default specifier; named
/// specifiers are dropped with a warning.
fn for_default(
    import: &ImportDecl,
    module: NextModule,
    log: &mut ChangeLog,
    mut each: impl FnMut(&str),
) {
    for specifier in &import.specifiers {
        match specifier {
            ImportSpecifier::Default(default) => each(&*default.local.sym),
            other => log.warn(format!(
                "`{}` from {} has no equivalent and was dropped",
                local_name(other),
                module.specifier()
            )),
        }
    }
}

/// Drops data-fetching types and, in server modules, swaps the `NextApi*`
/// types for a type import from `express`. Other specifiers stay.
fn rewrite_next_types(
    mut import: ImportDecl,
    options: &TransformOptions,
    ctx: &SourceContext,
    log: &mut ChangeLog,
) -> ImportRewrite {
    let mut express = ImportPlan::default();
    let mut dropped = 0;
    import.specifiers.retain(|specifier| {
        let ImportSpecifier::Named(named) = specifier else {
            return true;
        };
        let imported = imported_name(named);
        if options.rewrite_data_fetching && DATA_FETCHING_TYPES.contains(&imported) {
            dropped += 1;
            return false;
        }
        match server_type(NextModule::Next, imported) {
            Some(replacement) if options.server.is_some() => {
                express.add(replacement, replacement);
                false
            }
            _ => true,
        }
    });
    if dropped == 0 && express.names.is_empty() {
        return ImportRewrite::Keep(import);
    }

    if dropped > 0 {
        log.change(format!("{dropped} Next.js data-fetching type import(s) removed"));
    }
    let span = import.span;
    let mut items = Vec::new();
    if !import.specifiers.is_empty() {
        items.push(ModuleItem::ModuleDecl(ModuleDecl::Import(import)));
    }
    if !express.names.is_empty() {
        let built = log.built(ctx.parse_items(&express.render_types("express")));
        let takes_span = items.is_empty();
        for mut item in built.unwrap_or_default() {
            match &mut item {
                ModuleItem::ModuleDecl(ModuleDecl::Import(replacement)) if takes_span => {
                    replacement.span = span;
                }
                _ => {}
            }
            items.push(item);
        }
        log.change("Next.js API types import replaced with express types");
    }

    if items.is_empty() {
        ImportRewrite::Remove
    } else {
        ImportRewrite::Replace(items)
    }
}

/// `NextRequest` and `NextResponse` become the Fetch API globals, so their
/// specifiers are dropped. Anything else from `next/server` stays.
fn strip_server_types(mut import: ImportDecl, log: &mut ChangeLog) -> ImportRewrite {
    let before = import.specifiers.len();
    import.specifiers.retain(|specifier| {
        !matches!(specifier, ImportSpecifier::Named(named)
            if server_type(NextModule::Server, imported_name(named)).is_some())
    });
    if import.specifiers.len() == before {
        return ImportRewrite::Keep(import);
    }

    for specifier in &import.specifiers {
        log.warn(format!(
            "`{}` from next/server has no Fetch API equivalent; left imported",
            local_name(specifier)
        ));
    }
    log.change("next/server request and response imports removed in favour of Fetch API globals");
    if import.specifiers.is_empty() {
        ImportRewrite::Remove
    } else {
        ImportRewrite::Keep(import)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SyntaxMode;

    fn bindings(source: &str) -> ImportBindings {
        let ctx = SourceContext::new();
        let parsed = ctx.parse("a.tsx", source, SyntaxMode::Tsx).unwrap();
        ImportBindings::collect(&parsed.module)
    }

    #[test]
    fn tags_resolve_through_imports() {
        let bindings = bindings(
            "import Picture from 'next/image';\nimport { Link } from './ui';\nimport NextHead from 'next/head';",
        );
        assert_eq!(bindings.component("Picture"), Some(NextComponent::Image));
        assert_eq!(bindings.component("NextHead"), Some(NextComponent::Head));
        assert_eq!(bindings.component("Link"), None);
        assert_eq!(bindings.component("Script"), Some(NextComponent::Script));
        assert_eq!(bindings.component("Image"), Some(NextComponent::Image));
        assert_eq!(bindings.component("div"), None);
    }

    #[test]
    fn router_and_query_bindings_are_found() {
        let bindings = bindings(
            "import { useRouter as useR } from 'next/router';\nimport { useQuery } from '@tanstack/react-query';\nimport load from 'next/dynamic';",
        );
        assert_eq!(bindings.use_router_local(), Some("useR"));
        assert_eq!(bindings.dynamic_local(), Some("load"));
        assert!(bindings.has_use_query());
    }

    #[test]
    fn local_declarations_shadow_next_tags() {
        let bindings = bindings(
            "function Image(props) { return <img {...props} />; }\nexport class Script {}\nconst Head = () => null;",
        );
        assert_eq!(bindings.component("Image"), None);
        assert_eq!(bindings.component("Script"), None);
        assert_eq!(bindings.component("Head"), None);
        assert_eq!(bindings.component("Link"), Some(NextComponent::Link));
    }

    #[test]
    fn server_types_are_bound_by_local_name() {
        let bindings = bindings(
            "import type { NextApiRequest as Req, NextApiResponse } from 'next';\nimport { NextResponse } from 'next/server';",
        );
        assert_eq!(bindings.server_type("Req"), Some("Request"));
        assert_eq!(bindings.server_type("NextApiResponse"), Some("Response"));
        assert_eq!(bindings.server_type("NextResponse"), Some("Response"));
        assert_eq!(bindings.server_type("NextApiRequest"), None);
        assert!(bindings.imports_api_types());
        assert!(bindings.imports_next_server());
    }

    #[test]
    fn foreign_use_router_is_not_next() {
        let bindings = bindings("import { useRouter } from 'my-router';");
        assert_eq!(bindings.use_router_local(), None);
    }

    #[test]
    fn plan_renders_aliases_once() {
        let mut plan = ImportPlan::default();
        plan.add("Image", "Image");
        plan.add("Image", "Picture");
        plan.add("Image", "Image");
        assert_eq!(
            plan.render("@unpic/react"),
            "import { Image, Image as Picture } from \"@unpic/react\";"
        );
    }
}
