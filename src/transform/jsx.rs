// src/transform/jsx.rs
use swc_common::{Spanned, DUMMY_SP};
use swc_ecma_ast::*;

use super::imports::NextModule;
use super::ChangeLog;

/// Next.js components with a JSX rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextComponent {
    Image,
    Link,
    Head,
    Script,
}

impl NextComponent {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "Image" => Some(NextComponent::Image),
            "Link" => Some(NextComponent::Link),
            "Head" => Some(NextComponent::Head),
            "Script" => Some(NextComponent::Script),
            _ => None,
        }
    }

    pub fn for_module(module: NextModule) -> Option<Self> {
        match module {
            NextModule::Image => Some(NextComponent::Image),
            NextModule::Link => Some(NextComponent::Link),
            NextModule::Head => Some(NextComponent::Head),
            NextModule::Script => Some(NextComponent::Script),
            NextModule::Router | NextModule::Dynamic | NextModule::Server | NextModule::Next => None,
        }
    }
}

const UNSUPPORTED_IMAGE_PROPS: &[&str] = &["priority", "placeholder"];

/// Rewrites one element. Logs a change only when the element changed.
pub(crate) fn rewrite_element(element: &mut JSXElement, component: NextComponent, log: &mut ChangeLog) {
    match component {
        NextComponent::Image => adapt_image(element, log),
        NextComponent::Link => adapt_link(element, log),
        NextComponent::Head => {
            if rename(element, "Helmet") {
                log.change("<Head> renamed to <Helmet>");
            }
        }
        NextComponent::Script => adapt_script(element, log),
    }
}

fn adapt_image(element: &mut JSXElement, log: &mut ChangeLog) {
    let attrs = &mut element.opening.attrs;
    let mut removed = Vec::new();
    attrs.retain(|attr| match attr_name(attr) {
        Some(name) if UNSUPPORTED_IMAGE_PROPS.contains(&name) => {
            removed.push(name.to_string());
            false
        }
        _ => true,
    });
    for prop in &removed {
        log.warn(format!(
            "<Image> prop `{prop}` is not supported by @unpic/react and was removed"
        ));
    }

    let add_layout = !attrs.iter().any(|attr| attr_name(attr) == Some("layout"));
    if add_layout {
        attrs.push(string_attr("layout", "responsive"));
    }

    let mut actions: Vec<String> = removed.iter().map(|prop| format!("{prop} removed")).collect();
    if add_layout {
        actions.push("layout=\"responsive\" added".to_string());
    }
    if !actions.is_empty() {
        log.change(format!("<Image> adapted for @unpic/react: {}", actions.join(", ")));
    }
}

fn adapt_link(element: &mut JSXElement, log: &mut ChangeLog) {
    let attrs = &mut element.opening.attrs;
    let mut actions = Vec::new();

    for attr in attrs.iter_mut() {
        if let JSXAttrOrSpread::JSXAttr(JSXAttr {
            name: JSXAttrName::Ident(ident),
            ..
        }) = attr
        {
            if &*ident.sym == "href" {
                ident.sym = "to".into();
                actions.push("href renamed to to");
            }
        }
    }

    let mut legacy = false;
    attrs.retain(|attr| match attr_name(attr) {
        Some("passHref") => {
            actions.push("passHref removed");
            false
        }
        Some("legacyBehavior") => {
            legacy = true;
            actions.push("legacyBehavior removed");
            false
        }
        _ => true,
    });

    if legacy {
        log.warn("<Link legacyBehavior> removed; a nested <a> child may need unwrapping");
    }
    if !actions.is_empty() {
        log.change(format!("<Link> converted for react-router-dom: {}", actions.join(", ")));
    }
}

fn adapt_script(element: &mut JSXElement, log: &mut ChangeLog) {
    rename(element, "script");
    let attrs = &mut element.opening.attrs;

    let mut strategy = None;
    attrs.retain(|attr| {
        if attr_name(attr) != Some("strategy") {
            return true;
        }
        strategy = Some(string_value(attr).unwrap_or_default().to_string());
        false
    });

    let mut change = String::from("<Script> converted to <script>");
    match strategy.as_deref() {
        Some("lazyOnload") => {
            if !attrs.iter().any(|attr| attr_name(attr) == Some("defer")) {
                attrs.push(boolean_attr("defer"));
            }
            change.push_str(" with defer");
        }
        Some(unsupported @ ("beforeInteractive" | "worker")) => log.warn(format!(
            "<Script strategy=\"{unsupported}\"> has no plain <script> equivalent; strategy removed"
        )),
        _ => {}
    }
    if attrs.iter().any(|attr| attr_name(attr) == Some("onReady")) {
        log.warn("<Script onReady> has no plain <script> equivalent; use onLoad instead");
    }

    log.change(change);
}

/// Renames the opening and closing tags. Returns whether anything changed.
fn rename(element: &mut JSXElement, name: &str) -> bool {
    if matches!(&element.opening.name, JSXElementName::Ident(ident) if &*ident.sym == name) {
        return false;
    }
    let span = element.opening.name.span();
    element.opening.name = JSXElementName::Ident(Ident::new(name.into(), span));
    if let Some(closing) = element.closing.as_mut() {
        let span = closing.name.span();
        closing.name = JSXElementName::Ident(Ident::new(name.into(), span));
    }
    true
}

fn attr_name(attr: &JSXAttrOrSpread) -> Option<&str> {
    match attr {
        JSXAttrOrSpread::JSXAttr(JSXAttr {
            name: JSXAttrName::Ident(ident),
            ..
        }) => Some(&*ident.sym),
        _ => None,
    }
}

/// `prop="x"`, `prop='x'` and `prop={"x"}` all read as `x`.
fn string_value(attr: &JSXAttrOrSpread) -> Option<&str> {
    let JSXAttrOrSpread::JSXAttr(JSXAttr { value: Some(value), .. }) = attr else {
        return None;
    };
    match value {
        JSXAttrValue::Lit(Lit::Str(text)) => Some(&*text.value),
        JSXAttrValue::JSXExprContainer(JSXExprContainer {
            expr: JSXExpr::Expr(expr),
            ..
        }) => match &**expr {
            Expr::Lit(Lit::Str(text)) => Some(&*text.value),
            _ => None,
        },
        _ => None,
    }
}

fn string_attr(name: &str, value: &str) -> JSXAttrOrSpread {
    JSXAttrOrSpread::JSXAttr(JSXAttr {
        span: DUMMY_SP,
        name: JSXAttrName::Ident(Ident::new(name.into(), DUMMY_SP)),
        value: Some(JSXAttrValue::Lit(Lit::Str(Str {
            span: DUMMY_SP,
            value: value.into(),
            raw: None,
        }))),
    })
}

fn boolean_attr(name: &str) -> JSXAttrOrSpread {
    JSXAttrOrSpread::JSXAttr(JSXAttr {
        span: DUMMY_SP,
        name: JSXAttrName::Ident(Ident::new(name.into(), DUMMY_SP)),
        value: None,
    })
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
    fn image_drops_props_and_gains_layout() {
        let result = transform(
            "import Image from 'next/image';\nexport const A = () => <Image src=\"/a.png\" priority placeholder=\"blur\" alt=\"\" />;\n",
        );
        assert!(result.code.contains("import { Image } from \"@unpic/react\""));
        assert!(result.code.contains("layout=\"responsive\""));
        assert!(!result.code.contains("priority"));
        assert!(!result.code.contains("placeholder"));
        assert_eq!(result.warnings.len(), 2);
    }

    #[test]
    fn image_with_layout_and_no_unsupported_props_is_untouched() {
        let result = transform("export const A = () => <Image src=\"/a.png\" layout=\"fill\" />;\n");
        assert!(result.applied_transformations.is_empty());
    }

    #[test]
    fn link_renames_href_and_warns_on_legacy_behavior() {
        let result = transform(
            "import Link from 'next/link';\nexport const A = () => <Link href=\"/about\" passHref legacyBehavior><a>About</a></Link>;\n",
        );
        assert!(result.code.contains("<Link to=\"/about\">"));
        assert!(result.code.contains("import { Link } from \"react-router-dom\""));
        assert!(result.warnings.iter().any(|w| w.contains("legacyBehavior")));
    }

    #[test]
    fn aliased_imports_keep_their_local_names() {
        let result = transform(
            "import NextLink from 'next/link';\nexport const A = () => <NextLink href=\"/\">Home</NextLink>;\n",
        );
        assert!(result.code.contains("import { Link as NextLink } from \"react-router-dom\""));
        assert!(result.code.contains("<NextLink to=\"/\">Home</NextLink>"));
    }

    #[test]
    fn locally_declared_image_is_left_alone() {
        let source = "function Image(props) {\n  return <img {...props} />;\n}\nexport const A = () => <Image src=\"/a.png\" priority />;\n";
        let result = transform(source);
        assert_eq!(result.code, source);
        assert!(result.applied_transformations.is_empty());
    }

    #[test]
    fn link_from_another_library_is_left_alone() {
        let source = "import { Link } from '@chakra-ui/react';\nexport const A = () => <Link href=\"/\">Home</Link>;\n";
        let result = transform(source);
        assert_eq!(result.code, source);
    }

    #[test]
    fn script_strategies() {
        let result = transform(
            "import Script from 'next/script';\nexport const A = () => <><Script src=\"/a.js\" strategy=\"lazyOnload\" /><Script src=\"/b.js\" strategy=\"worker\"></Script></>;\n",
        );
        assert!(!result.code.contains("next/script"));
        assert!(result.code.contains("<script src=\"/a.js\" defer/>") || result.code.contains("<script src=\"/a.js\" defer />"));
        assert!(result.code.contains("</script>"));
        assert!(!result.code.contains("strategy"));
        assert!(result.warnings.iter().any(|w| w.contains("worker")));
    }

    #[test]
    fn head_children_are_preserved() {
        let result = transform(
            "import Head from 'next/head';\nexport const A = () => <Head><title>Blog</title><meta name=\"x\" /></Head>;\n",
        );
        assert!(result.code.contains("import { Helmet } from \"react-helmet-async\""));
        assert!(result.code.contains("<Helmet><title>Blog</title><meta name=\"x\"/></Helmet>")
            || result.code.contains("<Helmet><title>Blog</title><meta name=\"x\" /></Helmet>"));
    }
}
