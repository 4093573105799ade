// src/rules/component.rs
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::{group, rule, Category, Complexity, Replacement, TransformationRule};
use crate::error::RuleApplicationError;

static LEGACY_LINK_PROP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+(?:passHref|legacyBehavior)\b(?:=\{\s*(?:true|false)\s*\})?").unwrap()
});

static UNSUPPORTED_IMAGE_PROP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\s+(?:priority|placeholder)\b(?:=(?:"[^"]*"|'[^']*'|\{[^}]*\}))?"#).unwrap()
});

static SCRIPT_STRATEGY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\s+strategy=(?:"([^"]*)"|'([^']*)'|\{\s*["']([^"']*)["']\s*\})"#).unwrap()
});

pub(super) fn rules() -> Vec<TransformationRule> {
    vec![
        rule(
            "link-import",
            r#"import\s+Link\s+from\s+['"]next/link['"]"#,
            Replacement::Template("import { Link } from 'react-router-dom'"),
            "next/link import replaced with react-router-dom Link",
            Complexity::Simple,
            Category::Component,
        ),
        rule(
            "link-href",
            r"(<Link\b[^>]*?\s)href=",
            Replacement::Template("${1}to="),
            "Link href prop renamed to to",
            Complexity::Medium,
            Category::Component,
        ),
        rule(
            "link-legacy-props",
            r"<Link\b[^>]*?\s(?:passHref|legacyBehavior)\b[^>]*>",
            Replacement::Computed(strip_legacy_link_props),
            "Link passHref/legacyBehavior props removed",
            Complexity::Simple,
            Category::Component,
        ),
        rule(
            "image-import",
            r#"import\s+Image\s+from\s+['"]next/image['"]"#,
            Replacement::Template("import { Image } from '@unpic/react'"),
            "next/image import replaced with @unpic/react Image",
            Complexity::Medium,
            Category::Component,
        ),
        rule(
            "image-unsupported-props",
            r"<Image\b[^>]*?\s(?:priority|placeholder)\b[^>]*>",
            Replacement::Computed(adapt_image_tag),
            "Image priority/placeholder props removed and default layout added",
            Complexity::Medium,
            Category::Component,
        ),
        rule(
            "head-import",
            r#"import\s+Head\s+from\s+['"]next/head['"]"#,
            Replacement::Template("import { Helmet } from 'react-helmet-async'"),
            "next/head import replaced with react-helmet-async Helmet",
            Complexity::Simple,
            Category::Component,
        ),
        rule(
            "head-element",
            r"<(/?)Head\b",
            Replacement::Template("<${1}Helmet"),
            "Head element renamed to Helmet",
            Complexity::Simple,
            Category::Component,
        ),
        rule(
            "dynamic-import",
            r#"import\s+dynamic\s+from\s+['"]next/dynamic['"]"#,
            Replacement::Template("import { lazy, Suspense } from 'react'"),
            "next/dynamic import replaced with React lazy and Suspense",
            Complexity::Simple,
            Category::Component,
        ),
        rule(
            "dynamic-call",
            r"\bdynamic\(\s*\(\s*\)\s*=>",
            Replacement::Template("lazy(() =>"),
            "dynamic() call converted to lazy()",
            Complexity::Medium,
            Category::Component,
        ),
        rule(
            "script-import",
            r#"(?m)^[ \t]*import\s+Script\s+from\s+['"]next/script['"];?[ \t]*\r?\n?"#,
            Replacement::Template(""),
            "next/script import removed",
            Complexity::Simple,
            Category::Component,
        ),
        rule(
            "script-element",
            r"<Script\b([^>]*)>",
            Replacement::Computed(plain_script_tag),
            "Script element converted to a plain script element",
            Complexity::Medium,
            Category::Component,
        ),
        rule(
            "script-close",
            r"</Script>",
            Replacement::Template("</script>"),
            "Script closing tag converted",
            Complexity::Simple,
            Category::Component,
        ),
    ]
}

fn strip_legacy_link_props(caps: &Captures<'_>) -> Result<String, RuleApplicationError> {
    let tag = group(caps, "link-legacy-props", 0)?;
    Ok(LEGACY_LINK_PROP.replace_all(tag, "").into_owned())
}

fn adapt_image_tag(caps: &Captures<'_>) -> Result<String, RuleApplicationError> {
    let tag = group(caps, "image-unsupported-props", 0)?;
    let stripped = UNSUPPORTED_IMAGE_PROP.replace_all(tag, "").into_owned();
    if stripped.contains("layout=") {
        return Ok(stripped);
    }
    let (head, close) = match stripped.strip_suffix("/>") {
        Some(head) => (head.trim_end(), " />"),
        None => (stripped.trim_end_matches('>').trim_end(), ">"),
    };
    Ok(format!("{head} layout=\"responsive\"{close}"))
}

fn plain_script_tag(caps: &Captures<'_>) -> Result<String, RuleApplicationError> {
    let attrs = group(caps, "script-element", 1)?;
    let attrs = SCRIPT_STRATEGY.replace_all(attrs, |strategy: &Captures<'_>| {
        let value = (1..=3).find_map(|i| strategy.get(i)).map(|m| m.as_str());
        if value == Some("lazyOnload") { " defer" } else { "" }
    });
    Ok(format!("<script{attrs}>"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(id: &str, text: &str) -> String {
        let rules = rules();
        let rule = rules.iter().find(|rule| rule.id == id).unwrap();
        rule.apply(text).unwrap()
    }

    #[test]
    fn image_tag_loses_every_unsupported_prop() {
        let out = apply(
            "image-unsupported-props",
            r#"<Image src="/a.png" priority placeholder="blur" alt="" />"#,
        );
        assert_eq!(out, r#"<Image src="/a.png" alt="" layout="responsive" />"#);
    }

    #[test]
    fn image_tag_keeps_existing_layout() {
        let out = apply("image-unsupported-props", r#"<Image src={hero} layout="fill" priority>"#);
        assert_eq!(out, r#"<Image src={hero} layout="fill">"#);
    }

    #[test]
    fn lazy_script_becomes_deferred() {
        assert_eq!(
            apply("script-element", r#"<Script src="/x.js" strategy="lazyOnload" />"#),
            r#"<script src="/x.js" defer />"#
        );
        assert_eq!(
            apply("script-element", r#"<Script strategy="afterInteractive" src="/y.js">"#),
            r#"<script src="/y.js">"#
        );
    }

    #[test]
    fn link_props_are_all_removed() {
        assert_eq!(
            apply("link-legacy-props", r#"<Link to="/a" passHref legacyBehavior>"#),
            r#"<Link to="/a">"#
        );
    }

    #[test]
    fn head_rename_leaves_header_alone() {
        assert_eq!(
            apply("head-element", "<Head><title>x</title></Head><Header />"),
            "<Helmet><title>x</title></Helmet><Header />"
        );
    }
}
