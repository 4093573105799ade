// src/rules/routing.rs
use regex::Captures;

use super::{group, rule, Category, Complexity, Replacement, TransformationRule};
use crate::error::RuleApplicationError;

pub(super) fn rules() -> Vec<TransformationRule> {
    vec![
        rule(
            "router-hooks-import",
            r#"import\s*\{\s*useRouter\s*\}\s*from\s*['"]next/router['"]"#,
            Replacement::Template("import { useNavigate, useParams, useLocation } from 'react-router-dom'"),
            "next/router useRouter import replaced with react-router-dom hooks",
            Complexity::Simple,
            Category::Routing,
        ),
        rule(
            "use-router-declaration",
            r"(?m)^([ \t]*)(?:const|let)\s+router\s*=\s*useRouter\(\s*\)[ \t]*;?",
            Replacement::Computed(expand_use_router),
            "useRouter() split into useNavigate, useParams and useLocation",
            Complexity::Medium,
            Category::Routing,
        ),
        rule(
            "router-push",
            r"\brouter\.push\(",
            Replacement::Template("navigate("),
            "router.push() converted to navigate()",
            Complexity::Simple,
            Category::Routing,
        ),
        rule(
            "router-replace",
            r"\brouter\.replace\(([^()]*)\)",
            Replacement::Computed(navigate_replace),
            "router.replace() converted to navigate(path, { replace: true })",
            Complexity::Medium,
            Category::Routing,
        ),
        rule(
            "router-back",
            r"\brouter\.back\(\s*\)",
            Replacement::Template("navigate(-1)"),
            "router.back() converted to navigate(-1)",
            Complexity::Simple,
            Category::Routing,
        ),
        rule(
            "router-query-key",
            r"\brouter\.query\.([A-Za-z_$][\w$]*)",
            Replacement::Template("params.${1}"),
            "router.query.<key> converted to params.<key>",
            Complexity::Simple,
            Category::Routing,
        ),
        rule(
            "router-query",
            r"\brouter\.query\b",
            Replacement::Template("params"),
            "router.query converted to params",
            Complexity::Simple,
            Category::Routing,
        ),
        rule(
            "router-pathname",
            r"\brouter\.(?:pathname|asPath)\b",
            Replacement::Template("location.pathname"),
            "router.pathname/asPath converted to location.pathname",
            Complexity::Simple,
            Category::Routing,
        ),
    ]
}

fn expand_use_router(caps: &Captures<'_>) -> Result<String, RuleApplicationError> {
    let indent = group(caps, "use-router-declaration", 1)?;
    Ok(format!(
        "{indent}const navigate = useNavigate();\n{indent}const params = useParams();\n{indent}const location = useLocation();"
    ))
}

fn navigate_replace(caps: &Captures<'_>) -> Result<String, RuleApplicationError> {
    let target = group(caps, "router-replace", 1)?.trim();
    if target.is_empty() {
        return Err(RuleApplicationError::InvalidMatch {
            rule: "router-replace",
            reason: "router.replace() has no target path".to_string(),
        });
    }
    Ok(format!("navigate({target}, {{ replace: true }})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(id: &str, text: &str) -> Result<String, RuleApplicationError> {
        let rules = rules();
        let rule = rules.iter().find(|rule| rule.id == id).unwrap();
        rule.apply(text)
    }

    #[test]
    fn use_router_keeps_indentation() {
        let out = apply("use-router-declaration", "function A() {\n    const router = useRouter();\n}").unwrap();
        assert_eq!(
            out,
            "function A() {\n    const navigate = useNavigate();\n    const params = useParams();\n    const location = useLocation();\n}"
        );
    }

    #[test]
    fn replace_without_target_is_rejected() {
        let err = apply("router-replace", "router.replace()").unwrap_err();
        assert!(matches!(err, RuleApplicationError::InvalidMatch { rule: "router-replace", .. }));
        assert_eq!(
            apply("router-replace", "router.replace('/login')").unwrap(),
            "navigate('/login', { replace: true })"
        );
    }

    #[test]
    fn push_ignores_other_receivers() {
        assert_eq!(apply("router-push", "myrouter.push(x)").unwrap(), "myrouter.push(x)");
    }
}
