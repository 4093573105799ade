// src/rules/data_fetching.rs
use regex::Captures;

use super::{group, rule, Category, Complexity, Replacement, TransformationRule};
use crate::error::RuleApplicationError;
use crate::transform::DataFetchingFn;

// Function bodies are matched up to two nested brace levels; deeper bodies
// leave the export untouched.
const DATA_FETCHING_EXPORT: &str = concat!(
    r"export\s+(?:",
    r"const\s+(getServerSideProps|getStaticProps|getStaticPaths)\s*(?::\s*[\w.<>, ]+)?=\s*(async\s+)?",
    r"(?:\([^)]*\)|[A-Za-z_$][\w$]*)\s*=>\s*",
    r"|(async\s+)?function\s+(getServerSideProps|getStaticProps|getStaticPaths)\s*\([^)]*\)\s*(?::\s*[^{]+)?",
    r")\{((?:[^{}]|\{(?:[^{}]|\{[^{}]*\})*\})*)\};?",
);

pub(super) fn rules() -> Vec<TransformationRule> {
    vec![
        rule(
            "next-data-types-import",
            r#"import\s+(?:type\s+)?\{[^}]*\b(?:GetServerSideProps|GetStaticProps|GetStaticPaths)\b[^}]*\}\s+from\s+['"]next['"];?"#,
            Replacement::Template("// Next.js data-fetching types removed; data is loaded with @tanstack/react-query"),
            "Next.js data-fetching type imports removed",
            Complexity::Simple,
            Category::DataFetching,
        ),
        rule(
            "data-fetching-export",
            DATA_FETCHING_EXPORT,
            Replacement::Computed(query_hook),
            "Next.js data-fetching export converted to a React Query hook",
            Complexity::Complex,
            Category::DataFetching,
        ),
    ]
}

fn query_hook(caps: &Captures<'_>) -> Result<String, RuleApplicationError> {
    const RULE: &str = "data-fetching-export";

    let name = caps
        .get(1)
        .or_else(|| caps.get(4))
        .map(|m| m.as_str())
        .ok_or(RuleApplicationError::MissingCapture { rule: RULE, group: 1 })?;
    let is_async = caps.get(2).is_some() || caps.get(3).is_some();
    let body = group(caps, RULE, 5)?;
    let function = DataFetchingFn::from_name(name).ok_or_else(|| RuleApplicationError::InvalidMatch {
        rule: RULE,
        reason: format!("{name} is not a data-fetching function"),
    })?;

    // The template ends its queryFn with an empty block; fill it.
    let template = function.hook_template(is_async);
    Ok(template.replacen("() => {}", &format!("() => {{{body}}}"), 1))
}
