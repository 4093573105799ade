// src/rules/api.rs
use super::{rule, Category, Complexity, Replacement, TransformationRule};

pub(super) fn rules() -> Vec<TransformationRule> {
    vec![
        rule(
            "api-types-import",
            r#"import\s+(?:type\s+)?\{[^}]*\bNextApi(?:Request|Response)\b[^}]*\}\s+from\s+['"]next['"];?"#,
            Replacement::Template("import type { Request, Response } from 'express';"),
            "Next.js API types import replaced with Express types",
            Complexity::Medium,
            Category::Api,
        ),
        rule(
            "api-request-type",
            r"\bNextApiRequest\b",
            Replacement::Template("Request"),
            "NextApiRequest renamed to Request",
            Complexity::Simple,
            Category::Api,
        ),
        rule(
            "api-response-type",
            r"\bNextApiResponse\b",
            Replacement::Template("Response"),
            "NextApiResponse renamed to Response",
            Complexity::Simple,
            Category::Api,
        ),
    ]
}
