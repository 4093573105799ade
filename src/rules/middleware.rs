// src/rules/middleware.rs
use super::{rule, Category, Complexity, Replacement, TransformationRule};

pub(super) fn rules() -> Vec<TransformationRule> {
    vec![
        rule(
            "next-server-import",
            r#"(?m)^[ \t]*import\s+(?:type\s+)?\{[^}]*\bNext(?:Request|Response)\b[^}]*\}\s+from\s+['"]next/server['"];?[ \t]*\r?\n?"#,
            Replacement::Template(""),
            "next/server import removed; Request and Response are Fetch API globals",
            Complexity::Simple,
            Category::Middleware,
        ),
        rule(
            "next-request-type",
            r"\bNextRequest\b",
            Replacement::Template("Request"),
            "NextRequest renamed to Request",
            Complexity::Simple,
            Category::Middleware,
        ),
        rule(
            "next-response-type",
            r"\bNextResponse\b",
            Replacement::Template("Response"),
            "NextResponse renamed to Response",
            Complexity::Simple,
            Category::Middleware,
        ),
        rule(
            "middleware-matcher-config",
            r"export\s+const\s+config\s*=\s*\{[^{}]*\bmatcher\b[^{}]*\};?",
            Replacement::Template("// Edge middleware matcher removed; mount the middleware on these paths in the server"),
            "middleware matcher config removed",
            Complexity::Medium,
            Category::Middleware,
        ),
    ]
}
