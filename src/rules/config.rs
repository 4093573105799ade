// src/rules/config.rs
use super::{rule, Category, Complexity, Replacement, TransformationRule};

pub(super) fn rules() -> Vec<TransformationRule> {
    vec![
        rule(
            "public-env-vars",
            r"\bprocess\.env\.NEXT_PUBLIC_([A-Za-z0-9_]+)",
            Replacement::Template("import.meta.env.VITE_${1}"),
            "NEXT_PUBLIC_ environment variables moved to import.meta.env.VITE_",
            Complexity::Medium,
            Category::Config,
        ),
        rule(
            "next-page-import",
            r#"import\s+(?:type\s+)?\{\s*NextPage\s*\}\s+from\s+['"]next['"];?"#,
            Replacement::Template("import type React from 'react';"),
            "NextPage import replaced with React types",
            Complexity::Simple,
            Category::General,
        ),
        rule(
            "next-page-type",
            r":\s*NextPage\b",
            Replacement::Template(": React.FC"),
            "NextPage annotation replaced with React.FC",
            Complexity::Simple,
            Category::General,
        ),
    ]
}
