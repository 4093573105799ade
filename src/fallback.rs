// src/fallback.rs
//! Text-level transformer used when a file cannot be parsed.
//!
//! Applies the rule catalogue in order to raw text. It has no lexical
//! awareness: matches inside string literals and comments are rewritten too.

use tracing::{debug, warn};

use crate::model::TransformResult;
use crate::rules::{self, Category, TransformationRule};

pub struct RegexTransformer {
    rules: Vec<&'static TransformationRule>,
}

impl Default for RegexTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl RegexTransformer {
    /// Every rule of the catalogue.
    pub fn new() -> Self {
        Self::with_rules(rules::rules().iter().collect())
    }

    pub fn with_rules(rules: Vec<&'static TransformationRule>) -> Self {
        Self { rules }
    }

    pub fn for_category(category: Category) -> Self {
        Self::with_rules(rules::by_category(category).collect())
    }

    pub fn transform(&self, source: &str) -> TransformResult {
        let mut result = TransformResult::unchanged(source);

        for rule in &self.rules {
            if !rule.is_match(&result.code) {
                continue;
            }
            match rule.apply(&result.code) {
                Ok(code) => {
                    debug!(rule = rule.id, "applied regex rule");
                    result.code = code;
                    result.applied_transformations.push(rule.description.to_string());
                }
                Err(err) => {
                    warn!(rule = rule.id, error = %err, "skipping regex rule");
                    result.warnings.push(err.to_string());
                }
            }
        }

        result
    }
}
