// src/rules/mod.rs
//! Catalogue of textual Next.js → Vite rewrites.
//!
//! Rules are compiled once and applied in declaration order: a later rule
//! sees the text already rewritten by earlier ones. The regex fallback
//! transformer is the only consumer that applies them; the syntax tree
//! transformer implements the same catalogue structurally.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::RuleApplicationError;

mod api;
mod component;
mod config;
mod data_fetching;
mod middleware;
mod routing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Routing,
    Component,
    DataFetching,
    Api,
    Middleware,
    Config,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
}

/// Builds the replacement for one match. Must be pure and deterministic.
pub type ReplaceFn = fn(&Captures<'_>) -> Result<String, RuleApplicationError>;

pub enum Replacement {
    /// Static text; `$n` / `${n}` expand to capture groups.
    Template(&'static str),
    Computed(ReplaceFn),
}

pub struct TransformationRule {
    pub id: &'static str,
    pub pattern: Regex,
    pub replacement: Replacement,
    pub description: &'static str,
    pub complexity: Complexity,
    pub category: Category,
}

impl std::fmt::Debug for TransformationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformationRule")
            .field("id", &self.id)
            .field("pattern", &self.pattern.as_str())
            .field("category", &self.category)
            .field("complexity", &self.complexity)
            .finish()
    }
}

impl TransformationRule {
    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// Rewrites every match in `text`. A computed replacement that rejects
    /// any single match rejects the whole rule, leaving `text` untouched.
    pub fn apply(&self, text: &str) -> Result<String, RuleApplicationError> {
        match &self.replacement {
            Replacement::Template(template) => {
                Ok(self.pattern.replace_all(text, *template).into_owned())
            }
            Replacement::Computed(replace) => {
                let mut out = String::with_capacity(text.len());
                let mut last = 0;
                for caps in self.pattern.captures_iter(text) {
                    let Some(whole) = caps.get(0) else { continue };
                    out.push_str(&text[last..whole.start()]);
                    out.push_str(&replace(&caps)?);
                    last = whole.end();
                }
                out.push_str(&text[last..]);
                Ok(out)
            }
        }
    }
}

pub(crate) fn rule(
    id: &'static str,
    pattern: &str,
    replacement: Replacement,
    description: &'static str,
    complexity: Complexity,
    category: Category,
) -> TransformationRule {
    TransformationRule {
        id,
        pattern: Regex::new(pattern).expect("rule patterns are valid regular expressions"),
        replacement,
        description,
        complexity,
        category,
    }
}

/// Required capture group of a computed replacement.
pub(crate) fn group<'t>(
    caps: &Captures<'t>,
    rule: &'static str,
    index: usize,
) -> Result<&'t str, RuleApplicationError> {
    caps.get(index)
        .map(|m| m.as_str())
        .ok_or(RuleApplicationError::MissingCapture { rule, group: index })
}

static RULES: Lazy<Vec<TransformationRule>> = Lazy::new(|| {
    let mut rules = routing::rules();
    rules.extend(component::rules());
    rules.extend(data_fetching::rules());
    rules.extend(api::rules());
    rules.extend(middleware::rules());
    rules.extend(config::rules());
    rules
});

/// Every rule, in application order.
pub fn rules() -> &'static [TransformationRule] {
    &RULES
}

pub fn by_category(category: Category) -> impl Iterator<Item = &'static TransformationRule> {
    rules().iter().filter(move |rule| rule.category == category)
}

pub fn by_complexity(complexity: Complexity) -> impl Iterator<Item = &'static TransformationRule> {
    rules().iter().filter(move |rule| rule.complexity == complexity)
}

/// Number of rules per complexity tier.
pub fn complexity_stats() -> BTreeMap<Complexity, usize> {
    let mut stats = BTreeMap::new();
    for rule in rules() {
        *stats.entry(rule.complexity).or_insert(0) += 1;
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_rule_compiles_with_a_unique_id() {
        let ids: HashSet<_> = rules().iter().map(|rule| rule.id).collect();
        assert_eq!(ids.len(), rules().len());
    }

    #[test]
    fn categories_keep_declaration_order() {
        let order: Vec<Category> = rules().iter().map(|rule| rule.category).collect();
        let first_component = order.iter().position(|c| *c == Category::Component).unwrap();
        let first_data = order.iter().position(|c| *c == Category::DataFetching).unwrap();
        assert!(order[..first_component].iter().all(|c| *c == Category::Routing));
        assert!(first_component < first_data);
    }

    #[test]
    fn query_key_rule_runs_before_bare_query_rule() {
        let ids: Vec<&str> = by_category(Category::Routing).map(|rule| rule.id).collect();
        let keyed = ids.iter().position(|id| *id == "router-query-key").unwrap();
        let bare = ids.iter().position(|id| *id == "router-query").unwrap();
        assert!(keyed < bare);
    }

    #[test]
    fn stats_cover_every_rule() {
        let total: usize = complexity_stats().values().sum();
        assert_eq!(total, rules().len());
        assert!(by_complexity(Complexity::Complex).count() >= 1);
    }

    #[test]
    fn template_replacement_expands_groups() {
        let rule = rules().iter().find(|rule| rule.id == "router-query-key").unwrap();
        assert_eq!(rule.apply("router.query.slug").unwrap(), "params.slug");
    }
}
