// src/routes/layout.rs
use std::collections::BTreeMap;

use crate::model::extension;

const CODE_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx"];

/// Directories from `dir` up to the pages root, nearest first. Directories
/// are relative to the root, which itself is `""`.
///
/// `blog/posts` yields `blog/posts`, `blog`, `""`.
#[derive(Clone)]
pub(crate) struct Ancestors<'a> {
    current: Option<&'a str>,
}

impl<'a> Ancestors<'a> {
    pub(crate) fn new(dir: &'a str) -> Self {
        Self { current: Some(dir) }
    }
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        self.current = match current.rsplit_once('/') {
            Some((parent, _)) => Some(parent),
            None if current.is_empty() => None,
            None => Some(""),
        };
        Some(current)
    }
}

/// `_layout.tsx`, `layout.jsx`, ...
pub(crate) fn is_layout_file(file_name: &str) -> bool {
    let Some((stem, _)) = file_name.rsplit_once('.') else {
        return false;
    };
    matches!(stem, "_layout" | "layout")
        && extension(file_name).is_some_and(|ext| CODE_EXTENSIONS.contains(&ext.as_str()))
}

/// Layout files keyed by the directory they wrap.
#[derive(Debug, Default)]
pub(crate) struct LayoutIndex {
    by_dir: BTreeMap<String, String>,
}

impl LayoutIndex {
    /// The first layout file seen for a directory wins.
    pub(crate) fn insert(&mut self, dir: &str, file: &str) {
        self.by_dir
            .entry(dir.to_string())
            .or_insert_with(|| file.to_string());
    }

    /// Nearest layout at or above `dir`, as `(layout dir, layout file)`.
    pub(crate) fn nearest<'a>(&'a self, dir: &'a str) -> Option<(&'a str, &'a str)> {
        Ancestors::new(dir).find_map(|ancestor| {
            self.by_dir
                .get_key_value(ancestor)
                .map(|(dir, file)| (dir.as_str(), file.as_str()))
        })
    }
}
