// src/source.rs
//! Where project files come from.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::{DirEntry, WalkDir};

use crate::model::normalize_separators;

/// Directories never scanned for sources.
const SKIPPED_DIRS: &[&str] = &["node_modules", ".next", ".git", "dist", "out"];

/// A set of project files addressed by `/`-separated relative paths.
pub trait FileSource {
    /// Every file in the set, in a stable order.
    fn paths(&self) -> Vec<String>;

    fn read_to_string(&self, path: &str) -> impl Future<Output = io::Result<String>> + Send;
}

/// Files held in memory, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSource {
    files: Vec<(String, String)>,
}

impl MemoryFileSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file, replacing the content of an existing one in place.
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        let path = normalize_separators(&path.into());
        let content = content.into();
        match self.files.iter_mut().find(|(existing, _)| *existing == path) {
            Some((_, old)) => *old = content,
            None => self.files.push((path, content)),
        }
    }

    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl<P: Into<String>, C: Into<String>> FromIterator<(P, C)> for MemoryFileSource {
    fn from_iter<I: IntoIterator<Item = (P, C)>>(iter: I) -> Self {
        let mut source = Self::new();
        for (path, content) in iter {
            source.insert(path, content);
        }
        source
    }
}

impl FileSource for MemoryFileSource {
    fn paths(&self) -> Vec<String> {
        self.files.iter().map(|(path, _)| path.clone()).collect()
    }

    fn read_to_string(&self, path: &str) -> impl Future<Output = io::Result<String>> + Send {
        let found = self
            .files
            .iter()
            .find(|(existing, _)| existing == path)
            .map(|(_, content)| content.clone());
        let path = path.to_string();
        async move {
            found.ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{path}: not in file set")))
        }
    }
}

/// Files below a project directory. Paths are relative to the root and
/// sorted; build output and dependency directories are skipped.
#[derive(Debug, Clone)]
pub struct DiskFileSource {
    root: PathBuf,
}

impl DiskFileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRS.contains(&name))
}

impl FileSource for DiskFileSource {
    fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|entry| !is_skipped_dir(entry))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!(error = %err, "skipping unreadable entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let relative = entry.path().strip_prefix(&self.root).ok()?;
                Some(normalize_separators(&relative.to_string_lossy()))
            })
            .collect();
        paths.sort();
        paths
    }

    fn read_to_string(&self, path: &str) -> impl Future<Output = io::Result<String>> + Send {
        tokio::fs::read_to_string(self.root.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[tokio::test]
    async fn memory_source_keeps_insertion_order() {
        let source: MemoryFileSource = [("pages\\b.tsx", "b"), ("pages/a.tsx", "a"), ("pages/b.tsx", "b2")]
            .into_iter()
            .collect();

        assert_eq!(source.paths(), vec!["pages/b.tsx", "pages/a.tsx"]);
        assert_eq!(source.read_to_string("pages/b.tsx").await.unwrap(), "b2");
        let missing = source.read_to_string("nope.tsx").await.unwrap_err();
        assert_eq!(missing.kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn disk_source_skips_build_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for file in ["pages/index.tsx", "node_modules/react/index.js", ".next/build.js", "src/out.ts"] {
            let path = root.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "export {}").unwrap();
        }

        let source = DiskFileSource::new(root);
        assert_eq!(source.paths(), vec!["pages/index.tsx", "src/out.ts"]);
        assert_eq!(source.read_to_string("pages/index.tsx").await.unwrap(), "export {}");
    }
}
