// src/model.rs
use serde::Serialize;

/// What a file is, judged from its path alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// A page or shared component under the pages root.
    Page,
    /// Any other JavaScript/TypeScript module.
    Component,
    /// A handler under an `api` directory.
    ApiHandler,
    /// `middleware.*` at the project root or directly under `src/`.
    Middleware,
    Config,
    Style,
    /// Images, fonts, markdown and everything else that is not code.
    Other,
}

const CODE_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs", "cjs"];
const STYLE_EXTENSIONS: &[&str] = &["css", "scss", "sass", "less"];

impl SourceKind {
    pub fn detect(path: &str, pages_root: &str) -> Self {
        let path = normalize_separators(path);
        let file_name = path.rsplit('/').next().unwrap_or(&path);
        let ext = extension(file_name);

        if is_config_file(file_name, ext.as_deref()) {
            return SourceKind::Config;
        }

        match ext.as_deref() {
            Some(ext) if STYLE_EXTENSIONS.contains(&ext) => SourceKind::Style,
            Some(ext) if CODE_EXTENSIONS.contains(&ext) && is_middleware_file(&path) => {
                SourceKind::Middleware
            }
            Some(ext) if CODE_EXTENSIONS.contains(&ext) => {
                let dirs: Vec<&str> = path.split('/').collect();
                let dirs = &dirs[..dirs.len().saturating_sub(1)];
                if dirs.iter().any(|segment| *segment == "api") {
                    SourceKind::ApiHandler
                } else if find_root(&path, pages_root).is_some() {
                    SourceKind::Page
                } else {
                    SourceKind::Component
                }
            }
            _ => SourceKind::Other,
        }
    }

    /// Whether files of this kind are JavaScript/TypeScript code.
    pub fn is_code(self) -> bool {
        matches!(
            self,
            SourceKind::Page | SourceKind::Component | SourceKind::ApiHandler | SourceKind::Middleware
        )
    }
}

fn is_middleware_file(path: &str) -> bool {
    let (dir, file_name) = path.rsplit_once('/').unwrap_or(("", path));
    (dir.is_empty() || dir == "src")
        && file_name.rsplit_once('.').is_some_and(|(stem, _)| stem == "middleware")
}

fn is_config_file(file_name: &str, ext: Option<&str>) -> bool {
    if file_name.starts_with(".env") || ext == Some("json") {
        return true;
    }
    // next.config.js, tailwind.config.ts, postcss.config.cjs, ...
    let stem = file_name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(file_name);
    stem.ends_with(".config") && ext.is_some_and(|ext| CODE_EXTENSIONS.contains(&ext))
}

pub(crate) fn extension(file_name: &str) -> Option<String> {
    file_name
        .rsplit_once('.')
        .filter(|(stem, _)| !stem.is_empty())
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

pub(crate) fn normalize_separators(path: &str) -> String {
    let path = path.replace('\\', "/");
    path.strip_prefix("./").map(str::to_string).unwrap_or(path)
}

/// Returns the part of `path` below the pages root, e.g. `blog/[id].tsx` for
/// `src/pages/blog/[id].tsx`. `root` may span several segments.
pub(crate) fn find_root<'a>(path: &'a str, root: &str) -> Option<&'a str> {
    let root: Vec<&str> = root.trim_matches('/').split('/').collect();
    let segments: Vec<&str> = path.split('/').collect();
    if segments.len() <= root.len() {
        return None;
    }
    let start = (0..segments.len() - root.len()).find(|&i| segments[i..i + root.len()] == root[..])?;
    let offset: usize = segments[..start + root.len()].iter().map(|s| s.len() + 1).sum();
    Some(&path[offset..])
}

/// One input file, read and classified.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub path: String,
    pub content: String,
    pub kind: SourceKind,
}

impl SourceUnit {
    pub fn new(path: impl Into<String>, content: impl Into<String>, pages_root: &str) -> Self {
        let path = path.into();
        let kind = SourceKind::detect(&path, pages_root);
        Self {
            path,
            content: content.into(),
            kind,
        }
    }
}

/// Outcome of transforming one source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformResult {
    /// Output text. Identical to the input when nothing was rewritten.
    pub code: String,
    /// One entry per rewrite actually performed, in the order performed.
    pub applied_transformations: Vec<String>,
    /// Constructs that were recognized but not (fully) converted.
    pub warnings: Vec<String>,
}

impl TransformResult {
    pub fn unchanged(source: &str) -> Self {
        Self {
            code: source.to_string(),
            applied_transformations: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn is_modified(&self) -> bool {
        !self.applied_transformations.is_empty()
    }
}
