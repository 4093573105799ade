// src/routes/mod.rs
//! Page routes derived from file paths alone.

use serde::Serialize;
use tracing::debug;

use crate::model::{extension, find_root, normalize_separators};

mod convert;
mod layout;
mod segment;

pub use convert::{component_name, convert_routes, render_route_module, RouteEntry};
pub use segment::{classify, Segment};

use layout::{is_layout_file, LayoutIndex};
use segment::target_path;

const PAGE_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx"];

/// The layout wrapping a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutRef {
    pub file: String,
    /// Layout directory in React Router form, e.g. `/blog/:id`.
    pub base_path: String,
    /// Layout directory as written, e.g. `/blog/[id]`.
    pub original_base_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub file: String,
    /// `/blog/[id]`
    pub original_path: String,
    /// `/blog/:id`
    pub path: String,
    pub params: Vec<String>,
    pub is_index: bool,
    pub is_dynamic: bool,
    pub is_catch_all: bool,
    pub is_optional_catch_all: bool,
    pub layout: Option<LayoutRef>,
}

pub struct RouteAnalyzer {
    pages_root: String,
}

impl Default for RouteAnalyzer {
    fn default() -> Self {
        Self::new("pages")
    }
}

/// A file below the pages root, split into its parts.
struct PageFile<'a> {
    file: String,
    /// Directory below the root, `""` for the root itself.
    dir: &'a str,
    file_name: &'a str,
}

impl RouteAnalyzer {
    pub fn new(pages_root: impl Into<String>) -> Self {
        Self {
            pages_root: pages_root.into(),
        }
    }

    /// Routes in input order. Files outside the pages root, non-code files,
    /// files starting with `_`, layout files and API handlers are skipped.
    pub fn analyze<S: AsRef<str>>(&self, files: &[S]) -> Vec<Route> {
        let normalized: Vec<String> = files
            .iter()
            .map(|file| normalize_separators(file.as_ref()))
            .collect();
        let pages: Vec<PageFile<'_>> = normalized
            .iter()
            .filter_map(|file| self.page_file(file))
            .collect();

        let mut layouts = LayoutIndex::default();
        for page in pages.iter().filter(|page| is_layout_file(page.file_name)) {
            layouts.insert(page.dir, &page.file);
        }

        let routes: Vec<Route> = pages
            .iter()
            .filter(|page| is_page(page))
            .map(|page| build_route(page, &layouts))
            .collect();
        debug!(routes = routes.len(), root = %self.pages_root, "analyzed routes");
        routes
    }

    fn page_file<'a>(&self, file: &'a str) -> Option<PageFile<'a>> {
        let relative = find_root(file, &self.pages_root)?;
        let ext = extension(relative)?;
        if !PAGE_EXTENSIONS.contains(&ext.as_str()) {
            return None;
        }
        let (dir, file_name) = relative.rsplit_once('/').unwrap_or(("", relative));
        Some(PageFile {
            file: file.to_string(),
            dir,
            file_name,
        })
    }
}

fn is_page(page: &PageFile<'_>) -> bool {
    !page.file_name.starts_with('_')
        && !is_layout_file(page.file_name)
        && page.dir.split('/').next() != Some("api")
}

fn build_route(page: &PageFile<'_>, layouts: &LayoutIndex) -> Route {
    let stem = page
        .file_name
        .rsplit_once('.')
        .map_or(page.file_name, |(stem, _)| stem);

    let mut raw: Vec<&str> = page.dir.split('/').filter(|s| !s.is_empty()).collect();
    let is_index = stem == "index";
    if !is_index {
        raw.push(stem);
    }
    let segments: Vec<Segment> = raw.iter().map(|s| classify(s)).collect();

    let layout = layouts.nearest(page.dir).map(|(dir, file)| {
        let dir_segments: Vec<Segment> = dir
            .split('/')
            .filter(|s| !s.is_empty())
            .map(classify)
            .collect();
        LayoutRef {
            file: file.to_string(),
            base_path: target_path(&dir_segments),
            original_base_path: format!("/{dir}"),
        }
    });

    Route {
        file: page.file.clone(),
        original_path: format!("/{}", raw.join("/")),
        path: target_path(&segments),
        params: segments
            .iter()
            .filter_map(|s| s.param().map(str::to_string))
            .collect(),
        is_index,
        is_dynamic: segments.iter().any(|s| !matches!(s, Segment::Static(_))),
        is_catch_all: segments.iter().any(|s| matches!(s, Segment::CatchAll(_))),
        is_optional_catch_all: segments
            .iter()
            .any(|s| matches!(s, Segment::OptionalCatchAll(_))),
        layout,
    }
}

/// Server path of an API handler below `pages_root`, e.g. `/api/users/:id`
/// for `pages/api/users/[id].ts`. `None` for files outside `<root>/api`.
pub fn api_route_path(file: &str, pages_root: &str) -> Option<String> {
    let file = normalize_separators(file);
    let relative = find_root(&file, pages_root)?;
    let stem = relative
        .rsplit_once('.')
        .filter(|(_, ext)| PAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .map(|(stem, _)| stem)?;

    let mut raw: Vec<&str> = stem.split('/').collect();
    if raw.first() != Some(&"api") {
        return None;
    }
    if raw.len() > 1 && raw.last() == Some(&"index") {
        raw.pop();
    }
    let segments: Vec<Segment> = raw.into_iter().map(classify).collect();
    Some(target_path(&segments))
}

/// Routes under a `pages` root.
pub fn analyze_routes<S: AsRef<str>>(files: &[S]) -> Vec<Route> {
    RouteAnalyzer::default().analyze(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn dynamic_blog_route() {
        let routes = analyze_routes(&["pages/blog/[id].tsx"]);
        assert_eq!(routes.len(), 1);
        let route = &routes[0];
        assert_eq!(route.path, "/blog/:id");
        assert_eq!(route.original_path, "/blog/[id]");
        assert_eq!(route.params, vec!["id".to_string()]);
        assert!(route.is_dynamic);
        assert!(!route.is_catch_all);
        assert!(!route.is_index);
    }

    #[test]
    fn index_collapses_and_private_files_are_skipped() {
        let routes = analyze_routes(&[
            "pages/index.tsx",
            "pages/_app.tsx",
            "pages/_document.tsx",
            "pages/blog/index.jsx",
            "pages/api/users.ts",
            "pages/styles.css",
            "components/Nav.tsx",
        ]);
        let paths: Vec<&str> = routes.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["/", "/blog"]);
        assert!(routes.iter().all(|r| r.is_index));
    }

    #[test]
    fn catch_all_forms() {
        let routes = analyze_routes(&["pages/docs/[...slug].tsx", "pages/shop/[[...filters]].tsx"]);
        assert_eq!(routes[0].path, "/docs/*");
        assert!(routes[0].is_catch_all);
        assert_eq!(routes[1].path, "/shop/*");
        assert!(routes[1].is_optional_catch_all);
        assert_eq!(routes[1].params, vec!["filters".to_string()]);
    }

    #[test]
    fn multiple_params_keep_their_order() {
        let routes = analyze_routes(&["pages/[org]/[repo]/issues/[number].tsx"]);
        assert_eq!(routes[0].path, "/:org/:repo/issues/:number");
        assert_eq!(routes[0].params, vec!["org", "repo", "number"]);
    }

    #[test]
    fn nearest_layout_is_attached() {
        let routes = analyze_routes(&[
            "pages/_layout.tsx",
            "pages/about.tsx",
            "pages/blog/layout.tsx",
            "pages/blog/[id].tsx",
        ]);
        assert_eq!(routes.len(), 2);
        let about = routes[0].layout.as_ref().unwrap();
        assert_eq!(about.file, "pages/_layout.tsx");
        assert_eq!(about.base_path, "/");
        let post = routes[1].layout.as_ref().unwrap();
        assert_eq!(post.file, "pages/blog/layout.tsx");
        assert_eq!(post.base_path, "/blog");
    }

    #[test]
    fn custom_root_and_windows_separators() {
        let routes = RouteAnalyzer::new("src/pages").analyze(&["src\\pages\\team\\[member].tsx", "pages/x.tsx"]);
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].file, "src/pages/team/[member].tsx");
        assert_eq!(routes[0].path, "/team/:member");
    }

    #[test]
    fn api_handlers_map_to_server_paths() {
        assert_eq!(api_route_path("pages/api/users/[id].ts", "pages").as_deref(), Some("/api/users/:id"));
        assert_eq!(api_route_path("pages/api/index.ts", "pages").as_deref(), Some("/api"));
        assert_eq!(api_route_path("pages/api/posts/index.js", "pages").as_deref(), Some("/api/posts"));
        assert_eq!(api_route_path("src/pages/api/[...path].ts", "src/pages").as_deref(), Some("/api/*"));
        assert_eq!(api_route_path("pages/about.tsx", "pages"), None);
        assert_eq!(api_route_path("pages/api/data.json", "pages"), None);
    }

    #[test]
    fn analysis_is_deterministic() {
        let files = ["pages/b.tsx", "pages/a/[x].tsx", "pages/_layout.tsx", "pages/a/index.tsx"];
        assert_eq!(analyze_routes(&files), analyze_routes(&files));
    }
}
