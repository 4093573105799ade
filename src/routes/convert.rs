// src/routes/convert.rs
use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::{LayoutRef, Route};

/// One entry of the React Router table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub index: bool,
    pub component: String,
    pub file: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RouteEntry>,
}

/// Component identifier for a path as written (`/blog/[post-id]` →
/// `BlogPostId`). Each segment is split on non-alphanumerics, its words
/// title-cased and leading digits dropped. Falls back to `Page`.
pub fn component_name(path: &str) -> String {
    let name: String = path.split('/').map(segment_name).collect();
    if name.is_empty() {
        "Page".to_string()
    } else {
        name
    }
}

fn segment_name(segment: &str) -> String {
    let words: String = segment
        .split(|c: char| !c.is_ascii_alphanumeric())
        .map(title_case)
        .collect();
    words.trim_start_matches(|c: char| c.is_ascii_digit()).to_string()
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

fn layout_name(layout: &LayoutRef) -> String {
    if layout.original_base_path == "/" {
        "RootLayout".to_string()
    } else {
        format!("{}Layout", component_name(&layout.original_base_path))
    }
}

/// Hands out each name once; repeats get `2`, `3`, ... in request order.
#[derive(Default)]
struct Names {
    used: HashSet<String>,
}

impl Names {
    fn unique(&mut self, base: String) -> String {
        if self.used.insert(base.clone()) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}{n}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Projects routes onto a React Router table. Routes sharing a layout are
/// grouped under one parent entry placed where the first of them appears;
/// child paths are relative to the layout's base path.
pub fn convert_routes(routes: &[Route]) -> Vec<RouteEntry> {
    let mut names = Names::default();
    let mut entries: Vec<RouteEntry> = Vec::new();
    let mut groups: HashMap<&str, usize> = HashMap::new();

    for route in routes {
        let Some(layout) = &route.layout else {
            entries.push(RouteEntry {
                path: Some(route.path.clone()),
                index: false,
                component: names.unique(component_name(&route.original_path)),
                file: route.file.clone(),
                children: Vec::new(),
            });
            continue;
        };

        let slot = match groups.get(layout.file.as_str()) {
            Some(&slot) => slot,
            None => {
                entries.push(RouteEntry {
                    path: Some(layout.base_path.clone()),
                    index: false,
                    component: names.unique(layout_name(layout)),
                    file: layout.file.clone(),
                    children: Vec::new(),
                });
                groups.insert(&layout.file, entries.len() - 1);
                entries.len() - 1
            }
        };

        let component = names.unique(component_name(&route.original_path));
        entries[slot].children.push(child_entry(route, &layout.base_path, component));
    }

    entries
}

fn child_entry(route: &Route, base: &str, component: String) -> RouteEntry {
    if route.path == base {
        return RouteEntry {
            path: None,
            index: true,
            component,
            file: route.file.clone(),
            children: Vec::new(),
        };
    }

    let relative = if base == "/" {
        route.path.trim_start_matches('/')
    } else {
        route
            .path
            .strip_prefix(base)
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(&route.path)
    };
    RouteEntry {
        path: Some(relative.to_string()),
        index: false,
        component,
        file: route.file.clone(),
        children: Vec::new(),
    }
}

/// Source of a `routes.tsx` module: one lazy import per entry and an
/// exported `RouteObject[]`. Imports are root-relative, as Vite resolves them.
pub fn render_route_module(entries: &[RouteEntry]) -> String {
    let mut imports = String::new();
    collect_imports(entries, &mut imports);

    let mut table = String::new();
    for entry in entries {
        render_entry(entry, 1, &mut table);
    }

    format!(
        "import {{ lazy, Suspense, type ComponentType }} from \"react\";\n\
         import type {{ RouteObject }} from \"react-router-dom\";\n\
         \n\
         {imports}\n\
         function withSuspense(Component: ComponentType) {{\n\
         \x20 return (\n\
         \x20   <Suspense fallback={{null}}>\n\
         \x20     <Component />\n\
         \x20   </Suspense>\n\
         \x20 );\n\
         }}\n\
         \n\
         export const routes: RouteObject[] = [\n\
         {table}];\n\
         \n\
         export default routes;\n"
    )
}

fn collect_imports(entries: &[RouteEntry], out: &mut String) {
    for entry in entries {
        let module = entry
            .file
            .rsplit_once('.')
            .map_or(entry.file.as_str(), |(stem, _)| stem);
        let module = format!("/{}", module.trim_start_matches('/'));
        out.push_str(&format!(
            "const {} = lazy(() => import({module:?}));\n",
            entry.component
        ));
        collect_imports(&entry.children, out);
    }
}

fn render_entry(entry: &RouteEntry, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    out.push_str(&format!("{indent}{{\n"));
    if entry.index {
        out.push_str(&format!("{indent}  index: true,\n"));
    } else if let Some(path) = &entry.path {
        out.push_str(&format!("{indent}  path: {path:?},\n"));
    }
    out.push_str(&format!("{indent}  element: withSuspense({}),\n", entry.component));
    if !entry.children.is_empty() {
        out.push_str(&format!("{indent}  children: [\n"));
        for child in &entry.children {
            render_entry(child, depth + 2, out);
        }
        out.push_str(&format!("{indent}  ],\n"));
    }
    out.push_str(&format!("{indent}}},\n"));
}
