// src/config.rs
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::model::SourceKind;
use crate::routes::api_route_path;

/// Grammar accepted by the parser. Plain TypeScript has no JSX, so angle
/// bracket casts and generic arrows parse; the other two modes accept JSX.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyntaxMode {
    #[default]
    Tsx,
    Typescript,
    Javascript,
}

impl SyntaxMode {
    /// `.ts`, `.mts` and `.cts` parse as TypeScript, `.js`, `.jsx`, `.mjs`
    /// and `.cjs` as JavaScript, everything else as TSX.
    pub fn from_path(path: &str) -> Self {
        let ext = path.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
        match ext.as_deref() {
            Some("ts" | "mts" | "cts") => SyntaxMode::Typescript,
            Some("js" | "jsx" | "mjs" | "cjs") => SyntaxMode::Javascript,
            _ => SyntaxMode::Tsx,
        }
    }
}

/// Server-side module kinds, converted for an Express / Fetch API server
/// rather than for the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ServerModule {
    /// A `pages/api` handler served at `route`, e.g. `/api/users/:id`.
    Api { route: String },
    /// A root `middleware.*` file.
    Middleware,
}

/// Target toolchain. Informational only: it is logged and reported but does
/// not change the rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Target {
    #[default]
    ReactVite,
    ReactCra,
}

/// Options for one run of the syntax tree transformer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    pub syntax: SyntaxMode,
    pub preserve_comments: bool,
    pub target: Target,
    pub rewrite_components: bool,
    pub rewrite_routing: bool,
    pub rewrite_data_fetching: bool,
    /// Set for API handlers and middleware; `None` for browser modules.
    pub server: Option<ServerModule>,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            syntax: SyntaxMode::Tsx,
            preserve_comments: true,
            target: Target::ReactVite,
            rewrite_components: true,
            rewrite_routing: true,
            rewrite_data_fetching: true,
            server: None,
        }
    }
}

/// Options for a whole project conversion.
///
/// ```toml
/// convert_api_routes = true
/// regex_fallback = true
/// pages_root = "src/pages"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    pub convert_api_routes: bool,
    pub transform_data_fetching: bool,
    pub replace_components: bool,
    pub use_react_router: bool,
    pub update_dependencies: bool,
    pub preserve_comments: bool,
    /// Run the regex rule set when a file fails to parse.
    pub regex_fallback: bool,
    /// Directory name that marks the pages root.
    pub pages_root: String,
    pub target: Target,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            convert_api_routes: false,
            transform_data_fetching: true,
            replace_components: true,
            use_react_router: true,
            update_dependencies: true,
            preserve_comments: true,
            regex_fallback: false,
            pages_root: "pages".to_string(),
            target: Target::ReactVite,
        }
    }
}

impl ConversionOptions {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Transformer options for one file of the project.
    pub fn transform_options(&self, path: &str, kind: SourceKind) -> TransformOptions {
        let server = match kind {
            SourceKind::ApiHandler => Some(ServerModule::Api {
                route: api_route_path(path, &self.pages_root).unwrap_or_else(|| "/api".to_string()),
            }),
            SourceKind::Middleware => Some(ServerModule::Middleware),
            _ => None,
        };
        TransformOptions {
            syntax: SyntaxMode::from_path(path),
            preserve_comments: self.preserve_comments,
            target: self.target,
            rewrite_components: self.replace_components && server.is_none(),
            rewrite_routing: self.use_react_router && server.is_none(),
            rewrite_data_fetching: self.transform_data_fetching,
            server,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_mode_follows_extension() {
        assert_eq!(SyntaxMode::from_path("pages/index.jsx"), SyntaxMode::Javascript);
        assert_eq!(SyntaxMode::from_path("lib/util.MJS"), SyntaxMode::Javascript);
        assert_eq!(SyntaxMode::from_path("pages/index.tsx"), SyntaxMode::Tsx);
        assert_eq!(SyntaxMode::from_path("lib/nav.ts"), SyntaxMode::Typescript);
        assert_eq!(SyntaxMode::from_path("lib/nav.MTS"), SyntaxMode::Typescript);
        assert_eq!(SyntaxMode::from_path("Makefile"), SyntaxMode::Tsx);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let options = ConversionOptions::from_toml_str(
            "convert_api_routes = true\npages_root = \"src/pages\"\ntarget = \"react-cra\"\n",
        )
        .unwrap();

        assert!(options.convert_api_routes);
        assert!(options.update_dependencies);
        assert!(!options.regex_fallback);
        assert_eq!(options.pages_root, "src/pages");
        assert_eq!(options.target, Target::ReactCra);
    }

    #[test]
    fn invalid_toml_is_reported() {
        let err = ConversionOptions::from_toml_str("convert_api_routes = \"yes\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn transform_options_follow_conversion_flags() {
        let options = ConversionOptions {
            replace_components: false,
            preserve_comments: false,
            ..ConversionOptions::default()
        };
        let transform = options.transform_options("components/Nav.js", SourceKind::Component);

        assert_eq!(transform.syntax, SyntaxMode::Javascript);
        assert!(!transform.rewrite_components);
        assert!(transform.rewrite_routing);
        assert!(!transform.preserve_comments);
        assert_eq!(transform.server, None);
    }

    #[test]
    fn server_modules_get_their_route() {
        let options = ConversionOptions::default();
        let api = options.transform_options("pages/api/users/[id].ts", SourceKind::ApiHandler);
        assert_eq!(
            api.server,
            Some(ServerModule::Api {
                route: "/api/users/:id".to_string()
            })
        );
        assert_eq!(api.syntax, SyntaxMode::Typescript);
        assert!(!api.rewrite_routing);

        let middleware = options.transform_options("middleware.ts", SourceKind::Middleware);
        assert_eq!(middleware.server, Some(ServerModule::Middleware));
    }
}
