// src/lib.rs
//! Rewrites Next.js pages-router projects into Vite + React Router projects.
//!
//! [`AstTransformer`] rewrites one module on the SWC syntax tree;
//! [`RegexTransformer`] applies the text rules of [`rules`] when a module
//! cannot be parsed; [`RouteAnalyzer`] derives the route table from file
//! paths. [`Converter`] runs all of them over a [`FileSource`] and returns a
//! [`ConversionReport`].

pub mod cancel;
pub mod config;
pub mod converter;
pub mod error;
pub mod fallback;
pub mod manifest;
pub mod model;
pub mod parser;
pub mod report;
pub mod routes;
pub mod rules;
pub mod source;
pub mod transform;

pub use cancel::CancellationToken;
pub use config::{ConversionOptions, ServerModule, SyntaxMode, Target, TransformOptions};
pub use converter::Converter;
pub use error::{
    ConfigError, ConversionError, ManifestError, ParseError, RuleApplicationError, TransformError,
};
pub use fallback::RegexTransformer;
pub use manifest::{DependencyChange, ManifestUpdate, PackageManifest, ScriptChange, Section};
pub use model::{SourceKind, SourceUnit, TransformResult};
pub use report::{
    ConversionReport, ConversionState, ConversionSummary, Diagnostic, FileOutcome, FileStatus,
};
pub use routes::{
    analyze_routes, api_route_path, convert_routes, render_route_module, Route, RouteAnalyzer,
    RouteEntry,
};
pub use source::{DiskFileSource, FileSource, MemoryFileSource};
pub use transform::{AstTransformer, HttpMethod, MiddlewareKind};
