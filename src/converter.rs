// src/converter.rs
//! Drives a whole project through the transformers and builds one report.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error, info, warn};

use crate::cancel::CancellationToken;
use crate::config::{ConversionOptions, TransformOptions};
use crate::error::{ConversionError, TransformError};
use crate::fallback::RegexTransformer;
use crate::manifest::PackageManifest;
use crate::model::{SourceKind, TransformResult};
use crate::report::{ConversionReport, ConversionState, FileOutcome};
use crate::routes::{convert_routes, RouteAnalyzer};
use crate::rules::{self, Category};
use crate::source::FileSource;
use crate::transform::AstTransformer;

pub type ProgressFn = Box<dyn FnMut(u8, &str) + Send>;

const ANALYZED: u8 = 5;
const ROUTES_FOUND: u8 = 10;
const FILES_DONE: u8 = 80;
const DEPENDENCIES_DONE: u8 = 85;
const FINALIZING: u8 = 95;
const DONE: u8 = 100;

pub struct Converter {
    options: ConversionOptions,
    fallback: Option<RegexTransformer>,
    progress: Option<ProgressFn>,
    cancellation: CancellationToken,
    state: ConversionState,
    last_progress: u8,
}

impl Converter {
    pub fn new(options: ConversionOptions) -> Self {
        let fallback = options.regex_fallback.then(|| fallback_for(&options));
        Self {
            options,
            fallback,
            progress: None,
            cancellation: CancellationToken::new(),
            state: ConversionState::Idle,
            last_progress: 0,
        }
    }

    /// Called at each milestone with a percentage that never decreases
    /// within one run.
    pub fn with_progress(mut self, sink: impl FnMut(u8, &str) + Send + 'static) -> Self {
        self.progress = Some(Box::new(sink));
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    pub fn state(&self) -> ConversionState {
        self.state
    }

    /// Converts every file of `source` and migrates `manifest` when given.
    /// Never fails: orchestration errors end the run in
    /// [`ConversionState::Failed`] and are recorded in the report.
    pub async fn execute<S: FileSource>(
        &mut self,
        source: &S,
        manifest: Option<&mut PackageManifest>,
    ) -> ConversionReport {
        self.last_progress = 0;
        self.state = ConversionState::Idle;

        let paths = source.paths();
        let mut report = ConversionReport::new(paths.len());
        info!(files = paths.len(), output = ?self.options.target, "starting conversion");
        self.report_progress(0, "starting conversion");

        let state = match self.run(source, &paths, manifest, &mut report).await {
            Ok(state) => state,
            Err(err) => {
                error!(error = %err, "conversion failed");
                report.error(None, err.to_string());
                ConversionState::Failed
            }
        };

        self.enter(state);
        report.finish(state);
        if state == ConversionState::Done {
            self.report_progress(DONE, "conversion complete");
        }
        report
    }

    async fn run<S: FileSource>(
        &mut self,
        source: &S,
        paths: &[String],
        manifest: Option<&mut PackageManifest>,
        report: &mut ConversionReport,
    ) -> Result<ConversionState, ConversionError> {
        self.enter(ConversionState::Analyzing);
        let kinds: Vec<SourceKind> = paths
            .iter()
            .map(|path| SourceKind::detect(path, &self.options.pages_root))
            .collect();
        self.report_progress(ANALYZED, "classified files");

        report.routes = RouteAnalyzer::new(self.options.pages_root.as_str()).analyze(paths);
        report.route_table = convert_routes(&report.routes);
        self.report_progress(ROUTES_FOUND, &format!("found {} routes", report.routes.len()));

        self.enter(ConversionState::Transforming);
        let total = paths.len();
        for (index, (path, &kind)) in paths.iter().zip(&kinds).enumerate() {
            if self.cancellation.is_cancelled() {
                info!(processed = index, total, "conversion cancelled");
                report.warn(None, format!("conversion cancelled after {index} of {total} files"));
                return Ok(ConversionState::Cancelled);
            }

            if is_next_config(path) {
                report.warn(Some(path.as_str()), "next.config must be ported to vite.config by hand");
            }
            match self.convert_file(source, path, kind).await {
                Ok(outcome) => report.record(path, outcome),
                Err(message) => {
                    warn!(file = %path, error = %message, "file failed");
                    report.error(Some(path.as_str()), message);
                    report.record(path, FileOutcome::failed(kind));
                }
            }

            let step = (FILES_DONE - ROUTES_FOUND) as usize * (index + 1) / total;
            self.report_progress(ROUTES_FOUND + step as u8, path);
            tokio::task::yield_now().await;
        }
        self.report_progress(FILES_DONE, "transformed files");

        self.enter(ConversionState::UpdatingDependencies);
        if let (true, Some(manifest)) = (self.options.update_dependencies, manifest) {
            let update = manifest.migrate()?;
            report.dependency_changes = update.dependencies;
            report.script_changes = update.scripts;
            for warning in update.warnings {
                report.warn(Some("package.json"), warning);
            }
        }
        self.report_progress(DEPENDENCIES_DONE, "updated dependencies");

        self.enter(ConversionState::Finalizing);
        self.report_progress(FINALIZING, "finalizing report");
        Ok(ConversionState::Done)
    }

    async fn convert_file<S: FileSource>(
        &self,
        source: &S,
        path: &str,
        kind: SourceKind,
    ) -> Result<FileOutcome, String> {
        if !kind.is_code() {
            return Ok(FileOutcome::skipped(kind));
        }
        if kind == SourceKind::ApiHandler && !self.options.convert_api_routes {
            debug!(file = %path, "API handler left alone");
            return Ok(FileOutcome::skipped(kind));
        }

        let content = source
            .read_to_string(path)
            .await
            .map_err(|err| format!("failed to read {path}: {err}"))?;
        let options = self.options.transform_options(path, kind);
        let fallback = self.fallback.as_ref();

        let (result, used_fallback) =
            panic::catch_unwind(AssertUnwindSafe(|| transform_source(options, fallback, path, &content)))
                .map_err(|payload| format!("transformer panicked on {path}: {}", panic_message(&*payload)))?;
        debug!(
            file = %path,
            changes = result.applied_transformations.len(),
            used_fallback,
            "converted file"
        );
        Ok(FileOutcome::transformed(kind, result, used_fallback))
    }

    fn enter(&mut self, state: ConversionState) {
        if self.state != state {
            info!(from = ?self.state, to = ?state, "conversion state");
            self.state = state;
        }
    }

    fn report_progress(&mut self, percent: u8, message: &str) {
        let percent = percent.clamp(self.last_progress, DONE);
        self.last_progress = percent;
        if let Some(sink) = self.progress.as_mut() {
            sink(percent, message);
        }
    }
}

/// Syntax tree transform, degrading to the regex rules on parse failure when
/// a fallback is configured.
fn transform_source(
    options: TransformOptions,
    fallback: Option<&RegexTransformer>,
    path: &str,
    content: &str,
) -> (TransformResult, bool) {
    let kept = |warning: String| TransformResult {
        code: content.to_string(),
        applied_transformations: Vec::new(),
        warnings: vec![warning],
    };

    match AstTransformer::new(options).try_transform(path, content) {
        Ok(result) => (result, false),
        Err(TransformError::Parse(err)) => match fallback {
            Some(fallback) => {
                warn!(file = %path, error = %err, "parse failed, applying regex rules");
                let mut result = fallback.transform(content);
                result.warnings.insert(0, format!("{err}; converted with regex rules"));
                (result, true)
            }
            None => {
                warn!(file = %path, error = %err, "parse failed, keeping original text");
                (kept(err.to_string()), false)
            }
        },
        Err(err) => {
            warn!(file = %path, error = %err, "transform failed, keeping original text");
            (kept(err.to_string()), false)
        }
    }
}

/// Rules for the categories the options enable. Middleware, config and
/// general rules always apply.
fn fallback_for(options: &ConversionOptions) -> RegexTransformer {
    let enabled = |category: Category| match category {
        Category::Routing => options.use_react_router,
        Category::Component => options.replace_components,
        Category::DataFetching => options.transform_data_fetching,
        Category::Api => options.convert_api_routes,
        Category::Middleware | Category::Config | Category::General => true,
    };
    RegexTransformer::with_rules(
        rules::rules()
            .iter()
            .filter(|rule| enabled(rule.category))
            .collect(),
    )
}

fn is_next_config(path: &str) -> bool {
    path.rsplit('/')
        .next()
        .is_some_and(|name| name.starts_with("next.config."))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_follows_enabled_categories() {
        let options = ConversionOptions {
            use_react_router: false,
            ..ConversionOptions::default()
        };
        let result = fallback_for(&options).transform("router.back();\nconst x = process.env.NEXT_PUBLIC_X;\n");
        assert!(result.code.contains("router.back()"));
        assert!(result.code.contains("import.meta.env.VITE_X"));
    }

    #[test]
    fn parse_failure_without_fallback_keeps_text() {
        let source = "const a = {";
        let (result, used_fallback) =
            transform_source(TransformOptions::default(), None, "pages/a.tsx", source);
        assert_eq!(result.code, source);
        assert!(!used_fallback);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn parse_failure_with_fallback_uses_rules() {
        let source = "import Link from 'next/link';\nconst a = {";
        let fallback = RegexTransformer::new();
        let (result, used_fallback) =
            transform_source(TransformOptions::default(), Some(&fallback), "pages/a.tsx", source);
        assert!(used_fallback);
        assert!(result.code.contains("react-router-dom"));
        assert!(result.warnings[0].contains("regex rules"));
    }

    #[test]
    fn recognizes_next_config() {
        assert!(is_next_config("next.config.js"));
        assert!(is_next_config("app/next.config.mjs"));
        assert!(!is_next_config("vite.config.ts"));
    }
}
