// src/report.rs
use std::collections::BTreeMap;

use serde::Serialize;

use crate::manifest::{DependencyChange, ScriptChange};
use crate::model::{SourceKind, TransformResult};
use crate::routes::{Route, RouteEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConversionState {
    #[default]
    Idle,
    Analyzing,
    Transforming,
    UpdatingDependencies,
    Finalizing,
    Done,
    Failed,
    Cancelled,
}

impl ConversionState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ConversionState::Done | ConversionState::Failed | ConversionState::Cancelled
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// Transformed with at least one change.
    Converted,
    /// Transformed, nothing to change.
    Unchanged,
    /// Not handed to a transformer.
    Skipped,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    pub kind: SourceKind,
    pub status: FileStatus,
    pub used_fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<TransformResult>,
}

impl FileOutcome {
    pub fn skipped(kind: SourceKind) -> Self {
        Self {
            kind,
            status: FileStatus::Skipped,
            used_fallback: false,
            result: None,
        }
    }

    pub fn failed(kind: SourceKind) -> Self {
        Self {
            kind,
            status: FileStatus::Failed,
            used_fallback: false,
            result: None,
        }
    }

    pub fn transformed(kind: SourceKind, result: TransformResult, used_fallback: bool) -> Self {
        let status = if result.is_modified() {
            FileStatus::Converted
        } else {
            FileStatus::Unchanged
        };
        Self {
            kind,
            status,
            used_fallback,
            result: Some(result),
        }
    }
}

/// An error or warning, attached to a file when it concerns one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub message: String,
}

/// Aggregate of one conversion run. Built up while the run progresses; the
/// success flag is set once the run reaches a terminal state.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversionReport {
    pub success: bool,
    pub state: ConversionState,
    pub total_files: usize,
    pub files: BTreeMap<String, FileOutcome>,
    pub routes: Vec<Route>,
    pub route_table: Vec<RouteEntry>,
    pub dependency_changes: Vec<DependencyChange>,
    pub script_changes: Vec<ScriptChange>,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl ConversionReport {
    pub fn new(total_files: usize) -> Self {
        Self {
            total_files,
            ..Self::default()
        }
    }

    fn count(&self, status: FileStatus) -> usize {
        self.files.values().filter(|file| file.status == status).count()
    }

    pub fn modified_files(&self) -> usize {
        self.count(FileStatus::Converted)
    }

    pub fn skipped_files(&self) -> usize {
        self.count(FileStatus::Skipped)
    }

    pub fn failed_files(&self) -> usize {
        self.count(FileStatus::Failed)
    }

    pub fn dependency_change_count(&self) -> usize {
        self.dependency_changes.len()
    }

    pub fn route_change_count(&self) -> usize {
        self.routes.len()
    }

    /// Share of all files that were modified, `0.0` for an empty set.
    pub fn transformation_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            self.modified_files() as f64 / self.total_files as f64
        }
    }

    pub fn summary(&self) -> ConversionSummary {
        ConversionSummary {
            state: self.state,
            success: self.success,
            total_files: self.total_files,
            modified_files: self.modified_files(),
            skipped_files: self.skipped_files(),
            failed_files: self.failed_files(),
            route_changes: self.route_change_count(),
            dependency_changes: self.dependency_change_count(),
            script_changes: self.script_changes.len(),
            errors: self.errors.len(),
            warnings: self.warnings.len(),
            transformation_rate: self.transformation_rate(),
        }
    }

    /// Stores a file outcome and copies its warnings into the report.
    pub(crate) fn record(&mut self, path: &str, outcome: FileOutcome) {
        if let Some(result) = &outcome.result {
            for warning in &result.warnings {
                self.warn(Some(path), warning.clone());
            }
        }
        self.files.insert(path.to_string(), outcome);
    }

    pub(crate) fn warn(&mut self, path: Option<&str>, message: impl Into<String>) {
        self.warnings.push(Diagnostic {
            path: path.map(str::to_string),
            message: message.into(),
        });
    }

    pub(crate) fn error(&mut self, path: Option<&str>, message: impl Into<String>) {
        self.errors.push(Diagnostic {
            path: path.map(str::to_string),
            message: message.into(),
        });
    }

    pub(crate) fn finish(&mut self, state: ConversionState) {
        self.state = state;
        self.success = state == ConversionState::Done && self.errors.is_empty();
    }
}

/// Counts derived from a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionSummary {
    pub state: ConversionState,
    pub success: bool,
    pub total_files: usize,
    pub modified_files: usize,
    pub skipped_files: usize,
    pub failed_files: usize,
    pub route_changes: usize,
    pub dependency_changes: usize,
    pub script_changes: usize,
    pub errors: usize,
    pub warnings: usize,
    pub transformation_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(changes: &[&str], warnings: &[&str]) -> TransformResult {
        TransformResult {
            code: String::new(),
            applied_transformations: changes.iter().map(|c| c.to_string()).collect(),
            warnings: warnings.iter().map(|w| w.to_string()).collect(),
        }
    }

    #[test]
    fn counts_are_derived_from_outcomes() {
        let mut report = ConversionReport::new(4);
        report.record("a.tsx", FileOutcome::transformed(SourceKind::Page, result(&["x"], &["w"]), false));
        report.record("b.tsx", FileOutcome::transformed(SourceKind::Component, result(&[], &[]), false));
        report.record("c.css", FileOutcome::skipped(SourceKind::Style));
        report.record("d.tsx", FileOutcome::failed(SourceKind::Page));

        let summary = report.summary();
        assert_eq!(summary.modified_files, 1);
        assert_eq!(summary.skipped_files, 1);
        assert_eq!(summary.failed_files, 1);
        assert_eq!(summary.transformation_rate, 0.25);
        assert_eq!(report.warnings[0].path.as_deref(), Some("a.tsx"));
    }

    #[test]
    fn success_needs_done_and_no_errors() {
        let mut report = ConversionReport::new(0);
        report.finish(ConversionState::Done);
        assert!(report.success);

        report.error(Some("a.tsx"), "boom");
        report.finish(ConversionState::Done);
        assert!(!report.success);

        let mut cancelled = ConversionReport::new(0);
        cancelled.finish(ConversionState::Cancelled);
        assert!(!cancelled.success);
        assert!(cancelled.state.is_terminal());
    }
}
