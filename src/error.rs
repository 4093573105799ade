// src/error.rs
use thiserror::Error;

/// The source text could not be parsed into a syntax tree.
///
/// Always recoverable: the caller keeps the original text (or falls back to
/// the regex transformer) and records the message as a warning.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to parse {file} at {line}:{column}: {message}")]
pub struct ParseError {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// Errors raised by the syntax tree transformer.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("failed to print transformed module: {0}")]
    Print(#[from] std::io::Error),

    #[error("printed module is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("failed to build replacement code: {0}")]
    Replacement(ParseError),
}

/// A single rule could not produce its replacement. The rule is skipped and
/// every other rule still runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleApplicationError {
    #[error("rule '{rule}' expected capture group {group} but it did not participate in the match")]
    MissingCapture { rule: &'static str, group: usize },

    #[error("rule '{rule}' skipped: {reason}")]
    InvalidMatch { rule: &'static str, reason: String },
}

/// Errors raised while reading or migrating `package.json`.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("package manifest is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("package manifest root must be a JSON object")]
    NotAnObject,

    #[error("package manifest section '{0}' must be a JSON object")]
    InvalidSection(String),
}

/// Errors raised while loading conversion options.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Unexpected failures outside per-file handling. Caught once at the top of
/// a conversion run; the run ends in the `Failed` state.
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),
}
