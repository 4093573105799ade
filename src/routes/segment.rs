// src/routes/segment.rs
use serde::Serialize;

/// One path segment of a page file, as written in the file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "kebab-case")]
pub enum Segment {
    Static(String),
    /// `[name]`
    Dynamic(String),
    /// `[...name]`
    CatchAll(String),
    /// `[[...name]]`
    OptionalCatchAll(String),
}

/// Checked in order: optional catch-all, catch-all, dynamic, static.
pub fn classify(segment: &str) -> Segment {
    if let Some(name) = segment
        .strip_prefix("[[...")
        .and_then(|rest| rest.strip_suffix("]]"))
    {
        return Segment::OptionalCatchAll(name.to_string());
    }

    match segment.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        Some(inner) => match inner.strip_prefix("...") {
            Some(name) => Segment::CatchAll(name.to_string()),
            None => Segment::Dynamic(inner.to_string()),
        },
        None => Segment::Static(segment.to_string()),
    }
}

impl Segment {
    pub fn param(&self) -> Option<&str> {
        match self {
            Segment::Static(_) => None,
            Segment::Dynamic(name) | Segment::CatchAll(name) | Segment::OptionalCatchAll(name) => {
                Some(name)
            }
        }
    }

    /// React Router form: `:name` for dynamic segments, `*` for both
    /// catch-all forms.
    pub fn target(&self) -> String {
        match self {
            Segment::Static(text) => text.clone(),
            Segment::Dynamic(name) => format!(":{name}"),
            Segment::CatchAll(_) | Segment::OptionalCatchAll(_) => "*".to_string(),
        }
    }
}

/// `/`-joined target form of a segment list; `/` when empty.
pub(crate) fn target_path(segments: &[Segment]) -> String {
    let joined: Vec<String> = segments.iter().map(Segment::target).collect();
    format!("/{}", joined.join("/"))
}
