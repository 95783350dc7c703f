//! Per-field match predicates and candidate scoring
//!
//! Every predicate is permissive on a missing value: an artifact that does
//! not publish an attribute is never rejected on that attribute.

use crate::catalog::Artifact;
use crate::tags::{cpython_tag, major_minor, to_dotted};
use regex::Regex;
use std::sync::OnceLock;

pub const SCORE_FRAMEWORK_EXACT: u32 = 3;
pub const SCORE_FRAMEWORK_MAJOR_MINOR: u32 = 2;
pub const SCORE_ACCELERATOR: u32 = 2;
pub const SCORE_LANGUAGE: u32 = 1;
pub const SCORE_ABI_FLAG: u32 = 1;

/// The requested attributes for one matching pass.
#[derive(Debug, Clone, Copy)]
pub struct FieldQuery<'a> {
    pub framework: &'a str,
    /// Dotted accelerator version, e.g. `12.8`.
    pub accelerator: &'a str,
    pub language: &'a str,
    pub abi_relaxed: bool,
}

impl<'a> FieldQuery<'a> {
    pub fn matches(&self, artifact: &Artifact) -> bool {
        framework_matches(artifact.framework_version.as_deref(), self.framework)
            && accelerator_matches(artifact.accelerator.as_deref(), self.accelerator)
            && language_matches(artifact.language.as_deref(), self.language, self.abi_relaxed)
    }

    /// Additive score for the scored strategy. Absent fields contribute
    /// nothing; they only pass the filter.
    pub fn score(&self, artifact: &Artifact) -> u32 {
        let mut score = 0;

        if let Some(version) = artifact.framework_version.as_deref() {
            if version.trim() == self.framework.trim() {
                score += SCORE_FRAMEWORK_EXACT;
            } else if same_major_minor(version, self.framework) {
                score += SCORE_FRAMEWORK_MAJOR_MINOR;
            }
        }

        if let Some(cell) = artifact.accelerator.as_deref() {
            if accelerator_equals(cell, self.accelerator) {
                score += SCORE_ACCELERATOR;
            }
        }

        if let Some(cell) = artifact.language.as_deref() {
            if language_contains(cell, self.language) {
                score += SCORE_LANGUAGE;
            }
        }

        if artifact.has_abi_flag() {
            score += SCORE_ABI_FLAG;
        }

        score
    }
}

/// Exact version match, or equal `major.minor` prefixes.
pub fn framework_matches(published: Option<&str>, requested: &str) -> bool {
    match published {
        None => true,
        Some(version) => version.trim() == requested.trim() || same_major_minor(version, requested),
    }
}

/// Normalized equality with the requested dotted tag, or the dotted tag
/// appearing inside a noisier cell such as `CUDA 12.8`.
pub fn accelerator_matches(published: Option<&str>, dotted: &str) -> bool {
    match published {
        None => true,
        Some(cell) => accelerator_equals(cell, dotted),
    }
}

/// The cell contains the requested `major.minor` (or its `cpXY` form). With
/// ABI relaxation, version-neutral cells match any request.
pub fn language_matches(published: Option<&str>, requested: &str, abi_relaxed: bool) -> bool {
    match published {
        None => true,
        Some(cell) => {
            language_contains(cell, requested) || (abi_relaxed && is_version_neutral(cell))
        }
    }
}

/// `abi3`, a bare `py3` token, or a `cpNN+` floor marker, case-insensitively.
/// `py311` names one interpreter and is not neutral.
pub fn is_version_neutral(cell: &str) -> bool {
    static NEUTRAL: OnceLock<Regex> = OnceLock::new();
    NEUTRAL
        .get_or_init(|| Regex::new(r"(?i)abi3|py3(?:$|[^0-9.])|cp\d+\+").expect("valid regex"))
        .is_match(cell)
}

fn same_major_minor(published: &str, requested: &str) -> bool {
    match (major_minor(published), major_minor(requested)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn accelerator_equals(cell: &str, dotted: &str) -> bool {
    let cell = cell.trim();
    to_dotted(cell).is_ok_and(|normalized| normalized == dotted) || cell.contains(dotted)
}

fn language_contains(cell: &str, requested: &str) -> bool {
    let requested = requested.trim();
    if requested.is_empty() {
        return false;
    }
    if cell.contains(requested) {
        return true;
    }
    cpython_tag(requested).is_some_and(|tag| cell.to_lowercase().contains(&tag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RawRecord;
    use serde_json::json;

    fn artifact(torch: Option<&str>, cuda: Option<&str>, python: Option<&str>) -> Artifact {
        Artifact {
            package: "flash-attn".to_string(),
            variant: None,
            framework_version: torch.map(str::to_string),
            accelerator: cuda.map(str::to_string),
            language: python.map(str::to_string),
            url: "http://x/a.whl".to_string(),
            raw: RawRecord::Json(json!({})),
        }
    }

    fn query(abi_relaxed: bool) -> FieldQuery<'static> {
        FieldQuery {
            framework: "2.8.0",
            accelerator: "12.8",
            language: "3.12",
            abi_relaxed,
        }
    }

    #[test]
    fn test_framework_predicate() {
        assert!(framework_matches(Some("2.8.0"), "2.8.0"));
        assert!(framework_matches(Some("2.8"), "2.8.0"));
        assert!(framework_matches(Some("2.8.1"), "2.8.0"));
        assert!(!framework_matches(Some("2.7.1"), "2.8.0"));
        assert!(!framework_matches(Some("nightly"), "2.8.0"));
        assert!(framework_matches(None, "2.8.0"));
    }

    #[test]
    fn test_accelerator_predicate() {
        assert!(accelerator_matches(Some("12.8"), "12.8"));
        assert!(accelerator_matches(Some("cu128"), "12.8"));
        assert!(accelerator_matches(Some("CUDA 12.8 (recommended)"), "12.8"));
        assert!(!accelerator_matches(Some("12.6"), "12.8"));
        assert!(!accelerator_matches(Some("cu129"), "12.8"));
        assert!(accelerator_matches(None, "12.8"));
    }

    #[test]
    fn test_language_predicate() {
        assert!(language_matches(Some("3.12"), "3.12", false));
        assert!(language_matches(Some("3.10, 3.11, 3.12"), "3.12", false));
        assert!(language_matches(Some("cp312"), "3.12", false));
        assert!(!language_matches(Some("3.11"), "3.12", false));
        assert!(!language_matches(Some("abi3"), "3.12", false));
        assert!(language_matches(Some("abi3"), "3.12", true));
        assert!(language_matches(Some("cp39+"), "3.12", true));
        assert!(language_matches(Some("PY3"), "3.12", true));
        assert!(language_matches(None, "3.12", false));
    }

    #[test]
    fn test_versioned_py_tags_are_not_neutral() {
        assert!(is_version_neutral("py3-none-any"));
        assert!(is_version_neutral("cp38-abi3"));
        assert!(!is_version_neutral("py311"));
        assert!(!is_version_neutral("py3.11"));
        assert!(!language_matches(Some("py311"), "3.12", true));
    }

    #[test]
    fn test_absent_fields_never_reject() {
        // Each field independently absent still passes when the others match.
        assert!(query(false).matches(&artifact(None, Some("12.8"), Some("3.12"))));
        assert!(query(false).matches(&artifact(Some("2.8.0"), None, Some("3.12"))));
        assert!(query(false).matches(&artifact(Some("2.8.0"), Some("12.8"), None)));
        assert!(query(false).matches(&artifact(None, None, None)));
    }

    #[test]
    fn test_score_components() {
        let q = query(false);
        assert_eq!(q.score(&artifact(Some("2.8.0"), Some("12.8"), Some("3.12"))), 6);
        assert_eq!(q.score(&artifact(Some("2.8.1"), Some("12.8"), Some("3.12"))), 5);
        assert_eq!(q.score(&artifact(None, Some("12.8"), None)), 2);
        assert_eq!(q.score(&artifact(None, None, None)), 0);
    }

    #[test]
    fn test_score_abi_flag() {
        let mut flagged = artifact(None, None, None);
        flagged.raw = RawRecord::Json(json!({ "cxx11abi": true }));
        assert_eq!(query(false).score(&flagged), SCORE_ABI_FLAG);
    }
}
