//! Accelerator and version tag normalization
//!
//! Accelerator tags arrive either compact (`cu129`) or dotted (`12.9`).
//! The compact form always encodes the minor version in its last digit, so
//! `cu129` is `12.9` and `cu118` is `11.8`. Anything else is rejected.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Dotted accelerator version that gets a single fallback step.
pub const STEP_DOWN_FROM: &str = "12.9";
/// Target of the fallback step.
pub const STEP_DOWN_TO: &str = "12.8";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    #[error("Invalid accelerator tag: '{0}' (expected cuNNN or NN.N)")]
    InvalidTag(String),
}

fn dotted_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\d+$").expect("valid regex"))
}

fn major_minor_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)\.(\d+)").expect("valid regex"))
}

/// Converts an accelerator tag to its dotted display form.
pub fn to_dotted(tag: &str) -> Result<String, TagError> {
    let tag = tag.trim();

    if dotted_re().is_match(tag) {
        return Ok(tag.to_string());
    }

    if let Some(digits) = tag.strip_prefix("cu") {
        if digits.len() >= 2 && digits.bytes().all(|b| b.is_ascii_digit()) {
            let (major, minor) = digits.split_at(digits.len() - 1);
            return Ok(format!("{}.{}", major, minor));
        }
    }

    Err(TagError::InvalidTag(tag.to_string()))
}

/// The fallback accelerator for `dotted`, if it has one. Only `12.9` steps,
/// and only to `12.8`.
pub fn step_down(dotted: &str) -> Option<&'static str> {
    (dotted == STEP_DOWN_FROM).then_some(STEP_DOWN_TO)
}

/// First `major.minor` pair found in `version`.
pub fn major_minor(version: &str) -> Option<String> {
    major_minor_re()
        .captures(version)
        .map(|caps| format!("{}.{}", &caps[1], &caps[2]))
}

/// CPython wheel tag for a dotted language version (`3.13` -> `cp313`).
pub fn cpython_tag(language: &str) -> Option<String> {
    let caps = major_minor_re().captures(language)?;
    Some(format!("cp{}{}", &caps[1], &caps[2]))
}
