//! Column role detection for catalog tables
//!
//! Roles are discovered from header names using [`ROLE_PATTERNS`], evaluated
//! top to bottom: for each role, the first pattern that matches any still
//! unclaimed header wins that column. New roles or spellings are added to the
//! table, not to the detection code.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnRole {
    Framework,
    Accelerator,
    Language,
    Link,
}

/// Case-insensitive header name test.
#[derive(Debug, Clone, Copy)]
pub enum HeaderPattern {
    Contains(&'static str),
    Exact(&'static str),
}

impl HeaderPattern {
    pub fn matches(&self, header: &str) -> bool {
        let header = header.trim().to_lowercase();
        match self {
            HeaderPattern::Contains(needle) => header.contains(needle),
            HeaderPattern::Exact(name) => header == *name,
        }
    }
}

use HeaderPattern::{Contains, Exact};

pub const ROLE_PATTERNS: &[(ColumnRole, &[HeaderPattern])] = &[
    (
        ColumnRole::Framework,
        &[Contains("pytorch"), Exact("torch"), Exact("torch version")],
    ),
    (
        ColumnRole::Accelerator,
        &[Contains("cuda"), Exact("cu"), Contains("accelerator")],
    ),
    (
        ColumnRole::Language,
        &[Contains("python"), Exact("py"), Exact("cp")],
    ),
    (
        ColumnRole::Link,
        &[
            Contains("download"),
            Contains("link"),
            Contains("href"),
            Contains("wheel"),
            Contains(".whl"),
        ],
    ),
];

/// Column positions of each detected role within one table header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub framework: Option<usize>,
    pub accelerator: Option<usize>,
    pub language: Option<usize>,
    pub link: Option<usize>,
}

impl ColumnMap {
    pub fn detect(header: &[String]) -> Self {
        let mut map = ColumnMap::default();
        let mut claimed = vec![false; header.len()];

        for (role, patterns) in ROLE_PATTERNS {
            let found = patterns.iter().find_map(|pattern| {
                header
                    .iter()
                    .enumerate()
                    .find(|(i, name)| !claimed[*i] && pattern.matches(name))
                    .map(|(i, _)| i)
            });

            if let Some(index) = found {
                claimed[index] = true;
                *map.slot(*role) = Some(index);
            }
        }

        map
    }

    pub fn get(&self, role: ColumnRole) -> Option<usize> {
        match role {
            ColumnRole::Framework => self.framework,
            ColumnRole::Accelerator => self.accelerator,
            ColumnRole::Language => self.language,
            ColumnRole::Link => self.link,
        }
    }

    fn slot(&mut self, role: ColumnRole) -> &mut Option<usize> {
        match role {
            ColumnRole::Framework => &mut self.framework,
            ColumnRole::Accelerator => &mut self.accelerator,
            ColumnRole::Language => &mut self.language,
            ColumnRole::Link => &mut self.link,
        }
    }
}

/// Pulls a URL out of a link cell: a parenthesized `(scheme://...)` target,
/// or the whole cell when it is already a bare URL.
pub fn extract_link(cell: &str) -> Option<String> {
    static PAREN: OnceLock<Regex> = OnceLock::new();
    static BARE: OnceLock<Regex> = OnceLock::new();
    let paren = PAREN.get_or_init(|| {
        Regex::new(r"\(([A-Za-z][A-Za-z0-9+.\-]*://[^()\s]+)\)").expect("valid regex")
    });
    let bare = BARE
        .get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://\S+$").expect("valid regex"));

    if let Some(caps) = paren.captures(cell) {
        return Some(caps[1].to_string());
    }

    let cell = cell.trim();
    bare.is_match(cell).then(|| cell.to_string())
}
