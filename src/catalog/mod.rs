//! Catalog adaptation
//!
//! A compatibility catalog arrives either as a markdown document of pipe
//! tables or as a structured JSON index. Both are adapted into a uniform,
//! ordered stream of [`Artifact`]s through the [`CandidateProvider`] trait so
//! the matcher never needs to know which shape it is reading.
//!
//! # Providers
//!
//! - [`TableCatalog`]: tables recovered by the markdown extractor; column
//!   roles are discovered per table from the header names.
//! - [`StructuredCatalog`]: `{ packages: [ { name, wheels: [...] } ] }`.

pub mod columns;
pub mod structured;
pub mod table_backed;

use crate::extractors::{Row, TableExtractor};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

pub use columns::{extract_link, ColumnMap, ColumnRole};
pub use structured::StructuredCatalog;
pub use table_backed::TableCatalog;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid structured catalog: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Unknown catalog kind: {0}. Valid options: auto, markdown, json")]
    UnknownKind(String),
}

/// The record an [`Artifact`] was built from, kept for audit output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawRecord {
    Row(Row),
    Json(serde_json::Value),
}

/// A downloadable build, independent of the catalog shape it came from.
///
/// `None` fields mean the catalog does not publish that attribute for this
/// artifact. They never mean "empty" and they never disqualify a match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Artifact {
    pub package: String,
    pub variant: Option<String>,
    pub framework_version: Option<String>,
    pub accelerator: Option<String>,
    pub language: Option<String>,
    pub url: String,
    pub raw: RawRecord,
}

const ABI_FLAG_KEYS: &[&str] = &["cxx11abi", "cxx11_abi", "abi"];

impl Artifact {
    /// Whether the source record carries a truthy prebuilt-binary ABI flag.
    pub fn has_abi_flag(&self) -> bool {
        let RawRecord::Json(serde_json::Value::Object(map)) = &self.raw else {
            return false;
        };

        ABI_FLAG_KEYS.iter().any(|key| match map.get(*key) {
            Some(serde_json::Value::Bool(flag)) => *flag,
            Some(serde_json::Value::String(s)) => {
                matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes")
            }
            Some(serde_json::Value::Number(n)) => n.as_i64() == Some(1),
            _ => false,
        })
    }
}

/// Which part of a package's catalog entries to draw candidates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Entries for the package narrowed by the variant filter.
    Restricted,
    /// Every entry for the package.
    Full,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Restricted => write!(f, "restricted"),
            Scope::Full => write!(f, "full"),
        }
    }
}

/// Yields the artifacts of a package in stable document/declaration order.
pub trait CandidateProvider {
    fn candidates(&self, package: &str, variant: Option<&str>, scope: Scope) -> Vec<Artifact>;
}

/// Lowercases and drops everything but ASCII letters and digits, so
/// `Flash_Attn`, `flash-attn` and `flash attn` compare equal.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Shape of a catalog document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    Markdown,
    Structured,
}

impl CatalogKind {
    /// JSON documents start with `{`; everything else is read as markdown.
    pub fn detect(text: &str) -> Self {
        if text.trim_start().starts_with('{') {
            CatalogKind::Structured
        } else {
            CatalogKind::Markdown
        }
    }

    /// Parses a `--kind` value. `auto` yields `None`.
    pub fn from_arg(value: &str) -> Result<Option<Self>, CatalogError> {
        match value.to_lowercase().as_str() {
            "auto" => Ok(None),
            "markdown" | "md" => Ok(Some(CatalogKind::Markdown)),
            "json" | "structured" => Ok(Some(CatalogKind::Structured)),
            other => Err(CatalogError::UnknownKind(other.to_string())),
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogKind::Markdown => write!(f, "markdown"),
            CatalogKind::Structured => write!(f, "structured"),
        }
    }
}

/// A parsed catalog of either shape.
#[derive(Debug, Clone)]
pub enum Catalog {
    Tables(TableCatalog),
    Structured(StructuredCatalog),
}

impl Catalog {
    pub fn parse(
        text: &str,
        kind: Option<CatalogKind>,
        extractor: &TableExtractor,
    ) -> Result<Self, CatalogError> {
        match kind.unwrap_or_else(|| CatalogKind::detect(text)) {
            CatalogKind::Markdown => Ok(Catalog::Tables(TableCatalog::from_markdown(
                text, extractor,
            ))),
            CatalogKind::Structured => Ok(Catalog::Structured(StructuredCatalog::from_json(text)?)),
        }
    }

    pub fn kind(&self) -> CatalogKind {
        match self {
            Catalog::Tables(_) => CatalogKind::Markdown,
            Catalog::Structured(_) => CatalogKind::Structured,
        }
    }
}
