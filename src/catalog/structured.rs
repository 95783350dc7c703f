//! Structured JSON catalog provider
//!
//! Expected shape:
//!
//! ```json
//! {
//!   "packages": [
//!     {
//!       "name": "flash-attn",
//!       "wheels": [
//!         { "torch": "2.8.0", "cuda": "12.8", "python": "3.12", "url": "https://..." }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Wheel records are kept as raw JSON so unknown fields survive into the
//! audit output. Numeric values are read as their decimal text.

use super::{normalize_name, Artifact, CandidateProvider, CatalogError, RawRecord, Scope};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Fields a variant filter is matched against, in precedence order.
const VARIANT_FIELDS: &[&str] = &["version", "variant", "note"];

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StructuredCatalog {
    #[serde(default)]
    pub packages: Vec<PackageEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PackageEntry {
    pub name: String,
    #[serde(default)]
    pub wheels: Vec<Value>,
}

impl StructuredCatalog {
    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(text)?)
    }

    fn matching_packages<'a>(&'a self, package: &str) -> impl Iterator<Item = &'a PackageEntry> {
        let wanted = normalize_name(package);
        self.packages.iter().filter(move |entry| {
            let declared = normalize_name(&entry.name);
            !wanted.is_empty()
                && !declared.is_empty()
                && (declared == wanted || declared.contains(&wanted) || wanted.contains(&declared))
        })
    }
}

impl CandidateProvider for StructuredCatalog {
    fn candidates(&self, package: &str, variant: Option<&str>, scope: Scope) -> Vec<Artifact> {
        let filter = match scope {
            Scope::Restricted => variant.map(VariantFilter::new),
            Scope::Full => None,
        };

        self.matching_packages(package)
            .flat_map(|entry| entry.wheels.iter().map(move |wheel| (entry, wheel)))
            .filter(|(_, wheel)| filter.as_ref().map_or(true, |f| f.accepts(wheel)))
            .filter_map(|(entry, wheel)| wheel_artifact(&entry.name, wheel))
            .collect()
    }
}

fn wheel_artifact(package: &str, wheel: &Value) -> Option<Artifact> {
    let Some(url) = field_text(wheel, "url") else {
        debug!(package, "Skipping wheel record without a url");
        return None;
    };

    Some(Artifact {
        package: package.to_string(),
        variant: VARIANT_FIELDS.iter().find_map(|key| field_text(wheel, key)),
        framework_version: field_text(wheel, "torch"),
        accelerator: field_text(wheel, "cuda"),
        language: field_text(wheel, "python"),
        url,
        raw: RawRecord::Json(wheel.clone()),
    })
}

/// Non-empty string or number field as text.
fn field_text(record: &Value, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Narrows wheel records to one release line, e.g. `2.2`. A record is kept
/// when one of its version/variant/note fields contains the filter text, or
/// carries an open-ended marker such as `FA2++` for the filter's major line.
struct VariantFilter {
    text: String,
    marker: Option<Regex>,
}

impl VariantFilter {
    fn new(text: &str) -> Self {
        let major: String = text.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
        let marker = (!major.is_empty()).then(|| {
            Regex::new(&format!(r"(?:^|[^0-9.]){}\+\+", regex::escape(&major))).expect("valid regex")
        });

        Self {
            text: text.trim().to_string(),
            marker,
        }
    }

    fn accepts(&self, wheel: &Value) -> bool {
        VARIANT_FIELDS
            .iter()
            .filter_map(|key| field_text(wheel, key))
            .any(|value| {
                value.contains(&self.text)
                    || self.marker.as_ref().is_some_and(|re| re.is_match(&value))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "packages": [
            {
                "name": "Flash-Attention",
                "wheels": [
                    { "torch": "2.8.0", "cuda": "12.8", "python": "3.12", "version": "2.8.3", "url": "http://x/a.whl" },
                    { "torch": "2.5.1", "cuda": "12.4", "python": 3.11, "note": "FA2++ build", "url": "http://x/b.whl" },
                    { "torch": "2.4.0", "cuda": "12.1", "version": "2.2.1", "url": "http://x/c.whl" },
                    { "torch": "2.4.0", "cuda": "12.1" }
                ]
            },
            { "name": "xformers", "wheels": [ { "url": "http://x/xf.whl" } ] }
        ]
    }"#;

    fn catalog() -> StructuredCatalog {
        StructuredCatalog::from_json(CATALOG).unwrap()
    }

    #[test]
    fn test_package_match_either_direction() {
        assert_eq!(catalog().candidates("FLASH", None, Scope::Full).len(), 3);
        assert_eq!(catalog().candidates("xformers-cu128", None, Scope::Full).len(), 1);
        assert!(catalog().candidates("apex", None, Scope::Full).is_empty());
    }

    #[test]
    fn test_wheels_without_url_are_skipped() {
        let urls: Vec<String> = catalog()
            .candidates("flash-attention", None, Scope::Full)
            .into_iter()
            .map(|a| a.url)
            .collect();
        assert_eq!(urls, vec!["http://x/a.whl", "http://x/b.whl", "http://x/c.whl"]);
    }

    #[test]
    fn test_numeric_fields_are_read_as_text() {
        let artifacts = catalog().candidates("flash-attention", None, Scope::Full);
        assert_eq!(artifacts[1].language.as_deref(), Some("3.11"));
        assert_eq!(artifacts[2].language, None);
    }

    #[test]
    fn test_variant_filter_by_containment_and_marker() {
        let artifacts = catalog().candidates("flash-attention", Some("2.2"), Scope::Restricted);
        let urls: Vec<&str> = artifacts.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(urls, vec!["http://x/b.whl", "http://x/c.whl"]);
    }

    #[test]
    fn test_variant_label_precedence() {
        let artifacts = catalog().candidates("flash-attention", None, Scope::Full);
        assert_eq!(artifacts[0].variant.as_deref(), Some("2.8.3"));
        assert_eq!(artifacts[1].variant.as_deref(), Some("FA2++ build"));
    }

    #[test]
    fn test_marker_does_not_match_other_lines() {
        let filter = VariantFilter::new("2.2");
        assert!(filter.accepts(&serde_json::json!({ "note": "2++" })));
        assert!(!filter.accepts(&serde_json::json!({ "note": "FA12++" })));
        assert!(!filter.accepts(&serde_json::json!({ "note": "FA3++" })));
    }

    #[test]
    fn test_marker_needs_a_leading_number() {
        assert!(VariantFilter::new("2.2").marker.is_some());

        let named = VariantFilter::new("nightly");
        assert!(named.marker.is_none());
        assert!(named.accepts(&serde_json::json!({ "variant": "nightly-2" })));
        assert!(!named.accepts(&serde_json::json!({ "note": "FA2++" })));
    }
}
