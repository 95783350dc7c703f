//! Audit serialization of extracted tables
//!
//! Produces `{ "tables": [ { section, subsection, index, header, rows } ] }`.
//! The document is informational only; resolution never reads it back.

use crate::extractors::table::{Row, Table};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct TableDocument<'a> {
    pub tables: Vec<TableEntry<'a>>,
}

#[derive(Debug, Serialize)]
pub struct TableEntry<'a> {
    pub section: &'a str,
    pub subsection: Option<&'a str>,
    pub index: usize,
    pub header: &'a [String],
    pub rows: &'a [Row],
}

impl<'a> TableDocument<'a> {
    pub fn new(tables: &'a [Table]) -> Self {
        let tables = tables
            .iter()
            .map(|table| TableEntry {
                section: &table.heading.section,
                subsection: table.heading.subsection.as_deref(),
                index: table.ordinal,
                header: &table.header,
                rows: &table.rows,
            })
            .collect();
        Self { tables }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize tables to JSON")
    }
}

/// Writes the audit document for `tables` to `path`, creating parent
/// directories as needed.
pub fn write_tables(tables: &[Table], path: &Path) -> Result<()> {
    let json = TableDocument::new(tables).to_json()?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }

    fs::write(path, json)
        .with_context(|| format!("Failed to write tables to {}", path.display()))?;

    info!(tables = tables.len(), path = %path.display(), "Wrote table audit file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::markdown::extract_tables;
    use tempfile::TempDir;

    const TEXT: &str = "# torch-ext\n## cu128\n| Torch | Link |\n|---|---|\n| 2.8.0 | http://x/a.whl |\n";

    #[test]
    fn test_document_shape() {
        let tables = extract_tables(TEXT);
        let json = TableDocument::new(&tables).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let table = &value["tables"][0];
        assert_eq!(table["section"], "torch-ext");
        assert_eq!(table["subsection"], "cu128");
        assert_eq!(table["index"], 0);
        assert_eq!(table["header"], serde_json::json!(["Torch", "Link"]));
        assert_eq!(table["rows"][0]["Link"], "http://x/a.whl");
    }

    #[test]
    fn test_write_tables_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("audit").join("tables.json");

        write_tables(&extract_tables(TEXT), &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"tables\""));
    }
}
