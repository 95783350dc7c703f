//! Table-backed candidate provider

use super::columns::{extract_link, ColumnMap};
use super::{normalize_name, Artifact, CandidateProvider, RawRecord, Scope};
use crate::extractors::{Row, Table, TableExtractor};
use tracing::debug;

/// Catalog built from markdown tables. The section heading names the
/// package; the subsection names the release line.
#[derive(Debug, Clone, Default)]
pub struct TableCatalog {
    tables: Vec<Table>,
}

impl TableCatalog {
    pub fn new(tables: Vec<Table>) -> Self {
        Self { tables }
    }

    pub fn from_markdown(text: &str, extractor: &TableExtractor) -> Self {
        Self::new(extractor.extract(text))
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    fn in_scope(table: &Table, package: &str, variant: Option<&str>, scope: Scope) -> bool {
        if !section_matches(&table.heading.section, package) {
            return false;
        }

        match (scope, variant) {
            (Scope::Full, _) | (Scope::Restricted, None) => true,
            (Scope::Restricted, Some(filter)) => table
                .heading
                .subsection
                .as_deref()
                .is_some_and(|sub| sub.contains(filter)),
        }
    }
}

impl CandidateProvider for TableCatalog {
    fn candidates(&self, package: &str, variant: Option<&str>, scope: Scope) -> Vec<Artifact> {
        self.tables
            .iter()
            .filter(|table| Self::in_scope(table, package, variant, scope))
            .flat_map(table_artifacts)
            .collect()
    }
}

fn section_matches(section: &str, package: &str) -> bool {
    let package = normalize_name(package);
    !package.is_empty() && normalize_name(section) == package
}

fn table_artifacts(table: &Table) -> Vec<Artifact> {
    let columns = ColumnMap::detect(&table.header);
    let Some(link_column) = columns.link else {
        debug!(
            heading = %table.heading,
            ordinal = table.ordinal,
            "Skipping table without a link column"
        );
        return Vec::new();
    };

    let published = |row: &Row, column: Option<usize>| {
        column
            .and_then(|i| row.cell(i))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    table
        .rows
        .iter()
        .filter_map(|row| {
            let Some(url) = row.cell(link_column).and_then(extract_link) else {
                debug!(heading = %table.heading, "Skipping row without a link");
                return None;
            };
            Some(Artifact {
                package: table.heading.section.clone(),
                variant: table.heading.subsection.clone(),
                framework_version: published(row, columns.framework),
                accelerator: published(row, columns.accelerator),
                language: published(row, columns.language),
                url,
                raw: RawRecord::Row(row.clone()),
            })
        })
        .collect()
}
