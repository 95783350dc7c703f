//! Normalized table records recovered from catalog documents

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// Scope a table was declared under: the enclosing level-1 heading and,
/// when present, the level-2 heading below it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct HeadingPath {
    pub section: String,
    pub subsection: Option<String>,
}

impl HeadingPath {
    pub fn new(section: impl Into<String>, subsection: Option<String>) -> Self {
        Self {
            section: section.into(),
            subsection,
        }
    }
}

impl fmt::Display for HeadingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subsection {
            Some(sub) => write!(f, "{} / {}", self.section, sub),
            None => write!(f, "{}", self.section),
        }
    }
}

/// One data row. Keys are the owning table's header, fixed at construction,
/// and the row always has exactly as many cells as the header has columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    cells: Vec<(String, String)>,
}

impl Row {
    /// Builds a row against `header`, padding missing cells with empty
    /// strings and dropping surplus cells.
    pub fn reconcile(header: &[String], values: Vec<String>) -> Self {
        let mut values = values.into_iter();
        let cells = header
            .iter()
            .map(|column| (column.clone(), values.next().unwrap_or_default()))
            .collect();
        Self { cells }
    }

    /// Value of the first column named `column`.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Value at column position `index`.
    pub fn cell(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Serialize for Row {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (column, value) in &self.cells {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub heading: HeadingPath,
    /// Position among the tables sharing `heading`, in discovery order.
    pub ordinal: usize,
    pub header: Vec<String>,
    pub rows: Vec<Row>,
}
