//! Pipe-table extraction from heading-annotated catalog text
//!
//! The extractor walks the document once, line by line, carrying the current
//! [`HeadingPath`] and a buffer of consecutive pipe lines. The buffer is
//! flushed into a [`Table`] whenever the run of pipe lines ends: at a heading,
//! at any other non-pipe line (blank lines included), and at end of input.
//!
//! ```text
//! # flash-attn            <- level-1: section = "flash-attn", subsection = none
//! ## 2.8                  <- level-2: subsection = "2.8"
//! | Torch | CUDA | Link | <- header
//! |-------|------|------| <- divider (optional, skipped)
//! | 2.8.0 | 12.8 | ...  | <- data rows
//! ```
//!
//! Chunks that cannot form a table (a single pipe line, or a header with
//! fewer than two columns) are dropped without error.

use crate::extractors::table::{HeadingPath, Row, Table};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::debug;

pub const DEFAULT_LEVEL1_MARKER: &str = "# ";
pub const DEFAULT_LEVEL2_MARKER: &str = "## ";

/// Minimum header width for a chunk to be kept.
const MIN_COLUMNS: usize = 2;

/// Line prefixes that introduce level-1 and level-2 headings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingMarkers {
    pub level1: String,
    pub level2: String,
}

impl Default for HeadingMarkers {
    fn default() -> Self {
        Self {
            level1: DEFAULT_LEVEL1_MARKER.to_string(),
            level2: DEFAULT_LEVEL2_MARKER.to_string(),
        }
    }
}

impl HeadingMarkers {
    pub fn new(level1: impl Into<String>, level2: impl Into<String>) -> Self {
        Self {
            level1: level1.into(),
            level2: level2.into(),
        }
    }
}

enum HeadingLevel {
    Section(String),
    Subsection(String),
}

enum ScanState<'a> {
    Outside,
    Collecting(Vec<&'a str>),
}

/// Single-pass scan state. Lives only for one `extract` call.
struct Scan<'a> {
    path: HeadingPath,
    state: ScanState<'a>,
    ordinals: HashMap<HeadingPath, usize>,
    tables: Vec<Table>,
}

impl<'a> Scan<'a> {
    fn new() -> Self {
        Self {
            path: HeadingPath::default(),
            state: ScanState::Outside,
            ordinals: HashMap::new(),
            tables: Vec::new(),
        }
    }

    fn push(&mut self, line: &'a str) {
        match &mut self.state {
            ScanState::Collecting(lines) => lines.push(line),
            ScanState::Outside => self.state = ScanState::Collecting(vec![line]),
        }
    }

    fn flush(&mut self) {
        let lines = match std::mem::replace(&mut self.state, ScanState::Outside) {
            ScanState::Collecting(lines) => lines,
            ScanState::Outside => return,
        };

        if lines.len() < 2 {
            debug!(heading = %self.path, "Dropping lone pipe line");
            return;
        }

        let Some((header, rows)) = parse_chunk(&lines) else {
            debug!(heading = %self.path, "Dropping table chunk with fewer than {} columns", MIN_COLUMNS);
            return;
        };

        let ordinal = self.ordinals.entry(self.path.clone()).or_insert(0);
        self.tables.push(Table {
            heading: self.path.clone(),
            ordinal: *ordinal,
            header,
            rows,
        });
        *ordinal += 1;
    }
}

/// Recovers [`Table`]s from heading-delimited pipe-table text.
#[derive(Debug, Clone, Default)]
pub struct TableExtractor {
    markers: HeadingMarkers,
}

impl TableExtractor {
    pub fn new(markers: HeadingMarkers) -> Self {
        Self { markers }
    }

    /// Extracts every table in document order.
    pub fn extract(&self, text: &str) -> Vec<Table> {
        let mut scan = Scan::new();

        for line in text.lines() {
            let trimmed = line.trim();

            match self.heading(line) {
                Some(HeadingLevel::Section(title)) => {
                    scan.flush();
                    scan.path = HeadingPath::new(title, None);
                }
                Some(HeadingLevel::Subsection(title)) => {
                    scan.flush();
                    scan.path = HeadingPath::new(scan.path.section.clone(), Some(title));
                }
                None if trimmed.starts_with('|') => scan.push(trimmed),
                None => scan.flush(),
            }
        }
        scan.flush();

        debug!(tables = scan.tables.len(), "Extracted tables");
        scan.tables
    }

    fn heading(&self, line: &str) -> Option<HeadingLevel> {
        let line = line.trim_start();
        let level1 = self.markers.level1.as_str();
        let level2 = self.markers.level2.as_str();

        // The longer marker goes first so "##" is never read as "#" + text.
        let level2_first = level2.len() >= level1.len();
        let attempts: [(&str, bool); 2] = if level2_first {
            [(level2, true), (level1, false)]
        } else {
            [(level1, false), (level2, true)]
        };

        for (marker, is_level2) in attempts {
            if marker.is_empty() {
                continue;
            }
            if let Some(rest) = line.strip_prefix(marker) {
                let title = rest.trim().trim_end_matches('#').trim().to_string();
                return Some(if is_level2 {
                    HeadingLevel::Subsection(title)
                } else {
                    HeadingLevel::Section(title)
                });
            }
        }
        None
    }
}

/// Convenience wrapper using the default `# ` / `## ` markers.
pub fn extract_tables(text: &str) -> Vec<Table> {
    TableExtractor::default().extract(text)
}

fn parse_chunk(lines: &[&str]) -> Option<(Vec<String>, Vec<Row>)> {
    let (first, rest) = lines.split_first()?;

    let header: Vec<String> = split_cells(first)
        .into_iter()
        .map(|cell| clean_header(&cell))
        .collect();
    if header.len() < MIN_COLUMNS {
        return None;
    }

    let data = match rest.split_first() {
        Some((line, remaining)) if is_divider(line) => remaining,
        _ => rest,
    };

    let rows = data
        .iter()
        .map(|line| Row::reconcile(&header, split_cells(line)))
        .collect();

    Some((header, rows))
}

/// Splits a pipe-table line into trimmed cells. `\|` stays a literal pipe.
pub fn split_cells(line: &str) -> Vec<String> {
    let line = line.trim();
    let line = line.strip_prefix('|').unwrap_or(line);
    let line = match line.strip_suffix('|') {
        Some(stripped) if !stripped.ends_with('\\') => stripped,
        _ => line,
    };

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                current.push('|');
                chars.next();
            }
            '|' => cells.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(c),
        }
    }
    cells.push(current.trim().to_string());
    cells
}

fn clean_header(cell: &str) -> String {
    cell.trim()
        .trim_matches('|')
        .trim()
        .trim_matches(|c| c == '*' || c == '_' || c == '`')
        .trim()
        .to_string()
}

fn is_divider(line: &str) -> bool {
    static SHAPE: OnceLock<Regex> = OnceLock::new();
    static DASH_RUN: OnceLock<Regex> = OnceLock::new();
    let shape = SHAPE.get_or_init(|| Regex::new(r"^[\s|:\-]+$").expect("valid regex"));
    let dash_run = DASH_RUN.get_or_init(|| Regex::new(r"\|\s*:?-{3,}").expect("valid regex"));

    let line = line.trim();
    let normalized;
    let line = if line.starts_with('|') {
        line
    } else {
        normalized = format!("|{}", line);
        normalized.as_str()
    };
    shape.is_match(line) && dash_run.is_match(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"# flash-attn

Prebuilt wheels for every supported combination.

## 2.8

| Torch | CUDA | Python | Link |
|-------|:----:|--------|------|
| 2.8.0 | 12.8 | 3.13 | [a](http://x/a.whl) |
| 2.7.1 | 12.6 | 3.12 | [b](http://x/b.whl) |

## 2.7

| **Torch** | `CUDA` | Link |
|---|---|---|
| 2.6.0 | 12.4 | http://x/c.whl |
"#;

    #[test]
    fn test_extracts_tables_with_heading_paths() {
        let tables = extract_tables(CATALOG);
        assert_eq!(tables.len(), 2);

        assert_eq!(tables[0].heading, HeadingPath::new("flash-attn", Some("2.8".into())));
        assert_eq!(tables[0].header, vec!["Torch", "CUDA", "Python", "Link"]);
        assert_eq!(tables[0].rows.len(), 2);
        assert_eq!(tables[0].rows[0].get("Python"), Some("3.13"));

        assert_eq!(tables[1].heading, HeadingPath::new("flash-attn", Some("2.7".into())));
        assert_eq!(tables[1].header, vec!["Torch", "CUDA", "Link"]);
    }

    #[test]
    fn test_level1_heading_resets_subsection() {
        let text = "# a\n## sub\n| x | y |\n|---|---|\n| 1 | 2 |\n# b\n| x | y |\n| 3 | 4 |\n";
        let tables = extract_tables(text);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[1].heading, HeadingPath::new("b", None));
        assert_eq!(tables[1].rows[0].get("x"), Some("3"));
    }

    #[test]
    fn test_ordinal_persists_across_non_contiguous_runs() {
        let text = "# pkg\n| a | b |\n| 1 | 2 |\n\ntext between\n| a | b |\n| 3 | 4 |\n# other\n| a | b |\n| 5 | 6 |\n";
        let tables = extract_tables(text);
        let ordinals: Vec<usize> = tables.iter().map(|t| t.ordinal).collect();
        assert_eq!(ordinals, vec![0, 1, 0]);
    }

    #[test]
    fn test_blank_line_splits_tables() {
        let text = "| a | b |\n| 1 | 2 |\n\n| c | d |\n| 3 | 4 |\n";
        let tables = extract_tables(text);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[1].header, vec!["c", "d"]);
    }

    #[test]
    fn test_lone_pipe_line_is_dropped() {
        let text = "# pkg\n| a | b |\n\n| c | d |\n| 1 | 2 |\n";
        let tables = extract_tables(text);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].ordinal, 0);
    }

    #[test]
    fn test_single_column_chunk_is_dropped() {
        let text = "| only |\n|---|\n| 1 |\n";
        assert!(extract_tables(text).is_empty());
    }

    #[test]
    fn test_heading_mid_buffer_flushes_under_previous_path() {
        let text = "# first\n| a | b |\n| 1 | 2 |\n# second\n";
        let tables = extract_tables(text);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].heading.section, "first");
    }

    #[test]
    fn test_header_only_with_divider_has_no_rows() {
        let tables = extract_tables("| a | b |\n|---|---|\n");
        assert_eq!(tables.len(), 1);
        assert!(tables[0].rows.is_empty());
    }

    #[test]
    fn test_rows_reconciled_to_header_width() {
        let text = "| a | b | c |\n|---|---|---|\n| 1 |\n| 1 | 2 | 3 | 4 | 5 |\n";
        let tables = extract_tables(text);
        assert_eq!(tables[0].rows.len(), 2);
        assert!(tables[0].rows.iter().all(|r| r.len() == 3));
    }

    #[test]
    fn test_custom_markers() {
        let extractor = TableExtractor::new(HeadingMarkers::new("=== ", "--- "));
        let text = "=== pkg\n--- v1\n| a | b |\n| 1 | 2 |\n";
        let tables = extractor.extract(text);
        assert_eq!(tables[0].heading, HeadingPath::new("pkg", Some("v1".into())));
    }

    #[test]
    fn test_split_cells_keeps_escaped_pipes() {
        assert_eq!(split_cells(r"| a \| b | c |"), vec!["a | b", "c"]);
        assert_eq!(split_cells("a | b"), vec!["a", "b"]);
    }

    #[test]
    fn test_divider_detection() {
        assert!(is_divider("|---|:--:|"));
        assert!(is_divider("| :--- | ---: |"));
        assert!(is_divider("---|---"));
        assert!(!is_divider("| -- | -- |"));
        assert!(!is_divider("| 2.8.0 | 12.8 |"));
    }
}
