// Catalog document extraction
//
// Recovers normalized tables from heading-delimited pipe-table text so the
// table-backed catalog provider can turn them into artifacts.

pub mod export;
pub mod markdown;
pub mod table;

pub use export::{write_tables, TableDocument};
pub use markdown::{extract_tables, HeadingMarkers, TableExtractor};
pub use table::{HeadingPath, Row, Table};
