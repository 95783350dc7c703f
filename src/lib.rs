//! wheelmatch - resolve prebuilt wheel URLs from compatibility catalogs
//!
//! Projects that ship prebuilt native wheels often publish a compatibility
//! catalog: either a hand-maintained markdown document with one pipe table
//! per release line, or a structured JSON index. This library turns such a
//! catalog plus a request (package, framework version, accelerator tag,
//! language version) into a single download URL, with an explicit and
//! deterministic fallback order.
//!
//! # Example Usage
//!
//! ```
//! use wheelmatch::{extract_tables, resolve_catalog, Catalog, RequestDescriptor, TableCatalog};
//!
//! let markdown = "# flash-attn\n\
//!     | Torch | CUDA | Python | Link |\n\
//!     |---|---|---|---|\n\
//!     | 2.8.0 | 12.8 | 3.13 | [wheel](https://example.com/fa.whl) |\n";
//!
//! let catalog = Catalog::Tables(TableCatalog::new(extract_tables(markdown)));
//! let request = RequestDescriptor::new("flash-attn", "2.8.0", "cu129", "3.13");
//!
//! let resolution = resolve_catalog(&catalog, &request).unwrap();
//! assert_eq!(resolution.url, "https://example.com/fa.whl");
//! assert_eq!(resolution.attempt.tier, 2);
//! ```
//!
//! # Project Structure
//!
//! - [`extractors`]: heading-scoped pipe-table extraction and audit export
//! - [`tags`]: accelerator tag normalization
//! - [`catalog`]: adapting tables or JSON into a uniform artifact stream
//! - [`matcher`]: tiered and scored resolution strategies
//! - [`fetch`]: catalog retrieval (HTTP, on-disk cache, in-memory)
//! - [`service`]: load, parse and resolve in one call

pub mod catalog;
pub mod cli;
pub mod config;
pub mod extractors;
pub mod fetch;
pub mod matcher;
pub mod service;
pub mod tags;
pub mod util;

pub use catalog::{
    Artifact, CandidateProvider, Catalog, CatalogError, CatalogKind, Scope, StructuredCatalog,
    TableCatalog,
};
pub use config::{ConfigError, WheelmatchConfig};
pub use extractors::{extract_tables, HeadingMarkers, HeadingPath, Row, Table, TableExtractor};
pub use fetch::{CachedFetcher, FetchError, FetchText, HttpFetcher, StaticFetcher};
pub use matcher::{
    Attempt, MatchError, MatchStrategy, RequestDescriptor, Resolution, ResolutionFailure,
    ScoredMatcher, Strategy, TieredMatcher,
};
pub use service::{resolve_catalog, ResolverService, ServiceError};
pub use tags::{to_dotted, TagError};
pub use util::{init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
