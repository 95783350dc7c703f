//! Resolution service
//!
//! Ties the pieces together for callers that start from a catalog location
//! rather than catalog text:
//!
//! 1. Load the catalog text (local path, `file://` URL, or HTTP through the
//!    configured [`FetchText`] implementation)
//! 2. Parse it into a [`Catalog`] of the detected or requested kind
//! 3. Resolve the request with the strategy that belongs to that kind
//!
//! Loading happens strictly before resolution; resolution itself is a pure
//! function of the parsed catalog and the request.
//!
//! # Example
//!
//! ```no_run
//! use wheelmatch::service::ResolverService;
//! use wheelmatch::{RequestDescriptor, WheelmatchConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = ResolverService::from_config(&WheelmatchConfig::default())?;
//! let request = RequestDescriptor::new("flash-attn", "2.8.0", "cu129", "3.12");
//!
//! let resolution = service.resolve("https://example.com/wheels.md", None, &request)?;
//! println!("{}", resolution.url);
//! # Ok(())
//! # }
//! ```

use crate::catalog::{Catalog, CatalogError, CatalogKind, CandidateProvider};
use crate::config::{ConfigError, WheelmatchConfig};
use crate::extractors::{Table, TableExtractor};
use crate::fetch::{CachedFetcher, FetchError, FetchText, HttpFetcher};
use crate::matcher::{MatchError, MatchStrategy, RequestDescriptor, Resolution, ScoredMatcher, TieredMatcher};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No catalog given. Pass --catalog or set WHEELMATCH_CATALOG_URL")]
    MissingCatalog,

    #[error("Catalog file not readable: {path}: {source}")]
    CatalogNotFound {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Match(#[from] MatchError),
}

impl ServiceError {
    /// Process exit code: 2 for retrieval failures, 1 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            ServiceError::Fetch(_) | ServiceError::CatalogNotFound { .. } => 2,
            _ => 1,
        }
    }

    /// Returns a user-friendly error message with troubleshooting hints
    pub fn help_message(&self) -> String {
        match self {
            ServiceError::MissingCatalog => "Error: No catalog location\n\n\
                Help: Tell wheelmatch where the compatibility catalog lives:\n\
                - Pass it directly: --catalog <path|url>\n\
                - Or set WHEELMATCH_CATALOG_URL"
                .to_string(),
            ServiceError::CatalogNotFound { path, source } => {
                format!(
                    "Error: Catalog file not readable\nPath: {}\n\n\
                    Help: Please check:\n\
                    - Is the path correct?\n\
                    - Do you have permission to read it?\n\n\
                    Details: {}",
                    path.display(),
                    source
                )
            }
            ServiceError::Config(err) => {
                format!(
                    "Error: Configuration error\n\n\
                    Help: Check the WHEELMATCH_* environment variables.\n\
                    Run `wheelmatch config` to see the effective settings.\n\n\
                    Details: {}",
                    err
                )
            }
            ServiceError::Fetch(err) => match err {
                FetchError::Timeout { seconds, .. } => {
                    format!(
                        "Error: Catalog request timed out after {} seconds\n\n\
                        Help: Try:\n\
                        - Increase timeout: --timeout {}\n\
                        - Check network connectivity\n\
                        - Use a local copy: --catalog ./catalog.md",
                        seconds,
                        seconds * 2
                    )
                }
                FetchError::Http { status, url } => {
                    format!(
                        "Error: Catalog download failed (HTTP {})\nURL: {}\n\n\
                        Help: Check the catalog URL is correct and publicly reachable.",
                        status, url
                    )
                }
                _ => {
                    format!(
                        "Error: Could not retrieve catalog\n\n\
                        Help: Try:\n\
                        - Check network connectivity\n\
                        - Retry with --no-cache\n\
                        - Use a local copy: --catalog ./catalog.md\n\n\
                        Details: {}",
                        err
                    )
                }
            },
            ServiceError::Catalog(err) => {
                format!(
                    "Error: Catalog could not be parsed\n\n\
                    Help: Force the catalog kind with --kind markdown|json if detection guessed wrong.\n\n\
                    Details: {}",
                    err
                )
            }
            ServiceError::Match(MatchError::InvalidTag(err)) => {
                format!(
                    "Error: {}\n\n\
                    Help: Accelerator tags look like cu129 or 12.9.",
                    err
                )
            }
            ServiceError::Match(MatchError::ResolutionFailure(failure)) => {
                let hint = if failure.abi_relaxation_tried {
                    "- Check the catalog publishes a build for this combination\n\
                     - Try a different framework or language version"
                } else {
                    "- Allow version-neutral builds: --abi-relaxation\n\
                     - Check the catalog publishes a build for this combination"
                };
                format!("Error: {}\n\nHelp: Try:\n{}", failure, hint)
            }
        }
    }
}

/// Catalog source, as classified from a `--catalog` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Local(PathBuf),
    Remote(String),
}

impl CatalogSource {
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        if let Some(path) = location.strip_prefix("file://") {
            CatalogSource::Local(PathBuf::from(path))
        } else if location.starts_with("http://") || location.starts_with("https://") {
            CatalogSource::Remote(location.to_string())
        } else {
            CatalogSource::Local(PathBuf::from(location))
        }
    }
}

/// Loads catalogs and resolves requests against them.
pub struct ResolverService {
    fetcher: Box<dyn FetchText>,
    extractor: TableExtractor,
}

impl ResolverService {
    pub fn new(fetcher: Box<dyn FetchText>, extractor: TableExtractor) -> Self {
        Self { fetcher, extractor }
    }

    /// HTTP fetcher with the configured timeout, cached on disk when caching
    /// is enabled.
    pub fn from_config(config: &WheelmatchConfig) -> Result<Self, ServiceError> {
        config.validate()?;

        let http = HttpFetcher::new(config.request_timeout_secs)?;
        let fetcher: Box<dyn FetchText> = match config.active_cache_dir() {
            Some(dir) => {
                debug!(cache_dir = %dir.display(), ttl_secs = config.cache_ttl_secs, "Catalog cache enabled");
                Box::new(CachedFetcher::new(http, dir.clone(), config.cache_ttl()))
            }
            None => Box::new(http),
        };

        Ok(Self::new(
            fetcher,
            TableExtractor::new(config.heading_markers()),
        ))
    }

    pub fn extractor(&self) -> &TableExtractor {
        &self.extractor
    }

    pub fn load_text(&self, location: &str) -> Result<String, ServiceError> {
        match CatalogSource::parse(location) {
            CatalogSource::Local(path) => {
                debug!(path = %path.display(), "Reading catalog from disk");
                fs::read_to_string(&path).map_err(|source| ServiceError::CatalogNotFound { path, source })
            }
            CatalogSource::Remote(url) => Ok(self.fetcher.fetch_text(&url)?),
        }
    }

    pub fn load_catalog(
        &self,
        location: &str,
        kind: Option<CatalogKind>,
    ) -> Result<Catalog, ServiceError> {
        let text = self.load_text(location)?;
        let catalog = Catalog::parse(&text, kind, &self.extractor)?;
        debug!(location, kind = %catalog.kind(), "Parsed catalog");
        Ok(catalog)
    }

    pub fn extract_tables(&self, location: &str) -> Result<Vec<Table>, ServiceError> {
        let text = self.load_text(location)?;
        Ok(self.extractor.extract(&text))
    }

    pub fn resolve(
        &self,
        location: &str,
        kind: Option<CatalogKind>,
        request: &RequestDescriptor,
    ) -> Result<Resolution, ServiceError> {
        let start = Instant::now();
        let catalog = self.load_catalog(location, kind)?;
        let resolution = resolve_catalog(&catalog, request)?;

        info!(
            package = %request.package,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Resolution completed"
        );
        Ok(resolution)
    }
}

/// Markdown catalogs use the tiered strategy, structured catalogs the scored one.
pub fn matcher_for(kind: CatalogKind) -> Box<dyn MatchStrategy> {
    match kind {
        CatalogKind::Markdown => Box::new(TieredMatcher::new()),
        CatalogKind::Structured => Box::new(ScoredMatcher::new()),
    }
}

/// Resolves against an already-parsed catalog. No I/O.
pub fn resolve_catalog(
    catalog: &Catalog,
    request: &RequestDescriptor,
) -> Result<Resolution, MatchError> {
    let provider: &dyn CandidateProvider = match catalog {
        Catalog::Tables(tables) => tables,
        Catalog::Structured(structured) => structured,
    };
    matcher_for(catalog.kind()).resolve(provider, request)
}
