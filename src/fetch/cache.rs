//! On-disk catalog cache
//!
//! Each URL is stored as `<cache_dir>/<sha256(url)>.txt`. An entry is fresh
//! while its modification time is within the TTL. Cache failures never fail
//! a fetch: an unreadable entry is refetched and a failed write is logged.

use super::{FetchError, FetchText};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};

pub const DEFAULT_TTL_SECS: u64 = 3600;

#[derive(Debug, Clone)]
pub struct CachedFetcher<F> {
    inner: F,
    cache_dir: PathBuf,
    ttl: Duration,
}

impl<F: FetchText> CachedFetcher<F> {
    pub fn new(inner: F, cache_dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            inner,
            cache_dir: cache_dir.into(),
            ttl,
        }
    }

    pub fn cache_path(&self, url: &str) -> PathBuf {
        let digest = Sha256::digest(url.as_bytes());
        self.cache_dir.join(format!("{}.txt", hex::encode(digest)))
    }

    fn is_fresh(&self, path: &Path) -> bool {
        let Ok(modified) = fs::metadata(path).and_then(|m| m.modified()) else {
            return false;
        };
        SystemTime::now()
            .duration_since(modified)
            .map(|elapsed| elapsed < self.ttl)
            .unwrap_or(false)
    }

    fn store(&self, path: &Path, text: &str) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, text)
    }
}

impl<F: FetchText> FetchText for CachedFetcher<F> {
    fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let path = self.cache_path(url);

        if self.is_fresh(&path) {
            match fs::read_to_string(&path) {
                Ok(text) if !text.trim().is_empty() => {
                    debug!(url, cache = %path.display(), "Using cached catalog");
                    return Ok(text);
                }
                Ok(_) => debug!(cache = %path.display(), "Ignoring empty cache entry"),
                Err(e) => debug!(cache = %path.display(), error = %e, "Unreadable cache entry"),
            }
        }

        let text = self.inner.fetch_text(url)?;

        if let Err(e) = self.store(&path, &text) {
            warn!(cache = %path.display(), error = %e, "Failed to write catalog cache");
        }

        Ok(text)
    }
}
