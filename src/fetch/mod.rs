//! Catalog retrieval
//!
//! The resolver never performs I/O itself. Catalog text is obtained through
//! the [`FetchText`] capability before resolution starts, so the core can run
//! fully offline against a pre-supplied catalog.

pub mod cache;
pub mod http;
pub mod mock;

use thiserror::Error;

pub use cache::CachedFetcher;
pub use http::HttpFetcher;
pub use mock::StaticFetcher;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Catalog download failed with HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("Timed out after {seconds}s fetching {url}")]
    Timeout { url: String, seconds: u64 },

    #[error("Failed to fetch {url}: {message}")]
    Network { url: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog at {0} is empty")]
    EmptyBody(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

/// Retrieves the text behind a URL.
pub trait FetchText {
    fn fetch_text(&self, url: &str) -> Result<String, FetchError>;
}

impl<T: FetchText + ?Sized> FetchText for &T {
    fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        (**self).fetch_text(url)
    }
}

impl<T: FetchText + ?Sized> FetchText for Box<T> {
    fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        (**self).fetch_text(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_names_no_url() {
        let err = FetchError::Client("TLS backend unavailable".to_string());
        assert_eq!(
            err.to_string(),
            "Failed to build HTTP client: TLS backend unavailable"
        );
    }

    #[test]
    fn test_boxed_fetcher_delegates() {
        let fetcher: Box<dyn FetchText> =
            Box::new(StaticFetcher::new().with_document("mem://a", "text"));
        assert_eq!(fetcher.fetch_text("mem://a").unwrap(), "text");
    }
}
