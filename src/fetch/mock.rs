//! In-memory fetcher for offline and deterministic runs

use super::{FetchError, FetchText};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    documents: HashMap<String, String>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, url: impl Into<String>, text: impl Into<String>) -> Self {
        self.documents.insert(url.into(), text.into());
        self
    }

    pub fn insert(&mut self, url: impl Into<String>, text: impl Into<String>) {
        self.documents.insert(url.into(), text.into());
    }
}

impl FetchText for StaticFetcher {
    fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Http {
                status: 404,
                url: url.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serves_registered_documents() {
        let fetcher = StaticFetcher::new().with_document("https://x/catalog.md", "# pkg");
        assert_eq!(fetcher.fetch_text("https://x/catalog.md").unwrap(), "# pkg");
    }

    #[test]
    fn test_unknown_url_is_404() {
        let err = StaticFetcher::new().fetch_text("https://x/missing").unwrap_err();
        assert!(matches!(err, FetchError::Http { status: 404, .. }));
    }
}
