//! The search provider seam.
//!
//! A provider only knows how to build its upstream request and how to read
//! the upstream response. Sending, timeouts, key rotation and error mapping
//! live in [`SearchProviderRegistry`](super::SearchProviderRegistry) so every
//! backend fails the same way.

use reqwest::{Client, RequestBuilder};
use scraper::{Html, Selector};

use super::{ApiKeyPool, ProviderId, SearchResult};

/// A validated search request.
#[derive(Debug, Clone, Copy)]
pub struct SearchQuery<'a> {
    /// Trimmed, non-empty query text.
    pub text: &'a str,
    /// Clamped to `1..=20`.
    pub max_results: usize,
}

/// A search backend.
pub trait SearchProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    /// What is missing for this provider to be usable, if anything.
    fn missing_configuration(&self) -> Option<&'static str> {
        None
    }

    /// Keys to rotate through, for providers that need them.
    fn key_pool(&self) -> Option<&ApiKeyPool> {
        None
    }

    /// Build the upstream request. `api_key` is the key picked for this call.
    fn build_request(
        &self,
        client: &Client,
        query: &SearchQuery<'_>,
        api_key: Option<&str>,
    ) -> RequestBuilder;

    /// Normalize an upstream response body.
    ///
    /// Malformed or partial payloads yield whatever results could be read,
    /// possibly none.
    fn parse_results(&self, body: &str) -> Vec<SearchResult>;
}

/// Parse a CSS selector.
pub(crate) fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Collapse runs of whitespace into single spaces.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip markup from an HTML fragment such as a highlighted snippet.
pub(crate) fn plain_text(fragment: &str) -> String {
    if !fragment.contains('<') {
        return collapse_whitespace(fragment);
    }
    let html = Html::parse_fragment(fragment);
    collapse_whitespace(&html.root_element().text().collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_strips_tags() {
        assert_eq!(
            plain_text("The <strong>Rust</strong>   language"),
            "The Rust language"
        );
        assert_eq!(plain_text("no markup"), "no markup");
    }
}
