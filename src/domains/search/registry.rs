//! Search Provider Registry - one entry per backend, built from configuration.

use std::collections::HashMap;
use std::time::Duration;

use futures::future::join_all;
use reqwest::Client;
use tracing::{info, instrument, warn};

use super::provider::{SearchProvider, SearchQuery};
use super::providers::{BingProvider, BraveProvider, GoogleProvider, SearxngProvider, TavilyProvider};
use super::{ApiKeyPool, ProviderId, SearchError, SearchResult, WebpageFetcher};
use crate::core::config::SearchConfig;

/// Upper bound on results per query.
pub const MAX_RESULTS: usize = 20;

/// Holds every search backend and performs the outbound calls.
pub struct SearchProviderRegistry {
    providers: HashMap<ProviderId, Box<dyn SearchProvider>>,
    client: Client,
    fetcher: WebpageFetcher,
}

impl SearchProviderRegistry {
    /// Build all providers from configuration.
    ///
    /// Unconfigured providers are still registered; they fail with
    /// [`SearchError::ProviderUnconfigured`] when used.
    pub fn from_config(config: &SearchConfig, fetcher: WebpageFetcher) -> Self {
        let providers: Vec<Box<dyn SearchProvider>> = vec![
            Box::new(BingProvider::new(config.bing_endpoint.clone())),
            Box::new(BraveProvider::new(
                config.brave_endpoint.clone(),
                ApiKeyPool::new(config.brave_api_keys.clone()),
            )),
            Box::new(SearxngProvider::new(config.searxng_url.as_deref())),
            Box::new(TavilyProvider::new(
                config.tavily_endpoint.clone(),
                ApiKeyPool::new(config.tavily_api_keys.clone()),
            )),
            Box::new(GoogleProvider::new(config.google_endpoint.clone())),
        ];

        for provider in &providers {
            if let Some(hint) = provider.missing_configuration() {
                info!("Search provider '{}' disabled: {}", provider.id(), hint);
            }
        }

        Self {
            providers: providers.into_iter().map(|p| (p.id(), p)).collect(),
            client: fetcher.client().clone(),
            fetcher,
        }
    }

    /// Whether `provider` has everything it needs.
    pub fn is_configured(&self, provider: ProviderId) -> bool {
        self.providers
            .get(&provider)
            .is_some_and(|p| p.missing_configuration().is_none())
    }

    /// Run a search against one provider.
    ///
    /// Configuration is checked first, then an empty query short-circuits to
    /// no results without any network I/O. `max_results` is clamped to
    /// `1..=20`.
    #[instrument(skip(self, query), fields(provider = %provider))]
    pub async fn search(
        &self,
        provider: ProviderId,
        query: &str,
        max_results: usize,
        timeout: Duration,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let backend = self
            .providers
            .get(&provider)
            .ok_or_else(|| SearchError::UnknownProvider(provider.to_string()))?;

        if let Some(hint) = backend.missing_configuration() {
            return Err(SearchError::ProviderUnconfigured { provider, hint });
        }

        let query = SearchQuery {
            text: query.trim(),
            max_results: max_results.clamp(1, MAX_RESULTS),
        };
        if query.text.is_empty() {
            warn!("Empty search query, returning no results");
            return Ok(Vec::new());
        }

        let api_key = backend.key_pool().and_then(ApiKeyPool::next_key);
        let request = backend
            .build_request(&self.client, &query, api_key)
            .timeout(timeout);

        let outcome = tokio::time::timeout(timeout, async {
            let response = request.send().await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        })
        .await;

        let body = match outcome {
            Err(_) => return Err(SearchError::ProviderTimeout { provider, timeout }),
            Ok(Err(e)) if e.is_timeout() => {
                return Err(SearchError::ProviderTimeout { provider, timeout });
            }
            Ok(Err(e)) => {
                return Err(SearchError::ProviderUnavailable {
                    provider,
                    message: e.without_url().to_string(),
                });
            }
            Ok(Ok((status, _))) if !status.is_success() => {
                return Err(SearchError::ProviderUnavailable {
                    provider,
                    message: format!("upstream returned HTTP {}", status),
                });
            }
            Ok(Ok((_, body))) => body,
        };

        let mut results = backend.parse_results(&body);
        results.truncate(query.max_results);
        info!(results = results.len(), "Search completed");
        Ok(results)
    }

    /// Search, then optionally fetch every result page concurrently.
    ///
    /// A page that cannot be fetched leaves that result's `content` empty;
    /// it never fails the search.
    pub async fn search_with_content(
        &self,
        provider: ProviderId,
        query: &str,
        max_results: usize,
        timeout: Duration,
        fetch_content: bool,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let mut results = self.search(provider, query, max_results, timeout).await?;
        if !fetch_content || results.is_empty() {
            return Ok(results);
        }

        let pages = join_all(
            results
                .iter()
                .map(|r| self.fetcher.fetch(&r.url, timeout, None)),
        )
        .await;

        for (result, page) in results.iter_mut().zip(pages) {
            match page {
                Ok(text) => result.content = Some(text),
                Err(e) => warn!("Content fetch failed for {}: {}", result.url, e),
            }
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::FetchConfig;

    fn registry(config: SearchConfig) -> SearchProviderRegistry {
        SearchProviderRegistry::from_config(&config, WebpageFetcher::new(&FetchConfig::default()))
    }

    #[test]
    fn test_scraping_providers_always_configured() {
        let registry = registry(SearchConfig::default());
        assert!(registry.is_configured(ProviderId::Bing));
        assert!(registry.is_configured(ProviderId::Google));
        assert!(!registry.is_configured(ProviderId::Brave));
        assert!(!registry.is_configured(ProviderId::Tavily));
        assert!(!registry.is_configured(ProviderId::SearXng));
    }

    #[tokio::test]
    async fn test_unconfigured_provider_fails_before_io() {
        let registry = registry(SearchConfig::default());
        let err = registry
            .search(ProviderId::SearXng, "rust", 5, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SearchError::ProviderUnconfigured {
                provider: ProviderId::SearXng,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_empty_query_returns_nothing() {
        let config = SearchConfig {
            // Unroutable; any request would fail
            searxng_url: Some("http://127.0.0.1:1".to_string()),
            ..Default::default()
        };
        let results = registry(config)
            .search(ProviderId::SearXng, "   ", 5, Duration::from_secs(1))
            .await
            .unwrap();
        assert!(results.is_empty());
    }
}
