//! SearXNG metasearch instance.

use reqwest::{Client, RequestBuilder, header::ACCEPT};
use serde::Deserialize;
use tracing::warn;

use crate::domains::search::provider::{SearchProvider, SearchQuery};
use crate::domains::search::{ProviderId, SearchResult};

#[derive(Debug)]
pub struct SearxngProvider {
    /// `<base>/search`, or `None` when no instance is configured.
    search_url: Option<String>,
}

impl SearxngProvider {
    pub fn new(base_url: Option<&str>) -> Self {
        Self {
            search_url: base_url.map(search_url),
        }
    }
}

fn search_url(base: &str) -> String {
    let base = base.trim().trim_end_matches('/');
    if base.ends_with("/search") {
        base.to_string()
    } else {
        format!("{}/search", base)
    }
}

#[derive(Deserialize)]
struct SearxngResponse {
    #[serde(default)]
    results: Vec<SearxngItem>,
}

#[derive(Deserialize)]
struct SearxngItem {
    title: Option<String>,
    url: Option<String>,
    content: Option<String>,
    score: Option<f64>,
}

impl SearchProvider for SearxngProvider {
    fn id(&self) -> ProviderId {
        ProviderId::SearXng
    }

    fn missing_configuration(&self) -> Option<&'static str> {
        self.search_url
            .is_none()
            .then_some("set SEARXNG_URL to the base URL of a SearXNG instance")
    }

    fn build_request(
        &self,
        client: &Client,
        query: &SearchQuery<'_>,
        _api_key: Option<&str>,
    ) -> RequestBuilder {
        let url = self.search_url.as_deref().unwrap_or_default();
        client
            .get(url)
            .header(ACCEPT, "application/json")
            .query(&[
                ("q", query.text),
                ("format", "json"),
                ("language", "en"),
                ("safesearch", "1"),
            ])
    }

    fn parse_results(&self, body: &str) -> Vec<SearchResult> {
        let response: SearxngResponse = match serde_json::from_str(body) {
            Ok(r) => r,
            Err(e) => {
                warn!("Unreadable SearXNG response: {}", e);
                return Vec::new();
            }
        };

        let mut results: Vec<SearchResult> = response
            .results
            .into_iter()
            .filter_map(|item| {
                let url = item.url.filter(|u| !u.is_empty())?;
                Some(
                    SearchResult::new(
                        item.title.unwrap_or_else(|| "No title".to_string()),
                        url,
                        item.content.unwrap_or_default(),
                    )
                    .with_score(item.score),
                )
            })
            .collect();

        // Highest score first; unscored results sink
        results.sort_by(|a, b| {
            let a = a.score.unwrap_or(f64::NEG_INFINITY);
            let b = b.score.unwrap_or(f64::NEG_INFINITY);
            b.total_cmp(&a)
        });
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_normalization() {
        assert_eq!(search_url("http://localhost:8080/"), "http://localhost:8080/search");
        assert_eq!(search_url("http://localhost:8080"), "http://localhost:8080/search");
        assert_eq!(
            search_url("http://localhost:8080/search/"),
            "http://localhost:8080/search"
        );
    }

    #[test]
    fn test_results_sorted_by_score() {
        let provider = SearxngProvider::new(Some("http://localhost"));
        let body = r#"{"results":[
            {"title":"low","url":"https://a","content":"","score":0.2},
            {"title":"none","url":"https://b"},
            {"title":"high","url":"https://c","content":"","score":3.5}
        ]}"#;
        let titles: Vec<_> = provider
            .parse_results(body)
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["high", "low", "none"]);
    }

    #[test]
    fn test_unconfigured_without_url() {
        assert!(SearxngProvider::new(None).missing_configuration().is_some());
    }
}
