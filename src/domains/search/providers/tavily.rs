//! Tavily search API.

use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::domains::search::provider::{SearchProvider, SearchQuery};
use crate::domains::search::{ApiKeyPool, ProviderId, SearchResult};

pub const DEFAULT_ENDPOINT: &str = "https://api.tavily.com/search";

#[derive(Debug)]
pub struct TavilyProvider {
    endpoint: String,
    keys: ApiKeyPool,
}

impl TavilyProvider {
    pub fn new(endpoint: Option<String>, keys: ApiKeyPool) -> Self {
        Self {
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            keys,
        }
    }
}

#[derive(Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyItem>,
}

#[derive(Deserialize)]
struct TavilyItem {
    title: Option<String>,
    url: Option<String>,
    content: Option<String>,
    score: Option<f64>,
}

impl SearchProvider for TavilyProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Tavily
    }

    fn missing_configuration(&self) -> Option<&'static str> {
        self.keys
            .is_empty()
            .then_some("set TAVILY_API_KEY to one or more comma-separated keys")
    }

    fn key_pool(&self) -> Option<&ApiKeyPool> {
        Some(&self.keys)
    }

    fn build_request(
        &self,
        client: &Client,
        query: &SearchQuery<'_>,
        api_key: Option<&str>,
    ) -> RequestBuilder {
        client
            .post(&self.endpoint)
            .bearer_auth(api_key.unwrap_or_default())
            .json(&json!({
                "query": query.text,
                "max_results": query.max_results,
                "search_depth": "basic",
                "include_answer": false,
                "include_images": false,
                "include_raw_content": false,
            }))
    }

    fn parse_results(&self, body: &str) -> Vec<SearchResult> {
        let response: TavilyResponse = match serde_json::from_str(body) {
            Ok(r) => r,
            Err(e) => {
                warn!("Unreadable Tavily response: {}", e);
                return Vec::new();
            }
        };

        response
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
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_results_keeps_scores() {
        let provider = TavilyProvider::new(None, ApiKeyPool::empty());
        let body = r#"{"query":"rust","results":[
            {"title":"Rust","url":"https://rust-lang.org","content":"Fast","score":0.93}
        ]}"#;
        let results = provider.parse_results(body);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score, Some(0.93));
        assert_eq!(results[0].excerpt, "Fast");
    }
}
