//! Brave Search API.

use reqwest::{Client, RequestBuilder, header::ACCEPT};
use serde::Deserialize;
use tracing::warn;

use crate::domains::search::provider::{SearchProvider, SearchQuery, plain_text};
use crate::domains::search::{ApiKeyPool, ProviderId, SearchResult};

pub const DEFAULT_ENDPOINT: &str = "https://api.search.brave.com/res/v1/web/search";

#[derive(Debug)]
pub struct BraveProvider {
    endpoint: String,
    keys: ApiKeyPool,
}

impl BraveProvider {
    pub fn new(endpoint: Option<String>, keys: ApiKeyPool) -> Self {
        Self {
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            keys,
        }
    }
}

#[derive(Deserialize)]
struct BraveResponse {
    #[serde(default)]
    web: Option<BraveWeb>,
}

#[derive(Deserialize)]
struct BraveWeb {
    #[serde(default)]
    results: Vec<BraveItem>,
}

#[derive(Deserialize)]
struct BraveItem {
    title: Option<String>,
    url: Option<String>,
    description: Option<String>,
}

impl SearchProvider for BraveProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Brave
    }

    fn missing_configuration(&self) -> Option<&'static str> {
        self.keys
            .is_empty()
            .then_some("set BRAVE_API_KEY to one or more comma-separated keys")
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
        let count = query.max_results.to_string();
        client
            .get(&self.endpoint)
            .header(ACCEPT, "application/json")
            .header("X-Subscription-Token", api_key.unwrap_or_default())
            .query(&[("q", query.text), ("count", count.as_str())])
    }

    fn parse_results(&self, body: &str) -> Vec<SearchResult> {
        let response: BraveResponse = match serde_json::from_str(body) {
            Ok(r) => r,
            Err(e) => {
                warn!("Unreadable Brave response: {}", e);
                return Vec::new();
            }
        };

        response
            .web
            .map(|web| web.results)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| {
                let url = item.url.filter(|u| !u.is_empty())?;
                Some(SearchResult::new(
                    item.title.map(|t| plain_text(&t)).unwrap_or_else(|| "No title".to_string()),
                    url,
                    item.description.map(|d| plain_text(&d)).unwrap_or_default(),
                ))
            })
            .collect()
    }
}
