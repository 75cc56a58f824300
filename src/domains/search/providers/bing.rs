//! Bing web results, read from the public results page.

use reqwest::{Client, RequestBuilder, header::ACCEPT_LANGUAGE};
use scraper::Html;

use crate::domains::search::provider::{SearchProvider, SearchQuery, collapse_whitespace, selector};
use crate::domains::search::{ProviderId, SearchResult};

pub const DEFAULT_ENDPOINT: &str = "https://www.bing.com/search";

#[derive(Debug)]
pub struct BingProvider {
    endpoint: String,
}

impl BingProvider {
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        }
    }
}

impl SearchProvider for BingProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Bing
    }

    fn build_request(
        &self,
        client: &Client,
        query: &SearchQuery<'_>,
        _api_key: Option<&str>,
    ) -> RequestBuilder {
        let count = query.max_results.to_string();
        client
            .get(&self.endpoint)
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .query(&[("q", query.text), ("count", count.as_str())])
    }

    fn parse_results(&self, body: &str) -> Vec<SearchResult> {
        let (Some(item), Some(link), Some(caption)) = (
            selector("li.b_algo"),
            selector("h2 a"),
            selector(".b_caption p, p"),
        ) else {
            return Vec::new();
        };

        let document = Html::parse_document(body);
        document
            .select(&item)
            .filter_map(|result| {
                let anchor = result.select(&link).next()?;
                let url = anchor
                    .value()
                    .attr("href")
                    .filter(|href| href.starts_with("http"))?;
                let title = collapse_whitespace(&anchor.text().collect::<String>());
                let excerpt = result
                    .select(&caption)
                    .next()
                    .map(|p| collapse_whitespace(&p.text().collect::<String>()))
                    .unwrap_or_default();
                Some(SearchResult::new(title, url, excerpt))
            })
            .collect()
    }
}
