//! Google web results, read from the public results page.

use reqwest::{Client, RequestBuilder, Url, header::ACCEPT_LANGUAGE};
use scraper::Html;

use crate::domains::search::provider::{SearchProvider, SearchQuery, collapse_whitespace, selector};
use crate::domains::search::{ProviderId, SearchResult};

pub const DEFAULT_ENDPOINT: &str = "https://www.google.com/search";

#[derive(Debug)]
pub struct GoogleProvider {
    endpoint: String,
}

impl GoogleProvider {
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        }
    }
}

/// Resolve a result link, unwrapping `/url?q=` redirects.
fn resolve_href(href: &str) -> Option<String> {
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    if href.starts_with("/url?") {
        let url = Url::parse(&format!("https://www.google.com{}", href)).ok()?;
        return url
            .query_pairs()
            .find(|(k, _)| k == "q")
            .map(|(_, v)| v.into_owned())
            .filter(|v| v.starts_with("http"));
    }
    None
}

impl SearchProvider for GoogleProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Google
    }

    fn build_request(
        &self,
        client: &Client,
        query: &SearchQuery<'_>,
        _api_key: Option<&str>,
    ) -> RequestBuilder {
        let num = query.max_results.to_string();
        client
            .get(&self.endpoint)
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .query(&[("q", query.text), ("num", num.as_str()), ("hl", "en")])
    }

    fn parse_results(&self, body: &str) -> Vec<SearchResult> {
        let (Some(item), Some(link), Some(heading), Some(snippet)) = (
            selector("div.g"),
            selector("a[href]"),
            selector("h3"),
            selector("div.VwiC3b, span.aCOpRe, div[data-sncf]"),
        ) else {
            return Vec::new();
        };

        let document = Html::parse_document(body);
        document
            .select(&item)
            .filter_map(|result| {
                let title = result.select(&heading).next()?;
                let url = result
                    .select(&link)
                    .filter_map(|a| a.value().attr("href"))
                    .find_map(resolve_href)?;
                let excerpt = result
                    .select(&snippet)
                    .next()
                    .map(|s| collapse_whitespace(&s.text().collect::<String>()))
                    .unwrap_or_default();
                Some(SearchResult::new(
                    collapse_whitespace(&title.text().collect::<String>()),
                    url,
                    excerpt,
                ))
            })
            .collect()
    }
}
