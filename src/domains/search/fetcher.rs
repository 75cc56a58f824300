//! Webpage fetching and text extraction.

use std::time::Duration;

use reqwest::{Client, Proxy, Url, header::CONTENT_TYPE};
use scraper::Html;
use tracing::{debug, instrument, warn};

use super::FetchError;
use crate::core::config::FetchConfig;

/// Elements whose text never reaches the output.
const SKIPPED: &[&str] = &[
    "head", "script", "style", "noscript", "template", "svg", "iframe",
];

/// Elements that start a new output line.
const BLOCKS: &[&str] = &[
    "p", "div", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "table", "pre",
    "blockquote", "section", "article", "header", "footer", "main", "nav", "aside", "br", "dd",
    "dt", "figcaption",
];

/// Fetches pages over HTTP(S) and extracts readable text.
#[derive(Debug, Clone)]
pub struct WebpageFetcher {
    client: Client,
    user_agent: String,
}

impl WebpageFetcher {
    pub fn new(config: &FetchConfig) -> Self {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .build()
            .unwrap_or_else(|e| {
                warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });
        Self {
            client,
            user_agent: config.user_agent.clone(),
        }
    }

    /// The shared client, also used by search providers.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Fetch `url` and return its readable text.
    ///
    /// The URL is validated before any network I/O. HTML responses are
    /// reduced to their visible text; other content types are returned
    /// as-is.
    #[instrument(skip(self, proxy), fields(proxied = proxy.is_some()))]
    pub async fn fetch(
        &self,
        url: &str,
        timeout: Duration,
        proxy: Option<&str>,
    ) -> Result<String, FetchError> {
        let parsed = parse_http_url(url)?;
        let client = match proxy {
            Some(proxy) => self.proxied_client(proxy)?,
            None => self.client.clone(),
        };

        let request = client.get(parsed).timeout(timeout);
        let outcome = tokio::time::timeout(timeout, async {
            let response = request.send().await?.error_for_status()?;
            let is_html = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|ct| ct.contains("html"));
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((is_html, body))
        })
        .await;

        let (is_html, body) = match outcome {
            Err(_) => {
                return Err(FetchError::FetchTimeout {
                    url: url.to_string(),
                    timeout,
                });
            }
            Ok(Err(e)) if e.is_timeout() => {
                return Err(FetchError::FetchTimeout {
                    url: url.to_string(),
                    timeout,
                });
            }
            Ok(Err(e)) => {
                return Err(FetchError::FetchConnectionError {
                    url: url.to_string(),
                    message: e.without_url().to_string(),
                });
            }
            Ok(Ok(fetched)) => fetched,
        };

        debug!(bytes = body.len(), is_html, "Fetched page");
        if is_html || looks_like_html(&body) {
            Ok(extract_text(&body))
        } else {
            Ok(body)
        }
    }

    fn proxied_client(&self, proxy: &str) -> Result<Client, FetchError> {
        let proxy = Proxy::all(proxy).map_err(|e| FetchError::InvalidProxy {
            reason: e.without_url().to_string(),
        })?;
        Client::builder()
            .user_agent(&self.user_agent)
            .proxy(proxy)
            .build()
            .map_err(|e| FetchError::InvalidProxy {
                reason: e.to_string(),
            })
    }
}

/// Accept only absolute `http`/`https` URLs with a host.
pub fn parse_http_url(url: &str) -> Result<Url, FetchError> {
    let invalid = |reason: &str| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    };
    let parsed = Url::parse(url.trim()).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("only http and https URLs are supported"));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid("URL has no host"));
    }
    Ok(parsed)
}

fn looks_like_html(body: &str) -> bool {
    let head: String = body.trim_start().chars().take(16).collect();
    let head = head.to_ascii_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}

/// Reduce an HTML document to its visible text, one block per line.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut lines: Vec<String> = Vec::new();
    let mut current_block = None;

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| SKIPPED.contains(&e.name()))
        });
        if hidden {
            continue;
        }

        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }
        let chunk = words.join(" ");

        let block = node
            .ancestors()
            .find(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|e| BLOCKS.contains(&e.name()))
            })
            .map(|a| a.id());

        match lines.last_mut() {
            Some(line) if block == current_block => {
                line.push(' ');
                line.push_str(&chunk);
            }
            _ => lines.push(chunk),
        }
        current_block = block;
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_http_schemes() {
        for url in ["ftp://example.com/file", "file:///etc/passwd", "not a url", ""] {
            assert!(
                matches!(parse_http_url(url), Err(FetchError::InvalidUrl { .. })),
                "{url} should be rejected"
            );
        }
        assert!(parse_http_url("https://example.com/a?b=c").is_ok());
    }

    #[test]
    fn test_extract_text_skips_scripts_and_styles() {
        let html = r#"<!DOCTYPE html><html><head><title>T</title><style>p{}</style></head>
            <body><h1>Heading</h1><script>var x = 1;</script>
            <p>First <b>bold</b>   paragraph.</p><noscript>enable js</noscript>
            <ul><li>one</li><li>two</li></ul></body></html>"#;
        assert_eq!(
            extract_text(html),
            "Heading\nFirst bold paragraph.\none\ntwo"
        );
    }

    #[test]
    fn test_looks_like_html() {
        assert!(looks_like_html("  <!DOCTYPE html><html>"));
        assert!(!looks_like_html("{\"json\": true}"));
    }

    #[tokio::test]
    async fn test_invalid_url_performs_no_io() {
        let fetcher = WebpageFetcher::new(&FetchConfig::default());
        let result = fetcher
            .fetch("ftp://example.com", Duration::from_millis(10), None)
            .await;
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn test_invalid_proxy() {
        let fetcher = WebpageFetcher::new(&FetchConfig::default());
        let result = fetcher
            .fetch("https://example.com", Duration::from_secs(1), Some("::not a proxy::"))
            .await;
        assert!(matches!(result, Err(FetchError::InvalidProxy { .. })));
    }
}
