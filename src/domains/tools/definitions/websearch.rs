//! Web search capability: one operation per search provider.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::domains::search::{MAX_RESULTS, ProviderId, SearchResult};
use crate::domains::tools::ToolError;
use crate::domains::tools::capability::{Capability, OperationDescriptor, ToolContext};
use crate::domains::tools::spec::{ParamSpec, TypeSpec};

/// Longest timeout a caller may request, in seconds.
const MAX_TIMEOUT_SECS: f64 = 120.0;

// ============================================================================
// Tool Parameters
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct WebSearchParams {
    pub query: String,

    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Seconds; the configured default applies when absent.
    #[serde(default)]
    pub timeout: Option<f64>,

    #[serde(default)]
    pub fetch_content: bool,
}

fn default_max_results() -> usize {
    5
}

#[derive(Debug, Clone, Serialize)]
pub struct WebSearchOutput {
    pub results: Vec<SearchResult>,
}

/// Validate a caller-supplied timeout in seconds.
pub fn parse_timeout(timeout: Option<f64>, default_secs: f64) -> Result<Duration, ToolError> {
    let secs = timeout.unwrap_or(default_secs);
    if !secs.is_finite() || secs <= 0.0 || secs > MAX_TIMEOUT_SECS {
        return Err(ToolError::invalid_request(format!(
            "`timeout` must be greater than 0 and at most {} seconds",
            MAX_TIMEOUT_SECS
        )));
    }
    Ok(Duration::from_secs_f64(secs))
}

/// Shape of a [`SearchResult`] list.
pub fn search_results_spec() -> TypeSpec {
    TypeSpec::list(TypeSpec::object([
        ParamSpec::new("title", TypeSpec::String),
        ParamSpec::new("url", TypeSpec::String),
        ParamSpec::new("excerpt", TypeSpec::String),
        ParamSpec::new("content", TypeSpec::optional(TypeSpec::String)),
        ParamSpec::new("score", TypeSpec::optional(TypeSpec::Number)),
    ]))
}

// ============================================================================
// Tool Definition
// ============================================================================

pub struct WebSearchTool;

impl WebSearchTool {
    fn operation_name(provider: ProviderId) -> &'static str {
        match provider {
            ProviderId::Bing => "search_bing",
            ProviderId::Brave => "search_brave",
            ProviderId::SearXng => "search_searxng",
            ProviderId::Tavily => "search_tavily",
            ProviderId::Google => "search_google",
        }
    }

    fn operation_description(provider: ProviderId) -> &'static str {
        match provider {
            ProviderId::Bing => "Search the web with Bing. Needs no API key.",
            ProviderId::Brave => "Search the web with the Brave Search API. Requires BRAVE_API_KEY.",
            ProviderId::SearXng => {
                "Search the web through a SearXNG instance. Requires SEARXNG_URL."
            }
            ProviderId::Tavily => {
                "Search the web with the Tavily API. Results carry relevance scores. Requires TAVILY_API_KEY."
            }
            ProviderId::Google => "Search the web with Google. Needs no API key.",
        }
    }

    fn operation(provider: ProviderId) -> OperationDescriptor {
        OperationDescriptor::new(
            Self::operation_name(provider),
            Self::operation_description(provider),
            move |ctx: ToolContext, params: WebSearchParams| async move {
                let timeout = parse_timeout(params.timeout, ctx.config.search.default_timeout_secs)?;
                let results = ctx
                    .search
                    .search_with_content(
                        provider,
                        &params.query,
                        params.max_results,
                        timeout,
                        params.fetch_content,
                    )
                    .await?;
                info!(provider = %provider, results = results.len(), "Web search finished");
                Ok::<_, ToolError>(WebSearchOutput { results })
            },
        )
        .param(ParamSpec::new("query", TypeSpec::String).describe("Search query"))
        .param(
            ParamSpec::new(
                "max_results",
                TypeSpec::bounded_integer(1, MAX_RESULTS as i64),
            )
            .describe("Maximum number of results")
            .with_default(json!(default_max_results())),
        )
        .param(
            ParamSpec::new("timeout", TypeSpec::optional(TypeSpec::Number))
                .describe("Timeout in seconds"),
        )
        .param(
            ParamSpec::new("fetch_content", TypeSpec::Boolean)
                .describe("Also fetch and extract the text of each result page")
                .with_default(json!(false)),
        )
        .returns(TypeSpec::object([ParamSpec::new(
            "results",
            search_results_spec(),
        )]))
    }
}

impl Capability for WebSearchTool {
    const NAMESPACE: Option<&'static str> = Some("web");
    const DESCRIPTION: &'static str = "Web search across Bing, Brave, SearXNG, Tavily and Google";

    fn operations() -> Vec<OperationDescriptor> {
        ProviderId::ALL.into_iter().map(Self::operation).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout(None, 10.0).unwrap(), Duration::from_secs(10));
        assert_eq!(
            parse_timeout(Some(0.5), 10.0).unwrap(),
            Duration::from_millis(500)
        );
        assert!(parse_timeout(Some(0.0), 10.0).is_err());
        assert!(parse_timeout(Some(-1.0), 10.0).is_err());
        assert!(parse_timeout(Some(f64::NAN), 10.0).is_err());
        assert!(parse_timeout(Some(1e9), 10.0).is_err());
    }

    #[test]
    fn test_one_operation_per_provider() {
        let names: Vec<_> = WebSearchTool::operations()
            .iter()
            .map(|op| op.name)
            .collect();
        assert_eq!(
            names,
            vec![
                "search_bing",
                "search_brave",
                "search_searxng",
                "search_tavily",
                "search_google"
            ]
        );
    }
}
