//! Webpage fetch capability.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::websearch::parse_timeout;
use crate::domains::tools::ToolError;
use crate::domains::tools::capability::{Capability, OperationDescriptor, ToolContext};
use crate::domains::tools::spec::{ParamSpec, TypeSpec};

#[derive(Debug, Clone, Deserialize)]
pub struct WebpageParams {
    pub url: String,

    #[serde(default)]
    pub timeout: Option<f64>,

    /// Proxy URL for this request only, e.g. `http://proxy:3128`.
    #[serde(default)]
    pub proxy: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebpageOutput {
    pub url: String,
    pub content: String,
}

pub struct FetchTool;

impl FetchTool {
    #[instrument(skip_all, fields(url = %params.url))]
    async fn webpage(ctx: ToolContext, params: WebpageParams) -> Result<WebpageOutput, ToolError> {
        let timeout = parse_timeout(params.timeout, ctx.config.fetch.default_timeout_secs)?;
        let proxy = params.proxy.as_deref().filter(|p| !p.trim().is_empty());
        let content = ctx.fetcher.fetch(&params.url, timeout, proxy).await?;
        info!(chars = content.len(), "Fetched webpage");
        Ok(WebpageOutput {
            url: params.url,
            content,
        })
    }
}

impl Capability for FetchTool {
    const NAMESPACE: Option<&'static str> = Some("fetch");
    const DESCRIPTION: &'static str = "Webpage retrieval and text extraction";

    fn operations() -> Vec<OperationDescriptor> {
        vec![
            OperationDescriptor::new(
                "webpage",
                "Fetch an http(s) URL and return its readable text content.",
                Self::webpage,
            )
            .param(ParamSpec::new("url", TypeSpec::String).describe("Absolute http or https URL"))
            .param(
                ParamSpec::new("timeout", TypeSpec::optional(TypeSpec::Number))
                    .describe("Timeout in seconds"),
            )
            .param(
                ParamSpec::new("proxy", TypeSpec::optional(TypeSpec::String))
                    .describe("Optional proxy URL for this request"),
            )
            .returns(TypeSpec::object([
                ParamSpec::new("url", TypeSpec::String),
                ParamSpec::new("content", TypeSpec::String),
            ])),
        ]
    }
}
