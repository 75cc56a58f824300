//! Route Synthesizer - REST surface derived from the capability registry.
//!
//! Every `(namespace, operation)` pair becomes `POST /<namespace>/<operation>`
//! with a JSON body. Discovery endpoints describe the same route set.

use axum::{
    Json, Router,
    body::Bytes,
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{info, instrument};

use super::ToolError;
use super::capability::{route_path, tool_name};
use super::dispatch::Dispatcher;
use super::openapi::openapi_document;
use crate::core::security::bearer_credential;
use crate::domains::search::{FetchError, SearchError};

/// Summary of one synthesized endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteSpec {
    pub method: &'static str,
    pub path: String,
    pub tool_name: String,
    pub namespace: String,
    pub operation: &'static str,
    pub description: &'static str,
}

/// Builds the REST surface for a dispatcher.
#[derive(Clone)]
pub struct RouteSynthesizer {
    dispatcher: Dispatcher,
}

impl RouteSynthesizer {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Every endpoint the router serves, in registration order.
    ///
    /// Computed from the frozen registry, so repeated calls agree.
    pub fn routes(&self) -> Vec<RouteSpec> {
        self.dispatcher
            .registry()
            .operations()
            .map(|(capability, op)| RouteSpec {
                method: "POST",
                path: route_path(&capability.namespace, op.name),
                tool_name: tool_name(&capability.namespace, op.name),
                namespace: capability.namespace.clone(),
                operation: op.name,
                description: op.description,
            })
            .collect()
    }

    /// The OpenAPI 3.1 document for the synthesized routes.
    pub fn openapi(&self) -> Value {
        let config = &self.dispatcher.context().config;
        openapi_document(
            self.dispatcher.registry(),
            self.dispatcher.gate().is_enforcing(),
            &config.server.name,
            &config.server.version,
        )
    }

    /// Operation routes plus `/openapi.json`, `/docs` and `/tools`.
    ///
    /// Each operation is also served at `/<tool_name>` (e.g. `/fetch_webpage`).
    /// The alias is left out of the discovery documents.
    pub fn router(&self) -> Router {
        let mut router = Router::new();

        for route in self.routes() {
            let dispatcher = self.dispatcher.clone();
            let namespace = route.namespace.clone();
            let operation = route.operation;
            let handler = post(move |headers: HeaderMap, body: Bytes| async move {
                handle_operation(&dispatcher, &namespace, operation, &headers, &body).await
            });
            router = router
                .route(&route.path, handler.clone())
                .route(&alias_path(&route.tool_name), handler);
        }

        let document = self.openapi();
        let routes = self.routes();
        info!(routes = routes.len(), "Synthesized REST routes");

        router
            .route("/openapi.json", get(move || async move { Json(document) }))
            .route("/tools", get(move || async move { Json(routes) }))
            .route("/docs", get(docs_page))
    }
}

/// Flat alias for an operation route.
pub fn alias_path(tool_name: &str) -> String {
    format!("/{}", tool_name)
}

#[instrument(skip(dispatcher, headers, body))]
async fn handle_operation(
    dispatcher: &Dispatcher,
    namespace: &str,
    operation: &str,
    headers: &HeaderMap,
    body: &Bytes,
) -> Response {
    // Credentials are checked before the body is looked at.
    if let Err(e) = dispatcher.authorize(bearer_credential(headers)) {
        return ApiError(e).into_response();
    }

    let arguments = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        match serde_json::from_slice::<Value>(body) {
            Ok(value) => value,
            Err(e) => {
                return ApiError(ToolError::invalid_request(format!("Malformed JSON body: {}", e)))
                    .into_response();
            }
        }
    };

    match dispatcher
        .invoke(bearer_credential(headers), namespace, operation, arguments)
        .await
    {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

async fn docs_page() -> Html<&'static str> {
    Html(DOCS_HTML)
}

const DOCS_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>Tool Hub API</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    window.onload = () => {
      window.ui = SwaggerUIBundle({ url: "/openapi.json", dom_id: "#swagger-ui" });
    };
  </script>
</body>
</html>
"##;

// ============================================================================
// Error responses
// ============================================================================

/// HTTP rendering of a [`ToolError`].
#[derive(Debug)]
pub struct ApiError(pub ToolError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ToolError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ToolError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ToolError::NotFound(_) => StatusCode::NOT_FOUND,
            ToolError::Search(e) => match e {
                SearchError::ProviderUnconfigured { .. } => StatusCode::SERVICE_UNAVAILABLE,
                SearchError::ProviderUnavailable { .. } => StatusCode::BAD_GATEWAY,
                SearchError::ProviderTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                SearchError::UnknownProvider(_) => StatusCode::NOT_FOUND,
            },
            ToolError::Fetch(e) => match e {
                FetchError::InvalidUrl { .. } | FetchError::InvalidProxy { .. } => {
                    StatusCode::BAD_REQUEST
                }
                FetchError::FetchTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                FetchError::FetchConnectionError { .. } => StatusCode::BAD_GATEWAY,
            },
            ToolError::ExecutionFailed(_) | ToolError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<ToolError> for ApiError {
    fn from(e: ToolError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": {
                "kind": self.0.kind(),
                "message": self.0.public_message(),
            }
        });
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::core::config::{AuthConfig, Config};
    use crate::core::security::{AuthError, AuthGate};
    use crate::domains::search::ProviderId;
    use crate::domains::tools::{CapabilityRegistry, ToolContext};

    fn synthesizer() -> RouteSynthesizer {
        let registry = CapabilityRegistry::with_default_capabilities()
            .unwrap()
            .freeze();
        let gate = Arc::new(AuthGate::new(&AuthConfig::default()));
        let context = ToolContext::new(Arc::new(Config::default()));
        RouteSynthesizer::new(Dispatcher::new(registry, gate, context))
    }

    #[test]
    fn test_routes_are_idempotent() {
        let synth = synthesizer();
        let first = synth.routes();
        assert_eq!(first, synth.routes());
        assert!(first.iter().all(|r| r.method == "POST"));
        assert!(first.iter().any(|r| r.path == "/calc/evaluate" && r.tool_name == "calc_evaluate"));
    }

    #[test]
    fn test_alias_paths_do_not_collide() {
        let routes = synthesizer().routes();
        let aliases: Vec<_> = routes.iter().map(|r| alias_path(&r.tool_name)).collect();
        assert!(aliases.contains(&"/fetch_webpage".to_string()));
        for route in &routes {
            assert!(!aliases.contains(&route.path));
        }
        for reserved in ["/openapi.json", "/tools", "/docs", "/health"] {
            assert!(!aliases.contains(&reserved.to_string()));
        }
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ToolError::invalid_request("x"), StatusCode::BAD_REQUEST),
            (ToolError::from(AuthError::MissingCredential), StatusCode::UNAUTHORIZED),
            (ToolError::not_found("x"), StatusCode::NOT_FOUND),
            (
                ToolError::from(SearchError::ProviderUnconfigured {
                    provider: ProviderId::Brave,
                    hint: "set BRAVE_API_KEY",
                }),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ToolError::from(SearchError::ProviderTimeout {
                    provider: ProviderId::Brave,
                    timeout: Duration::from_secs(1),
                }),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                ToolError::from(FetchError::InvalidUrl {
                    url: "ftp://x".to_string(),
                    reason: "unsupported scheme".to_string(),
                }),
                StatusCode::BAD_REQUEST,
            ),
            (ToolError::internal("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(ApiError(error).status(), status);
        }
    }
}
