//! Pieces shared by the HTTP-based transports.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use super::{TransportError, TransportResult};

/// Health check endpoint.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Body of the `/` endpoint.
pub fn server_info(name: &str, version: &str, transport: &str, endpoints: Value) -> Value {
    json!({
        "name": name,
        "version": version,
        "transport": transport,
        "endpoints": endpoints,
    })
}

/// Log method, URI, status and latency of every request.
pub async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;

    info!(
        %method,
        %uri,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "HTTP request"
    );
    response
}

/// Tracing, request logging and optional permissive CORS.
pub fn with_common_layers(router: Router, enable_cors: bool) -> Router {
    let router = router
        .layer(middleware::from_fn(log_request))
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        router.layer(cors)
    } else {
        router
    }
}

/// Bind `address` and serve `router` until Ctrl-C.
pub async fn serve(router: Router, address: &str) -> TransportResult<()> {
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|e| TransportError::bind(address, e))?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| TransportError::http(e.to_string()))
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
