//! Streamable HTTP transport implementation.
//!
//! JSON-RPC over `POST <rpc_path>`, answered with `application/json`.
//! `initialize` opens a session identified by the `Mcp-Session-Id` header.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use super::common::{health_check, serve, server_info, with_common_layers};
use super::jsonrpc::{parse_request, process_request};
use super::{TransportConfig, TransportResult};
use crate::core::McpServer;
use crate::core::security::bearer_credential;

pub const SESSION_HEADER: &str = "mcp-session-id";

/// Sessions idle for longer than this are forgotten.
const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Upper bound on live sessions; the least recently used one is evicted.
const MAX_SESSIONS: usize = 1024;

/// Open sessions and when each was last used.
#[derive(Debug)]
struct SessionStore {
    last_seen: HashMap<String, Instant>,
    idle_timeout: Duration,
    capacity: usize,
}

impl SessionStore {
    fn new(idle_timeout: Duration, capacity: usize) -> Self {
        Self {
            last_seen: HashMap::new(),
            idle_timeout,
            capacity,
        }
    }

    /// Register a new session, pruning idle ones and evicting past capacity.
    fn open(&mut self, id: String) {
        let now = Instant::now();
        let idle_timeout = self.idle_timeout;
        self.last_seen
            .retain(|_, seen| now.duration_since(*seen) < idle_timeout);

        while self.last_seen.len() >= self.capacity.max(1) {
            let oldest = self
                .last_seen
                .iter()
                .min_by_key(|(_, seen)| **seen)
                .map(|(id, _)| id.clone());
            match oldest {
                Some(oldest) => {
                    self.last_seen.remove(&oldest);
                }
                None => break,
            }
        }
        self.last_seen.insert(id, now);
    }

    /// Mark a session as used. False when it is unknown or has expired.
    fn touch(&mut self, id: &str) -> bool {
        let now = Instant::now();
        match self.last_seen.get_mut(id) {
            Some(seen) if now.duration_since(*seen) < self.idle_timeout => {
                *seen = now;
                true
            }
            Some(_) => {
                self.last_seen.remove(id);
                false
            }
            None => false,
        }
    }

    fn close(&mut self, id: &str) -> bool {
        self.last_seen.remove(id).is_some()
    }

    fn len(&self) -> usize {
        self.last_seen.len()
    }
}

/// Streamable HTTP transport handler.
pub struct HttpTransport {
    config: TransportConfig,
}

/// Application state shared across HTTP handlers.
#[derive(Clone)]
struct AppState {
    server: McpServer,
    sessions: Arc<RwLock<SessionStore>>,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }

    /// Full application router, layers included.
    pub fn router(&self, server: McpServer) -> Router {
        let info = server_info(
            server.name(),
            server.version(),
            "streamable-http",
            json!({
                "rpc": self.config.rpc_path,
                "health": "/health"
            }),
        );
        let state = AppState {
            server,
            sessions: Arc::new(RwLock::new(SessionStore::new(
                SESSION_IDLE_TIMEOUT,
                MAX_SESSIONS,
            ))),
        };

        let app = Router::new()
            .route(
                &self.config.rpc_path,
                get(method_not_allowed).post(handle_rpc).delete(end_session),
            )
            .route("/health", get(health_check))
            .route("/", get(move || async move { Json(info) }))
            .with_state(state);
        with_common_layers(app, self.config.enable_cors)
    }

    /// Run the HTTP transport.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.config.address();
        let app = self.router(server);

        info!("Ready - listening on {} (MCP streamable-http)", addr);
        info!("  → JSON-RPC: POST {}", self.config.rpc_path);
        info!("  → Health:   GET /health");

        serve(app, &addr).await
    }
}

async fn method_not_allowed() -> StatusCode {
    StatusCode::METHOD_NOT_ALLOWED
}

fn session_id(headers: &HeaderMap) -> Option<&str> {
    headers.get(SESSION_HEADER)?.to_str().ok()
}

/// Handle JSON-RPC requests.
#[instrument(skip_all)]
async fn handle_rpc(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let request = match parse_request(&body) {
        Ok(request) => request,
        Err(response) => return (StatusCode::BAD_REQUEST, Json(response)).into_response(),
    };

    let initializing = request.method == "initialize";
    if !initializing {
        if let Some(id) = session_id(&headers) {
            if !state.sessions.write().await.touch(id) {
                warn!("Unknown session: {}", id);
                return StatusCode::NOT_FOUND.into_response();
            }
        }
    }

    let credential = bearer_credential(&headers);
    let Some(response) = process_request(&state.server, credential, request).await else {
        return StatusCode::ACCEPTED.into_response();
    };

    let mut http_response = (StatusCode::OK, Json(&response)).into_response();
    if initializing && response.error.is_none() {
        let id = uuid::Uuid::new_v4().to_string();
        if let Ok(value) = HeaderValue::from_str(&id) {
            http_response.headers_mut().insert(SESSION_HEADER, value);
        }
        let mut sessions = state.sessions.write().await;
        sessions.open(id);
        debug!(sessions = sessions.len(), "Session opened");
    }
    http_response
}

async fn end_session(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    match session_id(&headers) {
        Some(id) if state.sessions.write().await.close(id) => {
            info!("Session closed: {}", id);
            StatusCode::NO_CONTENT
        }
        Some(_) => StatusCode::NOT_FOUND,
        None => StatusCode::BAD_REQUEST,
    }
}
