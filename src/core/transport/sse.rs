//! Server-sent events transport implementation.
//!
//! `GET /sse` opens a stream whose first event names the POST endpoint for
//! that session. Requests posted there are answered with `202 Accepted` and
//! their responses are delivered on the stream as `message` events.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info, instrument, warn};

use super::common::{health_check, serve, server_info, with_common_layers};
use super::jsonrpc::{JsonRpcResponse, parse_request, process_request};
use super::{TransportConfig, TransportResult};
use crate::core::McpServer;
use crate::core::security::bearer_credential;

pub const SSE_PATH: &str = "/sse";
pub const MESSAGES_PATH: &str = "/messages";

const CHANNEL_CAPACITY: usize = 64;

type Sessions = Arc<RwLock<HashMap<String, mpsc::Sender<JsonRpcResponse>>>>;

/// SSE transport handler.
pub struct SseTransport {
    config: TransportConfig,
}

#[derive(Clone)]
struct AppState {
    server: McpServer,
    sessions: Sessions,
}

#[derive(Debug, Deserialize)]
struct SessionQuery {
    session_id: String,
}

impl SseTransport {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }

    /// Full application router, layers included.
    pub fn router(&self, server: McpServer) -> Router {
        let info = server_info(
            server.name(),
            server.version(),
            "sse",
            json!({
                "sse": SSE_PATH,
                "messages": MESSAGES_PATH,
                "health": "/health"
            }),
        );
        let state = AppState {
            server,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        };

        let app = Router::new()
            .route(SSE_PATH, get(open_stream))
            .route(MESSAGES_PATH, post(handle_message))
            .route("/health", get(health_check))
            .route("/", get(move || async move { Json(info) }))
            .with_state(state);
        with_common_layers(app, self.config.enable_cors)
    }

    /// Run the SSE transport.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.config.address();
        let app = self.router(server);

        info!("Ready - listening on {} (MCP SSE)", addr);
        info!("  → Stream:   GET {}", SSE_PATH);
        info!("  → Messages: POST {}?session_id=<id>", MESSAGES_PATH);

        serve(app, &addr).await
    }
}

/// Open an event stream and register its session.
async fn open_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let session_id = uuid::Uuid::new_v4().to_string();
    let (tx, rx) = mpsc::channel::<JsonRpcResponse>(CHANNEL_CAPACITY);

    {
        let mut sessions = state.sessions.write().await;
        sessions.retain(|_, sender| !sender.is_closed());
        sessions.insert(session_id.clone(), tx);
    }
    info!("SSE session opened: {}", session_id);

    let endpoint = Event::default()
        .event("endpoint")
        .data(format!("{}?session_id={}", MESSAGES_PATH, session_id));

    let messages = stream::unfold(rx, |mut rx| async move {
        let response = rx.recv().await?;
        let event = match Event::default().event("message").json_data(&response) {
            Ok(event) => event,
            Err(e) => {
                warn!("Failed to encode SSE message: {}", e);
                Event::default().event("message").data("{}")
            }
        };
        Some((Ok::<_, Infallible>(event), rx))
    });

    Sse::new(stream::once(async move { Ok::<_, Infallible>(endpoint) }).chain(messages))
        .keep_alive(KeepAlive::default())
}

/// Accept a JSON-RPC message for an open session.
#[instrument(skip_all, fields(session_id = %query.session_id))]
async fn handle_message(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(sender) = state.sessions.read().await.get(&query.session_id).cloned() else {
        warn!("Unknown SSE session");
        return StatusCode::NOT_FOUND.into_response();
    };

    let request = match parse_request(&body) {
        Ok(request) => request,
        Err(response) => return (StatusCode::BAD_REQUEST, Json(response)).into_response(),
    };

    let credential = bearer_credential(&headers);
    if let Some(response) = process_request(&state.server, credential, request).await {
        if sender.send(response).await.is_err() {
            debug!("SSE stream closed before response was delivered");
            state.sessions.write().await.remove(&query.session_id);
            return StatusCode::GONE.into_response();
        }
    }
    StatusCode::ACCEPTED.into_response()
}
