//! MCP surfaces against the same dispatcher as REST.

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chrono::DateTime;
use futures::StreamExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use tool_hub_server::McpServer;
use tool_hub_server::core::config::{AuthConfig, Config};
use tool_hub_server::core::transport::http::{HttpTransport, SESSION_HEADER};
use tool_hub_server::core::transport::jsonrpc::{JsonRpcRequest, process_request};
use tool_hub_server::core::transport::rest::RestTransport;
use tool_hub_server::core::transport::sse::SseTransport;
use tool_hub_server::core::transport::{McpTransport, TransportConfig};

fn server(token: Option<&str>) -> McpServer {
    let config = Config {
        auth: AuthConfig {
            token: token.map(String::from),
        },
        ..Default::default()
    };
    McpServer::from_config(Arc::new(config)).unwrap()
}

fn rpc(id: i64, method: &str, params: Value) -> JsonRpcRequest {
    JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        id: Some(json!(id)),
        method: method.to_string(),
        params: Some(params),
    }
}

fn http_app(server: McpServer) -> Router {
    HttpTransport::new(TransportConfig::mcp(McpTransport::StreamableHttp, "127.0.0.1", 0))
        .router(server)
}

fn rpc_post(path: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

#[tokio::test]
async fn test_tools_list_matches_rest_routes() {
    let server = server(None);
    let tools = process_request(&server, None, rpc(1, "tools/list", json!({})))
        .await
        .unwrap()
        .result
        .unwrap();
    let mut names: Vec<String> = tools["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap().to_string())
        .collect();
    let mut routes: Vec<String> = server
        .route_synthesizer()
        .routes()
        .into_iter()
        .map(|r| r.tool_name)
        .collect();
    names.sort();
    routes.sort();
    assert_eq!(names, routes);
}

#[tokio::test]
async fn test_tools_call_returns_structured_content() {
    let server = server(None);
    let response = process_request(
        &server,
        None,
        rpc(2, "tools/call", json!({ "name": "calc_evaluate", "arguments": { "expression": "2 + 2 * 3" } })),
    )
    .await
    .unwrap();
    let result = response.result.unwrap();
    assert_eq!(result["structuredContent"], json!({ "result": 8 }));
    assert_eq!(result["isError"], json!(false));
}

#[tokio::test]
async fn test_tool_failures_and_protocol_errors() {
    let server = server(None);

    let response = process_request(
        &server,
        None,
        rpc(3, "tools/call", json!({ "name": "web_search_searxng", "arguments": { "query": "rust" } })),
    )
    .await
    .unwrap();
    assert_eq!(response.result.unwrap()["isError"], json!(true));

    let response = process_request(
        &server,
        None,
        rpc(4, "tools/call", json!({ "name": "calc_evaluate", "arguments": {} })),
    )
    .await
    .unwrap();
    assert_eq!(response.error.unwrap().code, -32602);

    let response = process_request(&server, None, rpc(5, "resources/list", json!({})))
        .await
        .unwrap();
    assert_eq!(response.error.unwrap().code, -32601);
}

#[tokio::test]
async fn test_unauthorized_call_is_32001() {
    let server = server(Some("secret"));
    let call = || rpc(6, "tools/call", json!({ "name": "time_now", "arguments": {} }));

    let response = process_request(&server, None, call()).await.unwrap();
    assert_eq!(response.error.unwrap().code, -32001);

    let response = process_request(&server, Some("secret"), call()).await.unwrap();
    assert!(response.error.is_none());
}

#[tokio::test]
async fn test_time_now_parity_between_surfaces() {
    let server = server(None);

    let mcp = process_request(
        &server,
        None,
        rpc(7, "tools/call", json!({ "name": "time_now", "arguments": {} })),
    )
    .await
    .unwrap()
    .result
    .unwrap();
    let mcp_time = mcp["structuredContent"]["current_time"].as_str().unwrap().to_string();

    let app = RestTransport::new(TransportConfig::default()).router(&server);
    let response = app.oneshot(rpc_post("/time/now", json!({}))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let rest = json_body(response).await;
    let rest_time = rest["current_time"].as_str().unwrap();

    let a = DateTime::parse_from_rfc3339(&mcp_time).unwrap();
    let b = DateTime::parse_from_rfc3339(rest_time).unwrap();
    assert!((b - a).num_seconds().abs() <= 2);
}

#[tokio::test]
async fn test_streamable_http_sessions() {
    let app = http_app(server(None));

    let response = app
        .clone()
        .oneshot(rpc_post(
            "/mcp",
            json!({ "jsonrpc": "2.0", "id": 1, "method": "initialize",
                    "params": { "protocolVersion": "2025-03-26" } }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let session = response
        .headers()
        .get(SESSION_HEADER)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let body = json_body(response).await;
    assert_eq!(body["result"]["protocolVersion"], "2025-03-26");

    let notification = app
        .clone()
        .oneshot(rpc_post(
            "/mcp",
            json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }),
        ))
        .await
        .unwrap();
    assert_eq!(notification.status(), StatusCode::ACCEPTED);

    let mut request = rpc_post("/mcp", json!({ "jsonrpc": "2.0", "id": 2, "method": "ping" }));
    request
        .headers_mut()
        .insert(SESSION_HEADER, session.parse().unwrap());
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let mut request = rpc_post("/mcp", json!({ "jsonrpc": "2.0", "id": 3, "method": "ping" }));
    request
        .headers_mut()
        .insert(SESSION_HEADER, "unknown".parse().unwrap());
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(Request::builder().uri("/mcp").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_streamable_http_reads_bearer_header() {
    let app = http_app(server(Some("secret")));
    let call = json!({ "jsonrpc": "2.0", "id": 1, "method": "tools/call",
                       "params": { "name": "calc_evaluate", "arguments": { "expression": "1+1" } } });

    let response = app.clone().oneshot(rpc_post("/mcp", call.clone())).await.unwrap();
    assert_eq!(json_body(response).await["error"]["code"], -32001);

    let mut request = rpc_post("/mcp", call);
    request
        .headers_mut()
        .insert(header::AUTHORIZATION, "Bearer secret".parse().unwrap());
    let response = app.oneshot(request).await.unwrap();
    let body = json_body(response).await;
    assert_eq!(body["result"]["structuredContent"]["result"], 2);
}

#[tokio::test]
async fn test_sse_round_trip() {
    let app = SseTransport::new(TransportConfig::mcp(McpTransport::Sse, "127.0.0.1", 0))
        .router(server(None));

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/sse").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let mut stream = response.into_body().into_data_stream();

    let first = stream.next().await.unwrap().unwrap();
    let first = String::from_utf8(first.to_vec()).unwrap();
    assert!(first.contains("event: endpoint"));
    let endpoint = first
        .lines()
        .find_map(|l| l.strip_prefix("data: "))
        .unwrap()
        .to_string();
    assert!(endpoint.starts_with("/messages?session_id="));

    let accepted = app
        .clone()
        .oneshot(rpc_post(
            &endpoint,
            json!({ "jsonrpc": "2.0", "id": 9, "method": "tools/call",
                    "params": { "name": "calc_evaluate", "arguments": { "expression": "3*3" } } }),
        ))
        .await
        .unwrap();
    assert_eq!(accepted.status(), StatusCode::ACCEPTED);

    let message = stream.next().await.unwrap().unwrap();
    let message = String::from_utf8(message.to_vec()).unwrap();
    assert!(message.contains("event: message"));
    let data = message
        .lines()
        .find_map(|l| l.strip_prefix("data: "))
        .unwrap();
    let payload: Value = serde_json::from_str(data).unwrap();
    assert_eq!(payload["id"], 9);
    assert_eq!(payload["result"]["structuredContent"]["result"], 9);

    let unknown = app
        .oneshot(rpc_post(
            "/messages?session_id=nope",
            json!({ "jsonrpc": "2.0", "id": 1, "method": "ping" }),
        ))
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}
