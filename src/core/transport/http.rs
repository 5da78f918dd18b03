//! HTTP transport implementation.
//!
//! Two surfaces share one dispatcher:
//!
//! - REST tool endpoints (`GET /mcp/tools`, `POST /mcp/{tool}`,
//!   `GET /mcp/health`) with plain JSON bodies and HTTP status codes. These
//!   are stateless and need no `initialize`.
//! - JSON-RPC over `POST {rpc_path}`, with one session state shared by all
//!   clients of this server.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bytes::Bytes;
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use super::{TransportError, TransportResult, config::HttpConfig};
use crate::core::config::is_truthy;
use crate::core::dispatcher::{DispatchError, SessionState, ToolRequest};
use crate::core::McpServer;

/// Request header that forces fallback values for one REST call.
pub const FALLBACK_HEADER: &str = "x-demo-fallback";

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

/// Application state shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// The MCP server instance.
    server: McpServer,
    /// Session state of the JSON-RPC endpoint.
    session: Arc<RwLock<SessionState>>,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Build the router for `server`.
    pub fn router(&self, server: McpServer) -> Router {
        let tool_routes: Vec<(String, &'static str, &'static str)> = server
            .dispatcher()
            .registry()
            .handlers()
            .iter()
            .map(|h| (format!("/mcp/{}", h.name()), h.name(), h.http_method()))
            .collect();

        let state = AppState {
            server,
            session: Arc::new(RwLock::new(SessionState::Uninitialized)),
        };

        let mut app = Router::new()
            .route("/", get(root_handler))
            .route("/mcp/tools", get(tool_catalog))
            .route("/tools", get(tool_catalog))
            .route("/health", get(|state: State<AppState>| rest_get(state, "health")))
            .route(&self.config.rpc_path, post(handle_rpc));

        for (path, name, method) in tool_routes {
            app = match method {
                "GET" => app.route(
                    &path,
                    get(move |state: State<AppState>| rest_get(state, name)),
                ),
                _ => app.route(
                    &path,
                    post(move |state: State<AppState>, headers: HeaderMap, body: Bytes| {
                        rest_post(state, name, headers, body)
                    }),
                ),
            };
        }

        let mut app = app.with_state(state).layer(TraceLayer::new_for_http());

        // Add CORS if enabled
        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            app = app.layer(cors);
        }

        app
    }

    /// Run the HTTP transport.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.address();
        let app = self.router(server);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        let cors_status = if self.config.enable_cors {
            "enabled"
        } else {
            "disabled"
        };
        info!("Ready - listening on {} (CORS {})", addr, cors_status);
        info!("  → Tools:    GET /mcp/tools, POST /mcp/{{tool}}");
        info!("  → Health:   GET /mcp/health");
        info!("  → JSON-RPC: POST {}", self.config.rpc_path);

        axum::serve(listener, app)
            .await
            .map_err(|e| TransportError::http(e.to_string()))?;

        Ok(())
    }
}

/// Root handler - provides API info.
async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "name": state.server.name(),
        "version": state.server.version(),
        "transport": "HTTP",
        "endpoints": {
            "tools": "/mcp/tools",
            "health": "/mcp/health",
            "rpc": "/mcp"
        },
        "protocol": "JSON-RPC 2.0"
    }))
}

/// Tool catalog with REST routing details.
async fn tool_catalog(State(state): State<AppState>) -> impl IntoResponse {
    let tools: Vec<Value> = state
        .server
        .dispatcher()
        .registry()
        .handlers()
        .iter()
        .map(|handler| {
            let tool = handler.descriptor();
            json!({
                "name": tool.name,
                "description": tool.description,
                "method": handler.http_method(),
                "path": format!("/mcp/{}", handler.name()),
                "inputSchema": tool.input_schema.as_ref(),
                "outputSchema": tool.output_schema.as_deref(),
            })
        })
        .collect();

    Json(json!({ "tools": tools }))
}

async fn rest_get(State(state): State<AppState>, name: &'static str) -> Response {
    run_tool(&state, name, Value::Null, false).await
}

async fn rest_post(
    State(state): State<AppState>,
    name: &'static str,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let arguments = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        match serde_json::from_slice::<Value>(&body) {
            Ok(value) => value,
            Err(e) => {
                return detail(StatusCode::BAD_REQUEST, format!("malformed JSON body: {e}"));
            }
        }
    };

    let bypass = headers
        .get(FALLBACK_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(is_truthy);

    run_tool(&state, name, arguments, bypass).await
}

#[instrument(skip(state, arguments))]
async fn run_tool(state: &AppState, name: &str, arguments: Value, bypass_remote: bool) -> Response {
    info!("REST call to {}", name);

    let request = ToolRequest {
        bypass_remote,
        ..ToolRequest::new(name, arguments)
    };

    match state.server.dispatcher().call_tool(request).await.into_result() {
        Ok(output) => (StatusCode::OK, Json(output)).into_response(),
        Err(e) => detail(status_for(&e), e.to_string()),
    }
}

/// HTTP status for a tool failure.
fn status_for(error: &DispatchError) -> StatusCode {
    match error {
        DispatchError::ParseError(_)
        | DispatchError::InvalidRequest(_)
        | DispatchError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        DispatchError::NotFound(_)
        | DispatchError::ToolNotFound(_)
        | DispatchError::MethodNotFound(_) => StatusCode::NOT_FOUND,
        DispatchError::NotInitialized | DispatchError::InternalToolError(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn detail(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

/// Handle JSON-RPC requests.
///
/// Replies are always `200` with a JSON-RPC body; notifications get `202`
/// and no body.
async fn handle_rpc(State(state): State<AppState>, body: String) -> Response {
    let current = *state.session.read().await;
    let (next, reply) = state.server.dispatcher().handle_message(&body, current).await;

    if next != current {
        *state.session.write().await = next;
    }

    match reply {
        Some(response) => (StatusCode::OK, Json(response)).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use axum::body::Body;
    use http::Request;
    use http_body_util::BodyExt;
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn app() -> (TempDir, Router) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.txt"), "alpha\n  beta   gamma").unwrap();
        fs::write(
            dir.path().join("Fake_Invoice_Data.csv"),
            "invoice_number,broker,due_date,amount\nINV1,Acme,2024-01-01,1000\n",
        )
        .unwrap();

        let mut config = Config::default();
        config.resources.base_path = dir.path().to_path_buf();
        config.upstream.weather_base_url = "http://127.0.0.1:9".to_string();
        config.upstream.crypto_base_url = "http://127.0.0.1:9".to_string();
        config.upstream.timeout_secs = 1.0;

        let router = HttpTransport::new(HttpConfig::default()).router(McpServer::new(config));
        (dir, router)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_req(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_tool_catalog() {
        let (_dir, app) = app();
        for uri in ["/mcp/tools", "/tools"] {
            let (status, body) = send(&app, get_req(uri)).await;
            assert_eq!(status, StatusCode::OK);

            let tools = body["tools"].as_array().unwrap();
            let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
            assert_eq!(names, ["weather", "crypto", "file", "health", "invoice_followup"]);
            assert_eq!(tools[3]["method"], "GET");
            assert_eq!(tools[3]["path"], "/mcp/health");
            assert_eq!(tools[0]["method"], "POST");
            assert!(tools[0]["inputSchema"].is_object());
            assert!(tools[0]["outputSchema"].is_object());
        }
    }

    #[tokio::test]
    async fn test_health_routes() {
        let (_dir, app) = app();
        for uri in ["/mcp/health", "/health"] {
            let (status, body) = send(&app, get_req(uri)).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["name"], "mcp-demo");
            assert_eq!(body["status"], "healthy");
            assert!(body["uptime_sec"].as_f64().unwrap() >= 0.0);
        }
    }

    #[tokio::test]
    async fn test_fallback_header() {
        let (_dir, app) = app();
        let mut request = post_req("/mcp/crypto", r#"{"symbol": "BTC"}"#);
        request
            .headers_mut()
            .insert(FALLBACK_HEADER, "TRUE".parse().unwrap());

        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"symbol": "btc", "vs": "usd", "price": 50000.0, "source": "fallback"})
        );
    }

    #[tokio::test]
    async fn test_weather_unreachable_upstream() {
        let (_dir, app) = app();
        let (status, body) = send(&app, post_req("/mcp/weather", r#"{"city": "chicago", "days": 3}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "fallback");
        assert_eq!(body["daily"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let (_dir, app) = app();

        let (status, body) = send(&app, post_req("/mcp/crypto", r#"{"symbol": "doge"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "unsupported symbol: doge");

        let (status, body) = send(&app, post_req("/mcp/crypto", "{nope")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().starts_with("malformed JSON body"));

        let (status, _) = send(&app, post_req("/mcp/file", r#"{"name": "missing.txt"}"#)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, post_req("/mcp/file", r#"{"name": "notes.txt", "max_chars": 0}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_file_and_invoice_routes() {
        let (_dir, app) = app();

        let (status, body) = send(&app, post_req("/mcp/file", r#"{"name": "notes.txt", "max_chars": 10}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"name": "notes.txt", "chars": 10, "text": "alpha beta"}));

        let (status, body) = send(&app, post_req("/mcp/invoice_followup", r#"{"today": "2024-01-22"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["processed"], 1);
        assert_eq!(body["emails"][0]["tier"], 21);
    }

    #[tokio::test]
    async fn test_json_rpc_endpoint() {
        let (_dir, app) = app();
        let call = r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"health"}}"#;

        let (status, body) = send(&app, post_req("/mcp", call)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"]["code"], -32002);

        let (_, body) = send(&app, post_req("/mcp", r#"{"jsonrpc":"2.0","id":0,"method":"initialize"}"#)).await;
        assert_eq!(body["result"]["serverInfo"]["name"], "mcp-demo");

        let (status, body) = send(&app, post_req("/mcp", call)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["isError"], false);

        let (status, body) = send(
            &app,
            post_req("/mcp", r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body, Value::Null);
    }
}
