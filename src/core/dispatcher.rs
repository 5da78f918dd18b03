//! Protocol dispatcher.
//!
//! The dispatcher owns no session state. Callers pass the current
//! [`SessionState`] in and keep the one handed back, so every transport
//! decides for itself how long a session lives (one stdio process, one TCP
//! connection, one HTTP server).
//!
//! Tool calls are isolated: errors and panics raised inside a tool become
//! error replies and the dispatcher keeps serving.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use rmcp::model::{CallToolResult, Content, Tool};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use super::config::ServerConfig;
use super::protocol::{
    JsonRpcRequest, JsonRpcResponse, PROTOCOL_VERSION, RequestId, error_codes, parse_message,
};
use crate::domains::tools::{ToolContext, ToolError, ToolRegistry};

/// Per-session initialization state. Once initialized, a session stays so.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Uninitialized,
    Initialized,
}

impl SessionState {
    pub fn is_initialized(&self) -> bool {
        matches!(self, Self::Initialized)
    }
}

/// Everything that can go wrong between a raw message and a tool result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid Request: {0}")]
    InvalidRequest(String),

    #[error("Method '{0}' not found")]
    MethodNotFound(String),

    #[error("Tool '{0}' not found")]
    ToolNotFound(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Server not initialized")]
    NotInitialized,

    #[error("{0}")]
    InternalToolError(String),
}

impl DispatchError {
    /// JSON-RPC error code.
    pub fn code(&self) -> i32 {
        match self {
            Self::ParseError(_) => error_codes::PARSE_ERROR,
            Self::InvalidRequest(_) => error_codes::INVALID_REQUEST,
            Self::MethodNotFound(_) | Self::ToolNotFound(_) => error_codes::METHOD_NOT_FOUND,
            Self::InvalidArgument(_) => error_codes::INVALID_PARAMS,
            Self::NotFound(_) => error_codes::RESOURCE_NOT_FOUND,
            Self::NotInitialized => error_codes::NOT_INITIALIZED,
            Self::InternalToolError(_) => error_codes::INTERNAL_TOOL_ERROR,
        }
    }

    /// Snake-case kind carried in the error `data`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ParseError(_) => "parse_error",
            Self::InvalidRequest(_) => "invalid_request",
            Self::MethodNotFound(_) => "method_not_found",
            Self::ToolNotFound(_) => "tool_not_found",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::NotFound(_) => "not_found",
            Self::NotInitialized => "not_initialized",
            Self::InternalToolError(_) => "internal_tool_error",
        }
    }
}

impl From<ToolError> for DispatchError {
    fn from(e: ToolError) -> Self {
        match e {
            ToolError::InvalidArgument(msg) => Self::InvalidArgument(msg),
            ToolError::NotFound(msg) => Self::NotFound(msg),
            ToolError::Internal(msg) => Self::InternalToolError(msg),
        }
    }
}

/// A tool invocation, independent of the transport it arrived on.
#[derive(Debug, Clone)]
pub struct ToolRequest {
    pub name: String,
    pub arguments: Value,
    pub id: Option<RequestId>,
    pub state: SessionState,
    pub bypass_remote: bool,
}

impl ToolRequest {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
            id: None,
            state: SessionState::Initialized,
            bypass_remote: false,
        }
    }
}

/// Outcome of a tool invocation: exactly one of output or error.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResponse {
    Success(Value),
    Failure(DispatchError),
}

impl ToolResponse {
    pub fn into_result(self) -> Result<Value, DispatchError> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure(e) => Err(e),
        }
    }
}

/// Routes protocol methods and tool calls.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    server_name: String,
    server_version: String,
    force_fallback: bool,
}

impl Dispatcher {
    pub fn new(registry: ToolRegistry, server: &ServerConfig, force_fallback: bool) -> Self {
        Self {
            registry: Arc::new(registry),
            server_name: server.name.clone(),
            server_version: server.version.clone(),
            force_fallback,
        }
    }

    /// The tool registry.
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Tool metadata, in registration order.
    pub fn list_tools(&self) -> Vec<Tool> {
        self.registry.list()
    }

    /// Decode and handle one raw message.
    pub async fn handle_message(
        &self,
        raw: &str,
        state: SessionState,
    ) -> (SessionState, Option<JsonRpcResponse>) {
        match parse_message(raw) {
            Ok(request) => self.handle(request, state).await,
            Err(response) => (state, Some(response)),
        }
    }

    /// Handle one decoded request.
    ///
    /// Returns the next session state and the reply, if any. Requests
    /// without an id still take effect but get no reply.
    #[instrument(skip(self, request), fields(method = %request.method))]
    pub async fn handle(
        &self,
        request: JsonRpcRequest,
        state: SessionState,
    ) -> (SessionState, Option<JsonRpcResponse>) {
        let silent = request.is_notification();
        let JsonRpcRequest {
            id, method, params, ..
        } = request;

        let (state, outcome) = match method.as_str() {
            "initialize" => {
                info!("Session initialized");
                (SessionState::Initialized, Ok(self.initialize_result()))
            }
            "tools/list" | "list_tools" => {
                debug!("Listing tools");
                (state, self.tools_list_result())
            }
            "tools/call" | "call_tool" => {
                let outcome = self.tools_call(params, id.clone(), state).await;
                (state, outcome)
            }
            "ping" => (state, Ok(json!({}))),
            m if m.starts_with("notifications/") => {
                if m == "notifications/initialized" {
                    info!("Client sent initialized notification");
                } else {
                    debug!("Ignoring notification: {}", m);
                }
                return (state, None);
            }
            m => {
                warn!("Unknown method: {}", m);
                (state, Err(DispatchError::MethodNotFound(m.to_string())))
            }
        };

        if silent {
            if let Err(e) = outcome {
                debug!("Dropping error for notification {}: {}", method, e);
            }
            return (state, None);
        }

        let response = match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => JsonRpcResponse::error(id, (&e).into()),
        };
        (state, Some(response))
    }

    /// Invoke a tool.
    ///
    /// Requires an initialized session. Failures inside the tool, panics
    /// included, come back as [`ToolResponse::Failure`].
    #[instrument(skip(self, request), fields(tool = %request.name))]
    pub async fn call_tool(&self, request: ToolRequest) -> ToolResponse {
        if !request.state.is_initialized() {
            warn!("Tool call before initialize");
            return ToolResponse::Failure(DispatchError::NotInitialized);
        }

        let Some(handler) = self.registry.resolve(&request.name) else {
            warn!("Unknown tool requested: {}", request.name);
            return ToolResponse::Failure(DispatchError::ToolNotFound(request.name));
        };

        let ctx = ToolContext::new(request.bypass_remote || self.force_fallback);
        let outcome = AssertUnwindSafe(handler.execute(request.arguments, &ctx))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(value)) => {
                debug!("Tool {} succeeded", request.name);
                ToolResponse::Success(value)
            }
            Ok(Err(e)) => {
                match &e {
                    ToolError::Internal(msg) => error!("Tool {} failed: {}", request.name, msg),
                    other => info!("Tool {} rejected call: {}", request.name, other),
                }
                ToolResponse::Failure(e.into())
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!("Tool {} panicked: {}", request.name, message);
                ToolResponse::Failure(DispatchError::InternalToolError(message))
            }
        }
    }

    fn initialize_result(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": self.server_name,
                "version": self.server_version,
            }
        })
    }

    fn tools_list_result(&self) -> Result<Value, DispatchError> {
        let tools = serde_json::to_value(self.list_tools())
            .map_err(|e| DispatchError::InternalToolError(e.to_string()))?;
        Ok(json!({ "tools": tools }))
    }

    async fn tools_call(
        &self,
        params: Option<Value>,
        id: Option<RequestId>,
        state: SessionState,
    ) -> Result<Value, DispatchError> {
        let mut params = match params {
            Some(Value::Object(map)) => map,
            None | Some(Value::Null) => Default::default(),
            Some(_) => {
                return Err(DispatchError::InvalidArgument(
                    "params must be an object".to_string(),
                ));
            }
        };

        let name = match params.remove("name") {
            Some(Value::String(name)) => name,
            _ => {
                return Err(DispatchError::InvalidArgument(
                    "missing tool name".to_string(),
                ));
            }
        };
        let arguments = params.remove("arguments").unwrap_or(Value::Null);

        let request = ToolRequest {
            name,
            arguments,
            id,
            state,
            bypass_remote: self.force_fallback,
        };
        let output = self.call_tool(request).await.into_result()?;

        let text = serde_json::to_string_pretty(&output)
            .map_err(|e| DispatchError::InternalToolError(e.to_string()))?;
        serde_json::to_value(CallToolResult::success(vec![Content::text(text)]))
            .map_err(|e| DispatchError::InternalToolError(e.to_string()))
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        format!("tool panicked: {msg}")
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        format!("tool panicked: {msg}")
    } else {
        "tool panicked".to_string()
    }
}
