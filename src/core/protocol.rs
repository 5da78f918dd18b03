//! JSON-RPC 2.0 message types for the line-delimited and HTTP protocols.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::dispatcher::DispatchError;

/// JSON-RPC version string.
pub const JSONRPC_VERSION: &str = "2.0";

/// MCP protocol version reported by `initialize`.
pub const PROTOCOL_VERSION: &str = "2025-06-18";

/// Error codes carried in JSON-RPC error objects.
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_TOOL_ERROR: i32 = -32000;
    pub const RESOURCE_NOT_FOUND: i32 = -32001;
    pub const NOT_INITIALIZED: i32 = -32002;
}

/// Request ID (can be string or number).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

/// JSON-RPC 2.0 request or notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Defaults to `"2.0"` when the sender leaves it out.
    #[serde(default = "default_jsonrpc")]
    pub jsonrpc: String,
    /// Absent (or `null`) for notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

fn default_jsonrpc() -> String {
    JSONRPC_VERSION.to_string()
}

impl JsonRpcRequest {
    pub fn new(id: Option<RequestId>, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }

    /// Whether the sender expects no reply.
    pub fn is_notification(&self) -> bool {
        self.id.is_none() || self.method.starts_with("notifications/")
    }
}

/// JSON-RPC 2.0 response. Exactly one of `result` and `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    /// `null` when the request id could not be determined.
    pub id: Option<RequestId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Option<RequestId>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Option<RequestId>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = self.code;
        let message = &self.message;
        write!(f, "[{code}] {message}")
    }
}

impl From<&DispatchError> for JsonRpcError {
    fn from(e: &DispatchError) -> Self {
        Self {
            code: e.code(),
            message: e.to_string(),
            data: Some(serde_json::json!({ "kind": e.kind() })),
        }
    }
}

/// Decode one raw message.
///
/// On failure the error is already shaped as the reply to send: `-32700`
/// with a `null` id for bad JSON, `-32600` for JSON that is not a request
/// object (echoing its id when one can be recovered).
pub fn parse_message(raw: &str) -> Result<JsonRpcRequest, JsonRpcResponse> {
    let value: Value = serde_json::from_str(raw).map_err(|e| {
        debug!("Unparseable message: {}", e);
        JsonRpcResponse::error(None, (&DispatchError::ParseError(e.to_string())).into())
    })?;

    let id = value
        .get("id")
        .and_then(|id| RequestId::deserialize(id).ok());

    let reason = match serde_json::from_value::<JsonRpcRequest>(value) {
        Ok(request) if request.jsonrpc == JSONRPC_VERSION => return Ok(request),
        Ok(request) => format!("unsupported jsonrpc version: {}", request.jsonrpc),
        Err(e) => e.to_string(),
    };

    debug!("Invalid request: {}", reason);
    Err(JsonRpcResponse::error(
        id,
        (&DispatchError::InvalidRequest(reason)).into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_request() {
        let request =
            parse_message(r#"{"jsonrpc":"2.0","id":7,"method":"ping","params":{}}"#).unwrap();
        assert_eq!(request.id, Some(RequestId::Number(7)));
        assert_eq!(request.method, "ping");
        assert!(!request.is_notification());
    }

    #[test]
    fn test_parse_notification() {
        let request = parse_message(r#"{"jsonrpc":"2.0","method":"tools/list"}"#).unwrap();
        assert!(request.id.is_none());
        assert!(request.is_notification());

        let request =
            parse_message(r#"{"jsonrpc":"2.0","id":null,"method":"tools/list"}"#).unwrap();
        assert!(request.is_notification());
    }

    #[test]
    fn test_missing_version_is_accepted() {
        let request = parse_message(r#"{"id":4,"method":"tools/list"}"#).unwrap();
        assert_eq!(request.jsonrpc, JSONRPC_VERSION);
        assert_eq!(request.id, Some(RequestId::Number(4)));
    }

    #[test]
    fn test_parse_error_has_null_id() {
        let response = parse_message("{not json").unwrap_err();
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["id"], Value::Null);
        assert_eq!(value["error"]["code"], error_codes::PARSE_ERROR);
        assert_eq!(value["error"]["data"]["kind"], "parse_error");
    }

    #[test]
    fn test_invalid_request() {
        for raw in [r#"[1,2]"#, r#"{"jsonrpc":"2.0","id":"a"}"#, r#"{"jsonrpc":"1.0","id":"a","method":"ping"}"#] {
            let response = parse_message(raw).unwrap_err();
            assert_eq!(
                response.error.as_ref().map(|e| e.code),
                Some(error_codes::INVALID_REQUEST)
            );
        }

        let response = parse_message(r#"{"jsonrpc":"2.0","id":"a","method":5}"#).unwrap_err();
        assert_eq!(response.id, Some(RequestId::from("a")));
    }

    #[test]
    fn test_response_serialization() {
        let response = JsonRpcResponse::success(Some(1.into()), json!({}));
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"jsonrpc": "2.0", "id": 1, "result": {}})
        );
    }
}
