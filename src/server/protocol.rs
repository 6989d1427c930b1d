//! JSON-RPC 2.0 envelopes and the MCP payloads carried inside them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

pub const JSONRPC_VERSION: &str = "2.0";

/// MCP revision announced in the `initialize` result.
pub const PROTOCOL_VERSION: &str = "2025-06-18";

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

/// JSON-RPC 2.0 request. A request without `id` is a notification.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl JsonRpcRequest {
    pub const fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// JSON-RPC 2.0 response: exactly one of `result` and `error` is set.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Response to request `id` carrying a handler outcome.
    pub fn new(id: Option<Value>, outcome: Result<Value, JsonRpcError>) -> Self {
        let (result, error) = match outcome {
            Ok(value) => (Some(value), None),
            Err(err) => (None, Some(err)),
        };
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            id,
            result,
            error,
        }
    }

    /// Parse-error response for input that never became a request.
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(None, Err(JsonRpcError::new(PARSE_ERROR, message)))
    }
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

/// Serialize a handler result, turning failure into an internal error.
pub fn to_result(value: &impl Serialize) -> Result<Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| {
        error!(error = %e, "failed to serialize result");
        JsonRpcError::new(INTERNAL_ERROR, format!("failed to serialize result: {e}"))
    })
}

/// One entry of `tools/list`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// `tools/list` result.
#[derive(Debug, Serialize)]
pub struct ToolList {
    pub tools: Vec<ToolDefinition>,
}

/// `tools/call` params.
#[derive(Debug, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Debug, Serialize)]
pub struct ContentItem {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

/// `tools/call` result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    pub content: Vec<ContentItem>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolCallResult {
    fn single(text: String, is_error: bool) -> Self {
        Self {
            content: vec![ContentItem {
                content_type: "text".to_owned(),
                text,
            }],
            is_error,
        }
    }

    /// Successful result with a single text item.
    pub fn text(text: impl Into<String>) -> Self {
        Self::single(text.into(), false)
    }

    /// Error result shown to the client; the session carries on.
    pub fn error(message: impl std::fmt::Display) -> Self {
        Self::single(format!("Error: {message}"), true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_carries_result_or_error() {
        let ok = JsonRpcResponse::new(Some(Value::from(1)), Ok(Value::from("pong")));
        let json = serde_json::to_value(&ok).expect("serialize");
        assert_eq!(json["result"], "pong");
        assert!(json.get("error").is_none());

        let err = JsonRpcResponse::parse_error("bad line");
        let json = serde_json::to_value(&err).expect("serialize");
        assert_eq!(json["error"]["code"], PARSE_ERROR);
        assert!(json.get("id").is_none());
        assert!(json.get("result").is_none());
    }

    #[test]
    fn test_tool_call_result_flags_errors_only() {
        let ok = serde_json::to_value(ToolCallResult::text("done")).expect("serialize");
        assert_eq!(ok["content"][0]["type"], "text");
        assert!(ok.get("isError").is_none());

        let err = serde_json::to_value(ToolCallResult::error("nothing to undo")).expect("serialize");
        assert_eq!(err["isError"], true);
        assert_eq!(err["content"][0]["text"], "Error: nothing to undo");
    }
}
