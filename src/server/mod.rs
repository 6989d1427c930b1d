//! MCP server: newline-delimited JSON-RPC 2.0 over stdio.
//!
//! [`serve`] reads one request per line, hands it to the [`ToolRouter`], and
//! writes one response line back. Requests run one at a time against the
//! single session, so replace, undo and load never interleave. A line that
//! is too long, not UTF-8, or not JSON gets a parse-error response and the
//! loop moves on with the session intact; only a failing stream ends it.
//!
//! Protocol flow:
//! 1. Client sends `initialize` and the server responds with capabilities
//! 2. Client sends `notifications/initialized`
//! 3. Client sends `tools/list` and gets the tool definitions
//! 4. Client sends `tools/call` (`load`, `find`, `replace`, `undo`, `save`...)
//! 5. Client closes stdin and the server exits

mod framing;
pub mod protocol;

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize as _;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::tools::ToolRouter;
use framing::Frame;
use protocol::{
    INVALID_PARAMS, INVALID_REQUEST, JSONRPC_VERSION, METHOD_NOT_FOUND, PROTOCOL_VERSION,
    ToolCallParams, ToolList,
};

pub use protocol::{
    ContentItem, JsonRpcError, JsonRpcRequest, JsonRpcResponse, ToolCallResult, ToolDefinition,
};

/// Longest request line accepted (10 MiB).
pub const MAX_LINE_BYTES: usize = 10 * 1024 * 1024;

/// Default upper bound for loaded documents (50 MiB).
pub const DEFAULT_MAX_FILE_BYTES: u64 = 50 * 1024 * 1024;

/// Configuration for the MCP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directory that loaded and saved documents must stay within.
    pub workspace: PathBuf,
    /// Files larger than this are rejected before loading.
    pub max_file_bytes: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            workspace: PathBuf::from("."),
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}

/// Run the MCP server on stdin/stdout until stdin closes.
///
/// # Errors
///
/// Returns an error if reading stdin or writing stdout fails.
pub fn run_mcp_server(config: ServerConfig) -> Result<()> {
    info!(
        workspace = %config.workspace.display(),
        max_file_bytes = config.max_file_bytes,
        "oa-replace MCP server starting"
    );

    let mut router = ToolRouter::new(config);
    let stdin = std::io::stdin();
    serve(stdin.lock(), std::io::stdout().lock(), &mut router)?;

    info!("oa-replace MCP server stopped");
    Ok(())
}

/// Answer requests from `reader` on `writer` until `reader` is exhausted.
///
/// # Errors
///
/// Returns an error only if either stream fails. Bad request lines are
/// answered with JSON-RPC errors.
pub fn serve(reader: impl BufRead, writer: impl Write, router: &mut ToolRouter) -> Result<()> {
    serve_with_limit(reader, writer, router, MAX_LINE_BYTES)
}

fn serve_with_limit(
    mut reader: impl BufRead,
    mut writer: impl Write,
    router: &mut ToolRouter,
    max_line_bytes: usize,
) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        let frame = framing::read_frame(&mut reader, &mut buf, max_line_bytes)
            .context("failed to read request")?;

        let response = match frame {
            Frame::Eof => {
                info!("input closed, shutting down");
                return Ok(());
            }
            Frame::Oversized { len } => {
                warn!(len, limit = max_line_bytes, "request line too long, skipped");
                Some(JsonRpcResponse::parse_error(format!(
                    "request line of {len} bytes exceeds the {max_line_bytes} byte limit"
                )))
            }
            Frame::NotUtf8 { valid_up_to } => {
                warn!(valid_up_to, "request line is not UTF-8, skipped");
                Some(JsonRpcResponse::parse_error(format!(
                    "request is not valid UTF-8 (at byte {valid_up_to})"
                )))
            }
            Frame::Line(line) => handle_line(router, &line),
        };

        if let Some(response) = response {
            write_response(&mut writer, &response)?;
        }
    }
}

/// Answer one request line; `None` for blank lines and notifications.
fn handle_line(router: &mut ToolRouter, line: &str) -> Option<JsonRpcResponse> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    debug!(raw = line, "received request");

    let request: JsonRpcRequest = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "invalid JSON-RPC request");
            return Some(JsonRpcResponse::parse_error(format!("parse error: {e}")));
        }
    };

    let outcome = if request.jsonrpc == JSONRPC_VERSION {
        dispatch(router, &request)
    } else {
        warn!(version = request.jsonrpc, "rejecting request with wrong jsonrpc version");
        Err(JsonRpcError::new(
            INVALID_REQUEST,
            format!("jsonrpc must be \"2.0\", got \"{}\"", request.jsonrpc),
        ))
    };

    if request.is_notification() {
        debug!(method = request.method, "notification handled (no response)");
        return None;
    }
    Some(JsonRpcResponse::new(request.id, outcome))
}

fn dispatch(router: &mut ToolRouter, request: &JsonRpcRequest) -> Result<Value, JsonRpcError> {
    match request.method.as_str() {
        "initialize" => Ok(initialize_result()),
        "notifications/initialized" => {
            info!("client initialized");
            Ok(Value::Null)
        }
        "ping" => Ok(Value::Object(serde_json::Map::new())),
        "tools/list" => protocol::to_result(&ToolList {
            tools: router.list_tools(),
        }),
        "tools/call" => call_tool(router, &request.params),
        other => {
            warn!(method = other, "unknown method");
            Err(JsonRpcError::new(
                METHOD_NOT_FOUND,
                format!("method not found: {other}"),
            ))
        }
    }
}

fn initialize_result() -> Value {
    serde_json::json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": { "tools": { "listChanged": false } },
        "serverInfo": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        },
    })
}

fn call_tool(router: &mut ToolRouter, params: &Value) -> Result<Value, JsonRpcError> {
    let params = ToolCallParams::deserialize(params).map_err(|e| {
        JsonRpcError::new(INVALID_PARAMS, format!("invalid tools/call params: {e}"))
    })?;

    let result = router
        .call_tool(&params.name, params.arguments)
        .unwrap_or_else(|e| {
            error!(tool = params.name, error = %e, "tool call failed");
            ToolCallResult::error(format!("{e:#}"))
        });
    protocol::to_result(&result)
}

fn write_response(out: &mut impl Write, response: &JsonRpcResponse) -> Result<()> {
    let mut line = serde_json::to_vec(response).context("failed to serialize response")?;
    line.push(b'\n');
    debug!(bytes = line.len(), "sending response");
    out.write_all(&line).context("failed to write response")?;
    out.flush().context("failed to flush response")
}
