//! Load tool: open a plain-text or `.docx` file into the session.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::server::{ServerConfig, ToolCallResult, ToolDefinition};
use crate::session::{DocumentKind, Session};

/// Parameters for the load tool.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadParams {
    /// Path to the document (relative to workspace or absolute).
    pub file_path: String,
}

pub fn tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "load".to_owned(),
        description: "Load a plain-text or .docx document into the session, replacing any \
            document already loaded. Files over the configured size limit are rejected."
            .to_owned(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "filePath": {
                    "type": "string",
                    "description": "Path to the document to load"
                }
            },
            "required": ["filePath"]
        }),
    }
}

/// Execute the load tool.
pub fn execute(
    session: &mut Session,
    config: &ServerConfig,
    arguments: serde_json::Value,
) -> Result<ToolCallResult> {
    let params: LoadParams =
        serde_json::from_value(arguments).context("invalid load parameters")?;

    let path = match super::validate_path(&config.workspace, &params.file_path) {
        Ok(p) => p,
        Err(e) => return Ok(ToolCallResult::error(e)),
    };

    let document = match session.load(&path, config.max_file_bytes) {
        Ok(d) => d,
        Err(e) => return Ok(ToolCallResult::error(e)),
    };

    let text = match document.logical_text() {
        Ok(t) => t,
        Err(e) => return Ok(ToolCallResult::error(e)),
    };
    let kind = match document.kind() {
        DocumentKind::PlainText => "plain text",
        DocumentKind::WordDocument => "Word document",
    };

    Ok(ToolCallResult::text(format!(
        "Loaded {} ({kind}, {} characters)",
        path.display(),
        text.chars().count()
    )))
}
