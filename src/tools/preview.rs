//! Preview tool: show the current text, or its diff against the loaded state.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::server::{ToolCallResult, ToolDefinition};
use crate::session::Session;

/// Parameters for the preview tool.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreviewParams {
    /// Return a unified diff against the document as loaded.
    pub diff: bool,
}

pub fn tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "preview".to_owned(),
        description: "Show the loaded document's current text (one line per paragraph for \
            Word documents), or a diff against the document as loaded."
            .to_owned(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "diff": {
                    "type": "boolean",
                    "description": "Return a unified diff instead of the text (default: false)",
                    "default": false
                }
            }
        }),
    }
}

/// Execute the preview tool.
pub fn execute(session: &Session, arguments: serde_json::Value) -> Result<ToolCallResult> {
    let params: PreviewParams = if arguments.is_null() {
        PreviewParams::default()
    } else {
        serde_json::from_value(arguments).context("invalid preview parameters")?
    };

    let rendered = if params.diff {
        session.diff()
    } else {
        session.document().and_then(|d| d.display_text())
    };

    match rendered {
        Ok(text) => Ok(ToolCallResult::text(text)),
        Err(e) => Ok(ToolCallResult::error(e)),
    }
}
