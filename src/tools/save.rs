//! Save tool: write the current document atomically.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::server::{ServerConfig, ToolCallResult, ToolDefinition};
use crate::session::Session;

/// Parameters for the save tool.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaveParams {
    /// Destination; defaults to the source name with `_modified` before the extension.
    pub output_path: Option<String>,
}

pub fn tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "save".to_owned(),
        description: "Write the current document. Without outputPath the file is saved next to \
            the original with `_modified` inserted before the extension."
            .to_owned(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "outputPath": {
                    "type": "string",
                    "description": "Optional destination path"
                }
            }
        }),
    }
}

/// Execute the save tool.
pub fn execute(
    session: &Session,
    config: &ServerConfig,
    arguments: serde_json::Value,
) -> Result<ToolCallResult> {
    let params: SaveParams = if arguments.is_null() {
        SaveParams::default()
    } else {
        serde_json::from_value(arguments).context("invalid save parameters")?
    };

    let output = match params.output_path.as_deref() {
        None => None,
        Some(raw) => match super::validate_path(&config.workspace, raw) {
            Ok(p) => Some(p),
            Err(e) => return Ok(ToolCallResult::error(e)),
        },
    };

    match session.save(output.as_deref()) {
        Ok(path) => Ok(ToolCallResult::text(format!("Saved to {}", path.display()))),
        Err(e) => Ok(ToolCallResult::error(e)),
    }
}
