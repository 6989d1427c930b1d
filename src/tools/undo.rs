//! Undo tool: restore the state before the last replace.

use anyhow::Result;

use crate::server::{ToolCallResult, ToolDefinition};
use crate::session::Session;

pub fn tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "undo".to_owned(),
        description: "Undo the last replace. Only one step is kept; a new replace discards it."
            .to_owned(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {}
        }),
    }
}

/// Execute the undo tool.
pub fn execute(session: &mut Session) -> Result<ToolCallResult> {
    match session.undo() {
        Ok(()) => Ok(ToolCallResult::text("Undid last replace")),
        Err(e) => Ok(ToolCallResult::error(e)),
    }
}
