//! Close tool: discard the loaded document and its undo snapshot.

use anyhow::Result;

use crate::server::{ToolCallResult, ToolDefinition};
use crate::session::Session;

pub fn tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "close".to_owned(),
        description: "Discard the loaded document, including unsaved changes and undo history."
            .to_owned(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {}
        }),
    }
}

/// Execute the close tool.
pub fn execute(session: &mut Session) -> Result<ToolCallResult> {
    if session.close() {
        Ok(ToolCallResult::text("Document closed"))
    } else {
        Ok(ToolCallResult::text("No document loaded"))
    }
}
