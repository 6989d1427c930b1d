//! Reset tool: return to the document as it was loaded.

use anyhow::Result;

use crate::server::{ToolCallResult, ToolDefinition};
use crate::session::Session;

pub fn tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "reset".to_owned(),
        description: "Discard every replace since load and clear the undo step.".to_owned(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {}
        }),
    }
}

/// Execute the reset tool.
pub fn execute(session: &mut Session) -> Result<ToolCallResult> {
    match session.reset() {
        Ok(()) => Ok(ToolCallResult::text("Document reset to its loaded state")),
        Err(e) => Ok(ToolCallResult::error(e)),
    }
}
