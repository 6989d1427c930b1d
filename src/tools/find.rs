//! Find tool: count and locate matches without changing the document.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::engine::ReplacementOptions;
use crate::server::{ToolCallResult, ToolDefinition};
use crate::session::Session;

/// Parameters for the find tool.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindParams {
    /// Text or pattern to look for.
    pub find: String,
    #[serde(flatten)]
    pub options: ReplacementOptions,
    /// Maximum number of matches (and fragment hits) listed. Default: 200.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

const fn default_max_results() -> usize {
    200
}

pub fn tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "find".to_owned(),
        description: "Count and list matches in the loaded document. Word documents are \
            searched paragraph by paragraph and also report per-run hits for highlighting."
            .to_owned(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "find": {
                    "type": "string",
                    "description": "Text (or regex when isRegex) to find"
                },
                "caseSensitive": {
                    "type": "boolean",
                    "description": "Match case exactly (default: false)",
                    "default": false
                },
                "wholeWord": {
                    "type": "boolean",
                    "description": "Only match whole words (default: false)",
                    "default": false
                },
                "isRegex": {
                    "type": "boolean",
                    "description": "Treat find as a regular expression (default: false)",
                    "default": false
                },
                "maxResults": {
                    "type": "integer",
                    "description": "Maximum matches listed (default: 200)",
                    "default": 200,
                    "minimum": 0
                }
            },
            "required": ["find"]
        }),
    }
}

/// Execute the find tool.
pub fn execute(session: &Session, arguments: serde_json::Value) -> Result<ToolCallResult> {
    let params: FindParams =
        serde_json::from_value(arguments).context("invalid find parameters")?;

    let mut report = match session.find(&params.find, &params.options) {
        Ok(r) => r,
        Err(e) => return Ok(ToolCallResult::error(e)),
    };
    report.matches.truncate(params.max_results);
    report.hits.truncate(params.max_results);

    let json = serde_json::to_string_pretty(&report).context("failed to serialize find report")?;
    Ok(ToolCallResult::text(json))
}
