//! Replace tool: apply an ordered list of find/replace pairs.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::engine::{ReplacementOptions, ReplacementPair};
use crate::server::{ToolCallResult, ToolDefinition};
use crate::session::Session;

/// Parameters for the replace tool.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceParams {
    /// Pairs applied in order; each sees the previous pair's output.
    pub pairs: Vec<ReplacementPair>,
    #[serde(flatten)]
    pub options: ReplacementOptions,
}

pub fn tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "replace".to_owned(),
        description: "Apply find/replace pairs, in order, to the loaded document. Pairs with an \
            empty find are ignored. Word formatting is kept except where a match spans runs, \
            whose text is merged into the first run. Returns a diff; the previous state is \
            kept for one undo."
            .to_owned(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "pairs": {
                    "type": "array",
                    "description": "Ordered find/replace pairs",
                    "items": {
                        "type": "object",
                        "properties": {
                            "find": { "type": "string" },
                            "replace": { "type": "string", "default": "" }
                        },
                        "required": ["find"]
                    }
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
                    "description": "Regex mode; replacements may use $1, ${name}, $$ (default: false)",
                    "default": false
                }
            },
            "required": ["pairs"]
        }),
    }
}

/// Execute the replace tool.
pub fn execute(session: &mut Session, arguments: serde_json::Value) -> Result<ToolCallResult> {
    let params: ReplaceParams =
        serde_json::from_value(arguments).context("invalid replace parameters")?;

    let report = match session.apply(&params.pairs, &params.options) {
        Ok(r) => r,
        Err(e) => return Ok(ToolCallResult::error(e)),
    };

    if report.total == 0 {
        return Ok(ToolCallResult::text("No matches found; document unchanged"));
    }

    let mut text = format!("Replaced {} occurrence(s)\n", report.total);
    let applied = params.pairs.iter().filter(|p| !p.find.is_empty());
    for (pair, count) in applied.zip(&report.counts) {
        let _ = writeln!(text, "  {:?} -> {:?}: {count}", pair.find, pair.replace);
    }
    if !report.diff.is_empty() {
        text.push('\n');
        text.push_str(&report.diff);
    }
    Ok(ToolCallResult::text(text))
}
