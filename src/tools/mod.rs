//! Tool router: registers and dispatches MCP tool calls.
//!
//! Each tool is a function that takes the session plus JSON arguments and
//! returns a [`ToolCallResult`]. Domain failures (bad pattern, malformed
//! document, nothing to undo) come back as `isError` results so the client
//! can show them while the session keeps its last good state.

pub mod close;
pub mod find;
pub mod load;
pub mod preview;
pub mod replace;
pub mod reset;
pub mod save;
pub mod undo;

use std::path::{Component, Path, PathBuf};

use anyhow::{Result, bail};
use tracing::debug;

use crate::server::{ServerConfig, ToolCallResult, ToolDefinition};
use crate::session::Session;

/// Resolve `file_path` against the workspace and reject anything outside it.
///
/// Rejects null bytes and `..` escapes; existing paths (or their deepest
/// existing ancestor) are canonicalized so symlinks cannot leave the
/// workspace either.
pub fn validate_path(workspace: &Path, file_path: &str) -> Result<PathBuf> {
    if file_path.contains('\0') {
        bail!("path contains null byte");
    }

    let raw_path = if Path::new(file_path).is_absolute() {
        PathBuf::from(file_path)
    } else {
        workspace.join(file_path)
    };

    let canonical_workspace = workspace
        .canonicalize()
        .unwrap_or_else(|_| workspace.to_path_buf());

    // Canonicalize the deepest existing ancestor, then re-append the rest.
    let mut existing = raw_path.as_path();
    let mut missing = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => break,
        }
    }
    let mut resolved = existing
        .canonicalize()
        .unwrap_or_else(|_| existing.to_path_buf());
    for part in missing.iter().rev() {
        resolved.push(part);
    }

    if resolved.components().any(|c| c == Component::ParentDir)
        || !resolved.starts_with(&canonical_workspace)
    {
        bail!("path escapes workspace boundary: {file_path}");
    }

    Ok(resolved)
}

/// Tool router holding the single document session.
pub struct ToolRouter {
    config: ServerConfig,
    session: Session,
}

impl ToolRouter {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            session: Session::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// List all available tools with their JSON Schema definitions.
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        vec![
            load::tool_definition(),
            find::tool_definition(),
            replace::tool_definition(),
            undo::tool_definition(),
            reset::tool_definition(),
            preview::tool_definition(),
            save::tool_definition(),
            close::tool_definition(),
        ]
    }

    /// Call a tool by name with the given JSON arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments do not deserialize or an unexpected
    /// I/O failure occurs. Unknown tools and domain failures are reported as
    /// error results instead.
    pub fn call_tool(&mut self, name: &str, arguments: serde_json::Value) -> Result<ToolCallResult> {
        debug!(tool = name, "dispatching tool call");

        match name {
            "load" => load::execute(&mut self.session, &self.config, arguments),
            "find" => find::execute(&self.session, arguments),
            "replace" => replace::execute(&mut self.session, arguments),
            "undo" => undo::execute(&mut self.session),
            "reset" => reset::execute(&mut self.session),
            "preview" => preview::execute(&self.session, arguments),
            "save" => save::execute(&self.session, &self.config, arguments),
            "close" => close::execute(&mut self.session),
            _ => Ok(ToolCallResult::error(format!("Unknown tool: {name}"))),
        }
    }
}
