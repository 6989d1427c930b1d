//! `oa-replace`: format-preserving bulk find-and-replace for OpenAcosmi.
//!
//! Applies ordered find/replace pairs to plain-text files and Word (`.docx`)
//! documents on the local machine. Word documents are edited in place inside
//! their `word/document.xml` part, so run formatting, styles, and every other
//! archive entry survive the edit.
//!
//! # Layers
//!
//! - [`engine`]: pattern compiler, match scanner, flat replacer
//! - [`docx`]: paragraph/run text model, structured replacer, zip adapter
//! - [`session`]: the loaded document, one undo step, load/save
//! - [`server`] + [`tools`]: MCP (JSON-RPC 2.0 over stdio) front end
//!
//! # Architecture
//!
//! ```text
//! stdin (JSON-RPC) → server::serve → ToolRouter → Session → engine / docx
//! stdout (JSON-RPC) ←────────────────────────────────────┘
//! ```

pub mod docx;
pub mod engine;
pub mod error;
pub mod server;
pub mod session;
pub mod tools;
pub mod util;

pub use engine::{MatchSpan, Pattern, ReplacementOptions, ReplacementPair};
pub use error::{ReplaceError, ReplaceResult};
pub use server::{ServerConfig, run_mcp_server};
pub use session::Session;
