//! Diff generation using the `similar` crate.
//!
//! Replace results are reported as a unified diff of the document's logical
//! text (one line per paragraph for Word documents).

use similar::{Algorithm, TextDiff};

/// Unified diff between `old` and `new` text of `name`.
pub fn unified_diff(name: &str, old: &str, new: &str) -> String {
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Patience)
        .diff_lines(old, new);

    diff.unified_diff()
        .context_radius(2)
        .header(&format!("a/{name}"), &format!("b/{name}"))
        .to_string()
}
