//! Text replacement engine.
//!
//! Three layers, leaves first:
//!
//! 1. [`pattern`] compiles a find string plus [`ReplacementOptions`] into a
//!    [`Pattern`] (or the `NoMatch` sentinel for an empty find).
//! 2. [`scanner`] yields non-overlapping [`MatchSpan`]s left to right.
//! 3. [`flat`] substitutes every match in a flat text buffer.
//!
//! [`apply_pairs_to_text`] chains an ordered list of [`ReplacementPair`]s,
//! each pair's output feeding the next. Word documents reuse the same layers
//! through [`crate::docx`].

pub mod flat;
pub mod pattern;
pub mod scanner;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ReplaceResult;

pub use flat::{replace_all, replace_all_counted};
pub use pattern::{Matcher, Pattern, ReplacementOptions, escape_literal};
pub use scanner::{MatchSpan, Matches, count_matches, scan};

/// One find/replace instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementPair {
    pub find: String,
    #[serde(default)]
    pub replace: String,
}

impl ReplacementPair {
    pub fn new(find: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            find: find.into(),
            replace: replace.into(),
        }
    }
}

/// A pair whose find string has been compiled.
#[derive(Debug, Clone)]
pub struct CompiledPair<'a> {
    pub pattern: Pattern,
    pub pair: &'a ReplacementPair,
}

/// Drop blank-find pairs and compile the rest, in order.
///
/// Every pattern is compiled before anything is replaced, so one invalid
/// expression aborts the whole batch.
///
/// # Errors
///
/// Returns [`crate::ReplaceError::InvalidPattern`] for the first invalid regex.
pub fn compile_pairs<'a>(
    pairs: &'a [ReplacementPair],
    options: &ReplacementOptions,
) -> ReplaceResult<Vec<CompiledPair<'a>>> {
    pairs
        .iter()
        .filter(|pair| !pair.find.is_empty())
        .map(|pair| {
            Ok(CompiledPair {
                pattern: Pattern::compile(&pair.find, options)?,
                pair,
            })
        })
        .collect()
}

/// Result of applying a batch of pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextOutcome {
    pub text: String,
    /// Replacement count per applied (non-blank) pair, in order.
    pub counts: Vec<usize>,
}

impl TextOutcome {
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Apply `pairs` to `text` strictly in order.
///
/// # Errors
///
/// Returns [`crate::ReplaceError::InvalidPattern`] before touching the text if
/// any regex-mode find string is invalid.
pub fn apply_pairs_to_text(
    text: &str,
    pairs: &[ReplacementPair],
    options: &ReplacementOptions,
) -> ReplaceResult<TextOutcome> {
    let compiled = compile_pairs(pairs, options)?;
    let mut current = text.to_owned();
    let mut counts = Vec::with_capacity(compiled.len());

    for CompiledPair { pattern, pair } in &compiled {
        let (next, count) = replace_all_counted(&current, pattern, &pair.replace);
        debug!(find = %pair.find, count, "applied pair to text");
        current = next;
        counts.push(count);
    }

    Ok(TextOutcome {
        text: current,
        counts,
    })
}
