//! Structured replacer: runs the flat replacer block by block.
//!
//! Each block is scanned in isolation, so a match never spans a paragraph
//! break. Blocks without text fragments (page breaks, drawings) pass through.

use tracing::debug;

use super::model::{Block, flatten, serialize};
use crate::engine::{
    CompiledPair, Pattern, ReplacementOptions, ReplacementPair, compile_pairs, replace_all_counted,
};
use crate::error::ReplaceResult;

/// Apply `pattern` → `template` to every block, returning new blocks.
pub fn apply_replacement(blocks: &[Block], pattern: &Pattern, template: &str) -> Vec<Block> {
    apply_replacement_counted(blocks, pattern, template).0
}

/// Like [`apply_replacement`], also returning the number of matches replaced.
pub fn apply_replacement_counted(
    blocks: &[Block],
    pattern: &Pattern,
    template: &str,
) -> (Vec<Block>, usize) {
    if pattern.is_no_match() {
        return (blocks.to_vec(), 0);
    }

    let mut total = 0;
    let replaced = blocks
        .iter()
        .map(|block| {
            if block.fragments().is_empty() {
                return block.clone();
            }
            let text = block.text();
            let (new_text, count) = replace_all_counted(&text, pattern, template);
            total += count;
            block.redistribute(new_text)
        })
        .collect();
    (replaced, total)
}

/// Flatten `payload`, replace, and serialize the result.
///
/// # Errors
///
/// Returns [`crate::ReplaceError::MalformedDocument`] if `payload` cannot be
/// flattened.
pub fn replace_in_payload(
    payload: &str,
    pattern: &Pattern,
    template: &str,
) -> ReplaceResult<(String, usize)> {
    let flat = flatten(payload)?;
    let (blocks, count) = apply_replacement_counted(&flat.blocks, pattern, template);
    if blocks.iter().all(|b| !b.is_modified()) {
        return Ok((payload.to_owned(), count));
    }
    Ok((serialize(payload, &blocks), count))
}

/// Result of applying a batch of pairs to a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadOutcome {
    pub payload: String,
    /// Replacement count per applied (non-blank) pair, in order.
    pub counts: Vec<usize>,
}

impl PayloadOutcome {
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Apply `pairs` to `payload` in order; each pair sees the previous pair's
/// output.
///
/// # Errors
///
/// Fails before any change on an invalid pattern, or if the payload is
/// malformed.
pub fn apply_pairs_to_payload(
    payload: &str,
    pairs: &[ReplacementPair],
    options: &ReplacementOptions,
) -> ReplaceResult<PayloadOutcome> {
    let compiled = compile_pairs(pairs, options)?;
    let mut current = payload.to_owned();
    let mut counts = Vec::with_capacity(compiled.len());

    for CompiledPair { pattern, pair } in &compiled {
        let (next, count) = replace_in_payload(&current, pattern, &pair.replace)?;
        debug!(find = %pair.find, count, "applied pair to payload");
        current = next;
        counts.push(count);
    }

    Ok(PayloadOutcome {
        payload: current,
        counts,
    })
}
