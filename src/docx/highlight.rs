//! Per-fragment match hits for rendering a highlighted preview.
//!
//! Matching runs on each block's logical text; every match is then split
//! over the fragments it touches, with offsets relative to each fragment.

use std::collections::VecDeque;

use serde::Serialize;

use super::model::Block;
use crate::engine::{MatchSpan, Pattern, scan};

/// The part of one match that falls inside one fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FragmentHit {
    /// Index of the block in document order.
    pub block: usize,
    /// Index of the fragment within the block.
    pub fragment: usize,
    /// Span relative to the fragment's text.
    pub span: MatchSpan,
}

/// Lazy iterator over [`FragmentHit`]s, one block at a time.
pub struct Highlights<'b, 'p> {
    blocks: &'b [Block],
    pattern: &'p Pattern,
    next_block: usize,
    pending: VecDeque<FragmentHit>,
}

impl Iterator for Highlights<'_, '_> {
    type Item = FragmentHit;

    fn next(&mut self) -> Option<FragmentHit> {
        loop {
            if let Some(hit) = self.pending.pop_front() {
                return Some(hit);
            }
            let block = self.blocks.get(self.next_block)?;
            self.pending = block_hits(self.next_block, block, self.pattern);
            self.next_block += 1;
        }
    }
}

/// Hits for `pattern` across `blocks`.
pub fn highlights<'b, 'p>(blocks: &'b [Block], pattern: &'p Pattern) -> Highlights<'b, 'p> {
    Highlights {
        blocks,
        pattern,
        next_block: 0,
        pending: VecDeque::new(),
    }
}

fn block_hits(block_index: usize, block: &Block, pattern: &Pattern) -> VecDeque<FragmentHit> {
    let fragments = block.fragments();
    let mut hits = VecDeque::new();
    if fragments.is_empty() {
        return hits;
    }

    // (start, end) of each fragment within the block text.
    let mut bounds = Vec::with_capacity(fragments.len());
    let mut offset = 0;
    for f in fragments {
        bounds.push((offset, offset + f.text().len()));
        offset += f.text().len();
    }

    let text = block.text();
    for m in scan(&text, pattern) {
        if m.is_empty() {
            let index = bounds
                .iter()
                .position(|&(_, end)| m.start < end)
                .unwrap_or(bounds.len() - 1);
            let (start, _) = bounds[index];
            hits.push_back(hit(block_index, index, fragments[index].text(), m.start - start, m.start - start));
            continue;
        }

        for (index, &(start, end)) in bounds.iter().enumerate() {
            let lo = m.start.max(start);
            let hi = m.end.min(end);
            if lo < hi {
                hits.push_back(hit(block_index, index, fragments[index].text(), lo - start, hi - start));
            }
        }
    }
    hits
}

fn hit(block: usize, fragment: usize, text: &str, start: usize, end: usize) -> FragmentHit {
    FragmentHit {
        block,
        fragment,
        span: MatchSpan {
            start,
            end,
            matched_text: text[start..end].to_owned(),
        },
    }
}
