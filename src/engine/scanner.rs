//! Match scanner: lazy, left-to-right, non-overlapping match iteration.
//!
//! Offsets are UTF-8 byte offsets into the scanned `&str`. After a match the
//! scan resumes at `match.end`; after a zero-length match it resumes one
//! character further so patterns like `a*` cannot stall.

use regex::{Captures, Regex};
use serde::Serialize;

use super::pattern::Pattern;

/// One match found by [`scan`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
    pub matched_text: String,
}

impl MatchSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Scan position following a match at `start..end`.
fn resume_after(text: &str, start: usize, end: usize) -> usize {
    if start != end {
        return end;
    }
    match text[end..].chars().next() {
        Some(c) => end + c.len_utf8(),
        // Empty match at end of text: nothing left to scan.
        None => usize::MAX,
    }
}

/// Raw `(start, end)` iterator shared by [`Matches`] and the flat replacer.
#[derive(Debug, Clone)]
pub(crate) struct RangeScan<'r, 't> {
    regex: Option<&'r Regex>,
    text: &'t str,
    pos: usize,
}

impl<'r, 't> RangeScan<'r, 't> {
    pub(crate) fn new(pattern: &'r Pattern, text: &'t str) -> Self {
        Self {
            regex: pattern.matcher().map(super::pattern::Matcher::regex),
            text,
            pos: 0,
        }
    }
}

impl Iterator for RangeScan<'_, '_> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let regex = self.regex?;
        if self.pos > self.text.len() {
            return None;
        }
        let Some(m) = regex.find_at(self.text, self.pos) else {
            self.pos = usize::MAX;
            return None;
        };
        self.pos = resume_after(self.text, m.start(), m.end());
        Some((m.start(), m.end()))
    }
}

/// Capture-group iterator with the same stepping rules as [`RangeScan`].
pub(crate) struct CaptureScan<'r, 't> {
    regex: &'r Regex,
    text: &'t str,
    pos: usize,
}

impl<'r, 't> CaptureScan<'r, 't> {
    pub(crate) fn new(regex: &'r Regex, text: &'t str) -> Self {
        Self { regex, text, pos: 0 }
    }
}

impl<'t> Iterator for CaptureScan<'_, 't> {
    type Item = Captures<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos > self.text.len() {
            return None;
        }
        let Some(caps) = self.regex.captures_at(self.text, self.pos) else {
            self.pos = usize::MAX;
            return None;
        };
        let (start, end) = caps.get(0).map_or((self.pos, self.pos), |m| (m.start(), m.end()));
        self.pos = resume_after(self.text, start, end);
        Some(caps)
    }
}

/// Lazy sequence of [`MatchSpan`]s. Call [`scan`] again for a fresh pass;
/// results depend only on `(text, pattern)`.
#[derive(Debug, Clone)]
pub struct Matches<'r, 't> {
    inner: RangeScan<'r, 't>,
}

impl Iterator for Matches<'_, '_> {
    type Item = MatchSpan;

    fn next(&mut self) -> Option<MatchSpan> {
        let (start, end) = self.inner.next()?;
        Some(MatchSpan {
            start,
            end,
            matched_text: self.inner.text[start..end].to_owned(),
        })
    }
}

/// Scan `text` for every match of `pattern`. `NoMatch` yields nothing.
pub fn scan<'r, 't>(text: &'t str, pattern: &'r Pattern) -> Matches<'r, 't> {
    Matches {
        inner: RangeScan::new(pattern, text),
    }
}

/// Number of matches of `pattern` in `text`.
pub fn count_matches(text: &str, pattern: &Pattern) -> usize {
    RangeScan::new(pattern, text).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ReplacementOptions;

    fn literal(find: &str, case_sensitive: bool) -> Pattern {
        let options = ReplacementOptions {
            case_sensitive,
            ..ReplacementOptions::default()
        };
        Pattern::compile(find, &options).expect("compile")
    }

    fn regex(find: &str) -> Pattern {
        let options = ReplacementOptions {
            case_sensitive: true,
            is_regex: true,
            ..ReplacementOptions::default()
        };
        Pattern::compile(find, &options).expect("compile")
    }

    #[test]
    fn test_literal_non_overlapping_count() {
        let pattern = literal("aa", true);
        assert_eq!(count_matches("aaaaa", &pattern), 2);
        let spans: Vec<MatchSpan> = scan("aaaaa", &pattern).collect();
        assert_eq!((spans[0].start, spans[0].end), (0, 2));
        assert_eq!((spans[1].start, spans[1].end), (2, 4));
    }

    #[test]
    fn test_case_rule_applied() {
        assert_eq!(count_matches("Foo foo FOO", &literal("foo", true)), 1);
        assert_eq!(count_matches("Foo foo FOO", &literal("foo", false)), 3);
    }

    #[test]
    fn test_matched_text_keeps_source_case() {
        let spans: Vec<MatchSpan> = scan("Hello", &literal("hello", false)).collect();
        assert_eq!(spans[0].matched_text, "Hello");
    }

    #[test]
    fn test_no_match_pattern_yields_nothing() {
        let pattern = Pattern::NoMatch;
        assert_eq!(scan("anything", &pattern).count(), 0);
        assert_eq!(count_matches("", &pattern), 0);
    }

    #[test]
    fn test_whole_word_cat() {
        let options = ReplacementOptions {
            whole_word: true,
            ..ReplacementOptions::default()
        };
        let pattern = Pattern::compile("cat", &options).expect("compile");
        let spans: Vec<MatchSpan> = scan("concatenate cat", &pattern).collect();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].start, 12);
    }

    #[test]
    fn test_zero_length_matches_terminate() {
        let pattern = regex("a*");
        let spans: Vec<MatchSpan> = scan("bb", &pattern).collect();
        assert_eq!(spans.len(), 3);
        assert!(spans.iter().all(MatchSpan::is_empty));
        assert_eq!(
            spans.iter().map(|s| s.start).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_zero_length_mixed_with_runs() {
        let pattern = regex("a*");
        let spans: Vec<(usize, usize)> = scan("baab", &pattern).map(|s| (s.start, s.end)).collect();
        assert_eq!(spans, vec![(0, 0), (1, 3), (3, 3), (4, 4)]);
    }

    #[test]
    fn test_zero_length_steps_over_multibyte_chars() {
        let pattern = regex("x*");
        let spans: Vec<usize> = scan("é€", &pattern).map(|s| s.start).collect();
        assert_eq!(spans, vec![0, 2, 5]);
    }

    #[test]
    fn test_rescan_is_deterministic() {
        let pattern = literal("ab", true);
        let first: Vec<MatchSpan> = scan("abcab", &pattern).collect();
        let second: Vec<MatchSpan> = scan("abcab", &pattern).collect();
        assert_eq!(first, second);
    }
}
