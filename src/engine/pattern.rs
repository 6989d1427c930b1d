//! Pattern compiler: turns a find string plus options into a [`Pattern`].
//!
//! Literal find strings are escaped so that only the pattern-syntax operators
//! `. * + ? ^ $ { } ( ) | [ ] \` lose their meaning. Whole-word mode wraps the
//! pattern in ASCII word-boundary assertions: only `[0-9A-Za-z_]` count as
//! word characters, so accented letters end a word. Every compiled pattern scans for all
//! non-overlapping matches; there is no single-match mode.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ReplaceError, ReplaceResult};

/// Characters with meaning in the pattern syntax, escaped in literal mode.
const SYNTAX_CHARS: &[char] = &[
    '.', '*', '+', '?', '^', '$', '{', '}', '(', ')', '|', '[', ']', '\\',
];

/// Matching rules supplied by the caller with every find/replace request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReplacementOptions {
    /// `true` → exact case; `false` → case-insensitive.
    pub case_sensitive: bool,
    /// Only match when surrounded by word boundaries.
    pub whole_word: bool,
    /// Treat the find string as a regular expression.
    pub is_regex: bool,
}

/// A compiled regex plus the knowledge of whether replacement templates
/// expand capture-group references.
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Regex,
    expands_captures: bool,
}

impl Matcher {
    /// The underlying compiled regex.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Whether replacement templates are interpreted (`$1`, `${name}`, `$$`).
    pub fn expands_captures(&self) -> bool {
        self.expands_captures
    }
}

/// Compiled find pattern.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Sentinel for an empty find string: matches nothing.
    NoMatch,
    /// A usable matcher.
    Matcher(Matcher),
}

impl Pattern {
    /// Compile `find` under `options`.
    ///
    /// # Errors
    ///
    /// Returns [`ReplaceError::InvalidPattern`] if regex mode is on and `find`
    /// is not a valid expression (or exceeds the regex size limit).
    pub fn compile(find: &str, options: &ReplacementOptions) -> ReplaceResult<Self> {
        if find.is_empty() {
            return Ok(Self::NoMatch);
        }

        let body = if options.is_regex {
            find.to_owned()
        } else {
            escape_literal(find)
        };

        let source = if options.whole_word {
            format!(r"(?-u:\b)(?:{body})(?-u:\b)")
        } else {
            body
        };

        let regex = RegexBuilder::new(&source)
            .case_insensitive(!options.case_sensitive)
            .build()
            .map_err(|source| ReplaceError::InvalidPattern {
                pattern: find.to_owned(),
                source,
            })?;

        debug!(pattern = %source, ?options, "compiled pattern");

        Ok(Self::Matcher(Matcher {
            regex,
            expands_captures: options.is_regex,
        }))
    }

    /// `true` for the empty-find sentinel.
    pub fn is_no_match(&self) -> bool {
        matches!(self, Self::NoMatch)
    }

    pub(crate) fn matcher(&self) -> Option<&Matcher> {
        match self {
            Self::NoMatch => None,
            Self::Matcher(m) => Some(m),
        }
    }
}

/// Escape every pattern-syntax operator in `s` so it matches literally.
pub fn escape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        if SYNTAX_CHARS.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(case_sensitive: bool, whole_word: bool, is_regex: bool) -> ReplacementOptions {
        ReplacementOptions {
            case_sensitive,
            whole_word,
            is_regex,
        }
    }

    #[test]
    fn test_empty_find_is_no_match() {
        let pattern = Pattern::compile("", &opts(true, true, true)).expect("compile");
        assert!(pattern.is_no_match());
    }

    #[test]
    fn test_escape_literal_operators() {
        assert_eq!(escape_literal("a.b*c"), r"a\.b\*c");
        assert_eq!(escape_literal(r"(x|y)[0]{2}\"), r"\(x\|y\)\[0\]\{2\}\\");
        assert_eq!(escape_literal("^$+?"), r"\^\$\+\?");
        assert_eq!(escape_literal("plain-text #1"), "plain-text #1");
    }

    #[test]
    fn test_literal_mode_matches_operators_literally() {
        let pattern = Pattern::compile("1+1", &opts(true, false, false)).expect("compile");
        let m = pattern.matcher().expect("matcher");
        assert!(m.regex().is_match("1+1=2"));
        assert!(!m.regex().is_match("11"));
        assert!(!m.expands_captures());
    }

    #[test]
    fn test_case_insensitive() {
        let pattern = Pattern::compile("Hello", &opts(false, false, false)).expect("compile");
        assert!(pattern.matcher().expect("matcher").regex().is_match("say HELLO"));

        let strict = Pattern::compile("Hello", &opts(true, false, false)).expect("compile");
        assert!(!strict.matcher().expect("matcher").regex().is_match("say HELLO"));
    }

    #[test]
    fn test_whole_word_wraps_alternation() {
        let pattern = Pattern::compile("cat|dog", &opts(true, true, true)).expect("compile");
        let re = pattern.matcher().expect("matcher").regex();
        assert!(re.is_match("a dog here"));
        assert!(!re.is_match("dogma"));
        assert!(!re.is_match("concatenate"));
    }

    #[test]
    fn test_whole_word_uses_ascii_word_characters() {
        let pattern = Pattern::compile("caf", &opts(true, true, false)).expect("compile");
        let re = pattern.matcher().expect("matcher").regex();
        assert_eq!(re.find("un café").as_ref().map(regex::Match::as_str), Some("caf"));
        assert!(!re.is_match("cafe"));

        let pattern = Pattern::compile("ber", &opts(true, true, false)).expect("compile");
        assert!(pattern.matcher().expect("matcher").regex().is_match("über"));
    }

    #[test]
    fn test_invalid_regex_reports_error() {
        let err = Pattern::compile("(unclosed", &opts(true, false, true))
            .expect_err("unclosed group must not compile");
        assert!(matches!(err, ReplaceError::InvalidPattern { .. }));
        assert!(err.to_string().contains("(unclosed"));
    }

    #[test]
    fn test_invalid_regex_text_is_fine_in_literal_mode() {
        let pattern = Pattern::compile("(unclosed", &opts(true, false, false)).expect("compile");
        assert!(pattern.matcher().expect("matcher").regex().is_match("x (unclosed y"));
    }

    #[test]
    fn test_options_deserialize_camel_case_with_defaults() {
        let options: ReplacementOptions =
            serde_json::from_str(r#"{"caseSensitive": true, "isRegex": true}"#).expect("parse");
        assert_eq!(options, opts(true, false, true));
    }
}
