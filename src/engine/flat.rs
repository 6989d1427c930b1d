//! Flat replacer: whole-buffer substitution for plain text.

use super::pattern::Pattern;
use super::scanner::{CaptureScan, RangeScan};

/// Replace every match of `pattern` in `text` with `template`.
///
/// In regex mode the template may reference capture groups (`$1`, `${1}`,
/// `${name}`; `$$` for a literal dollar). In literal mode it is inserted
/// verbatim. The input is never modified.
pub fn replace_all(text: &str, pattern: &Pattern, template: &str) -> String {
    replace_all_counted(text, pattern, template).0
}

/// Like [`replace_all`], also returning how many matches were replaced.
pub fn replace_all_counted(text: &str, pattern: &Pattern, template: &str) -> (String, usize) {
    let Some(matcher) = pattern.matcher() else {
        return (text.to_owned(), 0);
    };

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut count = 0;

    if matcher.expands_captures() {
        for caps in CaptureScan::new(matcher.regex(), text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            out.push_str(&text[last..whole.start()]);
            caps.expand(template, &mut out);
            last = whole.end();
            count += 1;
        }
    } else {
        for (start, end) in RangeScan::new(pattern, text) {
            out.push_str(&text[last..start]);
            out.push_str(template);
            last = end;
            count += 1;
        }
    }

    if count == 0 {
        return (text.to_owned(), 0);
    }
    out.push_str(&text[last..]);
    (out, count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ReplacementOptions;

    fn compile(find: &str, is_regex: bool) -> Pattern {
        let options = ReplacementOptions {
            case_sensitive: true,
            is_regex,
            ..ReplacementOptions::default()
        };
        Pattern::compile(find, &options).expect("compile")
    }

    #[test]
    fn test_literal_replace_all() {
        let pattern = compile("aaa", false);
        assert_eq!(replace_all("aaa bbb aaa", &pattern, "ccc"), "ccc bbb ccc");
    }

    #[test]
    fn test_no_match_returns_input() {
        let pattern = compile("zzz", false);
        let (out, count) = replace_all_counted("hello world", &pattern, "x");
        assert_eq!(out, "hello world");
        assert_eq!(count, 0);
    }

    #[test]
    fn test_empty_find_returns_input() {
        assert_eq!(replace_all("hello", &Pattern::NoMatch, "x"), "hello");
    }

    #[test]
    fn test_literal_template_not_expanded() {
        let pattern = compile("price", false);
        assert_eq!(replace_all("price", &pattern, "$1 ${x} $$"), "$1 ${x} $$");
    }

    #[test]
    fn test_regex_backreferences() {
        let pattern = compile(r"(\w+)@(\w+)", true);
        assert_eq!(
            replace_all("alice@home bob@work", &pattern, "$2:${1}"),
            "home:alice work:bob"
        );
    }

    #[test]
    fn test_regex_named_groups_and_dollar_escape() {
        let pattern = compile(r"(?P<n>\d+)", true);
        assert_eq!(replace_all("cost 5", &pattern, "$$${n}.00"), "cost $5.00");
    }

    #[test]
    fn test_zero_length_regex_inserts_between_chars() {
        let pattern = compile("a*", true);
        assert_eq!(replace_all("bb", &pattern, "-"), "-b-b-");
        assert_eq!(replace_all("baab", &pattern, "-"), "-b--b-");
    }

    #[test]
    fn test_case_insensitive_replace() {
        let options = ReplacementOptions::default();
        let pattern = Pattern::compile("foo", &options).expect("compile");
        assert_eq!(replace_all("Foo FOO foo", &pattern, "bar"), "bar bar bar");
    }
}
