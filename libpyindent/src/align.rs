//! Continuation keyword alignment.
//!
//! Typing `else:`, `elif `, `except` or `finally:` should move the keyword
//! to the indentation of the statement that owns it. The owner is found by
//! walking backward with a bound on indentation that only tightens as the
//! walk leaves nested blocks; sibling clauses leave the bound alone.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::buffer::Buffer;
use crate::classify::indent_width;
use crate::config::Settings;
use crate::error::Result;

static ELSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*else\s*:").expect("else pattern should compile"));

static FINALLY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*finally\s*:").expect("finally pattern should compile"));

static EXCEPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*except\b").expect("except pattern should compile"));

static ELIF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*elif\b").expect("elif pattern should compile"));

/// A clause keyword that continues a compound statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    Else,
    Elif,
    Except,
    Finally,
}

impl Continuation {
    pub fn keyword(self) -> &'static str {
        match self {
            Continuation::Else => "else",
            Continuation::Elif => "elif",
            Continuation::Except => "except",
            Continuation::Finally => "finally",
        }
    }

    /// Keywords of the statements this clause can belong to.
    pub fn open_keywords(self) -> &'static [&'static str] {
        match self {
            Continuation::Else => &["if", "except"],
            Continuation::Elif => &["if"],
            Continuation::Except => &["try"],
            Continuation::Finally => &["try"],
        }
    }

    /// Sibling clauses passed over without tightening the bound.
    pub fn ignore_keywords(self) -> &'static [&'static str] {
        match self {
            Continuation::Else => &["elif"],
            Continuation::Elif => &["elif"],
            Continuation::Except => &["except"],
            Continuation::Finally => &["except", "else"],
        }
    }

    /// Detect the clause being typed.
    ///
    /// `prefix` is the line up to the cursor and `inserted` the characters
    /// just typed. The first matching pattern decides, and the last inserted
    /// character must be the terminator that pattern requires.
    pub fn detect(prefix: &str, inserted: &str) -> Option<Self> {
        let last = inserted.chars().last()?;
        if ELSE_RE.is_match(prefix) {
            (last == ':').then_some(Continuation::Else)
        } else if FINALLY_RE.is_match(prefix) {
            (last == ':').then_some(Continuation::Finally)
        } else if EXCEPT_RE.is_match(prefix) {
            (last == ' ' || last == ':').then_some(Continuation::Except)
        } else if ELIF_RE.is_match(prefix) {
            (last == ' ').then_some(Continuation::Elif)
        } else {
            None
        }
    }
}

/// Whether `line`, after leading whitespace, starts with one of `keywords`
/// as a whole word.
fn starts_with_keyword(line: &str, keywords: &[&str]) -> bool {
    let code = line.trim_start();
    keywords.iter().any(|kw| {
        code.strip_prefix(kw).is_some_and(|rest| {
            !rest
                .chars()
                .next()
                .is_some_and(|c| c.is_alphanumeric() || c == '_')
        })
    })
}

/// Indentation the line at `cursor` must take to align with its owning
/// statement, or `None` if no owner is found within the lookback budget.
pub fn find_alignment<B: Buffer>(
    buffer: &B,
    cursor: usize,
    open_keywords: &[&str],
    ignore_keywords: &[&str],
    settings: &Settings,
) -> Result<Option<usize>> {
    let tab_size = settings.tab_size;
    let span = buffer.line_span(cursor)?;
    let mut max_indent = indent_width(&buffer.slice(span)?, tab_size);

    for item in buffer.previous_lines(span.start).take(settings.max_lookback) {
        let (prev_span, text) = item?;
        let indent = indent_width(&text, tab_size);
        if starts_with_keyword(&text, open_keywords) {
            if indent <= max_indent {
                debug!("Aligning with line at {} (indent {})", prev_span.start, indent);
                return Ok(Some(indent));
            }
        } else if !starts_with_keyword(&text, ignore_keywords) {
            match indent.checked_sub(tab_size) {
                Some(bound) => max_indent = max_indent.min(bound),
                None => {
                    debug!("Left every enclosing block at {}", prev_span.start);
                    return Ok(None);
                }
            }
        }
    }

    debug!("No owning statement within lookback");
    Ok(None)
}

/// [`find_alignment`] with the keyword sets of `continuation`.
pub fn find_continuation_alignment<B: Buffer>(
    buffer: &B,
    cursor: usize,
    continuation: Continuation,
    settings: &Settings,
) -> Result<Option<usize>> {
    find_alignment(
        buffer,
        cursor,
        continuation.open_keywords(),
        continuation.ignore_keywords(),
        settings,
    )
}

/// Replace the leading whitespace of `line` with `columns` spaces.
pub fn reindent(line: &str, columns: usize) -> String {
    format!("{}{}", " ".repeat(columns), line.trim_start())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::TextBuffer;

    fn align_last_line(text: &str) -> Option<usize> {
        let buffer = TextBuffer::new(text);
        let prefix_start = buffer.line_span(buffer.len()).unwrap().start;
        let prefix = &text[prefix_start..];
        let continuation = Continuation::detect(prefix, &text[text.len() - 1..])
            .unwrap_or_else(|| panic!("no continuation detected in {:?}", prefix));
        find_continuation_alignment(&buffer, buffer.len(), continuation, &Settings::default())
            .unwrap()
    }

    fn check(cases: &[(&str, Option<usize>)]) {
        for (text, expected) in cases {
            assert_eq!(align_last_line(text), *expected, "aligning {:?}", text);
        }
    }

    #[test]
    fn test_right_indent() {
        check(&[
            ("if True:\n    a = 3\n    else:", Some(0)),
            ("    if True:\n        a = 0\n        else:", Some(4)),
            ("    if True:\n        a = 0\n    else:", Some(4)),
        ]);
    }

    #[test]
    fn test_if_chains() {
        check(&[
            ("    if True:\n        a = 8\n    elif True:\n        a = 4\n        else:", Some(4)),
            ("    if True:\n        a = 8\n        elif ", Some(4)),
            ("    if True:\n        a = 8\n    elif True:\n        a = 4\n        elif ", Some(4)),
        ]);
    }

    #[test]
    fn test_nested_blocks() {
        check(&[
            (
                "    if True:\n        if True:\n            a = 8\n        else:\n            a = 4\n            else:",
                Some(4),
            ),
            (
                "    if True:\n        if True:\n            a = 8\n        elif:\n            a = 4\n            else:",
                Some(8),
            ),
            (
                "    if True:\n        if True:\n            a = 8\n        elif:\n            a = 4\n    else:",
                Some(4),
            ),
        ]);
    }

    #[test]
    fn test_try_clauses() {
        check(&[
            ("    try:\n        a = 8\n        except:", Some(4)),
            ("    try:\n        a = 8\n        except ", Some(4)),
            ("    try:\n        a = 8\n    except:\n        a = 4\n        except:", Some(4)),
            ("    try:\n        a = 8\n        finally:", Some(4)),
            ("    try:\n        a = 8\n    except:\n        a = 4\n        finally:", Some(4)),
            ("    try:\n        a = 8\n    except:\n        a = 4\n        else:", Some(4)),
            (
                "    try:\n        a = 8\n    except:\n        a = 4\n    else:\n        a = 2\n        finally:",
                Some(4),
            ),
            (
                "    try:\n        a = 8\n    except:\n        a = 4\n    else:\n        if True:\n            a = 2\n        else:\n            a = 0\n            finally:",
                Some(4),
            ),
            (
                "    if True:\n        a = 8\n        try:\n            a = 2\n        finally:\n            a = 0\n            else:",
                Some(4),
            ),
        ]);
    }

    #[test]
    fn test_keyword_prefix_is_not_keyword() {
        check(&[
            ("if_true()\n    a = 4\n    else:", None),
            ("except_one()\n    a = 4\n    finally:", None),
            ("try_this()\n    a = 4\n    finally:", None),
        ]);
    }

    #[test]
    fn test_no_owner() {
        check(&[
            ("    else:", None),
            ("x = 1\n    elif ", None),
        ]);
    }

    #[test]
    fn test_lookback_budget() {
        let text = "if True:\n    a = 1\n    b = 2\n    else:";
        let buffer = TextBuffer::new(text);
        let settings = Settings {
            max_lookback: 2,
            ..Settings::default()
        };
        let found = find_continuation_alignment(&buffer, buffer.len(), Continuation::Else, &settings);
        assert_eq!(found.unwrap(), None);
    }

    #[test]
    fn test_detect() {
        assert_eq!(Continuation::detect("    else:", ":"), Some(Continuation::Else));
        assert_eq!(Continuation::detect("    else :", ":"), Some(Continuation::Else));
        assert_eq!(Continuation::detect("finally:", ":"), Some(Continuation::Finally));
        assert_eq!(Continuation::detect("  except ", " "), Some(Continuation::Except));
        assert_eq!(Continuation::detect("  except:", ":"), Some(Continuation::Except));
        assert_eq!(Continuation::detect("  elif ", " "), Some(Continuation::Elif));
    }

    #[test]
    fn test_detect_requires_terminator() {
        assert_eq!(Continuation::detect("    else", "e"), None);
        assert_eq!(Continuation::detect("    else ", " "), None);
        assert_eq!(Continuation::detect("    else_do() ", " "), None);
        assert_eq!(Continuation::detect("    finally", "y"), None);
        assert_eq!(Continuation::detect("    finally ", " "), None);
        assert_eq!(Continuation::detect("    finally_done() ", " "), None);
        assert_eq!(Continuation::detect("    except_this() ", " "), None);
        assert_eq!(Continuation::detect("    elif:", ":"), None);
        assert_eq!(Continuation::detect("    elifthis() ", " "), None);
        assert_eq!(Continuation::detect("    else:", ""), None);
    }

    #[test]
    fn test_starts_with_keyword() {
        assert!(starts_with_keyword("    if x:", &["if"]));
        assert!(starts_with_keyword("except:", &["try", "except"]));
        assert!(!starts_with_keyword("iffy = 1", &["if"]));
        assert!(!starts_with_keyword("a = 1 if b else c", &["if"]));
    }

    #[test]
    fn test_reindent() {
        assert_eq!(reindent("        else:", 4), "    else:");
        assert_eq!(reindent("\t\telse:", 0), "else:");
        assert_eq!(reindent("else:", 2), "  else:");
    }
}
