//! Lexical line filter.
//!
//! Masks brackets and `#` inside quoted strings, then drops the trailing
//! comment, so that bracket counting and keyword matching only see code.
//! Quote delimiters and backslashes are kept, which leaves the filtered
//! line the same length as the original up to the comment marker.

/// Characters masked inside string literals.
const RESERVED: &[char] = &['(', ')', '[', ']', '{', '}', '#'];

/// Longest backslash run recognised as escaping a quote.
const MAX_ESCAPE_DEPTH: usize = 3;

/// Filter one line: mask reserved characters in strings, strip the comment.
///
/// An unterminated string is left untouched and scanning resumes at the next
/// character, so brackets inside it are still counted.
pub fn filter_line(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut out = String::with_capacity(line.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '"' || c == '\'' {
            if let Some(close) = find_closing_quote(&chars, i) {
                out.push(c);
                out.extend(chars[i + 1..close].iter().map(|&ch| mask(ch)));
                out.push(c);
                i = close + 1;
                continue;
            }
        }
        out.push(c);
        i += 1;
    }

    if let Some(comment) = out.find('#') {
        out.truncate(comment);
    }
    out
}

fn mask(c: char) -> char {
    if RESERVED.contains(&c) {
        '_'
    } else {
        c
    }
}

/// Index of the quote closing the string opened at `open`.
fn find_closing_quote(chars: &[char], open: usize) -> Option<usize> {
    let quote = chars[open];
    (open + 1..chars.len()).find(|&j| chars[j] == quote && !is_escaped(chars, open + 1, j))
}

/// Whether the quote at `pos` is escaped by the backslashes before it.
fn is_escaped(chars: &[char], body_start: usize, pos: usize) -> bool {
    let run = chars[body_start..pos]
        .iter()
        .rev()
        .take_while(|&&c| c == '\\')
        .count();
    run % 2 == 1 && run <= MAX_ESCAPE_DEPTH
}
