//! Line classification.
//!
//! Decides whether the line after a filtered line should open a new block
//! or close the current one, and measures indentation.

use std::sync::LazyLock;

use regex::Regex;

static OPENS_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(class|def|elif|else|except|finally|for|if|try|with|while)\b")
        .expect("block opening pattern should compile")
});

static TERMINATES_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(pass\b|return\b.*|continue\b|break\b|raise\b.*|yield\b.*)\s*$")
        .expect("block terminating pattern should compile")
});

/// The line starts a compound statement whose suite is indented.
pub fn opens_block(line: &str) -> bool {
    OPENS_BLOCK_RE.is_match(line)
}

/// The line is a statement after which the suite usually ends.
pub fn terminates_block(line: &str) -> bool {
    TERMINATES_BLOCK_RE.is_match(line)
}

pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Width of the leading whitespace of `line`, counting a tab as `tab_size`.
pub fn indent_width(line: &str, tab_size: usize) -> usize {
    line.chars()
        .map_while(|c| match c {
            ' ' => Some(1),
            '\t' => Some(tab_size),
            _ => None,
        })
        .sum()
}
