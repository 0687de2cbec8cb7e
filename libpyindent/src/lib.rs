//! PEP 8 indentation inference for Python source being typed in an editor.
//!
//! The engine answers two questions for an editor host:
//!
//! - How far should a new line be indented? ([`new_line_indent`])
//! - Where should `else`, `elif`, `except` or `finally` go once typed?
//!   ([`find_alignment`])
//!
//! # Resolution Pipeline
//!
//! New-line indentation works line by line, without a full tokenizer:
//!
//! 1. **Filter**: Masks brackets and `#` inside string literals and strips
//!    the trailing comment.
//!
//! 2. **Bracket analysis**: Scans the filtered line right to left to find an
//!    unmatched opening bracket, or the closing brackets left unmatched.
//!
//! 3. **Classification**: Matches block-opening and block-terminating
//!    statements to pick a deeper or shallower level.
//!
//! 4. **Lookback**: When the line only closes brackets, previous lines are
//!    analysed with the bracket count carried along, up to a bounded number
//!    of lines.
//!
//! The engine only reads text through the [`Buffer`] trait; the [`command`]
//! layer turns its answers into edits for the host to apply.

mod align;
mod brackets;
mod buffer;
mod classify;
pub mod command;
mod config;
mod error;
mod filter;
mod resolve;

pub use align::{find_alignment, find_continuation_alignment, reindent, Continuation};
pub use brackets::{analyze, Balance, BracketCounter};
pub use buffer::{Buffer, LineEnding, PreviousLines, Span, TextBuffer};
pub use classify::{indent_width, is_blank, opens_block, terminates_block};
pub use command::{
    apply_edits, deindent_edit, insertion_point, new_line_edits, Edit, LastCommand,
    NewLineOptions, Selection,
};
pub use config::{Settings, DEFAULT_MAX_LOOKBACK, DEFAULT_TAB_SIZE};
pub use error::{IndentError, Result};
pub use filter::filter_line;
pub use resolve::{new_line_indent, resolve_new_line, resolve_step, IndentDecision, Resolution};

/// Indentation of a new line typed at the end of `source`.
///
/// # Example
///
/// ```
/// use libpyindent::{indent_after, Settings};
///
/// assert_eq!(indent_after("def func():", &Settings::default()), 4);
/// assert_eq!(indent_after("alphabet = (\"a\", \"b\",", &Settings::default()), 12);
/// ```
pub fn indent_after(source: &str, settings: &Settings) -> usize {
    let buffer = TextBuffer::new(source);
    // The end of the buffer is always a valid offset.
    new_line_indent(&buffer, buffer.len(), settings).unwrap_or(0)
}
