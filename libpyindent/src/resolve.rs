//! Next-line indent resolution.
//!
//! The line holding the cursor is cut at the cursor, filtered and
//! classified. When it only closes brackets opened earlier, previous lines
//! are pulled one at a time with the bracket counter carried along until a
//! line settles the question or the lookback budget runs out.

use std::fmt;

use tracing::{debug, trace, warn};

use crate::brackets::{analyze, Balance, BracketCounter};
use crate::buffer::{Buffer, Span};
use crate::classify::{indent_width, is_blank, opens_block, terminates_block};
use crate::config::Settings;
use crate::error::Result;
use crate::filter::filter_line;

/// How the line after an analysed line should be indented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentDecision {
    /// Indent this many levels deeper than the analysed line.
    Increase(usize),
    /// Indent this many levels shallower than the analysed line.
    Decrease(usize),
    /// Indent to this column.
    Absolute(usize),
    /// Keep the indentation of the analysed line.
    Unchanged,
    /// The line closes brackets opened earlier; the previous line decides.
    UnmatchedClosing(BracketCounter),
    /// No conclusion within the lookback budget.
    Error,
}

impl IndentDecision {
    /// Column count for the new line, given the indentation of the last
    /// line inspected.
    pub fn to_columns(self, current_indent: usize, tab_size: usize) -> usize {
        match self {
            IndentDecision::Absolute(column) => column,
            IndentDecision::Unchanged => current_indent,
            IndentDecision::Increase(levels) => current_indent + levels * tab_size,
            IndentDecision::Decrease(levels) => current_indent.saturating_sub(levels * tab_size),
            IndentDecision::UnmatchedClosing(_) | IndentDecision::Error => 0,
        }
    }
}

impl fmt::Display for IndentDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndentDecision::Increase(levels) => write!(f, "increase({})", levels),
            IndentDecision::Decrease(levels) => write!(f, "decrease({})", levels),
            IndentDecision::Absolute(column) => write!(f, "absolute({})", column),
            IndentDecision::Unchanged => write!(f, "unchanged"),
            IndentDecision::UnmatchedClosing(counter) => write!(
                f,
                "unmatched_closing({}, {}, {})",
                counter.paren, counter.square, counter.curly
            ),
            IndentDecision::Error => write!(f, "error"),
        }
    }
}

/// Decide the indentation after one filtered line.
pub fn resolve_step(line: &str, carry_in: Option<BracketCounter>) -> IndentDecision {
    match analyze(line, carry_in) {
        Balance::Balanced => {
            if opens_block(line) {
                IndentDecision::Increase(1)
            } else if terminates_block(line) {
                IndentDecision::Decrease(1)
            } else {
                IndentDecision::Unchanged
            }
        }
        Balance::UnmatchedOpen(index) => {
            if index + 1 == line.chars().count() {
                // The bracket ends the line: indent by level, twice after a
                // block keyword so the continuation stands out from the suite.
                if opens_block(line) {
                    IndentDecision::Increase(2)
                } else {
                    IndentDecision::Increase(1)
                }
            } else {
                IndentDecision::Absolute(index + 1)
            }
        }
        Balance::UnmatchedClose(counter) => IndentDecision::UnmatchedClosing(counter),
    }
}

/// Full outcome of a new-line resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Final decision; never `UnmatchedClosing`.
    pub decision: IndentDecision,
    /// Indentation of the last line inspected.
    pub current_indent: usize,
    /// Previous lines pulled during lookback, blank ones included.
    pub lines_inspected: usize,
    /// Column count for the new line.
    pub columns: usize,
}

/// Number of spaces to put before a new line inserted at `cursor`.
pub fn new_line_indent<B: Buffer>(buffer: &B, cursor: usize, settings: &Settings) -> Result<usize> {
    Ok(resolve_new_line(buffer, cursor, settings)?.columns)
}

/// Resolve the indentation of a new line inserted at `cursor`.
pub fn resolve_new_line<B: Buffer>(
    buffer: &B,
    cursor: usize,
    settings: &Settings,
) -> Result<Resolution> {
    let span = buffer.line_span(cursor)?;
    let head = buffer.slice(Span::new(span.start, cursor))?;
    let mut line = filter_line(&head);
    let mut decision = resolve_step(&line, None);
    trace!(%decision, "cursor line at {}", span.start);

    let mut previous = buffer
        .previous_lines(span.start)
        .take(settings.max_lookback);
    let mut lines_inspected = 0;

    while let IndentDecision::UnmatchedClosing(counter) = decision {
        let Some(item) = previous.next() else {
            if lines_inspected == settings.max_lookback {
                warn!(
                    "Lookback budget of {} lines exhausted with unmatched closing brackets",
                    settings.max_lookback
                );
            } else {
                debug!("Reached start of buffer with unmatched closing brackets");
            }
            decision = IndentDecision::Error;
            break;
        };
        let (prev_span, text) = item?;
        lines_inspected += 1;
        line = filter_line(&text);
        if is_blank(&line) {
            trace!("skipping blank line at {}", prev_span.start);
            continue;
        }
        decision = resolve_step(&line, Some(counter));
        debug!(%decision, "lookback line at {}", prev_span.start);
    }

    let current_indent = indent_width(&line, settings.tab_size);
    Ok(Resolution {
        decision,
        current_indent,
        lines_inspected,
        columns: decision.to_columns(current_indent, settings.tab_size),
    })
}
