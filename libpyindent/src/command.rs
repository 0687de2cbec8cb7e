//! Host-facing commands.
//!
//! Turns engine results into edits: one replacement per cursor for a new
//! line, or one line replacement when a continuation keyword is typed.
//! Edits are computed against the unmodified buffer; [`apply_edits`]
//! applies a command's edits in a single pass.

use tracing::{debug, warn};

use crate::align::{find_continuation_alignment, reindent, Continuation};
use crate::buffer::{Buffer, LineEnding, Span, TextBuffer};
use crate::config::Settings;
use crate::error::{IndentError, Result};
use crate::resolve::new_line_indent;

/// A cursor (when empty) or a selected range, in byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn cursor(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Where the new line goes relative to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewLineOptions {
    /// Open a line below or above the current one instead of splitting it.
    pub full_line: bool,
    /// With `full_line`, open the line below (true) or above (false).
    pub forward: bool,
}

impl Default for NewLineOptions {
    fn default() -> Self {
        Self {
            full_line: false,
            forward: true,
        }
    }
}

/// Replacement of `span` by `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub span: Span,
    pub text: String,
    /// Cursor position after the edit, as an offset into `text`.
    pub caret: usize,
}

/// The most recent entry of the host's command history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LastCommand {
    /// Plain insertion of typed characters.
    Insert { characters: String },
    /// Any other command, by name.
    Other(String),
}

/// Edits inserting a properly indented new line at every selection.
///
/// Cursors sharing a line each split off the text up to the next cursor,
/// so their edits never overlap. If any selection cannot be resolved, or
/// the selections themselves overlap, every selection instead gets a bare
/// line break at its end, so typed input is never lost.
pub fn new_line_edits<B: Buffer>(
    buffer: &B,
    selections: &[Selection],
    options: NewLineOptions,
    ending: LineEnding,
    settings: &Settings,
) -> Vec<Edit> {
    let edits = selections
        .iter()
        .map(|&selection| {
            let next = selections
                .iter()
                .map(|other| other.start)
                .filter(|&start| start > selection.start && start >= selection.end)
                .min();
            new_line_edit(buffer, selection, next, options, ending, settings)
        })
        .collect::<Result<Vec<Edit>>>()
        .and_then(|edits| {
            ensure_disjoint(&edits)?;
            Ok(edits)
        });

    match edits {
        Ok(edits) => edits,
        Err(e) => {
            warn!(error = %e, "New line indentation failed, inserting a bare line break");
            selections
                .iter()
                .map(|selection| Edit {
                    span: Span::new(selection.end, selection.end),
                    text: ending.as_str().to_string(),
                    caret: ending.as_str().len(),
                })
                .collect()
        }
    }
}

/// Offset at which the indentation of the new line is measured.
///
/// When splitting a line this is the start of the selection. With
/// `full_line` it is the end of the last selected line (forward) or the end
/// of the line above the first selected line (backward). On the first line
/// of the buffer a backward new line opens at offset 0.
pub fn insertion_point<B: Buffer>(
    buffer: &B,
    selection: Selection,
    options: NewLineOptions,
) -> Result<usize> {
    let first_line = buffer.line_span(selection.start)?;
    if !options.full_line {
        return Ok(selection.start);
    }
    if options.forward {
        return Ok(buffer.line_span(selection.end)?.end);
    }
    if first_line.start == 0 {
        return Ok(0);
    }
    Ok(buffer.line_span(first_line.start - 1)?.end)
}

/// New line for one selection. `next` is the start of the following
/// selection, which bounds the text carried onto the new line.
fn new_line_edit<B: Buffer>(
    buffer: &B,
    selection: Selection,
    next: Option<usize>,
    options: NewLineOptions,
    ending: LineEnding,
    settings: &Settings,
) -> Result<Edit> {
    let ending = ending.as_str();
    let at = insertion_point(buffer, selection, options)?;

    if options.full_line {
        if !options.forward && buffer.line_span(selection.start)?.start == 0 {
            // Nothing above the first line: open the new one in front of it.
            return Ok(Edit {
                span: Span::new(0, 0),
                text: ending.to_string(),
                caret: 0,
            });
        }
        let indent = new_line_indent(buffer, at, settings)?;
        let text = format!("{}{}", ending, " ".repeat(indent));
        return Ok(Edit {
            span: Span::new(at, at),
            caret: text.len(),
            text,
        });
    }

    let indent = new_line_indent(buffer, at, settings)?;
    let line_end = buffer.line_span(selection.end)?.end;
    let end = next.map_or(line_end, |next| next.min(line_end));
    let rest = buffer.slice(Span::new(selection.end, end))?;
    debug!(cursor = at, indent, "new line");
    Ok(Edit {
        span: Span::new(at, end),
        text: format!("{}{}{}", ending, " ".repeat(indent), rest.trim_start()),
        caret: ending.len() + indent,
    })
}

fn ensure_disjoint(edits: &[Edit]) -> Result<()> {
    let mut spans: Vec<Span> = edits.iter().map(|edit| edit.span).collect();
    spans.sort_by_key(|span| (span.start, span.end));
    for pair in spans.windows(2) {
        if pair[1].start < pair[0].end {
            return Err(IndentError::OverlappingEdits(pair[1].start));
        }
    }
    Ok(())
}

/// Edit realigning the current line after a continuation keyword is typed.
///
/// Returns `None` when the last command was not a qualifying insertion, the
/// selection is not a single cursor, no keyword is being typed, or no
/// owning statement is found. In every such case the buffer is left alone.
pub fn deindent_edit<B: Buffer>(
    buffer: &B,
    selection: Selection,
    last: &LastCommand,
    settings: &Settings,
) -> Result<Option<Edit>> {
    let LastCommand::Insert { characters } = last else {
        return Ok(None);
    };
    if !characters.ends_with(|c: char| c == ' ' || c == ':') || !selection.is_empty() {
        return Ok(None);
    }

    let cursor = selection.end;
    let span = buffer.line_span(cursor)?;
    let prefix = buffer.slice(Span::new(span.start, cursor))?;
    let Some(continuation) = Continuation::detect(&prefix, characters) else {
        return Ok(None);
    };
    let Some(indent) = find_continuation_alignment(buffer, cursor, continuation, settings)? else {
        debug!(keyword = continuation.keyword(), "no owning statement, leaving line");
        return Ok(None);
    };

    let line = buffer.slice(span)?;
    let leading = line.len() - line.trim_start().len();
    let text = reindent(&line, indent);
    let caret = (indent + (cursor - span.start).saturating_sub(leading)).min(text.len());
    Ok(Some(Edit { span, text, caret }))
}

/// Apply non-overlapping edits, returning the new text and each edit's
/// cursor position in it, in the order the edits were given.
pub fn apply_edits(buffer: &TextBuffer, edits: &[Edit]) -> Result<(String, Vec<usize>)> {
    let mut order: Vec<usize> = (0..edits.len()).collect();
    order.sort_by_key(|&i| edits[i].span.start);

    let mut out = String::with_capacity(buffer.len());
    let mut carets = vec![0; edits.len()];
    let mut pos = 0;
    for i in order {
        let edit = &edits[i];
        if edit.span.start < pos {
            return Err(IndentError::OverlappingEdits(edit.span.start));
        }
        buffer.slice(edit.span)?;
        out.push_str(&buffer.slice(Span::new(pos, edit.span.start))?);
        carets[i] = out.len() + edit.caret;
        out.push_str(&edit.text);
        pos = edit.span.end;
    }
    out.push_str(&buffer.slice(Span::new(pos, buffer.len()))?);
    Ok((out, carets))
}
