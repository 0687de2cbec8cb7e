//! Host buffer access.
//!
//! The engine never owns source text. It reads lines through the [`Buffer`]
//! trait, which an editor host implements over its own document model.
//! [`TextBuffer`] is the in-memory implementation used by the command-line
//! host and the tests.

use std::borrow::Cow;
use std::str::FromStr;

use crate::error::{IndentError, Result};

/// Half-open byte range `[start, end)` of a line, terminator excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Read access to the text of an editor buffer.
pub trait Buffer {
    /// Length of the buffer in bytes.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Span of the line containing `offset`. An offset on a line terminator
    /// belongs to the line the terminator ends.
    fn line_span(&self, offset: usize) -> Result<Span>;

    /// Raw text covered by `span`.
    fn slice(&self, span: Span) -> Result<Cow<'_, str>>;

    /// Lines before the line starting at `line_start`, nearest first.
    fn previous_lines(&self, line_start: usize) -> PreviousLines<'_, Self>
    where
        Self: Sized,
    {
        PreviousLines {
            buffer: self,
            start: line_start,
        }
    }
}

/// Lazy backward sequence of lines, ending at the start of the buffer.
///
/// Each item is the span and raw text of one physical line. A host error
/// is yielded once and ends the sequence.
pub struct PreviousLines<'b, B> {
    buffer: &'b B,
    start: usize,
}

impl<'b, B: Buffer> Iterator for PreviousLines<'b, B> {
    type Item = Result<(Span, Cow<'b, str>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.start == 0 {
            return None;
        }
        let buffer = self.buffer;
        let item = buffer
            .line_span(self.start - 1)
            .and_then(|span| Ok((span, buffer.slice(span)?)));
        match &item {
            Ok((span, _)) => self.start = span.start,
            Err(_) => self.start = 0,
        }
        Some(item)
    }
}

/// Line terminator style used when composing inserted text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineEnding {
    /// `\n`
    #[default]
    Unix,
    /// `\r\n`
    Windows,
    /// `\r`
    Cr,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Unix => "\n",
            LineEnding::Windows => "\r\n",
            LineEnding::Cr => "\r",
        }
    }

    /// Style of the first terminator in `text`, or the default if there is none.
    pub fn detect(text: &str) -> Self {
        let bytes = text.as_bytes();
        match bytes.iter().position(|&b| b == b'\n' || b == b'\r') {
            Some(i) if bytes[i] == b'\n' => LineEnding::Unix,
            Some(i) if bytes.get(i + 1) == Some(&b'\n') => LineEnding::Windows,
            Some(_) => LineEnding::Cr,
            None => LineEnding::default(),
        }
    }
}

impl FromStr for LineEnding {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unix" | "lf" => Ok(LineEnding::Unix),
            "windows" | "crlf" => Ok(LineEnding::Windows),
            "cr" => Ok(LineEnding::Cr),
            other => Err(format!("Unknown line ending: {}", other)),
        }
    }
}

/// An in-memory buffer recognising `\n`, `\r\n` and `\r` terminators.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    text: String,
    lines: Vec<Span>,
}

impl TextBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let lines = split_lines(&text);
        Self { text, lines }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Spans of every line in order.
    pub fn lines(&self) -> &[Span] {
        &self.lines
    }

    fn check_offset(&self, offset: usize) -> Result<()> {
        if offset > self.text.len() || !self.text.is_char_boundary(offset) {
            return Err(IndentError::OffsetOutOfRange {
                offset,
                len: self.text.len(),
            });
        }
        Ok(())
    }
}

impl Buffer for TextBuffer {
    fn len(&self) -> usize {
        self.text.len()
    }

    fn line_span(&self, offset: usize) -> Result<Span> {
        self.check_offset(offset)?;
        let index = self.lines.partition_point(|span| span.start <= offset);
        // The first line starts at 0, so at least one span qualifies.
        Ok(self.lines[index.saturating_sub(1)])
    }

    fn slice(&self, span: Span) -> Result<Cow<'_, str>> {
        self.check_offset(span.start)?;
        self.check_offset(span.end)?;
        if span.start > span.end {
            return Err(IndentError::OffsetOutOfRange {
                offset: span.start,
                len: self.text.len(),
            });
        }
        Ok(Cow::Borrowed(&self.text[span.start..span.end]))
    }
}

fn split_lines(text: &str) -> Vec<Span> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(Span::new(start, i));
                start = i + 1;
            }
            b'\r' => {
                lines.push(Span::new(start, i));
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    lines.push(Span::new(start, bytes.len()));
    lines
}
