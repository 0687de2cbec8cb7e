//! Error types for indentation inference.
//!
//! Inconclusive analysis and missing alignment targets are not errors: they
//! are ordinary results (`IndentDecision::Error` and `None`). The variants
//! here cover faults at the host boundary and in configuration.

use thiserror::Error;

/// Result type for pyindent operations.
pub type Result<T> = std::result::Result<T, IndentError>;

/// Error type for pyindent operations.
#[derive(Error, Debug)]
pub enum IndentError {
    /// A buffer offset outside the text, or not on a character boundary.
    #[error("Offset {offset} out of range for buffer of length {len}")]
    OffsetOutOfRange { offset: usize, len: usize },

    /// Two edits of one command touch the same text.
    #[error("Overlapping edits at offset {0}")]
    OverlappingEdits(usize),

    /// Invalid or unreadable settings.
    #[error("Config error: {0}")]
    Config(String),

    /// I/O failure while reading settings or source text.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
