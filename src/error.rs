//! Typed errors for schema loading and graph construction.
//!
//! Everything in here is fatal at startup only. Findings against an
//! individual message are never errors, they are `ValidationIssue`s.

#[derive(thiserror::Error, Debug)]
pub enum FormatSpecError {
    #[error("empty format spec")]
    Empty,
    #[error("unexpected character '{0}' at position {1} in format spec")]
    UnexpectedChar(char, usize),
    #[error("length of zero at position {0} in format spec")]
    ZeroLength(usize),
    #[error("unknown charset class '{0}' in format spec")]
    UnknownCharset(char),
    #[error("unterminated optional group in format spec")]
    UnterminatedOptional,
    #[error("line-repeat bound must be followed by a line format")]
    DanglingRepeat,
    #[error("format spec ends before a charset class")]
    MissingCharset,
    #[error("trailing input after multi-line format")]
    TrailingAfterMultiline,
}

#[derive(thiserror::Error, Debug)]
pub enum RegistryError {
    #[error("message type {message_type}, field {tag}: {source}")]
    BadFormatSpec {
        message_type: String,
        tag: String,
        #[source]
        source: FormatSpecError,
    },
    #[error("duplicate schema for message type {0}")]
    DuplicateType(String),
    #[error("schema source failed: {0}")]
    Source(String),
}

#[derive(thiserror::Error, Debug)]
pub enum GraphError {
    #[error("message type {0} has more than one continuation successor")]
    MultipleContinuations(String),
    #[error("continuation edges form a cycle through message type {0}")]
    ContinuationCycle(String),
}
