use thiserror::Error;

/// Errors raised while turning a converted statement into purchase records.
///
/// Only problems with the document as a whole (or with the output) show up
/// here. A single row that cannot be decomposed is dropped by the extractor
/// and never becomes an error.
#[derive(Error, Debug)]
pub enum StatementParseError {
    /// Generic failure while parsing the content (details in the message)
    #[error("Parse failed: {0}")]
    ParseFailed(String),

    /// The file is not a statement format this library reads
    #[error("Unsupported file format")]
    UnsupportedFormat,

    /// Reading the statement from disk failed
    #[error("Failed to read file content: {0}")]
    ReadContentFailed(#[from] std::io::Error),

    /// The builder was called without content or a file path
    #[error("Content or filepath is required")]
    MissingContentAndFilepath,

    // ── Markup errors ───────────────────────────────────────────────────────────

    /// The input bytes are not valid UTF-8
    #[error("Invalid encoding: statement markup must be UTF-8")]
    InvalidEncoding,

    /// The input does not start with a markup element
    #[error("Input is not markup")]
    NotMarkup,

    // ── Field errors (row-level, never abort a run) ────────────────────────────

    /// Date field is not "DD MON"
    #[error("Invalid statement date: {0}")]
    DateInvalidFormat(String),

    /// Amount field is not a decimal number in the statement's notation
    #[error("Invalid amount: {0}")]
    AmountInvalidFormat(String),

    // ── Output errors ───────────────────────────────────────────────────────────

    /// Writing the extracted records failed
    #[error("Failed to write records: {0}")]
    WriteFailed(String),
}

impl From<csv::Error> for StatementParseError {
    fn from(err: csv::Error) -> Self {
        StatementParseError::WriteFailed(err.to_string())
    }
}

impl From<serde_json::Error> for StatementParseError {
    fn from(err: serde_json::Error) -> Self {
        StatementParseError::WriteFailed(err.to_string())
    }
}

/// Convenience alias for results carrying our error type
pub type StatementResult<T> = Result<T, StatementParseError>;
