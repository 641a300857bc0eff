use std::fmt;

use thiserror::Error;

/// Reasons the CSV automaton rejects its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A line feed arrived without a preceding carriage return.
    LineFeedWithoutCarriageReturn,
    /// A carriage return was followed by something other than a line feed.
    ExpectedLineFeed,
    /// A double quote appeared inside an unquoted field.
    QuoteInUnquotedField,
    /// Input ended while a quoted field was still open.
    EndOfInputInQuotedField,
    /// A closing quote was followed by a character that is neither a quote,
    /// the separator, nor a record terminator.
    UnexpectedAfterQuote(char),
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::LineFeedWithoutCarriageReturn => write!(f, "got LF without CR"),
            ParseErrorKind::ExpectedLineFeed => write!(f, "expecting LF after CR"),
            ParseErrorKind::QuoteInUnquotedField => write!(f, "found '\"' in an unquoted field"),
            ParseErrorKind::EndOfInputInQuotedField => write!(f, "found EOF in a quoted field"),
            ParseErrorKind::UnexpectedAfterQuote(ch) => write!(
                f,
                "expecting quote, separator, CRLF or EOF after embedded quote, found {ch:?}"
            ),
        }
    }
}

#[derive(Error, Debug)]
/// Errors raised while reading, binding or writing separated-values data
pub enum XsvError {
    #[error("Malformed input at line {line}: {kind}")]
    Malformed { line: usize, kind: ParseErrorKind },

    #[error("Not a valid separator character: {0:?}")]
    InvalidSeparator(char),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error(
        "The following column(s) were expected but are missing from the input: {}",
        .0.join(", ")
    )]
    MissingColumns(Vec<String>),

    #[error("The column is declared twice: {0}")]
    DuplicateColumn(String),

    #[error("A required column was not found: {0}")]
    UnknownColumn(String),

    #[error("Attempt to use an unbound column '{0}'")]
    UnboundColumn(String),

    #[error("No data loaded for column {0}")]
    MissingValue(String),

    #[error("Invalid value {value:?} in column {column}: {reason}")]
    InvalidValue {
        column: String,
        value: String,
        reason: String,
    },

    #[error("Too many fields in {format} line (expected {expected})")]
    TooManyFields { format: &'static str, expected: usize },

    #[error("Too few fields in {format} line (expected {expected}, got {actual})")]
    TooFewFields {
        format: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Column '{0}' was already set for the current row")]
    ColumnAlreadySet(String),

    #[error("Invalid output row: no value assigned to column '{0}'")]
    UnassignedColumn(String),

    #[error("Field contains a character that is not supported by TSV (tab or newline): {0:?}")]
    ForbiddenTsvCharacter(String),

    #[error("Usage error: {0}")]
    Usage(String),

    #[error("The sequence has no more elements")]
    Exhausted,

    #[error("The input has no header record")]
    MissingHeader,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, XsvError>;
