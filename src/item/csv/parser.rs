//! Character-at-a-time CSV automaton.
//!
//! The automaton is split in two: [`transition`] is a pure function from
//! `(state, input)` to `(next state, action)`, and [`CsvAutomaton`] applies the
//! actions to its field and record buffers. Records are only completed at a
//! CRLF boundary or at end of input, so quoted fields may span line breaks.

use crate::core::record::Record;
use crate::error::{ParseErrorKind, Result, XsvError};

/// Characters accepted as CSV separators.
pub const VALID_SEPARATORS: &str = ",; :|/*\\#+_";

/// Returns the separator if it is one of [`VALID_SEPARATORS`].
pub fn validate_separator(separator: char) -> Result<char> {
    if VALID_SEPARATORS.contains(separator) {
        Ok(separator)
    } else {
        Err(XsvError::InvalidSeparator(separator))
    }
}

/// The quote character that opened a quoted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    Double,
    Single,
}

impl Quote {
    pub fn as_char(self) -> char {
        match self {
            Quote::Double => '"',
            Quote::Single => '\'',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Start of a record.
    Main,
    /// Just after a separator; another field follows.
    FieldPending,
    UnquotedField,
    /// After a carriage return, expecting the line feed.
    WaitForLineFeed,
    QuotedField(Quote),
    /// After a quote inside a quoted field: either a doubled quote or the end
    /// of the field.
    QuotedFieldEscape(Quote),
    Done,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Char(char),
    EndOfInput,
}

/// What the automaton does with its buffers on a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Append(char),
    PushField { quoted: bool },
    EndRecord,
    PushFieldAndEndRecord { quoted: bool },
}

/// Why a transition was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Malformed(ParseErrorKind),
    /// Input after end of input.
    AfterDone,
    /// Input after a previous failure.
    AfterError,
}

impl Fault {
    /// Converts into a crate error, attributing malformed input to `line`.
    pub fn into_error(self, line: usize) -> XsvError {
        match self {
            Fault::Malformed(kind) => XsvError::Malformed { line, kind },
            Fault::AfterDone => {
                XsvError::Usage("attempt to continue parsing after end of input".to_string())
            }
            Fault::AfterError => {
                XsvError::Usage("attempt to recover after a previous parse error".to_string())
            }
        }
    }
}

/// The parts of the configuration the transition function depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub separator: char,
    pub single_quotes: bool,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            separator: ',',
            single_quotes: false,
        }
    }
}

pub type Transition = std::result::Result<(State, Action), Fault>;

fn malformed(kind: ParseErrorKind) -> Transition {
    Err(Fault::Malformed(kind))
}

/// Computes the next state and the buffer action for one input.
pub fn transition(state: State, input: Input, dialect: &Dialect) -> Transition {
    match state {
        State::Done => Err(Fault::AfterDone),
        State::Error => Err(Fault::AfterError),
        State::Main => field_start(false, input, dialect),
        State::FieldPending => field_start(true, input, dialect),
        State::UnquotedField => unquoted_field(input, dialect),
        State::WaitForLineFeed => match input {
            Input::Char('\n') => Ok((State::Main, Action::EndRecord)),
            _ => malformed(ParseErrorKind::ExpectedLineFeed),
        },
        State::QuotedField(quote) => quoted_field(quote, input),
        State::QuotedFieldEscape(quote) => quoted_field_escape(quote, input, dialect),
    }
}

/// `Main` and `FieldPending` differ only in whether a field is owed: after a
/// separator, a terminator still closes an (empty) field.
fn field_start(pending: bool, input: Input, dialect: &Dialect) -> Transition {
    let ch = match input {
        Input::EndOfInput if pending => {
            return Ok((State::Done, Action::PushFieldAndEndRecord { quoted: false }));
        }
        Input::EndOfInput => return Ok((State::Done, Action::None)),
        Input::Char(ch) => ch,
    };
    match ch {
        '\r' if pending => Ok((State::WaitForLineFeed, Action::PushField { quoted: false })),
        '\r' => Ok((State::WaitForLineFeed, Action::None)),
        '\n' => malformed(ParseErrorKind::LineFeedWithoutCarriageReturn),
        '"' => Ok((State::QuotedField(Quote::Double), Action::None)),
        '\'' if dialect.single_quotes => Ok((State::QuotedField(Quote::Single), Action::None)),
        ch if ch == dialect.separator => {
            Ok((State::FieldPending, Action::PushField { quoted: false }))
        }
        ch => Ok((State::UnquotedField, Action::Append(ch))),
    }
}

fn unquoted_field(input: Input, dialect: &Dialect) -> Transition {
    let ch = match input {
        Input::EndOfInput => {
            return Ok((State::Done, Action::PushFieldAndEndRecord { quoted: false }));
        }
        Input::Char(ch) => ch,
    };
    match ch {
        '\r' => Ok((State::WaitForLineFeed, Action::PushField { quoted: false })),
        '\n' => malformed(ParseErrorKind::LineFeedWithoutCarriageReturn),
        '"' => malformed(ParseErrorKind::QuoteInUnquotedField),
        // a single quote inside an unquoted field is always literal
        ch if ch == dialect.separator => {
            Ok((State::FieldPending, Action::PushField { quoted: false }))
        }
        ch => Ok((State::UnquotedField, Action::Append(ch))),
    }
}

fn quoted_field(quote: Quote, input: Input) -> Transition {
    match input {
        Input::EndOfInput => malformed(ParseErrorKind::EndOfInputInQuotedField),
        Input::Char(ch) if ch == quote.as_char() => {
            Ok((State::QuotedFieldEscape(quote), Action::None))
        }
        Input::Char(ch) => Ok((State::QuotedField(quote), Action::Append(ch))),
    }
}

fn quoted_field_escape(quote: Quote, input: Input, dialect: &Dialect) -> Transition {
    let ch = match input {
        Input::EndOfInput => {
            return Ok((State::Done, Action::PushFieldAndEndRecord { quoted: true }));
        }
        Input::Char(ch) => ch,
    };
    match ch {
        '\r' => Ok((State::WaitForLineFeed, Action::PushField { quoted: true })),
        '\n' => malformed(ParseErrorKind::LineFeedWithoutCarriageReturn),
        ch if ch == quote.as_char() => Ok((State::QuotedField(quote), Action::Append(ch))),
        ch if ch == dialect.separator => {
            Ok((State::FieldPending, Action::PushField { quoted: true }))
        }
        ch => malformed(ParseErrorKind::UnexpectedAfterQuote(ch)),
    }
}

/// Stateful CSV parser fed one character at a time.
///
/// The automaton cannot be restarted: once it reached [`State::Done`] or
/// [`State::Error`] every further input is refused.
///
/// ```
/// use xsvlib::item::csv::parser::{CsvAutomaton, Input};
///
/// let mut automaton = CsvAutomaton::new(',').unwrap();
/// let mut records = Vec::new();
/// for ch in "a,\"b,c\"\r\n".chars() {
///     if let Some(record) = automaton.feed(Input::Char(ch)).unwrap() {
///         records.push(record);
///     }
/// }
/// assert!(automaton.feed(Input::EndOfInput).unwrap().is_none());
/// assert_eq!(records, vec![vec!["a", "b,c"]]);
/// ```
#[derive(Debug, Clone)]
pub struct CsvAutomaton {
    state: State,
    dialect: Dialect,
    trim_spaces: bool,
    skip_empty_fields: bool,
    field: String,
    record: Record,
}

impl CsvAutomaton {
    /// Creates an automaton that trims unquoted fields, keeps empty fields and
    /// only recognizes double quotes.
    pub fn new(separator: char) -> Result<Self> {
        Ok(Self {
            state: State::Main,
            dialect: Dialect {
                separator: validate_separator(separator)?,
                single_quotes: false,
            },
            trim_spaces: true,
            skip_empty_fields: false,
            field: String::new(),
            record: Record::new(),
        })
    }

    pub fn trim_spaces(mut self, yes: bool) -> Self {
        self.trim_spaces = yes;
        self
    }

    /// Drop empty unquoted fields. Quoted empty fields are always kept.
    pub fn skip_empty_fields(mut self, yes: bool) -> Self {
        self.skip_empty_fields = yes;
        self
    }

    pub fn single_quotes(mut self, yes: bool) -> Self {
        self.dialect.single_quotes = yes;
        self
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Feeds one input. Returns the completed record, if this input completed one.
    ///
    /// On a fault the automaton moves to [`State::Error`] and the partial
    /// record is discarded.
    pub fn feed(&mut self, input: Input) -> std::result::Result<Option<Record>, Fault> {
        let (next, action) = match transition(self.state, input, &self.dialect) {
            Ok(step) => step,
            Err(fault) => {
                self.state = State::Error;
                self.field.clear();
                self.record.clear();
                return Err(fault);
            }
        };
        self.state = next;
        match action {
            Action::None => Ok(None),
            Action::Append(ch) => {
                self.field.push(ch);
                Ok(None)
            }
            Action::PushField { quoted } => {
                self.push_field(quoted);
                Ok(None)
            }
            Action::EndRecord => Ok(Some(std::mem::take(&mut self.record))),
            Action::PushFieldAndEndRecord { quoted } => {
                self.push_field(quoted);
                Ok(Some(std::mem::take(&mut self.record)))
            }
        }
    }

    fn push_field(&mut self, quoted: bool) {
        let mut value = std::mem::take(&mut self.field);
        if !quoted && self.trim_spaces {
            let trimmed = value.trim();
            if trimmed.len() != value.len() {
                value = trimmed.to_string();
            }
        }
        if quoted || !self.skip_empty_fields || !value.is_empty() {
            self.record.push(value);
        }
    }
}
