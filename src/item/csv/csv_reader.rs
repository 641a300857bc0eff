use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::{debug, error};

use crate::core::lines::{LinesReader, MemoryLinesReader, StreamLinesReader};
use crate::core::record::{Record, RecordReader, RecordReaderResult};
use crate::error::{Result, XsvError};
use crate::item::csv::parser::{validate_separator, CsvAutomaton, Input, State};
use crate::item::options::ReadOptions;

/// A CSV record reader on top of any [`LinesReader`].
///
/// Each line is fed to a [`CsvAutomaton`] followed by its line break, and end
/// of input is signalled once the lines run out. A quoted field may span
/// several physical lines and keeps their line breaks exactly as the source
/// wrote them. Outside a quoted field every line break ends the record.
///
/// Empty lines are skipped between records when configured. Inside a quoted
/// field they are content and always kept.
///
/// Errors carry the number of the physical line being parsed. After an error
/// the reader is finished and returns `Ok(None)`.
///
/// # Examples
///
/// ```
/// use xsvlib::core::record::RecordReaderExt;
/// use xsvlib::item::csv::csv_reader::CsvReaderBuilder;
///
/// let data = "name,comment\nAlice,\"likes \"\"quotes\"\"\"\nBob, trimmed \n";
///
/// let mut reader = CsvReaderBuilder::new().from_reader(data.as_bytes()).unwrap();
/// let records = reader.load_all().unwrap();
///
/// assert_eq!(records.len(), 3);
/// assert_eq!(records[1], vec!["Alice", "likes \"quotes\""]);
/// assert_eq!(records[2], vec!["Bob", "trimmed"]);
/// ```
pub struct CsvReader<L> {
    lines: L,
    automaton: CsvAutomaton,
    skip_empty_lines: bool,
    pending: VecDeque<Record>,
    finished: bool,
}

impl<L: LinesReader> CsvReader<L> {
    fn new(lines: L, automaton: CsvAutomaton, skip_empty_lines: bool) -> Self {
        Self {
            lines,
            automaton,
            skip_empty_lines,
            pending: VecDeque::new(),
            finished: false,
        }
    }

    /// Number of the physical line most recently read.
    pub fn line_number(&self) -> usize {
        self.lines.line_number()
    }

    pub fn into_inner(self) -> L {
        self.lines
    }

    fn feed(&mut self, input: Input) -> Result<()> {
        match self.automaton.feed(input) {
            Ok(Some(record)) => {
                self.pending.push_back(record);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(fault) => Err(self.fail(fault.into_error(self.lines.line_number()))),
        }
    }

    fn feed_line(&mut self, line: &str, terminator: &str) -> Result<()> {
        for ch in line.chars() {
            self.feed(Input::Char(ch))?;
        }
        // A line break inside a quoted field is content; anywhere else it
        // ends the record, which the automaton expects as CRLF.
        let line_break = match self.automaton.state() {
            State::QuotedField(_) => terminator,
            _ => "\r\n",
        };
        for ch in line_break.chars() {
            self.feed(Input::Char(ch))?;
        }
        Ok(())
    }

    fn fail(&mut self, error: XsvError) -> XsvError {
        error!("Failed to read CSV input: {}", error);
        self.finished = true;
        self.pending.clear();
        error
    }
}

impl<L: LinesReader> RecordReader for CsvReader<L> {
    fn read(&mut self) -> RecordReaderResult {
        loop {
            if let Some(record) = self.pending.pop_front() {
                return Ok(Some(record));
            }
            if self.finished {
                return Ok(None);
            }
            match self.lines.next_line() {
                Some(Ok(line)) => {
                    if line.is_empty()
                        && self.skip_empty_lines
                        && self.automaton.state() == State::Main
                    {
                        continue;
                    }
                    let terminator = self.lines.terminator();
                    self.feed_line(&line, terminator)?;
                }
                Some(Err(error)) => return Err(self.fail(error)),
                None => {
                    self.finished = true;
                    self.feed(Input::EndOfInput)?;
                }
            }
        }
    }
}

/// A builder for [`CsvReader`].
///
/// Defaults: comma separator, blank lines skipped, unquoted fields trimmed,
/// empty fields kept, double quotes only.
///
/// ```
/// use xsvlib::core::record::RecordReaderExt;
/// use xsvlib::item::csv::csv_reader::CsvReaderBuilder;
///
/// let mut reader = CsvReaderBuilder::new()
///     .separator(';')
///     .single_quotes(true)
///     .skip_empty_fields(true)
///     .from_strings(vec!["'a;b';;c"])
///     .unwrap();
///
/// assert_eq!(reader.load_all().unwrap(), vec![vec!["a;b", "c"]]);
/// ```
#[derive(Debug, Clone)]
pub struct CsvReaderBuilder {
    separator: char,
    skip_empty_lines: bool,
    trim_spaces: bool,
    skip_empty_fields: bool,
    single_quotes: bool,
}

impl Default for CsvReaderBuilder {
    fn default() -> Self {
        Self::from_options(&ReadOptions::default())
    }
}

impl CsvReaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes every setting from `options`.
    pub fn from_options(options: &ReadOptions) -> Self {
        Self {
            separator: options.separator,
            skip_empty_lines: options.skip_empty_lines,
            trim_spaces: options.trim_spaces,
            skip_empty_fields: options.skip_empty_fields,
            single_quotes: options.single_quotes,
        }
    }

    /// Sets the field separator. It must be one of
    /// [`VALID_SEPARATORS`](crate::item::csv::parser::VALID_SEPARATORS);
    /// this is checked when the reader is built.
    pub fn separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Skips empty lines between records. Empty lines inside a quoted field
    /// are always kept.
    pub fn skip_empty_lines(mut self, yes: bool) -> Self {
        self.skip_empty_lines = yes;
        self
    }

    pub fn trim_spaces(mut self, yes: bool) -> Self {
        self.trim_spaces = yes;
        self
    }

    pub fn skip_empty_fields(mut self, yes: bool) -> Self {
        self.skip_empty_fields = yes;
        self
    }

    pub fn single_quotes(mut self, yes: bool) -> Self {
        self.single_quotes = yes;
        self
    }

    fn automaton(&self) -> Result<CsvAutomaton> {
        Ok(CsvAutomaton::new(self.separator)?
            .trim_spaces(self.trim_spaces)
            .skip_empty_fields(self.skip_empty_fields)
            .single_quotes(self.single_quotes))
    }

    /// Builds a reader over an existing line source.
    pub fn from_lines<L: LinesReader>(self, lines: L) -> Result<CsvReader<L>> {
        Ok(CsvReader::new(lines, self.automaton()?, self.skip_empty_lines))
    }

    pub fn from_reader<R: Read>(
        self,
        reader: R,
    ) -> Result<CsvReader<StreamLinesReader<BufReader<R>>>> {
        self.from_lines(StreamLinesReader::new(BufReader::new(reader)))
    }

    /// Opens a file. The separator is validated before the file is touched.
    pub fn from_path<P: AsRef<Path>>(
        self,
        path: P,
    ) -> Result<CsvReader<StreamLinesReader<BufReader<File>>>> {
        validate_separator(self.separator)?;
        let path = path.as_ref();
        let file = File::open(path).map_err(|error| {
            error!("Failed to open CSV file {}: {}", path.display(), error);
            error
        })?;
        debug!("Reading CSV file {}", path.display());
        self.from_reader(file)
    }

    /// Builds a reader over in-memory lines.
    pub fn from_strings<I>(self, lines: I) -> Result<CsvReader<MemoryLinesReader<I::IntoIter>>>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.from_lines(MemoryLinesReader::new(lines))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::core::record::{RecordReaderExt, RecordWriter, RecordWriterExt};
    use crate::error::ParseErrorKind;
    use crate::item::csv::csv_writer::CsvWriterBuilder;
    use crate::item::options::LineTerminator;

    fn read_all(data: &str) -> Result<Vec<Record>> {
        CsvReaderBuilder::new().from_reader(data.as_bytes())?.load_all()
    }

    #[test]
    fn quote_doubling_and_trimming() {
        let records = read_all(
            "\"hello, world!\",\"hello\",\"\"\"world\"\"\"\n1,2 ,3\n\" 1\", 2 ,\"3 \"\n",
        )
        .unwrap();
        assert_eq!(
            records,
            vec![
                vec!["hello, world!", "hello", "\"world\""],
                vec!["1", "2", "3"],
                vec![" 1", "2", "3 "],
            ]
        );
    }

    #[test]
    fn last_line_without_terminator_is_read() {
        assert_eq!(read_all("a,b\nc,d").unwrap(), vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn trailing_separator_yields_trailing_empty_field() {
        assert_eq!(read_all("a,\n").unwrap(), vec![vec!["a", ""]]);
    }

    #[test]
    fn quoted_field_spans_lines() {
        let records = read_all("id,text\n1,\"first\nsecond\"\n2,plain\n").unwrap();
        assert_eq!(
            records,
            vec![
                vec!["id", "text"],
                vec!["1", "first\nsecond"],
                vec!["2", "plain"],
            ]
        );
    }

    #[test]
    fn quoted_line_breaks_keep_their_source_form() {
        let records = read_all("a,\"crlf\r\nbreak\"\r\nb,\"lf\nbreak\"\n").unwrap();
        assert_eq!(
            records,
            vec![vec!["a", "crlf\r\nbreak"], vec!["b", "lf\nbreak"]]
        );
    }

    #[test]
    fn blank_line_inside_quoted_field_is_kept() {
        let records = read_all("a,\"x\r\n\r\ny\"\r\n\r\nb,c\r\n").unwrap();
        assert_eq!(records, vec![vec!["a", "x\r\n\r\ny"], vec!["b", "c"]]);

        let mut reader = CsvReaderBuilder::new()
            .from_strings(vec!["\"x", "", "y\"", ""])
            .unwrap();
        assert_eq!(reader.load_all().unwrap(), vec![vec!["x\r\n\r\ny"]]);
    }

    #[test]
    fn written_line_breaks_survive_a_round_trip() {
        for terminator in [LineTerminator::Lf, LineTerminator::CrLf] {
            let records = vec![
                vec!["a".to_string(), "x\r\n\r\ny".to_string()],
                vec!["b".to_string(), "x\ny".to_string()],
                vec!["c".to_string(), "\n\n".to_string()],
            ];
            let mut writer = CsvWriterBuilder::new()
                .line_terminator(terminator)
                .from_writer(Vec::new())
                .unwrap();
            for record in &records {
                writer.write_line(record).unwrap();
            }
            writer.finish_file().unwrap();
            let data = writer.into_inner();

            let mut reader = CsvReaderBuilder::new().from_reader(data.as_slice()).unwrap();
            assert_eq!(reader.load_all().unwrap(), records);
        }
    }

    #[test]
    fn lone_carriage_return_at_end_of_input_ends_the_record() {
        assert_eq!(read_all("a,b\r").unwrap(), vec![vec!["a", "b"]]);
    }

    #[test]
    fn empty_lines_are_skipped_by_default() {
        assert_eq!(read_all("a\n\n\nb\n").unwrap(), vec![vec!["a"], vec!["b"]]);
    }

    #[test]
    fn kept_empty_line_is_an_empty_record() {
        let mut reader = CsvReaderBuilder::new()
            .skip_empty_lines(false)
            .from_reader("a\n\nb".as_bytes())
            .unwrap();
        assert_eq!(
            reader.load_all().unwrap(),
            vec![vec!["a".to_string()], vec![], vec!["b".to_string()]]
        );
    }

    #[test]
    fn malformed_input_reports_its_line() {
        let mut reader = CsvReaderBuilder::new()
            .from_reader(Cursor::new("a,b\nc,d\ne,f\"g\nh,i\n"))
            .unwrap();

        assert!(reader.read().unwrap().is_some());
        assert!(reader.read().unwrap().is_some());
        match reader.read() {
            Err(XsvError::Malformed { line, kind }) => {
                assert_eq!(line, 3);
                assert_eq!(kind, ParseErrorKind::QuoteInUnquotedField);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(reader.read().unwrap().is_none());
    }

    #[test]
    fn unterminated_quote_is_reported_at_end_of_input() {
        let error = read_all("a\n\"open\nstill open\n").unwrap_err();
        assert!(matches!(
            error,
            XsvError::Malformed {
                line: 3,
                kind: ParseErrorKind::EndOfInputInQuotedField
            }
        ));
    }

    #[test]
    fn invalid_separator_is_rejected_before_reading() {
        let result = CsvReaderBuilder::new().separator('\t').from_strings(vec!["a"]);
        assert!(matches!(result, Err(XsvError::InvalidSeparator('\t'))));

        let result = CsvReaderBuilder::new()
            .separator('x')
            .from_path("/definitely/not/there.csv");
        assert!(matches!(result, Err(XsvError::InvalidSeparator('x'))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = CsvReaderBuilder::new().from_path("/definitely/not/there.csv");
        assert!(matches!(result, Err(XsvError::Io(_))));
    }

    #[test]
    fn builder_follows_read_options() {
        let options = ReadOptions {
            separator: '|',
            trim_spaces: false,
            ..ReadOptions::default()
        };
        let mut reader = CsvReaderBuilder::from_options(&options)
            .from_strings(vec![" a | b "])
            .unwrap();
        assert_eq!(reader.load_all().unwrap(), vec![vec![" a ", " b "]]);
    }
}
