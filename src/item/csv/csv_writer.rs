use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use log::debug;

use crate::core::record::{LineFrame, RecordWriter};
use crate::error::Result;
use crate::item::csv::parser::validate_separator;
use crate::item::options::{LineTerminator, WriteOptions};

/// Characters that force a field into quotes, besides the separator itself.
const QUOTE_TRIGGERS: &[char] = &[',', ';', '"', '\'', '\r', '\n'];

pub struct CsvWriter<W: Write> {
    sink: W,
    frame: LineFrame,
    separator: char,
    quote_always: bool,
    terminator: LineTerminator,
}

impl<W: Write> CsvWriter<W> {
    pub fn separator(&self) -> char {
        self.separator
    }

    pub fn lines_written(&self) -> usize {
        self.frame.lines_written()
    }

    /// Returns the sink. Every finished line has already been handed to it.
    pub fn into_inner(self) -> W {
        self.sink
    }

    fn needs_quoting(&self, field: &str) -> bool {
        if self.quote_always {
            return true;
        }
        if field.is_empty() {
            return false;
        }
        field.contains(self.separator)
            || field.contains(QUOTE_TRIGGERS)
            || field.starts_with(char::is_whitespace)
            || field.ends_with(char::is_whitespace)
    }
}

impl<W: Write> RecordWriter for CsvWriter<W> {
    fn field_count(&self) -> usize {
        self.frame.field_count()
    }

    fn start_line(&mut self) -> Result<()> {
        self.frame.start()
    }

    fn write_field(&mut self, field: &str) -> Result<()> {
        let quoted = self.needs_quoting(field);
        let line = self.frame.begin_field(self.separator)?;
        if quoted {
            line.push('"');
            for ch in field.chars() {
                if ch == '"' {
                    line.push('"');
                }
                line.push(ch);
            }
            line.push('"');
        } else {
            line.push_str(field);
        }
        Ok(())
    }

    fn finish_line(&mut self) -> Result<()> {
        self.frame.finish(&mut self.sink, self.terminator.as_str())
    }

    fn finish_file(&mut self) -> Result<()> {
        self.frame.finish_file()?;
        self.sink.flush()?;
        debug!("Finished CSV output after {} line(s)", self.frame.lines_written());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.sink.flush()?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CsvWriterBuilder {
    separator: char,
    field_count: usize,
    quote_always: bool,
    line_terminator: LineTerminator,
}

impl Default for CsvWriterBuilder {
    fn default() -> Self {
        Self::from_options(&WriteOptions::default())
    }
}

impl CsvWriterBuilder {
    pub fn new() -> CsvWriterBuilder {
        CsvWriterBuilder::default()
    }

    pub fn from_options(options: &WriteOptions) -> CsvWriterBuilder {
        CsvWriterBuilder {
            separator: options.separator,
            field_count: options.field_count,
            quote_always: options.quote_always,
            line_terminator: options.line_terminator,
        }
    }

    pub fn separator(mut self, separator: char) -> CsvWriterBuilder {
        self.separator = separator;
        self
    }

    /// Every line must have exactly this many fields; 0 disables the check.
    pub fn field_count(mut self, field_count: usize) -> CsvWriterBuilder {
        self.field_count = field_count;
        self
    }

    pub fn quote_always(mut self, yes: bool) -> CsvWriterBuilder {
        self.quote_always = yes;
        self
    }

    pub fn line_terminator(mut self, terminator: LineTerminator) -> CsvWriterBuilder {
        self.line_terminator = terminator;
        self
    }

    /// Creates the file, truncating it. The separator is validated first, so
    /// an invalid configuration never leaves an empty file behind.
    pub fn from_path<R: AsRef<Path>>(self, path: R) -> Result<CsvWriter<BufWriter<File>>> {
        validate_separator(self.separator)?;
        let path = path.as_ref();
        let file = File::create(path)?;
        debug!("Writing CSV file {}", path.display());
        self.from_writer(BufWriter::new(file))
    }

    /// # Examples
    ///
    /// ```
    /// use xsvlib::core::record::{RecordWriter, RecordWriterExt};
    /// use xsvlib::item::csv::csv_writer::CsvWriterBuilder;
    ///
    /// # fn main() -> xsvlib::Result<()> {
    /// let mut writer = CsvWriterBuilder::new().field_count(2).from_writer(vec![])?;
    /// writer.write_line(["city", "motto"])?;
    /// writer.write_line(["Paris", "Fluctuat nec mergitur, \"really\""])?;
    /// writer.finish_file()?;
    ///
    /// let data = String::from_utf8(writer.into_inner()).unwrap();
    /// assert_eq!(data, "city,motto\nParis,\"Fluctuat nec mergitur, \"\"really\"\"\"\n");
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_writer<W: Write>(self, wtr: W) -> Result<CsvWriter<W>> {
        Ok(CsvWriter {
            sink: wtr,
            frame: LineFrame::new("CSV", self.field_count),
            separator: validate_separator(self.separator)?,
            quote_always: self.quote_always,
            terminator: self.line_terminator,
        })
    }
}
