use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::{debug, error};

use crate::core::lines::{LinesReader, MemoryLinesReader, StreamLinesReader};
use crate::core::record::{RecordReader, RecordReaderResult};
use crate::error::Result;
use crate::item::options::ReadOptions;

/// Splits each line on tabs. There is no quoting: a field is whatever lies
/// between two tabs, spaces included.
///
/// ```
/// use xsvlib::core::record::RecordReaderExt;
/// use xsvlib::item::tsv::tsv_reader::TsvReaderBuilder;
///
/// let mut reader = TsvReaderBuilder::new().from_reader("a\t\"b\"\n c \t\n".as_bytes());
///
/// assert_eq!(
///     reader.load_all().unwrap(),
///     vec![vec!["a", "\"b\""], vec![" c ", ""]]
/// );
/// ```
pub struct TsvReader<L> {
    lines: L,
    skip_empty_lines: bool,
    finished: bool,
}

impl<L: LinesReader> TsvReader<L> {
    pub fn line_number(&self) -> usize {
        self.lines.line_number()
    }

    pub fn into_inner(self) -> L {
        self.lines
    }
}

impl<L: LinesReader> RecordReader for TsvReader<L> {
    fn read(&mut self) -> RecordReaderResult {
        while !self.finished {
            match self.lines.next_line() {
                Some(Ok(line)) if line.is_empty() && self.skip_empty_lines => continue,
                Some(Ok(line)) => {
                    return Ok(Some(line.split('\t').map(str::to_string).collect()));
                }
                Some(Err(err)) => {
                    error!("Failed to read TSV input: {}", err);
                    self.finished = true;
                    return Err(err);
                }
                None => self.finished = true,
            }
        }
        Ok(None)
    }
}

#[derive(Debug, Clone)]
pub struct TsvReaderBuilder {
    skip_empty_lines: bool,
}

impl Default for TsvReaderBuilder {
    fn default() -> Self {
        Self::from_options(&ReadOptions::default())
    }
}

impl TsvReaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only `skip_empty_lines` applies to TSV; the CSV settings are ignored.
    pub fn from_options(options: &ReadOptions) -> Self {
        Self {
            skip_empty_lines: options.skip_empty_lines,
        }
    }

    /// When empty lines are kept, each one reads as a single empty field.
    pub fn skip_empty_lines(mut self, yes: bool) -> Self {
        self.skip_empty_lines = yes;
        self
    }

    pub fn from_lines<L: LinesReader>(self, lines: L) -> TsvReader<L> {
        TsvReader {
            lines,
            skip_empty_lines: self.skip_empty_lines,
            finished: false,
        }
    }

    pub fn from_reader<R: Read>(self, reader: R) -> TsvReader<StreamLinesReader<BufReader<R>>> {
        self.from_lines(StreamLinesReader::new(BufReader::new(reader)))
    }

    pub fn from_path<P: AsRef<Path>>(
        self,
        path: P,
    ) -> Result<TsvReader<StreamLinesReader<BufReader<File>>>> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| {
            error!("Failed to open TSV file {}: {}", path.display(), err);
            err
        })?;
        debug!("Reading TSV file {}", path.display());
        Ok(self.from_reader(file))
    }

    pub fn from_strings<I>(self, lines: I) -> TsvReader<MemoryLinesReader<I::IntoIter>>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.from_lines(MemoryLinesReader::new(lines))
    }
}
