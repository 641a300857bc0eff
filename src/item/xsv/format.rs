use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::core::cursor::RowCursor;
use crate::core::lines::{LinesReader, StreamLinesReader};
use crate::core::record::{RecordReader, RecordReaderResult, RecordWriter};
use crate::error::{Result, XsvError};
use crate::item::csv::csv_reader::{CsvReader, CsvReaderBuilder};
use crate::item::csv::csv_writer::{CsvWriter, CsvWriterBuilder};
use crate::item::options::{ReadOptions, WriteOptions};
use crate::item::tsv::tsv_reader::{TsvReader, TsvReaderBuilder};
use crate::item::tsv::tsv_writer::{TsvWriter, TsvWriterBuilder};
use crate::item::xsv::xsv_reader::{CursorReader, XsvReader};

/// Suffix a file being written may carry on top of its format extension,
/// as in `report.csv.tmp`.
pub const TRANSIENT_SUFFIX: &str = ".tmp";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum XsvFormat {
    Csv,
    Tsv,
}

impl XsvFormat {
    /// Picks the format from a file name's extension, ignoring case.
    ///
    /// With `allow_transient`, a trailing [`TRANSIENT_SUFFIX`] is ignored.
    ///
    /// ```
    /// use xsvlib::item::xsv::format::XsvFormat;
    ///
    /// assert_eq!(XsvFormat::from_filename("data.CSV", false).unwrap(), XsvFormat::Csv);
    /// assert_eq!(XsvFormat::from_filename("out.tsv.tmp", true).unwrap(), XsvFormat::Tsv);
    /// assert!(XsvFormat::from_filename("out.tsv.tmp", false).is_err());
    /// assert!(XsvFormat::from_filename("notes.txt", true).is_err());
    /// ```
    pub fn from_filename(name: &str, allow_transient: bool) -> Result<Self> {
        let lowered = name.to_ascii_lowercase();
        let mut stem = lowered.as_str();
        if allow_transient {
            stem = stem.strip_suffix(TRANSIENT_SUFFIX).unwrap_or(stem);
        }
        if stem.ends_with(".csv") {
            Ok(XsvFormat::Csv)
        } else if stem.ends_with(".tsv") {
            Ok(XsvFormat::Tsv)
        } else {
            error!("Unsupported file format: {}", name);
            Err(XsvError::UnsupportedFormat(name.to_string()))
        }
    }

    pub fn for_reading(name: &str) -> Result<Self> {
        Self::from_filename(name, false)
    }

    pub fn for_writing(name: &str) -> Result<Self> {
        Self::from_filename(name, true)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            XsvFormat::Csv => ".csv",
            XsvFormat::Tsv => ".tsv",
        }
    }
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| XsvError::UnsupportedFormat(path.display().to_string()))
}

/// A record reader for either format.
pub enum XsvRecordReader<L> {
    Csv(CsvReader<L>),
    Tsv(TsvReader<L>),
}

impl<L: LinesReader> XsvRecordReader<L> {
    pub fn format(&self) -> XsvFormat {
        match self {
            XsvRecordReader::Csv(_) => XsvFormat::Csv,
            XsvRecordReader::Tsv(_) => XsvFormat::Tsv,
        }
    }

    /// Builds a reader of the given format over an existing line source.
    pub fn from_lines(format: XsvFormat, lines: L, options: &ReadOptions) -> Result<Self> {
        Ok(match format {
            XsvFormat::Csv => {
                XsvRecordReader::Csv(CsvReaderBuilder::from_options(options).from_lines(lines)?)
            }
            XsvFormat::Tsv => {
                XsvRecordReader::Tsv(TsvReaderBuilder::from_options(options).from_lines(lines))
            }
        })
    }

    /// Splits off the header; see [`XsvReader`].
    pub fn with_header(self) -> Result<XsvReader<Self>> {
        XsvReader::new(self)
    }
}

impl<L: LinesReader> RecordReader for XsvRecordReader<L> {
    fn read(&mut self) -> RecordReaderResult {
        match self {
            XsvRecordReader::Csv(reader) => reader.read(),
            XsvRecordReader::Tsv(reader) => reader.read(),
        }
    }
}

/// A record writer for either format.
pub enum XsvRecordWriter<W: Write> {
    Csv(CsvWriter<W>),
    Tsv(TsvWriter<W>),
}

impl<W: Write> XsvRecordWriter<W> {
    pub fn format(&self) -> XsvFormat {
        match self {
            XsvRecordWriter::Csv(_) => XsvFormat::Csv,
            XsvRecordWriter::Tsv(_) => XsvFormat::Tsv,
        }
    }

    pub fn into_inner(self) -> W {
        match self {
            XsvRecordWriter::Csv(writer) => writer.into_inner(),
            XsvRecordWriter::Tsv(writer) => writer.into_inner(),
        }
    }
}

impl<W: Write> RecordWriter for XsvRecordWriter<W> {
    fn field_count(&self) -> usize {
        match self {
            XsvRecordWriter::Csv(writer) => writer.field_count(),
            XsvRecordWriter::Tsv(writer) => writer.field_count(),
        }
    }

    fn start_line(&mut self) -> Result<()> {
        match self {
            XsvRecordWriter::Csv(writer) => writer.start_line(),
            XsvRecordWriter::Tsv(writer) => writer.start_line(),
        }
    }

    fn write_field(&mut self, field: &str) -> Result<()> {
        match self {
            XsvRecordWriter::Csv(writer) => writer.write_field(field),
            XsvRecordWriter::Tsv(writer) => writer.write_field(field),
        }
    }

    fn finish_line(&mut self) -> Result<()> {
        match self {
            XsvRecordWriter::Csv(writer) => writer.finish_line(),
            XsvRecordWriter::Tsv(writer) => writer.finish_line(),
        }
    }

    fn finish_file(&mut self) -> Result<()> {
        match self {
            XsvRecordWriter::Csv(writer) => writer.finish_file(),
            XsvRecordWriter::Tsv(writer) => writer.finish_file(),
        }
    }

    fn flush(&mut self) -> Result<()> {
        match self {
            XsvRecordWriter::Csv(writer) => writer.flush(),
            XsvRecordWriter::Tsv(writer) => writer.flush(),
        }
    }
}

pub type StreamRecordReader<R> = XsvRecordReader<StreamLinesReader<BufReader<R>>>;

/// Opens a record reader over `reader`, with the format taken from `name`.
pub fn read_xsv<R: Read>(
    reader: R,
    name: &str,
    options: &ReadOptions,
) -> Result<StreamRecordReader<R>> {
    let format = XsvFormat::for_reading(name)?;
    let lines = StreamLinesReader::new(BufReader::new(reader));
    XsvRecordReader::from_lines(format, lines, options)
}

/// Opens a file for reading. An unknown extension or an invalid CSV separator
/// fails before the file is opened.
pub fn read_xsv_path<P: AsRef<Path>>(
    path: P,
    options: &ReadOptions,
) -> Result<StreamRecordReader<File>> {
    let path = path.as_ref();
    let format = XsvFormat::for_reading(&file_name(path)?)?;
    Ok(match format {
        XsvFormat::Csv => {
            XsvRecordReader::Csv(CsvReaderBuilder::from_options(options).from_path(path)?)
        }
        XsvFormat::Tsv => {
            XsvRecordReader::Tsv(TsvReaderBuilder::from_options(options).from_path(path)?)
        }
    })
}

/// Opens a file with a header and binds `cursor` to it.
///
/// Fails with [`XsvError::MissingColumns`] when the header lacks any column
/// the cursor declares.
pub fn read_xsv_cursor<P, C>(
    path: P,
    cursor: C,
    options: &ReadOptions,
) -> Result<CursorReader<StreamRecordReader<File>, C>>
where
    P: AsRef<Path>,
    C: RowCursor,
{
    let reader = read_xsv_path(path, options)?;
    reader.with_header()?.read_cursor(cursor)
}

/// Opens a record writer over `writer`, with the format taken from `name`.
/// `name` may carry the transient suffix.
pub fn write_xsv<W: Write>(
    writer: W,
    name: &str,
    options: &WriteOptions,
) -> Result<XsvRecordWriter<W>> {
    Ok(match XsvFormat::for_writing(name)? {
        XsvFormat::Csv => {
            XsvRecordWriter::Csv(CsvWriterBuilder::from_options(options).from_writer(writer)?)
        }
        XsvFormat::Tsv => {
            XsvRecordWriter::Tsv(TsvWriterBuilder::from_options(options).from_writer(writer))
        }
    })
}

/// Creates a file for writing. An unknown extension or an invalid CSV
/// separator fails before the file is created.
pub fn write_xsv_path<P: AsRef<Path>>(
    path: P,
    options: &WriteOptions,
) -> Result<XsvRecordWriter<BufWriter<File>>> {
    let path = path.as_ref();
    let format = XsvFormat::for_writing(&file_name(path)?)?;
    debug!("Opening {} as {:?}", path.display(), format);
    Ok(match format {
        XsvFormat::Csv => {
            XsvRecordWriter::Csv(CsvWriterBuilder::from_options(options).from_path(path)?)
        }
        XsvFormat::Tsv => {
            XsvRecordWriter::Tsv(TsvWriterBuilder::from_options(options).from_path(path)?)
        }
    })
}
