use std::io::Write;
use std::iter::FusedIterator;

use crate::error::{Result, XsvError};

/// One row's ordered field values, addressed by position only.
pub type Record = Vec<String>;

/// Represents the result of reading one record.
///
/// - `Ok(Some(record))` when a record was read,
/// - `Ok(None)` when the source is exhausted,
/// - `Err(error)` when the source is malformed or could not be read. A reader
///   that returned an error is finished and only returns `Ok(None)` afterwards.
pub type RecordReaderResult = Result<Option<Record>>;

/// A lazy, single-pass, forward-only source of records.
///
/// Reading is pull-based: nothing is read ahead of the record being returned.
/// A reader cannot be restarted; reopen the underlying source instead.
pub trait RecordReader {
    fn read(&mut self) -> RecordReaderResult;
}

impl<R: RecordReader + ?Sized> RecordReader for Box<R> {
    fn read(&mut self) -> RecordReaderResult {
        (**self).read()
    }
}

impl<R: RecordReader + ?Sized> RecordReader for &mut R {
    fn read(&mut self) -> RecordReaderResult {
        (**self).read()
    }
}

/// A field-by-field sink for records.
///
/// Every line is framed by [`start_line`](RecordWriter::start_line) and
/// [`finish_line`](RecordWriter::finish_line); [`finish_file`](RecordWriter::finish_file)
/// verifies that no line was left incomplete. When [`field_count`](RecordWriter::field_count)
/// is non-zero every line must contain exactly that many fields.
pub trait RecordWriter {
    /// The enforced number of fields per line, or 0 when unchecked.
    fn field_count(&self) -> usize;

    fn start_line(&mut self) -> Result<()>;

    fn write_field(&mut self, field: &str) -> Result<()>;

    fn finish_line(&mut self) -> Result<()>;

    fn finish_file(&mut self) -> Result<()>;

    /// Flush the underlying sink.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<W: RecordWriter + ?Sized> RecordWriter for Box<W> {
    fn field_count(&self) -> usize {
        (**self).field_count()
    }

    fn start_line(&mut self) -> Result<()> {
        (**self).start_line()
    }

    fn write_field(&mut self, field: &str) -> Result<()> {
        (**self).write_field(field)
    }

    fn finish_line(&mut self) -> Result<()> {
        (**self).finish_line()
    }

    fn finish_file(&mut self) -> Result<()> {
        (**self).finish_file()
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

impl<W: RecordWriter + ?Sized> RecordWriter for &mut W {
    fn field_count(&self) -> usize {
        (**self).field_count()
    }

    fn start_line(&mut self) -> Result<()> {
        (**self).start_line()
    }

    fn write_field(&mut self, field: &str) -> Result<()> {
        (**self).write_field(field)
    }

    fn finish_line(&mut self) -> Result<()> {
        (**self).finish_line()
    }

    fn finish_file(&mut self) -> Result<()> {
        (**self).finish_file()
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

/// Iteration helpers available on every [`RecordReader`].
pub trait RecordReaderExt: RecordReader {
    /// Borrowing iterator over the remaining records. Stops after the first error.
    fn records(&mut self) -> Records<'_, Self> {
        Records {
            reader: self,
            done: false,
        }
    }

    /// Owning iterator over the remaining records. Stops after the first error.
    fn into_records(self) -> RecordsIntoIter<Self>
    where
        Self: Sized,
    {
        RecordsIntoIter {
            reader: self,
            done: false,
        }
    }

    /// Reads every remaining record into memory.
    fn load_all(&mut self) -> Result<Vec<Record>> {
        self.records().collect()
    }
}

impl<R: RecordReader + ?Sized> RecordReaderExt for R {}

/// Convenience methods available on every [`RecordWriter`].
pub trait RecordWriterExt: RecordWriter {
    /// Writes a complete line: start, all fields, finish.
    fn write_line<I>(&mut self, fields: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.start_line()?;
        self.write_fields(fields)?;
        self.finish_line()
    }

    fn write_fields<I>(&mut self, fields: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for field in fields {
            self.write_field(field.as_ref())?;
        }
        Ok(())
    }
}

impl<W: RecordWriter + ?Sized> RecordWriterExt for W {}

fn next_record<R: RecordReader + ?Sized>(reader: &mut R, done: &mut bool) -> Option<Result<Record>> {
    if *done {
        return None;
    }
    match reader.read() {
        Ok(Some(record)) => Some(Ok(record)),
        Ok(None) => {
            *done = true;
            None
        }
        Err(error) => {
            *done = true;
            Some(Err(error))
        }
    }
}

/// Borrowing record iterator returned by [`RecordReaderExt::records`].
pub struct Records<'a, R: ?Sized> {
    reader: &'a mut R,
    done: bool,
}

impl<R: RecordReader + ?Sized> Iterator for Records<'_, R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        next_record(&mut *self.reader, &mut self.done)
    }
}

impl<R: RecordReader + ?Sized> FusedIterator for Records<'_, R> {}

/// Owning record iterator returned by [`RecordReaderExt::into_records`].
pub struct RecordsIntoIter<R> {
    reader: R,
    done: bool,
}

impl<R> RecordsIntoIter<R> {
    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: RecordReader> Iterator for RecordsIntoIter<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        next_record(&mut self.reader, &mut self.done)
    }
}

impl<R: RecordReader> FusedIterator for RecordsIntoIter<R> {}

/// Per-line bookkeeping shared by the CSV and TSV writers.
///
/// Fields are assembled in memory and the line reaches the sink only on
/// [`finish`](LineFrame::finish), so a rejected field never leaves a partial
/// row behind.
#[derive(Debug)]
pub(crate) struct LineFrame {
    format: &'static str,
    field_count: usize,
    fields: usize,
    line: String,
    lines_written: usize,
}

impl LineFrame {
    pub(crate) fn new(format: &'static str, field_count: usize) -> Self {
        Self {
            format,
            field_count,
            fields: 0,
            line: String::new(),
            lines_written: 0,
        }
    }

    pub(crate) fn field_count(&self) -> usize {
        self.field_count
    }

    pub(crate) fn lines_written(&self) -> usize {
        self.lines_written
    }

    pub(crate) fn start(&self) -> Result<()> {
        if self.fields != 0 {
            return Err(XsvError::Usage(format!(
                "Another {} line was already in progress",
                self.format
            )));
        }
        Ok(())
    }

    /// Opens the next field slot and returns the line buffer to append it to.
    pub(crate) fn begin_field(&mut self, separator: char) -> Result<&mut String> {
        if self.field_count > 0 && self.fields >= self.field_count {
            return Err(XsvError::TooManyFields {
                format: self.format,
                expected: self.field_count,
            });
        }
        if self.fields > 0 {
            self.line.push(separator);
        }
        self.fields += 1;
        Ok(&mut self.line)
    }

    pub(crate) fn finish<W: Write>(&mut self, sink: &mut W, terminator: &str) -> Result<()> {
        if self.field_count > 0 && self.fields < self.field_count {
            return Err(XsvError::TooFewFields {
                format: self.format,
                expected: self.field_count,
                actual: self.fields,
            });
        }
        self.line.push_str(terminator);
        let written = sink.write_all(self.line.as_bytes());
        self.line.clear();
        self.fields = 0;
        written?;
        self.lines_written += 1;
        Ok(())
    }

    pub(crate) fn finish_file(&self) -> Result<()> {
        if self.fields > 0 {
            return Err(XsvError::Usage(format!(
                "Incomplete last {} line",
                self.format
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct VecReader {
        rows: std::vec::IntoIter<RecordReaderResult>,
    }

    impl RecordReader for VecReader {
        fn read(&mut self) -> RecordReaderResult {
            self.rows.next().unwrap_or(Ok(None))
        }
    }

    fn reader(rows: Vec<RecordReaderResult>) -> VecReader {
        VecReader {
            rows: rows.into_iter(),
        }
    }

    #[test]
    fn records_stop_after_first_error() {
        let mut rdr = reader(vec![
            Ok(Some(vec!["a".to_string()])),
            Err(XsvError::Exhausted),
            Ok(Some(vec!["b".to_string()])),
        ]);

        let collected: Vec<_> = rdr.records().collect();
        assert_eq!(collected.len(), 2);
        assert!(collected[0].is_ok());
        assert!(collected[1].is_err());
    }

    #[test]
    fn load_all_collects_owned_records() {
        let mut rdr = reader(vec![
            Ok(Some(vec!["a".to_string(), "b".to_string()])),
            Ok(Some(vec!["c".to_string()])),
        ]);

        let all = rdr.load_all().unwrap();
        assert_eq!(all, vec![vec!["a", "b"], vec!["c"]]);
    }

    #[test]
    fn line_frame_enforces_field_count() {
        let mut frame = LineFrame::new("CSV", 2);
        let mut sink = Vec::new();

        frame.begin_field(',').unwrap().push('a');
        assert!(matches!(
            frame.finish(&mut sink, "\n"),
            Err(XsvError::TooFewFields {
                expected: 2,
                actual: 1,
                ..
            })
        ));

        frame.begin_field(',').unwrap().push('b');
        assert!(matches!(
            frame.begin_field(','),
            Err(XsvError::TooManyFields { expected: 2, .. })
        ));
        frame.finish(&mut sink, "\n").unwrap();

        assert_eq!(sink, b"a,b\n");
        assert_eq!(frame.lines_written(), 1);
    }

    #[test]
    fn line_frame_detects_unfinished_line() {
        let mut frame = LineFrame::new("TSV", 0);
        frame.begin_field('\t').unwrap();
        assert!(matches!(frame.start(), Err(XsvError::Usage(_))));
        assert!(matches!(frame.finish_file(), Err(XsvError::Usage(_))));
    }
}
