use crate::core::column_map::ColumnMap;
use crate::core::cursor::{RowCursor, XsvCursor};
use crate::core::record::{Record, RecordReader, RecordReaderExt, RecordsIntoIter};
use crate::core::subsequencer::{Rest, Subsequencer};
use crate::error::{Result, XsvError};

/// A record reader whose first record is a header.
///
/// The header is consumed on construction; the body is then available either
/// as plain records through [`records`](XsvReader::records) or through a
/// column-bound cursor with [`read_cursor`](XsvReader::read_cursor).
///
/// ```
/// use xsvlib::item::csv::csv_reader::CsvReaderBuilder;
/// use xsvlib::item::xsv::xsv_reader::XsvReader;
///
/// let csv = CsvReaderBuilder::new()
///     .from_strings(vec!["name,qty", "apple,3", "pear,5"])
///     .unwrap();
/// let mut reader = XsvReader::new(csv).unwrap();
///
/// assert_eq!(reader.header(), ["name", "qty"]);
/// let body = reader.load_all().unwrap();
/// assert_eq!(body, vec![vec!["apple", "3"], vec!["pear", "5"]]);
/// ```
pub struct XsvReader<R: RecordReader> {
    sequencer: Subsequencer<RecordsIntoIter<R>>,
    header: Record,
}

impl<R: RecordReader> XsvReader<R> {
    /// Reads the header. Fails with [`XsvError::MissingHeader`] on empty input.
    pub fn new(reader: R) -> Result<Self> {
        let mut sequencer = Subsequencer::new(reader.into_records());
        let header = match sequencer.next_or_none() {
            Some(header) => header?,
            None => return Err(XsvError::MissingHeader),
        };
        Ok(Self { sequencer, header })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// The records after the header.
    pub fn records(&mut self) -> Rest<'_, RecordsIntoIter<R>> {
        self.sequencer.rest()
    }

    pub fn load_all(&mut self) -> Result<Vec<Record>> {
        self.records().collect()
    }

    /// Binds the cursor's columns to the header and returns a reader that
    /// moves the cursor over the body.
    ///
    /// Fails with [`XsvError::MissingColumns`] naming every declared column the
    /// header lacks.
    pub fn read_cursor<C: RowCursor>(self, mut cursor: C) -> Result<CursorReader<R, C>> {
        let inner = cursor.cursor_mut();
        inner.columns_mut().require_bind(&self.header)?;
        inner.set_row(None);
        Ok(CursorReader {
            reader: self,
            cursor,
        })
    }

    /// Like [`read_cursor`](XsvReader::read_cursor) with a plain [`XsvCursor`].
    pub fn read_columns(self, columns: ColumnMap) -> Result<CursorReader<R, XsvCursor>> {
        self.read_cursor(XsvCursor::new(columns))
    }

    pub fn into_inner(self) -> R {
        self.sequencer.into_inner().into_inner()
    }
}

/// Moves a cursor over the body of an [`XsvReader`].
///
/// [`next_row`](CursorReader::next_row) lends the cursor out until the next
/// call, so a row cannot be held across an advance; take a
/// [`snapshot`](XsvCursor::snapshot) to keep one. Once the body is exhausted
/// the cursor no longer has data.
///
/// ```
/// use xsvlib::core::column_map::ColumnMap;
/// use xsvlib::item::csv::csv_reader::CsvReaderBuilder;
/// use xsvlib::item::xsv::xsv_reader::XsvReader;
///
/// let mut columns = ColumnMap::new();
/// let qty = columns.declare("QTY").unwrap();
///
/// let csv = CsvReaderBuilder::new()
///     .from_strings(vec!["name,qty", "apple,3", "pear,5"])
///     .unwrap();
/// let mut rows = XsvReader::new(csv).unwrap().read_columns(columns).unwrap();
///
/// let mut total = 0;
/// while let Some(row) = rows.next_row().unwrap() {
///     total += row.get_i32(qty).unwrap();
/// }
/// assert_eq!(total, 8);
/// assert!(!rows.cursor().has_data());
/// ```
pub struct CursorReader<R: RecordReader, C> {
    reader: XsvReader<R>,
    cursor: C,
}

impl<R: RecordReader, C: RowCursor> CursorReader<R, C> {
    /// Points the cursor at the next record.
    ///
    /// Returns `Ok(None)` and clears the cursor at the end of the body, or
    /// once after [`stop`](CursorReader::stop) was called.
    pub fn next_row(&mut self) -> Result<Option<&C>> {
        let next = self.reader.records().next();
        match next {
            Some(Ok(record)) => {
                self.cursor.cursor_mut().set_row(Some(record));
                Ok(Some(&self.cursor))
            }
            Some(Err(err)) => {
                self.cursor.cursor_mut().set_row(None);
                Err(err)
            }
            None => {
                self.cursor.cursor_mut().set_row(None);
                Ok(None)
            }
        }
    }

    /// Ends the current pass early: the next call to
    /// [`next_row`](CursorReader::next_row) returns `Ok(None)`. Calls after
    /// that resume with the following record.
    pub fn stop(&mut self) {
        self.reader.sequencer.request_break();
    }

    pub fn cursor(&self) -> &C {
        &self.cursor
    }

    pub fn header(&self) -> &[String] {
        self.reader.header()
    }

    /// Runs `f` on every remaining row, stopping at the first error.
    pub fn try_for_each<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(&C) -> Result<()>,
    {
        while let Some(row) = self.next_row()? {
            f(row)?;
        }
        Ok(())
    }

    pub fn into_parts(self) -> (XsvReader<R>, C) {
        (self.reader, self.cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::column_map::Column;
    use crate::item::csv::csv_reader::CsvReaderBuilder;
    use crate::item::tsv::tsv_reader::TsvReaderBuilder;

    fn csv(lines: Vec<&str>) -> XsvReader<impl RecordReader> {
        XsvReader::new(CsvReaderBuilder::new().from_strings(lines).unwrap()).unwrap()
    }

    #[test]
    fn empty_input_has_no_header() {
        let reader = CsvReaderBuilder::new().from_strings(Vec::<String>::new()).unwrap();
        assert!(matches!(XsvReader::new(reader), Err(XsvError::MissingHeader)));
    }

    #[test]
    fn header_only_input_has_an_empty_body() {
        let mut reader = csv(vec!["a,b"]);
        assert!(reader.records().next().is_none());
    }

    #[test]
    fn missing_columns_are_all_reported() {
        let mut columns = ColumnMap::new();
        for name in ["c", "e", "g", "a", "b"] {
            columns.declare(name).unwrap();
        }
        let reader = csv(vec!["b,c,d,e", "1,2,3,4"]);
        match reader.read_columns(columns) {
            Err(XsvError::MissingColumns(names)) => assert_eq!(names, vec!["g", "a"]),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("binding should have failed"),
        }
    }

    #[test]
    fn cursor_follows_header_positions_and_tolerates_short_rows() {
        let mut columns = ColumnMap::new();
        let foo = columns.declare("foo").unwrap();
        let baz = columns.declare("baz").unwrap();

        let reader = XsvReader::new(
            TsvReaderBuilder::new().from_strings(vec!["baz\tbar\tfoo", "1\t2\t3", "4"]),
        )
        .unwrap();
        let mut rows = reader.read_columns(columns).unwrap();

        let row = rows.next_row().unwrap().unwrap();
        assert_eq!(row.get(foo), Some("3"));
        assert_eq!(row.get(baz), Some("1"));

        let row = rows.next_row().unwrap().unwrap();
        assert_eq!(row.get(baz), Some("4"));
        assert_eq!(row.get(foo), None);

        assert!(rows.next_row().unwrap().is_none());
        assert!(!rows.cursor().has_data());
    }

    #[test]
    fn stop_ends_the_current_pass() {
        let mut columns = ColumnMap::new();
        let n: Column = columns.declare("n").unwrap();
        let mut rows = csv(vec!["n", "1", "2", "3"]).read_columns(columns).unwrap();

        let mut seen = Vec::new();
        while let Some(row) = rows.next_row().unwrap() {
            let value = row.get_i32(n).unwrap();
            seen.push(value);
            if value == 1 {
                rows.stop();
            }
        }
        assert_eq!(seen, vec![1]);

        let rest: Vec<i32> = {
            let mut out = Vec::new();
            rows.try_for_each(|row| {
                out.push(row.get_i32(n)?);
                Ok(())
            })
            .unwrap();
            out
        };
        assert_eq!(rest, vec![2, 3]);
    }

    #[test]
    fn parse_error_clears_the_cursor() {
        let mut columns = ColumnMap::new();
        columns.declare("a").unwrap();
        let mut rows = csv(vec!["a", "1", "x\"y", "3"]).read_columns(columns).unwrap();

        assert!(rows.next_row().unwrap().is_some());
        assert!(matches!(rows.next_row(), Err(XsvError::Malformed { line: 3, .. })));
        assert!(!rows.cursor().has_data());
        assert!(rows.next_row().unwrap().is_none());
    }
}
