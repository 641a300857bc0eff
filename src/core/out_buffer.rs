use crate::core::column_map::{Column, ColumnMap};
use crate::core::record::{Record, RecordWriter, RecordWriterExt};
use crate::error::{Result, XsvError};

/// Collects one output row, column by column, before it is written.
///
/// The header fixes both the field order and a column map pre-bound to it.
/// Each column may be assigned once per row; [`emit`](XsvOutBuffer::emit)
/// refuses to write a row with an unassigned column.
///
/// ```
/// use xsvlib::core::out_buffer::XsvOutBuffer;
/// use xsvlib::item::csv::csv_writer::CsvWriterBuilder;
///
/// let mut out = XsvOutBuffer::new(&["baz", "foo"]).unwrap();
/// let foo = out.column("foo").unwrap();
/// let baz = out.column("baz").unwrap();
///
/// let mut writer = CsvWriterBuilder::new().from_writer(Vec::new()).unwrap();
/// out.emit_header(&mut writer).unwrap();
/// out.set(foo, "1").unwrap();
/// out.set(baz, "one").unwrap();
/// out.emit(&mut writer).unwrap();
///
/// assert_eq!(writer.into_inner(), b"baz,foo\none,1\n");
/// ```
#[derive(Debug)]
pub struct XsvOutBuffer {
    header: Record,
    columns: ColumnMap,
    slots: Vec<Option<String>>,
}

impl XsvOutBuffer {
    pub fn new<S: AsRef<str>>(header: &[S]) -> Result<Self> {
        Self::with_case_sensitivity(header, false)
    }

    pub fn with_case_sensitivity<S: AsRef<str>>(header: &[S], case_sensitive: bool) -> Result<Self> {
        let columns = ColumnMap::from_header(header, case_sensitive)?;
        Ok(Self {
            header: header.iter().map(|name| name.as_ref().to_string()).collect(),
            columns,
            slots: vec![None; header.len()],
        })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    /// Looks an output column up by name.
    pub fn column(&self, name: &str) -> Result<Column> {
        self.columns.get(name)
    }

    fn bound_index(&self, column: Column) -> Result<usize> {
        self.columns
            .index_of(column)
            .ok_or_else(|| XsvError::UnboundColumn(self.columns.describe(column)))
    }

    /// Assigns a column of the current row. Assigning it a second time before
    /// the row is emitted or reset is an error.
    pub fn set(&mut self, column: Column, value: impl Into<String>) -> Result<()> {
        let index = self.bound_index(column)?;
        let slot = &mut self.slots[index];
        if slot.is_some() {
            return Err(XsvError::ColumnAlreadySet(self.header[index].clone()));
        }
        *slot = Some(value.into());
        Ok(())
    }

    pub fn get(&self, column: Column) -> Result<Option<&str>> {
        let index = self.bound_index(column)?;
        Ok(self.slots[index].as_deref())
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Clears every column of the current row.
    pub fn reset(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    pub fn emit_header<W: RecordWriter + ?Sized>(&self, writer: &mut W) -> Result<()> {
        writer.write_line(&self.header)
    }

    /// Writes the current row and resets the buffer for the next one.
    pub fn emit<W: RecordWriter + ?Sized>(&mut self, writer: &mut W) -> Result<()> {
        self.emit_retaining(writer)?;
        self.reset();
        Ok(())
    }

    /// Writes the current row and keeps its values.
    pub fn emit_retaining<W: RecordWriter + ?Sized>(&self, writer: &mut W) -> Result<()> {
        if let Some(index) = self.slots.iter().position(Option::is_none) {
            return Err(XsvError::UnassignedColumn(self.header[index].clone()));
        }
        writer.write_line(self.slots.iter().flatten())
    }
}
