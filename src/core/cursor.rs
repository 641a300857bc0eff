use std::fmt::Display;
use std::str::FromStr;

use crate::core::column_map::{Column, ColumnMap};
use crate::core::record::Record;
use crate::error::{Result, XsvError};

/// A reusable window over "the current record", bound to a [`ColumnMap`].
///
/// The cursor is pointed at successive records with
/// [`set_row`](XsvCursor::set_row). Values borrowed from it are only valid
/// until the next advance, which the borrow checker enforces. Use
/// [`snapshot`](XsvCursor::snapshot) to keep a row beyond that.
///
/// ```
/// use xsvlib::core::column_map::ColumnMap;
/// use xsvlib::core::cursor::XsvCursor;
///
/// let mut columns = ColumnMap::new();
/// let count = columns.declare("count").unwrap();
/// columns.bind(&["name", "count"]);
///
/// let mut cursor = XsvCursor::new(columns);
/// assert_eq!(cursor.get(count), None);
///
/// cursor.set_row(Some(vec!["bikes".to_string(), "42".to_string()]));
/// assert_eq!(cursor.get(count), Some("42"));
/// assert_eq!(cursor.get_i32(count).unwrap(), 42);
/// ```
#[derive(Debug, Clone, Default)]
pub struct XsvCursor {
    columns: ColumnMap,
    row: Option<Record>,
}

impl XsvCursor {
    pub fn new(columns: ColumnMap) -> Self {
        Self { columns, row: None }
    }

    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    pub fn columns_mut(&mut self) -> &mut ColumnMap {
        &mut self.columns
    }

    /// Replaces the current record and returns the previous one.
    pub fn set_row(&mut self, row: Option<Record>) -> Option<Record> {
        std::mem::replace(&mut self.row, row)
    }

    /// `true` exactly when a record is current.
    pub fn has_data(&self) -> bool {
        self.row.is_some()
    }

    pub fn current_row(&self) -> Option<&[String]> {
        self.row.as_deref()
    }

    /// An owned copy of the current record.
    pub fn snapshot(&self) -> Option<Record> {
        self.row.clone()
    }

    /// The value of a column in the current record.
    ///
    /// `None` when no record is current, the column is unbound, or the record
    /// is too short to reach the column's position.
    pub fn get(&self, column: Column) -> Option<&str> {
        let row = self.row.as_ref()?;
        let index = self.columns.index_of(column)?;
        row.get(index).map(String::as_str)
    }

    /// Like [`get`](XsvCursor::get), but a missing value is an error.
    pub fn get_string(&self, column: Column) -> Result<&str> {
        self.get(column)
            .ok_or_else(|| XsvError::MissingValue(self.columns.describe(column)))
    }

    /// Parses a required value.
    pub fn get_parsed<T>(&self, column: Column) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let value = self.get_string(column)?;
        value.parse().map_err(|error: T::Err| XsvError::InvalidValue {
            column: self.columns.describe(column),
            value: value.to_string(),
            reason: error.to_string(),
        })
    }

    pub fn get_i32(&self, column: Column) -> Result<i32> {
        self.get_parsed(column)
    }

    pub fn get_i64(&self, column: Column) -> Result<i64> {
        self.get_parsed(column)
    }
}

/// Anything that carries an [`XsvCursor`].
///
/// Fixed-schema cursors embed an `XsvCursor`, declare their columns once in
/// their constructor and expose typed accessors on top of it:
///
/// ```
/// use xsvlib::core::column_map::Column;
/// use xsvlib::core::cursor::{RowCursor, XsvCursor};
/// use xsvlib::error::Result;
///
/// struct StationCursor {
///     inner: XsvCursor,
///     id: Column,
///     name: Column,
/// }
///
/// impl StationCursor {
///     fn new() -> Result<Self> {
///         let mut inner = XsvCursor::default();
///         let id = inner.columns_mut().declare("ID")?;
///         let name = inner.columns_mut().declare("Name")?;
///         Ok(Self { inner, id, name })
///     }
///
///     fn id(&self) -> Result<i32> {
///         self.inner.get_i32(self.id)
///     }
///
///     fn name(&self) -> Result<&str> {
///         self.inner.get_string(self.name)
///     }
/// }
///
/// impl RowCursor for StationCursor {
///     fn cursor(&self) -> &XsvCursor {
///         &self.inner
///     }
///
///     fn cursor_mut(&mut self) -> &mut XsvCursor {
///         &mut self.inner
///     }
/// }
/// ```
pub trait RowCursor {
    fn cursor(&self) -> &XsvCursor;

    fn cursor_mut(&mut self) -> &mut XsvCursor;

    fn has_data(&self) -> bool {
        self.cursor().has_data()
    }
}

impl RowCursor for XsvCursor {
    fn cursor(&self) -> &XsvCursor {
        self
    }

    fn cursor_mut(&mut self) -> &mut XsvCursor {
        self
    }
}
