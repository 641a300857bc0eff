#![cfg_attr(docsrs, feature(doc_cfg))]
//#![warn(missing_docs)]

/*!
 # xsvlib

 Streaming readers and writers for separated-values files (CSV and TSV), with
 columns bound by header name instead of by position.

 ## Core Concepts

- **Record:** the ordered fields of one row, addressed by position only.
- **RecordReader / RecordWriter:** a lazy, forward-only source of records and a field-by-field sink, framed by start-line / finish-line calls.
- **ColumnMap:** logical columns declared by name, then bound to positions by matching them against a header record (case-insensitively by default).
- **Cursor:** a reusable window over "the current record". Its accessors resolve a column through the map; a borrowed row is only valid until the next advance.
- **XsvOutBuffer:** assembles an output row column by column and refuses to emit it until every column is assigned.

 ## Modules

| **Module**        | **Description**                                                        |
|-------------------|------------------------------------------------------------------------|
| `core::record`    | Record reader / writer contracts and their iteration helpers           |
| `core::lines`     | Line sources feeding the readers                                       |
| `core::column_map`| Named columns and header binding                                       |
| `core::cursor`    | The current-record window and the `RowCursor` trait                    |
| `core::out_buffer`| Single-assignment output rows                                          |
| `item::csv`       | CSV automaton, reader and writer                                       |
| `item::tsv`       | TSV reader and writer                                                  |
| `item::xsv`       | Dispatch on file extension, header handling and cursor iteration       |

 ## Getting Started

```rust
# use xsvlib::{
#     core::column_map::Column,
#     core::cursor::{RowCursor, XsvCursor},
#     core::out_buffer::XsvOutBuffer,
#     core::record::RecordWriter,
#     item::options::{ReadOptions, WriteOptions},
#     item::xsv::format::{read_xsv_cursor, write_xsv_path},
#     Result,
# };
struct CarCursor {
    inner: XsvCursor,
    make: Column,
    year: Column,
}

impl CarCursor {
    fn new() -> Result<Self> {
        let mut inner = XsvCursor::default();
        let make = inner.columns_mut().declare("make")?;
        let year = inner.columns_mut().declare("year")?;
        Ok(Self { inner, make, year })
    }
}

impl RowCursor for CarCursor {
    fn cursor(&self) -> &XsvCursor {
        &self.inner
    }

    fn cursor_mut(&mut self) -> &mut XsvCursor {
        &mut self.inner
    }
}

fn main() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("cars.csv");

    let mut out = XsvOutBuffer::new(&["year", "make", "model"])?;
    let (year, make, model) = (out.column("year")?, out.column("make")?, out.column("model")?);
    let mut writer = write_xsv_path(&path, &WriteOptions::default())?;
    out.emit_header(&mut writer)?;
    for (y, mk, md) in [("1948", "Porsche", "356"), ("1967", "Ford", "Mustang, fastback")] {
        out.set(year, y)?;
        out.set(make, mk)?;
        out.set(model, md)?;
        out.emit(&mut writer)?;
    }
    writer.finish_file()?;
    drop(writer);

    let mut rows = read_xsv_cursor(&path, CarCursor::new()?, &ReadOptions::default())?;
    let mut makes = Vec::new();
    while let Some(car) = rows.next_row()? {
        if car.inner.get_i32(car.year)? > 1950 {
            makes.push(car.inner.get_string(car.make)?.to_string());
        }
    }
    assert_eq!(makes, ["Ford"]);

    Ok(())
}
```

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.

 */

/// Record contracts, column binding, cursors and output buffers
pub mod core;

/// Error types
pub mod error;

#[doc(inline)]
pub use error::*;

/// Format readers / writers and the extension dispatcher
pub mod item;
