/// Format-independent entry points.
///
/// [`format`] maps a file name to CSV or TSV and opens the matching reader or
/// writer; [`xsv_reader`] splits a record stream into its header and body and
/// drives cursors over the body.
///
/// # Examples
///
/// ```
/// use xsvlib::core::column_map::ColumnMap;
/// use xsvlib::item::options::ReadOptions;
/// use xsvlib::item::xsv::format::read_xsv;
///
/// let data = "id\tlabel\n1\tone\n2\ttwo\n";
/// let mut columns = ColumnMap::new();
/// let label = columns.declare("label").unwrap();
///
/// let reader = read_xsv(data.as_bytes(), "labels.tsv", &ReadOptions::default()).unwrap();
/// let mut rows = reader.with_header().unwrap().read_columns(columns).unwrap();
///
/// let mut labels = Vec::new();
/// while let Some(row) = rows.next_row().unwrap() {
///     labels.push(row.get_string(label).unwrap().to_string());
/// }
/// assert_eq!(labels, ["one", "two"]);
/// ```
pub mod format;

pub mod xsv_reader;
