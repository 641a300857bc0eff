/// CSV support: a character-level parsing automaton and the record reader and
/// writer built on it.
///
/// # Module Architecture
///
/// 1. **parser**: the CSV state machine. Its transition function is pure, so the
///    grammar can be tested one `(state, input)` pair at a time.
///
/// 2. **CsvReader**: feeds lines from a [`LinesReader`](crate::core::lines::LinesReader)
///    into the automaton and hands out completed records.
///
/// 3. **CsvWriter**: quotes fields as needed and enforces an optional
///    fixed field count.
///
/// Both the reader and the writer are created through builders.
///
/// # Examples
///
/// ```
/// use xsvlib::core::record::{RecordReaderExt, RecordWriter, RecordWriterExt};
/// use xsvlib::item::csv::csv_reader::CsvReaderBuilder;
/// use xsvlib::item::csv::csv_writer::CsvWriterBuilder;
///
/// let mut writer = CsvWriterBuilder::new().from_writer(Vec::new()).unwrap();
/// writer.write_line(["city", "country"]).unwrap();
/// writer.write_line(["Boston", "United States"]).unwrap();
/// writer.write_line(["Salt, Lake", "United States"]).unwrap();
/// writer.finish_file().unwrap();
/// let data = writer.into_inner();
///
/// let mut reader = CsvReaderBuilder::new().from_reader(data.as_slice()).unwrap();
/// let cities = reader.load_all().unwrap();
///
/// assert_eq!(cities.len(), 3);
/// assert_eq!(cities[2], vec!["Salt, Lake", "United States"]);
/// ```
pub mod csv_reader;

pub mod csv_writer;

pub mod parser;
