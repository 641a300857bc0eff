use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use log::{debug, error};

use crate::core::record::{LineFrame, RecordWriter};
use crate::error::{Result, XsvError};
use crate::item::options::{LineTerminator, WriteOptions};

/// Writes fields separated by tabs. A field containing a tab or a line break
/// cannot be represented and is rejected.
pub struct TsvWriter<W: Write> {
    sink: W,
    frame: LineFrame,
    terminator: LineTerminator,
}

impl<W: Write> TsvWriter<W> {
    pub fn lines_written(&self) -> usize {
        self.frame.lines_written()
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

impl<W: Write> RecordWriter for TsvWriter<W> {
    fn field_count(&self) -> usize {
        self.frame.field_count()
    }

    fn start_line(&mut self) -> Result<()> {
        self.frame.start()
    }

    fn write_field(&mut self, field: &str) -> Result<()> {
        if field.contains(['\t', '\r', '\n']) {
            error!("Rejected TSV field {:?}", field);
            return Err(XsvError::ForbiddenTsvCharacter(field.to_string()));
        }
        self.frame.begin_field('\t')?.push_str(field);
        Ok(())
    }

    fn finish_line(&mut self) -> Result<()> {
        self.frame.finish(&mut self.sink, self.terminator.as_str())
    }

    fn finish_file(&mut self) -> Result<()> {
        self.frame.finish_file()?;
        self.sink.flush()?;
        debug!("Finished TSV output after {} line(s)", self.frame.lines_written());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.sink.flush()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct TsvWriterBuilder {
    field_count: usize,
    line_terminator: LineTerminator,
}

impl TsvWriterBuilder {
    pub fn new() -> TsvWriterBuilder {
        TsvWriterBuilder::default()
    }

    /// The separator and quoting settings do not apply to TSV.
    pub fn from_options(options: &WriteOptions) -> TsvWriterBuilder {
        TsvWriterBuilder {
            field_count: options.field_count,
            line_terminator: options.line_terminator,
        }
    }

    pub fn field_count(mut self, field_count: usize) -> TsvWriterBuilder {
        self.field_count = field_count;
        self
    }

    pub fn line_terminator(mut self, terminator: LineTerminator) -> TsvWriterBuilder {
        self.line_terminator = terminator;
        self
    }

    pub fn from_path<R: AsRef<Path>>(self, path: R) -> Result<TsvWriter<BufWriter<File>>> {
        let path = path.as_ref();
        let file = File::create(path)?;
        debug!("Writing TSV file {}", path.display());
        Ok(self.from_writer(BufWriter::new(file)))
    }

    pub fn from_writer<W: Write>(self, wtr: W) -> TsvWriter<W> {
        TsvWriter {
            sink: wtr,
            frame: LineFrame::new("TSV", self.field_count),
            terminator: self.line_terminator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::RecordWriterExt;

    #[test]
    fn fields_are_written_verbatim() {
        let mut writer = TsvWriterBuilder::new().from_writer(Vec::new());
        writer.write_line(["a,b", " c ", "\"d\"", ""]).unwrap();
        writer.finish_file().unwrap();
        assert_eq!(writer.into_inner(), b"a,b\t c \t\"d\"\t\n");
    }

    #[test]
    fn tab_and_line_breaks_are_rejected_before_any_output() {
        for bad in ["a\tb", "a\nb", "a\rb"] {
            let mut writer = TsvWriterBuilder::new().from_writer(Vec::new());
            writer.start_line().unwrap();
            writer.write_field("ok").unwrap();
            assert!(matches!(
                writer.write_field(bad),
                Err(XsvError::ForbiddenTsvCharacter(field)) if field == bad
            ));
            assert!(writer.into_inner().is_empty());
        }
    }

    #[test]
    fn field_count_and_crlf() {
        let mut writer = TsvWriterBuilder::new()
            .field_count(2)
            .line_terminator(LineTerminator::CrLf)
            .from_writer(Vec::new());
        writer.write_line(["a", "b"]).unwrap();
        assert!(matches!(
            writer.write_line(["c"]),
            Err(XsvError::TooFewFields { format: "TSV", .. })
        ));
        assert_eq!(writer.into_inner(), b"a\tb\r\n");
    }
}
