use std::io::BufRead;

use crate::error::Result;

/// A forward-only source of text lines, without their terminators.
///
/// Sources hand out every physical line, empty ones included. Whether an
/// empty line means anything is up to the record reader on top.
pub trait LinesReader {
    /// Returns the next line, or `None` once the source is exhausted.
    fn next_line(&mut self) -> Option<Result<String>>;

    /// The terminator stripped from the line most recently returned: `"\r\n"`,
    /// `"\n"`, a lone `"\r"` at end of input, or `""` when the last line had
    /// none.
    fn terminator(&self) -> &'static str;

    /// 1-based number of the physical line most recently returned (0 before
    /// the first one).
    fn line_number(&self) -> usize;
}

impl<L: LinesReader + ?Sized> LinesReader for &mut L {
    fn next_line(&mut self) -> Option<Result<String>> {
        (**self).next_line()
    }

    fn terminator(&self) -> &'static str {
        (**self).terminator()
    }

    fn line_number(&self) -> usize {
        (**self).line_number()
    }
}

/// Reads lines from any buffered reader.
///
/// The reader is owned; pass `&mut reader` to keep ownership on the caller's
/// side.
pub struct StreamLinesReader<R> {
    reader: R,
    terminator: &'static str,
    line_number: usize,
}

impl<R: BufRead> StreamLinesReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            terminator: "",
            line_number: 0,
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

fn strip_terminator(line: &mut String) -> &'static str {
    if line.ends_with("\r\n") {
        line.truncate(line.len() - 2);
        "\r\n"
    } else if line.ends_with('\n') {
        line.pop();
        "\n"
    } else if line.ends_with('\r') {
        // Only the final line can end this way; `read_line` stops at `\n`.
        line.pop();
        "\r"
    } else {
        ""
    }
}

impl<R: BufRead> LinesReader for StreamLinesReader<R> {
    fn next_line(&mut self) -> Option<Result<String>> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => {
                self.line_number += 1;
                self.terminator = strip_terminator(&mut line);
                Some(Ok(line))
            }
            Err(error) => Some(Err(error.into())),
        }
    }

    fn terminator(&self) -> &'static str {
        self.terminator
    }

    fn line_number(&self) -> usize {
        self.line_number
    }
}

/// Serves lines from an in-memory sequence of strings, taken to be joined by
/// CRLF.
pub struct MemoryLinesReader<I> {
    lines: I,
    line_number: usize,
}

impl<I> MemoryLinesReader<I>
where
    I: Iterator,
    I::Item: Into<String>,
{
    pub fn new<T>(lines: T) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        Self {
            lines: lines.into_iter(),
            line_number: 0,
        }
    }
}

impl<I> LinesReader for MemoryLinesReader<I>
where
    I: Iterator,
    I::Item: Into<String>,
{
    fn next_line(&mut self) -> Option<Result<String>> {
        let line = self.lines.next()?.into();
        self.line_number += 1;
        Some(Ok(line))
    }

    fn terminator(&self) -> &'static str {
        "\r\n"
    }

    fn line_number(&self) -> usize {
        self.line_number
    }
}
