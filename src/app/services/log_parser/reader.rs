//! Line reader shared by the header scanner and the row stream engine.
//!
//! Reads raw bytes up to each `\n` so that a stray invalid UTF-8 byte in one
//! value does not abort the whole scan; such bytes are replaced with U+FFFD.
//! The line terminator (`\n` or `\r\n`) is stripped.

use std::io::BufRead;

/// Buffered line reader with line number tracking
#[derive(Debug)]
pub struct LogLineReader<R> {
    reader: R,
    buf: Vec<u8>,
    line_number: usize,
}

impl<R: BufRead> LogLineReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(1024),
            line_number: 0,
        }
    }

    /// Read the next line, returning its 1-based line number and text
    pub fn next_line(&mut self) -> std::io::Result<Option<(usize, String)>> {
        self.buf.clear();
        let read = self.reader.read_until(b'\n', &mut self.buf)?;
        if read == 0 {
            return Ok(None);
        }

        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        }

        self.line_number += 1;
        let line = String::from_utf8_lossy(&self.buf).into_owned();
        Ok(Some((self.line_number, line)))
    }

    /// Number of lines consumed so far
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}
