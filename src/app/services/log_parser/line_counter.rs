//! Chunked newline counting used to size the row buffer

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use tracing::debug;

use crate::{Error, Result};

/// Count `\n` bytes in a file without loading it into memory
pub fn count_lines(path: &Path, chunk_size: usize) -> Result<usize> {
    let file = File::open(path)
        .map_err(|e| Error::io(format!("Failed to open {}", path.display()), e))?;

    let count = count_lines_from_reader(file, chunk_size)
        .map_err(|e| Error::io(format!("Failed to read {}", path.display()), e))?;

    debug!("Counted {} lines in {}", count, path.display());
    Ok(count)
}

/// Count `\n` bytes from any reader, `chunk_size` bytes at a time
pub fn count_lines_from_reader<R: Read>(mut reader: R, chunk_size: usize) -> std::io::Result<usize> {
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut count = 0;

    loop {
        match reader.read(&mut buf) {
            Ok(0) => return Ok(count),
            Ok(read) => count += buf[..read].iter().filter(|&&b| b == b'\n').count(),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}
