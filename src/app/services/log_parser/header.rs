//! Header scanning for Bro logs
//!
//! A Bro log declares its columns on a single directive line:
//!
//! ```text
//! #fields	ts	uid	id.orig_h	id.orig_p
//! ```
//!
//! The scanner reads from the start of the file until the first such line
//! and splits what follows the directive into the ordered column names. Only
//! the first directive line is honoured.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};

use super::reader::LogLineReader;
use crate::config::ProcessorConfig;
use crate::{Error, Result};

/// Ordered column names declared by a log's `#fields` directive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogHeader {
    fields: Vec<String>,
}

impl LogHeader {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<String> {
        self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the file had no directive line
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Position of the first column with this exact name
    pub fn index_of(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.index_of(field).is_some()
    }
}

/// Extract the column list that follows a directive prefix
///
/// Returns `None` when the line is not a directive line. A directive must be
/// followed by nothing, a single separator, or a single space; `#fieldsets`
/// is not a `#fields` line. The returned slice may be empty, which callers
/// treat as a malformed header.
pub fn directive_remainder<'a>(line: &'a str, directive: &str, separator: char) -> Option<&'a str> {
    // strip_prefix checks the length first, so short lines never match
    let rest = line.strip_prefix(directive)?;

    if rest.is_empty() {
        return Some(rest);
    }

    rest.strip_prefix(separator).or_else(|| rest.strip_prefix(' '))
}

/// Scan a log file for its `#fields` directive
pub fn scan_header(path: &Path, config: &ProcessorConfig) -> Result<LogHeader> {
    let file = File::open(path)
        .map_err(|e| Error::io(format!("Failed to open {}", path.display()), e))?;

    scan_header_from_reader(BufReader::new(file), path, config)
}

/// Scan any buffered reader for its `#fields` directive
///
/// `path` is only used for error messages.
pub fn scan_header_from_reader<R: BufRead>(
    reader: R,
    path: &Path,
    config: &ProcessorConfig,
) -> Result<LogHeader> {
    let mut lines = LogLineReader::new(reader);

    while let Some((line_number, line)) = lines
        .next_line()
        .map_err(|e| Error::io(format!("Failed to read {}", path.display()), e))?
    {
        let Some(remainder) =
            directive_remainder(&line, &config.fields_directive, config.separator)
        else {
            continue;
        };

        if remainder.is_empty() {
            return Err(Error::malformed_header(path, line));
        }

        let fields: Vec<String> = remainder
            .split(config.separator)
            .map(str::to_string)
            .collect();

        debug!(
            "Found {} directive at line {} of {}: {} fields",
            config.fields_directive,
            line_number,
            path.display(),
            fields.len()
        );

        return Ok(LogHeader::new(fields));
    }

    warn!(
        "No {} directive found in {}",
        config.fields_directive,
        path.display()
    );
    Ok(LogHeader::default())
}
