//! Row writers for the extract command

use crate::app::models::Row;
use crate::cli::args::RowFormat;
use crate::{Error, Result};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::io::Write;

/// Writes extracted rows in the selected output format
pub enum RowWriter {
    Tsv {
        out: Box<dyn Write>,
        separator: char,
    },
    Json {
        out: Box<dyn Write>,
        field_names: Vec<String>,
    },
    Csv(csv::Writer<Box<dyn Write>>),
}

impl RowWriter {
    /// Create a writer and emit the header for formats that carry one
    ///
    /// JSON rows are objects keyed by field name, so repeated names are
    /// rejected for that format.
    pub fn new(
        format: RowFormat,
        out: Box<dyn Write>,
        field_names: &[String],
        separator: char,
    ) -> Result<Self> {
        let mut writer = match format {
            RowFormat::Tsv => RowWriter::Tsv { out, separator },
            RowFormat::Json => {
                let mut seen = HashSet::new();
                if let Some(duplicate) = field_names.iter().find(|name| !seen.insert(*name)) {
                    return Err(Error::configuration(format!(
                        "Field '{}' is selected more than once, which JSON output cannot represent",
                        duplicate
                    )));
                }
                RowWriter::Json {
                    out,
                    field_names: field_names.to_vec(),
                }
            }
            RowFormat::Csv => RowWriter::Csv(csv::Writer::from_writer(out)),
        };
        writer.write_header(field_names)?;
        Ok(writer)
    }

    fn write_header(&mut self, field_names: &[String]) -> Result<()> {
        match self {
            RowWriter::Tsv { out, separator } => {
                writeln!(out, "{}", field_names.join(&separator.to_string()))?;
            }
            RowWriter::Json { .. } => {}
            RowWriter::Csv(writer) => writer.write_record(field_names).map_err(csv_error)?,
        }
        Ok(())
    }

    /// Write one row
    pub fn write_row(&mut self, row: &Row) -> Result<()> {
        match self {
            RowWriter::Tsv { out, separator } => {
                writeln!(out, "{}", row.join(&separator.to_string()))?;
            }
            RowWriter::Json { out, field_names } => {
                let object: Map<String, Value> = field_names
                    .iter()
                    .zip(row.iter())
                    .map(|(name, value)| (name.clone(), Value::String(value.clone())))
                    .collect();
                serde_json::to_writer(&mut *out, &object).map_err(|e| {
                    Error::io("Failed to write JSON row", std::io::Error::other(e))
                })?;
                writeln!(out)?;
            }
            RowWriter::Csv(writer) => writer.write_record(row).map_err(csv_error)?,
        }
        Ok(())
    }

    /// Flush buffered output
    pub fn flush(&mut self) -> Result<()> {
        match self {
            RowWriter::Tsv { out, .. } | RowWriter::Json { out, .. } => out.flush()?,
            RowWriter::Csv(writer) => writer.flush()?,
        }
        Ok(())
    }
}

fn csv_error(error: csv::Error) -> Error {
    Error::io("Failed to write CSV row", std::io::Error::other(error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Shared in-memory sink so tests can read back what was written
    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn names() -> Vec<String> {
        vec!["id.orig_h".to_string(), "service".to_string()]
    }

    fn row() -> Row {
        vec!["10.0.0.1".to_string(), "dns, udp".to_string()]
    }

    #[test]
    fn test_tsv_output() {
        let sink = SharedBuffer::default();
        let mut writer =
            RowWriter::new(RowFormat::Tsv, Box::new(sink.clone()), &names(), '\t').unwrap();
        writer.write_row(&row()).unwrap();
        writer.flush().unwrap();

        assert_eq!(sink.contents(), "id.orig_h\tservice\n10.0.0.1\tdns, udp\n");
    }

    #[test]
    fn test_json_output() {
        let sink = SharedBuffer::default();
        let mut writer =
            RowWriter::new(RowFormat::Json, Box::new(sink.clone()), &names(), '\t').unwrap();
        writer.write_row(&row()).unwrap();
        writer.flush().unwrap();

        let line = sink.contents();
        let value: Value = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(value["id.orig_h"], "10.0.0.1");
        assert_eq!(value["service"], "dns, udp");
    }

    #[test]
    fn test_json_rejects_duplicate_names() {
        let names = vec!["uid".to_string(), "ts".to_string(), "uid".to_string()];

        let result = RowWriter::new(RowFormat::Json, Box::new(SharedBuffer::default()), &names, '\t');
        match result {
            Err(Error::Configuration { message }) => assert!(message.contains("uid")),
            Err(other) => panic!("Expected Configuration error, got {:?}", other),
            Ok(_) => panic!("Expected duplicate names to be rejected"),
        }

        // delimited formats keep duplicates as given
        let sink = SharedBuffer::default();
        let mut writer =
            RowWriter::new(RowFormat::Tsv, Box::new(sink.clone()), &names, '\t').unwrap();
        writer.write_row(&vec!["C1".to_string(), "1.0".to_string(), "C1".to_string()]).unwrap();
        writer.flush().unwrap();
        assert_eq!(sink.contents(), "uid\tts\tuid\nC1\t1.0\tC1\n");
    }

    #[test]
    fn test_csv_output_quotes_commas() {
        let sink = SharedBuffer::default();
        let mut writer =
            RowWriter::new(RowFormat::Csv, Box::new(sink.clone()), &names(), '\t').unwrap();
        writer.write_row(&row()).unwrap();
        writer.flush().unwrap();

        assert_eq!(sink.contents(), "id.orig_h,service\n10.0.0.1,\"dns, udp\"\n");
    }
}
