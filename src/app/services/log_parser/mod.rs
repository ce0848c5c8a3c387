//! Bro log parser for tab-separated, self-describing network logs
//!
//! This module reads the `#fields` header of a Bro (Zeek) log, resolves the
//! caller's field selection to column indices and streams the selected
//! columns of every data row through a bounded buffer.
//!
//! ## Architecture
//!
//! - [`parser`] - Parser configuration, buffer lifecycle and scan start
//! - [`header`] - `#fields` directive discovery
//! - [`field_index`] - Field name to column index resolution
//! - [`row_stream`] - Row scanning loop and the consumer stream
//! - [`line_counter`] - Chunked line counting for buffer sizing
//! - [`transform`] - Optional per-row transform hook
//! - [`reader`] - Line reader shared by the scanners
//! - [`stats`] - Scan statistics
//!
//! ## Usage
//!
//! ```rust,no_run
//! use brolog_processor::app::services::log_parser::LogParser;
//!
//! # async fn example() -> brolog_processor::Result<()> {
//! let mut parser = LogParser::new("dns.log", false)?;
//! parser.set_fields(vec!["query".to_string(), "qtype_name".to_string()]);
//! parser.create_buffer(1024);
//!
//! let (rows, stats) = parser.start()?.collect_rows().await?;
//! println!("{} rows, {} skipped", rows.len(), stats.mismatched_rows);
//! # Ok(())
//! # }
//! ```

pub mod field_index;
pub mod header;
pub mod line_counter;
pub mod parser;
pub mod reader;
pub mod row_stream;
pub mod stats;
pub mod transform;

#[cfg(test)]
pub mod tests;

pub use field_index::FieldIndex;
pub use header::LogHeader;
pub use parser::LogParser;
pub use row_stream::{RowBuffer, RowStream};
pub use stats::ScanStats;
pub use transform::{RowTransform, TransformError, UnsetValueNormalizer};
