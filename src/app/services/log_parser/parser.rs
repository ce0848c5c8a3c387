//! Bro log parser orchestration
//!
//! [`LogParser`] is bound to a single log file. It holds the field selection,
//! the lazily resolved column indices and the row buffer, and starts row
//! stream scans from them. Each scan takes an immutable snapshot of that
//! configuration, so the parser can be reconfigured for the next run.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::field_index::FieldIndex;
use super::header::{LogHeader, scan_header};
use super::line_counter::count_lines;
use super::row_stream::{Projection, RowBuffer, RowStream, ScanPlan};
use super::transform::RowTransform;
use crate::app::models::{ScanMode, underscore_field_name};
use crate::config::ProcessorConfig;
use crate::{Error, Result};

/// Parser for one tab-separated, self-describing Bro log
///
/// Typical use:
///
/// ```no_run
/// use brolog_processor::LogParser;
///
/// # async fn example() -> brolog_processor::Result<()> {
/// let mut parser = LogParser::new("conn.log", false)?;
/// parser.set_fields(vec!["id.orig_h".to_string(), "id.resp_h".to_string()]);
/// parser.auto_create_buffer()?;
///
/// let mut rows = parser.start()?;
/// while let Some(row) = rows.next_row().await {
///     println!("{:?}", row?);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct LogParser {
    path: PathBuf,
    mode: ScanMode,
    fields: Option<Vec<String>>,
    fields_index: Option<FieldIndex>,
    buffer: Option<RowBuffer>,
    config: ProcessorConfig,
}

impl LogParser {
    /// Create a parser for an existing log file with default configuration
    pub fn new(path: impl AsRef<Path>, all_fields: bool) -> Result<Self> {
        Self::with_config(path, all_fields, ProcessorConfig::default())
    }

    /// Create a parser for an existing log file
    pub fn with_config(
        path: impl AsRef<Path>,
        all_fields: bool,
        config: ProcessorConfig,
    ) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::file_not_found(path));
        }
        config.validate()?;

        debug!(
            "Created parser for {} ({})",
            path.display(),
            ScanMode::from_all_fields(all_fields)
        );

        Ok(Self {
            path: path.to_path_buf(),
            mode: ScanMode::from_all_fields(all_fields),
            fields: None,
            fields_index: None,
            buffer: None,
            config,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Set the ordered field names to extract
    ///
    /// Only used in selected-fields mode. Any previously resolved indices are
    /// discarded so they cannot go stale.
    pub fn set_fields(&mut self, fields: Vec<String>) {
        if self.mode.is_all_fields() {
            debug!("Field selection ignored in all-fields mode");
        }
        self.fields = Some(fields);
        self.fields_index = None;
    }

    /// Currently selected field names
    pub fn fields(&self) -> Option<&[String]> {
        self.fields.as_deref()
    }

    /// Selected field names with `.` replaced by `_`
    ///
    /// Does not affect the names used for resolution.
    pub fn fields_to_underscore(&self) -> Result<Vec<String>> {
        let fields = self
            .fields
            .as_ref()
            .ok_or_else(|| Error::configuration_missing("No fields to replace"))?;

        Ok(fields.iter().map(|f| underscore_field_name(f)).collect())
    }

    /// Read the full header from the log's `#fields` directive
    ///
    /// Re-reads the file on every call.
    pub fn header(&self) -> Result<LogHeader> {
        scan_header(&self.path, &self.config)
    }

    /// Resolve the selected field names to column indices
    ///
    /// Scans the header again on every call; the result replaces any
    /// previous resolution.
    pub fn resolve_indices(&mut self) -> Result<&[usize]> {
        let fields = self.fields.as_ref().ok_or_else(|| {
            Error::configuration_missing("No specific fields defined for parsing")
        })?;

        let header = scan_header(&self.path, &self.config)?;
        let index = FieldIndex::resolve(&header, fields)?;

        debug!(
            "Resolved {} fields against {} header columns: {:?}",
            index.len(),
            header.len(),
            index.indices()
        );

        Ok(self.fields_index.insert(index).indices())
    }

    /// Resolved column indices, if resolution has run since the last
    /// field change
    pub fn field_index(&self) -> Option<&FieldIndex> {
        self.fields_index.as_ref()
    }

    /// Count newline-terminated lines in the log
    pub fn count_lines(&self) -> Result<usize> {
        count_lines(&self.path, self.config.line_count_chunk_size)
    }

    /// Create the row buffer with a fixed capacity (at least one row)
    pub fn create_buffer(&mut self, capacity: usize) {
        if self.buffer.is_some() {
            debug!("Replacing existing row buffer");
        }
        let buffer = RowBuffer::new(capacity);
        debug!("Created row buffer with capacity {}", buffer.capacity());
        self.buffer = Some(buffer);
    }

    /// Create the row buffer sized from the log's line count
    ///
    /// The count is capped at the configured maximum capacity. Returns the
    /// capacity used.
    pub fn auto_create_buffer(&mut self) -> Result<usize> {
        let line_count = self.count_lines()?;
        let capacity = self.config.clamp_capacity(line_count);
        self.create_buffer(capacity);
        Ok(capacity)
    }

    /// Create the row buffer according to `config.buffer_capacity`
    pub fn create_configured_buffer(&mut self) -> Result<usize> {
        match self.config.buffer_capacity {
            Some(capacity) => {
                let capacity = self.config.clamp_capacity(capacity);
                self.create_buffer(capacity);
                Ok(capacity)
            }
            None => self.auto_create_buffer(),
        }
    }

    /// Capacity of the row buffer waiting for the next scan
    pub fn buffer_capacity(&self) -> Option<usize> {
        self.buffer.as_ref().map(RowBuffer::capacity)
    }

    /// Start scanning without a transform
    ///
    /// Must be called from within a Tokio runtime, see
    /// [`start_with_options`](Self::start_with_options).
    pub fn start(&mut self) -> Result<RowStream> {
        self.start_with_options(None, CancellationToken::new())
    }

    /// Start scanning, rewriting each row with `transform`
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start_with_transform<T>(&mut self, transform: T) -> Result<RowStream>
    where
        T: RowTransform + 'static,
    {
        self.start_with_options(Some(Arc::new(transform)), CancellationToken::new())
    }

    /// Start scanning with an optional transform and a cancellation token
    ///
    /// The scan runs on the current Tokio runtime's blocking pool. Fails
    /// before any row is read when no runtime is active, the buffer is
    /// missing, no fields are selected in selected-fields mode, or index
    /// resolution fails. The buffer is consumed only once these checks pass.
    pub fn start_with_options(
        &mut self,
        transform: Option<Arc<dyn RowTransform>>,
        cancellation_token: CancellationToken,
    ) -> Result<RowStream> {
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(Error::configuration(
                "start must be called within a Tokio runtime",
            ));
        }

        if self.buffer.is_none() {
            return Err(Error::BufferNotInitialized);
        }

        let (field_names, projection) = match self.mode {
            ScanMode::SelectedFields => {
                if self.fields_index.is_none() {
                    self.resolve_indices()?;
                }
                let index = self
                    .fields_index
                    .clone()
                    .ok_or_else(|| Error::configuration_missing("Field indices not resolved"))?;
                (index.names().to_vec(), Projection::Selected(index))
            }
            ScanMode::AllFields => {
                let header = self.header()?;
                if header.is_empty() {
                    warn!(
                        "{} has no {} directive, every data row will be skipped",
                        self.path.display(),
                        self.config.fields_directive
                    );
                }
                let expected_columns = header.len();
                (header.into_fields(), Projection::All { expected_columns })
            }
        };

        let buffer = self.buffer.take().ok_or(Error::BufferNotInitialized)?;

        info!(
            "Starting scan of {} with {} fields (buffer capacity {})",
            self.path.display(),
            field_names.len(),
            buffer.capacity()
        );

        let plan = ScanPlan {
            path: self.path.clone(),
            field_names: field_names.into(),
            projection,
            separator: self.config.separator,
            comment_marker: self.config.comment_marker,
            transform,
        };

        Ok(RowStream::spawn(plan, buffer, cancellation_token))
    }
}
