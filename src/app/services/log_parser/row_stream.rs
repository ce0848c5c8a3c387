//! Row stream engine
//!
//! A scan runs on Tokio's blocking pool and pushes rows into a bounded
//! channel. A full channel blocks the scanner (backpressure), an empty one
//! parks the consumer. Dropping the sender when the scan ends is the only
//! completion signal: consumers see `None` once the buffered rows are
//! drained.
//!
//! Line handling, in order:
//! - lines starting with the comment marker are skipped
//! - empty lines and lines with nothing after their first character are skipped
//! - the rest is split on the separator and projected onto the active fields
//! - rows whose column count does not fit are skipped and counted
//! - the optional transform rewrites the row; on failure the original is kept

use futures::Stream;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::field_index::FieldIndex;
use super::reader::LogLineReader;
use super::stats::ScanStats;
use super::transform::RowTransform;
use crate::app::models::{Row, ScanMode};
use crate::constants::MISMATCH_WARN_LIMIT;
use crate::{Error, Result};

type RowSender = mpsc::Sender<Result<Row>>;
type RowReceiver = mpsc::Receiver<Result<Row>>;

/// Bounded row queue created before a scan starts
///
/// Holds both channel ends until [`LogParser::start`](super::LogParser::start)
/// hands the sender to the scanner and the receiver to the returned
/// [`RowStream`].
#[derive(Debug)]
pub struct RowBuffer {
    sender: RowSender,
    receiver: RowReceiver,
    capacity: usize,
}

impl RowBuffer {
    /// Create a buffer holding up to `capacity` rows (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = mpsc::channel(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn into_parts(self) -> (RowSender, RowReceiver) {
        (self.sender, self.receiver)
    }
}

/// How raw columns become a row
#[derive(Debug, Clone)]
pub(crate) enum Projection {
    /// Every column; rows must have exactly this many
    All { expected_columns: usize },
    /// Resolved subset of columns in selection order
    Selected(FieldIndex),
}

impl Projection {
    fn mode(&self) -> ScanMode {
        match self {
            Self::All { .. } => ScanMode::AllFields,
            Self::Selected(_) => ScanMode::SelectedFields,
        }
    }

    fn apply(&self, values: &[&str]) -> Option<Row> {
        match self {
            Self::All { expected_columns } => {
                if values.len() != *expected_columns {
                    return None;
                }
                Some(values.iter().map(|value| value.to_string()).collect())
            }
            Self::Selected(index) => {
                if values.len() < index.required_columns() {
                    return None;
                }
                index.project(values)
            }
        }
    }
}

/// Immutable snapshot of everything a scan needs
///
/// Built from the parser's configuration when a scan starts, so later
/// reconfiguration of the parser cannot affect a running scan.
#[derive(Clone)]
pub(crate) struct ScanPlan {
    pub path: PathBuf,
    pub field_names: Arc<[String]>,
    pub projection: Projection,
    pub separator: char,
    pub comment_marker: char,
    pub transform: Option<Arc<dyn RowTransform>>,
}

impl std::fmt::Debug for ScanPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanPlan")
            .field("path", &self.path)
            .field("field_names", &self.field_names)
            .field("projection", &self.projection)
            .field("separator", &self.separator)
            .field("comment_marker", &self.comment_marker)
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

enum LineKind {
    Comment,
    Blank,
    Data,
}

fn classify_line(line: &str, comment_marker: char) -> LineKind {
    let mut chars = line.chars();
    match chars.next() {
        None => LineKind::Blank,
        Some(first) if first == comment_marker => LineKind::Comment,
        Some(_) if chars.as_str().is_empty() => LineKind::Blank,
        Some(_) => LineKind::Data,
    }
}

/// Handle to the rows produced by a running scan
///
/// Yields `Ok(row)` in file order. A fatal read error arrives as a single
/// `Err` item, and a cancelled scan reports one
/// [`Error::ScanInterrupted`]; either way the stream then ends. Implements
/// [`futures::Stream`].
#[derive(Debug)]
pub struct RowStream {
    receiver: RowReceiver,
    producer: Option<JoinHandle<Result<ScanStats>>>,
    cancellation_token: CancellationToken,
    field_names: Arc<[String]>,
    mode: ScanMode,
    capacity: usize,
    terminated: bool,
}

impl RowStream {
    /// Spawn the scanner for `plan` and return the consuming end
    pub(crate) fn spawn(
        plan: ScanPlan,
        buffer: RowBuffer,
        cancellation_token: CancellationToken,
    ) -> Self {
        let capacity = buffer.capacity();
        let (sender, receiver) = buffer.into_parts();
        let field_names = plan.field_names.clone();
        let mode = plan.projection.mode();

        let token = cancellation_token.clone();
        let producer = tokio::task::spawn_blocking(move || scan_rows(&plan, &sender, &token));

        Self {
            receiver,
            producer: Some(producer),
            cancellation_token,
            field_names,
            mode,
            capacity,
            terminated: false,
        }
    }

    /// Field names aligned with every emitted row
    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Rows currently buffered and not yet consumed
    pub fn buffered(&self) -> usize {
        self.receiver.len()
    }

    /// Token that cancels the underlying scan
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation_token
    }

    /// Stop the scan; buffered rows are discarded
    pub fn cancel(&self) {
        self.cancellation_token.cancel();
    }

    /// Wait for the next row; `None` once the stream is closed
    pub async fn next_row(&mut self) -> Option<Result<Row>> {
        futures::StreamExt::next(self).await
    }

    /// Drain every remaining row, then wait for the scan statistics
    pub async fn collect_rows(mut self) -> Result<(Vec<Row>, ScanStats)> {
        let mut rows = Vec::new();
        while let Some(row) = self.next_row().await {
            rows.push(row?);
        }
        let stats = self.finish().await?;
        Ok((rows, stats))
    }

    /// Close the stream and wait for the scanner to exit
    ///
    /// Unread rows are discarded. Returns the scan statistics, or the error
    /// that stopped the scan. A cancelled scan reports
    /// [`Error::ScanInterrupted`].
    pub async fn finish(mut self) -> Result<ScanStats> {
        self.receiver.close();

        let Some(producer) = self.producer.take() else {
            return Err(Error::scan_interrupted("scan already finished"));
        };

        let stats = producer
            .await
            .map_err(|e| Error::scan_interrupted(format!("scan task failed: {}", e)))??;

        // a cancelled consumer closes the channel, so the scanner may only see the close
        if stats.cancelled || (stats.consumer_closed && self.cancellation_token.is_cancelled()) {
            return Err(Error::scan_interrupted("scan cancelled"));
        }

        Ok(stats)
    }
}

impl Stream for RowStream {
    type Item = Result<Row>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.terminated {
            return Poll::Ready(None);
        }

        if self.cancellation_token.is_cancelled() {
            return Poll::Ready(Some(self.report_cancellation()));
        }

        match self.receiver.poll_recv(cx) {
            // the scanner may have stopped on the token while we were parked
            Poll::Ready(None) if self.cancellation_token.is_cancelled() => {
                Poll::Ready(Some(self.report_cancellation()))
            }
            Poll::Ready(None) => {
                self.terminated = true;
                Poll::Ready(None)
            }
            other => other,
        }
    }
}

impl RowStream {
    fn report_cancellation(&mut self) -> Result<Row> {
        self.terminated = true;
        self.receiver.close();
        debug!("Row stream cancelled by caller");
        Err(Error::scan_interrupted("scan cancelled"))
    }
}

/// Scan loop run on the blocking pool
fn scan_rows(plan: &ScanPlan, sender: &RowSender, token: &CancellationToken) -> Result<ScanStats> {
    info!(
        "Scanning {} ({}, {} fields)",
        plan.path.display(),
        plan.projection.mode(),
        plan.field_names.len()
    );

    let file = match File::open(&plan.path) {
        Ok(file) => file,
        Err(e) => {
            error!("Failed to open {}: {}", plan.path.display(), e);
            let _ = sender.blocking_send(Err(Error::io(
                format!("Failed to open {}", plan.path.display()),
                e,
            )));
            return Err(Error::scan_interrupted(format!(
                "could not open {}",
                plan.path.display()
            )));
        }
    };

    scan_reader(BufReader::new(file), plan, sender, token)
}

/// Scan any buffered reader with a prepared plan
pub(crate) fn scan_reader<R: BufRead>(
    reader: R,
    plan: &ScanPlan,
    sender: &RowSender,
    token: &CancellationToken,
) -> Result<ScanStats> {
    let mut lines = LogLineReader::new(reader);
    let mut stats = ScanStats::new();

    loop {
        if token.is_cancelled() {
            info!(
                "Scan of {} cancelled after {} lines",
                plan.path.display(),
                stats.lines_read
            );
            stats.cancelled = true;
            break;
        }

        let (line_number, line) = match lines.next_line() {
            Ok(Some(next)) => next,
            Ok(None) => break,
            Err(e) => {
                error!(
                    "Read failure in {} after line {}: {}",
                    plan.path.display(),
                    lines.line_number(),
                    e
                );
                let reason = format!(
                    "read failure in {} after line {}",
                    plan.path.display(),
                    lines.line_number()
                );
                let _ = sender.blocking_send(Err(Error::io(reason.clone(), e)));
                return Err(Error::scan_interrupted(reason));
            }
        };
        stats.lines_read += 1;

        match classify_line(&line, plan.comment_marker) {
            LineKind::Comment => {
                stats.comment_lines += 1;
                continue;
            }
            LineKind::Blank => {
                stats.blank_lines_skipped += 1;
                continue;
            }
            LineKind::Data => {}
        }

        let values: Vec<&str> = line.split(plan.separator).collect();

        let Some(extracted) = plan.projection.apply(&values) else {
            stats.mismatched_rows += 1;
            if stats.mismatched_rows <= MISMATCH_WARN_LIMIT {
                warn!(
                    "Skipping line {} of {}: {} columns do not fit {} fields",
                    line_number,
                    plan.path.display(),
                    values.len(),
                    plan.field_names.len()
                );
            } else {
                debug!("Skipping mismatched line {}", line_number);
            }
            continue;
        };

        let row = match &plan.transform {
            Some(transform) => match transform.transform(&plan.field_names, &extracted) {
                Ok(transformed) => transformed,
                Err(e) => {
                    stats.transform_fallbacks += 1;
                    if stats.transform_fallbacks <= MISMATCH_WARN_LIMIT {
                        warn!("Line {}: {}, emitting raw values", line_number, e);
                    }
                    extracted
                }
            },
            None => extracted,
        };

        if sender.blocking_send(Ok(row)).is_err() {
            debug!(
                "Row stream closed by consumer at line {}, stopping scan",
                line_number
            );
            stats.consumer_closed = true;
            break;
        }
        stats.rows_emitted += 1;
    }

    info!(
        "Scanned {}: {} rows emitted, {} mismatched, {} transform fallbacks",
        plan.path.display(),
        stats.rows_emitted,
        stats.mismatched_rows,
        stats.transform_fallbacks
    );

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_line() {
        assert!(matches!(classify_line("", '#'), LineKind::Blank));
        assert!(matches!(classify_line("#", '#'), LineKind::Comment));
        assert!(matches!(classify_line("#close\t2020", '#'), LineKind::Comment));
        assert!(matches!(classify_line("1", '#'), LineKind::Blank));
        assert!(matches!(classify_line("1\t2", '#'), LineKind::Data));
        assert!(matches!(classify_line("é", '#'), LineKind::Blank));
    }

    #[test]
    fn test_projection_all_requires_exact_count() {
        let projection = Projection::All {
            expected_columns: 2,
        };
        assert_eq!(
            projection.apply(&["1", "2"]),
            Some(vec!["1".to_string(), "2".to_string()])
        );
        assert_eq!(projection.apply(&["1"]), None);
        assert_eq!(projection.apply(&["1", "2", "3"]), None);
    }

    #[test]
    fn test_projection_selected_needs_highest_index() {
        let header = super::super::LogHeader::new(vec![
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
        ]);
        let index = FieldIndex::resolve(&header, &["c".to_string(), "a".to_string()]).unwrap();
        assert_eq!(index.required_columns(), 3);

        let projection = Projection::Selected(index);
        assert_eq!(projection.apply(&["1", "2"]), None);
        assert_eq!(
            projection.apply(&["1", "2", "3", "4"]),
            Some(vec!["3".to_string(), "1".to_string()])
        );
    }

    #[test]
    fn test_row_buffer_minimum_capacity() {
        assert_eq!(RowBuffer::new(0).capacity(), 1);
        assert_eq!(RowBuffer::new(16).capacity(), 16);
    }
}
