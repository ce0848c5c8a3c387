//! Scan statistics for Bro log processing
//!
//! Row-level anomalies never abort a scan; they are counted here instead so
//! callers can judge how much of a file made it into the stream.

use serde::{Deserialize, Serialize};

/// Counters collected by one row stream scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Lines read from the file, including comments
    pub lines_read: usize,

    /// Lines starting with the comment marker (directives included)
    pub comment_lines: usize,

    /// Empty or single-character lines
    pub blank_lines_skipped: usize,

    /// Rows pushed onto the stream
    pub rows_emitted: usize,

    /// Data rows skipped because their column count did not fit
    pub mismatched_rows: usize,

    /// Rows emitted untransformed because the transform failed
    pub transform_fallbacks: usize,

    /// Scan stopped by its cancellation token
    pub cancelled: bool,

    /// Scan stopped because the consumer closed the stream
    pub consumer_closed: bool,
}

impl ScanStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Data lines seen (emitted or skipped as mismatched)
    pub fn data_lines(&self) -> usize {
        self.rows_emitted + self.mismatched_rows
    }

    /// Percentage of data lines that were emitted
    pub fn emission_rate(&self) -> f64 {
        let data_lines = self.data_lines();
        if data_lines == 0 {
            0.0
        } else {
            (self.rows_emitted as f64 / data_lines as f64) * 100.0
        }
    }

    /// Whether the whole file was scanned
    pub fn is_complete(&self) -> bool {
        !self.cancelled && !self.consumer_closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emission_rate() {
        assert_eq!(ScanStats::new().emission_rate(), 0.0);

        let stats = ScanStats {
            rows_emitted: 3,
            mismatched_rows: 1,
            ..Default::default()
        };
        assert_eq!(stats.data_lines(), 4);
        assert_eq!(stats.emission_rate(), 75.0);
    }

    #[test]
    fn test_is_complete() {
        assert!(ScanStats::new().is_complete());

        let cancelled = ScanStats {
            cancelled: true,
            ..Default::default()
        };
        assert!(!cancelled.is_complete());

        let closed = ScanStats {
            consumer_closed: true,
            ..Default::default()
        };
        assert!(!closed.is_complete());
    }
}
