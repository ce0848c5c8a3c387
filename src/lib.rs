//! Bro Log Processor Library
//!
//! A Rust library for extracting structured records from tab-separated,
//! self-describing Bro (Zeek) network activity logs.
//!
//! This library provides tools for:
//! - Discovering a log's columns from its `#fields` directive
//! - Resolving a field selection to column indices
//! - Streaming selected columns through a bounded, backpressured buffer
//! - Rewriting rows with an optional per-row transform
//! - Tolerating malformed rows without aborting a scan

use std::path::PathBuf;

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod log_parser;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
    pub mod output;
}

// Re-export commonly used types
pub use app::models::{Row, ScanMode};
pub use app::services::log_parser::{
    LogHeader, LogParser, RowStream, RowTransform, ScanStats, TransformError,
    UnsetValueNormalizer,
};
pub use config::ProcessorConfig;

/// Result type alias for the Bro log processor
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Bro log processing operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Log file does not exist
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// No field selection was set while one is required
    #[error("No fields configured: {message}")]
    ConfigurationMissing { message: String },

    /// A selected field does not appear in the log header
    #[error("Couldn't match selected field with one in the log header, field is: {field}")]
    NotFound { field: String },

    /// The `#fields` directive line carries no column names
    #[error("Fields row is malformed in file '{path}': {line}")]
    MalformedHeader { path: PathBuf, line: String },

    /// The row buffer was not created before starting a scan
    #[error("Row buffer not initialized, create it with create_buffer() or auto_create_buffer()")]
    BufferNotInitialized,

    /// Scan was stopped before the file was exhausted
    #[error("Scan interrupted: {reason}")]
    ScanInterrupted { reason: String },

    /// Invalid configuration values or configuration file
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a file not found error
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a configuration missing error
    pub fn configuration_missing(message: impl Into<String>) -> Self {
        Self::ConfigurationMissing {
            message: message.into(),
        }
    }

    /// Create a field not found error
    pub fn not_found(field: impl Into<String>) -> Self {
        Self::NotFound {
            field: field.into(),
        }
    }

    /// Create a malformed header error
    pub fn malformed_header(path: impl Into<PathBuf>, line: impl Into<String>) -> Self {
        Self::MalformedHeader {
            path: path.into(),
            line: line.into(),
        }
    }

    /// Create a scan interrupted error
    pub fn scan_interrupted(reason: impl Into<String>) -> Self {
        Self::ScanInterrupted {
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether this error was raised before any row could be scanned
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound { .. }
                | Self::ConfigurationMissing { .. }
                | Self::NotFound { .. }
                | Self::MalformedHeader { .. }
                | Self::BufferNotInitialized
                | Self::Configuration { .. }
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<figment::Error> for Error {
    fn from(error: figment::Error) -> Self {
        Self::Configuration {
            message: error.to_string(),
        }
    }
}
