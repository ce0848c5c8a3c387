//! Command-line argument definitions for the Bro log processor
//!
//! This module defines the CLI interface using the clap derive API.

use crate::{Error, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;

/// CLI arguments for the Bro log processor
///
/// Extracts structured records from tab-separated, self-describing Bro
/// (Zeek) network activity logs.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "brolog-processor",
    version,
    about = "Extract selected columns from Bro/Zeek logs",
    long_about = "Reads the #fields header of a Bro (Zeek) log, resolves the requested columns \
                  and streams every data row through a bounded buffer. Malformed rows are \
                  skipped and counted instead of aborting the run."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    ///
    /// TOML configuration file for format markers and buffer sizing. If not
    /// specified, looks for ~/.config/brolog-processor/config.toml
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        global = true,
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Available subcommands for the Bro log processor
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// List the columns declared by a log's #fields directive
    Fields(FieldsArgs),
    /// Count the lines of a log
    Count(CountArgs),
    /// Stream selected columns of every data row
    Extract(ExtractArgs),
}

/// Arguments for the fields command
#[derive(Debug, Clone, Parser)]
pub struct FieldsArgs {
    /// Bro log file to inspect
    #[arg(value_name = "FILE")]
    pub log_file: PathBuf,

    /// Replace dots in field names with underscores
    #[arg(long = "underscore", help = "Print field names with '.' replaced by '_'")]
    pub underscore: bool,
}

/// Arguments for the count command
#[derive(Debug, Clone, Parser)]
pub struct CountArgs {
    /// Bro log file to count
    #[arg(value_name = "FILE")]
    pub log_file: PathBuf,
}

/// Arguments for the extract command (main row streaming)
#[derive(Debug, Clone, Parser)]
pub struct ExtractArgs {
    /// Bro log file to extract rows from
    #[arg(value_name = "FILE")]
    pub log_file: PathBuf,

    /// Fields to extract (comma-separated list)
    ///
    /// Names must match the #fields header exactly, e.g. id.orig_h,id.resp_h.
    /// If not specified, every column is extracted and rows whose column
    /// count differs from the header are skipped.
    #[arg(
        short = 'f',
        long = "fields",
        value_name = "LIST",
        help = "Comma-separated list of fields to extract (default: all fields)"
    )]
    pub fields: Option<FieldList>,

    /// Row buffer capacity
    ///
    /// Overrides the configured capacity. If neither is set, the buffer is
    /// sized from the file's line count.
    #[arg(
        short = 'b',
        long = "buffer",
        value_name = "ROWS",
        help = "Row buffer capacity (default: sized from line count)"
    )]
    pub buffer_capacity: Option<usize>,

    /// Replace unset (-) and empty ((empty)) markers with empty strings
    #[arg(
        long = "normalize-unset",
        help = "Replace Bro unset and empty markers with empty values"
    )]
    pub normalize_unset: bool,

    /// Use identifier-safe field names in the output header
    #[arg(
        long = "underscore-names",
        help = "Replace '.' with '_' in output field names"
    )]
    pub underscore_names: bool,

    /// Output format
    #[arg(
        long = "format",
        value_enum,
        default_value = "tsv",
        help = "Output format for extracted rows"
    )]
    pub format: RowFormat,

    /// Output file for extracted rows
    ///
    /// If not specified, rows are written to stdout
    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help = "Output file for extracted rows"
    )]
    pub output_file: Option<PathBuf>,
}

/// Output formats for extracted rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RowFormat {
    /// Tab-separated values with a header line
    Tsv,
    /// One JSON object per row, keyed by field name
    Json,
    /// Comma-separated values with a header record
    Csv,
}

/// Wrapper for parsing comma-separated field lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldList {
    pub fields: Vec<String>,
}

impl FromStr for FieldList {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let fields: Vec<String> = s
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if fields.is_empty() {
            return Err(Error::configuration("Field list cannot be empty"));
        }

        Ok(FieldList { fields })
    }
}

impl Args {
    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress spinners (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

impl ExtractArgs {
    /// Validate the extract command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if self.buffer_capacity == Some(0) {
            return Err(Error::configuration(
                "Buffer capacity must be greater than 0",
            ));
        }

        if let Some(output_file) = &self.output_file {
            if let Some(parent) = output_file.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    return Err(Error::configuration(format!(
                        "Output file directory does not exist: {}",
                        parent.display()
                    )));
                }
            }
        }

        Ok(())
    }

    /// Whether every column is extracted
    pub fn all_fields(&self) -> bool {
        self.fields.is_none()
    }
}
