//! Application constants for the Bro log processor
//!
//! This module contains the log format markers, default values and buffer
//! sizing limits used throughout the processor.

// =============================================================================
// Log Format Markers
// =============================================================================

/// Directive that declares the column names of a log
pub const FIELDS_DIRECTIVE: &str = "#fields";

/// Leading character of directive and comment lines
pub const COMMENT_MARKER: char = '#';

/// Column separator used by Bro logs
pub const FIELD_SEPARATOR: char = '\t';

/// Value Bro writes for unset fields
pub const UNSET_FIELD_VALUE: &str = "-";

/// Value Bro writes for empty containers
pub const EMPTY_FIELD_VALUE: &str = "(empty)";

// =============================================================================
// Buffer Sizing
// =============================================================================

/// Chunk size for line counting reads (32 KiB)
pub const LINE_COUNT_CHUNK_SIZE: usize = 32 * 1024;

/// Smallest row buffer capacity; a bounded channel needs at least one slot
pub const MIN_BUFFER_CAPACITY: usize = 1;

/// Upper bound applied when auto-sizing the row buffer from a line count
pub const DEFAULT_MAX_BUFFER_CAPACITY: usize = 1_000_000;

/// Number of mismatched rows logged individually before going quiet
pub const MISMATCH_WARN_LIMIT: usize = 5;

// =============================================================================
// Configuration
// =============================================================================

/// Application directory name under the user's config directory
pub const APP_CONFIG_DIR: &str = "brolog-processor";

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "BROLOG_";
