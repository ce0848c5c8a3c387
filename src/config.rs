//! Configuration management and validation.
//!
//! Provides the processing configuration for log scanning: format markers,
//! row buffer sizing and the values recognised by the unset-value
//! normalizer. Configuration is layered: defaults, then an optional TOML
//! file, then `BROLOG_` environment variables. CLI overrides are applied by
//! the command layer afterwards.

use crate::constants::{
    APP_CONFIG_DIR, COMMENT_MARKER, CONFIG_FILE_NAME, DEFAULT_MAX_BUFFER_CAPACITY,
    EMPTY_FIELD_VALUE, ENV_PREFIX, FIELD_SEPARATOR, FIELDS_DIRECTIVE, LINE_COUNT_CHUNK_SIZE,
    MIN_BUFFER_CAPACITY, UNSET_FIELD_VALUE,
};
use crate::{Error, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Global configuration for Bro log processing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Column separator for directive and data lines
    pub separator: char,

    /// Leading character of comment and directive lines
    pub comment_marker: char,

    /// Directive that declares the column names
    pub fields_directive: String,

    /// Fixed row buffer capacity; `None` sizes the buffer from the line count
    pub buffer_capacity: Option<usize>,

    /// Ceiling for auto-sized buffers
    pub max_buffer_capacity: usize,

    /// Read chunk size used by the line counter
    pub line_count_chunk_size: usize,

    /// Marker Bro writes for unset fields
    pub unset_field: String,

    /// Marker Bro writes for empty containers
    pub empty_field: String,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            separator: FIELD_SEPARATOR,
            comment_marker: COMMENT_MARKER,
            fields_directive: FIELDS_DIRECTIVE.to_string(),
            buffer_capacity: None,
            max_buffer_capacity: DEFAULT_MAX_BUFFER_CAPACITY,
            line_count_chunk_size: LINE_COUNT_CHUNK_SIZE,
            unset_field: UNSET_FIELD_VALUE.to_string(),
            empty_field: EMPTY_FIELD_VALUE.to_string(),
        }
    }
}

impl ProcessorConfig {
    /// Set a fixed row buffer capacity
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = Some(capacity);
        self
    }

    /// Size the row buffer from the file's line count
    pub fn with_auto_buffer(mut self) -> Self {
        self.buffer_capacity = None;
        self
    }

    /// Set the ceiling for auto-sized buffers
    pub fn with_max_buffer_capacity(mut self, capacity: usize) -> Self {
        self.max_buffer_capacity = capacity;
        self
    }

    /// Set the column separator
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Set the line counter chunk size
    pub fn with_line_count_chunk_size(mut self, chunk_size: usize) -> Self {
        self.line_count_chunk_size = chunk_size;
        self
    }

    /// Clamp a requested capacity into the range a bounded channel accepts
    pub fn clamp_capacity(&self, requested: usize) -> usize {
        requested.clamp(MIN_BUFFER_CAPACITY, self.max_buffer_capacity.max(MIN_BUFFER_CAPACITY))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.fields_directive.is_empty() {
            return Err(Error::configuration("fields_directive cannot be empty"));
        }

        if !self.fields_directive.starts_with(self.comment_marker) {
            return Err(Error::configuration(format!(
                "fields_directive '{}' must start with the comment marker '{}'",
                self.fields_directive, self.comment_marker
            )));
        }

        if self.separator == self.comment_marker {
            return Err(Error::configuration(
                "separator and comment_marker must differ",
            ));
        }

        if self.separator == '\n' || self.separator == '\r' {
            return Err(Error::configuration("separator cannot be a line terminator"));
        }

        if self.max_buffer_capacity < MIN_BUFFER_CAPACITY {
            return Err(Error::configuration(
                "max_buffer_capacity must be greater than 0",
            ));
        }

        if self.buffer_capacity == Some(0) {
            return Err(Error::configuration(
                "buffer_capacity must be greater than 0",
            ));
        }

        if self.line_count_chunk_size == 0 {
            return Err(Error::configuration(
                "line_count_chunk_size must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Default configuration file location (~/.config/brolog-processor/config.toml)
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::configuration("Could not determine user config directory"))?;
        Ok(config_dir.join(APP_CONFIG_DIR).join(CONFIG_FILE_NAME))
    }

    /// Load configuration with layering: defaults -> TOML file -> environment
    pub fn load_layered(config_file: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(ProcessorConfig::default()));

        if let Some(path) = config_file {
            if !path.exists() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    path.display()
                )));
            }
            debug!("Merging config file: {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        let config: ProcessorConfig = figment.merge(Env::prefixed(ENV_PREFIX)).extract()?;
        config.validate()?;

        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }
}
