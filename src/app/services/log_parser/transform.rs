//! Per-row transform hook
//!
//! A transform receives the effective field names and one row's extracted
//! values and returns replacement values. It cannot drop a row: when it
//! fails, the row stream emits the untransformed extraction instead.

use crate::app::models::Row;
use crate::config::ProcessorConfig;

/// Failure reported by a [`RowTransform`]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Row transform failed: {message}")]
pub struct TransformError {
    pub message: String,
}

impl TransformError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Caller-supplied rewrite applied to every emitted row
///
/// Implementations must not keep references to their inputs. They run on the
/// scanning thread, hence `Send + Sync`.
pub trait RowTransform: Send + Sync {
    fn transform(&self, fields: &[String], values: &[String]) -> Result<Row, TransformError>;
}

impl<F> RowTransform for F
where
    F: Fn(&[String], &[String]) -> Result<Row, TransformError> + Send + Sync,
{
    fn transform(&self, fields: &[String], values: &[String]) -> Result<Row, TransformError> {
        self(fields, values)
    }
}

/// Replaces Bro's unset (`-`) and empty-container (`(empty)`) markers with
/// empty strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsetValueNormalizer {
    unset_field: String,
    empty_field: String,
}

impl UnsetValueNormalizer {
    pub fn new(unset_field: impl Into<String>, empty_field: impl Into<String>) -> Self {
        Self {
            unset_field: unset_field.into(),
            empty_field: empty_field.into(),
        }
    }

    pub fn from_config(config: &ProcessorConfig) -> Self {
        Self::new(config.unset_field.clone(), config.empty_field.clone())
    }
}

impl Default for UnsetValueNormalizer {
    fn default() -> Self {
        Self::from_config(&ProcessorConfig::default())
    }
}

impl RowTransform for UnsetValueNormalizer {
    fn transform(&self, fields: &[String], values: &[String]) -> Result<Row, TransformError> {
        if fields.len() != values.len() {
            return Err(TransformError::new(format!(
                "expected {} values, got {}",
                fields.len(),
                values.len()
            )));
        }

        Ok(values
            .iter()
            .map(|value| {
                if *value == self.unset_field || *value == self.empty_field {
                    String::new()
                } else {
                    value.clone()
                }
            })
            .collect())
    }
}
