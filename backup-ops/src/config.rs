//! Configuration for backup operations.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::OptionsError;

/// Options controlling how a backup operation runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationOptions {
    /// Suppress lifecycle events.
    #[serde(default)]
    pub disable_metrics: bool,
    /// Suppress progress display.
    #[serde(default)]
    pub hide_progress: bool,
    /// Record connector-reported item failures as a read error.
    #[serde(default = "default_fail_on_partial_read")]
    pub fail_on_partial_read: bool,
    /// Service label used in telemetry instead of the selector's service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_label: Option<String>,
}

fn default_fail_on_partial_read() -> bool {
    true
}

impl Default for OperationOptions {
    fn default() -> Self {
        Self {
            disable_metrics: false,
            hide_progress: false,
            fail_on_partial_read: default_fail_on_partial_read(),
            service_label: None,
        }
    }
}

impl OperationOptions {
    /// Creates options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Disables lifecycle events.
    #[must_use]
    pub fn with_metrics_disabled(mut self) -> Self {
        self.disable_metrics = true;
        self
    }

    /// Hides progress display.
    #[must_use]
    pub fn with_progress_hidden(mut self) -> Self {
        self.hide_progress = true;
        self
    }

    /// Sets whether connector item failures count as read errors.
    #[must_use]
    pub fn with_fail_on_partial_read(mut self, enabled: bool) -> Self {
        self.fail_on_partial_read = enabled;
        self
    }

    /// Sets the telemetry service label.
    #[must_use]
    pub fn with_service_label(mut self, label: impl Into<String>) -> Self {
        self.service_label = Some(label.into());
        self
    }

    /// Parses options from a JSON document and validates them.
    ///
    /// # Errors
    ///
    /// Returns `OptionsError::Parse` for malformed JSON and
    /// `OptionsError::Invalid` for out-of-range values.
    pub fn from_json_str(s: &str) -> Result<Self, OptionsError> {
        let opts: Self = serde_json::from_str(s)?;
        opts.validate()?;
        Ok(opts)
    }

    /// Loads options from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `OptionsError::Io` if the file cannot be read, otherwise as
    /// [`Self::from_json_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, OptionsError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Validates option values.
    ///
    /// # Errors
    ///
    /// Returns `OptionsError::Invalid` if the service label is blank.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if let Some(label) = &self.service_label {
            if label.trim().is_empty() {
                return Err(OptionsError::Invalid {
                    field: "service_label".to_string(),
                    message: "must not be blank".to_string(),
                });
            }
        }
        Ok(())
    }
}
