//! Error types for backup operations.
//!
//! Phase failures are captured by the run instead of being returned
//! immediately, so every type here is `Clone`: the classifier needs to build
//! an aggregate out of errors it does not own.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::ModelSchema;

/// The main error type for backup operations.
#[derive(Debug, Clone, Error)]
pub enum BackupOpsError {
    /// Preconditions for the operation did not hold.
    #[error("{0}")]
    InvalidOperation(#[from] InvalidOperationError),

    /// Establishing the source connection failed.
    #[error("connecting to source: {0}")]
    Connect(#[source] SubsystemError),

    /// Enumerating the collections to back up failed.
    #[error("retrieving data to backup: {0}")]
    Produce(#[source] SubsystemError),

    /// Ingesting the collections into the backup engine failed.
    #[error("backing up service data: {0}")]
    Consume(#[source] SubsystemError),

    /// The connector drained, but reported item-level failures.
    #[error("connector reported {count} failed items: {message}")]
    PartialRead {
        /// Number of items the connector failed to read.
        count: u64,
        /// The connector's description of the failures.
        message: String,
    },

    /// Finalization was reached without a details manifest.
    #[error("no backup details to record")]
    MissingManifest,

    /// Writing a record to the model store failed.
    #[error("creating {schema} model: {source}")]
    Persistence {
        /// The schema of the record that could not be written.
        schema: ModelSchema,
        /// The store's error.
        #[source]
        source: SubsystemError,
    },

    /// The run never reached a completed consume phase.
    #[error("errors prevented the operation from processing")]
    NotProcessed,

    /// Several errors reported together.
    #[error("{0}")]
    Aggregate(AggregateError),
}

impl BackupOpsError {
    /// Returns true if the error was caused by cancellation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Connect(e) | Self::Produce(e) | Self::Consume(e) => e.is_cancelled(),
            Self::Persistence { source, .. } => source.is_cancelled(),
            Self::Aggregate(agg) => agg.errors().iter().any(Self::is_cancelled),
            _ => false,
        }
    }

    /// Returns the aggregated errors, or a single-element slice for any
    /// other variant.
    #[must_use]
    pub fn causes(&self) -> Vec<&Self> {
        match self {
            Self::Aggregate(agg) => agg.errors().iter().collect(),
            other => vec![other],
        }
    }
}

/// Error returned by an external subsystem (connector, engine, store).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubsystemError {
    /// The call observed cancellation and returned early.
    #[error("operation cancelled: {0}")]
    Cancelled(String),

    /// The call failed.
    #[error("{0}")]
    Failure(String),
}

impl SubsystemError {
    /// Creates a failure error.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(message.into())
    }

    /// Creates a cancellation error.
    #[must_use]
    pub fn cancelled(reason: impl Into<String>) -> Self {
        Self::Cancelled(reason.into())
    }

    /// Returns true if this is a cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

/// Error raised when an operation cannot be constructed or started.
#[derive(Debug, Clone, Error)]
#[error("invalid backup operation: {message}")]
pub struct InvalidOperationError {
    /// The error message.
    pub message: String,
    /// The fields that failed validation.
    pub fields: Vec<String>,
}

impl InvalidOperationError {
    /// Creates a new invalid operation error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Sets the field involved.
    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.fields.push(field.into());
        self
    }
}

/// A multi-cause error. No cause is ever dropped or overwritten.
#[derive(Debug, Clone, Default)]
pub struct AggregateError {
    errors: Vec<BackupOpsError>,
}

impl AggregateError {
    /// Creates an empty aggregate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an error.
    pub fn push(&mut self, err: BackupOpsError) {
        self.errors.push(err);
    }

    /// Appends an error if present.
    pub fn push_opt(&mut self, err: Option<&BackupOpsError>) {
        if let Some(e) = err {
            self.errors.push(e.clone());
        }
    }

    /// Returns the collected errors in insertion order.
    #[must_use]
    pub fn errors(&self) -> &[BackupOpsError] {
        &self.errors
    }

    /// Returns the number of collected errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns true if no errors were collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.errors.len() == 1 { "error" } else { "errors" };
        write!(f, "{} {} occurred:", self.errors.len(), noun)?;
        for err in &self.errors {
            write!(f, "\n\t* {err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateError {}

/// Error raised when operation options cannot be loaded.
#[derive(Debug, Error)]
pub enum OptionsError {
    /// The options file could not be read.
    #[error("reading options file: {0}")]
    Io(#[from] std::io::Error),

    /// The options document is malformed.
    #[error("parsing options: {0}")]
    Parse(#[from] serde_json::Error),

    /// An option value is out of range.
    #[error("invalid option '{field}': {message}")]
    Invalid {
        /// The offending field.
        field: String,
        /// What is wrong with it.
        message: String,
    },
}

/// Serializable snapshot of an error, as stored in results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// The full error message.
    pub message: String,
    /// Whether the error came from cancellation.
    #[serde(default)]
    pub cancelled: bool,
}

impl From<&BackupOpsError> for ErrorRecord {
    fn from(err: &BackupOpsError) -> Self {
        Self {
            message: err.to_string(),
            cancelled: err.is_cancelled(),
        }
    }
}
