//! Persisted record types.

use serde::{Deserialize, Serialize};

use crate::core::{Details, OpStatus, ReadWrites, StartAndEndTime};
use crate::errors::ErrorRecord;
use crate::selectors::Selector;
use crate::utils::{now_utc, RunId, Timestamp};

/// The details payload as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupDetailsModel {
    /// Store identifier of this record.
    pub id: String,
    /// The run that produced it.
    pub backup_id: RunId,
    /// The manifest itself.
    pub details: Details,
}

/// Summary record tying a run to its snapshot and details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRecord {
    /// The run identifier; also the record's store id.
    pub id: RunId,
    /// Snapshot reference produced by the backup engine.
    pub snapshot_id: String,
    /// Store id of the details record.
    pub details_id: String,
    /// Terminal status of the run.
    pub status: String,
    /// Version tag of the operation that wrote the record.
    pub version: String,
    /// The selector the run covered.
    pub selector: Selector,
    /// Read/write metrics.
    #[serde(flatten)]
    pub read_writes: ReadWrites,
    /// Run timestamps.
    #[serde(flatten)]
    pub times: StartAndEndTime,
    /// Read error retained on a completed run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_errors: Option<ErrorRecord>,
    /// Write error retained on a completed run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_errors: Option<ErrorRecord>,
    /// When the record was created.
    pub created_at: Timestamp,
}

impl BackupRecord {
    /// Creates a summary record.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        snapshot_id: impl Into<String>,
        details_id: impl Into<String>,
        status: OpStatus,
        id: RunId,
        version: impl Into<String>,
        selector: Selector,
        read_writes: ReadWrites,
        times: StartAndEndTime,
    ) -> Self {
        Self {
            id,
            snapshot_id: snapshot_id.into(),
            details_id: details_id.into(),
            status: status.to_string(),
            version: version.into(),
            selector,
            read_writes,
            times,
            read_errors: None,
            write_errors: None,
            created_at: now_utc(),
        }
    }

    /// Attaches the errors retained on the run's results.
    #[must_use]
    pub fn with_errors(mut self, read: Option<ErrorRecord>, write: Option<ErrorRecord>) -> Self {
        self.read_errors = read;
        self.write_errors = write;
        self
    }
}
