//! Statistics reported by collaborators and recorded on results.

use serde::{Deserialize, Serialize};

use crate::utils::Timestamp;

/// Statistics reported by the backup engine after ingesting collections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    /// Bytes hashed while ingesting (everything read from collections).
    pub total_hashed_bytes: u64,
    /// Bytes actually uploaded after deduplication.
    pub total_uploaded_bytes: u64,
    /// Number of files written into the snapshot.
    pub total_file_count: u64,
    /// Number of directories written into the snapshot.
    pub total_directory_count: u64,
    /// The engine's reference to the resulting snapshot.
    pub snapshot_id: String,
}

/// Completion status reported by the connector once it has drained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorStatus {
    /// Number of objects the connector attempted to read.
    pub object_count: u64,
    /// Number of folders the connector walked.
    pub folder_count: u64,
    /// Number of items read successfully.
    pub successful: u64,
    /// Number of items that failed to read.
    pub error_count: u64,
    /// Description of the item failures, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConnectorStatus {
    /// Creates a status for a clean read of `successful` items.
    #[must_use]
    pub fn successful(successful: u64) -> Self {
        Self {
            object_count: successful,
            successful,
            ..Self::default()
        }
    }

    /// Adds item failures to the status.
    #[must_use]
    pub fn with_errors(mut self, count: u64, message: impl Into<String>) -> Self {
        self.object_count += count;
        self.error_count = count;
        self.error = Some(message.into());
        self
    }

    /// Returns true if the connector reported item failures.
    #[must_use]
    pub const fn has_errors(&self) -> bool {
        self.error_count > 0 || self.error.is_some()
    }
}

/// Read/write metrics of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadWrites {
    /// Bytes read from the source.
    pub bytes_read: u64,
    /// Bytes uploaded to the backup engine.
    pub bytes_uploaded: u64,
    /// Items read from the source.
    pub items_read: u64,
    /// Items written to the snapshot.
    pub items_written: u64,
    /// Distinct resource owners touched.
    pub resource_owners: u64,
}

/// Start and end timestamps of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartAndEndTime {
    /// When the run started.
    pub started_at: Option<Timestamp>,
    /// When the run finished.
    pub completed_at: Option<Timestamp>,
}

impl StartAndEndTime {
    /// Returns the run duration, or zero if either end is missing.
    #[must_use]
    pub fn duration(&self) -> chrono::Duration {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => end - start,
            _ => chrono::Duration::zero(),
        }
    }

    /// Returns true if both timestamps are set.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.started_at.is_some() && self.completed_at.is_some()
    }
}
