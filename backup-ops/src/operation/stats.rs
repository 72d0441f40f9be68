//! Phase outcome accumulator.

use crate::core::{ConnectorStatus, EngineStats};
use crate::errors::BackupOpsError;

/// What the phases of a run produced, readable at finalization no matter
/// where the sequence stopped.
///
/// Every field defaults to an empty value, so a run that fails before a
/// phase executes still finalizes from a fully-initialized record.
#[derive(Debug, Clone, Default)]
pub struct BackupStats {
    /// True once the consume phase completed.
    pub started: bool,
    /// Error from connecting, enumerating, or connector item failures.
    pub read_err: Option<BackupOpsError>,
    /// Error from ingesting into the backup engine.
    pub write_err: Option<BackupOpsError>,
    /// Distinct resource owners across the produced collections.
    pub resource_count: u64,
    /// Statistics reported by the backup engine.
    pub engine: EngineStats,
    /// Completion status reported by the connector.
    pub connector: ConnectorStatus,
}

impl BackupStats {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a read-side error. An earlier read error is kept.
    pub fn record_read_err(&mut self, err: BackupOpsError) {
        if self.read_err.is_none() {
            self.read_err = Some(err);
        }
    }

    /// Records a write-side error. An earlier write error is kept.
    pub fn record_write_err(&mut self, err: BackupOpsError) {
        if self.write_err.is_none() {
            self.write_err = Some(err);
        }
    }

    /// Returns true if neither error slot is populated.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.read_err.is_none() && self.write_err.is_none()
    }
}
