//! Lifecycle event kinds and attribute keys.

/// Emitted before a backup run connects to its source.
pub const BACKUP_START: &str = "backup.start";
/// Emitted once a backup run has finalized.
pub const BACKUP_END: &str = "backup.end";

/// Run identifier.
pub const BACKUP_ID: &str = "backup_id";
/// Service the run covered.
pub const SERVICE: &str = "service";
/// Run start time (ISO 8601).
pub const START_TIME: &str = "start_time";
/// Run end time (ISO 8601).
pub const END_TIME: &str = "end_time";
/// Run duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";
/// Bytes uploaded to the backup engine.
pub const DATA_STORED: &str = "data_stored";
/// Distinct resource owners touched.
pub const RESOURCES: &str = "resources";
/// Terminal status of the run.
pub const STATUS: &str = "status";
/// Snapshot reference, when one was produced.
pub const SNAPSHOT_ID: &str = "snapshot_id";
/// Error description on failed runs.
pub const ERROR: &str = "error";
