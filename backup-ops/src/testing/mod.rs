//! Testing utilities for backup runs.
//!
//! This module provides:
//! - Collaborator fakes for every port
//! - A fixture that wires them into a runnable operation
//! - Assertions over run results and lifecycle events

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{assert_end_event, assert_failed_with, assert_no_records, assert_terminal};
pub use fixtures::{
    sample_account, sample_collections, sample_details, sample_selector, BackupFixture,
    SAMPLE_OWNER, SAMPLE_TENANT,
};
pub use mocks::{
    FailingModelStore, MockBackupEngine, MockConnection, MockConnector, RecordingProgress,
    StalledEventSink,
};
