//! Test assertions for backup runs.

use crate::core::OpStatus;
use crate::errors::BackupOpsError;
use crate::events::{kinds, CollectingEventSink};
use crate::operation::BackupOperation;
use crate::store::InMemoryModelStore;

/// Asserts that the operation reached a terminal status with both result
/// timestamps set.
pub fn assert_terminal(op: &BackupOperation) {
    assert!(
        op.status().is_terminal(),
        "Expected terminal status, got {:?}",
        op.status()
    );
    assert!(
        op.results().times.is_complete(),
        "Expected both timestamps set, got {:?}",
        op.results().times
    );
}

/// Asserts that a run failed and that its error mentions every `fragment`.
pub fn assert_failed_with(op: &BackupOperation, err: &BackupOpsError, fragments: &[&str]) {
    assert_eq!(op.status(), OpStatus::Failed, "Expected Failed status");
    let msg = err.to_string();
    for fragment in fragments {
        assert!(
            msg.contains(fragment),
            "Expected error to contain '{fragment}', got: {msg}"
        );
    }
}

/// Asserts that exactly one end event was emitted with the given status, and
/// returns its payload.
pub fn assert_end_event(events: &CollectingEventSink, status: OpStatus) -> serde_json::Value {
    let ends = events.events_of_type(kinds::BACKUP_END);
    assert_eq!(ends.len(), 1, "Expected one end event, got {}", ends.len());

    let payload = ends[0].1.clone().unwrap_or_default();
    assert_eq!(
        payload[kinds::STATUS],
        status.to_string(),
        "Unexpected end status in {payload}"
    );
    payload
}

/// Asserts that the store holds no records.
pub fn assert_no_records(store: &InMemoryModelStore) {
    assert!(
        store.is_empty(),
        "Expected no stored records, got {}",
        store.len()
    );
}
