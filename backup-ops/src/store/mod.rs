//! Metadata store contract and the records a run persists.
//!
//! Records are write-once: a run writes its details payload, then a summary
//! record that references it, and never updates or deletes either.

mod memory;
mod models;

pub use memory::InMemoryModelStore;
pub use models::{BackupDetailsModel, BackupRecord};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cancellation::CancellationToken;
use crate::errors::SubsystemError;

/// The kind of record written to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSchema {
    /// Details payload describing the backed-up items.
    BackupDetails,
    /// Summary record of a backup run.
    Backup,
}

impl fmt::Display for ModelSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BackupDetails => write!(f, "backup details"),
            Self::Backup => write!(f, "backup"),
        }
    }
}

/// Storage contract for run records.
///
/// Implementations must be `Send + Sync` for use behind `Arc<dyn ModelStore>`.
#[async_trait]
pub trait ModelStore: Send + Sync {
    /// Writes `record` under `(schema, id)`.
    ///
    /// # Errors
    ///
    /// Returns `SubsystemError` on storage failure, on cancellation, or when
    /// a record already exists under the same key.
    async fn put(
        &self,
        cancel: &CancellationToken,
        schema: ModelSchema,
        id: &str,
        record: serde_json::Value,
    ) -> Result<(), SubsystemError>;
}
