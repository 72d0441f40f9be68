//! Operation identity.

use serde::{Deserialize, Serialize};

use crate::utils::{generate_run_id, RunId};

/// Version tag recorded on every backup this crate writes.
pub const BACKUP_VERSION: &str = "v0";

/// Identifies one backup operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationIdentity {
    /// Unique run identifier, fixed at construction.
    pub id: RunId,
    /// Version tag of the operation.
    pub version: String,
}

impl OperationIdentity {
    /// Creates a fresh identity with a random run id.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: generate_run_id(),
            version: BACKUP_VERSION.to_string(),
        }
    }
}

impl Default for OperationIdentity {
    fn default() -> Self {
        Self::new()
    }
}
