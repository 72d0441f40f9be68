//! The details manifest: what a run backed up.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::utils::Timestamp;

const SHORT_REF_LEN: usize = 12;

/// Returns the short reference for a repo ref: the first 12 hex characters
/// of its SHA-256 digest.
#[must_use]
pub fn short_ref(repo_ref: &str) -> String {
    let digest = Sha256::digest(repo_ref.as_bytes());
    let mut hexed = hex::encode(digest);
    hexed.truncate(SHORT_REF_LEN);
    hexed
}

/// One backed-up item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailsEntry {
    /// Full path of the item inside the snapshot.
    pub repo_ref: String,
    /// Stable short identifier derived from `repo_ref`.
    pub short_ref: String,
    /// Short ref of the containing folder, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_ref: Option<String>,
    /// Size of the item in bytes.
    pub size: u64,
    /// Last modification time reported by the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<Timestamp>,
}

impl DetailsEntry {
    /// Creates an entry, deriving its short ref.
    #[must_use]
    pub fn new(repo_ref: impl Into<String>, size: u64) -> Self {
        let repo_ref = repo_ref.into();
        Self {
            short_ref: short_ref(&repo_ref),
            repo_ref,
            parent_ref: None,
            size,
            modified: None,
        }
    }

    /// Sets the parent folder's repo ref.
    #[must_use]
    pub fn with_parent(mut self, parent_repo_ref: &str) -> Self {
        self.parent_ref = Some(short_ref(parent_repo_ref));
        self
    }

    /// Sets the modification time.
    #[must_use]
    pub fn with_modified(mut self, modified: Timestamp) -> Self {
        self.modified = Some(modified);
        self
    }
}

/// Manifest of the items a run backed up, produced by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Details {
    /// Backed-up entries in the order the engine reported them.
    pub entries: Vec<DetailsEntry>,
}

impl Details {
    /// Creates an empty manifest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry.
    pub fn add(&mut self, entry: DetailsEntry) {
        self.entries.push(entry);
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the manifest is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finds an entry by short ref.
    #[must_use]
    pub fn find(&self, short_ref: &str) -> Option<&DetailsEntry> {
        self.entries.iter().find(|e| e.short_ref == short_ref)
    }
}
