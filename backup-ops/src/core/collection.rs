//! Data collections produced by the connector and consumed by the engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::selectors::Service;

/// Location of a collection within the source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionPath {
    /// The tenant the data belongs to.
    pub tenant: String,
    /// The service the data comes from.
    pub service: Service,
    /// The owner of the data (user, mailbox, site).
    pub resource_owner: String,
    /// Category within the service (e.g. "email", "files").
    pub category: String,
    /// Folder elements below the category.
    pub folders: Vec<String>,
}

impl CollectionPath {
    /// Creates a path with no folder elements.
    #[must_use]
    pub fn new(
        tenant: impl Into<String>,
        service: Service,
        resource_owner: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            tenant: tenant.into(),
            service,
            resource_owner: resource_owner.into(),
            category: category.into(),
            folders: Vec::new(),
        }
    }

    /// Appends a folder element.
    #[must_use]
    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folders.push(folder.into());
        self
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.tenant, self.service, self.resource_owner, self.category
        )?;
        for folder in &self.folders {
            write!(f, "/{folder}")?;
        }
        Ok(())
    }
}

/// A single item within a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataItem {
    /// Source identifier of the item.
    pub id: String,
    /// Size of the item in bytes.
    pub size: u64,
}

impl DataItem {
    /// Creates a new item.
    #[must_use]
    pub fn new(id: impl Into<String>, size: u64) -> Self {
        Self { id: id.into(), size }
    }
}

/// A collection of items handed from the connector to the backup engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataCollection {
    /// Where the collection lives in the source.
    pub path: CollectionPath,
    /// Items enumerated for the collection.
    #[serde(default)]
    pub items: Vec<DataItem>,
}

impl DataCollection {
    /// Creates an empty collection at `path`.
    #[must_use]
    pub fn new(path: CollectionPath) -> Self {
        Self {
            path,
            items: Vec::new(),
        }
    }

    /// Adds an item.
    #[must_use]
    pub fn with_item(mut self, item: DataItem) -> Self {
        self.items.push(item);
        self
    }

    /// Returns the owner of the collection.
    #[must_use]
    pub fn resource_owner(&self) -> &str {
        &self.path.resource_owner
    }

    /// Returns the total size of the enumerated items.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.items.iter().map(|i| i.size).sum()
    }
}

/// Returns the distinct resource owners across `collections`.
#[must_use]
pub fn resource_owner_set(collections: &[DataCollection]) -> BTreeSet<String> {
    collections
        .iter()
        .map(|c| c.resource_owner().to_string())
        .collect()
}
