//! In-process model store.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use super::{ModelSchema, ModelStore};
use crate::cancellation::CancellationToken;
use crate::errors::SubsystemError;

/// A write-once model store kept in memory.
#[derive(Debug, Default)]
pub struct InMemoryModelStore {
    records: DashMap<(ModelSchema, String), serde_json::Value>,
}

impl InMemoryModelStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record stored under `(schema, id)`.
    #[must_use]
    pub fn get(&self, schema: ModelSchema, id: &str) -> Option<serde_json::Value> {
        self.records
            .get(&(schema, id.to_string()))
            .map(|r| r.value().clone())
    }

    /// Returns the number of records of `schema`.
    #[must_use]
    pub fn count(&self, schema: ModelSchema) -> usize {
        self.records.iter().filter(|r| r.key().0 == schema).count()
    }

    /// Returns the total number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the ids stored under `schema`, sorted.
    #[must_use]
    pub fn ids(&self, schema: ModelSchema) -> Vec<String> {
        let mut ids: Vec<String> = self
            .records
            .iter()
            .filter(|r| r.key().0 == schema)
            .map(|r| r.key().1.clone())
            .collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl ModelStore for InMemoryModelStore {
    async fn put(
        &self,
        cancel: &CancellationToken,
        schema: ModelSchema,
        id: &str,
        record: serde_json::Value,
    ) -> Result<(), SubsystemError> {
        if cancel.is_cancelled() {
            return Err(cancel.to_error());
        }

        match self.records.entry((schema, id.to_string())) {
            Entry::Occupied(_) => Err(SubsystemError::failure(format!(
                "{schema} record {id} already exists"
            ))),
            Entry::Vacant(slot) => {
                slot.insert(record);
                debug!(%schema, id, "stored model");
                Ok(())
            }
        }
    }
}
