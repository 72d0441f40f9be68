//! Ports - the narrow contracts a backup run consumes.
//!
//! The coordinator never reimplements a collaborator. It talks to the data
//! source through [`Connector`] and [`SourceConnection`], to the storage
//! engine through [`BackupEngine`], to the metadata store through
//! [`ModelStore`], and reports through an [`EventSink`] and a
//! [`ProgressSurface`]. [`OperationPorts`] bundles the handles for one
//! operation.

use async_trait::async_trait;
use std::sync::Arc;

use crate::account::Account;
use crate::cancellation::CancellationToken;
use crate::core::{ConnectorStatus, DataCollection, Details, EngineStats};
use crate::errors::{InvalidOperationError, SubsystemError};
use crate::events::EventSink;
use crate::progress::ProgressSurface;
use crate::selectors::{PathService, Selector};
use crate::store::ModelStore;

/// Opens connections to the data source.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Acquires a live connection for `account`, scoped to `selector`.
    async fn connect(
        &self,
        cancel: &CancellationToken,
        account: &Account,
        selector: &Selector,
    ) -> Result<Arc<dyn SourceConnection>, SubsystemError>;
}

/// A live connection to the data source.
#[async_trait]
pub trait SourceConnection: Send + Sync {
    /// Enumerates the collections in scope for `selector`.
    async fn data_collections(
        &self,
        cancel: &CancellationToken,
        selector: &Selector,
    ) -> Result<Vec<DataCollection>, SubsystemError>;

    /// Returns the connector's completion status.
    ///
    /// Only meaningful after the consumer of the enumerated collections has
    /// finished draining them.
    async fn await_status(&self) -> ConnectorStatus;
}

/// The content-addressed storage engine that ingests collections.
#[async_trait]
pub trait BackupEngine: Send + Sync {
    /// Ingests `collections`, returning engine statistics and the details
    /// manifest of what was stored.
    async fn backup_collections(
        &self,
        cancel: &CancellationToken,
        collections: Vec<DataCollection>,
        service: PathService,
    ) -> Result<(EngineStats, Details), SubsystemError>;
}

/// Collaborator handles for one operation.
///
/// Every field is optional so missing handles surface as a validation
/// error instead of a construction-time panic.
#[derive(Clone, Default)]
pub struct OperationPorts {
    /// Source connector.
    pub connector: Option<Arc<dyn Connector>>,
    /// Backup engine.
    pub engine: Option<Arc<dyn BackupEngine>>,
    /// Metadata store.
    pub store: Option<Arc<dyn ModelStore>>,
    /// Lifecycle event bus.
    pub events: Option<Arc<dyn EventSink>>,
    /// Progress display.
    pub progress: Option<Arc<dyn ProgressSurface>>,
}

impl std::fmt::Debug for OperationPorts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationPorts")
            .field("has_connector", &self.connector.is_some())
            .field("has_engine", &self.engine.is_some())
            .field("has_store", &self.store.is_some())
            .field("has_events", &self.events.is_some())
            .field("has_progress", &self.progress.is_some())
            .finish()
    }
}

impl OperationPorts {
    /// Creates empty ports.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the connector.
    #[must_use]
    pub fn with_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Sets the backup engine.
    #[must_use]
    pub fn with_engine(mut self, engine: Arc<dyn BackupEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Sets the model store.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn ModelStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = Some(events);
        self
    }

    /// Sets the progress surface.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSurface>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Returns the names of required handles that are missing.
    ///
    /// Events and progress are optional and fall back to no-op
    /// implementations.
    #[must_use]
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.connector.is_none() {
            missing.push("connector");
        }
        if self.engine.is_none() {
            missing.push("engine");
        }
        if self.store.is_none() {
            missing.push("store");
        }
        missing
    }

    /// Validates that every required handle is present.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperationError` naming the missing handles.
    pub fn validate(&self) -> Result<(), InvalidOperationError> {
        let missing = self.missing();
        if missing.is_empty() {
            return Ok(());
        }

        let mut err = InvalidOperationError::new(format!("missing {}", missing.join(", ")));
        for name in missing {
            err = err.with_field(name);
        }
        Err(err)
    }
}
