//! Hand-written collaborator fakes for backup runs.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

use crate::account::Account;
use crate::cancellation::CancellationToken;
use crate::core::{ConnectorStatus, DataCollection, Details, EngineStats};
use crate::errors::SubsystemError;
use crate::events::EventSink;
use crate::ports::{BackupEngine, Connector, SourceConnection};
use crate::progress::{ProgressSurface, ProgressTicket};
use crate::selectors::{PathService, Selector};
use crate::store::{InMemoryModelStore, ModelSchema, ModelStore};

/// A connector that hands out a fixed connection, or fails.
#[derive(Debug)]
pub struct MockConnector {
    connection: Arc<MockConnection>,
    error: Option<SubsystemError>,
    call_count: Mutex<usize>,
    tenants: Mutex<Vec<String>>,
}

impl MockConnector {
    /// Creates a connector that returns `connection`.
    #[must_use]
    pub fn new(connection: Arc<MockConnection>) -> Self {
        Self {
            connection,
            error: None,
            call_count: Mutex::new(0),
            tenants: Mutex::new(Vec::new()),
        }
    }

    /// Creates a connector whose `connect` always fails with `message`.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            error: Some(SubsystemError::failure(message)),
            ..Self::new(Arc::new(MockConnection::new()))
        }
    }

    /// Returns the number of connect calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.call_count.lock()
    }

    /// Returns the tenant of each connect call.
    #[must_use]
    pub fn tenants(&self) -> Vec<String> {
        self.tenants.lock().clone()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(
        &self,
        _cancel: &CancellationToken,
        account: &Account,
        _selector: &Selector,
    ) -> Result<Arc<dyn SourceConnection>, SubsystemError> {
        *self.call_count.lock() += 1;
        self.tenants.lock().push(account.tenant_id.clone());

        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(self.connection.clone()),
        }
    }
}

/// A connection that enumerates a fixed set of collections.
#[derive(Debug, Default)]
pub struct MockConnection {
    collections: Vec<DataCollection>,
    error: Option<SubsystemError>,
    status: ConnectorStatus,
    status_stalls: bool,
    status_calls: Mutex<usize>,
}

impl MockConnection {
    /// Creates a connection with no collections and a clean status.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the collections to enumerate.
    #[must_use]
    pub fn with_collections(mut self, collections: Vec<DataCollection>) -> Self {
        self.collections = collections;
        self
    }

    /// Makes enumeration fail with `message`.
    #[must_use]
    pub fn with_collections_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(SubsystemError::failure(message));
        self
    }

    /// Sets the status reported after ingestion.
    #[must_use]
    pub fn with_status(mut self, status: ConnectorStatus) -> Self {
        self.status = status;
        self
    }

    /// Makes the status never settle.
    #[must_use]
    pub fn with_stalled_status(mut self) -> Self {
        self.status_stalls = true;
        self
    }

    /// Returns how many times the status was awaited.
    #[must_use]
    pub fn status_calls(&self) -> usize {
        *self.status_calls.lock()
    }
}

#[async_trait]
impl SourceConnection for MockConnection {
    async fn data_collections(
        &self,
        _cancel: &CancellationToken,
        selector: &Selector,
    ) -> Result<Vec<DataCollection>, SubsystemError> {
        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(self
                .collections
                .iter()
                .filter(|c| selector.includes_category(&c.path.category))
                .cloned()
                .collect()),
        }
    }

    async fn await_status(&self) -> ConnectorStatus {
        *self.status_calls.lock() += 1;
        if self.status_stalls {
            std::future::pending::<()>().await;
        }
        self.status.clone()
    }
}

/// A backup engine that returns configured stats, or fails.
#[derive(Debug, Default)]
pub struct MockBackupEngine {
    stats: EngineStats,
    details: Details,
    error: Option<SubsystemError>,
    delay: Option<Duration>,
    call_count: Mutex<usize>,
    last_service: Mutex<Option<PathService>>,
    received: Mutex<Vec<DataCollection>>,
}

impl MockBackupEngine {
    /// Creates an engine that succeeds with empty stats.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the stats to report.
    #[must_use]
    pub fn with_stats(mut self, stats: EngineStats) -> Self {
        self.stats = stats;
        self
    }

    /// Sets the details manifest to report.
    #[must_use]
    pub fn with_details(mut self, details: Details) -> Self {
        self.details = details;
        self
    }

    /// Makes ingestion fail with `message`.
    #[must_use]
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(SubsystemError::failure(message));
        self
    }

    /// Makes ingestion take `delay` before answering.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Returns the number of ingest calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.call_count.lock()
    }

    /// Returns the service tag of the last ingest call.
    #[must_use]
    pub fn last_service(&self) -> Option<PathService> {
        *self.last_service.lock()
    }

    /// Returns the collections received by the last ingest call.
    #[must_use]
    pub fn received(&self) -> Vec<DataCollection> {
        self.received.lock().clone()
    }
}

#[async_trait]
impl BackupEngine for MockBackupEngine {
    async fn backup_collections(
        &self,
        _cancel: &CancellationToken,
        collections: Vec<DataCollection>,
        service: PathService,
    ) -> Result<(EngineStats, Details), SubsystemError> {
        *self.call_count.lock() += 1;
        *self.last_service.lock() = Some(service);
        *self.received.lock() = collections;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok((self.stats.clone(), self.details.clone())),
        }
    }
}

/// A progress surface that records every message and release.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    begun: Mutex<Vec<String>>,
    closed: Arc<Mutex<usize>>,
    completions: Mutex<usize>,
}

impl RecordingProgress {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the messages begun, in order.
    #[must_use]
    pub fn begun(&self) -> Vec<String> {
        self.begun.lock().clone()
    }

    /// Returns how many tickets were released.
    #[must_use]
    pub fn closed_count(&self) -> usize {
        *self.closed.lock()
    }

    /// Returns how many times the surface was completed.
    #[must_use]
    pub fn completion_count(&self) -> usize {
        *self.completions.lock()
    }
}

#[async_trait]
impl ProgressSurface for RecordingProgress {
    fn message_with_completion(&self, message: &str) -> ProgressTicket {
        self.begun.lock().push(message.to_string());

        let (done, _rx) = oneshot::channel();
        let closed = self.closed.clone();
        ProgressTicket::new(done, Box::new(move || *closed.lock() += 1))
    }

    async fn complete(&self) {
        *self.completions.lock() += 1;
    }
}

/// An event sink whose async delivery never completes. `try_emit` records.
#[derive(Debug, Default)]
pub struct StalledEventSink {
    queued: Mutex<Vec<String>>,
}

impl StalledEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the kinds accepted through `try_emit`.
    #[must_use]
    pub fn queued(&self) -> Vec<String> {
        self.queued.lock().clone()
    }
}

#[async_trait]
impl EventSink for StalledEventSink {
    async fn emit(&self, _event_type: &str, _data: Option<serde_json::Value>) {
        std::future::pending::<()>().await;
    }

    fn try_emit(&self, event_type: &str, _data: Option<serde_json::Value>) {
        self.queued.lock().push(event_type.to_string());
    }
}

/// A model store that fails writes of one schema and delegates the rest.
#[derive(Debug)]
pub struct FailingModelStore {
    inner: Arc<InMemoryModelStore>,
    fail_on: ModelSchema,
    message: String,
}

impl FailingModelStore {
    /// Creates a store that rejects every `fail_on` write with `message`.
    #[must_use]
    pub fn new(inner: Arc<InMemoryModelStore>, fail_on: ModelSchema, message: impl Into<String>) -> Self {
        Self {
            inner,
            fail_on,
            message: message.into(),
        }
    }

    /// Returns the backing store.
    #[must_use]
    pub fn inner(&self) -> &InMemoryModelStore {
        &self.inner
    }
}

#[async_trait]
impl ModelStore for FailingModelStore {
    async fn put(
        &self,
        cancel: &CancellationToken,
        schema: ModelSchema,
        id: &str,
        record: serde_json::Value,
    ) -> Result<(), SubsystemError> {
        if schema == self.fail_on {
            return Err(SubsystemError::failure(self.message.clone()));
        }
        self.inner.put(cancel, schema, id, record).await
    }
}
