//! Test fixtures for backup runs.

use std::sync::Arc;

use super::mocks::{FailingModelStore, MockBackupEngine, MockConnection, MockConnector, RecordingProgress};
use crate::account::{Account, AccountProvider};
use crate::config::OperationOptions;
use crate::core::{CollectionPath, ConnectorStatus, DataCollection, DataItem, Details, DetailsEntry, EngineStats};
use crate::errors::InvalidOperationError;
use crate::events::CollectingEventSink;
use crate::operation::BackupOperation;
use crate::ports::OperationPorts;
use crate::selectors::{Selector, Service};
use crate::store::{InMemoryModelStore, ModelSchema, ModelStore};

/// Tenant used by the sample account.
pub const SAMPLE_TENANT: &str = "tenant-1";
/// Resource owner used by the sample selector and collections.
pub const SAMPLE_OWNER: &str = "alice@example.com";

/// Returns an account for the sample tenant.
#[must_use]
pub fn sample_account() -> Account {
    Account::new(AccountProvider::M365, SAMPLE_TENANT).with_credential("client_secret", "s3cret")
}

/// Returns an Exchange selector for the sample owner.
#[must_use]
pub fn sample_selector() -> Selector {
    Selector::for_owner(Service::Exchange, SAMPLE_OWNER)
}

/// Returns `count` mail collections owned by `owner`, one item each.
#[must_use]
pub fn sample_collections(owner: &str, count: usize) -> Vec<DataCollection> {
    (0..count)
        .map(|i| {
            let path = CollectionPath::new(SAMPLE_TENANT, Service::Exchange, owner, "email")
                .with_folder(format!("folder-{i}"));
            DataCollection::new(path).with_item(DataItem::new(format!("item-{i}"), 100))
        })
        .collect()
}

/// Returns a manifest with `count` entries.
#[must_use]
pub fn sample_details(count: usize) -> Details {
    let mut details = Details::new();
    for i in 0..count {
        details.add(DetailsEntry::new(format!("{SAMPLE_TENANT}/exchange/{SAMPLE_OWNER}/email/item-{i}"), 100));
    }
    details
}

/// Wires fakes for every collaborator of a backup run.
///
/// The default scenario enumerates three collections for one owner and
/// backs up 42 files into snapshot `snap-1`.
pub struct BackupFixture {
    /// Options for the operation.
    pub options: OperationOptions,
    /// Account for the operation.
    pub account: Account,
    /// Selector for the operation.
    pub selector: Selector,
    /// Connector fake.
    pub connector: Arc<MockConnector>,
    /// Connection fake handed out by the connector.
    pub connection: Arc<MockConnection>,
    /// Engine fake.
    pub engine: Arc<MockBackupEngine>,
    /// Backing store every record lands in.
    pub records: Arc<InMemoryModelStore>,
    /// Store handed to the operation.
    pub store: Arc<dyn ModelStore>,
    /// Event recorder.
    pub events: Arc<CollectingEventSink>,
    /// Progress recorder.
    pub progress: Arc<RecordingProgress>,
}

impl BackupFixture {
    /// Creates the default successful scenario.
    #[must_use]
    pub fn new() -> Self {
        let connection = Arc::new(
            MockConnection::new()
                .with_collections(sample_collections(SAMPLE_OWNER, 3))
                .with_status(ConnectorStatus::successful(42)),
        );
        let engine = MockBackupEngine::new()
            .with_stats(EngineStats {
                total_hashed_bytes: 4200,
                total_uploaded_bytes: 1000,
                total_file_count: 42,
                total_directory_count: 3,
                snapshot_id: "snap-1".to_string(),
            })
            .with_details(sample_details(42));
        let records = Arc::new(InMemoryModelStore::new());

        Self {
            options: OperationOptions::default(),
            account: sample_account(),
            selector: sample_selector(),
            connector: Arc::new(MockConnector::new(connection.clone())),
            connection,
            engine: Arc::new(engine),
            store: records.clone(),
            records,
            events: Arc::new(CollectingEventSink::new()),
            progress: Arc::new(RecordingProgress::new()),
        }
    }

    /// Replaces the options.
    #[must_use]
    pub fn with_options(mut self, options: OperationOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the connection, and the connector that hands it out.
    #[must_use]
    pub fn with_connection(mut self, connection: MockConnection) -> Self {
        self.connection = Arc::new(connection);
        self.connector = Arc::new(MockConnector::new(self.connection.clone()));
        self
    }

    /// Makes connecting fail with `message`.
    #[must_use]
    pub fn with_connect_error(mut self, message: &str) -> Self {
        self.connector = Arc::new(MockConnector::failing(message));
        self
    }

    /// Replaces the engine.
    #[must_use]
    pub fn with_engine(mut self, engine: MockBackupEngine) -> Self {
        self.engine = Arc::new(engine);
        self
    }

    /// Makes writes of `schema` fail with `message`.
    #[must_use]
    pub fn with_store_failure(mut self, schema: ModelSchema, message: &str) -> Self {
        self.store = Arc::new(FailingModelStore::new(self.records.clone(), schema, message));
        self
    }

    /// Returns ports wired to the fakes.
    #[must_use]
    pub fn ports(&self) -> OperationPorts {
        OperationPorts::new()
            .with_connector(self.connector.clone())
            .with_engine(self.engine.clone())
            .with_store(self.store.clone())
            .with_events(self.events.clone())
            .with_progress(self.progress.clone())
    }

    /// Builds an operation over the fakes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperationError` if the fixture's inputs are invalid.
    pub fn build(&self) -> Result<BackupOperation, InvalidOperationError> {
        BackupOperation::new(
            self.options.clone(),
            self.ports(),
            self.account.clone(),
            self.selector.clone(),
        )
    }
}

impl Default for BackupFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BackupFixture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackupFixture")
            .field("options", &self.options)
            .field("selector", &self.selector)
            .finish_non_exhaustive()
    }
}
