//! Builder for validated backup operations.

use std::sync::Arc;

use crate::account::Account;
use crate::config::OperationOptions;
use crate::errors::InvalidOperationError;
use crate::events::EventSink;
use crate::ports::{BackupEngine, Connector, OperationPorts};
use crate::progress::ProgressSurface;
use crate::selectors::Selector;
use crate::store::ModelStore;

use super::BackupOperation;

/// Collects the inputs of a backup operation and validates them on `build`.
#[derive(Debug, Default)]
pub struct BackupOperationBuilder {
    options: OperationOptions,
    ports: OperationPorts,
    account: Option<Account>,
    selector: Option<Selector>,
}

impl BackupOperationBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the operation options.
    #[must_use]
    pub fn options(mut self, options: OperationOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets every collaborator handle at once.
    #[must_use]
    pub fn ports(mut self, ports: OperationPorts) -> Self {
        self.ports = ports;
        self
    }

    /// Sets the account.
    #[must_use]
    pub fn account(mut self, account: Account) -> Self {
        self.account = Some(account);
        self
    }

    /// Sets the selector.
    #[must_use]
    pub fn selector(mut self, selector: Selector) -> Self {
        self.selector = Some(selector);
        self
    }

    /// Sets the connector.
    #[must_use]
    pub fn connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.ports = self.ports.with_connector(connector);
        self
    }

    /// Sets the backup engine.
    #[must_use]
    pub fn engine(mut self, engine: Arc<dyn BackupEngine>) -> Self {
        self.ports = self.ports.with_engine(engine);
        self
    }

    /// Sets the model store.
    #[must_use]
    pub fn store(mut self, store: Arc<dyn ModelStore>) -> Self {
        self.ports = self.ports.with_store(store);
        self
    }

    /// Sets the event sink.
    #[must_use]
    pub fn events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.ports = self.ports.with_events(events);
        self
    }

    /// Sets the progress surface.
    #[must_use]
    pub fn progress(mut self, progress: Arc<dyn ProgressSurface>) -> Self {
        self.ports = self.ports.with_progress(progress);
        self
    }

    /// Validates the inputs and constructs the operation.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperationError` if the account or selector is missing,
    /// or if [`BackupOperation::new`] rejects the inputs.
    pub fn build(self) -> Result<BackupOperation, InvalidOperationError> {
        let account = self
            .account
            .ok_or_else(|| InvalidOperationError::new("missing account").with_field("account"))?;
        let selector = self
            .selector
            .ok_or_else(|| InvalidOperationError::new("missing selector").with_field("selector"))?;

        BackupOperation::new(self.options, self.ports, account, selector)
    }
}
