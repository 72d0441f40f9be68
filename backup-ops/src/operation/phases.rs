//! The collaborator calls behind each phase of a run.
//!
//! Every call is raced against the run's cancellation token and, where the
//! phase displays progress, holds a [`ProgressTicket`] for its duration.

use std::sync::Arc;
use tracing::debug;

use crate::account::Account;
use crate::cancellation::{race_cancellation, CancellationToken};
use crate::core::{DataCollection, Details, EngineStats};
use crate::errors::SubsystemError;
use crate::ports::{BackupEngine, Connector, SourceConnection};
use crate::progress::ProgressSurface;
use crate::selectors::Selector;

/// Progress message shown while enumerating.
pub const DISCOVERING_MESSAGE: &str = "Discovering items to backup:";
/// Progress message shown while ingesting.
pub const BACKING_UP_MESSAGE: &str = "Backing up data:";

/// Acquires a connection to the data source.
pub async fn connect(
    cancel: &CancellationToken,
    connector: &dyn Connector,
    account: &Account,
    selector: &Selector,
) -> Result<Arc<dyn SourceConnection>, SubsystemError> {
    race_cancellation(cancel, connector.connect(cancel, account, selector)).await
}

/// Asks the connector for the collections in scope.
pub async fn produce(
    cancel: &CancellationToken,
    progress: &dyn ProgressSurface,
    conn: &dyn SourceConnection,
    selector: &Selector,
) -> Result<Vec<DataCollection>, SubsystemError> {
    let ticket = progress.message_with_completion(DISCOVERING_MESSAGE);
    let res = race_cancellation(cancel, conn.data_collections(cancel, selector)).await;
    ticket.finish();

    if let Ok(cs) = &res {
        debug!(collections = cs.len(), "enumerated collections");
    }
    res
}

/// Hands the collections to the backup engine.
pub async fn consume(
    cancel: &CancellationToken,
    progress: &dyn ProgressSurface,
    engine: &dyn BackupEngine,
    selector: &Selector,
    collections: Vec<DataCollection>,
) -> Result<(EngineStats, Details), SubsystemError> {
    let ticket = progress.message_with_completion(BACKING_UP_MESSAGE);
    let res = race_cancellation(
        cancel,
        engine.backup_collections(cancel, collections, selector.path_service()),
    )
    .await;
    ticket.finish();
    res
}
