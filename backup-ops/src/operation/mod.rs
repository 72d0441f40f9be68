//! The backup operation: one run from connection to durable record.
//!
//! A run moves through `Connecting`, `Producing` and `Consuming`, stopping at
//! the first phase that fails. Whatever happened is captured in a
//! [`BackupStats`] accumulator, and finalization (classification, then
//! persistence) runs exactly once on every path.

mod builder;
mod classify;
mod finalize;
mod identity;
#[cfg(test)]
mod integration_tests;
mod phases;
mod stats;

pub use builder::BackupOperationBuilder;
pub use classify::{classify, Classification};
pub use identity::{OperationIdentity, BACKUP_VERSION};
pub use phases::{BACKING_UP_MESSAGE, DISCOVERING_MESSAGE};
pub use stats::BackupStats;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info_span, warn, Instrument};

use crate::account::Account;
use crate::cancellation::{race_cancellation, CancellationToken};
use crate::config::OperationOptions;
use crate::core::{resource_owner_set, Details, OpStatus, ReadWrites, RunPhase, StartAndEndTime};
use crate::errors::{BackupOpsError, ErrorRecord, InvalidOperationError};
use crate::events::{kinds, EventSink, NoOpEventSink};
use crate::ports::{BackupEngine, Connector, OperationPorts};
use crate::progress::{NoOpProgress, ProgressSurface};
use crate::selectors::Selector;
use crate::store::ModelStore;
use crate::utils::{format_iso8601, now_utc, RunId, Timestamp};

/// Results of a backup run, populated on every exit path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupResults {
    /// The run identifier, set when the run starts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_id: Option<RunId>,
    /// Read/write metrics.
    #[serde(flatten)]
    pub read_writes: ReadWrites,
    /// Run timestamps.
    #[serde(flatten)]
    pub times: StartAndEndTime,
    /// Error from the read side (connect, enumerate, connector item failures).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_errors: Option<ErrorRecord>,
    /// Error from the write side (ingest, or finalization when no write
    /// error was recorded earlier).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_errors: Option<ErrorRecord>,
}

/// One backup run.
///
/// Not shared across callers: `run` takes `&mut self` and may be called
/// once.
pub struct BackupOperation {
    identity: OperationIdentity,
    selector: Selector,
    status: OpStatus,
    phase: RunPhase,
    results: BackupResults,
    options: OperationOptions,
    account: Account,
    connector: Arc<dyn Connector>,
    engine: Arc<dyn BackupEngine>,
    store: Arc<dyn ModelStore>,
    events: Arc<dyn EventSink>,
    progress: Arc<dyn ProgressSurface>,
}

impl std::fmt::Debug for BackupOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackupOperation")
            .field("identity", &self.identity)
            .field("selector", &self.selector)
            .field("status", &self.status)
            .field("phase", &self.phase)
            .field("results", &self.results)
            .field("options", &self.options)
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

impl BackupOperation {
    /// Returns a builder.
    #[must_use]
    pub fn builder() -> BackupOperationBuilder {
        BackupOperationBuilder::new()
    }

    /// Constructs and validates a backup operation.
    ///
    /// Has no side effects on any collaborator.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperationError` if a required collaborator is missing,
    /// the account has no tenant, the selector is empty, or an option is out
    /// of range.
    pub fn new(
        options: OperationOptions,
        ports: OperationPorts,
        account: Account,
        selector: Selector,
    ) -> Result<Self, InvalidOperationError> {
        ports.validate()?;
        account.validate()?;
        selector.validate()?;
        options
            .validate()
            .map_err(|e| InvalidOperationError::new(e.to_string()).with_field("options"))?;

        let OperationPorts {
            connector: Some(connector),
            engine: Some(engine),
            store: Some(store),
            events,
            progress,
        } = ports
        else {
            return Err(InvalidOperationError::new("missing required collaborators"));
        };

        let events: Arc<dyn EventSink> = match events {
            Some(sink) if !options.disable_metrics => sink,
            _ => Arc::new(NoOpEventSink),
        };
        let progress: Arc<dyn ProgressSurface> = match progress {
            Some(surface) if !options.hide_progress => surface,
            _ => Arc::new(NoOpProgress),
        };

        Ok(Self {
            identity: OperationIdentity::new(),
            selector,
            status: OpStatus::Unknown,
            phase: RunPhase::NotStarted,
            results: BackupResults::default(),
            options,
            account,
            connector,
            engine,
            store,
            events,
            progress,
        })
    }

    /// Returns the run identifier.
    #[must_use]
    pub const fn id(&self) -> RunId {
        self.identity.id
    }

    /// Returns the operation's identity.
    #[must_use]
    pub const fn identity(&self) -> &OperationIdentity {
        &self.identity
    }

    /// Returns the version tag.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.identity.version
    }

    /// Returns the selector.
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> OpStatus {
        self.status
    }

    /// Returns the current phase.
    #[must_use]
    pub const fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Returns the results.
    #[must_use]
    pub const fn results(&self) -> &BackupResults {
        &self.results
    }

    /// Runs the backup.
    ///
    /// On return, `status()` is terminal and both result timestamps are set,
    /// whatever the outcome. The returned error is either the combined
    /// "did not process" error of a failed run or a finalization failure.
    /// Partial errors of a completed run are only visible in `results()`.
    ///
    /// # Errors
    ///
    /// Returns `BackupOpsError::InvalidOperation` if the operation has
    /// already run, `BackupOpsError::Aggregate` for a failed run, and
    /// `MissingManifest`/`Persistence` if finalization fails.
    pub async fn run(&mut self, cancel: &CancellationToken) -> Result<OpStatus, BackupOpsError> {
        if self.phase != RunPhase::NotStarted {
            return Err(InvalidOperationError::new("operation has already run")
                .with_field("phase")
                .into());
        }

        let span = info_span!(
            "operations:backup:run",
            backup_id = %self.identity.id,
            service = %self.selector.service,
        );
        self.run_inner(cancel).instrument(span).await
    }

    async fn run_inner(&mut self, cancel: &CancellationToken) -> Result<OpStatus, BackupOpsError> {
        let started_at = now_utc();
        self.results.backup_id = Some(self.identity.id);
        self.status = OpStatus::InProgress;
        self.emit_start(&started_at);

        let mut stats = BackupStats::new();
        let details = self.sequence(cancel, &mut stats).await;

        self.advance(RunPhase::Finalizing);
        let res = self.finalize(cancel, started_at, &stats, details).await;
        self.advance(RunPhase::Done);
        res
    }

    /// Runs the phases in order, stopping at the first failure. Returns the
    /// details manifest if the consume phase produced one.
    async fn sequence(&mut self, cancel: &CancellationToken, stats: &mut BackupStats) -> Option<Details> {
        self.advance(RunPhase::Connecting);
        let conn = match phases::connect(cancel, self.connector.as_ref(), &self.account, &self.selector).await {
            Ok(conn) => conn,
            Err(e) => {
                warn!(error = %e, "connecting to source failed");
                stats.record_read_err(BackupOpsError::Connect(e));
                return None;
            }
        };

        self.advance(RunPhase::Producing);
        let collections =
            match phases::produce(cancel, self.progress.as_ref(), conn.as_ref(), &self.selector).await {
                Ok(cs) => cs,
                Err(e) => {
                    warn!(error = %e, "retrieving data to backup failed");
                    stats.record_read_err(BackupOpsError::Produce(e));
                    return None;
                }
            };

        self.advance(RunPhase::Consuming);
        let owners = resource_owner_set(&collections).len();
        let (engine_stats, details) = match phases::consume(
            cancel,
            self.progress.as_ref(),
            self.engine.as_ref(),
            &self.selector,
            collections,
        )
        .await
        {
            Ok(out) => out,
            Err(e) => {
                warn!(error = %e, "backing up service data failed");
                stats.record_write_err(BackupOpsError::Consume(e));
                return None;
            }
        };

        debug!(
            "Backed up {} directories and {} files",
            engine_stats.total_directory_count, engine_stats.total_file_count
        );

        // The connector only settles once the engine has drained its collections.
        let drained = race_cancellation(cancel, async { Ok(conn.await_status().await) }).await;
        let connector_status = match drained {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, "waiting for connector status failed");
                stats.record_write_err(BackupOpsError::Consume(e));
                return None;
            }
        };

        stats.resource_count = owners as u64;
        stats.started = true;
        stats.engine = engine_stats;
        stats.connector = connector_status;

        if stats.connector.has_errors() {
            let err = BackupOpsError::PartialRead {
                count: stats.connector.error_count,
                message: stats
                    .connector
                    .error
                    .clone()
                    .unwrap_or_else(|| "unspecified failure".to_string()),
            };
            if self.options.fail_on_partial_read {
                warn!(error = %err, "connector reported item failures");
                stats.record_read_err(err);
            } else {
                debug!(error = %err, "ignoring connector item failures");
            }
        }

        Some(details)
    }

    fn advance(&mut self, next: RunPhase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "illegal phase transition {} -> {}",
            self.phase,
            next
        );
        debug!(from = %self.phase, to = %next, "phase transition");
        self.phase = next;
    }

    fn service_label(&self) -> String {
        self.options
            .service_label
            .clone()
            .unwrap_or_else(|| self.selector.service.to_string())
    }

    /// Service attribute of the end event: the label override, else the
    /// selector's path service.
    fn end_service_label(&self) -> String {
        self.options
            .service_label
            .clone()
            .unwrap_or_else(|| self.selector.path_service().to_string())
    }

    fn emit_start(&self, started_at: &Timestamp) {
        self.events.try_emit(
            kinds::BACKUP_START,
            Some(serde_json::json!({
                (kinds::BACKUP_ID): self.identity.id.to_string(),
                (kinds::START_TIME): format_iso8601(started_at),
                (kinds::SERVICE): self.service_label(),
            })),
        );
    }
}
