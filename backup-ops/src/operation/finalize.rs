//! Finalization: classification, results, persistence and the end event.

use tracing::{error, info};

use super::classify::classify;
use super::stats::BackupStats;
use super::BackupOperation;
use crate::cancellation::CancellationToken;
use crate::core::{Details, OpStatus, ReadWrites, StartAndEndTime};
use crate::errors::{BackupOpsError, ErrorRecord, SubsystemError};
use crate::events::kinds;
use crate::store::{BackupDetailsModel, BackupRecord, ModelSchema};
use crate::utils::{duration_ms, format_iso8601, generate_run_id, now_utc, Timestamp};

impl BackupOperation {
    /// Runs once per `run`, after the phase sequence, whatever it did.
    pub(super) async fn finalize(
        &mut self,
        cancel: &CancellationToken,
        started_at: Timestamp,
        stats: &BackupStats,
        details: Option<Details>,
    ) -> Result<OpStatus, BackupOpsError> {
        self.progress.complete().await;

        let classification = classify(stats);
        self.persist_results(started_at, stats, classification.status);
        self.status = classification.status;

        if let Some(err) = classification.error {
            error!(error = %err, "backup did not process");
            self.emit_end(stats, Some(&err));
            return Err(err);
        }

        if let Err(err) = self.create_backup_models(cancel, &stats.engine.snapshot_id, details).await {
            if self.results.write_errors.is_none() {
                self.results.write_errors = Some(ErrorRecord::from(&err));
            }
            error!(error = %err, "persisting backup");
            self.emit_end(stats, Some(&err));
            return Err(err);
        }

        info!(
            status = %self.status,
            snapshot_id = %stats.engine.snapshot_id,
            items_written = self.results.read_writes.items_written,
            "backup finished"
        );
        self.emit_end(stats, None);
        Ok(self.status)
    }

    /// Copies the accumulated stats into the results. Counters are zero when
    /// the consume phase never completed.
    fn persist_results(&mut self, started_at: Timestamp, stats: &BackupStats, status: OpStatus) {
        self.results.times = StartAndEndTime {
            started_at: Some(started_at),
            completed_at: Some(now_utc()),
        };

        self.results.read_writes = ReadWrites {
            bytes_read: stats.engine.total_hashed_bytes,
            bytes_uploaded: stats.engine.total_uploaded_bytes,
            items_read: stats.connector.successful,
            items_written: stats.engine.total_file_count,
            resource_owners: stats.resource_count,
        };

        self.results.read_errors = stats.read_err.as_ref().map(ErrorRecord::from);
        self.results.write_errors = stats.write_err.as_ref().map(ErrorRecord::from);

        if status == OpStatus::Failed {
            self.results.read_writes = ReadWrites::default();
        }
    }

    /// Writes the details record, then the summary record that points at it.
    ///
    /// A summary failure leaves the details record in place.
    pub(super) async fn create_backup_models(
        &self,
        cancel: &CancellationToken,
        snapshot_id: &str,
        details: Option<Details>,
    ) -> Result<(), BackupOpsError> {
        let details = details.ok_or(BackupOpsError::MissingManifest)?;

        let details_id = generate_run_id().to_string();
        let model = BackupDetailsModel {
            id: details_id.clone(),
            backup_id: self.identity.id,
            details,
        };
        self.put_model(cancel, ModelSchema::BackupDetails, &details_id, &model)
            .await?;

        let record = BackupRecord::new(
            snapshot_id,
            details_id,
            self.status,
            self.identity.id,
            self.identity.version.clone(),
            self.selector.clone(),
            self.results.read_writes.clone(),
            self.results.times.clone(),
        )
        .with_errors(
            self.results.read_errors.clone(),
            self.results.write_errors.clone(),
        );
        self.put_model(cancel, ModelSchema::Backup, &self.identity.id.to_string(), &record)
            .await
    }

    async fn put_model<T: serde::Serialize + Sync>(
        &self,
        cancel: &CancellationToken,
        schema: ModelSchema,
        id: &str,
        model: &T,
    ) -> Result<(), BackupOpsError> {
        let persistence = |source: SubsystemError| BackupOpsError::Persistence { schema, source };

        let value = serde_json::to_value(model)
            .map_err(|e| persistence(SubsystemError::failure(e.to_string())))?;
        self.store
            .put(cancel, schema, id, value)
            .await
            .map_err(persistence)
    }

    /// Queues the end event. Delivery is the sink's concern and never holds
    /// up the run.
    fn emit_end(&self, stats: &BackupStats, err: Option<&BackupOpsError>) {
        let times = &self.results.times;
        let (start, end) = match (times.started_at, times.completed_at) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                let now = now_utc();
                (now, now)
            }
        };

        let mut payload = serde_json::json!({
            (kinds::BACKUP_ID): self.identity.id.to_string(),
            (kinds::SERVICE): self.end_service_label(),
            (kinds::START_TIME): format_iso8601(&start),
            (kinds::END_TIME): format_iso8601(&end),
            (kinds::DURATION_MS): duration_ms(&start, &end),
            (kinds::DATA_STORED): self.results.read_writes.bytes_uploaded,
            (kinds::RESOURCES): self.results.read_writes.resource_owners,
            (kinds::STATUS): self.status.to_string(),
            (kinds::SNAPSHOT_ID): stats.engine.snapshot_id,
        });
        if let (Some(err), Some(obj)) = (err, payload.as_object_mut()) {
            obj.insert(kinds::ERROR.to_string(), serde_json::Value::String(err.to_string()));
        }

        self.events.try_emit(kinds::BACKUP_END, Some(payload));
    }
}
