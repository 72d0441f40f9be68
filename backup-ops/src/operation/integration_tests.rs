//! End-to-end tests for backup runs over collaborator fakes.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use crate::cancellation::CancellationToken;
    use crate::config::OperationOptions;
    use crate::core::{ConnectorStatus, OpStatus, RunPhase};
    use crate::errors::BackupOpsError;
    use crate::events::kinds;
    use crate::operation::{BackupOperation, BACKING_UP_MESSAGE, DISCOVERING_MESSAGE};
    use crate::ports::OperationPorts;
    use crate::selectors::{PathService, Selector, Service};
    use crate::store::ModelSchema;
    use crate::testing::{
        assert_end_event, assert_failed_with, assert_no_records, assert_terminal, sample_account,
        sample_collections, sample_selector, BackupFixture, MockBackupEngine, MockConnection,
        StalledEventSink, SAMPLE_OWNER,
    };

    const NOT_PROCESSED: &str = "errors prevented the operation from processing";

    #[tokio::test]
    async fn test_completed_run_records_metrics_and_summary() {
        let fixture = BackupFixture::new();
        let mut op = fixture.build().unwrap();
        let cancel = CancellationToken::new();

        let status = op.run(&cancel).await.unwrap();

        assert_eq!(status, OpStatus::Completed);
        assert_eq!(op.status(), OpStatus::Completed);
        assert_eq!(op.phase(), RunPhase::Done);
        assert_terminal(&op);

        let results = op.results();
        assert_eq!(results.backup_id, Some(op.id()));
        assert_eq!(results.read_writes.items_written, 42);
        assert_eq!(results.read_writes.items_read, 42);
        assert_eq!(results.read_writes.bytes_uploaded, 1000);
        assert_eq!(results.read_writes.bytes_read, 4200);
        assert_eq!(results.read_writes.resource_owners, 1);
        assert!(results.read_errors.is_none());
        assert!(results.write_errors.is_none());

        assert_eq!(fixture.records.count(ModelSchema::Backup), 1);
        assert_eq!(fixture.records.count(ModelSchema::BackupDetails), 1);

        let record = fixture
            .records
            .get(ModelSchema::Backup, &op.id().to_string())
            .unwrap();
        assert_eq!(record["snapshot_id"], "snap-1");
        assert_eq!(record["status"], "Completed");
        assert_eq!(record["version"], "v0");
        assert_eq!(record["items_written"], 42);

        let details_id = record["details_id"].as_str().unwrap();
        let details = fixture
            .records
            .get(ModelSchema::BackupDetails, details_id)
            .unwrap();
        assert_eq!(details["backup_id"], op.id().to_string());
        assert_eq!(details["details"]["entries"].as_array().unwrap().len(), 42);
    }

    #[tokio::test]
    async fn test_completed_run_hands_collections_to_engine() {
        let fixture = BackupFixture::new();
        let mut op = fixture.build().unwrap();

        op.run(&CancellationToken::new()).await.unwrap();

        assert_eq!(fixture.connector.call_count(), 1);
        assert_eq!(fixture.connector.tenants(), vec!["tenant-1".to_string()]);
        assert_eq!(fixture.engine.call_count(), 1);
        assert_eq!(fixture.engine.received().len(), 3);
        assert_eq!(fixture.engine.last_service(), Some(PathService::ExchangeService));
        assert_eq!(fixture.connection.status_calls(), 1);
    }

    #[tokio::test]
    async fn test_lifecycle_events_bracket_the_run() {
        let fixture = BackupFixture::new();
        let mut op = fixture.build().unwrap();

        op.run(&CancellationToken::new()).await.unwrap();

        assert_eq!(
            fixture.events.kinds(),
            vec![kinds::BACKUP_START.to_string(), kinds::BACKUP_END.to_string()]
        );

        let start = fixture.events.last_payload(kinds::BACKUP_START).unwrap();
        assert_eq!(start[kinds::BACKUP_ID], op.id().to_string());
        assert_eq!(start[kinds::SERVICE], "exchange");
        assert!(start[kinds::START_TIME].is_string());

        let end = assert_end_event(&fixture.events, OpStatus::Completed);
        assert_eq!(end[kinds::BACKUP_ID], op.id().to_string());
        assert_eq!(end[kinds::SERVICE], "ExchangeService");
        assert_eq!(end[kinds::DATA_STORED], 1000);
        assert_eq!(end[kinds::RESOURCES], 1);
        assert_eq!(end[kinds::SNAPSHOT_ID], "snap-1");
        assert!(end[kinds::DURATION_MS].is_u64());
        assert!(end.get(kinds::ERROR).is_none());
    }

    #[tokio::test]
    async fn test_connect_failure_fails_run() {
        let fixture = BackupFixture::new().with_connect_error("auth expired");
        let mut op = fixture.build().unwrap();

        let before = crate::utils::now_utc();
        let err = op.run(&CancellationToken::new()).await.unwrap_err();
        let after = crate::utils::now_utc();

        assert_failed_with(&op, &err, &[NOT_PROCESSED, "auth expired"]);
        assert_terminal(&op);
        let times = &op.results().times;
        assert!(times.started_at.unwrap() >= before);
        assert!(times.started_at.unwrap() <= times.completed_at.unwrap());
        assert!(times.completed_at.unwrap() <= after);
        assert!(matches!(err, BackupOpsError::Aggregate(_)));
        assert_eq!(err.causes().len(), 2);

        let results = op.results();
        assert!(results.read_errors.as_ref().unwrap().message.contains("auth expired"));
        assert!(results.write_errors.is_none());
        assert_eq!(results.read_writes.items_written, 0);
        assert_eq!(results.read_writes.resource_owners, 0);

        assert_no_records(&fixture.records);
        assert_eq!(fixture.engine.call_count(), 0);
        assert!(fixture.progress.begun().is_empty());

        let end = assert_end_event(&fixture.events, OpStatus::Failed);
        assert_eq!(end[kinds::DATA_STORED], 0);
        assert!(end[kinds::ERROR].as_str().unwrap().contains("auth expired"));
    }

    #[tokio::test]
    async fn test_enumeration_failure_is_read_error() {
        let fixture = BackupFixture::new()
            .with_connection(MockConnection::new().with_collections_error("list failed"));
        let mut op = fixture.build().unwrap();

        let err = op.run(&CancellationToken::new()).await.unwrap_err();

        assert_failed_with(&op, &err, &[NOT_PROCESSED, "retrieving data to backup: list failed"]);
        assert!(op.results().read_errors.is_some());
        assert!(op.results().write_errors.is_none());
        assert_eq!(fixture.progress.begun(), vec![DISCOVERING_MESSAGE.to_string()]);
        assert_eq!(fixture.progress.closed_count(), 1);
        assert_eq!(fixture.engine.call_count(), 0);
        assert_no_records(&fixture.records);
    }

    #[tokio::test]
    async fn test_ingest_failure_is_write_error() {
        let fixture = BackupFixture::new().with_engine(MockBackupEngine::new().with_error("disk full"));
        let mut op = fixture.build().unwrap();

        let err = op.run(&CancellationToken::new()).await.unwrap_err();

        assert_failed_with(&op, &err, &[NOT_PROCESSED, "backing up service data: disk full"]);
        assert!(op.results().read_errors.is_none());
        assert!(op
            .results()
            .write_errors
            .as_ref()
            .unwrap()
            .message
            .contains("disk full"));
        assert_eq!(op.results().read_writes.items_read, 0);
        assert_no_records(&fixture.records);
        assert_end_event(&fixture.events, OpStatus::Failed);
    }

    #[tokio::test]
    async fn test_nothing_read_is_no_data() {
        let fixture = BackupFixture::new()
            .with_connection(MockConnection::new().with_status(ConnectorStatus::successful(0)))
            .with_engine(MockBackupEngine::new());
        let mut op = fixture.build().unwrap();

        let status = op.run(&CancellationToken::new()).await.unwrap();

        assert_eq!(status, OpStatus::NoData);
        assert_terminal(&op);
        assert_eq!(op.results().read_writes.resource_owners, 0);
        assert_eq!(fixture.records.count(ModelSchema::Backup), 1);
        assert_end_event(&fixture.events, OpStatus::NoData);
    }

    #[tokio::test]
    async fn test_cancelled_before_run_fails_with_read_error() {
        let fixture = BackupFixture::new();
        let mut op = fixture.build().unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel("user abort");

        let err = op.run(&cancel).await.unwrap_err();

        assert_failed_with(&op, &err, &[NOT_PROCESSED, "user abort"]);
        assert!(err.causes().iter().any(|e| e.is_cancelled()));
        assert!(op.results().read_errors.as_ref().unwrap().cancelled);
        assert_eq!(fixture.connector.call_count(), 0);
        assert_no_records(&fixture.records);
        assert_end_event(&fixture.events, OpStatus::Failed);
    }

    #[tokio::test]
    async fn test_cancelled_during_ingest_fails_with_write_error() {
        let fixture = BackupFixture::new()
            .with_engine(MockBackupEngine::new().with_delay(Duration::from_secs(30)));
        let mut op = fixture.build().unwrap();
        let cancel = Arc::new(CancellationToken::new());

        let canceller = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                cancel.cancel("shutdown");
            })
        };

        let err = op.run(&cancel).await.unwrap_err();
        canceller.await.unwrap();

        assert_failed_with(&op, &err, &[NOT_PROCESSED, "shutdown"]);
        assert!(op.results().read_errors.is_none());
        assert!(op.results().write_errors.as_ref().unwrap().cancelled);
        assert_eq!(fixture.engine.call_count(), 1);
        assert_eq!(fixture.progress.closed_count(), 2);
        assert_no_records(&fixture.records);
    }

    #[tokio::test]
    async fn test_stalled_event_delivery_does_not_block_run() {
        let fixture = BackupFixture::new();
        let sink = Arc::new(StalledEventSink::new());
        let mut op = BackupOperation::builder()
            .ports(fixture.ports().with_events(sink.clone()))
            .account(sample_account())
            .selector(sample_selector())
            .build()
            .unwrap();

        let status = tokio::time::timeout(Duration::from_secs(5), op.run(&CancellationToken::new()))
            .await
            .expect("run blocked on event delivery")
            .unwrap();

        assert_eq!(status, OpStatus::Completed);
        assert_eq!(
            sink.queued(),
            vec![kinds::BACKUP_START.to_string(), kinds::BACKUP_END.to_string()]
        );
        assert_eq!(fixture.records.len(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_while_awaiting_connector_status() {
        let fixture = BackupFixture::new().with_connection(
            MockConnection::new()
                .with_collections(sample_collections(SAMPLE_OWNER, 3))
                .with_stalled_status(),
        );
        let mut op = fixture.build().unwrap();
        let cancel = Arc::new(CancellationToken::new());

        let canceller = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                cancel.cancel("shutdown");
            })
        };

        let err = tokio::time::timeout(Duration::from_secs(5), op.run(&cancel))
            .await
            .expect("run ignored cancellation while draining")
            .unwrap_err();
        canceller.await.unwrap();

        assert_failed_with(&op, &err, &[NOT_PROCESSED, "shutdown"]);
        assert_terminal(&op);
        assert!(op.results().read_errors.is_none());
        assert!(op.results().write_errors.as_ref().unwrap().cancelled);
        assert_eq!(op.results().read_writes.items_written, 0);
        assert_eq!(fixture.engine.call_count(), 1);
        assert_eq!(fixture.connection.status_calls(), 1);
        assert_no_records(&fixture.records);
        assert_end_event(&fixture.events, OpStatus::Failed);
    }

    #[tokio::test]
    async fn test_selector_categories_scope_collections() {
        let mut fixture = BackupFixture::new();
        fixture.selector = sample_selector().with_category("contacts");
        let mut op = fixture.build().unwrap();

        op.run(&CancellationToken::new()).await.unwrap();

        assert!(fixture.engine.received().is_empty());
        assert_eq!(op.results().read_writes.resource_owners, 0);
    }

    #[tokio::test]
    async fn test_second_run_is_rejected() {
        let fixture = BackupFixture::new();
        let mut op = fixture.build().unwrap();
        let cancel = CancellationToken::new();

        op.run(&cancel).await.unwrap();
        let err = op.run(&cancel).await.unwrap_err();

        assert!(matches!(err, BackupOpsError::InvalidOperation(_)));
        assert_eq!(op.status(), OpStatus::Completed);
        assert_eq!(fixture.connector.call_count(), 1);
        assert_eq!(fixture.records.count(ModelSchema::Backup), 1);
        assert_eq!(fixture.events.events_of_type(kinds::BACKUP_END).len(), 1);
    }

    #[tokio::test]
    async fn test_summary_failure_leaves_details_record() {
        let fixture = BackupFixture::new().with_store_failure(ModelSchema::Backup, "db down");
        let mut op = fixture.build().unwrap();

        let err = op.run(&CancellationToken::new()).await.unwrap_err();

        assert!(matches!(
            err,
            BackupOpsError::Persistence {
                schema: ModelSchema::Backup,
                ..
            }
        ));
        assert_eq!(err.to_string(), "creating backup model: db down");
        assert_terminal(&op);
        assert_eq!(fixture.records.count(ModelSchema::BackupDetails), 1);
        assert_eq!(fixture.records.count(ModelSchema::Backup), 0);
        assert!(op
            .results()
            .write_errors
            .as_ref()
            .unwrap()
            .message
            .contains("db down"));

        let end = fixture.events.last_payload(kinds::BACKUP_END).unwrap();
        assert!(end[kinds::ERROR].as_str().unwrap().contains("db down"));
    }

    #[tokio::test]
    async fn test_details_failure_writes_nothing() {
        let fixture = BackupFixture::new().with_store_failure(ModelSchema::BackupDetails, "quota");
        let mut op = fixture.build().unwrap();

        let err = op.run(&CancellationToken::new()).await.unwrap_err();

        assert_eq!(err.to_string(), "creating backup details model: quota");
        assert_no_records(&fixture.records);
    }

    #[tokio::test]
    async fn test_missing_manifest_is_rejected() {
        let fixture = BackupFixture::new();
        let op = fixture.build().unwrap();

        let err = op
            .create_backup_models(&CancellationToken::new(), "snap-1", None)
            .await
            .unwrap_err();

        assert!(matches!(err, BackupOpsError::MissingManifest));
        assert_no_records(&fixture.records);
    }

    #[tokio::test]
    async fn test_partial_read_is_kept_on_completed_run() {
        let fixture = BackupFixture::new().with_connection(
            MockConnection::new()
                .with_collections(sample_collections(SAMPLE_OWNER, 3))
                .with_status(ConnectorStatus::successful(40).with_errors(2, "throttled")),
        );
        let mut op = fixture.build().unwrap();

        let status = op.run(&CancellationToken::new()).await.unwrap();

        assert_eq!(status, OpStatus::Completed);
        let read_errors = op.results().read_errors.clone().unwrap();
        assert!(read_errors.message.contains("throttled"));
        assert!(!read_errors.cancelled);

        let record = fixture
            .records
            .get(ModelSchema::Backup, &op.id().to_string())
            .unwrap();
        assert!(record["read_errors"]["message"]
            .as_str()
            .unwrap()
            .contains("throttled"));
    }

    #[tokio::test]
    async fn test_partial_read_can_be_ignored() {
        let fixture = BackupFixture::new()
            .with_options(OperationOptions::new().with_fail_on_partial_read(false))
            .with_connection(
                MockConnection::new()
                    .with_collections(sample_collections(SAMPLE_OWNER, 1))
                    .with_status(ConnectorStatus::successful(5).with_errors(1, "throttled")),
            );
        let mut op = fixture.build().unwrap();

        op.run(&CancellationToken::new()).await.unwrap();

        assert!(op.results().read_errors.is_none());
    }

    #[tokio::test]
    async fn test_resource_owners_are_distinct() {
        let mut collections = sample_collections("alice", 2);
        collections.extend(sample_collections("bob", 3));
        let fixture = BackupFixture::new().with_connection(
            MockConnection::new()
                .with_collections(collections)
                .with_status(ConnectorStatus::successful(5)),
        );
        let mut op = fixture.build().unwrap();

        op.run(&CancellationToken::new()).await.unwrap();

        assert_eq!(op.results().read_writes.resource_owners, 2);
    }

    #[tokio::test]
    async fn test_disable_metrics_suppresses_events() {
        let fixture = BackupFixture::new().with_options(OperationOptions::new().with_metrics_disabled());
        let mut op = fixture.build().unwrap();

        let status = op.run(&CancellationToken::new()).await.unwrap();

        assert_eq!(status, OpStatus::Completed);
        assert!(fixture.events.is_empty());
    }

    #[tokio::test]
    async fn test_hide_progress_suppresses_progress() {
        let fixture = BackupFixture::new().with_options(OperationOptions::new().with_progress_hidden());
        let mut op = fixture.build().unwrap();

        op.run(&CancellationToken::new()).await.unwrap();

        assert!(fixture.progress.begun().is_empty());
        assert_eq!(fixture.progress.completion_count(), 0);
    }

    #[tokio::test]
    async fn test_progress_released_once_per_phase() {
        let fixture = BackupFixture::new();
        let mut op = fixture.build().unwrap();

        op.run(&CancellationToken::new()).await.unwrap();

        assert_eq!(
            fixture.progress.begun(),
            vec![DISCOVERING_MESSAGE.to_string(), BACKING_UP_MESSAGE.to_string()]
        );
        assert_eq!(fixture.progress.closed_count(), 2);
        assert_eq!(fixture.progress.completion_count(), 1);
    }

    #[tokio::test]
    async fn test_service_label_overrides_selector_service() {
        let fixture =
            BackupFixture::new().with_options(OperationOptions::new().with_service_label("mail"));
        let mut op = fixture.build().unwrap();

        op.run(&CancellationToken::new()).await.unwrap();

        let start = fixture.events.last_payload(kinds::BACKUP_START).unwrap();
        let end = fixture.events.last_payload(kinds::BACKUP_END).unwrap();
        assert_eq!(start[kinds::SERVICE], "mail");
        assert_eq!(end[kinds::SERVICE], "mail");
    }

    #[test]
    fn test_construction_has_no_side_effects() {
        let fixture = BackupFixture::new();
        let op = fixture.build().unwrap();

        assert_eq!(op.status(), OpStatus::Unknown);
        assert_eq!(op.phase(), RunPhase::NotStarted);
        assert_eq!(op.version(), "v0");
        assert!(op.results().backup_id.is_none());
        assert_eq!(fixture.connector.call_count(), 0);
        assert!(fixture.events.is_empty());
        assert_no_records(&fixture.records);
    }

    #[test]
    fn test_missing_collaborators_are_reported() {
        let err = BackupOperation::new(
            OperationOptions::default(),
            OperationPorts::new(),
            sample_account(),
            sample_selector(),
        )
        .unwrap_err();

        assert_eq!(err.fields, vec!["connector", "engine", "store"]);
        assert!(err.to_string().contains("missing connector, engine, store"));
    }

    #[test]
    fn test_builder_requires_account_and_selector() {
        let fixture = BackupFixture::new();

        let err = BackupOperation::builder()
            .ports(fixture.ports())
            .selector(sample_selector())
            .build()
            .unwrap_err();
        assert_eq!(err.fields, vec!["account"]);

        let err = BackupOperation::builder()
            .ports(fixture.ports())
            .account(sample_account())
            .build()
            .unwrap_err();
        assert_eq!(err.fields, vec!["selector"]);
    }

    #[test]
    fn test_builder_rejects_invalid_inputs() {
        let fixture = BackupFixture::new();

        let err = BackupOperation::builder()
            .ports(fixture.ports())
            .account(sample_account())
            .selector(Selector::new(Service::Exchange))
            .build()
            .unwrap_err();
        assert_eq!(err.fields, vec!["selector.resource_owners"]);

        let err = BackupOperation::builder()
            .ports(fixture.ports())
            .account(sample_account())
            .selector(sample_selector())
            .options(OperationOptions::new().with_service_label("  "))
            .build()
            .unwrap_err();
        assert_eq!(err.fields, vec!["options"]);
    }

    #[test]
    fn test_builder_wires_individual_ports() {
        let fixture = BackupFixture::new();

        let op = BackupOperation::builder()
            .connector(fixture.connector.clone())
            .engine(fixture.engine.clone())
            .store(fixture.store.clone())
            .events(fixture.events.clone())
            .progress(fixture.progress.clone())
            .account(sample_account())
            .selector(sample_selector())
            .build()
            .unwrap();

        assert_eq!(op.selector(), &sample_selector());
    }
}
