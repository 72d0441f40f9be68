//! # backup-ops
//!
//! Coordinates a single backup run for a tenant's cloud data.
//!
//! A [`BackupOperation`](operation::BackupOperation) drives its
//! collaborators through a fixed sequence:
//!
//! - **Connect**: acquire a source connection for the account and selector
//! - **Produce**: enumerate the data collections in scope
//! - **Consume**: hand the collections to the backup engine
//! - **Finalize**: classify the run, fill its results, persist the details
//!   and summary records, and emit the lifecycle end event
//!
//! Finalization runs on every exit path, so a failed run still reports
//! timestamps, its read and write errors, and a terminal status.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use backup_ops::prelude::*;
//!
//! let mut op = BackupOperation::builder()
//!     .connector(connector)
//!     .engine(engine)
//!     .store(store)
//!     .events(Arc::new(LoggingEventSink::default()))
//!     .account(Account::new(AccountProvider::M365, "tenant-1"))
//!     .selector(Selector::for_owner(Service::Exchange, "alice@example.com"))
//!     .build()?;
//!
//! let status = op.run(&CancellationToken::new()).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod account;
pub mod cancellation;
pub mod config;
pub mod core;
pub mod errors;
pub mod events;
pub mod observability;
pub mod operation;
pub mod ports;
pub mod progress;
pub mod selectors;
pub mod store;
pub mod testing;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::account::{Account, AccountProvider};
    pub use crate::cancellation::{race_cancellation, CancellationToken};
    pub use crate::config::OperationOptions;
    pub use crate::core::{
        CollectionPath, ConnectorStatus, DataCollection, DataItem, Details, DetailsEntry,
        EngineStats, OpStatus, ReadWrites, RunPhase, StartAndEndTime,
    };
    pub use crate::errors::{
        AggregateError, BackupOpsError, ErrorRecord, InvalidOperationError, SubsystemError,
    };
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::observability::{init_tracing, LogFormat};
    pub use crate::operation::{BackupOperation, BackupOperationBuilder, BackupResults};
    pub use crate::ports::{BackupEngine, Connector, OperationPorts, SourceConnection};
    pub use crate::progress::{LoggingProgress, NoOpProgress, ProgressSurface, ProgressTicket};
    pub use crate::selectors::{PathService, Selector, Service};
    pub use crate::store::{InMemoryModelStore, ModelSchema, ModelStore};
    pub use crate::utils::{RunId, Timestamp};
}
