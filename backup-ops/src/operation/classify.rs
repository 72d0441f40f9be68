//! Status classification.
//!
//! A pure function of the accumulated [`BackupStats`]: classifying the same
//! stats twice always yields the same answer.

use crate::core::OpStatus;
use crate::errors::{AggregateError, BackupOpsError};

use super::stats::BackupStats;

/// The outcome of classifying a run.
#[derive(Debug, Clone)]
pub struct Classification {
    /// The terminal status.
    pub status: OpStatus,
    /// The error to return from `run`, set only for `Failed`.
    pub error: Option<BackupOpsError>,
}

/// Classifies a run into a terminal status.
///
/// - A run that never completed its consume phase is `Failed`, and its error
///   combines a "did not process" cause with whichever read and write errors
///   were recorded.
/// - A run with no errors whose connector read zero items is `NoData`.
/// - Anything else is `Completed`. Errors recorded on a completed run stay in
///   the results and are not returned.
#[must_use]
pub fn classify(stats: &BackupStats) -> Classification {
    if !stats.started {
        let mut agg = AggregateError::new();
        agg.push(BackupOpsError::NotProcessed);
        agg.push_opt(stats.read_err.as_ref());
        agg.push_opt(stats.write_err.as_ref());

        return Classification {
            status: OpStatus::Failed,
            error: Some(BackupOpsError::Aggregate(agg)),
        };
    }

    let status = if stats.is_clean() && stats.connector.successful == 0 {
        OpStatus::NoData
    } else {
        OpStatus::Completed
    };

    Classification { status, error: None }
}
