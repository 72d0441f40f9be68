//! Operation status and run phase enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The status of a backup operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpStatus {
    /// The operation has not finished running.
    Unknown,
    /// The operation is running.
    InProgress,
    /// The run reached a completed consume phase. Partial errors may still be
    /// recorded in the results.
    Completed,
    /// The run never reached a completed consume phase.
    Failed,
    /// The run completed mechanically but found nothing to back up.
    NoData,
}

impl Default for OpStatus {
    fn default() -> Self {
        Self::Unknown
    }
}

impl fmt::Display for OpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "Status Unknown"),
            Self::InProgress => write!(f, "In Progress"),
            Self::Completed => write!(f, "Completed"),
            Self::Failed => write!(f, "Failed"),
            Self::NoData => write!(f, "No Data"),
        }
    }
}

impl OpStatus {
    /// Returns true if the status is one of the terminal values.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::NoData)
    }
}

/// Position of a run in the phase sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    /// `run` has not been called.
    NotStarted,
    /// Acquiring the source connection.
    Connecting,
    /// Enumerating collections in scope.
    Producing,
    /// Ingesting collections into the backup engine.
    Consuming,
    /// Classifying and persisting results.
    Finalizing,
    /// `run` has returned.
    Done,
}

impl Default for RunPhase {
    fn default() -> Self {
        Self::NotStarted
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not_started"),
            Self::Connecting => write!(f, "connecting"),
            Self::Producing => write!(f, "producing"),
            Self::Consuming => write!(f, "consuming"),
            Self::Finalizing => write!(f, "finalizing"),
            Self::Done => write!(f, "done"),
        }
    }
}

impl RunPhase {
    /// Returns true if `next` is a legal successor of this phase.
    ///
    /// Phases only move forward. Any phase before finalization may jump
    /// straight to `Finalizing`.
    #[must_use]
    pub fn can_advance_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::NotStarted, Self::Connecting)
            | (Self::Connecting, Self::Producing)
            | (Self::Producing, Self::Consuming)
            | (Self::Finalizing, Self::Done) => true,
            (Self::Connecting | Self::Producing | Self::Consuming, Self::Finalizing) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_op_status_display() {
        assert_eq!(OpStatus::Completed.to_string(), "Completed");
        assert_eq!(OpStatus::Failed.to_string(), "Failed");
        assert_eq!(OpStatus::NoData.to_string(), "No Data");
        assert_eq!(OpStatus::Unknown.to_string(), "Status Unknown");
    }

    #[test]
    fn test_op_status_is_terminal() {
        assert!(OpStatus::Completed.is_terminal());
        assert!(OpStatus::Failed.is_terminal());
        assert!(OpStatus::NoData.is_terminal());
        assert!(!OpStatus::Unknown.is_terminal());
        assert!(!OpStatus::InProgress.is_terminal());
    }

    #[test]
    fn test_op_status_serialize() {
        let json = serde_json::to_string(&OpStatus::NoData).unwrap();
        assert_eq!(json, r#""NoData""#);

        let back: OpStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, OpStatus::NoData);
    }

    #[test]
    fn test_phase_forward_transitions() {
        assert!(RunPhase::NotStarted.can_advance_to(RunPhase::Connecting));
        assert!(RunPhase::Connecting.can_advance_to(RunPhase::Producing));
        assert!(RunPhase::Producing.can_advance_to(RunPhase::Consuming));
        assert!(RunPhase::Consuming.can_advance_to(RunPhase::Finalizing));
        assert!(RunPhase::Finalizing.can_advance_to(RunPhase::Done));
    }

    #[test]
    fn test_phase_early_exit_to_finalizing() {
        assert!(RunPhase::Connecting.can_advance_to(RunPhase::Finalizing));
        assert!(RunPhase::Producing.can_advance_to(RunPhase::Finalizing));
    }

    #[test]
    fn test_phase_illegal_transitions() {
        assert!(!RunPhase::NotStarted.can_advance_to(RunPhase::Finalizing));
        assert!(!RunPhase::Consuming.can_advance_to(RunPhase::Producing));
        assert!(!RunPhase::Done.can_advance_to(RunPhase::Connecting));
        assert!(!RunPhase::Connecting.can_advance_to(RunPhase::Consuming));
    }
}
