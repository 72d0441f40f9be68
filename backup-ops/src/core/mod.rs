//! Core domain model types for backup runs.
//!
//! This module contains the value types shared by the coordinator and its
//! collaborators:
//! - Operation status and run phase enums
//! - Engine and connector statistics
//! - Data collections handed from producer to consumer
//! - The details manifest describing what was backed up

mod collection;
mod details;
mod stats;
mod status;

pub use collection::{resource_owner_set, CollectionPath, DataCollection, DataItem};
pub use details::{short_ref, Details, DetailsEntry};
pub use stats::{ConnectorStatus, EngineStats, ReadWrites, StartAndEndTime};
pub use status::{OpStatus, RunPhase};
