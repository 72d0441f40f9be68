//! Cooperative cancellation for backup runs.
//!
//! This module provides:
//! - CancellationToken, passed through every phase of a run
//! - `race_cancellation`, which lets a phase return promptly once the token
//!   fires even if the collaborator it awaits does not observe it

mod token;

pub use token::{race_cancellation, CancellationToken};
