//! Event sink system for lifecycle telemetry.
//!
//! Backup runs emit a start event before connecting and an end event once
//! finalization has run. Sinks are injected per operation and are
//! fire-and-forget: a failing sink never blocks or fails a run.

pub mod kinds;
mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
