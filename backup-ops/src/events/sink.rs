//! Event sink trait and implementations.

use async_trait::async_trait;
use tracing::{debug, info, Level};

use super::kinds;

/// Trait for event sinks that can receive lifecycle events.
///
/// The coordinator only calls `try_emit`, so delivery never blocks a run.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Emits an event asynchronously.
    ///
    /// # Arguments
    ///
    /// * `event_type` - The kind of event (e.g., `backup.start`)
    /// * `data` - Optional attribute map
    async fn emit(&self, event_type: &str, data: Option<serde_json::Value>);

    /// Emits an event without blocking.
    ///
    /// Implementations must not panic or block. Delivery errors are logged
    /// and suppressed.
    fn try_emit(&self, event_type: &str, data: Option<serde_json::Value>);
}

/// A no-op event sink that discards all events.
///
/// Used when metrics are disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event_type: &str, _data: Option<serde_json::Value>) {}

    fn try_emit(&self, _event_type: &str, _data: Option<serde_json::Value>) {}
}

/// An event sink that logs events using the tracing framework.
#[derive(Debug, Clone)]
pub struct LoggingEventSink {
    level: Level,
}

impl Default for LoggingEventSink {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl LoggingEventSink {
    /// Creates a new logging event sink with the specified level.
    #[must_use]
    pub const fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a debug-level logging sink.
    #[must_use]
    pub const fn debug() -> Self {
        Self::new(Level::DEBUG)
    }

    fn log_event(&self, event_type: &str, data: Option<&serde_json::Value>) {
        let backup_id = data
            .and_then(|d| d.get(kinds::BACKUP_ID))
            .and_then(serde_json::Value::as_str)
            .unwrap_or("-");

        if self.level == Level::DEBUG {
            debug!(event_type, backup_id, event_data = ?data, "lifecycle event");
        } else {
            info!(event_type, backup_id, event_data = ?data, "lifecycle event");
        }
    }
}

#[async_trait]
impl EventSink for LoggingEventSink {
    async fn emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        self.log_event(event_type, data.as_ref());
    }

    fn try_emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        self.log_event(event_type, data.as_ref());
    }
}

/// An event sink that keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: parking_lot::RwLock<Vec<(String, Option<serde_json::Value>)>>,
}

impl CollectingEventSink {
    /// Creates a new collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    #[must_use]
    pub fn events(&self) -> Vec<(String, Option<serde_json::Value>)> {
        self.events.read().clone()
    }

    /// Returns the kinds of the collected events, in order.
    #[must_use]
    pub fn kinds(&self) -> Vec<String> {
        self.events.read().iter().map(|(k, _)| k.clone()).collect()
    }

    /// Returns the number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if no events have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Returns the payload of the last event of `kind`.
    #[must_use]
    pub fn last_payload(&self, kind: &str) -> Option<serde_json::Value> {
        self.events
            .read()
            .iter()
            .rev()
            .find(|(k, _)| k == kind)
            .and_then(|(_, data)| data.clone())
    }

    /// Returns events matching a kind prefix.
    #[must_use]
    pub fn events_of_type(&self, type_prefix: &str) -> Vec<(String, Option<serde_json::Value>)> {
        self.events
            .read()
            .iter()
            .filter(|(t, _)| t.starts_with(type_prefix))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EventSink for CollectingEventSink {
    async fn emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        self.try_emit(event_type, data);
    }

    fn try_emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        self.events.write().push((event_type.to_string(), data));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_sink() {
        let sink = NoOpEventSink;
        tokio_test::block_on(sink.emit(kinds::BACKUP_START, None));
        sink.try_emit(kinds::BACKUP_END, Some(serde_json::json!({"x": 1})));
    }

    #[tokio::test]
    async fn test_logging_sink_accepts_missing_backup_id() {
        let sink = LoggingEventSink::default();
        sink.emit(kinds::BACKUP_START, Some(serde_json::json!({"backup_id": "b1"}))).await;
        sink.try_emit(kinds::BACKUP_END, None);
        LoggingEventSink::debug().try_emit(kinds::BACKUP_END, Some(serde_json::json!([])));
    }

    #[tokio::test]
    async fn test_collecting_sink_order() {
        let sink = CollectingEventSink::new();
        assert!(sink.is_empty());

        sink.emit(kinds::BACKUP_START, None).await;
        sink.try_emit(kinds::BACKUP_END, Some(serde_json::json!({"status": "Completed"})));

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.kinds(), vec![kinds::BACKUP_START, kinds::BACKUP_END]);
    }

    #[test]
    fn test_last_payload() {
        let sink = CollectingEventSink::new();
        sink.try_emit(kinds::BACKUP_END, Some(serde_json::json!({"n": 1})));
        sink.try_emit(kinds::BACKUP_END, Some(serde_json::json!({"n": 2})));

        assert_eq!(sink.last_payload(kinds::BACKUP_END).unwrap()["n"], 2);
        assert!(sink.last_payload(kinds::BACKUP_START).is_none());
    }

    #[test]
    fn test_events_of_type_prefix() {
        let sink = CollectingEventSink::new();
        sink.try_emit("backup.start", None);
        sink.try_emit("backup.end", None);
        sink.try_emit("restore.start", None);

        assert_eq!(sink.events_of_type("backup.").len(), 2);
        assert_eq!(sink.events_of_type("restore.").len(), 1);
    }
}
