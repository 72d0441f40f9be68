//! Progress display surface.
//!
//! A phase announces itself with [`ProgressSurface::message_with_completion`]
//! and holds the returned [`ProgressTicket`] while it works. The ticket sends
//! its done signal and runs its closer exactly once, either through
//! [`ProgressTicket::finish`] or on drop, so early returns still release it.
//! Before reading final counts the coordinator calls
//! [`ProgressSurface::complete`], which waits for the display to drain.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Instant;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Closure run when a ticket is released.
pub type ProgressCloser = Box<dyn FnOnce() + Send>;

/// Scoped handle for one progress message.
pub struct ProgressTicket {
    done: Option<oneshot::Sender<()>>,
    closer: Option<ProgressCloser>,
}

impl ProgressTicket {
    /// Creates a ticket from a done signal and a closer.
    #[must_use]
    pub fn new(done: oneshot::Sender<()>, closer: ProgressCloser) -> Self {
        Self {
            done: Some(done),
            closer: Some(closer),
        }
    }

    /// Creates a ticket that does nothing on release.
    #[must_use]
    pub const fn noop() -> Self {
        Self {
            done: None,
            closer: None,
        }
    }

    /// Releases the ticket now.
    pub fn finish(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(done) = self.done.take() {
            // The display may already have shut down.
            let _ = done.send(());
        }
        if let Some(closer) = self.closer.take() {
            closer();
        }
    }
}

impl Drop for ProgressTicket {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ProgressTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressTicket")
            .field("released", &(self.done.is_none() && self.closer.is_none()))
            .finish()
    }
}

/// A surface that displays incremental progress for a run.
#[async_trait]
pub trait ProgressSurface: Send + Sync {
    /// Begins a progress message. The message is complete once the returned
    /// ticket is released.
    fn message_with_completion(&self, message: &str) -> ProgressTicket;

    /// Waits until every message begun so far has been rendered to completion.
    ///
    /// Tickets still held by the caller keep their messages open, so callers
    /// release their tickets before draining.
    async fn complete(&self);
}

/// A progress surface that displays nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpProgress;

#[async_trait]
impl ProgressSurface for NoOpProgress {
    fn message_with_completion(&self, _message: &str) -> ProgressTicket {
        ProgressTicket::noop()
    }

    async fn complete(&self) {}
}

/// A progress surface rendered through `tracing`.
///
/// Each message is tracked by a background task that logs when the message
/// begins and when its ticket is released. `complete` joins those tasks.
#[derive(Debug, Default)]
pub struct LoggingProgress {
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl LoggingProgress {
    /// Creates a new logging progress surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of messages not yet drained.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }
}

#[async_trait]
impl ProgressSurface for LoggingProgress {
    fn message_with_completion(&self, message: &str) -> ProgressTicket {
        let (done_tx, done_rx) = oneshot::channel::<()>();
        let message = message.to_string();
        let started = Instant::now();

        info!(message = %message, "progress");
        let handle = tokio::spawn(async move {
            match done_rx.await {
                Ok(()) => info!(
                    message = %message,
                    elapsed_ms = started.elapsed().as_millis(),
                    "progress done"
                ),
                Err(_) => warn!(message = %message, "progress ticket dropped without signal"),
            }
        });
        self.pending.lock().push(handle);

        ProgressTicket::new(done_tx, Box::new(|| debug!("progress message closed")))
    }

    async fn complete(&self) {
        let handles: Vec<_> = std::mem::take(&mut *self.pending.lock());
        if handles.is_empty() {
            return;
        }

        for res in futures::future::join_all(handles).await {
            if let Err(e) = res {
                warn!(error = %e, "progress task failed");
            }
        }
    }
}
