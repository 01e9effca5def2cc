//! Per-event delivery worker.
//!
//! One [`Worker`] drains one event's queue for the lifetime of the engine:
//!
//! ```text
//! loop {
//!   ├─► select { cancelled → break, recv → message }
//!   ├─► lookup target in ClientDirectory
//!   │     ├─► missing  → Failed(UnknownClient)
//!   │     └─► present  → client.send(event, payload)
//!   │                       ├─► Ok  → Delivered
//!   │                       └─► Err → Failed(Transport)
//!   └─► ack.resolve(outcome)          (every path, exactly once)
//! }
//! close queue, drain leftovers → Failed(ShuttingDown)
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::domain::{ClientDirectory, DispatchOutcome, EventStats, FailureReason, Message};

/// Consumer of a single event queue.
#[derive(Debug)]
pub struct Worker {
    event: String,
    queue: mpsc::Receiver<Message>,
    clients: Arc<ClientDirectory>,
    stats: Arc<EventStats>,
    cancel: CancellationToken,
}

impl Worker {
    /// Creates a worker for `event` consuming `queue`.
    #[must_use]
    pub fn new(
        event: impl Into<String>,
        queue: mpsc::Receiver<Message>,
        clients: Arc<ClientDirectory>,
        stats: Arc<EventStats>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            event: event.into(),
            queue,
            clients,
            stats,
            cancel,
        }
    }

    /// Runs until cancelled or until every sender of the queue is gone.
    ///
    /// Cancellation is observed between messages; a delivery already handed
    /// to the transport completes first.
    pub async fn run(mut self) {
        tracing::info!(event = %self.event, "worker started");

        loop {
            let next = tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                next = self.queue.recv() => next,
            };
            let Some(message) = next else {
                tracing::debug!(event = %self.event, "event queue closed");
                break;
            };
            self.deliver(message).await;
        }

        let drained = drain(&mut self.queue, &self.stats);
        tracing::info!(event = %self.event, drained, "worker stopped");
    }

    /// Attempts one delivery and resolves the message's acknowledgement.
    async fn deliver(&self, message: Message) {
        let Message {
            id,
            target,
            payload,
            ack,
            ..
        } = message;

        let outcome = match self.clients.lookup(&target) {
            None => DispatchOutcome::Failed(FailureReason::UnknownClient(target.clone())),
            Some(client) => match client.send(&self.event, &payload).await {
                Ok(()) => DispatchOutcome::Delivered,
                Err(e) => DispatchOutcome::Failed(FailureReason::Transport(e.to_string())),
            },
        };

        match outcome.failure() {
            None => {
                self.stats.record_delivered();
                tracing::debug!(event = %self.event, client_id = %target, message_id = %id, "delivered");
            }
            Some(reason) => {
                self.stats.record_failed();
                tracing::warn!(
                    event = %self.event,
                    client_id = %target,
                    message_id = %id,
                    reason = reason.as_label(),
                    error = %reason,
                    "delivery failed"
                );
            }
        }

        ack.resolve(outcome);
    }
}

/// Closes `queue` and fails every message still in it with
/// [`FailureReason::ShuttingDown`]. Returns how many were drained.
pub(crate) fn drain(queue: &mut mpsc::Receiver<Message>, stats: &EventStats) -> usize {
    queue.close();
    let mut drained = 0;
    while let Ok(message) = queue.try_recv() {
        stats.record_failed();
        message.reject(FailureReason::ShuttingDown);
        drained += 1;
    }
    drained
}
