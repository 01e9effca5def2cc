//! Submitted payloads and their acknowledgement channel.
//!
//! A [`Message`] is created together with an [`Acknowledgement`]. The message
//! travels through exactly one event queue and carries an [`Acknowledger`]
//! that the delivering worker consumes when it resolves the outcome. The
//! producer keeps the [`Acknowledgement`] and awaits it exactly once.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::oneshot;
use uuid::Uuid;

use super::{ClientId, DispatchOutcome, FailureReason};

/// A payload addressed to one client, submitted to one event.
#[derive(Debug)]
pub struct Message {
    /// Server-generated id for log correlation.
    pub id: Uuid,
    /// Client that should receive the payload.
    pub target: ClientId,
    /// Opaque payload bytes.
    pub payload: Vec<u8>,
    /// Submission timestamp.
    pub submitted_at: DateTime<Utc>,
    /// Outcome channel back to the producer.
    pub ack: Acknowledger,
}

impl Message {
    /// Creates a message and the acknowledgement its producer should await.
    #[must_use]
    pub fn new(target: ClientId, payload: impl Into<Vec<u8>>) -> (Self, Acknowledgement) {
        let (tx, rx) = oneshot::channel();
        let id = Uuid::new_v4();
        let message = Self {
            id,
            target,
            payload: payload.into(),
            submitted_at: Utc::now(),
            ack: Acknowledger { tx },
        };
        (message, Acknowledgement { message_id: id, rx })
    }

    /// Resolves the message as failed without attempting delivery.
    pub fn reject(self, reason: FailureReason) {
        self.ack.resolve(DispatchOutcome::Failed(reason));
    }
}

/// Write half of the acknowledgement channel.
///
/// Consumed by [`Acknowledger::resolve`], so an outcome is written at most
/// once.
#[derive(Debug)]
pub struct Acknowledger {
    tx: oneshot::Sender<DispatchOutcome>,
}

impl Acknowledger {
    /// Reports the terminal outcome to the producer.
    ///
    /// A producer that already gave up (dropped its [`Acknowledgement`]) is
    /// not an error; the outcome is discarded.
    pub fn resolve(self, outcome: DispatchOutcome) {
        if self.tx.send(outcome).is_err() {
            tracing::debug!("producer dropped acknowledgement before resolution");
        }
    }
}

/// Read half of the acknowledgement channel, held by the producer.
#[derive(Debug)]
pub struct Acknowledgement {
    message_id: Uuid,
    rx: oneshot::Receiver<DispatchOutcome>,
}

impl Acknowledgement {
    /// Id of the message this acknowledgement belongs to.
    #[must_use]
    pub const fn message_id(&self) -> Uuid {
        self.message_id
    }

    /// Waits for the terminal outcome.
    ///
    /// Resolves to [`FailureReason::AckDropped`] if the write half was
    /// dropped without resolving, which only happens if a worker task is
    /// aborted mid-delivery.
    pub async fn wait(self) -> DispatchOutcome {
        self.rx
            .await
            .unwrap_or(DispatchOutcome::Failed(FailureReason::AckDropped))
    }

    /// Waits for the terminal outcome for at most `limit`.
    ///
    /// The message itself is not cancelled on timeout; it may still be
    /// delivered after the producer stopped waiting.
    pub async fn wait_timeout(self, limit: Duration) -> DispatchOutcome {
        match tokio::time::timeout(limit, self.wait()).await {
            Ok(outcome) => outcome,
            Err(_) => DispatchOutcome::Failed(FailureReason::AckTimeout(limit)),
        }
    }

    /// Waits and collapses the outcome to a single bit.
    pub async fn wait_legacy(self) -> bool {
        self.wait().await.as_legacy_bool()
    }
}
