//! Terminal outcome of a dispatched message.
//!
//! Every [`super::Message`] resolves to exactly one [`DispatchOutcome`].
//! Failures carry a typed [`FailureReason`]; the single-bit view used by
//! older producers is still available via [`DispatchOutcome::as_legacy_bool`].

use std::time::Duration;

use super::ClientId;

/// Why a message was not delivered.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FailureReason {
    /// No event with this name is registered.
    #[error("unknown event: {0}")]
    UnknownEvent(String),

    /// The target client is not registered at delivery time.
    #[error("unknown client: {0}")]
    UnknownClient(ClientId),

    /// The push transport reported a failure.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The event queue is saturated and the engine rejects on overflow.
    #[error("queue full for event {0}")]
    QueueFull(String),

    /// The engine is shutting down and no longer processes work.
    #[error("dispatch engine is shutting down")]
    ShuttingDown,

    /// The acknowledgement was dropped without being resolved.
    #[error("acknowledgement dropped before resolution")]
    AckDropped,

    /// The producer stopped waiting for the acknowledgement.
    #[error("acknowledgement timed out after {0:?}")]
    AckTimeout(Duration),
}

impl FailureReason {
    /// Returns a short stable label (snake_case) for logs and API bodies.
    #[must_use]
    pub const fn as_label(&self) -> &'static str {
        match self {
            Self::UnknownEvent(_) => "unknown_event",
            Self::UnknownClient(_) => "unknown_client",
            Self::Transport(_) => "transport_failure",
            Self::QueueFull(_) => "queue_full",
            Self::ShuttingDown => "shutting_down",
            Self::AckDropped => "ack_dropped",
            Self::AckTimeout(_) => "ack_timeout",
        }
    }
}

/// Result of one delivery attempt, as reported to the producer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The transport accepted the payload for the target client.
    Delivered,
    /// The message was not delivered.
    Failed(FailureReason),
}

impl DispatchOutcome {
    /// Returns `true` if the message was delivered.
    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    /// Returns the failure reason, if any.
    #[must_use]
    pub const fn failure(&self) -> Option<&FailureReason> {
        match self {
            Self::Delivered => None,
            Self::Failed(reason) => Some(reason),
        }
    }

    /// One-bit view of the outcome: `true` on delivery, `false` on any failure.
    ///
    /// Matches the collapsed contract where unknown event, unknown client and
    /// transport failure are indistinguishable.
    #[must_use]
    pub const fn as_legacy_bool(&self) -> bool {
        self.is_delivered()
    }

    /// Converts the outcome into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns the [`FailureReason`] when the message was not delivered.
    pub fn into_result(self) -> Result<(), FailureReason> {
        match self {
            Self::Delivered => Ok(()),
            Self::Failed(reason) => Err(reason),
        }
    }
}

impl From<FailureReason> for DispatchOutcome {
    fn from(reason: FailureReason) -> Self {
        Self::Failed(reason)
    }
}
