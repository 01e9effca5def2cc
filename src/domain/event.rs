//! Named dispatch channel with its own bounded queue.
//!
//! An [`Event`] owns the sending half of a bounded `mpsc` queue and parks the
//! receiving half until a worker claims it with [`Event::take_receiver`].
//! Because the receiver can be taken only once, at most one worker ever
//! consumes a given event and delivery order within an event is FIFO.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::{FailureReason, Message};

/// Default queue capacity per event.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Largest accepted queue capacity per event.
pub const MAX_QUEUE_CAPACITY: usize = 1 << 20;

/// What [`Event::enqueue`] does when the queue is full.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueuePolicy {
    /// Wait until the worker frees a slot (backpressure on the producer).
    #[default]
    Block,
    /// Resolve the message immediately with [`FailureReason::QueueFull`].
    Reject,
}

impl std::str::FromStr for QueuePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "block" => Ok(Self::Block),
            "reject" => Ok(Self::Reject),
            other => Err(format!("unknown queue policy {other:?} (expected block or reject)")),
        }
    }
}

/// Delivery counters for one event.
#[derive(Debug, Default)]
pub struct EventStats {
    delivered: AtomicU64,
    failed: AtomicU64,
}

impl EventStats {
    /// Records a successful delivery.
    pub fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a failed delivery or rejected submission.
    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Deliveries that reached the transport successfully.
    #[must_use]
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Messages that resolved with a failure.
    #[must_use]
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }
}

/// A named channel of dispatch.
#[derive(Debug)]
pub struct Event {
    name: String,
    sender: mpsc::Sender<Message>,
    receiver: Mutex<Option<mpsc::Receiver<Message>>>,
    stats: Arc<EventStats>,
}

impl Event {
    /// Creates an event whose queue holds at most `capacity` messages.
    ///
    /// The capacity is clamped to `1..=MAX_QUEUE_CAPACITY`.
    #[must_use]
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.clamp(1, MAX_QUEUE_CAPACITY));
        Self {
            name: name.into(),
            sender,
            receiver: Mutex::new(Some(receiver)),
            stats: Arc::new(EventStats::default()),
        }
    }

    /// Creates an event with [`DEFAULT_QUEUE_CAPACITY`].
    #[must_use]
    pub fn with_default_capacity(name: impl Into<String>) -> Self {
        Self::new(name, DEFAULT_QUEUE_CAPACITY)
    }

    /// Event name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Maximum number of queued messages.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.sender.max_capacity()
    }

    /// Number of messages currently waiting in the queue.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.sender.max_capacity().saturating_sub(self.sender.capacity())
    }

    /// Delivery counters, shared with the worker.
    #[must_use]
    pub fn stats(&self) -> &Arc<EventStats> {
        &self.stats
    }

    /// Claims the receiving half of the queue.
    ///
    /// Returns `None` once a worker (or the shutdown drain) already took it.
    pub fn take_receiver(&self) -> Option<mpsc::Receiver<Message>> {
        self.receiver.lock().take()
    }

    /// Returns `true` if a worker has claimed this event's queue.
    #[must_use]
    pub fn is_claimed(&self) -> bool {
        self.receiver.lock().is_none()
    }

    /// Places `message` on the queue according to `policy`.
    ///
    /// The message is resolved as failed if it cannot be queued:
    /// [`FailureReason::QueueFull`] under [`QueuePolicy::Reject`], or
    /// [`FailureReason::ShuttingDown`] once the worker closed the queue.
    pub async fn enqueue(&self, message: Message, policy: QueuePolicy) {
        let rejected = match policy {
            QueuePolicy::Block => match self.sender.send(message).await {
                Ok(()) => return,
                Err(mpsc::error::SendError(message)) => (message, FailureReason::ShuttingDown),
            },
            QueuePolicy::Reject => match self.sender.try_send(message) {
                Ok(()) => return,
                Err(mpsc::error::TrySendError::Full(message)) => {
                    (message, FailureReason::QueueFull(self.name.clone()))
                }
                Err(mpsc::error::TrySendError::Closed(message)) => {
                    (message, FailureReason::ShuttingDown)
                }
            },
        };

        let (message, reason) = rejected;
        tracing::warn!(
            event = %self.name,
            message_id = %message.id,
            reason = reason.as_label(),
            "message not queued"
        );
        self.stats.record_failed();
        message.reject(reason);
    }
}
