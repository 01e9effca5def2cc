//! In-memory push transport.
//!
//! Records every triggered event in order instead of sending it anywhere.
//! Backs the `memory` dry-run mode of the binary and the test suite, where
//! [`InMemoryTransport::set_failing`] simulates an unreachable push service.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{PushTransport, TransportError};

/// One recorded trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Channel the event was triggered on.
    pub channel: String,
    /// Event name.
    pub event: String,
    /// Raw payload.
    pub data: Vec<u8>,
}

/// Transport that keeps deliveries in memory.
#[derive(Debug, Default)]
pub struct InMemoryTransport {
    deliveries: Mutex<Vec<Delivery>>,
    failing: AtomicBool,
}

impl InMemoryTransport {
    /// Creates an empty, healthy transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent trigger fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Returns a copy of the deliveries recorded so far, oldest first.
    #[must_use]
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().clone()
    }

    /// Number of recorded deliveries.
    #[must_use]
    pub fn delivery_count(&self) -> usize {
        self.deliveries.lock().len()
    }
}

#[async_trait]
impl PushTransport for InMemoryTransport {
    async fn trigger(
        &self,
        channel: &str,
        event: &str,
        data: &[u8],
    ) -> Result<(), TransportError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(TransportError::Unavailable(
                "in-memory transport set to fail".to_string(),
            ));
        }

        self.deliveries.lock().push(Delivery {
            channel: channel.to_string(),
            event: event.to_string(),
            data: data.to_vec(),
        });
        tracing::debug!(channel, event, bytes = data.len(), "recorded in-memory delivery");
        Ok(())
    }
}
