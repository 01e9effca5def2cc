//! Addressable remote endpoint.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::ClientId;
use crate::transport::{PushTransport, TransportError};

/// A remote client that deliveries can be sent to.
///
/// Built by the caller, then handed to
/// [`crate::engine::DispatchEngine::register_client`], which attaches the
/// shared push transport before storing it. After unregistration an `Arc`
/// still held elsewhere stays memory-safe but is logically stale.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    id: ClientId,
    channel: String,
    registered_at: DateTime<Utc>,
    transport: Option<Arc<dyn PushTransport>>,
}

impl ClientHandle {
    /// Creates a detached handle whose channel equals its id.
    #[must_use]
    pub fn new(id: ClientId) -> Self {
        let channel = id.as_str().to_string();
        Self {
            id,
            channel,
            registered_at: Utc::now(),
            transport: None,
        }
    }

    /// Overrides the remote channel deliveries are triggered on.
    #[must_use]
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    /// Attaches the shared push transport. Called on registration.
    pub fn attach_transport(&mut self, transport: Arc<dyn PushTransport>) {
        self.transport = Some(transport);
        self.registered_at = Utc::now();
    }

    /// Client identifier.
    #[must_use]
    pub const fn id(&self) -> &ClientId {
        &self.id
    }

    /// Remote channel name.
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// When the handle was (last) registered.
    #[must_use]
    pub const fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    /// Returns `true` once a transport has been attached.
    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.transport.is_some()
    }

    /// Sends `data` tagged with `event` to this client's channel.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Detached`] if no transport is attached, or
    /// whatever the transport reports.
    pub async fn send(&self, event: &str, data: &[u8]) -> Result<(), TransportError> {
        let Some(transport) = &self.transport else {
            return Err(TransportError::Detached);
        };
        transport.trigger(&self.channel, event, data).await
    }
}
