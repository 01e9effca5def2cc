//! Push-transport collaborator.
//!
//! The dispatch engine only needs one capability from the outside world:
//! "send this named event payload to that channel". [`PushTransport`]
//! captures it; [`HttpPushTransport`] talks to a remote push service over
//! HTTP and [`InMemoryTransport`] records deliveries for tests and dry runs.

pub mod config;
pub mod http;
pub mod memory;

use async_trait::async_trait;

pub use config::TransportConfig;
pub use http::HttpPushTransport;
pub use memory::{Delivery, InMemoryTransport};

/// Errors reported by a [`PushTransport`].
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The HTTP request could not be completed.
    #[error("push request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The push service answered with a non-success status.
    #[error("push service rejected the event with status {status}")]
    Rejected {
        /// HTTP status code returned by the service.
        status: u16,
    },

    /// The client handle was never attached to a transport.
    #[error("client handle is not attached to a transport")]
    Detached,

    /// The transport is unavailable (used by in-memory fakes).
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

/// Sends named-event payloads to a remote channel.
///
/// Implementations are shared read-only by every client handle, so they must
/// be `Send + Sync` and must not require `&mut self`.
#[async_trait]
pub trait PushTransport: std::fmt::Debug + Send + Sync {
    /// Triggers `event` with `data` on `channel`.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the payload could not be handed to the
    /// remote service.
    async fn trigger(&self, channel: &str, event: &str, data: &[u8])
    -> Result<(), TransportError>;
}
