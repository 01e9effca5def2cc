//! Shared application state injected into all Axum handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::engine::DispatchEngine;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The dispatch engine.
    pub engine: Arc<DispatchEngine>,
    /// Default acknowledgement timeout for dispatch requests. `None` waits
    /// until the message resolves.
    pub ack_timeout: Option<Duration>,
}

impl AppState {
    /// Creates state around a shared engine.
    #[must_use]
    pub const fn new(engine: Arc<DispatchEngine>, ack_timeout: Option<Duration>) -> Self {
        Self {
            engine,
            ack_timeout,
        }
    }
}
