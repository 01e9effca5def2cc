//! Event DTOs for listing and dispatch.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::engine::EventSummary;

/// One registered event with its queue depth and counters.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventDto {
    /// Event name.
    pub name: String,
    /// Queue capacity.
    pub capacity: usize,
    /// Messages waiting in the queue.
    pub queued: usize,
    /// Successful deliveries.
    pub delivered: u64,
    /// Failed messages.
    pub failed: u64,
}

impl From<EventSummary> for EventDto {
    fn from(summary: EventSummary) -> Self {
        Self {
            name: summary.name,
            capacity: summary.capacity,
            queued: summary.queued,
            delivered: summary.delivered,
            failed: summary.failed,
        }
    }
}

/// Request body for `POST /events/{name}/dispatch`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DispatchRequest {
    /// Target client id.
    pub client_id: String,
    /// Payload, delivered as-is.
    pub data: String,
    /// Acknowledgement timeout in milliseconds. Defaults to the configured
    /// timeout; `0` waits until the message resolves.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

/// Response body for a delivered dispatch.
#[derive(Debug, Serialize, ToSchema)]
pub struct DispatchResponse {
    /// Message identifier.
    pub message_id: Uuid,
    /// Event the message went through.
    pub event: String,
    /// Target client id.
    pub client_id: String,
    /// Always `true`; failures are returned as errors.
    pub delivered: bool,
}

/// Request body for `POST /events`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterEventRequest {
    /// Event name. Must not be blank.
    pub name: String,
    /// Queue capacity, at most 1048576. Defaults to 1024.
    #[serde(default)]
    pub capacity: Option<usize>,
}
