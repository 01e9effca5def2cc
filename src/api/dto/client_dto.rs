//! Client DTOs for register, get, and list operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ClientHandle;

/// Request body for `POST /clients`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterClientRequest {
    /// Client identifier. Must not be blank.
    pub client_id: String,
    /// Remote channel to deliver on. Defaults to the client id.
    #[serde(default)]
    pub channel: Option<String>,
}

/// A registered client.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClientDto {
    /// Client identifier.
    pub client_id: String,
    /// Remote channel deliveries are triggered on.
    pub channel: String,
    /// Registration timestamp.
    pub registered_at: DateTime<Utc>,
}

impl From<&ClientHandle> for ClientDto {
    fn from(handle: &ClientHandle) -> Self {
        Self {
            client_id: handle.id().to_string(),
            channel: handle.channel().to_string(),
            registered_at: handle.registered_at(),
        }
    }
}

/// Response body for `GET /clients`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClientListResponse {
    /// Registered client ids, sorted.
    pub data: Vec<String>,
    /// Number of registered clients.
    pub total: usize,
}
