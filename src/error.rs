//! Dispatch error types with HTTP status code mapping.
//!
//! [`DispatchError`] is the central error type for the crate. Per-message
//! delivery failures travel as [`FailureReason`] inside the acknowledgement
//! and only become a `DispatchError` at the REST boundary, where each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{ClientId, FailureReason};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2002,
///     "message": "delivery failed: unknown client: c1",
///     "details": "unknown_client"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`DispatchError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details (the failure label for delivery errors).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Crate-level error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                   |
/// |-----------|-----------------|-------------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request               |
/// | 2000–2999 | Not Found       | 404 Not Found                 |
/// | 3000–3999 | Server          | 503 Service Unavailable       |
/// | 4000–4999 | Delivery        | 502 / 503 / 504               |
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Push transport credentials or endpoint are unusable.
    #[error("invalid transport config: {0}")]
    InvalidTransportConfig(String),

    /// Service configuration could not be loaded.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No client with the given id is registered.
    #[error("client not found: {0}")]
    ClientNotFound(ClientId),

    /// A submitted message resolved as failed.
    #[error("delivery failed: {0}")]
    Delivery(#[from] FailureReason),

    /// The engine no longer accepts work.
    #[error("dispatch engine is shutting down")]
    ShuttingDown,
}

impl DispatchError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidTransportConfig(_) => 1002,
            Self::InvalidConfig(_) => 1003,
            Self::ClientNotFound(_) => 2001,
            Self::Delivery(reason) => match reason {
                FailureReason::UnknownEvent(_) => 2002,
                FailureReason::UnknownClient(_) => 2003,
                FailureReason::Transport(_) => 4001,
                FailureReason::QueueFull(_) => 4002,
                FailureReason::ShuttingDown => 4003,
                FailureReason::AckTimeout(_) => 4004,
                FailureReason::AckDropped => 4005,
            },
            Self::ShuttingDown => 3001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InvalidTransportConfig(_) | Self::InvalidConfig(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::ClientNotFound(_) => StatusCode::NOT_FOUND,
            Self::Delivery(reason) => match reason {
                FailureReason::UnknownEvent(_) | FailureReason::UnknownClient(_) => {
                    StatusCode::NOT_FOUND
                }
                FailureReason::Transport(_) => StatusCode::BAD_GATEWAY,
                FailureReason::QueueFull(_) | FailureReason::ShuttingDown => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                FailureReason::AckTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
                FailureReason::AckDropped => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::ShuttingDown => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Extra detail for the response body: the failure label for delivery
    /// errors.
    #[must_use]
    pub const fn details(&self) -> Option<&'static str> {
        match self {
            Self::Delivery(reason) => Some(reason.as_label()),
            _ => None,
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: self.details().map(str::to_string),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn delivery_failures_map_to_distinct_statuses() {
        let cases = [
            (FailureReason::UnknownEvent("x".to_string()), StatusCode::NOT_FOUND),
            (FailureReason::Transport("down".to_string()), StatusCode::BAD_GATEWAY),
            (FailureReason::QueueFull("x".to_string()), StatusCode::SERVICE_UNAVAILABLE),
            (
                FailureReason::AckTimeout(Duration::from_secs(1)),
                StatusCode::GATEWAY_TIMEOUT,
            ),
        ];
        for (reason, status) in cases {
            assert_eq!(DispatchError::from(reason).status_code(), status);
        }
    }

    #[test]
    fn details_carry_failure_label() {
        let err = DispatchError::Delivery(FailureReason::ShuttingDown);
        assert_eq!(err.details(), Some("shutting_down"));
        assert_eq!(DispatchError::ShuttingDown.details(), None);
    }

    #[test]
    fn client_not_found_is_404() {
        let Ok(id) = ClientId::new("c1") else {
            panic!("valid id");
        };
        let err = DispatchError::ClientNotFound(id);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), 2001);
    }

    #[test]
    fn into_response_sets_status() {
        let response = DispatchError::InvalidRequest("bad".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
