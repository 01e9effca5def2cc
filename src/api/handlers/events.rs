//! Event handlers: list, register, dispatch.

use std::collections::HashMap;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{DispatchRequest, DispatchResponse, EventDto, RegisterEventRequest};
use crate::app_state::AppState;
use crate::domain::{ClientId, DEFAULT_QUEUE_CAPACITY, Event, MAX_QUEUE_CAPACITY};
use crate::engine::EngineState;
use crate::error::{DispatchError, ErrorResponse};

/// `GET /events`: List registered events.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    tag = "Events",
    summary = "List events",
    description = "Returns every registered event with its queue depth and delivery counters.",
    responses(
        (status = 200, description = "Registered events", body = Vec<EventDto>),
    )
)]
pub async fn list_events(State(state): State<AppState>) -> impl IntoResponse {
    let events: Vec<EventDto> = state
        .engine
        .event_stats()
        .into_iter()
        .map(EventDto::from)
        .collect();
    Json(events)
}

/// `POST /events`: Register an event at runtime.
///
/// # Errors
///
/// Returns [`DispatchError::InvalidRequest`] if the name is blank or the
/// capacity is outside `1..=MAX_QUEUE_CAPACITY`, or
/// [`DispatchError::ShuttingDown`] once shutdown has begun.
#[utoipa::path(
    post,
    path = "/api/v1/events",
    tag = "Events",
    summary = "Register an event",
    description = "Installs an event, replacing one with the same name. If the engine is running its worker starts immediately.",
    request_body = RegisterEventRequest,
    responses(
        (status = 201, description = "Event registered", body = EventDto),
        (status = 400, description = "Invalid event name or capacity", body = ErrorResponse),
        (status = 503, description = "Engine is shutting down", body = ErrorResponse),
    )
)]
pub async fn register_event(
    State(state): State<AppState>,
    Json(req): Json<RegisterEventRequest>,
) -> Result<impl IntoResponse, DispatchError> {
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(DispatchError::InvalidRequest(
            "event name must not be empty".to_string(),
        ));
    }
    if state.engine.state() == EngineState::ShuttingDown {
        return Err(DispatchError::ShuttingDown);
    }

    let capacity = req.capacity.unwrap_or(DEFAULT_QUEUE_CAPACITY);
    if capacity == 0 || capacity > MAX_QUEUE_CAPACITY {
        return Err(DispatchError::InvalidRequest(format!(
            "capacity must be between 1 and {MAX_QUEUE_CAPACITY}"
        )));
    }
    let event = Event::new(name.as_str(), capacity);
    let dto = EventDto {
        name: name.clone(),
        capacity: event.capacity(),
        queued: 0,
        delivered: 0,
        failed: 0,
    };
    let started = state
        .engine
        .register_events(HashMap::from([(name.clone(), event)]));
    tracing::info!(event = %name, workers = started, "event registered");
    Ok((StatusCode::CREATED, Json(dto)))
}

/// `POST /events/{name}/dispatch`: Deliver a payload to a client.
///
/// Waits for the delivery outcome, bounded by the request's `timeout_ms` or
/// the configured default.
///
/// # Errors
///
/// Returns [`DispatchError::Delivery`] carrying the failure reason when the
/// message is not delivered, or [`DispatchError::InvalidRequest`] for a
/// blank client id.
#[utoipa::path(
    post,
    path = "/api/v1/events/{name}/dispatch",
    tag = "Events",
    summary = "Dispatch a message",
    description = "Queues a payload on the event and waits for the delivery outcome.",
    params(
        ("name" = String, Path, description = "Event name"),
    ),
    request_body = DispatchRequest,
    responses(
        (status = 200, description = "Delivered", body = DispatchResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Unknown event or client", body = ErrorResponse),
        (status = 502, description = "Push transport failed", body = ErrorResponse),
        (status = 503, description = "Queue full or shutting down", body = ErrorResponse),
        (status = 504, description = "Acknowledgement timed out", body = ErrorResponse),
    )
)]
pub async fn dispatch_event(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<DispatchRequest>,
) -> Result<impl IntoResponse, DispatchError> {
    let client_id = ClientId::new(req.client_id)?;
    let timeout = match req.timeout_ms {
        Some(0) => None,
        Some(ms) => Some(Duration::from_millis(ms)),
        None => state.ack_timeout,
    };

    let ack = state
        .engine
        .dispatch(&name, client_id.clone(), req.data.into_bytes())
        .await;
    let message_id = ack.message_id();
    let outcome = match timeout {
        Some(limit) => ack.wait_timeout(limit).await,
        None => ack.wait().await,
    };
    outcome.into_result()?;

    Ok(Json(DispatchResponse {
        message_id,
        event: name,
        client_id: client_id.into_inner(),
        delivered: true,
    }))
}

/// Event routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(register_event))
        .route("/events/{name}/dispatch", post(dispatch_event))
}
