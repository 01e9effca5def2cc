//! Client handlers: register, list, get, unregister.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{ClientDto, ClientListResponse, RegisterClientRequest};
use crate::app_state::AppState;
use crate::domain::{ClientHandle, ClientId};
use crate::error::{DispatchError, ErrorResponse};

/// `POST /clients`: Register a client.
///
/// # Errors
///
/// Returns [`DispatchError::InvalidRequest`] if the id or channel is blank.
#[utoipa::path(
    post,
    path = "/api/v1/clients",
    tag = "Clients",
    summary = "Register a client",
    description = "Registers an addressable client. An existing client with the same id is replaced.",
    request_body = RegisterClientRequest,
    responses(
        (status = 201, description = "Client registered", body = ClientDto),
        (status = 400, description = "Invalid client id or channel", body = ErrorResponse),
    )
)]
pub async fn register_client(
    State(state): State<AppState>,
    Json(req): Json<RegisterClientRequest>,
) -> Result<impl IntoResponse, DispatchError> {
    let id = ClientId::new(req.client_id)?;
    let mut handle = ClientHandle::new(id);
    if let Some(channel) = req.channel {
        if channel.trim().is_empty() {
            return Err(DispatchError::InvalidRequest(
                "channel must not be empty".to_string(),
            ));
        }
        handle = handle.with_channel(channel);
    }

    let stored = state.engine.register_client(handle);
    tracing::info!(client_id = %stored.id(), channel = stored.channel(), "client registered");
    Ok((StatusCode::CREATED, Json(ClientDto::from(&*stored))))
}

/// `GET /clients`: List registered client ids.
#[utoipa::path(
    get,
    path = "/api/v1/clients",
    tag = "Clients",
    summary = "List clients",
    description = "Returns the ids of all registered clients, sorted.",
    responses(
        (status = 200, description = "Registered clients", body = ClientListResponse),
    )
)]
pub async fn list_clients(State(state): State<AppState>) -> impl IntoResponse {
    let data: Vec<String> = state
        .engine
        .client_ids()
        .into_iter()
        .map(ClientId::into_inner)
        .collect();
    let total = data.len();
    Json(ClientListResponse { data, total })
}

/// `GET /clients/{id}`: Get a registered client.
///
/// # Errors
///
/// Returns [`DispatchError::ClientNotFound`] if no client has this id.
#[utoipa::path(
    get,
    path = "/api/v1/clients/{id}",
    tag = "Clients",
    summary = "Get client",
    params(
        ("id" = String, Path, description = "Client id"),
    ),
    responses(
        (status = 200, description = "Client details", body = ClientDto),
        (status = 404, description = "Client not found", body = ErrorResponse),
    )
)]
pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, DispatchError> {
    let id = ClientId::new(id)?;
    let handle = state
        .engine
        .get_client(&id)
        .ok_or(DispatchError::ClientNotFound(id))?;
    Ok(Json(ClientDto::from(&*handle)))
}

/// `DELETE /clients/{id}`: Unregister a client.
///
/// Idempotent: removing an unknown id also returns 204.
///
/// # Errors
///
/// Returns [`DispatchError::InvalidRequest`] if the id is blank.
#[utoipa::path(
    delete,
    path = "/api/v1/clients/{id}",
    tag = "Clients",
    summary = "Unregister client",
    description = "Removes a client. Messages already queued for it fail with unknown_client.",
    params(
        ("id" = String, Path, description = "Client id"),
    ),
    responses(
        (status = 204, description = "Client removed (or was not registered)"),
    )
)]
pub async fn unregister_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, DispatchError> {
    let id = ClientId::new(id)?;
    if state.engine.unregister_client(&id).is_some() {
        tracing::info!(client_id = %id, "client unregistered");
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Client management routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/clients", get(list_clients).post(register_client))
        .route("/clients/{id}", get(get_client).delete(unregister_client))
}
