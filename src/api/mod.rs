//! REST API layer: route handlers, DTOs, OpenAPI document and router
//! composition.
//!
//! All resource endpoints are mounted under `/api/v1`; `/health` sits at the
//! root. With the `swagger-ui` feature the interactive docs are served at
//! `/swagger-ui`.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::engine::EngineState;
use crate::error::{ErrorBody, ErrorResponse};

/// OpenAPI document for every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "push-dispatch", description = "Event dispatch to registered push clients"),
    paths(
        handlers::clients::register_client,
        handlers::clients::list_clients,
        handlers::clients::get_client,
        handlers::clients::unregister_client,
        handlers::events::list_events,
        handlers::events::register_event,
        handlers::events::dispatch_event,
        handlers::system::health_handler,
    ),
    components(schemas(
        dto::RegisterClientRequest,
        dto::ClientDto,
        dto::ClientListResponse,
        dto::EventDto,
        dto::RegisterEventRequest,
        dto::DispatchRequest,
        dto::DispatchResponse,
        handlers::system::HealthResponse,
        EngineState,
        ErrorResponse,
        ErrorBody,
    )),
    tags(
        (name = "Clients", description = "Client registration"),
        (name = "Events", description = "Event registration and dispatch"),
        (name = "System", description = "Health"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
}
