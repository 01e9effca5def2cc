//! REST endpoint handlers organized by resource.

pub mod clients;
pub mod events;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(clients::routes())
        .merge(events::routes())
}
