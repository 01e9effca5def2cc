//! push-dispatch server entry point.
//!
//! Starts the dispatch engine and the Axum HTTP server, then shuts both down
//! on SIGINT/SIGTERM.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use push_dispatch::api;
use push_dispatch::app_state::AppState;
use push_dispatch::config::{DispatchConfig, TransportKind};
use push_dispatch::engine::DispatchEngine;
use push_dispatch::shutdown::cancel_on_signal;
use push_dispatch::transport::{InMemoryTransport, PushTransport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = DispatchConfig::from_env().context("loading configuration")?;
    tracing::info!(addr = %config.listen_addr, "starting push-dispatch");

    // Build the engine
    let events = config.build_events();
    let engine = match config.transport_kind {
        TransportKind::Http => {
            DispatchEngine::new(&config.transport, events, config.queue_policy)
                .context("building push transport")?
        }
        TransportKind::Memory => {
            tracing::warn!("using in-memory transport; nothing leaves this process");
            let transport: Arc<dyn PushTransport> = Arc::new(InMemoryTransport::new());
            DispatchEngine::with_transport(transport, events, config.queue_policy)
        }
    };
    let engine = Arc::new(engine);
    engine.run().context("starting event workers")?;

    // Bridge OS signals into the engine's shutdown token
    let shutdown = engine.shutdown_signal();
    let signals = cancel_on_signal(shutdown.clone());

    // Build router
    let app_state = AppState::new(Arc::clone(&engine), config.ack_timeout);
    let app = Router::new()
        .merge(api::build_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .await
        .context("serving HTTP")?;

    // The server may also stop on its own; make sure the engine follows.
    shutdown.cancel();
    engine.wait_for_shutdown().await;
    signals.abort();

    tracing::info!("push-dispatch stopped");
    Ok(())
}
