//! # push-dispatch
//!
//! Concurrent event dispatch to registered push clients.
//!
//! Producers submit a message naming an event and a target client. Each
//! event owns a bounded queue drained by one worker task, which looks the
//! client up and triggers the delivery through a shared push transport. The
//! outcome (delivered, or failed with a reason) comes back to the producer
//! through a per-message acknowledgement. A REST API exposes the engine
//! over HTTP.
//!
//! ## Architecture
//!
//! ```text
//! Producers (HTTP, library callers)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── DispatchEngine (engine/)
//!     │     ├── EventTable ─► Event queue ─► Worker (one per event)
//!     │     └── ClientDirectory
//!     │
//!     └── PushTransport (transport/)
//!           ├── HttpPushTransport
//!           └── InMemoryTransport
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod shutdown;
pub mod transport;
