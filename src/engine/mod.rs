//! Dispatch engine: lifecycle, per-event workers and the registry that
//! ties them together.

pub mod registry;
pub mod state;
pub mod worker;

pub use registry::{DispatchEngine, EventSummary};
pub use state::EngineState;
pub use worker::Worker;
