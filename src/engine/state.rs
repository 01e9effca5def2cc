//! Lifecycle of a [`super::DispatchEngine`].

use std::fmt;

use serde::Serialize;
use utoipa::ToSchema;

/// Engine lifecycle: `Constructed → Running → ShuttingDown`.
///
/// `ShuttingDown` is terminal. A constructed engine that never ran may go
/// straight to `ShuttingDown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    /// Built, events registered, no workers yet.
    Constructed,
    /// Workers are consuming event queues.
    Running,
    /// Shutdown observed; no new work is accepted.
    ShuttingDown,
}

impl EngineState {
    /// Returns the state as a static string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Constructed => "constructed",
            Self::Running => "running",
            Self::ShuttingDown => "shutting_down",
        }
    }

    /// Returns `true` if moving to `next` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Constructed, Self::Running)
                | (Self::Constructed | Self::Running, Self::ShuttingDown)
        )
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
