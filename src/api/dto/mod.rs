//! Data Transfer Objects for REST request/response serialization.
//!
//! Client ids travel as plain strings and are validated into
//! [`crate::domain::ClientId`] by the handlers.

pub mod client_dto;
pub mod event_dto;

pub use client_dto::*;
pub use event_dto::*;
