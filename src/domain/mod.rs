//! Domain layer: client identity, client directory, events and messages.
//!
//! This module contains the data model of the dispatch registry: who can
//! receive deliveries ([`ClientHandle`] in a [`ClientDirectory`]), which
//! named channels exist ([`Event`] in an [`EventTable`]), and what flows
//! through them ([`Message`] with its [`Acknowledgement`]).

pub mod client;
pub mod client_directory;
pub mod client_id;
pub mod event;
pub mod event_table;
pub mod message;
pub mod outcome;

pub use client::ClientHandle;
pub use client_directory::ClientDirectory;
pub use client_id::ClientId;
pub use event::{DEFAULT_QUEUE_CAPACITY, Event, EventStats, MAX_QUEUE_CAPACITY, QueuePolicy};
pub use event_table::EventTable;
pub use message::{Acknowledgement, Acknowledger, Message};
pub use outcome::{DispatchOutcome, FailureReason};
