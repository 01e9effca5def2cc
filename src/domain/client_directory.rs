//! Concurrent client directory.
//!
//! [`ClientDirectory`] maps [`ClientId`]s to shared [`ClientHandle`]s. It is
//! backed by a [`DashMap`], so lookups on different shards never contend and
//! every operation on a single key is linearizable.

use std::sync::Arc;

use dashmap::DashMap;

use super::{ClientHandle, ClientId};

/// Directory of registered clients.
///
/// Lookups clone the `Arc` out of the map, so no shard guard is ever held
/// across an `.await` by the delivering worker.
#[derive(Default)]
pub struct ClientDirectory {
    clients: DashMap<ClientId, Arc<ClientHandle>>,
}

impl ClientDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the handle under its id. Last write wins.
    pub fn register(&self, handle: Arc<ClientHandle>) {
        let id = handle.id().clone();
        if self.clients.insert(id.clone(), handle).is_some() {
            tracing::debug!(client_id = %id, "client handle replaced");
        } else {
            tracing::debug!(client_id = %id, "client registered");
        }
    }

    /// Removes the handle for `id`, returning it if it was present.
    pub fn unregister(&self, id: &ClientId) -> Option<Arc<ClientHandle>> {
        let removed = self.clients.remove(id).map(|(_, handle)| handle);
        if removed.is_some() {
            tracing::debug!(client_id = %id, "client unregistered");
        }
        removed
    }

    /// Returns the handle registered under `id`.
    #[must_use]
    pub fn lookup(&self, id: &ClientId) -> Option<Arc<ClientHandle>> {
        self.clients.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Ids of all registered clients, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<ClientId> {
        let mut ids: Vec<ClientId> = self.clients.iter().map(|r| r.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Number of registered clients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Returns `true` if no client is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

impl std::fmt::Debug for ClientDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientDirectory")
            .field("clients", &self.clients.len())
            .finish()
    }
}
