//! Concurrent event table.
//!
//! Maps event names to shared [`Event`]s. Seeded once at engine construction
//! and extended at runtime by bulk registration; events are never removed.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;

use super::Event;

/// Table of dispatchable events keyed by name.
#[derive(Default)]
pub struct EventTable {
    events: DashMap<String, Arc<Event>>,
}

impl EventTable {
    /// Builds a table from the caller-supplied `name → Event` map.
    #[must_use]
    pub fn new(events: HashMap<String, Event>) -> Self {
        let table = Self::default();
        table.insert_all(events);
        table
    }

    /// Installs every event in `events`, replacing entries with the same name.
    ///
    /// Returns the newly stored events so the caller can start workers for
    /// them.
    pub fn insert_all(&self, events: HashMap<String, Event>) -> Vec<Arc<Event>> {
        let mut installed = Vec::with_capacity(events.len());
        for (name, event) in events {
            if name != event.name() {
                tracing::warn!(
                    key = %name,
                    event = %event.name(),
                    "event registered under a key that differs from its name"
                );
            }
            let event = Arc::new(event);
            if self.events.insert(name.clone(), Arc::clone(&event)).is_some() {
                tracing::info!(event = %name, "event replaced");
            }
            installed.push(event);
        }
        installed
    }

    /// Returns the event registered under `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Arc<Event>> {
        self.events.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Every registered event, sorted by name.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(String, Arc<Event>)> {
        let mut events: Vec<(String, Arc<Event>)> = self
            .events
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect();
        events.sort_by(|a, b| a.0.cmp(&b.0));
        events
    }

    /// Registered event names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.snapshot().into_iter().map(|(name, _)| name).collect()
    }

    /// Number of registered events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if no events are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl std::fmt::Debug for EventTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventTable")
            .field("events", &self.names())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn events(names: &[&str]) -> HashMap<String, Event> {
        names
            .iter()
            .map(|name| ((*name).to_string(), Event::new(*name, 8)))
            .collect()
    }

    #[test]
    fn registered_names_are_found() {
        let table = EventTable::new(events(&["notify", "alert"]));
        assert!(table.lookup("notify").is_some());
        assert!(table.lookup("alert").is_some());
        assert!(table.lookup("missing").is_none());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn insert_all_returns_installed_events() {
        let table = EventTable::new(HashMap::new());
        assert!(table.is_empty());

        let installed = table.insert_all(events(&["late"]));
        assert_eq!(installed.len(), 1);
        assert!(table.lookup("late").is_some());
    }

    #[test]
    fn reinsert_replaces_entry() {
        let table = EventTable::new(events(&["notify"]));
        let before = table.lookup("notify");
        table.insert_all(events(&["notify"]));
        let after = table.lookup("notify");

        let (Some(before), Some(after)) = (before, after) else {
            panic!("event should be registered");
        };
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn names_are_sorted() {
        let table = EventTable::new(events(&["b", "a", "c"]));
        assert_eq!(table.names(), vec!["a", "b", "c"]);
    }
}
