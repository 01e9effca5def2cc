//! The dispatch engine (event registry).
//!
//! [`DispatchEngine`] is the aggregate root of the crate. It owns the
//! [`ClientDirectory`], the [`EventTable`], the shared push transport, one
//! worker task per event and the shutdown token. It is constructed
//! explicitly and shared as `Arc<DispatchEngine>`; there is no global
//! instance.
//!
//! ## Submission flow
//! ```text
//! producer ──► delegate_event(name, message)
//!                 ├─► unknown name      → ack: Failed(UnknownEvent)
//!                 ├─► shutting down     → ack: Failed(ShuttingDown)
//!                 └─► event.enqueue()   → Block: wait for capacity
//!                                         Reject: ack: Failed(QueueFull)
//!              Worker ──► client.send() → ack: Delivered | Failed(..)
//! producer ◄── Acknowledgement::wait()
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::state::EngineState;
use super::worker::{Worker, drain};
use crate::domain::{
    Acknowledgement, ClientDirectory, ClientHandle, ClientId, DispatchOutcome, Event, EventTable,
    FailureReason, Message, QueuePolicy,
};
use crate::error::DispatchError;
use crate::transport::{HttpPushTransport, PushTransport, TransportConfig};

/// Point-in-time view of one registered event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSummary {
    /// Event name.
    pub name: String,
    /// Queue capacity.
    pub capacity: usize,
    /// Messages waiting in the queue.
    pub queued: usize,
    /// Successful deliveries so far.
    pub delivered: u64,
    /// Failed messages so far.
    pub failed: u64,
    /// Whether a worker owns the queue.
    pub has_worker: bool,
}

/// Registry of events and clients plus the workers that connect them.
#[derive(Debug)]
pub struct DispatchEngine {
    clients: Arc<ClientDirectory>,
    events: EventTable,
    transport: Arc<dyn PushTransport>,
    queue_policy: QueuePolicy,
    shutdown: CancellationToken,
    state: Mutex<EngineState>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl DispatchEngine {
    /// Creates an engine that delivers through an [`HttpPushTransport`].
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidTransportConfig`] if the transport
    /// config is invalid. This is the only construction-time check.
    pub fn new(
        transport_config: &TransportConfig,
        events: HashMap<String, Event>,
        queue_policy: QueuePolicy,
    ) -> Result<Self, DispatchError> {
        let transport = HttpPushTransport::new(transport_config)?;
        Ok(Self::with_transport(
            Arc::new(transport),
            events,
            queue_policy,
        ))
    }

    /// Creates an engine around an already-built transport.
    #[must_use]
    pub fn with_transport(
        transport: Arc<dyn PushTransport>,
        events: HashMap<String, Event>,
        queue_policy: QueuePolicy,
    ) -> Self {
        let events = EventTable::new(events);
        tracing::info!(
            events = events.len(),
            policy = ?queue_policy,
            "dispatch engine constructed"
        );
        Self {
            clients: Arc::new(ClientDirectory::new()),
            events,
            transport,
            queue_policy,
            shutdown: CancellationToken::new(),
            state: Mutex::new(EngineState::Constructed),
            workers: Mutex::new(Vec::new()),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> EngineState {
        *self.state.lock()
    }

    /// Overflow policy applied to every event queue.
    #[must_use]
    pub const fn queue_policy(&self) -> QueuePolicy {
        self.queue_policy
    }

    // ── Events ─────────────────────────────────────────────────────────

    /// Installs additional events, replacing any with the same name.
    ///
    /// Safe to call concurrently with dispatch. If the engine is already
    /// running, a worker is started for each new event right away. Returns
    /// the number of workers started.
    pub fn register_events(&self, events: HashMap<String, Event>) -> usize {
        self.events
            .insert_all(events)
            .iter()
            .filter(|event| self.spawn_worker(event))
            .count()
    }

    /// Returns the event registered under `name`.
    #[must_use]
    pub fn get_event(&self, name: &str) -> Option<Arc<Event>> {
        self.events.lookup(name)
    }

    /// Registered event names, sorted.
    #[must_use]
    pub fn event_names(&self) -> Vec<String> {
        self.events.names()
    }

    /// Queue depth and delivery counters of every event, sorted by name.
    #[must_use]
    pub fn event_stats(&self) -> Vec<EventSummary> {
        self.events
            .snapshot()
            .into_iter()
            .map(|(name, event)| EventSummary {
                name,
                capacity: event.capacity(),
                queued: event.queued(),
                delivered: event.stats().delivered(),
                failed: event.stats().failed(),
                has_worker: event.is_claimed(),
            })
            .collect()
    }

    // ── Clients ────────────────────────────────────────────────────────

    /// Attaches the shared transport to `handle` and stores it.
    ///
    /// Replaces any client registered under the same id. Returns the stored
    /// handle.
    pub fn register_client(&self, mut handle: ClientHandle) -> Arc<ClientHandle> {
        handle.attach_transport(Arc::clone(&self.transport));
        let handle = Arc::new(handle);
        self.clients.register(Arc::clone(&handle));
        handle
    }

    /// Removes the client registered under `id`. A missing id is a no-op.
    pub fn unregister_client(&self, id: &ClientId) -> Option<Arc<ClientHandle>> {
        self.clients.unregister(id)
    }

    /// Returns the client registered under `id`.
    #[must_use]
    pub fn get_client(&self, id: &ClientId) -> Option<Arc<ClientHandle>> {
        self.clients.lookup(id)
    }

    /// Ids of all registered clients, sorted.
    #[must_use]
    pub fn client_ids(&self) -> Vec<ClientId> {
        self.clients.ids()
    }

    /// Number of registered clients.
    #[must_use]
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    // ── Dispatch ───────────────────────────────────────────────────────

    /// Submits `message` to the event called `name`.
    ///
    /// Returns once the message is queued or resolved as failed. Under
    /// [`QueuePolicy::Block`] this waits while the event queue is full. The
    /// outcome is always reported through the message's acknowledgement.
    pub async fn delegate_event(&self, name: &str, message: Message) {
        let Some(event) = self.events.lookup(name) else {
            tracing::warn!(event = name, message_id = %message.id, "event not registered");
            message.reject(FailureReason::UnknownEvent(name.to_string()));
            return;
        };

        if self.shutdown.is_cancelled() || self.state() == EngineState::ShuttingDown {
            tracing::debug!(event = name, message_id = %message.id, "rejected during shutdown");
            event.stats().record_failed();
            message.reject(FailureReason::ShuttingDown);
            return;
        }

        event.enqueue(message, self.queue_policy).await;
    }

    /// Builds a message for `target` and submits it to `name`.
    ///
    /// Returns the acknowledgement the caller must await for the outcome.
    pub async fn dispatch(
        &self,
        name: &str,
        target: ClientId,
        payload: impl Into<Vec<u8>>,
    ) -> Acknowledgement {
        let (message, ack) = Message::new(target, payload);
        self.delegate_event(name, message).await;
        ack
    }

    /// Submits a message and waits for its outcome.
    ///
    /// With `timeout` set, gives up after that long and reports
    /// [`FailureReason::AckTimeout`]; the message may still be delivered
    /// afterwards. With `None`, waits as long as delivery takes. The timeout
    /// covers only the acknowledgement, not a blocked enqueue.
    pub async fn dispatch_and_wait(
        &self,
        name: &str,
        target: ClientId,
        payload: impl Into<Vec<u8>>,
        timeout: Option<Duration>,
    ) -> DispatchOutcome {
        let ack = self.dispatch(name, target, payload).await;
        match timeout {
            Some(limit) => ack.wait_timeout(limit).await,
            None => ack.wait().await,
        }
    }

    // ── Lifecycle ──────────────────────────────────────────────────────

    /// Starts one worker per registered event.
    ///
    /// Must be called from within a Tokio runtime. A second call starts
    /// nothing: each event queue can be claimed by one worker only.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::ShuttingDown`] once shutdown has begun.
    pub fn run(&self) -> Result<usize, DispatchError> {
        {
            let mut state = self.state.lock();
            if !state.can_transition_to(EngineState::Running) {
                if *state == EngineState::ShuttingDown {
                    return Err(DispatchError::ShuttingDown);
                }
                tracing::warn!("dispatch engine is already running");
                return Ok(0);
            }
            *state = EngineState::Running;
        }

        let started = self
            .events
            .snapshot()
            .iter()
            .filter(|(_, event)| self.spawn_worker(event))
            .count();
        tracing::info!(workers = started, "dispatch engine running");
        Ok(started)
    }

    /// Token that triggers shutdown when cancelled.
    ///
    /// Bridge OS signals or other external triggers into it.
    #[must_use]
    pub fn shutdown_signal(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Triggers shutdown.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Waits for the shutdown signal, then stops the engine.
    ///
    /// One-shot and terminal: moves to [`EngineState::ShuttingDown`], fails
    /// messages still queued on events that never got a worker, and joins
    /// every worker (each drains its own queue). Only the first caller does
    /// the teardown; later callers return as soon as the signal fires.
    pub async fn wait_for_shutdown(&self) {
        self.shutdown.cancelled().await;

        {
            let mut state = self.state.lock();
            if !state.can_transition_to(EngineState::ShuttingDown) {
                return;
            }
            *state = EngineState::ShuttingDown;
        }
        tracing::info!("received shutdown signal");

        for (name, event) in self.events.snapshot() {
            if let Some(mut queue) = event.take_receiver() {
                let drained = drain(&mut queue, event.stats());
                if drained > 0 {
                    tracing::info!(event = %name, drained, "failed messages on unclaimed queue");
                }
            }
        }

        let workers = std::mem::take(&mut *self.workers.lock());
        let count = workers.len();
        for result in join_all(workers).await {
            if let Err(e) = result {
                tracing::warn!(error = %e, "worker task ended abnormally");
            }
        }
        tracing::info!(workers = count, "dispatch engine stopped");
    }

    /// Claims `event`'s queue and spawns its worker if the engine is
    /// running. Returns `true` if a worker was started.
    ///
    /// The state lock is held until the handle is stored, so
    /// [`Self::wait_for_shutdown`] either joins the worker or finds the queue
    /// unclaimed. Once shutting down, an unclaimed queue is drained here.
    fn spawn_worker(&self, event: &Event) -> bool {
        let state = self.state.lock();
        match *state {
            EngineState::Constructed => false,
            EngineState::ShuttingDown => {
                if let Some(mut queue) = event.take_receiver() {
                    drain(&mut queue, event.stats());
                }
                false
            }
            EngineState::Running => {
                let Some(queue) = event.take_receiver() else {
                    return false;
                };
                let worker = Worker::new(
                    event.name(),
                    queue,
                    Arc::clone(&self.clients),
                    Arc::clone(event.stats()),
                    self.shutdown.child_token(),
                );
                self.workers.lock().push(tokio::spawn(worker.run()));
                true
            }
        }
    }
}

impl Drop for DispatchEngine {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::transport::InMemoryTransport;

    fn id(raw: &str) -> ClientId {
        let Ok(id) = ClientId::new(raw) else {
            panic!("valid id");
        };
        id
    }

    fn events(names: &[&str], capacity: usize) -> HashMap<String, Event> {
        names
            .iter()
            .map(|name| ((*name).to_string(), Event::new(*name, capacity)))
            .collect()
    }

    fn engine(names: &[&str]) -> (DispatchEngine, Arc<InMemoryTransport>) {
        let transport = Arc::new(InMemoryTransport::new());
        let engine = DispatchEngine::with_transport(
            Arc::clone(&transport) as Arc<dyn PushTransport>,
            events(names, 16),
            QueuePolicy::Block,
        );
        (engine, transport)
    }

    #[test]
    fn invalid_transport_config_fails_construction() {
        let config = TransportConfig::new("app", "key", "", "eu");
        let result = DispatchEngine::new(&config, HashMap::new(), QueuePolicy::Block);
        assert!(matches!(
            result,
            Err(DispatchError::InvalidTransportConfig(_))
        ));
    }

    #[test]
    fn register_client_attaches_transport() {
        let (engine, _transport) = engine(&["notify"]);
        let stored = engine.register_client(ClientHandle::new(id("c1")));
        assert!(stored.is_attached());

        let Some(found) = engine.get_client(&id("c1")) else {
            panic!("client registered");
        };
        assert!(Arc::ptr_eq(&stored, &found));

        assert!(engine.unregister_client(&id("c1")).is_some());
        assert!(engine.get_client(&id("c1")).is_none());
        assert!(engine.unregister_client(&id("c1")).is_none());
    }

    #[tokio::test]
    async fn run_starts_one_worker_per_event_once() {
        let (engine, _transport) = engine(&["notify", "alert"]);
        assert_eq!(engine.state(), EngineState::Constructed);

        let Ok(started) = engine.run() else {
            panic!("run should succeed");
        };
        assert_eq!(started, 2);
        assert_eq!(engine.state(), EngineState::Running);
        assert!(matches!(engine.run(), Ok(0)));
        assert!(engine.event_stats().iter().all(|s| s.has_worker));
    }

    #[tokio::test]
    async fn delivered_outcome_is_signalled() {
        let (engine, transport) = engine(&["notify"]);
        engine.register_client(ClientHandle::new(id("c1")));
        assert!(engine.run().is_ok());

        let outcome = engine
            .dispatch_and_wait("notify", id("c1"), "hi", Some(Duration::from_secs(5)))
            .await;
        assert_eq!(outcome, DispatchOutcome::Delivered);
        assert_eq!(transport.delivery_count(), 1);
    }

    #[tokio::test]
    async fn unknown_event_resolves_immediately() {
        let (engine, _transport) = engine(&["notify"]);
        let outcome = engine.dispatch_and_wait("missing", id("c1"), "hi", None).await;
        assert_eq!(
            outcome,
            DispatchOutcome::Failed(FailureReason::UnknownEvent("missing".to_string()))
        );
    }

    #[tokio::test]
    async fn events_registered_while_running_get_workers() {
        let (engine, _transport) = engine(&["notify"]);
        engine.register_client(ClientHandle::new(id("c1")));
        assert!(engine.run().is_ok());

        assert_eq!(engine.register_events(events(&["late"], 4)), 1);
        let outcome = engine
            .dispatch_and_wait("late", id("c1"), "hi", Some(Duration::from_secs(5)))
            .await;
        assert!(outcome.is_delivered());
        assert_eq!(engine.event_names(), vec!["late", "notify"]);
    }

    #[tokio::test]
    async fn events_registered_before_run_wait_for_it() {
        let (engine, _transport) = engine(&[]);
        assert_eq!(engine.register_events(events(&["notify"], 4)), 0);
        assert!(matches!(engine.run(), Ok(1)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_startup_and_shutdown_leaves_no_unjoined_worker() {
        for round in 0..50 {
            let names: Vec<String> = (0..8).map(|i| format!("e{i}")).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let (engine, _transport) = engine(&refs);
            let engine = Arc::new(engine);

            let starter = {
                let engine = Arc::clone(&engine);
                tokio::spawn(async move {
                    let _ = engine.run();
                    engine.register_events(events(&["late"], 4));
                })
            };
            let stopper = {
                let engine = Arc::clone(&engine);
                tokio::spawn(async move {
                    engine.shutdown();
                    engine.wait_for_shutdown().await;
                })
            };
            assert!(starter.await.is_ok());
            assert!(stopper.await.is_ok());

            assert_eq!(engine.state(), EngineState::ShuttingDown);
            assert!(
                engine.workers.lock().is_empty(),
                "round {round}: worker spawned after shutdown was not joined"
            );
            assert!(
                engine.event_stats().iter().all(|s| s.has_worker),
                "round {round}: a queue was left open"
            );
        }
    }

    #[tokio::test]
    async fn registering_after_shutdown_closes_the_queue() {
        let (engine, _transport) = engine(&[]);
        engine.shutdown();
        engine.wait_for_shutdown().await;

        assert_eq!(engine.register_events(events(&["late"], 4)), 0);
        let Some(event) = engine.get_event("late") else {
            panic!("event should be installed");
        };
        assert!(event.is_claimed());
        assert!(engine.workers.lock().is_empty());
    }

    #[tokio::test]
    async fn shutdown_is_terminal() {
        let (engine, _transport) = engine(&["notify"]);
        assert!(engine.run().is_ok());

        engine.shutdown();
        engine.wait_for_shutdown().await;
        assert_eq!(engine.state(), EngineState::ShuttingDown);
        assert!(matches!(engine.run(), Err(DispatchError::ShuttingDown)));

        let outcome = engine.dispatch_and_wait("notify", id("c1"), "hi", None).await;
        assert_eq!(outcome, DispatchOutcome::Failed(FailureReason::ShuttingDown));

        // A second waiter returns immediately instead of re-arming.
        engine.wait_for_shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_without_run_fails_queued_messages() {
        let (engine, _transport) = engine(&["notify"]);
        let ack = engine.dispatch("notify", id("c1"), "hi").await;

        engine.shutdown();
        engine.wait_for_shutdown().await;

        assert_eq!(ack.wait().await, DispatchOutcome::Failed(FailureReason::ShuttingDown));
        let stats = engine.event_stats();
        assert_eq!(stats.first().map(|s| s.failed), Some(1));
    }
}
