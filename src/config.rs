//! Service configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Optional values fall back to their
//! defaults when missing or unparsable; a bad listen address, transport kind,
//! queue policy or out-of-range queue capacity is an error.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::{DEFAULT_QUEUE_CAPACITY, Event, MAX_QUEUE_CAPACITY, QueuePolicy};
use crate::error::DispatchError;
use crate::transport::TransportConfig;

/// Which push transport the binary wires into the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransportKind {
    /// Deliver through the remote push service over HTTP.
    #[default]
    Http,
    /// Record deliveries in memory (dry run).
    Memory,
}

impl FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown transport {other:?} (expected http or memory)")),
        }
    }
}

/// Top-level service configuration.
///
/// Loaded once at startup via [`DispatchConfig::from_env`].
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Credentials and endpoint of the push service.
    pub transport: TransportConfig,

    /// Transport implementation to use.
    pub transport_kind: TransportKind,

    /// Events registered at startup.
    pub event_names: Vec<String>,

    /// Queue capacity of each event.
    pub event_queue_capacity: usize,

    /// Behaviour when an event queue is full.
    pub queue_policy: QueuePolicy,

    /// How long the REST layer waits for an acknowledgement. `None` waits
    /// until the message resolves.
    pub ack_timeout: Option<Duration>,
}

impl DispatchConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidConfig`] if `LISTEN_ADDR`,
    /// `PUSH_TRANSPORT` or `EVENT_QUEUE_POLICY` is set but invalid, or if
    /// `EVENT_QUEUE_CAPACITY` is outside `1..=MAX_QUEUE_CAPACITY`.
    pub fn from_env() -> Result<Self, DispatchError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// Same as [`DispatchConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DispatchError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let listen_addr: SocketAddr = lookup("LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".to_string())
            .parse()
            .map_err(|e| DispatchError::InvalidConfig(format!("LISTEN_ADDR: {e}")))?;

        let mut transport = TransportConfig::new(
            lookup("PUSH_APP_ID").unwrap_or_default(),
            lookup("PUSH_KEY").unwrap_or_default(),
            lookup("PUSH_SECRET").unwrap_or_default(),
            lookup("PUSH_CLUSTER").unwrap_or_else(|| "mt1".to_string()),
        );
        transport.endpoint = lookup("PUSH_ENDPOINT").filter(|v| !v.trim().is_empty());
        transport.request_timeout =
            Duration::from_secs(parse_env(&lookup, "PUSH_REQUEST_TIMEOUT_SECS", 10));

        let transport_kind = parse_required(&lookup, "PUSH_TRANSPORT")?.unwrap_or_default();
        let queue_policy = parse_required(&lookup, "EVENT_QUEUE_POLICY")?.unwrap_or_default();

        let event_names = lookup("DISPATCH_EVENTS")
            .map(|raw| parse_event_names(&raw))
            .unwrap_or_else(|| vec!["notify".to_string()]);
        let event_queue_capacity = parse_env(&lookup, "EVENT_QUEUE_CAPACITY", DEFAULT_QUEUE_CAPACITY);
        if event_queue_capacity == 0 || event_queue_capacity > MAX_QUEUE_CAPACITY {
            return Err(DispatchError::InvalidConfig(format!(
                "EVENT_QUEUE_CAPACITY: must be between 1 and {MAX_QUEUE_CAPACITY}"
            )));
        }

        let ack_timeout_ms: u64 = parse_env(&lookup, "ACK_TIMEOUT_MS", 5000);
        let ack_timeout = (ack_timeout_ms > 0).then_some(Duration::from_millis(ack_timeout_ms));

        Ok(Self {
            listen_addr,
            transport,
            transport_kind,
            event_names,
            event_queue_capacity,
            queue_policy,
            ack_timeout,
        })
    }

    /// Builds the startup `name → Event` map from the configured names.
    #[must_use]
    pub fn build_events(&self) -> HashMap<String, Event> {
        self.event_names
            .iter()
            .map(|name| (name.clone(), Event::new(name.as_str(), self.event_queue_capacity)))
            .collect()
    }
}

/// Splits a comma-separated list, dropping blanks and duplicates.
fn parse_event_names(raw: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        if !names.iter().any(|existing| existing == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Parses a variable as `T`, returning `default` on missing or invalid
/// values.
fn parse_env<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Parses a variable whose invalid value is an error. Missing is `None`.
fn parse_required<T, F>(lookup: &F, key: &str) -> Result<Option<T>, DispatchError>
where
    T: FromStr<Err = String>,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.parse().map_err(|e| DispatchError::InvalidConfig(format!("{key}: {e}"))))
        .transpose()
}
