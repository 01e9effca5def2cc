//! Connection settings for the push transport.

use std::time::Duration;

use crate::error::DispatchError;

/// Credentials and endpoint of the remote push service.
#[derive(Clone)]
pub struct TransportConfig {
    /// Application id assigned by the push service.
    pub app_id: String,
    /// Public key.
    pub key: String,
    /// Shared secret.
    pub secret: String,
    /// Cluster (region) name, used to derive the default endpoint.
    pub cluster: String,
    /// Explicit base URL; overrides the cluster-derived default.
    pub endpoint: Option<String>,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl TransportConfig {
    /// Creates a config with the default endpoint and a 10 second timeout.
    #[must_use]
    pub fn new(
        app_id: impl Into<String>,
        key: impl Into<String>,
        secret: impl Into<String>,
        cluster: impl Into<String>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            key: key.into(),
            secret: secret.into(),
            cluster: cluster.into(),
            endpoint: None,
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Checks that every credential is present and the endpoint is usable.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidTransportConfig`] naming the first
    /// offending field.
    pub fn validate(&self) -> Result<(), DispatchError> {
        let required = [
            ("app_id", &self.app_id),
            ("key", &self.key),
            ("secret", &self.secret),
            ("cluster", &self.cluster),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(DispatchError::InvalidTransportConfig(format!(
                    "{field} must not be empty"
                )));
            }
        }

        if let Some(endpoint) = &self.endpoint
            && !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(DispatchError::InvalidTransportConfig(format!(
                "endpoint must be an http(s) URL, got {endpoint:?}"
            )));
        }

        if self.request_timeout.is_zero() {
            return Err(DispatchError::InvalidTransportConfig(
                "request timeout must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Base URL of the push service, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://api-{}.pusher.com", self.cluster),
        }
    }

    /// URL that events for this application are posted to.
    #[must_use]
    pub fn events_url(&self) -> String {
        format!("{}/apps/{}/events", self.base_url(), self.app_id)
    }
}

impl std::fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportConfig")
            .field("app_id", &self.app_id)
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .field("cluster", &self.cluster)
            .field("endpoint", &self.endpoint)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
