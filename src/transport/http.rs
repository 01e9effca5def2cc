//! HTTP push transport backed by `reqwest`.

use async_trait::async_trait;
use serde::Serialize;

use super::{PushTransport, TransportConfig, TransportError};
use crate::error::DispatchError;

/// JSON body posted for every triggered event.
#[derive(Debug, Serialize)]
struct TriggerBody<'a> {
    name: &'a str,
    channel: &'a str,
    data: String,
}

/// Posts events to `{endpoint}/apps/{app_id}/events`.
///
/// Authenticates with HTTP basic auth using the configured key and secret.
/// The underlying `reqwest::Client` pools connections and is shared by every
/// client handle.
#[derive(Debug, Clone)]
pub struct HttpPushTransport {
    client: reqwest::Client,
    events_url: String,
    key: String,
    secret: String,
}

impl HttpPushTransport {
    /// Builds a transport from a validated config.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidTransportConfig`] if the config fails
    /// validation or the HTTP client cannot be built.
    pub fn new(config: &TransportConfig) -> Result<Self, DispatchError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| DispatchError::InvalidTransportConfig(e.to_string()))?;

        Ok(Self {
            client,
            events_url: config.events_url(),
            key: config.key.clone(),
            secret: config.secret.clone(),
        })
    }

    /// URL this transport posts to.
    #[must_use]
    pub fn events_url(&self) -> &str {
        &self.events_url
    }
}

#[async_trait]
impl PushTransport for HttpPushTransport {
    async fn trigger(
        &self,
        channel: &str,
        event: &str,
        data: &[u8],
    ) -> Result<(), TransportError> {
        let body = TriggerBody {
            name: event,
            channel,
            data: String::from_utf8_lossy(data).into_owned(),
        };

        let response = self
            .client
            .post(&self.events_url)
            .basic_auth(&self.key, Some(&self.secret))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Rejected {
                status: status.as_u16(),
            });
        }

        tracing::trace!(channel, event, "push event accepted");
        Ok(())
    }
}
