//! Type-safe client identifier.
//!
//! [`ClientId`] is a newtype wrapper around an opaque string so that client
//! identifiers cannot be confused with event names or channel names.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;

/// Identifier of an addressable remote client.
///
/// Opaque to the registry: it is only compared and hashed. Used as the key
/// in [`super::ClientDirectory`] and as the target of every
/// [`super::Message`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClientId(String);

impl ClientId {
    /// Creates a `ClientId` from any string-like value.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidRequest`] if the id is empty or only
    /// whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, DispatchError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DispatchError::InvalidRequest(
                "client id must not be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the id and returns the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ClientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ClientId {
    type Error = DispatchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ClientId> for String {
    fn from(id: ClientId) -> Self {
        id.0
    }
}

impl TryFrom<&str> for ClientId {
    type Error = DispatchError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
