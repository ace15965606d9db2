//! Discriminated success/failure envelope shared by the backend and clients.
//!
//! On the wire every response is either `{"success": true, "data": ...}` or
//! `{"success": false, "error": "..."}`. In Rust it is an exhaustive enum.

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Backend response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiResponse<T> {
    /// `success: true` with its payload.
    Success(T),
    /// `success: false` with the backend's message, if it sent one.
    Failure(Option<String>),
}

impl<T> ApiResponse<T> {
    /// Build a failure envelope carrying `message`.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(Some(message.into()))
    }

    /// Convert into a `Result`, substituting `fallback` when a failure carried
    /// no message.
    ///
    /// # Errors
    /// Returns the failure message (or `fallback`) for [`ApiResponse::Failure`].
    pub fn into_result(self, fallback: &str) -> Result<T, String> {
        match self {
            Self::Success(data) => Ok(data),
            Self::Failure(Some(message)) => Err(message),
            Self::Failure(None) => Err(fallback.to_string()),
        }
    }
}

#[derive(Serialize)]
struct EnvelopeOut<'a, T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

#[derive(Deserialize)]
struct EnvelopeIn<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> Serialize for ApiResponse<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let out = match self {
            Self::Success(data) => EnvelopeOut {
                success: true,
                data: Some(data),
                error: None,
            },
            Self::Failure(message) => EnvelopeOut {
                success: false,
                data: None,
                error: message.as_deref(),
            },
        };
        out.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ApiResponse<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = EnvelopeIn::<T>::deserialize(deserializer)?;
        match (raw.success, raw.data) {
            (true, Some(data)) => Ok(Self::Success(data)),
            (true, None) => Err(de::Error::missing_field("data")),
            (false, _) => Ok(Self::Failure(
                raw.error.filter(|message| !message.trim().is_empty()),
            )),
        }
    }
}
