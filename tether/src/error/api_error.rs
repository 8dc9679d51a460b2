//! Server error responses.

use std::fmt;

use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;

use tether_define::TypedValue;

/// Payload of an [`ApiError`].
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorPayload {
    /// The body matched the schema declared for this status.
    Decoded(TypedValue),
    /// No schema was declared for the status, or the body did not match it.
    Undecoded,
}

/// A non-success response from the server.
///
/// Always carries the status and raw body; `payload` holds the decoded body
/// when a response schema for the status exists and the body conforms to it.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub payload: ErrorPayload,
}

impl ApiError {
    pub fn new(status: u16, headers: HeaderMap, body: Bytes, payload: ErrorPayload) -> Self {
        Self {
            status,
            headers,
            body,
            payload,
        }
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }

    pub fn decoded(&self) -> Option<&TypedValue> {
        match &self.payload {
            ErrorPayload::Decoded(value) => Some(value),
            ErrorPayload::Undecoded => None,
        }
    }

    /// The raw body parsed as JSON, if it is JSON.
    pub fn body_json(&self) -> Option<serde_json::Value> {
        serde_json::from_slice(&self.body).ok()
    }

    /// A human-readable message from the payload's `message` field.
    ///
    /// Falls back to the raw body's `message` field when the payload is undecoded.
    pub fn message(&self) -> Option<String> {
        if let Some(message) = self
            .decoded()
            .and_then(TypedValue::as_object)
            .and_then(|o| o.get("message"))
            .and_then(TypedValue::as_str)
        {
            return Some(message.to_string());
        }
        self.body_json()?
            .get("message")?
            .as_str()
            .map(str::to_string)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        match self.message() {
            Some(message) => write!(f, ": {message}"),
            None => match StatusCode::from_u16(self.status)
                .ok()
                .and_then(|s| s.canonical_reason())
            {
                Some(reason) => write!(f, " {reason}"),
                None => Ok(()),
            },
        }
    }
}

impl std::error::Error for ApiError {}
