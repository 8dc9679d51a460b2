//! The transport seam between operations and the network.
//!
//! Operations only see [`Transport::send`]: one request in, one response or
//! [`TransportError`] out. Timeouts, TLS and connection pooling belong to the
//! implementation; [`ReqwestTransport`] is the default one.

mod http;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};

use crate::error::TransportError;
use crate::request::Request;

pub use http::{ReqwestTransport, ReqwestTransportBuilder};

/// Sends one request and returns the raw response.
pub trait Transport: Send + Sync {
    /// Performs exactly one round trip.
    ///
    /// `timeout` bounds the whole round trip when set.
    fn send(
        &self,
        request: Request,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<Response, TransportError>> + Send;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(
        &self,
        request: Request,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<Response, TransportError>> + Send {
        (**self).send(request, timeout)
    }
}

/// A raw HTTP response, consumed once by the decoder.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// A response with a JSON body and matching `Content-Type`.
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self::new(status, body.to_string()).with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// The raw `Content-Type` header, if present and readable.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE)?.to_str().ok()
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_response_sets_content_type() {
        let response = Response::json(200, &serde_json::json!({"version": "1.2.3"}));
        assert_eq!(response.content_type(), Some("application/json"));
        assert_eq!(response.body.as_ref(), br#"{"version":"1.2.3"}"#);
        assert!(response.is_success());
    }

    #[test]
    fn status_classes() {
        assert!(Response::new(204, "").is_success());
        assert!(!Response::new(503, "{}").is_success());
        assert_eq!(Response::new(503, "{}").content_type(), None);
    }
}
