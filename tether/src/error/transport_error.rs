//! Transport-level failures.

use thiserror::Error;

/// Errors from the transport collaborator, propagated unchanged by operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Could not reach the server.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The round trip exceeded its timeout.
    #[error("request timeout after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// TLS handshake or certificate failure.
    #[error("TLS failure: {0}")]
    Tls(String),

    /// Malformed response or other HTTP-level failure.
    #[error("HTTP protocol error: {0}")]
    Protocol(String),
}

impl TransportError {
    /// Returns `true` if repeating the round trip may succeed.
    ///
    /// Operations never retry on their own; this is for external retry policies.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Connection(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_and_connection_are_retryable() {
        assert!(TransportError::Timeout { duration_ms: 5000 }.is_retryable());
        assert!(TransportError::Connection("connection refused".into()).is_retryable());
        assert!(!TransportError::Tls("unknown issuer".into()).is_retryable());
        assert!(!TransportError::Protocol("bad chunk".into()).is_retryable());
    }

    #[test]
    fn timeout_display() {
        let err = TransportError::Timeout { duration_ms: 250 };
        assert_eq!(err.to_string(), "request timeout after 250ms");
    }
}
