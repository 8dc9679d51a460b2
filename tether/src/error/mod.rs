//! Layered error types for the runtime.
//!
//! - [`TetherError`] - top-level error returned by operations and façades
//! - [`RequestError`] - argument and request construction failures (before any I/O)
//! - [`CodecError`] - body serialization and deserialization failures
//! - [`TransportError`] - connection, timeout, TLS and protocol failures
//! - [`ApiError`] - a server error response, with its payload decoded when possible
//! - [`DecodeError`] - a success response whose body does not match its declaration
//! - [`AuthError`] - credential lookup failures
//! - [`ConfigError`] - client and definition configuration errors

mod api_error;
mod auth_error;
mod codec_error;
mod config_error;
mod decode_error;
mod request_error;
mod tether_error;
mod transport_error;

pub use api_error::{ApiError, ErrorPayload};
pub use auth_error::AuthError;
pub use codec_error::CodecError;
pub use config_error::ConfigError;
pub use decode_error::DecodeError;
pub use request_error::RequestError;
pub use tether_error::TetherError;
pub use transport_error::TransportError;

use tether_define::ValidationError;

/// Joins violations into one line for error messages.
pub(crate) fn join_violations(violations: &[ValidationError]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
