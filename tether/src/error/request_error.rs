//! Errors raised while turning call arguments into a request.

use thiserror::Error;

use tether_define::{ContentType, ParamLocation, ValidationError};

use super::CodecError;
use super::join_violations;

/// Argument problems detected before any network I/O.
#[derive(Debug, Error)]
pub enum RequestError {
    /// A required parameter was not supplied.
    #[error("missing required {location} parameter `{name}`")]
    MissingRequiredParameter {
        name: String,
        location: ParamLocation,
    },

    /// The endpoint requires a body and none was supplied.
    #[error("request body is required")]
    MissingRequestBody,

    /// A body was supplied for an endpoint that declares none.
    #[error("endpoint does not accept a request body")]
    UnexpectedRequestBody,

    /// An argument that the endpoint does not declare.
    #[error("unknown {location} parameter `{name}`")]
    UnknownParameter {
        name: String,
        location: ParamLocation,
    },

    /// Supplied values do not conform to their schemas.
    #[error("request validation failed: {}", join_violations(.0))]
    SchemaValidationFailed(Vec<ValidationError>),

    /// No request body media type is supported by both sides.
    #[error("no compatible content type: endpoint declares {declared:?}, client supports {accepted:?}")]
    NoCompatibleContentType {
        declared: Vec<ContentType>,
        accepted: Vec<ContentType>,
    },

    /// A header name or value that HTTP cannot carry.
    #[error("invalid header `{name}`: {reason}")]
    InvalidHeader { name: String, reason: String },

    /// A parameter value that has no text rendering (binary data).
    #[error("{location} parameter `{name}` cannot be rendered as text")]
    UnsupportedParameterValue {
        name: String,
        location: ParamLocation,
    },

    /// The body could not be encoded.
    #[error("failed to encode request body: {0}")]
    Body(#[from] CodecError),
}

impl RequestError {
    /// The violation list of a [`RequestError::SchemaValidationFailed`].
    pub fn violations(&self) -> &[ValidationError] {
        match self {
            Self::SchemaValidationFailed(violations) => violations,
            _ => &[],
        }
    }
}
