//! Errors decoding a declared success response.

use thiserror::Error;

use tether_define::ContentType;

use super::CodecError;

/// A success response whose body does not match the endpoint's declaration.
///
/// Error-range responses never produce this: their payload degrades to
/// [`ErrorPayload::Undecoded`](super::ErrorPayload::Undecoded) instead.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("status {status}: content type `{actual}` is not declared (expected one of {declared:?})")]
    UnexpectedContentType {
        status: u16,
        actual: String,
        declared: Vec<ContentType>,
    },

    #[error("status {status}: response body is empty")]
    EmptyBody { status: u16 },

    #[error("status {status}: {source}")]
    Body {
        status: u16,
        #[source]
        source: CodecError,
    },
}

impl DecodeError {
    pub fn status(&self) -> u16 {
        match self {
            Self::UnexpectedContentType { status, .. }
            | Self::EmptyBody { status }
            | Self::Body { status, .. } => *status,
        }
    }
}
