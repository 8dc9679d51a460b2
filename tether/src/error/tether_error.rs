//! Top-level runtime error type.

use thiserror::Error;

use super::{
    ApiError, AuthError, CodecError, ConfigError, DecodeError, RequestError, TransportError,
};

/// Every way an operation call can fail.
///
/// ## Examples
///
/// ```rust,ignore
/// use tether::TetherError;
///
/// match api.get_lake_fs_version().await {
///     Ok(version) => println!("{version:?}"),
///     Err(TetherError::Api(e)) if e.status == 401 => eprintln!("not authorized"),
///     Err(TetherError::Transport(e)) if e.is_retryable() => eprintln!("try again: {e}"),
///     Err(e) => eprintln!("{e}"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum TetherError {
    /// Arguments rejected before any I/O.
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with an error status.
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Converting a decoded value into a model type failed.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl TetherError {
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }

    /// Returns `true` for transport failures and server statuses worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_retryable(),
            Self::Api(e) => e.is_server_error() || e.status == 429,
            _ => false,
        }
    }

    /// Whether the failure happened before anything was sent.
    pub fn is_pre_flight(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Auth(_) | Self::Config(_))
    }
}
