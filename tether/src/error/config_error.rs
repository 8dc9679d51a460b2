//! Client and definition configuration errors.

use thiserror::Error;

use tether_define::DefinitionError;

/// Errors in client setup, typically programmer or deployment mistakes.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A URL such as `mailto:` that cannot carry a path.
    #[error("`{url}` cannot be used as a base URL")]
    NotABaseUrl { url: String },

    #[error("missing required configuration: {field}")]
    MissingField { field: &'static str },

    /// An endpoint table or descriptor that breaks construction rules.
    #[error("invalid API definition: {0}")]
    Definition(#[from] DefinitionError),

    /// A façade was asked for an operation its table does not contain.
    #[error("unknown operation `{id}`")]
    UnknownOperation { id: String },

    #[error("invalid default header `{name}`: {reason}")]
    InvalidHeader { name: String, reason: String },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}
