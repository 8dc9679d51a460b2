//! Tether
//!
//! A schema-driven REST client runtime. Endpoints are described once with
//! [`tether_define`]; this crate turns those descriptions into requests,
//! sends them and decodes the responses:
//!
//! - [`codec`] - typed values to and from JSON, form, multipart, text,
//!   octet-stream and YAML bodies
//! - [`request`] - argument checking, validation and request construction
//! - [`transport`] - the [`Transport`] seam and the reqwest-backed default
//! - [`response`] - status lookup, body decoding and error mapping
//! - [`Operation`] - one endpoint bound to a [`Client`]
//! - [`Facade`] - a named group of operations
//!
//! Every call performs exactly one round trip. Arguments are checked before
//! anything is sent, and server error statuses come back as a typed
//! [`ApiError`] rather than a generic HTTP failure.
//!
//! ## Examples
//!
//! ```rust,ignore
//! use tether::{Arguments, Client, ClientConfig, StaticCredentials};
//!
//! let client = Client::new(ClientConfig::new("http://localhost:8000/api/v1")?)?
//!     .with_auth(StaticCredentials::basic(access_key_id, secret_access_key));
//!
//! let version = client.operation(&endpoint).call(Arguments::new()).await?;
//! ```

pub mod auth;
pub mod client;
pub mod codec;
pub mod error;
pub mod facade;
pub mod operation;
pub mod request;
pub mod response;
pub mod transport;

pub use auth::{AuthProvider, Credential, EnvCredentials, StaticCredentials};
pub use client::{Client, ClientConfig, ClientConfigBuilder, ContentPreferences, DEFAULT_TIMEOUT_SECS};
pub use codec::{EncodedBody, deserialize, from_model, from_model_unchecked, serialize, to_model};
pub use error::{
    ApiError, AuthError, CodecError, ConfigError, DecodeError, ErrorPayload, RequestError,
    TetherError, TransportError,
};
pub use facade::Facade;
pub use operation::Operation;
pub use request::{Arguments, Request};
pub use response::Outcome;
pub use transport::{ReqwestTransport, ReqwestTransportBuilder, Response, Transport};

pub use tether_define;
