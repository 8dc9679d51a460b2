//! Authentication strategies for secured operations.
//!
//! An [`AuthStrategy`] only says how a credential is placed on the request.
//! Where the secret comes from (static value, environment) is decided by the
//! runtime's credential provider.

use serde::{Deserialize, Serialize};

/// Where an API key travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ApiKeyLocation {
    Header,
    Query,
    Cookie,
}

/// Authentication strategy for an API.
///
/// ## Examples
///
/// ```
/// use tether_define::{ApiKeyLocation, AuthStrategy};
///
/// let basic = AuthStrategy::Basic;
/// assert!(basic.is_authenticated());
///
/// let key = AuthStrategy::ApiKey {
///     location: ApiKeyLocation::Cookie,
///     name: "internal_auth_session".to_string(),
/// };
/// assert_eq!(key.name(), Some("internal_auth_session"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthStrategy {
    /// No authentication.
    #[default]
    None,

    /// `Authorization: Bearer <token>`
    Bearer,

    /// `Authorization: Basic <base64(username:password)>`
    Basic,

    /// A raw key in a named header, query parameter or cookie.
    ApiKey {
        location: ApiKeyLocation,
        name: String,
    },
}

impl AuthStrategy {
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Header, query or cookie name for [`AuthStrategy::ApiKey`].
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::ApiKey { name, .. } => Some(name),
            _ => None,
        }
    }
}
