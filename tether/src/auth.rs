//! Credential providers.
//!
//! An [`AuthProvider`] is asked for credentials once per call, and only for
//! endpoints that declare security. The request builder places the returned
//! [`Credential`]s as headers, query pairs or cookies.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use tether_define::{ApiKeyLocation, AuthStrategy, EndpointDescriptor};

use crate::error::AuthError;

/// A credential ready to be placed on a request.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Header { name: String, value: String },
    Query { name: String, value: String },
    Cookie { name: String, value: String },
}

impl Credential {
    /// `Authorization: Bearer <token>`
    pub fn bearer(token: impl AsRef<str>) -> Self {
        Self::Header {
            name: "Authorization".to_string(),
            value: format!("Bearer {}", token.as_ref()),
        }
    }

    /// `Authorization: Basic <base64(username:password)>`
    pub fn basic(username: impl AsRef<str>, password: impl AsRef<str>) -> Self {
        let encoded = STANDARD.encode(format!("{}:{}", username.as_ref(), password.as_ref()));
        Self::Header {
            name: "Authorization".to_string(),
            value: format!("Basic {encoded}"),
        }
    }

    /// A raw key in the named header, query parameter or cookie.
    pub fn api_key(location: ApiKeyLocation, name: impl Into<String>, key: impl Into<String>) -> Self {
        let (name, value) = (name.into(), key.into());
        match location {
            ApiKeyLocation::Header => Self::Header { name, value },
            ApiKeyLocation::Query => Self::Query { name, value },
            ApiKeyLocation::Cookie => Self::Cookie { name, value },
        }
    }

    /// Builds the credential a strategy calls for.
    ///
    /// `username` is only consulted for [`AuthStrategy::Basic`].
    pub fn for_strategy(
        strategy: &AuthStrategy,
        secret: &str,
        username: Option<&str>,
    ) -> Result<Option<Self>, AuthError> {
        Ok(match strategy {
            AuthStrategy::None => None,
            AuthStrategy::Bearer => Some(Self::bearer(secret)),
            AuthStrategy::Basic => {
                let username = username.ok_or_else(|| AuthError::InvalidCredential {
                    reason: "basic auth requires a username".to_string(),
                })?;
                if username.contains(':') {
                    return Err(AuthError::InvalidCredential {
                        reason: "basic auth username must not contain ':'".to_string(),
                    });
                }
                Some(Self::basic(username, secret))
            }
            AuthStrategy::ApiKey { location, name } => {
                Some(Self::api_key(*location, name.clone(), secret))
            }
        })
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Header { name, .. } | Self::Query { name, .. } | Self::Cookie { name, .. } => name,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Self::Header { value, .. } | Self::Query { value, .. } | Self::Cookie { value, .. } => {
                value
            }
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Header { .. } => "Header",
            Self::Query { .. } => "Query",
            Self::Cookie { .. } => "Cookie",
        };
        f.debug_struct(kind)
            .field("name", &self.name())
            .field("value", &"<redacted>")
            .finish()
    }
}

/// Supplies credentials for secured calls.
pub trait AuthProvider: Send + Sync + fmt::Debug {
    /// Credentials for one call to `endpoint`.
    fn credentials(&self, endpoint: &EndpointDescriptor) -> Result<Vec<Credential>, AuthError>;
}

/// Fixed credentials, resolved once at construction.
#[derive(Clone)]
pub struct StaticCredentials {
    credentials: Vec<Credential>,
}

impl StaticCredentials {
    pub fn new(credentials: Vec<Credential>) -> Self {
        Self { credentials }
    }

    pub fn bearer(token: impl AsRef<str>) -> Self {
        Self::new(vec![Credential::bearer(token)])
    }

    pub fn basic(username: impl AsRef<str>, password: impl AsRef<str>) -> Self {
        Self::new(vec![Credential::basic(username, password)])
    }
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("count", &self.credentials.len())
            .finish()
    }
}

impl AuthProvider for StaticCredentials {
    fn credentials(&self, _endpoint: &EndpointDescriptor) -> Result<Vec<Credential>, AuthError> {
        Ok(self.credentials.clone())
    }
}

/// Reads the secret (and username, for basic auth) from environment
/// variables on every call.
///
/// Each is an ordered fallback chain; the first variable that is set wins.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    strategy: AuthStrategy,
    secret_vars: Vec<String>,
    username_vars: Vec<String>,
}

impl EnvCredentials {
    pub fn new<I, S>(strategy: AuthStrategy, secret_vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            strategy,
            secret_vars: secret_vars.into_iter().map(Into::into).collect(),
            username_vars: Vec::new(),
        }
    }

    /// Sets the variables holding the basic auth username.
    pub fn username_from<I, S>(mut self, username_vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.username_vars = username_vars.into_iter().map(Into::into).collect();
        self
    }

    pub fn strategy(&self) -> &AuthStrategy {
        &self.strategy
    }

    fn lookup(vars: &[String]) -> Result<String, AuthError> {
        vars.iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
            .ok_or_else(|| AuthError::MissingCredential {
                env_vars: vars.to_vec(),
            })
    }
}

impl AuthProvider for EnvCredentials {
    fn credentials(&self, _endpoint: &EndpointDescriptor) -> Result<Vec<Credential>, AuthError> {
        if !self.strategy.is_authenticated() {
            return Ok(Vec::new());
        }
        let username = match self.strategy {
            AuthStrategy::Basic => Some(Self::lookup(&self.username_vars)?),
            _ => None,
        };
        let secret = Self::lookup(&self.secret_vars)?;
        Ok(Credential::for_strategy(&self.strategy, &secret, username.as_deref())?
            .into_iter()
            .collect())
    }
}
