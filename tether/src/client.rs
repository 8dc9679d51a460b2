//! Client configuration and the shared handle operations are bound to.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use strum::IntoEnumIterator;
use url::Url;

use tether_define::{ContentType, EndpointDescriptor};

use crate::auth::AuthProvider;
use crate::error::ConfigError;
use crate::operation::Operation;
use crate::transport::{ReqwestTransport, Transport};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Media types the caller can produce and consume, in preference order.
///
/// Request bodies use the first type the endpoint declares that appears in
/// `request`. The `Accept` header lists declared response types that appear
/// in `accept`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPreferences {
    pub request: Vec<ContentType>,
    pub accept: Vec<ContentType>,
}

impl Default for ContentPreferences {
    fn default() -> Self {
        Self {
            request: ContentType::iter().collect(),
            accept: ContentType::iter().collect(),
        }
    }
}

impl ContentPreferences {
    /// JSON only, both directions.
    pub fn json_only() -> Self {
        Self {
            request: vec![ContentType::Json],
            accept: vec![ContentType::Json],
        }
    }
}

/// Settings shared by every call made through one [`Client`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: Url,
    timeout: Option<Duration>,
    user_agent: String,
    default_headers: HeaderMap,
    preferences: ContentPreferences,
}

impl ClientConfig {
    pub fn builder(base_url: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder::new(base_url.into())
    }

    /// A configuration with default settings.
    ///
    /// ## Errors
    ///
    /// Returns an error if `base_url` is not an absolute base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ConfigError> {
        Self::builder(base_url).build()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Round-trip timeout handed to the transport; `None` means unbounded.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    pub fn preferences(&self) -> &ContentPreferences {
        &self.preferences
    }

    /// Full URL for a rendered path and query, for logs and spans.
    pub fn url_for(&self, path_and_query: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path_and_query)
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    base_url: String,
    timeout: Option<Duration>,
    user_agent: String,
    headers: Vec<(String, String)>,
    preferences: ContentPreferences,
}

impl ClientConfigBuilder {
    fn new(base_url: String) -> Self {
        Self {
            base_url,
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            user_agent: concat!("tether/", env!("CARGO_PKG_VERSION")).to_string(),
            headers: Vec::new(),
            preferences: ContentPreferences::default(),
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Leaves the round trip unbounded.
    pub fn no_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Adds a header sent with every request.
    ///
    /// Invalid names or values are reported by [`build`](Self::build).
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn preferences(mut self, preferences: ContentPreferences) -> Self {
        self.preferences = preferences;
        self
    }

    /// Builds the [`ClientConfig`].
    ///
    /// ## Errors
    ///
    /// Returns an error if the URL does not parse or cannot be a base, or a
    /// default header is invalid.
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let base_url = Url::parse(&self.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::NotABaseUrl { url: self.base_url });
        }
        let mut default_headers = HeaderMap::new();
        for (name, value) in self.headers {
            let header_name = HeaderName::try_from(name.as_str()).map_err(|e| {
                ConfigError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                }
            })?;
            let header_value = HeaderValue::try_from(value.as_str()).map_err(|e| {
                ConfigError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                }
            })?;
            default_headers.append(header_name, header_value);
        }
        Ok(ClientConfig {
            base_url,
            timeout: self.timeout,
            user_agent: self.user_agent,
            default_headers,
            preferences: self.preferences,
        })
    }
}

/// Configuration, transport and optional credentials shared by operations.
///
/// Cloning is cheap; clones share the transport (and its connection pool).
/// No other state is shared between calls.
pub struct Client<T = ReqwestTransport> {
    config: Arc<ClientConfig>,
    transport: Arc<T>,
    auth: Option<Arc<dyn AuthProvider>>,
}

impl<T> Clone for Client<T> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            transport: Arc::clone(&self.transport),
            auth: self.auth.clone(),
        }
    }
}

impl<T> fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.config.base_url.as_str())
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}

impl Client<ReqwestTransport> {
    /// A client sending through a [`ReqwestTransport`] for the configured base URL.
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let transport = ReqwestTransport::builder(config.base_url.clone())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            config: Arc::new(config),
            transport: Arc::new(transport),
            auth: None,
        }
    }

    /// Sets the provider consulted for secured endpoints.
    pub fn with_auth(mut self, provider: impl AuthProvider + 'static) -> Self {
        self.auth = Some(Arc::new(provider));
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn auth(&self) -> Option<&dyn AuthProvider> {
        self.auth.as_deref()
    }

    /// Binds `endpoint` to this client.
    pub fn operation<'a>(&self, endpoint: &'a EndpointDescriptor) -> Operation<'a, T> {
        Operation::new(endpoint, self.clone())
    }
}
