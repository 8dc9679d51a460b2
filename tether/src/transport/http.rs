//! The default transport, backed by a pooled `reqwest::Client`.

use std::error::Error as _;
use std::time::Duration;

use reqwest::header::HeaderMap;
use tracing::debug;
use url::Url;

use tether_define::RestMethod;

use super::{Response, Transport};
use crate::error::{ConfigError, TransportError};
use crate::request::Request;

/// Builder for configuring a [`ReqwestTransport`].
#[derive(Debug)]
pub struct ReqwestTransportBuilder {
    base_url: Url,
    connect_timeout: Option<Duration>,
    pool_max_idle_per_host: usize,
    user_agent: Option<String>,
}

impl ReqwestTransportBuilder {
    fn new(base_url: Url) -> Self {
        Self {
            base_url,
            connect_timeout: None,
            pool_max_idle_per_host: 10,
            user_agent: None,
        }
    }

    /// Bounds connection establishment separately from the per-call timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Builds the [`ReqwestTransport`].
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<ReqwestTransport, ConfigError> {
        if self.base_url.cannot_be_a_base() {
            return Err(ConfigError::NotABaseUrl {
                url: self.base_url.to_string(),
            });
        }
        let mut builder = reqwest::Client::builder().pool_max_idle_per_host(self.pool_max_idle_per_host);
        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent);
        }
        let client = builder
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(ReqwestTransport {
            client,
            base_url: self.base_url,
        })
    }
}

/// Sends requests relative to a base URL over one shared connection pool.
///
/// Cloning is cheap and clones share the pool, so every operation built
/// from the same transport reuses its connections.
///
/// ## Examples
///
/// ```no_run
/// use tether::ReqwestTransport;
/// use url::Url;
///
/// let base_url = Url::parse("http://localhost:8000/api/v1").unwrap();
/// let transport = ReqwestTransport::new(base_url).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl ReqwestTransport {
    pub fn builder(base_url: Url) -> ReqwestTransportBuilder {
        ReqwestTransportBuilder::new(base_url)
    }

    /// Creates a transport with default settings.
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: Url) -> Result<Self, ConfigError> {
        Self::builder(base_url).build()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves a request path against the base URL, keeping the base path.
    pub fn url_for(&self, request: &Request) -> Url {
        let mut url = self.base_url.clone();
        let path = format!("{}{}", self.base_url.path().trim_end_matches('/'), request.path);
        url.set_path(&path);
        url.set_query(request.query_string().as_deref());
        url
    }
}

fn to_reqwest(method: RestMethod) -> reqwest::Method {
    match method {
        RestMethod::Get => reqwest::Method::GET,
        RestMethod::Post => reqwest::Method::POST,
        RestMethod::Put => reqwest::Method::PUT,
        RestMethod::Patch => reqwest::Method::PATCH,
        RestMethod::Delete => reqwest::Method::DELETE,
        RestMethod::Head => reqwest::Method::HEAD,
        RestMethod::Options => reqwest::Method::OPTIONS,
    }
}

impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: Request,
        timeout: Option<Duration>,
    ) -> Result<Response, TransportError> {
        let url = self.url_for(&request);
        debug!(method = %request.method, %url, "sending request");

        let mut builder = self
            .client
            .request(to_reqwest(request.method), url)
            .headers(request.headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        // Content-Type is already among the request headers.
        if let Some(body) = request.body {
            builder = builder.body(body.bytes);
        }

        let response = builder.send().await.map_err(|e| map_error(&e, timeout))?;
        let status = response.status().as_u16();
        let headers: HeaderMap = response.headers().clone();
        let body = response.bytes().await.map_err(|e| map_error(&e, timeout))?;
        Ok(Response {
            status,
            headers,
            body,
        })
    }
}

/// Sorts a reqwest failure into connection, timeout, TLS or protocol.
fn map_error(error: &reqwest::Error, timeout: Option<Duration>) -> TransportError {
    let detail = error_chain(error);
    if error.is_timeout() {
        return TransportError::Timeout {
            duration_ms: timeout.map_or(0, |t| t.as_millis() as u64),
        };
    }
    let lowered = detail.to_ascii_lowercase();
    if ["certificate", "tls", "handshake"]
        .iter()
        .any(|needle| lowered.contains(needle))
    {
        return TransportError::Tls(detail);
    }
    if error.is_connect() {
        return TransportError::Connection(detail);
    }
    TransportError::Protocol(detail)
}

fn error_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
