//! One API operation bound to a client.

use serde::de::DeserializeOwned;
use tracing::{Span, instrument};

use tether_define::{EndpointDescriptor, TypedValue};

use crate::client::Client;
use crate::codec;
use crate::error::{CodecError, TetherError};
use crate::request::{self, Arguments};
use crate::response::{self, Outcome};
use crate::transport::{ReqwestTransport, Transport};

/// An endpoint descriptor bound to a [`Client`].
///
/// Each call builds a request, performs exactly one round trip and decodes
/// the response. Operations never retry, paginate or cache.
///
/// ## Examples
///
/// ```rust,ignore
/// use tether::{Arguments, Client, ClientConfig};
///
/// let client = Client::new(ClientConfig::new("http://localhost:8000/api/v1")?)?;
/// let version = client.operation(&endpoint).call(Arguments::new()).await?;
/// ```
pub struct Operation<'a, T = ReqwestTransport> {
    endpoint: &'a EndpointDescriptor,
    client: Client<T>,
}

impl<T> Clone for Operation<'_, T> {
    fn clone(&self) -> Self {
        Self {
            endpoint: self.endpoint,
            client: self.client.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Operation<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation")
            .field("id", &self.endpoint.id().as_str())
            .field("method", &self.endpoint.method())
            .field("path", &self.endpoint.path().as_str())
            .finish()
    }
}

impl<'a, T: Transport> Operation<'a, T> {
    pub fn new(endpoint: &'a EndpointDescriptor, client: Client<T>) -> Self {
        Self { endpoint, client }
    }

    pub fn endpoint(&self) -> &'a EndpointDescriptor {
        self.endpoint
    }

    pub fn client(&self) -> &Client<T> {
        &self.client
    }

    /// Calls the operation and returns the decoded body.
    ///
    /// ## Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn call(&self, args: Arguments) -> Result<TypedValue, TetherError> {
        self.execute(args).await.map(|outcome| outcome.value)
    }

    /// Calls the operation and converts the body into a model type.
    ///
    /// The model's serde field names must be the schema's wire names.
    ///
    /// ## Errors
    ///
    /// See [`execute`](Self::execute); additionally [`TetherError::Codec`]
    /// when the decoded value does not fit `R`.
    pub async fn call_as<R: DeserializeOwned>(&self, args: Arguments) -> Result<R, TetherError> {
        let outcome = self.execute(args).await?;
        let schema = self
            .endpoint
            .response_for(outcome.status)
            .and_then(|spec| spec.content.first())
            .map(|content| &content.schema);
        let model = match schema {
            Some(schema) => codec::to_model(&outcome.value, schema)?,
            None => {
                let document = codec::json::encode(&outcome.value, &codec::json::ANY)?;
                serde_json::from_value(document).map_err(CodecError::Model)?
            }
        };
        Ok(model)
    }

    /// Calls the operation and returns status, headers and decoded body.
    ///
    /// ## Errors
    ///
    /// - [`TetherError::Auth`] if credentials cannot be resolved
    /// - [`TetherError::Request`] if the arguments are rejected; nothing is sent
    /// - [`TetherError::Transport`] if the round trip fails
    /// - [`TetherError::Api`] for error statuses
    /// - [`TetherError::Decode`] if a declared success body does not match
    #[instrument(
        name = "api_request",
        skip(self, args),
        fields(
            operation.id = %self.endpoint.id(),
            http.method = tracing::field::Empty,
            http.url = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
            otel.kind = "client",
            otel.status_code = tracing::field::Empty,
        )
    )]
    pub async fn execute(&self, args: Arguments) -> Result<Outcome, TetherError> {
        let span = Span::current();
        span.record("http.method", self.endpoint.method().to_string().as_str());

        let credentials = match (self.endpoint.is_secured(), self.client.auth()) {
            (true, Some(provider)) => provider.credentials(self.endpoint)?,
            _ => Vec::new(),
        };
        let request = request::build(self.endpoint, &args, self.client.config(), &credentials)?;
        span.record(
            "http.url",
            self.client.config().url_for(&request.path_and_query()).as_str(),
        );

        let response = match self
            .client
            .transport()
            .send(request, self.client.config().timeout())
            .await
        {
            Ok(response) => response,
            Err(err) => {
                span.record("otel.status_code", "ERROR");
                return Err(err.into());
            }
        };
        span.record("http.status_code", response.status);

        let otel_status = match response.status {
            200..=399 => "OK",
            500.. => "ERROR",
            _ => "UNSET",
        };
        span.record("otel.status_code", otel_status);

        response::decode(response, self.endpoint)
    }
}
