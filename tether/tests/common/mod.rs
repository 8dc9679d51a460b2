//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tether::{Request, Response, Transport, TransportError};
use tether_define::{
    EndpointDescriptor, ObjectSchema, Parameter, RequestBody, ResponseSpec, RestMethod, Schema,
    StatusKey,
};

/// In-memory transport that replays queued responses and records requests.
#[derive(Debug, Default)]
pub struct StubTransport {
    responses: Mutex<VecDeque<Result<Response, TransportError>>>,
    requests: Mutex<Vec<Request>>,
    calls: AtomicUsize,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, response: Response) -> Self {
        self.push(Ok(response));
        self
    }

    pub fn fail(self, error: TransportError) -> Self {
        self.push(Err(error));
        self
    }

    fn push(&self, outcome: Result<Response, TransportError>) {
        self.responses.lock().unwrap().push_back(outcome);
    }

    /// Number of round trips performed.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<Request> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl Transport for StubTransport {
    async fn send(
        &self,
        request: Request,
        _timeout: Option<Duration>,
    ) -> Result<Response, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Protocol("no response queued".into())))
    }
}

pub fn error_schema() -> Schema {
    Schema::object(
        ObjectSchema::new()
            .field("message", Schema::string())
            .required(["message"]),
    )
}

/// `GET /config/version`, secured.
pub fn version_endpoint() -> EndpointDescriptor {
    EndpointDescriptor::builder()
        .id("getLakeFSVersion")
        .method(RestMethod::Get)
        .path("/config/version")
        .response(ResponseSpec::json(
            200,
            Schema::object(
                ObjectSchema::new()
                    .field("version", Schema::string())
                    .field("upgrade_recommended", Schema::boolean()),
            ),
        ))
        .response(ResponseSpec::json(401, error_schema()))
        .response(ResponseSpec::json(StatusKey::Default, error_schema()))
        .secured()
        .tag("config")
        .build()
        .unwrap()
}

/// `POST /setup_lakefs`, public.
pub fn setup_endpoint() -> EndpointDescriptor {
    let setup = Schema::object(
        ObjectSchema::new()
            .field("username", Schema::string().min_length(1))
            .required(["username"]),
    );
    let credentials = Schema::object(
        ObjectSchema::new()
            .field("access_key_id", Schema::string())
            .field("secret_access_key", Schema::string())
            .field("creation_date", Schema::integer())
            .required(["access_key_id", "secret_access_key", "creation_date"]),
    );
    EndpointDescriptor::builder()
        .id("setup")
        .method(RestMethod::Post)
        .path("/setup_lakefs")
        .body(RequestBody::json(setup))
        .response(ResponseSpec::json(200, credentials))
        .response(ResponseSpec::json(409, error_schema()))
        .tag("config")
        .build()
        .unwrap()
}

/// `GET /repositories/{repository}/objects`, used for parameter checks.
pub fn list_objects_endpoint() -> EndpointDescriptor {
    EndpointDescriptor::builder()
        .id("listObjects")
        .method(RestMethod::Get)
        .path("/repositories/{repository}/objects")
        .parameter(Parameter::path("repository", Schema::string()).required())
        .parameter(Parameter::query("amount", Schema::integer().minimum(1.0)))
        .response(ResponseSpec::json(200, Schema::array(Schema::string())))
        .secured()
        .build()
        .unwrap()
}
