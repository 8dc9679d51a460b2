//! Turns call arguments into a [`Request`].
//!
//! Every check happens before anything is encoded: missing and unknown
//! arguments first, then content negotiation, then schema validation of all
//! supplied values at once.

use std::collections::BTreeMap;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::header::{ACCEPT, CONTENT_TYPE, COOKIE, HeaderName, HeaderValue, USER_AGENT};
use tracing::debug;

use tether_define::{
    EndpointDescriptor, FieldPath, ParamLocation, Parameter, Schema, SchemaKind, TypedValue,
    validate_at,
};

use super::{Arguments, Request};
use crate::auth::Credential;
use crate::client::ClientConfig;
use crate::codec::{self, json};
use crate::error::RequestError;

/// Characters escaped in a substituted path segment. `/` is escaped so a
/// value can never add segments.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'|')
    .add(b'\\')
    .add(b'^')
    .add(b'[')
    .add(b']');

/// Characters escaped in cookie values.
const COOKIE_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b',')
    .add(b';')
    .add(b'\\')
    .add(b'%');

const ARRAY_SEPARATOR: &str = ",";

/// Builds the request for one call to `endpoint`.
///
/// `credentials` come from the auth provider and are placed after the
/// declared parameters.
///
/// ## Errors
///
/// - [`RequestError::MissingRequiredParameter`] / [`RequestError::MissingRequestBody`]
///   before any validation or encoding
/// - [`RequestError::UnknownParameter`] / [`RequestError::UnexpectedRequestBody`]
///   for arguments the endpoint does not declare
/// - [`RequestError::NoCompatibleContentType`] when the endpoint and the
///   client share no request media type
/// - [`RequestError::SchemaValidationFailed`] with every violation found
pub fn build(
    endpoint: &EndpointDescriptor,
    args: &Arguments,
    config: &ClientConfig,
    credentials: &[Credential],
) -> Result<Request, RequestError> {
    check_presence(endpoint, args)?;
    check_unknown(endpoint, args)?;

    let body = match (endpoint.request_body(), args.body_value()) {
        (Some(declared), Some(value)) if !value.is_null() => {
            let accepted = &config.preferences().request;
            let content = declared
                .content
                .iter()
                .find(|c| accepted.contains(&c.content_type))
                .ok_or_else(|| RequestError::NoCompatibleContentType {
                    declared: declared.content_types().collect(),
                    accepted: accepted.clone(),
                })?;
            Some((value, content))
        }
        _ => None,
    };

    let mut violations = Vec::new();
    for (param, value) in supplied(endpoint, args) {
        violations.extend(validate_at(value, &param.schema, &FieldPath::named(&param.name)));
    }
    if let Some((value, content)) = body {
        violations.extend(validate_at(value, &content.schema, &FieldPath::named("body")));
    }
    if !violations.is_empty() {
        return Err(RequestError::SchemaValidationFailed(violations));
    }

    let mut path_values = BTreeMap::new();
    let mut request_query = Vec::new();
    let mut headers = config.default_headers().clone();
    let mut cookies = Vec::new();

    if !headers.contains_key(USER_AGENT) {
        headers.insert(USER_AGENT, header_value(USER_AGENT.as_str(), config.user_agent())?);
    }

    for (param, value) in supplied(endpoint, args) {
        let rendered = render(param, value)?;
        match param.location {
            ParamLocation::Path => {
                let joined = rendered.join(param.style.delimiter().unwrap_or(ARRAY_SEPARATOR));
                path_values.insert(
                    param.name.clone(),
                    utf8_percent_encode(&joined, PATH_SEGMENT).to_string(),
                );
            }
            ParamLocation::Query => match param.style.delimiter() {
                None => request_query.extend(rendered.into_iter().map(|item| (param.name.clone(), item))),
                Some(delimiter) => request_query.push((param.name.clone(), rendered.join(delimiter))),
            },
            ParamLocation::Header => {
                let name = header_name(&param.name)?;
                let joined = rendered.join(ARRAY_SEPARATOR);
                headers.insert(name, header_value(&param.name, &joined)?);
            }
            ParamLocation::Cookie => {
                let joined = rendered.join(ARRAY_SEPARATOR);
                cookies.push(format!(
                    "{}={}",
                    param.name,
                    utf8_percent_encode(&joined, COOKIE_VALUE)
                ));
            }
        }
    }

    for credential in credentials {
        match credential {
            Credential::Header { name, value } => {
                headers.insert(header_name(name)?, header_value(name, value)?);
            }
            Credential::Query { name, value } => request_query.push((name.clone(), value.clone())),
            Credential::Cookie { name, value } => {
                cookies.push(format!("{name}={}", utf8_percent_encode(value, COOKIE_VALUE)));
            }
        }
    }
    if !cookies.is_empty() {
        headers.insert(COOKIE, header_value(COOKIE.as_str(), &cookies.join("; "))?);
    }

    let path = endpoint.path().render(&path_values).ok_or_else(|| {
        let missing = endpoint
            .path()
            .params()
            .find(|name| !path_values.contains_key(*name))
            .unwrap_or_default();
        RequestError::MissingRequiredParameter {
            name: missing.to_string(),
            location: ParamLocation::Path,
        }
    })?;

    let encoded = match body {
        Some((value, content)) => {
            let encoded = codec::encode(value, &content.schema, content.content_type)?;
            headers.insert(
                CONTENT_TYPE,
                header_value(CONTENT_TYPE.as_str(), &encoded.media_type.to_string())?,
            );
            Some(encoded)
        }
        None => None,
    };

    let accept: Vec<&str> = endpoint
        .accepts()
        .into_iter()
        .filter(|ct| config.preferences().accept.contains(ct))
        .map(|ct| ct.mime())
        .collect();
    if !accept.is_empty() && !headers.contains_key(ACCEPT) {
        headers.insert(ACCEPT, header_value(ACCEPT.as_str(), &accept.join(", "))?);
    }

    let request = Request {
        method: endpoint.method(),
        path,
        query: request_query,
        headers,
        body: encoded,
    };
    debug!(
        operation = %endpoint.id(),
        method = %request.method,
        path = %request.path_and_query(),
        body_bytes = request.body.as_ref().map_or(0, |b| b.len()),
        "built request"
    );
    Ok(request)
}

/// Declared parameters with a non-null argument, in declaration order.
fn supplied<'a>(
    endpoint: &'a EndpointDescriptor,
    args: &'a Arguments,
) -> impl Iterator<Item = (&'a Parameter, &'a TypedValue)> {
    endpoint.parameters().iter().filter_map(|param| {
        args.get(param.location, &param.name)
            .filter(|v| !v.is_null())
            .map(|v| (param, v))
    })
}

fn check_presence(endpoint: &EndpointDescriptor, args: &Arguments) -> Result<(), RequestError> {
    for param in endpoint.parameters() {
        let present = args
            .get(param.location, &param.name)
            .is_some_and(|v| !v.is_null());
        if param.required && !present {
            return Err(RequestError::MissingRequiredParameter {
                name: param.name.clone(),
                location: param.location,
            });
        }
    }
    let body = args.body_value().filter(|v| !v.is_null());
    match (endpoint.request_body(), body) {
        (Some(declared), None) if declared.required => Err(RequestError::MissingRequestBody),
        (None, Some(_)) => Err(RequestError::UnexpectedRequestBody),
        _ => Ok(()),
    }
}

fn check_unknown(endpoint: &EndpointDescriptor, args: &Arguments) -> Result<(), RequestError> {
    for location in [
        ParamLocation::Path,
        ParamLocation::Query,
        ParamLocation::Header,
        ParamLocation::Cookie,
    ] {
        if let Some(name) = args
            .names(location)
            .find(|name| endpoint.parameter(name, location).is_none())
        {
            return Err(RequestError::UnknownParameter {
                name: name.to_string(),
                location,
            });
        }
    }
    Ok(())
}

/// Renders a parameter value as text items; arrays yield one item per element.
fn render(param: &Parameter, value: &TypedValue) -> Result<Vec<String>, RequestError> {
    let item_schema = match &param.schema.kind {
        SchemaKind::Array(items) => items.as_ref(),
        _ => &param.schema,
    };
    match value {
        TypedValue::Array(items) => items
            .iter()
            .map(|item| render_one(param, item, item_schema))
            .collect(),
        other => Ok(vec![render_one(param, other, &param.schema)?]),
    }
}

fn render_one(
    param: &Parameter,
    value: &TypedValue,
    schema: &Schema,
) -> Result<String, RequestError> {
    let unsupported = || RequestError::UnsupportedParameterValue {
        name: param.name.clone(),
        location: param.location,
    };
    match value {
        TypedValue::Bytes(_) => Err(unsupported()),
        other => match other.to_plain_string() {
            Some(text) => Ok(text),
            None => json::encode(other, schema)
                .map(|v| v.to_string())
                .map_err(|_| unsupported()),
        },
    }
}

fn header_name(name: &str) -> Result<HeaderName, RequestError> {
    HeaderName::try_from(name).map_err(|e| RequestError::InvalidHeader {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, RequestError> {
    HeaderValue::try_from(value).map_err(|e| RequestError::InvalidHeader {
        name: name.to_string(),
        reason: e.to_string(),
    })
}
