//! Response decoding and error mapping.
//!
//! The declared response for a status is looked up exact code first, then
//! status range, then `default`. Statuses with no declaration degrade
//! gracefully instead of failing: success becomes an unvalidated opaque value
//! and errors become an [`ApiError`] with an undecoded payload.

use bytes::Bytes;
use reqwest::header::HeaderMap;
use tracing::warn;

use tether_define::{ContentType, EndpointDescriptor, MediaType, ResponseSpec, TypedValue};

use crate::codec;
use crate::error::{ApiError, DecodeError, ErrorPayload, TetherError};
use crate::transport::Response;

/// A decoded success response.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub status: u16,
    pub headers: HeaderMap,
    pub value: TypedValue,
}

/// Decodes `response` according to the responses `endpoint` declares.
///
/// ## Errors
///
/// - [`TetherError::Api`] for every status outside 200-299
/// - [`TetherError::Decode`] when a declared success response does not match
///   its declaration
pub fn decode(response: Response, endpoint: &EndpointDescriptor) -> Result<Outcome, TetherError> {
    let Response {
        status,
        headers,
        body,
    } = response;
    let success = (200..300).contains(&status);
    let declared = endpoint.response_for(status);
    let media_type = headers
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    match (success, declared) {
        (true, Some(spec)) => {
            let value = decode_declared(status, &body, media_type.as_deref(), spec)?;
            Ok(Outcome {
                status,
                headers,
                value,
            })
        }
        (true, None) => {
            warn!(
                operation = %endpoint.id(),
                status,
                "undeclared success status, returning body without validation"
            );
            let value = opaque(&body, media_type.as_deref());
            Ok(Outcome {
                status,
                headers,
                value,
            })
        }
        (false, Some(spec)) => {
            let payload = match decode_declared(status, &body, media_type.as_deref(), spec) {
                Ok(value) if spec.has_body() => ErrorPayload::Decoded(value),
                Ok(_) => ErrorPayload::Undecoded,
                Err(err) => {
                    warn!(
                        operation = %endpoint.id(),
                        status,
                        error = %err,
                        "error payload does not match its declaration"
                    );
                    ErrorPayload::Undecoded
                }
            };
            Err(ApiError::new(status, headers, body, payload).into())
        }
        (false, None) => {
            warn!(operation = %endpoint.id(), status, "undeclared error status");
            Err(ApiError::new(status, headers, body, ErrorPayload::Undecoded).into())
        }
    }
}

fn decode_declared(
    status: u16,
    body: &Bytes,
    content_type: Option<&str>,
    spec: &ResponseSpec,
) -> Result<TypedValue, DecodeError> {
    let declared: Vec<ContentType> = spec.content.iter().map(|c| c.content_type).collect();
    let Some(&first) = declared.first() else {
        return Ok(TypedValue::Null);
    };
    let media_type = match content_type {
        Some(raw) => MediaType::parse(raw).ok_or_else(|| DecodeError::UnexpectedContentType {
            status,
            actual: raw.to_string(),
            declared: declared.clone(),
        })?,
        // Servers omit the header on bodies they consider obvious; assume
        // the first declared type.
        None => MediaType::new(first),
    };
    let content = spec
        .content_for(media_type.content_type)
        .ok_or_else(|| DecodeError::UnexpectedContentType {
            status,
            actual: content_type.unwrap_or_default().to_string(),
            declared,
        })?;
    if body.is_empty() && !content.schema.nullable {
        return Err(DecodeError::EmptyBody { status });
    }
    codec::deserialize(body, &content.schema, &media_type)
        .map_err(|source| DecodeError::Body { status, source })
}

/// Best-effort decoding for undeclared success responses.
fn opaque(body: &Bytes, content_type: Option<&str>) -> TypedValue {
    if body.is_empty() {
        return TypedValue::Null;
    }
    let content_type = content_type
        .and_then(MediaType::parse)
        .map(|m| m.content_type);
    match content_type {
        Some(ContentType::Json) | None => match serde_json::from_slice(body) {
            Ok(document) => TypedValue::Opaque(document),
            Err(_) => text_or_bytes(body),
        },
        Some(ContentType::Yaml) => match serde_yaml::from_slice::<serde_json::Value>(body) {
            Ok(document) => TypedValue::Opaque(document),
            Err(_) => text_or_bytes(body),
        },
        Some(ContentType::OctetStream) => TypedValue::Bytes(body.to_vec()),
        Some(_) => text_or_bytes(body),
    }
}

fn text_or_bytes(body: &Bytes) -> TypedValue {
    match std::str::from_utf8(body) {
        Ok(text) => TypedValue::String(text.to_string()),
        Err(_) => TypedValue::Bytes(body.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{CONTENT_TYPE, HeaderValue};
    use serde_json::json;
    use tether_define::{ObjectSchema, RestMethod, Schema};

    fn error_schema() -> Schema {
        Schema::object(
            ObjectSchema::new()
                .field("message", Schema::string())
                .required(["message"]),
        )
    }

    fn version_endpoint() -> EndpointDescriptor {
        EndpointDescriptor::builder()
            .id("getLakeFSVersion")
            .method(RestMethod::Get)
            .path("/config/version")
            .response(ResponseSpec::json(
                200,
                Schema::object(ObjectSchema::new().field("version", Schema::string())),
            ))
            .response(ResponseSpec::json(401, error_schema()))
            .build()
            .unwrap()
    }

    fn with_default() -> EndpointDescriptor {
        EndpointDescriptor::builder()
            .id("setupCommPrefs")
            .method(RestMethod::Post)
            .path("/setup_comm_prefs")
            .response(ResponseSpec::empty(200))
            .response(ResponseSpec::json(tether_define::StatusKey::Default, error_schema()))
            .build()
            .unwrap()
    }

    #[test]
    fn declared_success_is_decoded() {
        let outcome = decode(
            Response::json(200, &json!({"version": "1.2.3"})),
            &version_endpoint(),
        )
        .unwrap();
        let version = outcome.value.as_object().and_then(|o| o.get("version")).cloned();
        assert_eq!(version, Some(TypedValue::from("1.2.3")));
    }

    #[test]
    fn undeclared_error_is_undecoded_api_error() {
        let err = decode(Response::json(503, &json!({})), &version_endpoint()).unwrap_err();
        let api = err.api().unwrap();
        assert_eq!(api.status, 503);
        assert_eq!(api.payload, ErrorPayload::Undecoded);
        assert_eq!(api.body_json(), Some(json!({})));
    }

    #[test]
    fn declared_error_is_decoded() {
        let err = decode(
            Response::json(401, &json!({"message": "bad credentials"})),
            &version_endpoint(),
        )
        .unwrap_err();
        let api = err.api().unwrap();
        assert_eq!(api.message().as_deref(), Some("bad credentials"));
        assert!(api.decoded().is_some());
    }

    #[test]
    fn mismatching_error_payload_degrades() {
        let err = decode(
            Response::json(401, &json!({"detail": "nope"})),
            &version_endpoint(),
        )
        .unwrap_err();
        assert_eq!(err.api().unwrap().payload, ErrorPayload::Undecoded);
    }

    #[test]
    fn default_entry_covers_error_statuses() {
        let err = decode(
            Response::json(412, &json!({"message": "comm prefs already set"})),
            &with_default(),
        )
        .unwrap_err();
        assert!(err.api().unwrap().decoded().is_some());
    }

    #[test]
    fn no_content_success_is_null() {
        let outcome = decode(Response::new(200, ""), &with_default()).unwrap();
        assert_eq!(outcome.value, TypedValue::Null);
    }

    #[test]
    fn undeclared_success_is_opaque() {
        let outcome = decode(
            Response::json(202, &json!({"queued": true})),
            &version_endpoint(),
        )
        .unwrap();
        assert_eq!(outcome.value, TypedValue::Opaque(json!({"queued": true})));

        let outcome = decode(Response::new(202, "accepted"), &version_endpoint()).unwrap();
        assert_eq!(outcome.value, TypedValue::from("accepted"));

        let outcome = decode(Response::new(204, ""), &version_endpoint()).unwrap();
        assert_eq!(outcome.value, TypedValue::Null);
    }

    #[test]
    fn unexpected_content_type() {
        let response = Response::new(200, "<html/>")
            .with_header(CONTENT_TYPE, HeaderValue::from_static("text/html"));
        let err = decode(response, &version_endpoint()).unwrap_err();
        assert!(matches!(
            err,
            TetherError::Decode(DecodeError::UnexpectedContentType { status: 200, .. })
        ));
    }

    #[test]
    fn empty_declared_body() {
        let response = Response::new(200, "")
            .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let err = decode(response, &version_endpoint()).unwrap_err();
        assert!(matches!(err, TetherError::Decode(DecodeError::EmptyBody { status: 200 })));
    }

    #[test]
    fn invalid_success_body_is_a_decode_error() {
        let err = decode(
            Response::json(200, &json!({"version": 3})),
            &version_endpoint(),
        )
        .unwrap_err();
        assert!(matches!(err, TetherError::Decode(DecodeError::Body { status: 200, .. })));
    }
}
