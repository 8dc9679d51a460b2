//! Serialization and deserialization errors.

use thiserror::Error;

use tether_define::{ContentType, FieldPath, ValidationError};

use super::join_violations;

/// Errors converting between typed values and wire bytes.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A wire string that is not a member of the declared enum.
    #[error("{path}: `{value}` is not one of {allowed:?}")]
    InvalidEnumValue {
        path: FieldPath,
        value: String,
        allowed: Vec<String>,
    },

    /// A wire field the schema forbids.
    #[error("{path}: additional property `{name}` is not allowed")]
    UnexpectedAdditionalProperty { path: FieldPath, name: String },

    /// A discriminator value selecting no member, or several.
    #[error("{path}: cannot resolve oneOf member for discriminator {tag:?} (candidates: {candidates:?})")]
    AmbiguousOrUnknownDiscriminator {
        path: FieldPath,
        tag: Option<String>,
        candidates: Vec<String>,
    },

    /// The decoded value does not conform to the schema.
    #[error("schema validation failed: {}", join_violations(.0))]
    SchemaValidationFailed(Vec<ValidationError>),

    #[error("invalid JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("invalid YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("body is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("malformed multipart body: {0}")]
    Multipart(String),

    /// The value has no representation in the requested media type.
    #[error("cannot encode value as {content_type}: {reason}")]
    UnsupportedValue {
        content_type: ContentType,
        reason: String,
    },

    #[error("{path}: `{value}` is not a number")]
    InvalidNumber { path: FieldPath, value: String },

    /// A binary field whose wire text is not valid base64.
    #[error("{path}: invalid base64 data: {reason}")]
    InvalidBinary { path: FieldPath, reason: String },

    /// Conversion between a typed value and a serde model failed.
    #[error("model conversion failed: {0}")]
    Model(#[source] serde_json::Error),
}
