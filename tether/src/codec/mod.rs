//! Body serialization and deserialization.
//!
//! A [`TypedValue`] is turned into wire bytes for one of the supported
//! [`ContentType`]s and back, always guided by the [`Schema`] of the body:
//! field names map to wire names, integers and floats keep their width and
//! binary data is base64 inside JSON.
//!
//! Both directions validate. [`serialize`] refuses values that do not
//! conform to the schema, and [`deserialize`] reports every violation of a
//! decoded body at once.
//!
//! ## Examples
//!
//! ```
//! use tether_define::{ContentType, ObjectSchema, ObjectValue, Schema, TypedValue};
//! use tether::codec;
//!
//! let schema = Schema::object(ObjectSchema::new().field("version", Schema::string()));
//! let value = TypedValue::object(ObjectValue::new().with("version", "1.2.3"));
//!
//! let body = codec::serialize(&value, &schema, ContentType::Json).unwrap();
//! assert_eq!(body.bytes.as_ref(), br#"{"version":"1.2.3"}"#);
//!
//! let back = codec::deserialize(&body.bytes, &schema, &body.media_type).unwrap();
//! assert_eq!(back, value);
//! ```

mod form;
pub mod json;
mod multipart;
mod text;
mod yaml;

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;

use tether_define::{ContentType, MediaType, Schema, TypedValue, validate};

use crate::error::CodecError;

/// Serialized body bytes and the media type describing them.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedBody {
    /// Value for the `Content-Type` header; carries the multipart boundary.
    pub media_type: MediaType,
    pub bytes: Bytes,
}

impl EncodedBody {
    pub fn content_type(&self) -> ContentType {
        self.media_type.content_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Validates `value` against `schema` and encodes it as `content_type`.
pub fn serialize(
    value: &TypedValue,
    schema: &Schema,
    content_type: ContentType,
) -> Result<EncodedBody, CodecError> {
    let violations = validate(value, schema);
    if !violations.is_empty() {
        return Err(CodecError::SchemaValidationFailed(violations));
    }
    encode(value, schema, content_type)
}

/// Encodes without validating; callers have already validated.
pub(crate) fn encode(
    value: &TypedValue,
    schema: &Schema,
    content_type: ContentType,
) -> Result<EncodedBody, CodecError> {
    let mut media_type = MediaType::new(content_type);
    let bytes = match content_type {
        ContentType::Json => serde_json::to_vec(&json::encode(value, schema)?)?,
        ContentType::Form => form::encode(value, schema)?,
        ContentType::Multipart => {
            let (bytes, boundary) = multipart::encode(value, schema)?;
            media_type = media_type.with_param("boundary", boundary);
            bytes
        }
        ContentType::OctetStream => text::encode_octets(value, schema)?,
        ContentType::PlainText => text::encode_plain(value, schema)?,
        ContentType::Yaml => yaml::encode(value, schema)?,
    };
    Ok(EncodedBody {
        media_type,
        bytes: Bytes::from(bytes),
    })
}

/// Decodes `bytes` of the given media type and validates the result.
///
/// An empty JSON or YAML body decodes to `Null`, which only a nullable schema
/// accepts.
pub fn deserialize(
    bytes: &[u8],
    schema: &Schema,
    media_type: &MediaType,
) -> Result<TypedValue, CodecError> {
    let blank = bytes.iter().all(u8::is_ascii_whitespace);
    let value = match media_type.content_type {
        ContentType::Json | ContentType::Yaml if blank => TypedValue::Null,
        ContentType::Json => {
            let document: serde_json::Value = serde_json::from_slice(bytes)?;
            json::decode(&document, schema, &tether_define::FieldPath::root())?
        }
        ContentType::Yaml => yaml::decode(bytes, schema)?,
        ContentType::Form => form::decode(bytes, schema)?,
        ContentType::Multipart => {
            let boundary = media_type.boundary().ok_or_else(|| {
                CodecError::Multipart("Content-Type has no boundary parameter".to_string())
            })?;
            multipart::decode(bytes, schema, boundary)?
        }
        ContentType::OctetStream => text::decode_octets(bytes, schema)?,
        ContentType::PlainText => text::decode_plain(bytes, schema)?,
    };
    let violations = validate(&value, schema);
    if violations.is_empty() {
        Ok(value)
    } else {
        Err(CodecError::SchemaValidationFailed(violations))
    }
}

/// Converts a serde model into a validated [`TypedValue`].
///
/// The model is serialized with its own serde attributes, so its field
/// names must be the schema's wire names.
pub fn from_model<T: Serialize>(model: &T, schema: &Schema) -> Result<TypedValue, CodecError> {
    let document = serde_json::to_value(model).map_err(CodecError::Model)?;
    json::decode_checked(&document, schema)
}

/// Converts a serde model into a [`TypedValue`] shaped by `schema`, leaving
/// constraint checks to whoever consumes the value.
///
/// Request building validates bodies itself, so façades use this to have
/// violations reported against the `body` path.
pub fn from_model_unchecked<T: Serialize>(
    model: &T,
    schema: &Schema,
) -> Result<TypedValue, CodecError> {
    let document = serde_json::to_value(model).map_err(CodecError::Model)?;
    json::decode(&document, schema, &tether_define::FieldPath::root())
}

/// Converts a [`TypedValue`] into a serde model.
pub fn to_model<T: DeserializeOwned>(value: &TypedValue, schema: &Schema) -> Result<T, CodecError> {
    let document = json::encode(value, schema)?;
    serde_json::from_value(document).map_err(CodecError::Model)
}
