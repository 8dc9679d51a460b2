//! `text/plain` and `application/octet-stream` bodies, plus the scalar
//! parsing shared by every text-based encoding (forms, multipart parts).

use tether_define::{ContentType, FieldPath, Schema, SchemaKind, TypedValue};

use super::json;
use crate::error::CodecError;

/// Renders a value as text under `schema`.
///
/// Primitives use their plain rendering; arrays, objects and variants become
/// compact JSON.
pub(crate) fn render(
    value: &TypedValue,
    schema: &Schema,
    content_type: ContentType,
) -> Result<String, CodecError> {
    match value {
        TypedValue::Bytes(bytes) => String::from_utf8(bytes.clone()).map_err(|_| {
            CodecError::UnsupportedValue {
                content_type,
                reason: "binary data is not valid UTF-8 text".to_string(),
            }
        }),
        other => match other.to_plain_string() {
            Some(text) => Ok(text),
            None => Ok(json::encode(other, schema)?.to_string()),
        },
    }
}

/// Parses one text value under `schema`.
pub(crate) fn parse_scalar(
    text: &str,
    schema: &Schema,
    path: &FieldPath,
) -> Result<TypedValue, CodecError> {
    let invalid_number = || CodecError::InvalidNumber {
        path: path.clone(),
        value: text.to_string(),
    };
    match &schema.kind {
        SchemaKind::Any | SchemaKind::String(_) => Ok(TypedValue::String(text.to_string())),
        SchemaKind::Binary => Ok(TypedValue::Bytes(text.as_bytes().to_vec())),
        SchemaKind::Integer(_) => match text.trim().parse::<i64>() {
            Ok(i) => Ok(TypedValue::Integer(i)),
            // Let validation report fractional and out-of-range values as type mismatches.
            Err(_) => match text.trim().parse::<f64>() {
                Ok(f) => Ok(json::whole_i64(f).map_or(TypedValue::Float(f), TypedValue::Integer)),
                Err(_) => Err(invalid_number()),
            },
        },
        SchemaKind::Number => match text.trim().parse::<i64>() {
            Ok(i) => Ok(TypedValue::Integer(i)),
            Err(_) => text
                .trim()
                .parse::<f64>()
                .map(TypedValue::Float)
                .map_err(|_| invalid_number()),
        },
        SchemaKind::Boolean => Ok(match text.trim() {
            "true" => TypedValue::Bool(true),
            "false" => TypedValue::Bool(false),
            other => TypedValue::String(other.to_string()),
        }),
        SchemaKind::Enum(allowed) => {
            if allowed.iter().any(|member| member == text) {
                Ok(TypedValue::String(text.to_string()))
            } else {
                Err(CodecError::InvalidEnumValue {
                    path: path.clone(),
                    value: text.to_string(),
                    allowed: allowed.clone(),
                })
            }
        }
        SchemaKind::Array(_)
        | SchemaKind::Object(_)
        | SchemaKind::OneOf(_)
        | SchemaKind::AnyOf(_)
        | SchemaKind::AllOf(_) => {
            let parsed: serde_json::Value = serde_json::from_str(text)?;
            json::decode(&parsed, schema, path)
        }
    }
}

pub(crate) fn encode_plain(value: &TypedValue, schema: &Schema) -> Result<Vec<u8>, CodecError> {
    if matches!(value, TypedValue::Null) {
        return Ok(Vec::new());
    }
    render(value, schema, ContentType::PlainText).map(String::into_bytes)
}

pub(crate) fn decode_plain(bytes: &[u8], schema: &Schema) -> Result<TypedValue, CodecError> {
    let text = std::str::from_utf8(bytes)?;
    if text.is_empty() && schema.nullable {
        return Ok(TypedValue::Null);
    }
    parse_scalar(text, schema, &FieldPath::root())
}

pub(crate) fn encode_octets(value: &TypedValue, schema: &Schema) -> Result<Vec<u8>, CodecError> {
    match value {
        TypedValue::Bytes(bytes) => Ok(bytes.clone()),
        TypedValue::Null => Ok(Vec::new()),
        other => render(other, schema, ContentType::OctetStream).map(String::into_bytes),
    }
}

pub(crate) fn decode_octets(bytes: &[u8], schema: &Schema) -> Result<TypedValue, CodecError> {
    match schema.kind {
        SchemaKind::Binary | SchemaKind::Any => Ok(TypedValue::Bytes(bytes.to_vec())),
        _ => decode_plain(bytes, schema),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_follow_schema() {
        let root = FieldPath::root();
        assert_eq!(
            parse_scalar("42", &Schema::integer(), &root).unwrap(),
            TypedValue::Integer(42)
        );
        assert_eq!(
            parse_scalar("2.0", &Schema::integer(), &root).unwrap(),
            TypedValue::Integer(2)
        );
        assert_eq!(
            parse_scalar("2.5", &Schema::integer(), &root).unwrap(),
            TypedValue::Float(2.5)
        );
        assert_eq!(
            parse_scalar("true", &Schema::boolean(), &root).unwrap(),
            TypedValue::Bool(true)
        );
        assert!(matches!(
            parse_scalar("many", &Schema::number(), &root),
            Err(CodecError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn numbers_keep_their_width() {
        let root = FieldPath::root();
        assert_eq!(
            parse_scalar("3", &Schema::number(), &root).unwrap(),
            TypedValue::Integer(3)
        );
        assert_eq!(
            parse_scalar("3.0", &Schema::number(), &root).unwrap(),
            TypedValue::Float(3.0)
        );
        assert_eq!(
            render(&TypedValue::Integer(3), &Schema::number(), ContentType::Form).unwrap(),
            "3"
        );
        assert_eq!(
            render(&TypedValue::Float(3.0), &Schema::number(), ContentType::Form).unwrap(),
            "3.0"
        );
    }

    #[test]
    fn out_of_range_integer_text_is_not_clamped() {
        let root = FieldPath::root();
        assert_eq!(
            parse_scalar("1e30", &Schema::integer(), &root).unwrap(),
            TypedValue::Float(1e30)
        );
        assert_eq!(
            parse_scalar("9223372036854775808", &Schema::integer(), &root).unwrap(),
            TypedValue::Float(9_223_372_036_854_775_808.0)
        );
    }

    #[test]
    fn enum_scalar_is_checked() {
        let schema = Schema::enumeration(["initialized", "not_initialized"]);
        assert!(parse_scalar("initialized", &schema, &FieldPath::root()).is_ok());
        assert!(matches!(
            parse_scalar("ready", &schema, &FieldPath::root()),
            Err(CodecError::InvalidEnumValue { .. })
        ));
    }

    #[test]
    fn structured_scalar_is_json() {
        let schema = Schema::array(Schema::integer());
        assert_eq!(
            parse_scalar("[1,2]", &schema, &FieldPath::root()).unwrap(),
            TypedValue::array([1, 2])
        );
    }

    #[test]
    fn plain_text_body() {
        let bytes = encode_plain(&TypedValue::from("v1.2.3"), &Schema::string()).unwrap();
        assert_eq!(bytes, b"v1.2.3");
        assert_eq!(
            decode_plain(&bytes, &Schema::string()).unwrap(),
            TypedValue::from("v1.2.3")
        );
        assert!(matches!(
            decode_plain(&[0xff, 0xfe], &Schema::string()),
            Err(CodecError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn containers_render_as_json_text() {
        let value = TypedValue::array(["a", "b"]);
        let text = render(&value, &Schema::array(Schema::string()), ContentType::PlainText).unwrap();
        assert_eq!(text, r#"["a","b"]"#);
    }

    #[test]
    fn octets_pass_through() {
        let value = TypedValue::bytes(vec![0u8, 159, 146, 150]);
        let bytes = encode_octets(&value, &Schema::binary()).unwrap();
        assert_eq!(decode_octets(&bytes, &Schema::binary()).unwrap(), value);
    }

    #[test]
    fn non_utf8_bytes_cannot_be_text() {
        let value = TypedValue::bytes(vec![0xffu8]);
        assert!(matches!(
            encode_plain(&value, &Schema::string()),
            Err(CodecError::UnsupportedValue { .. })
        ));
    }
}
