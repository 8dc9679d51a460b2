//! `application/x-www-form-urlencoded` bodies.
//!
//! Only object schemas have a form representation. Array fields become
//! repeated keys and nested objects travel as compact JSON. A form cannot
//! tell a null or an empty array apart from an absent field, so both are
//! rejected; omit the field instead.

use url::form_urlencoded;

use tether_define::{
    AdditionalProperties, ContentType, FieldPath, ObjectSchema, ObjectValue, Schema, SchemaKind,
    TypedValue,
};

use super::{json, text};
use crate::error::CodecError;

fn unsupported(reason: impl Into<String>) -> CodecError {
    CodecError::UnsupportedValue {
        content_type: ContentType::Form,
        reason: reason.into(),
    }
}

pub(crate) fn encode(value: &TypedValue, schema: &Schema) -> Result<Vec<u8>, CodecError> {
    let TypedValue::Object(object) = value else {
        return Err(unsupported(format!(
            "form bodies must be objects, got {}",
            value.kind_name()
        )));
    };
    let shape = schema.object_shape().ok().flatten().unwrap_or_default();
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (name, field_value) in object.fields() {
        let (wire_name, field_schema) = match shape.get(name) {
            Some(field) => (field.wire_name.as_str(), &field.schema),
            None => (name, &json::ANY),
        };
        append(&mut serializer, wire_name, field_value, field_schema)?;
    }
    for (wire_name, raw) in object.additional() {
        let rendered = match raw {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        serializer.append_pair(wire_name, &rendered);
    }
    Ok(serializer.finish().into_bytes())
}

fn append(
    serializer: &mut form_urlencoded::Serializer<'_, String>,
    key: &str,
    value: &TypedValue,
    schema: &Schema,
) -> Result<(), CodecError> {
    match value {
        TypedValue::Null => Err(unsupported(format!(
            "field `{key}` is null and a form has no null; omit the field"
        ))),
        TypedValue::Bytes(_) => Err(unsupported(format!(
            "field `{key}` holds binary data; use multipart instead"
        ))),
        TypedValue::Array(items) if items.is_empty() => Err(unsupported(format!(
            "field `{key}` is an empty array and a form has no empty list; omit the field"
        ))),
        TypedValue::Array(items) => {
            let item_schema = match &schema.kind {
                SchemaKind::Array(items) => items.as_ref().clone(),
                _ => Schema::any(),
            };
            for item in items {
                append(serializer, key, item, &item_schema)?;
            }
            Ok(())
        }
        other => {
            let rendered = text::render(other, schema, ContentType::Form)?;
            serializer.append_pair(key, &rendered);
            Ok(())
        }
    }
}

pub(crate) fn decode(bytes: &[u8], schema: &Schema) -> Result<TypedValue, CodecError> {
    let shape = match schema.object_shape() {
        Ok(Some(shape)) => shape,
        _ => {
            return Err(unsupported(format!(
                "{} schemas have no form representation",
                schema.kind.name()
            )));
        }
    };
    let mut pairs: Vec<(String, Vec<String>)> = Vec::new();
    for (key, value) in form_urlencoded::parse(bytes) {
        match pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value.into_owned()),
            None => pairs.push((key.into_owned(), vec![value.into_owned()])),
        }
    }
    decode_pairs(pairs, &shape)
}

/// Builds an object from grouped key/value pairs, shared with multipart.
pub(crate) fn decode_pairs(
    pairs: Vec<(String, Vec<String>)>,
    shape: &ObjectSchema,
) -> Result<TypedValue, CodecError> {
    let root = FieldPath::root();
    let mut object = ObjectValue::new();
    for (wire_name, mut values) in pairs {
        match shape.get_by_wire(&wire_name) {
            Some(field) => {
                let path = root.field(&field.name);
                let decoded = match &field.schema.kind {
                    SchemaKind::Array(items) => TypedValue::Array(
                        values
                            .iter()
                            .enumerate()
                            .map(|(i, v)| text::parse_scalar(v, items, &path.index(i)))
                            .collect::<Result<_, _>>()?,
                    ),
                    _ => match values.pop() {
                        Some(last) => text::parse_scalar(&last, &field.schema, &path)?,
                        None => TypedValue::Null,
                    },
                };
                object.insert(field.name.clone(), decoded);
            }
            None if shape.additional == AdditionalProperties::Forbid => {
                return Err(CodecError::UnexpectedAdditionalProperty {
                    path: root,
                    name: wire_name,
                });
            }
            None => {
                let raw = match values.len() {
                    1 => serde_json::Value::String(values.remove(0)),
                    _ => serde_json::Value::from(values),
                };
                object.insert_additional(wire_name, raw);
            }
        }
    }
    Ok(TypedValue::Object(object))
}

/// Renders one object field for a multipart text part.
pub(crate) fn render_field(value: &TypedValue, schema: &Schema) -> Result<String, CodecError> {
    match value {
        TypedValue::Array(_) | TypedValue::Object(_) | TypedValue::Variant(_) => {
            Ok(json::encode(value, schema)?.to_string())
        }
        other => text::render(other, schema, ContentType::Multipart),
    }
}
