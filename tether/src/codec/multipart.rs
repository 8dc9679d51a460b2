//! `multipart/form-data` bodies.
//!
//! One part per object field. Binary fields become file parts with an
//! `application/octet-stream` type, structured and null fields become JSON
//! parts and everything else is a plain text part.

use rand::Rng;

use tether_define::{
    ContentType, FieldPath, MediaType, ObjectSchema, ObjectValue, Schema, SchemaKind, TypedValue,
};

use super::{form, json};
use crate::error::CodecError;

const CRLF: &str = "\r\n";

fn unsupported(reason: impl Into<String>) -> CodecError {
    CodecError::UnsupportedValue {
        content_type: ContentType::Multipart,
        reason: reason.into(),
    }
}

struct Part<'a> {
    name: &'a str,
    file_name: Option<&'a str>,
    content_type: Option<&'static str>,
    data: Vec<u8>,
}

/// Encodes `value` and returns the body with the boundary it uses.
pub(crate) fn encode(value: &TypedValue, schema: &Schema) -> Result<(Vec<u8>, String), CodecError> {
    let TypedValue::Object(object) = value else {
        return Err(unsupported(format!(
            "multipart bodies must be objects, got {}",
            value.kind_name()
        )));
    };
    let shape = schema.object_shape().ok().flatten().unwrap_or_default();

    let mut parts = Vec::new();
    for (name, field_value) in object.fields() {
        let (wire_name, field_schema) = match shape.get(name) {
            Some(field) => (field.wire_name.as_str(), &field.schema),
            None => (name, &json::ANY),
        };
        push_parts(&mut parts, wire_name, field_value, field_schema)?;
    }
    for (wire_name, raw) in object.additional() {
        parts.push(Part {
            name: wire_name,
            file_name: None,
            content_type: Some(ContentType::Json.mime()),
            data: raw.to_string().into_bytes(),
        });
    }

    let boundary = loop {
        let candidate = new_boundary();
        if !parts.iter().any(|p| find(&p.data, candidate.as_bytes()).is_some()) {
            break candidate;
        }
    };

    let mut body = Vec::new();
    for part in &parts {
        body.extend_from_slice(format!("--{boundary}{CRLF}").as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(file_name) = part.file_name {
            disposition.push_str(&format!("; filename=\"{file_name}\""));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(CRLF.as_bytes());
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {content_type}{CRLF}").as_bytes());
        }
        body.extend_from_slice(CRLF.as_bytes());
        body.extend_from_slice(&part.data);
        body.extend_from_slice(CRLF.as_bytes());
    }
    body.extend_from_slice(format!("--{boundary}--{CRLF}").as_bytes());
    Ok((body, boundary))
}

fn push_parts<'a>(
    parts: &mut Vec<Part<'a>>,
    name: &'a str,
    value: &TypedValue,
    schema: &Schema,
) -> Result<(), CodecError> {
    match value {
        TypedValue::Null => parts.push(Part {
            name,
            file_name: None,
            content_type: Some(ContentType::Json.mime()),
            data: b"null".to_vec(),
        }),
        TypedValue::Bytes(bytes) => parts.push(Part {
            name,
            file_name: Some(name),
            content_type: Some(ContentType::OctetStream.mime()),
            data: bytes.clone(),
        }),
        TypedValue::Array(items) if items.iter().any(|i| matches!(i, TypedValue::Bytes(_))) => {
            let item_schema = match &schema.kind {
                SchemaKind::Array(items) => items.as_ref(),
                _ => &json::ANY,
            };
            for item in items {
                push_parts(parts, name, item, item_schema)?;
            }
        }
        TypedValue::Array(_) | TypedValue::Object(_) | TypedValue::Variant(_) => parts.push(Part {
            name,
            file_name: None,
            content_type: Some(ContentType::Json.mime()),
            data: json::encode(value, schema)?.to_string().into_bytes(),
        }),
        other => parts.push(Part {
            name,
            file_name: None,
            content_type: None,
            data: form::render_field(other, schema)?.into_bytes(),
        }),
    }
    Ok(())
}

fn new_boundary() -> String {
    let mut rng = rand::thread_rng();
    format!("tether-{:016x}{:016x}", rng.r#gen::<u64>(), rng.r#gen::<u64>())
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Decodes a multipart body using the boundary from its media type.
pub(crate) fn decode(bytes: &[u8], schema: &Schema, boundary: &str) -> Result<TypedValue, CodecError> {
    let Ok(Some(shape)) = schema.object_shape() else {
        return Err(unsupported(format!(
            "{} schemas have no multipart representation",
            schema.kind.name()
        )));
    };
    let delimiter = format!("--{boundary}");
    let mut rest = bytes;
    let mut pairs: Vec<(String, Vec<String>)> = Vec::new();
    let mut binaries: Vec<(String, Vec<u8>)> = Vec::new();
    let mut structured: Vec<(String, serde_json::Value)> = Vec::new();

    let start = find(rest, delimiter.as_bytes())
        .ok_or_else(|| CodecError::Multipart("opening boundary not found".to_string()))?;
    rest = &rest[start + delimiter.len()..];

    loop {
        if rest.starts_with(b"--") {
            break;
        }
        rest = rest.strip_prefix(CRLF.as_bytes()).unwrap_or(rest);
        let end = find(rest, delimiter.as_bytes())
            .ok_or_else(|| CodecError::Multipart("closing boundary not found".to_string()))?;
        let raw_part = &rest[..end];
        let raw_part = raw_part.strip_suffix(CRLF.as_bytes()).unwrap_or(raw_part);
        let (name, kind, data) = parse_part(raw_part)?;
        let declared = shape.get_by_wire(&name);

        if kind == PartKind::File
            || (kind == PartKind::Text && declared.is_some_and(|f| binary_field(&f.schema)))
        {
            binaries.push((name, data.to_vec()));
        } else if kind == PartKind::Json && declared.is_some() {
            structured.push((name, serde_json::from_slice(data)?));
        } else {
            let text = std::str::from_utf8(data)?.to_string();
            match pairs.iter_mut().find(|(k, _)| *k == name) {
                Some((_, values)) => values.push(text),
                None => pairs.push((name, vec![text])),
            }
        }
        rest = &rest[end + delimiter.len()..];
    }

    let mut decoded = form::decode_pairs(pairs, &shape)?;
    if let TypedValue::Object(object) = &mut decoded {
        for (wire_name, raw) in structured {
            if let Some(field) = shape.get_by_wire(&wire_name) {
                let path = FieldPath::root().field(&field.name);
                object.insert(field.name.clone(), json::decode(&raw, &field.schema, &path)?);
            }
        }
        attach_binaries(object, binaries, &shape);
    }
    Ok(decoded)
}

fn binary_field(schema: &Schema) -> bool {
    match &schema.kind {
        SchemaKind::Binary => true,
        SchemaKind::Array(items) => items.kind == SchemaKind::Binary,
        _ => false,
    }
}

fn attach_binaries(
    object: &mut ObjectValue,
    binaries: Vec<(String, Vec<u8>)>,
    shape: &ObjectSchema,
) {
    for (wire_name, data) in binaries {
        let Some(field) = shape.get_by_wire(&wire_name) else {
            object.insert_additional(wire_name, serde_json::Value::from(data));
            continue;
        };
        let value = TypedValue::Bytes(data);
        if matches!(field.schema.kind, SchemaKind::Array(_)) {
            match object.remove(&field.name) {
                Some(TypedValue::Array(mut items)) => {
                    items.push(value);
                    object.insert(field.name.clone(), TypedValue::Array(items));
                }
                _ => {
                    object.insert(field.name.clone(), TypedValue::Array(vec![value]));
                }
            }
        } else {
            object.insert(field.name.clone(), value);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PartKind {
    Text,
    Json,
    File,
}

/// Splits one part into its field name, kind and data.
fn parse_part(raw: &[u8]) -> Result<(String, PartKind, &[u8]), CodecError> {
    let separator = b"\r\n\r\n";
    let (head, data) = match find(raw, separator) {
        Some(at) => (&raw[..at], &raw[at + separator.len()..]),
        None => return Err(CodecError::Multipart("part has no header block".to_string())),
    };
    let head = std::str::from_utf8(head)?;
    let header = |wanted: &str| {
        head.split(CRLF).find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.trim().eq_ignore_ascii_case(wanted).then_some(value.trim())
        })
    };
    let disposition = header("content-disposition")
        .ok_or_else(|| CodecError::Multipart("part has no Content-Disposition".to_string()))?;
    let is_json = header("content-type")
        .and_then(MediaType::parse)
        .is_some_and(|media| media.content_type == ContentType::Json);

    let mut name = None;
    let mut is_file = false;
    for param in disposition.split(';').skip(1) {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"');
        match key.trim() {
            "name" => name = Some(value.to_string()),
            "filename" => is_file = true,
            _ => {}
        }
    }
    let name = name.ok_or_else(|| CodecError::Multipart("part has no name".to_string()))?;
    let kind = if is_file {
        PartKind::File
    } else if is_json {
        PartKind::Json
    } else {
        PartKind::Text
    };
    Ok((name, kind, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload() -> Schema {
        Schema::object(
            ObjectSchema::new()
                .field("description", Schema::string())
                .field("content", Schema::binary())
                .field("labels", Schema::array(Schema::string())),
        )
    }

    #[test]
    fn parts_carry_names_and_types() {
        let value = TypedValue::object(
            ObjectValue::new()
                .with("description", "nightly export")
                .with("content", TypedValue::bytes(b"\x00\x01binary".to_vec()))
                .with("labels", TypedValue::array(["a", "b"])),
        );
        let (body, boundary) = encode(&value, &upload()).unwrap();
        let text = String::from_utf8_lossy(&body);
        assert!(boundary.starts_with("tether-"));
        assert!(text.contains("Content-Disposition: form-data; name=\"description\"\r\n\r\nnightly export\r\n"));
        assert!(text.contains("name=\"content\"; filename=\"content\"\r\nContent-Type: application/octet-stream"));
        assert!(text.contains("Content-Type: application/json\r\n\r\n[\"a\",\"b\"]"));
        assert!(text.ends_with(&format!("--{boundary}--\r\n")));
    }

    #[test]
    fn encoded_body_decodes_back() {
        let value = TypedValue::object(
            ObjectValue::new()
                .with("description", "x")
                .with("content", TypedValue::bytes(vec![0u8, 255, 13, 10]))
                .with("labels", TypedValue::array(["a", "b"])),
        );
        let (body, boundary) = encode(&value, &upload()).unwrap();
        assert_eq!(decode(&body, &upload(), &boundary).unwrap(), value);
    }

    #[test]
    fn null_and_empty_fields_decode_back() {
        let schema = Schema::object(
            ObjectSchema::new()
                .field("description", Schema::string().nullable())
                .field("content", Schema::binary().nullable())
                .field("attachments", Schema::array(Schema::binary()))
                .field("labels", Schema::array(Schema::string())),
        );
        let value = TypedValue::object(
            ObjectValue::new()
                .with("description", TypedValue::Null)
                .with("content", TypedValue::Null)
                .with("attachments", TypedValue::Array(Vec::new()))
                .with("labels", TypedValue::Array(Vec::new())),
        );
        let (body, boundary) = encode(&value, &schema).unwrap();
        let text = String::from_utf8_lossy(&body);
        assert!(text.contains("name=\"description\"\r\nContent-Type: application/json\r\n\r\nnull\r\n"));
        assert_eq!(decode(&body, &schema, &boundary).unwrap(), value);
    }

    #[test]
    fn missing_boundary_in_body() {
        let err = decode(b"no parts here", &upload(), "abc").unwrap_err();
        assert!(matches!(err, CodecError::Multipart(_)));
    }

    #[test]
    fn scalar_body_is_rejected() {
        assert!(matches!(
            encode(&TypedValue::Integer(1), &Schema::integer()),
            Err(CodecError::UnsupportedValue { .. })
        ));
    }
}
