//! Schema-guided conversion between `serde_json::Value` and [`TypedValue`].
//!
//! Encoding maps in-memory field names to wire names. Numbers keep the
//! width they were built with: an integer under a `number` schema stays an
//! integer on the wire and back. Decoding is the reverse, failing fast on
//! enum members, forbidden fields and unresolvable discriminators; every
//! other mismatch is left for [`validate`](tether_define::validate) to report
//! with a full violation list.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Number, Value};

use tether_define::{
    AdditionalProperties, ContentType, FieldPath, Member, ObjectSchema, ObjectValue, Schema,
    SchemaKind, TypedValue, UnionSchema, UnknownVariant, Variant, validate, validate_at,
};

use crate::error::CodecError;

/// Encodes a typed value as JSON under `schema`.
pub fn encode(value: &TypedValue, schema: &Schema) -> Result<Value, CodecError> {
    match value {
        TypedValue::Null => Ok(Value::Null),
        TypedValue::Bool(b) => Ok(Value::Bool(*b)),
        TypedValue::Integer(i) => Ok(Value::Number((*i).into())),
        TypedValue::Float(f) => float(*f),
        TypedValue::String(s) => Ok(Value::String(s.clone())),
        TypedValue::Bytes(b) => Ok(Value::String(STANDARD.encode(b))),
        TypedValue::Array(items) => {
            let item_schema = match &schema.kind {
                SchemaKind::Array(items) => items.as_ref(),
                _ => &ANY,
            };
            items
                .iter()
                .map(|item| encode(item, item_schema))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        TypedValue::Object(object) => match &schema.kind {
            SchemaKind::OneOf(union) => match resolve_member(union, value) {
                Some(member) => encode(value, &member.schema),
                None => encode_object(object, None),
            },
            SchemaKind::AnyOf(members) => {
                match members.iter().find(|m| validate(value, m).is_empty()) {
                    Some(member) => encode(value, member),
                    None => encode_object(object, None),
                }
            }
            _ => encode_object(object, schema.object_shape().ok().flatten().as_ref()),
        },
        TypedValue::Variant(variant) => {
            let member = match &schema.kind {
                SchemaKind::OneOf(union) => variant.member.as_deref().and_then(|n| union.get(n)),
                _ => None,
            };
            match member {
                Some(member) => encode(&variant.value, &member.schema),
                None => encode(&variant.value, &ANY),
            }
        }
        TypedValue::Opaque(raw) => Ok(raw.clone()),
    }
}

pub(crate) static ANY: Schema = Schema::any();

fn float(f: f64) -> Result<Value, CodecError> {
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(|| CodecError::UnsupportedValue {
            content_type: ContentType::Json,
            reason: format!("{f} has no JSON representation"),
        })
}

fn encode_object(object: &ObjectValue, shape: Option<&ObjectSchema>) -> Result<Value, CodecError> {
    let mut map = Map::new();
    for (name, field_value) in object.fields() {
        match shape.and_then(|s| s.get(name)) {
            Some(field) => {
                map.insert(field.wire_name.clone(), encode(field_value, &field.schema)?);
            }
            None => {
                map.insert(name.to_string(), encode(field_value, &ANY)?);
            }
        }
    }
    for (wire_name, raw) in object.additional() {
        map.entry(wire_name.clone()).or_insert_with(|| raw.clone());
    }
    Ok(Value::Object(map))
}

/// Picks the oneOf member a caller-built object belongs to.
fn resolve_member<'a>(union: &'a UnionSchema, value: &TypedValue) -> Option<&'a Member> {
    if union.discriminator.is_some() {
        let tag = value.as_object().and_then(|o| union.tag_of(o))?;
        let candidates = union.candidates(&tag);
        if let [member] = candidates.as_slice() {
            return Some(*member);
        }
        return candidates
            .into_iter()
            .find(|m| validate(value, &m.schema).is_empty());
    }
    union
        .members
        .iter()
        .find(|m| validate(value, &m.schema).is_empty())
}

/// Decodes and validates a JSON document.
pub fn decode_checked(value: &Value, schema: &Schema) -> Result<TypedValue, CodecError> {
    let decoded = decode(value, schema, &FieldPath::root())?;
    let violations = validate(&decoded, schema);
    if violations.is_empty() {
        Ok(decoded)
    } else {
        Err(CodecError::SchemaValidationFailed(violations))
    }
}

/// Decodes a JSON value under `schema` without running validation.
pub fn decode(value: &Value, schema: &Schema, path: &FieldPath) -> Result<TypedValue, CodecError> {
    if value.is_null() {
        return Ok(TypedValue::Null);
    }
    match &schema.kind {
        SchemaKind::Any => Ok(TypedValue::Opaque(value.clone())),
        SchemaKind::Integer(_) => Ok(match value {
            Value::Number(n) => integer(n),
            other => natural(other),
        }),
        SchemaKind::Number => Ok(natural(value)),
        SchemaKind::Binary => match value {
            Value::String(text) => STANDARD
                .decode(text)
                .map(TypedValue::Bytes)
                .map_err(|e| CodecError::InvalidBinary {
                    path: path.clone(),
                    reason: e.to_string(),
                }),
            other => Ok(natural(other)),
        },
        SchemaKind::Enum(allowed) => match value {
            Value::String(s) if !allowed.contains(s) => Err(CodecError::InvalidEnumValue {
                path: path.clone(),
                value: s.clone(),
                allowed: allowed.clone(),
            }),
            other => Ok(natural(other)),
        },
        SchemaKind::Array(items) => match value {
            Value::Array(values) => values
                .iter()
                .enumerate()
                .map(|(i, v)| decode(v, items, &path.index(i)))
                .collect::<Result<Vec<_>, _>>()
                .map(TypedValue::Array),
            other => Ok(natural(other)),
        },
        SchemaKind::Object(shape) => match value {
            Value::Object(map) => decode_object(map, shape, path),
            other => Ok(natural(other)),
        },
        SchemaKind::AllOf(parts) => match (value, schema.object_shape().ok().flatten()) {
            (Value::Object(map), Some(shape)) => decode_object(map, &shape, path),
            (other, _) => match parts.first() {
                Some(first) => decode(other, first, path),
                None => Ok(natural(other)),
            },
        },
        SchemaKind::OneOf(union) => decode_one_of(value, union, path),
        SchemaKind::AnyOf(members) => {
            for member in members {
                if let Ok(decoded) = decode(value, member, path) {
                    if validate_at(&decoded, member, path).is_empty() {
                        return Ok(decoded);
                    }
                }
            }
            Ok(natural(value))
        }
        SchemaKind::Boolean | SchemaKind::String(_) => Ok(natural(value)),
    }
}

/// Integers keep their width; `2.0` is accepted as an integer, `2.5` and
/// anything outside the `i64` range stay floats for validation to reject.
fn integer(n: &Number) -> TypedValue {
    if let Some(i) = n.as_i64() {
        return TypedValue::Integer(i);
    }
    match n.as_f64() {
        Some(f) => whole_i64(f).map_or(TypedValue::Float(f), TypedValue::Integer),
        None => TypedValue::Opaque(Value::Number(n.clone())),
    }
}

/// 2^63; whole floats in `[-2^63, 2^63)` are exactly representable as `i64`.
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// The `i64` a whole float stands for, if it has one.
pub(crate) fn whole_i64(f: f64) -> Option<i64> {
    (f.fract() == 0.0 && (-I64_LIMIT..I64_LIMIT).contains(&f)).then(|| f as i64)
}

/// Schema-free decoding, used where the schema and the wire disagree so
/// validation can report the mismatch.
fn natural(value: &Value) -> TypedValue {
    match value {
        Value::Null => TypedValue::Null,
        Value::Bool(b) => TypedValue::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => TypedValue::Integer(i),
            None => n
                .as_f64()
                .map_or_else(|| TypedValue::Opaque(value.clone()), TypedValue::Float),
        },
        Value::String(s) => TypedValue::String(s.clone()),
        Value::Array(items) => TypedValue::Array(items.iter().map(natural).collect()),
        Value::Object(map) => {
            let mut object = ObjectValue::new();
            for (k, v) in map {
                object.insert(k.clone(), natural(v));
            }
            TypedValue::Object(object)
        }
    }
}

fn decode_object(
    map: &Map<String, Value>,
    shape: &ObjectSchema,
    path: &FieldPath,
) -> Result<TypedValue, CodecError> {
    let mut object = ObjectValue::new();
    for (wire_name, raw) in map {
        match shape.get_by_wire(wire_name) {
            Some(field) => {
                let decoded = decode(raw, &field.schema, &path.field(&field.name))?;
                object.insert(field.name.clone(), decoded);
            }
            None if shape.additional == AdditionalProperties::Forbid => {
                return Err(CodecError::UnexpectedAdditionalProperty {
                    path: path.clone(),
                    name: wire_name.clone(),
                });
            }
            None => {
                object.insert_additional(wire_name.clone(), raw.clone());
            }
        }
    }
    Ok(TypedValue::Object(object))
}

fn decode_one_of(
    value: &Value,
    union: &UnionSchema,
    path: &FieldPath,
) -> Result<TypedValue, CodecError> {
    let Some(discriminator) = &union.discriminator else {
        let mut matches = union.members.iter().filter_map(|m| clean_decode(value, m, path));
        return Ok(match (matches.next(), matches.next()) {
            (Some((member, decoded)), None) => {
                TypedValue::Variant(Variant::known(&member.name, None, decoded))
            }
            // Zero or several matches: validation reports which.
            _ => natural(value),
        });
    };

    let unresolved = |tag: Option<String>, candidates: &[&Member]| {
        CodecError::AmbiguousOrUnknownDiscriminator {
            path: path.clone(),
            tag,
            candidates: candidates.iter().map(|m| m.name.clone()).collect(),
        }
    };

    let Some(tag) = value.get(&discriminator.property).and_then(Value::as_str) else {
        return Err(unresolved(None, &[]));
    };
    let candidates = union.candidates(tag);
    match candidates.as_slice() {
        [member] => {
            let decoded = decode(value, &member.schema, path)?;
            Ok(TypedValue::Variant(Variant::known(
                &member.name,
                Some(tag.to_string()),
                decoded,
            )))
        }
        [] if discriminator.unknown == UnknownVariant::Preserve => Ok(TypedValue::Variant(
            Variant::unknown(Some(tag.to_string()), value.clone()),
        )),
        [] => Err(unresolved(Some(tag.to_string()), &[])),
        several => {
            let mut matches = several.iter().filter_map(|m| clean_decode(value, m, path));
            match (matches.next(), matches.next()) {
                (Some((member, decoded)), None) => Ok(TypedValue::Variant(Variant::known(
                    &member.name,
                    Some(tag.to_string()),
                    decoded,
                ))),
                _ => Err(unresolved(Some(tag.to_string()), several)),
            }
        }
    }
}

fn clean_decode<'m>(
    value: &Value,
    member: &'m Member,
    path: &FieldPath,
) -> Option<(&'m Member, TypedValue)> {
    let decoded = decode(value, &member.schema, path).ok()?;
    validate_at(&decoded, &member.schema, path)
        .is_empty()
        .then_some((member, decoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tether_define::{Discriminator, ViolationKind};

    fn login_config() -> Schema {
        Schema::object(
            ObjectSchema::new()
                .renamed(
                    "rbac",
                    "RBAC",
                    Schema::enumeration(["none", "simplified", "external", "internal"]),
                )
                .field("login_url", Schema::string())
                .field("login_cookie_names", Schema::array(Schema::string()))
                .required(["rbac"]),
        )
    }

    fn pet(tag: &str) -> Schema {
        Schema::object(
            ObjectSchema::new()
                .renamed("pet_type", "petType", Schema::enumeration([tag]))
                .field("name", Schema::string())
                .required(["pet_type"]),
        )
    }

    fn pets(unknown: UnknownVariant) -> Schema {
        let mut discriminator = Discriminator::new("petType");
        discriminator.unknown = unknown;
        Schema::one_of(
            UnionSchema::new()
                .member("Cat", pet("cat"))
                .member("Dog", pet("dog"))
                .discriminated_by(discriminator),
        )
    }

    #[test]
    fn wire_names_map_both_ways() {
        let wire = json!({"RBAC": "simplified", "login_url": "/auth/login"});
        let value = decode_checked(&wire, &login_config()).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.get("rbac"), Some(&TypedValue::from("simplified")));
        assert_eq!(encode(&value, &login_config()).unwrap(), wire);
    }

    #[test]
    fn unknown_fields_go_to_additional_bag() {
        let wire = json!({"RBAC": "none", "oidc": {"enabled": true}});
        let value = decode_checked(&wire, &login_config()).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.additional().get("oidc"), Some(&json!({"enabled": true})));
        assert_eq!(encode(&value, &login_config()).unwrap(), wire);
    }

    #[test]
    fn forbidden_additional_property() {
        let schema = Schema::object(
            ObjectSchema::new()
                .field("message", Schema::string())
                .forbid_additional(),
        );
        let err = decode_checked(&json!({"message": "x", "code": 3}), &schema).unwrap_err();
        assert!(matches!(
            err,
            CodecError::UnexpectedAdditionalProperty { name, .. } if name == "code"
        ));
    }

    #[test]
    fn invalid_enum_value_is_not_coerced() {
        let err = decode_checked(&json!({"RBAC": "admin"}), &login_config()).unwrap_err();
        match err {
            CodecError::InvalidEnumValue { path, value, .. } => {
                assert_eq!(path.to_string(), "rbac");
                assert_eq!(value, "admin");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn integer_rejects_fractional_wire_value() {
        let schema = Schema::object(ObjectSchema::new().field("grace_period", Schema::integer()));
        let value = decode_checked(&json!({"grace_period": 2.0}), &schema).unwrap();
        assert_eq!(
            value.as_object().unwrap().get("grace_period"),
            Some(&TypedValue::Integer(2))
        );

        let err = decode_checked(&json!({"grace_period": 2.5}), &schema).unwrap_err();
        match err {
            CodecError::SchemaValidationFailed(violations) => {
                assert_eq!(violations[0].path.to_string(), "grace_period");
                assert!(matches!(violations[0].kind, ViolationKind::TypeMismatch { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn number_schema_keeps_value_width() {
        assert_eq!(encode(&TypedValue::Integer(3), &Schema::number()).unwrap(), json!(3));
        assert_eq!(encode(&TypedValue::Float(3.0), &Schema::number()).unwrap(), json!(3.0));
        assert_eq!(
            decode_checked(&json!(3), &Schema::number()).unwrap(),
            TypedValue::Integer(3)
        );
        assert_eq!(
            decode_checked(&json!(3.0), &Schema::number()).unwrap(),
            TypedValue::Float(3.0)
        );
    }

    #[test]
    fn integer_beyond_i64_is_not_clamped() {
        let schema = Schema::object(ObjectSchema::new().field("n", Schema::integer()));
        let wire: Value = serde_json::from_str(r#"{"n":9223372036854775808}"#).unwrap();

        let decoded = decode(&wire, &schema, &FieldPath::root()).unwrap();
        assert!(matches!(
            decoded.as_object().unwrap().get("n"),
            Some(TypedValue::Float(_))
        ));

        match decode_checked(&wire, &schema).unwrap_err() {
            CodecError::SchemaValidationFailed(violations) => {
                assert_eq!(violations[0].path.to_string(), "n");
                assert!(matches!(violations[0].kind, ViolationKind::TypeMismatch { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }

        let min = serde_json::from_str::<Value>("-9223372036854775808").unwrap();
        assert_eq!(
            decode_checked(&min, &Schema::integer()).unwrap(),
            TypedValue::Integer(i64::MIN)
        );
    }

    #[test]
    fn nan_is_rejected() {
        assert!(matches!(
            encode(&TypedValue::Float(f64::NAN), &Schema::number()),
            Err(CodecError::UnsupportedValue { .. })
        ));
    }

    #[test]
    fn binary_is_base64() {
        let value = TypedValue::bytes(b"\x00\xffdata".to_vec());
        let wire = encode(&value, &Schema::binary()).unwrap();
        assert_eq!(wire, json!("AP9kYXRh"));
        assert_eq!(decode_checked(&wire, &Schema::binary()).unwrap(), value);
        assert!(matches!(
            decode_checked(&json!("***"), &Schema::binary()),
            Err(CodecError::InvalidBinary { .. })
        ));
    }

    #[test]
    fn type_mismatches_are_collected() {
        let err = decode_checked(
            &json!({"RBAC": 1, "login_url": false, "login_cookie_names": ["a", 2]}),
            &login_config(),
        )
        .unwrap_err();
        match err {
            CodecError::SchemaValidationFailed(violations) => {
                let paths: Vec<String> = violations.iter().map(|v| v.path.to_string()).collect();
                assert_eq!(paths, vec!["login_cookie_names[1]", "login_url", "rbac"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn discriminated_union_decodes_to_variant() {
        let value = decode_checked(&json!({"petType": "dog", "name": "Rex"}), &pets(UnknownVariant::Reject))
            .unwrap();
        let variant = value.as_variant().unwrap();
        assert_eq!(variant.member.as_deref(), Some("Dog"));
        assert_eq!(variant.tag.as_deref(), Some("dog"));
        assert_eq!(
            encode(&value, &pets(UnknownVariant::Reject)).unwrap(),
            json!({"petType": "dog", "name": "Rex"})
        );
    }

    #[test]
    fn unknown_discriminator_rejected_or_preserved() {
        let wire = json!({"petType": "bird", "wings": 2});
        let err = decode_checked(&wire, &pets(UnknownVariant::Reject)).unwrap_err();
        assert!(matches!(
            err,
            CodecError::AmbiguousOrUnknownDiscriminator { tag: Some(ref t), .. } if t == "bird"
        ));

        let value = decode_checked(&wire, &pets(UnknownVariant::Preserve)).unwrap();
        let variant = value.as_variant().unwrap();
        assert!(!variant.is_known());
        assert_eq!(variant.value.as_opaque(), Some(&wire));
        assert_eq!(encode(&value, &pets(UnknownVariant::Preserve)).unwrap(), wire);
    }

    #[test]
    fn missing_discriminator_rejected() {
        let err = decode_checked(&json!({"name": "Rex"}), &pets(UnknownVariant::Preserve)).unwrap_err();
        assert!(matches!(
            err,
            CodecError::AmbiguousOrUnknownDiscriminator { tag: None, .. }
        ));
    }

    #[test]
    fn caller_built_object_encodes_through_resolved_member() {
        let value = TypedValue::object(ObjectValue::new().with("pet_type", "cat").with("name", "Tom"));
        assert_eq!(
            encode(&value, &pets(UnknownVariant::Reject)).unwrap(),
            json!({"petType": "cat", "name": "Tom"})
        );
    }

    #[test]
    fn undiscriminated_union_picks_unique_member() {
        let schema = Schema::one_of(
            UnionSchema::new()
                .member("text", Schema::string())
                .member("count", Schema::integer()),
        );
        let value = decode_checked(&json!(5), &schema).unwrap();
        assert_eq!(value.as_variant().and_then(|v| v.member.as_deref()), Some("count"));

        let err = decode_checked(&json!(true), &schema).unwrap_err();
        assert!(matches!(err, CodecError::SchemaValidationFailed(_)));
    }

    #[test]
    fn any_schema_is_opaque() {
        let wire = json!({"anything": [1, "two"]});
        assert_eq!(
            decode_checked(&wire, &Schema::any()).unwrap(),
            TypedValue::Opaque(wire.clone())
        );
    }
}
