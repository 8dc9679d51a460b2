//! Pure validation of typed values against schemas.
//!
//! [`validate`] walks the whole value and reports every violation it finds,
//! each tagged with the [`FieldPath`] it was found at (`a.b[2].c`).

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use thiserror::Error;

use crate::schema::{
    AdditionalProperties, IntegerFormat, ObjectSchema, Schema, SchemaKind, StringFormat,
    UnionSchema, UnknownVariant,
};
use crate::value::{ObjectValue, TypedValue};

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

/// Location of a violation inside a value, displayed as `a.b[2].c`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// A path starting at a named root, such as a parameter name.
    pub fn named(name: impl Into<String>) -> Self {
        Self(vec![PathSegment::Field(name.into())])
    }

    pub fn field(&self, name: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Field(name.into()));
        Self(segments)
    }

    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => f.write_str(name)?,
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{path}: {kind}")]
pub struct ValidationError {
    pub path: FieldPath,
    pub kind: ViolationKind,
}

/// What was wrong at a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViolationKind {
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("missing required field")]
    MissingRequired,

    #[error("value does not match pattern `{pattern}`")]
    PatternMismatch { pattern: String },

    #[error("`{value}` is not one of {allowed:?}")]
    EnumMismatch { value: String, allowed: Vec<String> },

    #[error("out of range: {detail}")]
    OutOfRange { detail: String },

    #[error("value is not a valid {format}")]
    FormatMismatch { format: &'static str },

    #[error("{}", describe_discriminator(.tag.as_deref(), .candidates))]
    AmbiguousOrUnknownDiscriminator {
        tag: Option<String>,
        candidates: Vec<String>,
    },

    #[error("additional property `{name}` is not allowed")]
    UnexpectedAdditionalProperty { name: String },

    #[error("value matches none of the oneOf/anyOf members")]
    NoMatchingMember,

    #[error("value matches several oneOf members: {}", .members.join(", "))]
    AmbiguousMember { members: Vec<String> },
}

fn describe_discriminator(tag: Option<&str>, candidates: &[String]) -> String {
    match (tag, candidates.len()) {
        (None, _) => "discriminator property is missing".to_string(),
        (Some(tag), 0) => format!("unknown discriminator value `{tag}`"),
        (Some(tag), _) => format!(
            "discriminator value `{tag}` is ambiguous between {}",
            candidates.join(", ")
        ),
    }
}

/// Validates `value` against `schema`, returning every violation found.
///
/// ## Examples
///
/// ```
/// use tether_define::{validate, ObjectSchema, ObjectValue, Schema, TypedValue, ViolationKind};
///
/// let schema = Schema::object(
///     ObjectSchema::new()
///         .field("username", Schema::string().min_length(1))
///         .field("email", Schema::string())
///         .required(["username"]),
/// );
///
/// let value = TypedValue::object(ObjectValue::new().with("email", 42));
/// let errors = validate(&value, &schema);
///
/// assert_eq!(errors.len(), 2);
/// assert_eq!(errors[0].path.to_string(), "username");
/// assert_eq!(errors[0].kind, ViolationKind::MissingRequired);
/// assert_eq!(errors[1].path.to_string(), "email");
/// ```
pub fn validate(value: &TypedValue, schema: &Schema) -> Vec<ValidationError> {
    validate_at(value, schema, &FieldPath::root())
}

/// Like [`validate`], with every reported path prefixed by `path`.
pub fn validate_at(value: &TypedValue, schema: &Schema, path: &FieldPath) -> Vec<ValidationError> {
    let mut validator = Validator::default();
    validator.visit(value, schema, path);
    validator.errors
}

#[derive(Default)]
struct Validator {
    errors: Vec<ValidationError>,
}

impl Validator {
    fn push(&mut self, path: &FieldPath, kind: ViolationKind) {
        self.errors.push(ValidationError {
            path: path.clone(),
            kind,
        });
    }

    fn mismatch(&mut self, path: &FieldPath, schema: &Schema, value: &TypedValue) {
        self.push(
            path,
            ViolationKind::TypeMismatch {
                expected: schema.kind.name(),
                found: value.kind_name(),
            },
        );
    }

    fn visit(&mut self, value: &TypedValue, schema: &Schema, path: &FieldPath) {
        if value.is_null() {
            if !schema.nullable && schema.kind != SchemaKind::Any {
                self.mismatch(path, schema, value);
            }
            return;
        }

        match &schema.kind {
            SchemaKind::Any => {}
            SchemaKind::Boolean => {
                if value.as_bool().is_none() {
                    self.mismatch(path, schema, value);
                }
            }
            SchemaKind::Integer(format) => match value {
                TypedValue::Integer(i) => {
                    if *format == IntegerFormat::Int32 && i32::try_from(*i).is_err() {
                        self.push(
                            path,
                            ViolationKind::OutOfRange {
                                detail: format!("{i} does not fit in int32"),
                            },
                        );
                    }
                    self.integer_range(*i, schema, path);
                }
                _ => self.mismatch(path, schema, value),
            },
            SchemaKind::Number => match value {
                TypedValue::Integer(i) => self.integer_range(*i, schema, path),
                TypedValue::Float(f) => self.range(*f, schema, path),
                _ => self.mismatch(path, schema, value),
            },
            SchemaKind::String(format) => match value {
                TypedValue::String(s) => {
                    self.length(s.chars().count(), schema, path);
                    self.pattern(s, schema, path);
                    self.format(s, *format, path);
                }
                _ => self.mismatch(path, schema, value),
            },
            SchemaKind::Binary => match value {
                TypedValue::Bytes(b) => self.length(b.len(), schema, path),
                _ => self.mismatch(path, schema, value),
            },
            SchemaKind::Enum(allowed) => match value {
                TypedValue::String(s) if allowed.contains(s) => {}
                TypedValue::String(s) => self.push(
                    path,
                    ViolationKind::EnumMismatch {
                        value: s.clone(),
                        allowed: allowed.clone(),
                    },
                ),
                _ => self.mismatch(path, schema, value),
            },
            SchemaKind::Array(items) => match value {
                TypedValue::Array(values) => {
                    self.items(values.len(), schema, path);
                    for (i, item) in values.iter().enumerate() {
                        self.visit(item, items, &path.index(i));
                    }
                }
                _ => self.mismatch(path, schema, value),
            },
            SchemaKind::Object(object) => match value {
                TypedValue::Object(o) => self.object(o, object, path),
                _ => self.mismatch(path, schema, value),
            },
            SchemaKind::OneOf(union) => self.one_of(value, union, path),
            SchemaKind::AnyOf(members) => {
                if !members.iter().any(|m| validate_at(value, m, path).is_empty()) {
                    self.push(path, ViolationKind::NoMatchingMember);
                }
            }
            SchemaKind::AllOf(parts) => match schema.object_shape() {
                Ok(Some(shape)) => match value {
                    TypedValue::Object(o) => self.object(o, &shape, path),
                    _ => self.mismatch(path, schema, value),
                },
                _ => {
                    for part in parts {
                        self.visit(value, part, path);
                    }
                }
            },
        }
    }

    fn object(&mut self, value: &ObjectValue, shape: &ObjectSchema, path: &FieldPath) {
        for name in &shape.required {
            if !value.contains(name) {
                self.push(&path.field(name), ViolationKind::MissingRequired);
            }
        }
        let forbid = shape.additional == AdditionalProperties::Forbid;
        for (name, field_value) in value.fields() {
            match shape.get(name) {
                Some(field) => self.visit(field_value, &field.schema, &path.field(name)),
                None if forbid => self.push(
                    path,
                    ViolationKind::UnexpectedAdditionalProperty {
                        name: name.to_string(),
                    },
                ),
                None => {}
            }
        }
        if forbid {
            for name in value.additional().keys() {
                self.push(
                    path,
                    ViolationKind::UnexpectedAdditionalProperty { name: name.clone() },
                );
            }
        }
    }

    fn one_of(&mut self, value: &TypedValue, union: &UnionSchema, path: &FieldPath) {
        let preserve_unknown = union
            .discriminator
            .as_ref()
            .is_some_and(|d| d.unknown == UnknownVariant::Preserve);

        if let TypedValue::Variant(variant) = value {
            match variant.member.as_deref().and_then(|name| union.get(name)) {
                Some(member) => self.visit(&variant.value, &member.schema, path),
                None if variant.member.is_none() && preserve_unknown => {}
                None => self.push(
                    path,
                    ViolationKind::AmbiguousOrUnknownDiscriminator {
                        tag: variant.tag.clone(),
                        candidates: Vec::new(),
                    },
                ),
            }
            return;
        }

        if union.discriminator.is_some() {
            let Some(tag) = value.as_object().and_then(|o| union.tag_of(o)) else {
                self.push(
                    path,
                    ViolationKind::AmbiguousOrUnknownDiscriminator {
                        tag: None,
                        candidates: Vec::new(),
                    },
                );
                return;
            };
            let candidates = union.candidates(&tag);
            if candidates.is_empty() && preserve_unknown {
                return;
            }
            if let [member] = candidates.as_slice() {
                self.visit(value, &member.schema, path);
                return;
            }
            // Several members claim the tag: only a unique valid one resolves it.
            let valid: Vec<_> = candidates
                .iter()
                .filter(|m| validate_at(value, &m.schema, path).is_empty())
                .collect();
            if valid.len() != 1 {
                self.push(
                    path,
                    ViolationKind::AmbiguousOrUnknownDiscriminator {
                        tag: Some(tag),
                        candidates: candidates.iter().map(|m| m.name.clone()).collect(),
                    },
                );
            }
            return;
        }

        let matched: Vec<String> = union
            .members
            .iter()
            .filter(|m| validate_at(value, &m.schema, path).is_empty())
            .map(|m| m.name.clone())
            .collect();
        match matched.len() {
            1 => {}
            0 => self.push(path, ViolationKind::NoMatchingMember),
            _ => self.push(path, ViolationKind::AmbiguousMember { members: matched }),
        }
    }

    fn range(&mut self, n: f64, schema: &Schema, path: &FieldPath) {
        if let Some(min) = schema.constraints.minimum {
            if n < min {
                self.push(
                    path,
                    ViolationKind::OutOfRange {
                        detail: format!("{n} is less than minimum {min}"),
                    },
                );
            }
        }
        if let Some(max) = schema.constraints.maximum {
            if n > max {
                self.push(
                    path,
                    ViolationKind::OutOfRange {
                        detail: format!("{n} is greater than maximum {max}"),
                    },
                );
            }
        }
    }

    /// Bounds checks for integers, compared in `i64` so values above 2^53
    /// keep their precision.
    fn integer_range(&mut self, i: i64, schema: &Schema, path: &FieldPath) {
        if let Some(min) = schema.constraints.minimum {
            if below(i, min) {
                self.push(
                    path,
                    ViolationKind::OutOfRange {
                        detail: format!("{i} is less than minimum {min}"),
                    },
                );
            }
        }
        if let Some(max) = schema.constraints.maximum {
            if above(i, max) {
                self.push(
                    path,
                    ViolationKind::OutOfRange {
                        detail: format!("{i} is greater than maximum {max}"),
                    },
                );
            }
        }
    }

    fn length(&mut self, len: usize, schema: &Schema, path: &FieldPath) {
        if let Some(min) = schema.constraints.min_length {
            if len < min {
                self.push(
                    path,
                    ViolationKind::OutOfRange {
                        detail: format!("length {len} is below minLength {min}"),
                    },
                );
            }
        }
        if let Some(max) = schema.constraints.max_length {
            if len > max {
                self.push(
                    path,
                    ViolationKind::OutOfRange {
                        detail: format!("length {len} exceeds maxLength {max}"),
                    },
                );
            }
        }
    }

    fn items(&mut self, len: usize, schema: &Schema, path: &FieldPath) {
        if let Some(min) = schema.constraints.min_items {
            if len < min {
                self.push(
                    path,
                    ViolationKind::OutOfRange {
                        detail: format!("{len} items, minItems is {min}"),
                    },
                );
            }
        }
        if let Some(max) = schema.constraints.max_items {
            if len > max {
                self.push(
                    path,
                    ViolationKind::OutOfRange {
                        detail: format!("{len} items, maxItems is {max}"),
                    },
                );
            }
        }
    }

    fn pattern(&mut self, s: &str, schema: &Schema, path: &FieldPath) {
        let Some(pattern) = &schema.constraints.pattern else {
            return;
        };
        let matched = pattern.regex().is_some_and(|re| re.is_match(s));
        if !matched {
            self.push(
                path,
                ViolationKind::PatternMismatch {
                    pattern: pattern.as_str().to_string(),
                },
            );
        }
    }

    fn format(&mut self, s: &str, format: StringFormat, path: &FieldPath) {
        let valid = match format {
            StringFormat::Plain | StringFormat::Password => true,
            StringFormat::Date => chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok(),
            StringFormat::DateTime => chrono::DateTime::parse_from_rfc3339(s).is_ok(),
            StringFormat::Email => EMAIL_RE.is_match(s),
            StringFormat::Uuid => uuid::Uuid::parse_str(s).is_ok(),
            StringFormat::Uri => url::Url::parse(s).is_ok(),
        };
        if !valid {
            self.push(
                path,
                ViolationKind::FormatMismatch {
                    format: format.name(),
                },
            );
        }
    }
}

/// 2^63, the first whole `f64` outside the `i64` range.
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// `i < min`, exact for every `i64`.
fn below(i: i64, min: f64) -> bool {
    let min = min.ceil();
    if min.is_nan() || min < -I64_LIMIT {
        false
    } else if min >= I64_LIMIT {
        true
    } else {
        i < min as i64
    }
}

/// `i > max`, exact for every `i64`.
fn above(i: i64, max: f64) -> bool {
    let max = max.floor();
    if max.is_nan() || max >= I64_LIMIT {
        false
    } else if max < -I64_LIMIT {
        true
    } else {
        i > max as i64
    }
}

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@",
        r"[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?",
        r"(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    ))
    .expect("Invalid email regex")
});

/// Returns `true` when [`validate`] reports nothing.
pub fn is_valid(value: &TypedValue, schema: &Schema) -> bool {
    validate(value, schema).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Discriminator, UnionSchema};
    use crate::value::Variant;

    fn kinds(errors: &[ValidationError]) -> Vec<(String, ViolationKind)> {
        errors
            .iter()
            .map(|e| (e.path.to_string(), e.kind.clone()))
            .collect()
    }

    fn pet(tag: &str, extra: &str) -> Schema {
        Schema::object(
            ObjectSchema::new()
                .renamed("pet_type", "petType", Schema::enumeration([tag]))
                .field(extra, Schema::string())
                .required(["pet_type"]),
        )
    }

    fn pets() -> UnionSchema {
        UnionSchema::new()
            .member("Cat", pet("cat", "purr"))
            .member("Dog", pet("dog", "bark"))
            .discriminated_by(Discriminator::new("petType"))
    }

    #[test]
    fn path_display() {
        let path = FieldPath::named("a").field("b").index(2).field("c");
        assert_eq!(path.to_string(), "a.b[2].c");
        assert_eq!(FieldPath::root().to_string(), "<root>");
        assert_eq!(FieldPath::root().index(0).to_string(), "[0]");
    }

    #[test]
    fn reports_every_violation_with_paths() {
        let schema = Schema::object(
            ObjectSchema::new()
                .field(
                    "tags",
                    Schema::array(Schema::string().pattern("^[a-z]+$")).max_items(2),
                )
                .field("count", Schema::integer().minimum(0.0))
                .field("name", Schema::string())
                .required(["name"]),
        );
        let value = TypedValue::object(
            ObjectValue::new()
                .with("tags", TypedValue::array(["ok", "NOPE", "fine"]))
                .with("count", -1),
        );

        let errors = kinds(&validate(&value, &schema));
        assert_eq!(errors.len(), 4);
        assert_eq!(errors[0], ("name".into(), ViolationKind::MissingRequired));
        assert!(matches!(errors[1].1, ViolationKind::OutOfRange { .. }));
        assert_eq!(errors[1].0, "count");
        assert!(matches!(errors[2].1, ViolationKind::OutOfRange { .. }));
        assert_eq!(errors[2].0, "tags");
        assert_eq!(errors[3].0, "tags[1]");
        assert!(matches!(errors[3].1, ViolationKind::PatternMismatch { .. }));
    }

    #[test]
    fn null_respects_nullable() {
        assert_eq!(validate(&TypedValue::Null, &Schema::string()).len(), 1);
        assert!(validate(&TypedValue::Null, &Schema::string().nullable()).is_empty());
        assert!(validate(&TypedValue::Null, &Schema::any()).is_empty());
    }

    #[test]
    fn integer_rejects_float_and_checks_int32() {
        let errors = validate(&TypedValue::Float(1.5), &Schema::integer());
        assert!(matches!(
            errors[0].kind,
            ViolationKind::TypeMismatch {
                expected: "integer",
                found: "number"
            }
        ));
        let errors = validate(&TypedValue::Integer(i64::from(i32::MAX) + 1), &Schema::int32());
        assert!(matches!(errors[0].kind, ViolationKind::OutOfRange { .. }));
    }

    #[test]
    fn number_accepts_integers() {
        assert!(is_valid(&TypedValue::Integer(3), &Schema::number()));
    }

    #[test]
    fn enum_mismatch() {
        let schema = Schema::enumeration(["initialized", "not_initialized"]);
        assert!(is_valid(&"initialized".into(), &schema));
        let errors = validate(&"broken".into(), &schema);
        assert!(matches!(
            &errors[0].kind,
            ViolationKind::EnumMismatch { value, .. } if value == "broken"
        ));
    }

    #[test]
    fn string_formats() {
        assert!(is_valid(&"2024-02-29".into(), &Schema::formatted(StringFormat::Date)));
        assert!(!is_valid(&"2023-02-29".into(), &Schema::formatted(StringFormat::Date)));
        assert!(is_valid(
            &"2024-01-01T10:00:00Z".into(),
            &Schema::formatted(StringFormat::DateTime)
        ));
        assert!(is_valid(&"ops@example.com".into(), &Schema::formatted(StringFormat::Email)));
        assert!(!is_valid(&"ops.example.com".into(), &Schema::formatted(StringFormat::Email)));
        assert!(is_valid(
            &"123e4567-e89b-12d3-a456-426614174000".into(),
            &Schema::formatted(StringFormat::Uuid)
        ));
        assert!(is_valid(&"s3://bucket/prefix".into(), &Schema::formatted(StringFormat::Uri)));
        assert!(!is_valid(&"bucket/prefix".into(), &Schema::formatted(StringFormat::Uri)));
    }

    #[test]
    fn malformed_uris_and_uuids() {
        let uri = Schema::formatted(StringFormat::Uri);
        for bad in ["http://exa mple.com", "http://[::1", "://missing-scheme"] {
            let errors = validate(&bad.into(), &uri);
            assert_eq!(errors.len(), 1, "{bad}");
            assert_eq!(errors[0].kind, ViolationKind::FormatMismatch { format: "uri" });
        }

        let uuid = Schema::formatted(StringFormat::Uuid);
        assert!(!is_valid(&"123e4567-e89b-12d3-a456-42661417400g".into(), &uuid));
        assert!(!is_valid(&"123e4567-e89b-12d3-a456".into(), &uuid));
        assert!(!is_valid(&"ops@localhost".into(), &Schema::formatted(StringFormat::Email)));
    }

    #[test]
    fn integer_bounds_are_exact_above_two_to_the_53() {
        let limit = 9_007_199_254_740_993_i64;
        let schema = Schema::integer().maximum(9_007_199_254_740_992.0);
        assert!(is_valid(&TypedValue::Integer(limit - 1), &schema));
        assert!(!is_valid(&TypedValue::Integer(limit), &schema));

        let schema = Schema::integer().minimum(1.5).maximum(i64::MAX as f64);
        assert!(!is_valid(&TypedValue::Integer(1), &schema));
        assert!(is_valid(&TypedValue::Integer(2), &schema));
        assert!(is_valid(&TypedValue::Integer(i64::MAX), &schema));

        let number = Schema::number().maximum(9_007_199_254_740_992.0);
        assert!(!is_valid(&TypedValue::Integer(limit), &number));
    }

    #[test]
    fn forbidden_additional_properties() {
        let schema = Schema::object(
            ObjectSchema::new()
                .field("a", Schema::string())
                .forbid_additional(),
        );
        let value = TypedValue::object(
            ObjectValue::new()
                .with("a", "x")
                .with("b", 1)
                .with_additional("c", serde_json::json!(true)),
        );
        let errors = kinds(&validate(&value, &schema));
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|(_, k)| matches!(
            k,
            ViolationKind::UnexpectedAdditionalProperty { .. }
        )));
    }

    #[test]
    fn discriminator_selects_single_member() {
        let schema = Schema::one_of(pets());
        let value = TypedValue::object(ObjectValue::new().with("pet_type", "cat").with("purr", "loud"));
        assert!(validate(&value, &schema).is_empty());
    }

    #[test]
    fn discriminator_unknown_tag() {
        let schema = Schema::one_of(pets());
        let value = TypedValue::object(ObjectValue::new().with("pet_type", "bird"));
        let errors = validate(&value, &schema);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].kind,
            ViolationKind::AmbiguousOrUnknownDiscriminator {
                tag: Some("bird".into()),
                candidates: vec![]
            }
        );
    }

    #[test]
    fn discriminator_ambiguous_tag() {
        let union = UnionSchema::new()
            .member("Cat", pet("cat", "purr"))
            .member("Lion", pet("cat", "roar"))
            .discriminated_by(Discriminator::new("petType"));
        let value = TypedValue::object(ObjectValue::new().with("pet_type", "cat"));
        let errors = validate(&value, &Schema::one_of(union));
        assert!(matches!(
            &errors[0].kind,
            ViolationKind::AmbiguousOrUnknownDiscriminator { candidates, .. } if candidates.len() == 2
        ));
    }

    #[test]
    fn discriminator_missing_tag() {
        let value = TypedValue::object(ObjectValue::new().with("purr", "soft"));
        let errors = validate(&value, &Schema::one_of(pets()));
        assert_eq!(
            errors[0].kind,
            ViolationKind::AmbiguousOrUnknownDiscriminator {
                tag: None,
                candidates: vec![]
            }
        );
    }

    #[test]
    fn preserved_unknown_variant_is_valid() {
        let union = UnionSchema::new()
            .member("Cat", pet("cat", "purr"))
            .discriminated_by(Discriminator::new("petType").preserve_unknown());
        let value = TypedValue::Variant(Variant::unknown(
            Some("bird".into()),
            serde_json::json!({"petType": "bird"}),
        ));
        assert!(validate(&value, &Schema::one_of(union)).is_empty());
    }

    #[test]
    fn resolved_variant_validates_member() {
        let inner = TypedValue::object(ObjectValue::new().with("pet_type", "dog").with("bark", 3));
        let value = TypedValue::Variant(Variant::known("Dog", Some("dog".into()), inner));
        let errors = validate(&value, &Schema::one_of(pets()));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path.to_string(), "bark");
    }

    #[test]
    fn one_of_without_discriminator() {
        let union = UnionSchema::new()
            .member("text", Schema::string())
            .member("count", Schema::integer());
        let schema = Schema::one_of(union);
        assert!(is_valid(&"x".into(), &schema));
        assert_eq!(
            validate(&TypedValue::Bool(true), &schema)[0].kind,
            ViolationKind::NoMatchingMember
        );

        let overlapping = Schema::one_of(
            UnionSchema::new()
                .member("a", Schema::number())
                .member("b", Schema::integer()),
        );
        assert!(matches!(
            validate(&TypedValue::Integer(1), &overlapping)[0].kind,
            ViolationKind::AmbiguousMember { .. }
        ));
    }

    #[test]
    fn all_of_requires_every_part() {
        let schema = Schema::all_of(vec![
            Schema::object(ObjectSchema::new().field("id", Schema::string()).required(["id"])),
            Schema::object(ObjectSchema::new().field("size", Schema::integer()).required(["size"])),
        ]);
        let value = TypedValue::object(ObjectValue::new().with("id", "x"));
        let errors = kinds(&validate(&value, &schema));
        assert_eq!(errors, vec![("size".to_string(), ViolationKind::MissingRequired)]);
    }

    #[test]
    fn all_of_on_primitives_checks_each_part() {
        let schema = Schema::all_of(vec![
            Schema::string().min_length(3),
            Schema::string().pattern("^a"),
        ]);
        assert_eq!(validate(&"bc".into(), &schema).len(), 2);
        assert!(is_valid(&"abc".into(), &schema));
    }

    #[test]
    fn any_of_needs_one_match() {
        let schema = Schema::any_of(vec![Schema::string(), Schema::boolean()]);
        assert!(is_valid(&TypedValue::Bool(false), &schema));
        assert!(!is_valid(&TypedValue::Integer(1), &schema));
    }
}
