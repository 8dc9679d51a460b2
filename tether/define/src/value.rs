//! Dynamic values conforming to a [`Schema`](crate::Schema).
//!
//! Callers build [`TypedValue`]s for request arguments; the deserializer
//! produces them from response bodies. Object keys are in-memory field names,
//! the schema maps them to wire names.

use std::collections::BTreeMap;

/// A value shaped by a schema.
///
/// ## Examples
///
/// ```
/// use tether_define::{ObjectValue, TypedValue};
///
/// let value = TypedValue::object(
///     ObjectValue::new()
///         .with("username", "admin")
///         .with("grace_period", 3600),
/// );
///
/// let object = value.as_object().unwrap();
/// assert_eq!(object.get("username").and_then(TypedValue::as_str), Some("admin"));
/// assert_eq!(object.get("grace_period").and_then(TypedValue::as_i64), Some(3600));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<TypedValue>),
    Object(ObjectValue),
    /// A resolved member of a polymorphic (oneOf) schema.
    Variant(Variant),
    /// Raw decoded JSON that was not checked against any schema.
    Opaque(serde_json::Value),
}

impl TypedValue {
    pub fn object(value: ObjectValue) -> Self {
        Self::Object(value)
    }

    pub fn bytes(value: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(value.into())
    }

    pub fn array<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<TypedValue>,
    {
        Self::Array(items.into_iter().map(Into::into).collect())
    }

    /// Short name of the value's shape, used in type-mismatch reports.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "number",
            Self::String(_) => "string",
            Self::Bytes(_) => "binary",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Variant(_) => "variant",
            Self::Opaque(_) => "opaque",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of integers and floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[TypedValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Object view; a resolved variant exposes its member's object.
    pub fn as_object(&self) -> Option<&ObjectValue> {
        match self {
            Self::Object(o) => Some(o),
            Self::Variant(v) => v.value.as_object(),
            _ => None,
        }
    }

    pub fn as_variant(&self) -> Option<&Variant> {
        match self {
            Self::Variant(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_opaque(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Opaque(v) => Some(v),
            _ => None,
        }
    }

    /// Renders a primitive as the text used in paths, queries, headers and forms.
    ///
    /// Returns `None` for containers and binary data.
    pub fn to_plain_string(&self) -> Option<String> {
        match self {
            Self::Null => Some(String::new()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Integer(i) => Some(i.to_string()),
            // `{:?}` keeps the `.0` on whole floats so they read back as floats.
            Self::Float(f) => Some(format!("{f:?}")),
            Self::String(s) => Some(s.clone()),
            Self::Opaque(serde_json::Value::String(s)) => Some(s.clone()),
            Self::Opaque(v) if !v.is_object() && !v.is_array() => Some(v.to_string()),
            Self::Variant(v) => v.value.to_plain_string(),
            _ => None,
        }
    }
}

impl From<bool> for TypedValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for TypedValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for TypedValue {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<u32> for TypedValue {
    fn from(value: u32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<f64> for TypedValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for TypedValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for TypedValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<ObjectValue> for TypedValue {
    fn from(value: ObjectValue) -> Self {
        Self::Object(value)
    }
}

impl From<Vec<TypedValue>> for TypedValue {
    fn from(value: Vec<TypedValue>) -> Self {
        Self::Array(value)
    }
}

impl<T: Into<TypedValue>> From<Option<T>> for TypedValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Keyed field values plus the "additional properties" side bag.
///
/// Declared fields are keyed by in-memory name. Unknown wire fields that the
/// schema allows are kept verbatim in [`additional`](ObjectValue::additional)
/// under their wire name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectValue {
    fields: BTreeMap<String, TypedValue>,
    additional: BTreeMap<String, serde_json::Value>,
}

impl ObjectValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<TypedValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Builder-style insert into the additional-properties bag.
    pub fn with_additional(mut self, wire_name: impl Into<String>, value: serde_json::Value) -> Self {
        self.additional.insert(wire_name.into(), value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<TypedValue>) -> Option<TypedValue> {
        self.fields.insert(name.into(), value.into())
    }

    pub fn insert_additional(
        &mut self,
        wire_name: impl Into<String>,
        value: serde_json::Value,
    ) -> Option<serde_json::Value> {
        self.additional.insert(wire_name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        self.fields.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<TypedValue> {
        self.fields.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn additional(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.additional
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.additional.is_empty()
    }
}

/// A decoded member of a oneOf union.
///
/// `member` is `None` for an unknown variant kept under
/// [`UnknownVariant::Preserve`](crate::UnknownVariant::Preserve); its `value`
/// is then the raw [`TypedValue::Opaque`] payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub member: Option<String>,
    pub tag: Option<String>,
    pub value: Box<TypedValue>,
}

impl Variant {
    pub fn known(member: impl Into<String>, tag: Option<String>, value: TypedValue) -> Self {
        Self {
            member: Some(member.into()),
            tag,
            value: Box::new(value),
        }
    }

    pub fn unknown(tag: Option<String>, raw: serde_json::Value) -> Self {
        Self {
            member: None,
            tag,
            value: Box::new(TypedValue::Opaque(raw)),
        }
    }

    pub fn is_known(&self) -> bool {
        self.member.is_some()
    }
}
