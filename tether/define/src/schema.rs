//! Schema model for parameter, request-body and response shapes.
//!
//! A [`Schema`] is a tree of [`SchemaKind`] nodes plus constraints. Schemas
//! are built once, checked with [`Schema::check`] when the owning endpoint
//! descriptor is built, and then shared read-only by every call.
//!
//! ## Examples
//!
//! ```
//! use tether_define::{ObjectSchema, Schema};
//!
//! let login_config = Schema::object(
//!     ObjectSchema::new()
//!         .renamed("rbac", "RBAC", Schema::enumeration(["none", "simplified"]))
//!         .field("login_url", Schema::string())
//!         .required(["rbac"]),
//! );
//!
//! assert!(login_config.check().is_ok());
//! ```

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::DefinitionError;
use crate::value::ObjectValue;

/// Width of an integer schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegerFormat {
    Int32,
    #[default]
    Int64,
}

/// Declared `format` of a string schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StringFormat {
    #[default]
    Plain,
    Date,
    DateTime,
    Email,
    Uuid,
    Uri,
    Password,
}

impl StringFormat {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Plain => "string",
            Self::Date => "date",
            Self::DateTime => "date-time",
            Self::Email => "email",
            Self::Uuid => "uuid",
            Self::Uri => "uri",
            Self::Password => "password",
        }
    }
}

/// A `pattern` constraint, compiled on first use.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    compiled: OnceLock<Option<Regex>>,
}

impl Pattern {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            compiled: OnceLock::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The compiled expression, `None` if the source is not a valid regex.
    pub fn regex(&self) -> Option<&Regex> {
        self.compiled
            .get_or_init(|| Regex::new(&self.source).ok())
            .as_ref()
    }

    fn check(&self) -> Result<(), DefinitionError> {
        Regex::new(&self.source)
            .map(|_| ())
            .map_err(|e| DefinitionError::InvalidPattern {
                pattern: self.source.clone(),
                reason: e.to_string(),
            })
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// Validation constraints attached to any schema node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Pattern>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
}

impl Constraints {
    /// No constraints at all.
    pub const NONE: Constraints = Constraints {
        minimum: None,
        maximum: None,
        min_length: None,
        max_length: None,
        pattern: None,
        min_items: None,
        max_items: None,
    };

    fn check(&self) -> Result<(), DefinitionError> {
        if let (Some(min), Some(max)) = (self.minimum, self.maximum) {
            if min > max {
                return Err(DefinitionError::InvalidConstraint {
                    reason: format!("minimum {min} exceeds maximum {max}"),
                });
            }
        }
        if let (Some(min), Some(max)) = (self.min_length, self.max_length) {
            if min > max {
                return Err(DefinitionError::InvalidConstraint {
                    reason: format!("minLength {min} exceeds maxLength {max}"),
                });
            }
        }
        if let (Some(min), Some(max)) = (self.min_items, self.max_items) {
            if min > max {
                return Err(DefinitionError::InvalidConstraint {
                    reason: format!("minItems {min} exceeds maxItems {max}"),
                });
            }
        }
        if let Some(pattern) = &self.pattern {
            pattern.check()?;
        }
        Ok(())
    }
}

/// What the object codec does with wire fields the schema does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdditionalProperties {
    /// Keep them in the value's additional-properties bag.
    #[default]
    Preserve,
    /// Reject them with `UnexpectedAdditionalProperty`.
    Forbid,
}

/// What decoding does with a discriminator value that selects no member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownVariant {
    /// Fail with `AmbiguousOrUnknownDiscriminator`.
    #[default]
    Reject,
    /// Decode into an unknown [`Variant`](crate::Variant) holding the raw data.
    Preserve,
}

/// A schema node.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub kind: SchemaKind,
    pub nullable: bool,
    pub constraints: Constraints,
}

/// The shape a schema node describes.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    /// Anything, unchecked.
    Any,
    Boolean,
    Integer(IntegerFormat),
    Number,
    String(StringFormat),
    Binary,
    /// A closed set of string members.
    Enum(Vec<String>),
    Array(Box<Schema>),
    Object(ObjectSchema),
    OneOf(UnionSchema),
    AnyOf(Vec<Schema>),
    AllOf(Vec<Schema>),
}

impl SchemaKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Boolean => "boolean",
            Self::Integer(_) => "integer",
            Self::Number => "number",
            Self::String(_) => "string",
            Self::Binary => "binary",
            Self::Enum(_) => "enum",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::OneOf(_) => "oneOf",
            Self::AnyOf(_) => "anyOf",
            Self::AllOf(_) => "allOf",
        }
    }
}

impl Schema {
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            nullable: false,
            constraints: Constraints::default(),
        }
    }

    pub const fn any() -> Self {
        Self {
            kind: SchemaKind::Any,
            nullable: false,
            constraints: Constraints::NONE,
        }
    }

    pub fn boolean() -> Self {
        Self::new(SchemaKind::Boolean)
    }

    /// A 64-bit integer.
    pub fn integer() -> Self {
        Self::new(SchemaKind::Integer(IntegerFormat::Int64))
    }

    pub fn int32() -> Self {
        Self::new(SchemaKind::Integer(IntegerFormat::Int32))
    }

    pub fn number() -> Self {
        Self::new(SchemaKind::Number)
    }

    pub fn string() -> Self {
        Self::new(SchemaKind::String(StringFormat::Plain))
    }

    pub fn formatted(format: StringFormat) -> Self {
        Self::new(SchemaKind::String(format))
    }

    pub fn binary() -> Self {
        Self::new(SchemaKind::Binary)
    }

    pub fn enumeration<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(SchemaKind::Enum(members.into_iter().map(Into::into).collect()))
    }

    pub fn array(items: Schema) -> Self {
        Self::new(SchemaKind::Array(Box::new(items)))
    }

    pub fn object(object: ObjectSchema) -> Self {
        Self::new(SchemaKind::Object(object))
    }

    pub fn one_of(union: UnionSchema) -> Self {
        Self::new(SchemaKind::OneOf(union))
    }

    pub fn any_of(members: Vec<Schema>) -> Self {
        Self::new(SchemaKind::AnyOf(members))
    }

    pub fn all_of(parts: Vec<Schema>) -> Self {
        Self::new(SchemaKind::AllOf(parts))
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn minimum(mut self, minimum: f64) -> Self {
        self.constraints.minimum = Some(minimum);
        self
    }

    pub fn maximum(mut self, maximum: f64) -> Self {
        self.constraints.maximum = Some(maximum);
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.constraints.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.constraints.max_length = Some(max);
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.constraints.pattern = Some(Pattern::new(pattern));
        self
    }

    pub fn min_items(mut self, min: usize) -> Self {
        self.constraints.min_items = Some(min);
        self
    }

    pub fn max_items(mut self, max: usize) -> Self {
        self.constraints.max_items = Some(max);
        self
    }

    /// Checks construction invariants for this node and everything below it.
    ///
    /// ## Errors
    ///
    /// - required field names must be declared fields
    /// - a discriminator property must be a field of every oneOf member
    /// - allOf parts must not declare one field with different schemas
    /// - patterns must compile and bounds must be ordered
    pub fn check(&self) -> Result<(), DefinitionError> {
        self.constraints.check()?;
        match &self.kind {
            SchemaKind::Enum(members) if members.is_empty() => Err(DefinitionError::EmptyEnum),
            SchemaKind::Array(items) => items.check().map_err(|e| e.within("items")),
            SchemaKind::Object(object) => object.check(),
            SchemaKind::OneOf(union) => union.check(),
            SchemaKind::AnyOf(members) => check_members(members, "anyOf"),
            SchemaKind::AllOf(parts) => {
                check_members(parts, "allOf")?;
                self.object_shape().map(|_| ())
            }
            _ => Ok(()),
        }
    }

    /// The object field set this schema describes, merging allOf parts.
    ///
    /// Returns `Ok(None)` when the schema is not object-shaped.
    pub fn object_shape(&self) -> Result<Option<ObjectSchema>, DefinitionError> {
        match &self.kind {
            SchemaKind::Object(object) => Ok(Some(object.clone())),
            SchemaKind::AllOf(parts) => {
                let mut merged = ObjectSchema::new();
                for part in parts {
                    let Some(shape) = part.object_shape()? else {
                        return Ok(None);
                    };
                    merged.absorb(shape)?;
                }
                Ok(Some(merged))
            }
            _ => Ok(None),
        }
    }
}

fn check_members(members: &[Schema], label: &str) -> Result<(), DefinitionError> {
    if members.is_empty() {
        return Err(DefinitionError::EmptyComposite);
    }
    for (i, member) in members.iter().enumerate() {
        member.check().map_err(|e| e.within(format!("{label}[{i}]")))?;
    }
    Ok(())
}

/// One declared object field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// In-memory identifier.
    pub name: String,
    /// Name on the wire.
    pub wire_name: String,
    pub schema: Schema,
}

/// Declared fields of an object schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    pub fields: Vec<Field>,
    /// In-memory names of required fields.
    pub required: Vec<String>,
    pub additional: AdditionalProperties,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field whose wire name equals its in-memory name.
    pub fn field(self, name: impl Into<String>, schema: Schema) -> Self {
        let name = name.into();
        self.renamed(name.clone(), name, schema)
    }

    /// Adds a field with a distinct wire name.
    pub fn renamed(
        mut self,
        name: impl Into<String>,
        wire_name: impl Into<String>,
        schema: Schema,
    ) -> Self {
        self.fields.push(Field {
            name: name.into(),
            wire_name: wire_name.into(),
            schema,
        });
        self
    }

    pub fn required<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into();
            if !self.required.contains(&name) {
                self.required.push(name);
            }
        }
        self
    }

    pub fn forbid_additional(mut self) -> Self {
        self.additional = AdditionalProperties::Forbid;
        self
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn get_by_wire(&self, wire_name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.wire_name == wire_name)
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    fn check(&self) -> Result<(), DefinitionError> {
        for (i, field) in self.fields.iter().enumerate() {
            let duplicate = self.fields[..i]
                .iter()
                .any(|f| f.name == field.name || f.wire_name == field.wire_name);
            if duplicate {
                return Err(DefinitionError::DuplicateField {
                    field: field.name.clone(),
                });
            }
            field.schema.check().map_err(|e| e.within(&field.name))?;
        }
        if let Some(missing) = self.required.iter().find(|r| self.get(r).is_none()) {
            return Err(DefinitionError::RequiredNotDeclared {
                field: missing.clone(),
            });
        }
        Ok(())
    }

    fn absorb(&mut self, other: ObjectSchema) -> Result<(), DefinitionError> {
        for field in other.fields {
            match self.get(&field.name) {
                Some(existing) if existing != &field => {
                    return Err(DefinitionError::ConflictingAllOf { field: field.name });
                }
                Some(_) => {}
                None => self.fields.push(field),
            }
        }
        for name in other.required {
            if !self.required.contains(&name) {
                self.required.push(name);
            }
        }
        if other.additional == AdditionalProperties::Forbid {
            self.additional = AdditionalProperties::Forbid;
        }
        Ok(())
    }
}

/// A named member of a oneOf union.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub name: String,
    pub schema: Schema,
}

/// Selects a oneOf member by the value of one property.
#[derive(Debug, Clone, PartialEq)]
pub struct Discriminator {
    /// Wire name of the tag property.
    pub property: String,
    /// Explicit tag value to member name mapping.
    pub mapping: BTreeMap<String, String>,
    pub unknown: UnknownVariant,
}

impl Discriminator {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            mapping: BTreeMap::new(),
            unknown: UnknownVariant::Reject,
        }
    }

    pub fn map(mut self, tag: impl Into<String>, member: impl Into<String>) -> Self {
        self.mapping.insert(tag.into(), member.into());
        self
    }

    pub fn preserve_unknown(mut self) -> Self {
        self.unknown = UnknownVariant::Preserve;
        self
    }
}

/// Members of a oneOf schema and its optional discriminator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnionSchema {
    pub members: Vec<Member>,
    pub discriminator: Option<Discriminator>,
}

impl UnionSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn member(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.members.push(Member {
            name: name.into(),
            schema,
        });
        self
    }

    pub fn discriminated_by(mut self, discriminator: Discriminator) -> Self {
        self.discriminator = Some(discriminator);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Reads the discriminator tag from an in-memory object value.
    pub fn tag_of(&self, value: &ObjectValue) -> Option<String> {
        let property = &self.discriminator.as_ref()?.property;
        for member in &self.members {
            let Ok(Some(shape)) = member.schema.object_shape() else {
                continue;
            };
            if let Some(field) = shape.get_by_wire(property) {
                if let Some(tag) = value.get(&field.name).and_then(|v| v.as_str()) {
                    return Some(tag.to_string());
                }
            }
        }
        value
            .additional()
            .get(property)
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }

    /// Members selected by a discriminator tag.
    ///
    /// An explicit mapping wins; otherwise a member matches when its name
    /// equals the tag or its tag field is an enum containing the tag. The
    /// result is empty when the union has no discriminator.
    pub fn candidates(&self, tag: &str) -> Vec<&Member> {
        let Some(discriminator) = &self.discriminator else {
            return Vec::new();
        };
        if let Some(target) = discriminator.mapping.get(tag) {
            return self.members.iter().filter(|m| &m.name == target).collect();
        }
        self.members
            .iter()
            .filter(|m| m.name == tag || declares_tag(m, &discriminator.property, tag))
            .collect()
    }

    fn check(&self) -> Result<(), DefinitionError> {
        if self.members.is_empty() {
            return Err(DefinitionError::EmptyComposite);
        }
        for (i, member) in self.members.iter().enumerate() {
            if self.members[..i].iter().any(|m| m.name == member.name) {
                return Err(DefinitionError::DuplicateField {
                    field: member.name.clone(),
                });
            }
            member
                .schema
                .check()
                .map_err(|e| e.within(&member.name))?;
        }
        let Some(discriminator) = &self.discriminator else {
            return Ok(());
        };
        for member in &self.members {
            let has_property = member
                .schema
                .object_shape()?
                .is_some_and(|shape| shape.get_by_wire(&discriminator.property).is_some());
            if !has_property {
                return Err(DefinitionError::DiscriminatorNotInMember {
                    property: discriminator.property.clone(),
                    member: member.name.clone(),
                });
            }
        }
        for (tag, target) in &discriminator.mapping {
            if self.get(target).is_none() {
                return Err(DefinitionError::UnknownMappingTarget {
                    tag: tag.clone(),
                    member: target.clone(),
                });
            }
        }
        Ok(())
    }
}

fn declares_tag(member: &Member, property: &str, tag: &str) -> bool {
    let Ok(Some(shape)) = member.schema.object_shape() else {
        return false;
    };
    shape
        .get_by_wire(property)
        .is_some_and(|field| match &field.schema.kind {
            SchemaKind::Enum(values) => values.iter().any(|v| v == tag),
            _ => false,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pet(tag_values: &[&str]) -> Schema {
        Schema::object(
            ObjectSchema::new()
                .renamed("pet_type", "petType", Schema::enumeration(tag_values.to_vec()))
                .field("name", Schema::string())
                .required(["pet_type"]),
        )
    }

    #[test]
    fn required_must_be_declared() {
        let schema = Schema::object(ObjectSchema::new().field("a", Schema::string()).required(["b"]));
        assert_eq!(
            schema.check(),
            Err(DefinitionError::RequiredNotDeclared { field: "b".into() })
        );
    }

    #[test]
    fn duplicate_wire_names_rejected() {
        let schema = Schema::object(
            ObjectSchema::new()
                .renamed("a", "x", Schema::string())
                .renamed("b", "x", Schema::string()),
        );
        assert!(matches!(
            schema.check(),
            Err(DefinitionError::DuplicateField { .. })
        ));
    }

    #[test]
    fn discriminator_must_exist_in_every_member() {
        let union = UnionSchema::new()
            .member("cat", pet(&["cat"]))
            .member("rock", Schema::object(ObjectSchema::new().field("mass", Schema::number())))
            .discriminated_by(Discriminator::new("petType"));
        let err = Schema::one_of(union).check().unwrap_err();
        assert_eq!(
            err,
            DefinitionError::DiscriminatorNotInMember {
                property: "petType".into(),
                member: "rock".into()
            }
        );
    }

    #[test]
    fn mapping_targets_must_exist() {
        let union = UnionSchema::new()
            .member("cat", pet(&["cat"]))
            .discriminated_by(Discriminator::new("petType").map("kitty", "Kitten"));
        assert!(matches!(
            Schema::one_of(union).check(),
            Err(DefinitionError::UnknownMappingTarget { .. })
        ));
    }

    #[test]
    fn all_of_conflicts_detected_at_check() {
        let a = Schema::object(ObjectSchema::new().field("id", Schema::string()));
        let b = Schema::object(ObjectSchema::new().field("id", Schema::integer()));
        assert_eq!(
            Schema::all_of(vec![a, b]).check(),
            Err(DefinitionError::ConflictingAllOf { field: "id".into() })
        );
    }

    #[test]
    fn all_of_merges_fields_and_required() {
        let a = Schema::object(ObjectSchema::new().field("id", Schema::string()).required(["id"]));
        let b = Schema::object(
            ObjectSchema::new()
                .field("id", Schema::string())
                .field("size", Schema::integer())
                .required(["size"]),
        );
        let merged = Schema::all_of(vec![a, b]).object_shape().unwrap().unwrap();
        assert_eq!(merged.fields.len(), 2);
        assert_eq!(merged.required, vec!["id".to_string(), "size".to_string()]);
    }

    #[test]
    fn invalid_pattern_rejected() {
        let err = Schema::string().pattern("([a-z").check().unwrap_err();
        assert!(matches!(err, DefinitionError::InvalidPattern { .. }));
    }

    #[test]
    fn inverted_bounds_rejected() {
        assert!(Schema::integer().minimum(10.0).maximum(1.0).check().is_err());
        assert!(Schema::string().min_length(3).max_length(2).check().is_err());
    }

    #[test]
    fn candidates_by_enum_name_and_mapping() {
        let union = UnionSchema::new()
            .member("Cat", pet(&["cat"]))
            .member("Dog", pet(&["dog"]))
            .discriminated_by(Discriminator::new("petType").map("puppy", "Dog"));

        let names = |tag: &str| -> Vec<String> {
            union.candidates(tag).into_iter().map(|m| m.name.clone()).collect()
        };
        assert_eq!(names("cat"), vec!["Cat"]);
        assert_eq!(names("Dog"), vec!["Dog"]);
        assert_eq!(names("puppy"), vec!["Dog"]);
        assert!(names("bird").is_empty());
    }

    #[test]
    fn tag_read_through_wire_name() {
        let union = UnionSchema::new()
            .member("Cat", pet(&["cat"]))
            .discriminated_by(Discriminator::new("petType"));
        let value = ObjectValue::new().with("pet_type", "cat");
        assert_eq!(union.tag_of(&value).as_deref(), Some("cat"));
    }
}
