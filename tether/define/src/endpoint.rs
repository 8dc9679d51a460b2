//! Endpoint descriptors with a type-state builder.
//!
//! An [`EndpointDescriptor`] is immutable once built. [`EndpointBuilder`]
//! tracks the id, method and path slots in its type so `build` only exists
//! once all three are set, and `build` checks the remaining invariants
//! (placeholders, parameter uniqueness, schema construction rules).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::content_type::ContentType;
use crate::endpoint_id::EndpointId;
use crate::error::DefinitionError;
use crate::method::RestMethod;
use crate::schema::Schema;

/// Marker types for builder state tracking.
pub mod builder_state {
    /// Marker for a slot that has not been set.
    pub struct Missing;
    /// A slot that has been set.
    pub struct Present<T>(pub(crate) T);
}

use builder_state::{Missing, Present};

/// Where a parameter travels in the HTTP request.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ParamLocation {
    Path,
    Query,
    Header,
    Cookie,
}

/// How array values are rendered into a query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectionStyle {
    /// `?tag=a&tag=b`
    #[default]
    Repeated,
    /// `?tag=a,b`
    CommaJoined,
    /// `?tag=a|b`
    PipeJoined,
}

impl CollectionStyle {
    /// Separator for joined styles, `None` for repeated pairs.
    pub fn delimiter(&self) -> Option<&'static str> {
        match self {
            Self::Repeated => None,
            Self::CommaJoined => Some(","),
            Self::PipeJoined => Some("|"),
        }
    }
}

/// One declared operation parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub location: ParamLocation,
    pub required: bool,
    pub schema: Schema,
    pub style: CollectionStyle,
    pub description: Option<String>,
}

impl Parameter {
    fn new(name: impl Into<String>, location: ParamLocation, schema: Schema) -> Self {
        Self {
            name: name.into(),
            location,
            required: location == ParamLocation::Path,
            schema,
            style: CollectionStyle::default(),
            description: None,
        }
    }

    /// A path parameter. Path parameters are always required.
    pub fn path(name: impl Into<String>, schema: Schema) -> Self {
        Self::new(name, ParamLocation::Path, schema)
    }

    pub fn query(name: impl Into<String>, schema: Schema) -> Self {
        Self::new(name, ParamLocation::Query, schema)
    }

    pub fn header(name: impl Into<String>, schema: Schema) -> Self {
        Self::new(name, ParamLocation::Header, schema)
    }

    pub fn cookie(name: impl Into<String>, schema: Schema) -> Self {
        Self::new(name, ParamLocation::Cookie, schema)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_style(mut self, style: CollectionStyle) -> Self {
        self.style = style;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A schema bound to one media type.
#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    pub content_type: ContentType,
    pub schema: Schema,
}

/// Declared request body: one schema per accepted media type.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestBody {
    pub required: bool,
    /// Accepted encodings in preference order.
    pub content: Vec<Content>,
}

impl RequestBody {
    pub fn new(required: bool) -> Self {
        Self {
            required,
            content: Vec::new(),
        }
    }

    /// A required JSON body.
    pub fn json(schema: Schema) -> Self {
        Self::new(true).with(ContentType::Json, schema)
    }

    pub fn with(mut self, content_type: ContentType, schema: Schema) -> Self {
        self.content.push(Content {
            content_type,
            schema,
        });
        self
    }

    pub fn content_for(&self, content_type: ContentType) -> Option<&Content> {
        self.content.iter().find(|c| c.content_type == content_type)
    }

    pub fn content_types(&self) -> impl Iterator<Item = ContentType> + '_ {
        self.content.iter().map(|c| c.content_type)
    }
}

/// Key of a declared response: an exact code, a class such as `2XX`, or `default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKey {
    Code(u16),
    /// Status class, `2` for `2XX`.
    Range(u8),
    Default,
}

impl StatusKey {
    /// Whether `status` falls under this key. `Default` matches everything.
    pub fn matches(&self, status: u16) -> bool {
        match self {
            Self::Code(code) => *code == status,
            Self::Range(class) => status / 100 == u16::from(*class),
            Self::Default => true,
        }
    }
}

impl fmt::Display for StatusKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{code}"),
            Self::Range(class) => write!(f, "{class}XX"),
            Self::Default => f.write_str("default"),
        }
    }
}

impl FromStr for StatusKey {
    type Err = DefinitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DefinitionError::InvalidStatusKey { key: s.to_string() };
        if s.eq_ignore_ascii_case("default") {
            return Ok(Self::Default);
        }
        let upper = s.to_ascii_uppercase();
        if let Some(class) = upper.strip_suffix("XX") {
            return match class.parse::<u8>() {
                Ok(class @ 1..=5) => Ok(Self::Range(class)),
                _ => Err(invalid()),
            };
        }
        match s.parse::<u16>() {
            Ok(code @ 100..=599) => Ok(Self::Code(code)),
            _ => Err(invalid()),
        }
    }
}

impl From<u16> for StatusKey {
    fn from(code: u16) -> Self {
        Self::Code(code)
    }
}

/// One declared response.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSpec {
    pub status: StatusKey,
    pub description: Option<String>,
    /// Empty when the response carries no body.
    pub content: Vec<Content>,
}

impl ResponseSpec {
    pub fn new(status: impl Into<StatusKey>) -> Self {
        Self {
            status: status.into(),
            description: None,
            content: Vec::new(),
        }
    }

    /// A response with a JSON body.
    pub fn json(status: impl Into<StatusKey>, schema: Schema) -> Self {
        Self::new(status).with(ContentType::Json, schema)
    }

    /// A response without a body.
    pub fn empty(status: impl Into<StatusKey>) -> Self {
        Self::new(status)
    }

    pub fn with(mut self, content_type: ContentType, schema: Schema) -> Self {
        self.content.push(Content {
            content_type,
            schema,
        });
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn content_for(&self, content_type: ContentType) -> Option<&Content> {
        self.content.iter().find(|c| c.content_type == content_type)
    }

    pub fn has_body(&self) -> bool {
        !self.content.is_empty()
    }
}

/// A piece of a parsed path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    Literal(String),
    Param(String),
}

/// A path such as `/repositories/{repository}/branches`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    parts: Vec<TemplatePart>,
}

impl PathTemplate {
    /// Parses `{name}` placeholders out of a template.
    ///
    /// ## Errors
    ///
    /// Returns [`DefinitionError::InvalidPathTemplate`] for an empty or
    /// unclosed placeholder, a stray `}`, or a path not starting with `/`.
    pub fn parse(raw: impl Into<String>) -> Result<Self, DefinitionError> {
        let raw = raw.into();
        let invalid = |reason: &str| DefinitionError::InvalidPathTemplate {
            template: raw.clone(),
            reason: reason.to_string(),
        };
        if !raw.starts_with('/') {
            return Err(invalid("must start with `/`"));
        }

        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut chars = raw.chars();
        while let Some(c) = chars.next() {
            match c {
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for next in chars.by_ref() {
                        match next {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' | '/' => return Err(invalid("unclosed placeholder")),
                            other => name.push(other),
                        }
                    }
                    if !closed {
                        return Err(invalid("unclosed placeholder"));
                    }
                    if name.is_empty() {
                        return Err(invalid("empty placeholder"));
                    }
                    if !literal.is_empty() {
                        parts.push(TemplatePart::Literal(std::mem::take(&mut literal)));
                    }
                    parts.push(TemplatePart::Param(name));
                }
                '}' => return Err(invalid("unmatched `}`")),
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            parts.push(TemplatePart::Literal(literal));
        }
        Ok(Self { raw, parts })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn parts(&self) -> &[TemplatePart] {
        &self.parts
    }

    /// Placeholder names in template order.
    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|p| match p {
            TemplatePart::Param(name) => Some(name.as_str()),
            TemplatePart::Literal(_) => None,
        })
    }

    /// Substitutes already-encoded values. Returns `None` if one is missing.
    pub fn render(&self, values: &BTreeMap<String, String>) -> Option<String> {
        let mut out = String::with_capacity(self.raw.len());
        for part in &self.parts {
            match part {
                TemplatePart::Literal(text) => out.push_str(text),
                TemplatePart::Param(name) => out.push_str(values.get(name)?),
            }
        }
        Some(out)
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Immutable metadata for one API operation.
///
/// ## Examples
///
/// ```
/// use tether_define::{EndpointDescriptor, ObjectSchema, ResponseSpec, RestMethod, Schema};
///
/// let version = Schema::object(ObjectSchema::new().field("version", Schema::string()));
///
/// let endpoint = EndpointDescriptor::builder()
///     .id("getLakeFSVersion")
///     .method(RestMethod::Get)
///     .path("/config/version")
///     .response(ResponseSpec::json(200, version))
///     .secured()
///     .build()
///     .unwrap();
///
/// assert_eq!(endpoint.id().as_str(), "getLakeFSVersion");
/// assert!(endpoint.response_for(200).is_some());
/// assert!(endpoint.response_for(503).is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointDescriptor {
    id: EndpointId,
    method: RestMethod,
    path: PathTemplate,
    description: Option<String>,
    parameters: Vec<Parameter>,
    request_body: Option<RequestBody>,
    responses: Vec<ResponseSpec>,
    secured: bool,
    tags: Vec<String>,
}

impl EndpointDescriptor {
    pub fn builder() -> EndpointBuilder<Missing, Missing, Missing> {
        EndpointBuilder::new()
    }

    pub fn id(&self) -> &EndpointId {
        &self.id
    }

    pub fn method(&self) -> RestMethod {
        self.method
    }

    pub fn path(&self) -> &PathTemplate {
        &self.path
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Parameters in declaration order.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Looks up a parameter; header names compare case-insensitively.
    pub fn parameter(&self, name: &str, location: ParamLocation) -> Option<&Parameter> {
        self.parameters.iter().find(|p| {
            p.location == location
                && match location {
                    ParamLocation::Header => p.name.eq_ignore_ascii_case(name),
                    _ => p.name == name,
                }
        })
    }

    pub fn request_body(&self) -> Option<&RequestBody> {
        self.request_body.as_ref()
    }

    pub fn responses(&self) -> &[ResponseSpec] {
        &self.responses
    }

    /// Whether the operation needs credentials.
    pub fn is_secured(&self) -> bool {
        self.secured
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Finds the declared response for a status: exact code, then `NXX`, then `default`.
    pub fn response_for(&self, status: u16) -> Option<&ResponseSpec> {
        let exact = self
            .responses
            .iter()
            .find(|r| r.status == StatusKey::Code(status));
        exact
            .or_else(|| {
                self.responses
                    .iter()
                    .find(|r| matches!(r.status, StatusKey::Range(_)) && r.status.matches(status))
            })
            .or_else(|| self.responses.iter().find(|r| r.status == StatusKey::Default))
    }

    /// Distinct media types across all declared responses, in declaration order.
    pub fn accepts(&self) -> Vec<ContentType> {
        let mut accepted = Vec::new();
        for content in self.responses.iter().flat_map(|r| &r.content) {
            if !accepted.contains(&content.content_type) {
                accepted.push(content.content_type);
            }
        }
        accepted
    }
}

/// Type-state builder for [`EndpointDescriptor`].
///
/// `Id`, `Method` and `Path` are [`Missing`] until their setter is called.
pub struct EndpointBuilder<Id, Method, Path> {
    id: Id,
    method: Method,
    path: Path,
    description: Option<String>,
    parameters: Vec<Parameter>,
    request_body: Option<RequestBody>,
    responses: Vec<ResponseSpec>,
    secured: bool,
    tags: Vec<String>,
}

impl EndpointBuilder<Missing, Missing, Missing> {
    pub fn new() -> Self {
        Self {
            id: Missing,
            method: Missing,
            path: Missing,
            description: None,
            parameters: Vec::new(),
            request_body: None,
            responses: Vec::new(),
            secured: false,
            tags: Vec::new(),
        }
    }
}

impl Default for EndpointBuilder<Missing, Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M, P> EndpointBuilder<Missing, M, P> {
    /// Sets the operation id.
    pub fn id(self, id: impl Into<String>) -> EndpointBuilder<Present<String>, M, P> {
        EndpointBuilder {
            id: Present(id.into()),
            method: self.method,
            path: self.path,
            description: self.description,
            parameters: self.parameters,
            request_body: self.request_body,
            responses: self.responses,
            secured: self.secured,
            tags: self.tags,
        }
    }
}

impl<I, P> EndpointBuilder<I, Missing, P> {
    pub fn method(self, method: RestMethod) -> EndpointBuilder<I, Present<RestMethod>, P> {
        EndpointBuilder {
            id: self.id,
            method: Present(method),
            path: self.path,
            description: self.description,
            parameters: self.parameters,
            request_body: self.request_body,
            responses: self.responses,
            secured: self.secured,
            tags: self.tags,
        }
    }
}

impl<I, M> EndpointBuilder<I, M, Missing> {
    /// Sets the path template; placeholders look like `{name}`.
    pub fn path(self, path: impl Into<String>) -> EndpointBuilder<I, M, Present<String>> {
        EndpointBuilder {
            id: self.id,
            method: self.method,
            path: Present(path.into()),
            description: self.description,
            parameters: self.parameters,
            request_body: self.request_body,
            responses: self.responses,
            secured: self.secured,
            tags: self.tags,
        }
    }
}

impl<I, M, P> EndpointBuilder<I, M, P> {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.request_body = Some(body);
        self
    }

    pub fn response(mut self, response: ResponseSpec) -> Self {
        self.responses.push(response);
        self
    }

    /// Marks the operation as requiring credentials.
    pub fn secured(mut self) -> Self {
        self.secured = true;
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

impl EndpointBuilder<Present<String>, Present<RestMethod>, Present<String>> {
    /// Builds and checks the descriptor.
    ///
    /// ## Errors
    ///
    /// Fails, with the operation id attached as context, when:
    ///
    /// - the id is not a valid identifier
    /// - the path template is malformed
    /// - placeholders and declared path parameters disagree
    /// - a parameter or response key is declared twice
    /// - any schema breaks its construction rules
    pub fn build(self) -> Result<EndpointDescriptor, DefinitionError> {
        let Present(raw_id) = self.id;
        let id = EndpointId::new(raw_id.as_str())
            .map_err(|e| DefinitionError::from(e).within(raw_id.as_str()))?;
        let context = id.as_str().to_string();

        let descriptor = EndpointDescriptor {
            id,
            method: self.method.0,
            path: PathTemplate::parse(self.path.0).map_err(|e| e.within(&context))?,
            description: self.description,
            parameters: self.parameters,
            request_body: self.request_body,
            responses: self.responses,
            secured: self.secured,
            tags: self.tags,
        };
        check_descriptor(&descriptor).map_err(|e| e.within(&context))?;
        Ok(descriptor)
    }
}

fn check_descriptor(descriptor: &EndpointDescriptor) -> Result<(), DefinitionError> {
    let parameters = &descriptor.parameters;
    for (i, param) in parameters.iter().enumerate() {
        // Header names are case-insensitive.
        let same_name = |p: &Parameter| match param.location {
            ParamLocation::Header => p.name.eq_ignore_ascii_case(&param.name),
            _ => p.name == param.name,
        };
        let duplicate = parameters[..i]
            .iter()
            .any(|p| p.location == param.location && same_name(p));
        if duplicate {
            return Err(DefinitionError::DuplicateParameter {
                name: param.name.clone(),
                location: param.location,
            });
        }
        if param.location == ParamLocation::Path {
            if !param.required {
                return Err(DefinitionError::OptionalPathParameter {
                    name: param.name.clone(),
                });
            }
            if !descriptor.path.params().any(|p| p == param.name) {
                return Err(DefinitionError::UnusedPathParameter {
                    name: param.name.clone(),
                });
            }
        }
        param
            .schema
            .check()
            .map_err(|e| e.within(format!("{} parameter `{}`", param.location, param.name)))?;
    }

    for name in descriptor.path.params() {
        if descriptor.parameter(name, ParamLocation::Path).is_none() {
            return Err(DefinitionError::UndeclaredPathParameter {
                name: name.to_string(),
            });
        }
    }

    if let Some(body) = &descriptor.request_body {
        if body.content.is_empty() {
            return Err(DefinitionError::InvalidConstraint {
                reason: "request body declares no media type".to_string(),
            });
        }
        for content in &body.content {
            content
                .schema
                .check()
                .map_err(|e| e.within(format!("request body {}", content.content_type)))?;
        }
    }

    for (i, response) in descriptor.responses.iter().enumerate() {
        if descriptor.responses[..i]
            .iter()
            .any(|r| r.status == response.status)
        {
            return Err(DefinitionError::DuplicateResponse {
                key: response.status.to_string(),
            });
        }
        for content in &response.content {
            content
                .schema
                .check()
                .map_err(|e| e.within(format!("response {}", response.status)))?;
        }
    }
    Ok(())
}
