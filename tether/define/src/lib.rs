//! Tether Definition Library
//!
//! Primitives for describing a REST API so the `tether` runtime can drive it:
//!
//! - [`Schema`] - shape and constraints of parameters, bodies and responses
//! - [`TypedValue`] - a dynamic value conforming to a schema
//! - [`validate`] - pure schema validation with field paths
//! - [`EndpointDescriptor`] - one operation: method, path template,
//!   parameters, request body, responses and security
//! - [`EndpointTable`] - descriptors indexed by operation id
//! - [`AuthStrategy`] - how credentials are placed on a request
//!
//! Everything here is immutable once built and safe to share across threads.
//! Concrete API definitions live in the `tether-definitions` crate.
//!
//! ## Examples
//!
//! ```
//! use tether_define::{
//!     EndpointDescriptor, EndpointTable, ObjectSchema, ResponseSpec, RestMethod, Schema,
//! };
//!
//! let gc_config = Schema::object(
//!     ObjectSchema::new().field("grace_period", Schema::integer()),
//! );
//!
//! let table = EndpointTable::new(vec![
//!     EndpointDescriptor::builder()
//!         .id("getGarbageCollectionConfig")
//!         .method(RestMethod::Get)
//!         .path("/config/garbage-collection")
//!         .response(ResponseSpec::json(200, gc_config))
//!         .secured()
//!         .build()
//!         .unwrap(),
//! ])
//! .unwrap();
//!
//! assert!(table.get("getGarbageCollectionConfig").is_some());
//! ```

pub mod auth;
pub mod content_type;
pub mod endpoint;
pub mod endpoint_id;
pub mod error;
pub mod method;
pub mod schema;
pub mod table;
pub mod validate;
pub mod value;

pub use auth::{ApiKeyLocation, AuthStrategy};
pub use content_type::{ContentType, MediaType};
pub use endpoint::{
    CollectionStyle, Content, EndpointBuilder, EndpointDescriptor, ParamLocation, Parameter,
    PathTemplate, RequestBody, ResponseSpec, StatusKey, TemplatePart,
};
pub use endpoint_id::{EndpointId, EndpointIdError};
pub use error::DefinitionError;
pub use method::RestMethod;
pub use schema::{
    AdditionalProperties, Constraints, Discriminator, Field, IntegerFormat, Member, ObjectSchema,
    Schema, SchemaKind, StringFormat, UnionSchema, UnknownVariant,
};
pub use table::EndpointTable;
pub use validate::{
    FieldPath, PathSegment, ValidationError, ViolationKind, is_valid, validate,
    validate_at,
};
pub use value::{ObjectValue, TypedValue, Variant};
