//! Errors raised while constructing schemas and endpoint descriptors.
//!
//! These are programmer errors in a definition table. They surface once, when
//! the table is built, never per call.

use thiserror::Error;

use crate::endpoint::ParamLocation;
use crate::endpoint_id::EndpointIdError;

/// A schema or endpoint descriptor that violates a construction invariant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DefinitionError {
    /// A required field name is not among the declared fields.
    #[error("required field `{field}` is not declared")]
    RequiredNotDeclared { field: String },

    /// Two fields share a name or a wire name.
    #[error("field `{field}` is declared more than once")]
    DuplicateField { field: String },

    /// A oneOf member lacks the discriminator property in its own field set.
    #[error("discriminator `{property}` is not a field of member `{member}`")]
    DiscriminatorNotInMember { property: String, member: String },

    /// A discriminator mapping points at a member that does not exist.
    #[error("discriminator value `{tag}` maps to unknown member `{member}`")]
    UnknownMappingTarget { tag: String, member: String },

    /// A oneOf/anyOf/allOf schema without members.
    #[error("composite schema has no members")]
    EmptyComposite,

    /// An enum schema without members.
    #[error("enum schema has no members")]
    EmptyEnum,

    /// Two allOf parts declare the same field with different schemas.
    #[error("allOf parts declare conflicting schemas for field `{field}`")]
    ConflictingAllOf { field: String },

    /// A `pattern` constraint that is not a valid regular expression.
    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Contradictory numeric or length bounds.
    #[error("invalid constraint: {reason}")]
    InvalidConstraint { reason: String },

    /// Unbalanced or empty `{}` placeholder in a path template.
    #[error("invalid path template `{template}`: {reason}")]
    InvalidPathTemplate { template: String, reason: String },

    /// A path placeholder without a declared path parameter.
    #[error("path placeholder `{name}` has no declared path parameter")]
    UndeclaredPathParameter { name: String },

    /// A declared path parameter that the template never uses.
    #[error("path parameter `{name}` does not appear in the path template")]
    UnusedPathParameter { name: String },

    /// Path parameters are always required.
    #[error("path parameter `{name}` must be required")]
    OptionalPathParameter { name: String },

    /// Same parameter name declared twice in one location.
    #[error("{location} parameter `{name}` is declared more than once")]
    DuplicateParameter { name: String, location: ParamLocation },

    /// Operation id failed validation.
    #[error("invalid endpoint id: {0}")]
    InvalidEndpointId(#[from] EndpointIdError),

    /// A response key that is not a status code, `NXX` range or `default`.
    #[error("invalid response status key `{key}`")]
    InvalidStatusKey { key: String },

    /// One response key declared twice on an endpoint.
    #[error("response `{key}` is declared more than once")]
    DuplicateResponse { key: String },

    /// Two descriptors in one table share an id.
    #[error("duplicate endpoint id: {id}")]
    DuplicateEndpoint { id: String },

    /// An error found inside a named part of a descriptor.
    #[error("{context}: {source}")]
    In {
        context: String,
        #[source]
        source: Box<DefinitionError>,
    },
}

impl DefinitionError {
    /// Attaches the descriptor part the error was found in.
    pub fn within(self, context: impl Into<String>) -> Self {
        Self::In {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, stripping [`DefinitionError::In`] wrappers.
    pub fn root(&self) -> &DefinitionError {
        match self {
            Self::In { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn within_keeps_context_and_root() {
        let err = DefinitionError::RequiredNotDeclared {
            field: "version".into(),
        }
        .within("response 200")
        .within("getLakeFSVersion");

        assert_eq!(
            err.to_string(),
            "getLakeFSVersion: response 200: required field `version` is not declared"
        );
        assert!(matches!(
            err.root(),
            DefinitionError::RequiredNotDeclared { .. }
        ));
    }
}
