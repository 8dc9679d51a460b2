//! Validated operation identifiers.

use std::fmt;

use thiserror::Error;

/// A validated operation identifier.
///
/// Rules:
/// 1. Must start with an alphabetic character.
/// 2. Remaining characters must be alphanumeric or `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EndpointId(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointIdError {
    #[error("endpoint id cannot be empty")]
    Empty,
    #[error("endpoint id must start with an alphabetic character")]
    InvalidStartCharacter,
    #[error("endpoint id contains invalid character: '{0}'")]
    InvalidCharacter(char),
}

impl EndpointId {
    pub fn new<S: Into<String>>(id: S) -> Result<Self, EndpointIdError> {
        let s = id.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    fn validate(s: &str) -> Result<(), EndpointIdError> {
        let mut chars = s.chars();

        match chars.next() {
            Some(c) if !c.is_alphabetic() => return Err(EndpointIdError::InvalidStartCharacter),
            None => return Err(EndpointIdError::Empty),
            _ => {}
        }

        if let Some(c) = chars.find(|c| !c.is_alphanumeric() && *c != '_') {
            return Err(EndpointIdError::InvalidCharacter(c));
        }

        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EndpointId> for String {
    fn from(id: EndpointId) -> Self {
        id.0
    }
}

impl TryFrom<&str> for EndpointId {
    type Error = EndpointIdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
