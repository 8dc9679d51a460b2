//! HTTP methods an endpoint can be bound to.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// HTTP method of an endpoint descriptor.
///
/// ## Examples
///
/// ```
/// use tether_define::RestMethod;
///
/// let method: RestMethod = "POST".parse().unwrap();
/// assert_eq!(method, RestMethod::Post);
/// assert!(method.has_body());
/// assert!(!method.is_idempotent());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum RestMethod {
    /// HTTP GET - Retrieve a resource.
    Get,
    /// HTTP POST - Create a resource or trigger an action.
    Post,
    /// HTTP PUT - Replace a resource entirely.
    Put,
    /// HTTP PATCH - Partially update a resource.
    Patch,
    /// HTTP DELETE - Remove a resource.
    Delete,
    /// HTTP HEAD - Retrieve headers only.
    Head,
    /// HTTP OPTIONS - Query supported methods.
    Options,
}

impl RestMethod {
    /// Returns `true` if this method conventionally carries a request body.
    pub fn has_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }

    /// Returns `true` if repeating the call has the same effect as calling once.
    pub fn is_idempotent(&self) -> bool {
        !matches!(self, Self::Post | Self::Patch)
    }

    /// Returns `true` if the method is read-only.
    pub fn is_safe(&self) -> bool {
        matches!(self, Self::Get | Self::Head | Self::Options)
    }
}
