//! Media types understood by the serializer.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum::EnumIter;

/// A media type the codec can produce and consume.
///
/// ## Examples
///
/// ```
/// use tether_define::ContentType;
///
/// assert_eq!(ContentType::from_mime("application/json"), Some(ContentType::Json));
/// assert_eq!(ContentType::from_mime("application/problem+json"), Some(ContentType::Json));
/// assert_eq!(ContentType::Form.mime(), "application/x-www-form-urlencoded");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum ContentType {
    /// `application/json` (and any `+json` suffix).
    Json,
    /// `application/x-www-form-urlencoded`.
    Form,
    /// `multipart/form-data`.
    Multipart,
    /// `application/octet-stream`.
    OctetStream,
    /// `text/plain`.
    PlainText,
    /// `application/yaml`.
    Yaml,
}

impl ContentType {
    /// Canonical MIME string.
    pub fn mime(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Form => "application/x-www-form-urlencoded",
            Self::Multipart => "multipart/form-data",
            Self::OctetStream => "application/octet-stream",
            Self::PlainText => "text/plain",
            Self::Yaml => "application/yaml",
        }
    }

    /// Maps a MIME essence (no parameters) to a content type.
    pub fn from_mime(essence: &str) -> Option<Self> {
        let essence = essence.trim().to_ascii_lowercase();
        match essence.as_str() {
            "application/json" | "text/json" => Some(Self::Json),
            "application/x-www-form-urlencoded" => Some(Self::Form),
            "multipart/form-data" => Some(Self::Multipart),
            "application/octet-stream" => Some(Self::OctetStream),
            "text/plain" => Some(Self::PlainText),
            "application/yaml" | "application/x-yaml" | "text/yaml" => Some(Self::Yaml),
            other if other.ends_with("+json") => Some(Self::Json),
            other if other.ends_with("+yaml") => Some(Self::Yaml),
            _ => None,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// A parsed `Content-Type` header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    /// The recognised media type.
    pub content_type: ContentType,
    /// Lowercased parameter names mapped to unquoted values.
    pub params: BTreeMap<String, String>,
}

impl MediaType {
    pub fn new(content_type: ContentType) -> Self {
        Self {
            content_type,
            params: BTreeMap::new(),
        }
    }

    /// Parses a header value such as `multipart/form-data; boundary="abc"`.
    ///
    /// Returns `None` for media types outside [`ContentType`].
    pub fn parse(header: &str) -> Option<Self> {
        let mut parts = header.split(';');
        let content_type = ContentType::from_mime(parts.next()?)?;
        let params = parts
            .filter_map(|param| {
                let (name, value) = param.split_once('=')?;
                let value = value.trim().trim_matches('"');
                Some((name.trim().to_ascii_lowercase(), value.to_string()))
            })
            .collect();
        Some(Self {
            content_type,
            params,
        })
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn boundary(&self) -> Option<&str> {
        self.params.get("boundary").map(String::as_str)
    }
}

impl From<ContentType> for MediaType {
    fn from(content_type: ContentType) -> Self {
        Self::new(content_type)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.content_type.mime())?;
        for (name, value) in &self.params {
            write!(f, "; {name}={value}")?;
        }
        Ok(())
    }
}
