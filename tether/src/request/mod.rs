//! Call arguments and the fully-resolved request built from them.

mod builder;

use std::collections::BTreeMap;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::header::HeaderMap;

use tether_define::{ParamLocation, RestMethod, TypedValue};

use crate::codec::EncodedBody;

pub use builder::build;

/// Characters escaped in query names and values.
const QUERY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Typed arguments for one call, keyed by parameter location.
///
/// ## Examples
///
/// ```
/// use tether::Arguments;
/// use tether_define::{ObjectValue, ParamLocation, TypedValue};
///
/// let args = Arguments::new()
///     .path("repository", "example-repo")
///     .query("amount", 100)
///     .header("X-Request-Id", "abc")
///     .body(TypedValue::object(ObjectValue::new().with("username", "admin")));
///
/// assert_eq!(args.get(ParamLocation::Header, "x-request-id"), Some(&TypedValue::from("abc")));
/// assert!(args.body_value().is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    path: BTreeMap<String, TypedValue>,
    query: BTreeMap<String, TypedValue>,
    headers: BTreeMap<String, TypedValue>,
    cookies: BTreeMap<String, TypedValue>,
    body: Option<TypedValue>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(mut self, name: impl Into<String>, value: impl Into<TypedValue>) -> Self {
        self.path.insert(name.into(), value.into());
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<TypedValue>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<TypedValue>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<TypedValue>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn body(mut self, value: impl Into<TypedValue>) -> Self {
        self.body = Some(value.into());
        self
    }

    /// Adds an argument by location.
    pub fn with(self, location: ParamLocation, name: impl Into<String>, value: impl Into<TypedValue>) -> Self {
        match location {
            ParamLocation::Path => self.path(name, value),
            ParamLocation::Query => self.query(name, value),
            ParamLocation::Header => self.header(name, value),
            ParamLocation::Cookie => self.cookie(name, value),
        }
    }

    fn location(&self, location: ParamLocation) -> &BTreeMap<String, TypedValue> {
        match location {
            ParamLocation::Path => &self.path,
            ParamLocation::Query => &self.query,
            ParamLocation::Header => &self.headers,
            ParamLocation::Cookie => &self.cookies,
        }
    }

    /// Looks up an argument; header names compare case-insensitively.
    pub fn get(&self, location: ParamLocation, name: &str) -> Option<&TypedValue> {
        let values = self.location(location);
        match location {
            ParamLocation::Header => values
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v),
            _ => values.get(name),
        }
    }

    /// Names supplied for one location.
    pub fn names(&self, location: ParamLocation) -> impl Iterator<Item = &str> {
        self.location(location).keys().map(String::as_str)
    }

    pub fn body_value(&self) -> Option<&TypedValue> {
        self.body.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
            && self.query.is_empty()
            && self.headers.is_empty()
            && self.cookies.is_empty()
            && self.body.is_none()
    }
}

/// A fully-specified HTTP request, built fresh for each call.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: RestMethod,
    /// Path relative to the base URL, placeholders substituted and encoded.
    pub path: String,
    /// Query pairs in declaration order, unencoded.
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Option<EncodedBody>,
}

impl Request {
    pub fn new(method: RestMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// The encoded query string, `None` when there are no pairs.
    pub fn query_string(&self) -> Option<String> {
        if self.query.is_empty() {
            return None;
        }
        let pairs: Vec<String> = self
            .query
            .iter()
            .map(|(name, value)| {
                format!(
                    "{}={}",
                    utf8_percent_encode(name, QUERY),
                    utf8_percent_encode(value, QUERY)
                )
            })
            .collect();
        Some(pairs.join("&"))
    }

    /// Path followed by `?query` when there is one.
    pub fn path_and_query(&self) -> String {
        match self.query_string() {
            Some(query) => format!("{}?{query}", self.path),
            None => self.path.clone(),
        }
    }

    /// A header value as text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// All values of a query parameter, in order.
    pub fn query_values(&self, name: &str) -> Vec<&str> {
        self.query
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_string_escapes_reserved_characters() {
        let mut request = Request::new(RestMethod::Get, "/repositories");
        request.query.push(("prefix".into(), "a b&c".into()));
        request.query.push(("tag".into(), "x".into()));
        request.query.push(("tag".into(), "y".into()));
        assert_eq!(
            request.path_and_query(),
            "/repositories?prefix=a%20b%26c&tag=x&tag=y"
        );
        assert_eq!(request.query_values("tag"), vec!["x", "y"]);
    }

    #[test]
    fn no_query_means_bare_path() {
        let request = Request::new(RestMethod::Get, "/config/version");
        assert_eq!(request.query_string(), None);
        assert_eq!(request.path_and_query(), "/config/version");
    }

    #[test]
    fn arguments_by_location() {
        let args = Arguments::new()
            .with(ParamLocation::Cookie, "session", "s1")
            .with(ParamLocation::Query, "amount", 10);
        assert_eq!(args.get(ParamLocation::Cookie, "session"), Some(&TypedValue::from("s1")));
        assert_eq!(args.get(ParamLocation::Query, "amount"), Some(&TypedValue::Integer(10)));
        assert_eq!(args.get(ParamLocation::Query, "session"), None);
        assert_eq!(args.names(ParamLocation::Query).collect::<Vec<_>>(), vec!["amount"]);
        assert!(!args.is_empty());
        assert!(Arguments::new().is_empty());
    }
}
