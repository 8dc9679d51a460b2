//! Named groups of operations.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use tether_define::{EndpointTable, TypedValue};

use crate::client::Client;
use crate::error::{ConfigError, TetherError};
use crate::operation::Operation;
use crate::request::Arguments;
use crate::transport::{ReqwestTransport, Transport};

/// Operations grouped under one name.
///
/// A façade only delegates. All operations share the client they were built
/// with (and so its transport); nothing else is shared between calls.
pub struct Facade<'a, T = ReqwestTransport> {
    name: String,
    operations: BTreeMap<String, Operation<'a, T>>,
}

impl<T> std::fmt::Debug for Facade<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Facade")
            .field("name", &self.name)
            .field("operations", &self.operations.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<'a, T: Transport> Facade<'a, T> {
    /// Groups the listed operation ids from `table`.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::UnknownOperation`] for an id the table lacks.
    pub fn new<I, S>(
        name: impl Into<String>,
        table: &'a EndpointTable,
        client: &Client<T>,
        ids: I,
    ) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut operations = BTreeMap::new();
        for id in ids {
            let id = id.as_ref();
            let endpoint = table
                .get(id)
                .ok_or_else(|| ConfigError::UnknownOperation { id: id.to_string() })?;
            operations.insert(id.to_string(), client.operation(endpoint));
        }
        Ok(Self {
            name: name.into(),
            operations,
        })
    }

    /// Groups every operation in `table` carrying `tag`.
    pub fn from_tag(tag: &str, table: &'a EndpointTable, client: &Client<T>) -> Self {
        let operations = table
            .tagged(tag)
            .map(|endpoint| (endpoint.id().to_string(), client.operation(endpoint)))
            .collect();
        Self {
            name: tag.to_string(),
            operations,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn operation(&self, id: &str) -> Option<&Operation<'a, T>> {
        self.operations.get(id)
    }

    /// Operation ids in sorted order.
    pub fn operation_ids(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Calls the operation named `id`.
    ///
    /// ## Errors
    ///
    /// [`ConfigError::UnknownOperation`] if the façade does not group `id`,
    /// otherwise whatever the operation returns.
    pub async fn call(&self, id: &str, args: Arguments) -> Result<TypedValue, TetherError> {
        let operation = self
            .operation(id)
            .ok_or_else(|| ConfigError::UnknownOperation { id: id.to_string() })?;
        operation.call(args).await
    }

    /// Calls the operation named `id` and converts the body into `R`.
    ///
    /// ## Errors
    ///
    /// As [`call`](Self::call), plus [`TetherError::Codec`] when the body
    /// does not fit `R`.
    pub async fn call_as<R: DeserializeOwned>(
        &self,
        id: &str,
        args: Arguments,
    ) -> Result<R, TetherError> {
        let operation = self
            .operation(id)
            .ok_or_else(|| ConfigError::UnknownOperation { id: id.to_string() })?;
        operation.call_as(args).await
    }
}
