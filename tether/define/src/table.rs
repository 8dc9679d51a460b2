//! The read-only set of descriptors an API client is generated from.

use std::collections::HashMap;

use crate::endpoint::EndpointDescriptor;
use crate::error::DefinitionError;

/// Endpoint descriptors indexed by operation id.
///
/// Built once at startup and only read afterwards, so one table can be
/// shared by any number of concurrent calls.
#[derive(Debug, Clone, Default)]
pub struct EndpointTable {
    endpoints: Vec<EndpointDescriptor>,
    index: HashMap<String, usize>,
}

impl EndpointTable {
    /// ## Errors
    ///
    /// Returns [`DefinitionError::DuplicateEndpoint`] if two descriptors share an id.
    pub fn new(endpoints: Vec<EndpointDescriptor>) -> Result<Self, DefinitionError> {
        let mut index = HashMap::with_capacity(endpoints.len());
        for (i, endpoint) in endpoints.iter().enumerate() {
            let id = endpoint.id().as_str().to_string();
            if index.insert(id.clone(), i).is_some() {
                return Err(DefinitionError::DuplicateEndpoint { id });
            }
        }
        Ok(Self { endpoints, index })
    }

    pub fn get(&self, id: &str) -> Option<&EndpointDescriptor> {
        self.index.get(id).map(|&i| &self.endpoints[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Descriptors in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &EndpointDescriptor> {
        self.endpoints.iter()
    }

    /// Descriptors carrying `tag`, in declaration order.
    pub fn tagged(&self, tag: &str) -> impl Iterator<Item = &EndpointDescriptor> {
        self.endpoints
            .iter()
            .filter(move |e| e.tags().iter().any(|t| t == tag))
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

impl<'a> IntoIterator for &'a EndpointTable {
    type Item = &'a EndpointDescriptor;
    type IntoIter = std::slice::Iter<'a, EndpointDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.endpoints.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::RestMethod;

    fn endpoint(id: &str, tag: &str) -> EndpointDescriptor {
        EndpointDescriptor::builder()
            .id(id)
            .method(RestMethod::Get)
            .path("/x")
            .tag(tag)
            .build()
            .unwrap()
    }

    #[test]
    fn lookup_by_id() {
        let table = EndpointTable::new(vec![endpoint("a", "config"), endpoint("b", "setup")]).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("b").map(|e| e.id().as_str()), Some("b"));
        assert!(table.get("c").is_none());
        assert_eq!(table.tagged("config").count(), 1);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let err = EndpointTable::new(vec![endpoint("a", "x"), endpoint("a", "y")]).unwrap_err();
        assert_eq!(err, DefinitionError::DuplicateEndpoint { id: "a".into() });
    }
}
