use serde_json::Value;

use crate::{FetchKey, Scope};

pub type MutationId = u64;

/// Selects the fetch keys a mutation makes stale.
///
/// Matches every key of `resource` whose scope contains all pairs of
/// `scope`, whatever the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationTarget {
    pub resource: String,
    pub scope: Scope,
}

impl InvalidationTarget {
    pub fn resource(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            scope: Scope::new(),
        }
    }

    pub fn with_scope(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.scope.insert(name.into(), value.into());
        self
    }

    pub fn matches(&self, key: &FetchKey) -> bool {
        key.resource() == self.resource
            && self
                .scope
                .iter()
                .all(|(name, value)| key.scope().get(name) == Some(value))
    }
}

impl From<&FetchKey> for InvalidationTarget {
    fn from(key: &FetchKey) -> Self {
        Self {
            resource: key.resource().to_string(),
            scope: key.scope().clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationMethod {
    Post,
    Put,
    Patch,
    Delete,
}

/// A create/update/delete call and the lists it affects.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    /// Human-readable description used in notifications.
    pub label: String,
    pub method: MutationMethod,
    pub path: String,
    pub body: Option<Value>,
    pub invalidates: Vec<InvalidationTarget>,
}

impl Mutation {
    pub fn new(label: impl Into<String>, method: MutationMethod, path: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            method,
            path: path.into(),
            body: None,
            invalidates: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn invalidating(mut self, target: InvalidationTarget) -> Self {
        self.invalidates.push(target);
        self
    }

    pub fn affects(&self, key: &FetchKey) -> bool {
        self.invalidates.iter().any(|target| target.matches(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Query;

    #[test]
    fn target_matches_scope_subset_for_any_query() {
        let target = InvalidationTarget::resource("inventory").with_scope("containerId", "c1");
        let key = FetchKey::new("inventory")
            .with_scope("containerId", "c1")
            .with_scope("userId", "u1")
            .with_query(Query::settle("ibuprofen"));

        assert!(target.matches(&key));
        assert!(!target.matches(&FetchKey::new("inventory").with_scope("containerId", "c2")));
        assert!(!target.matches(&FetchKey::new("orders").with_scope("containerId", "c1")));
    }
}
