use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Scoping ids of a list (line, container, user...), ordered so that key
/// equality is structural.
pub type Scope = BTreeMap<String, String>;

/// Opaque pagination token handed back verbatim to fetch the next page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Settled search text. Empty means unfiltered.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Query(String);

impl Query {
    /// Builds the settled form of raw input text.
    pub fn settle(raw: &str) -> Self {
        Self(raw.trim().to_string())
    }

    pub fn unfiltered() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_unfiltered(&self) -> bool {
        self.0.is_empty()
    }
}

/// Identity of one independent paginated list instance.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchKey {
    resource: String,
    scope: Scope,
    query: Query,
}

impl FetchKey {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            scope: Scope::new(),
            query: Query::unfiltered(),
        }
    }

    pub fn with_scope(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.scope.insert(name.into(), value.into());
        self
    }

    pub fn with_scopes(mut self, scope: Scope) -> Self {
        self.scope.extend(scope);
        self
    }

    pub fn with_query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn query(&self) -> &Query {
        &self.query
    }
}

impl fmt::Display for FetchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.resource)?;
        if !self.scope.is_empty() {
            let pairs: Vec<String> = self
                .scope
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect();
            write!(f, "[{}]", pairs.join(","))?;
        }
        if !self.query.is_unfiltered() {
            write!(f, "?q={}", self.query.as_str())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_is_trimmed_when_settled() {
        assert_eq!(Query::settle("  aspirin \t").as_str(), "aspirin");
        assert!(Query::settle("   ").is_unfiltered());
    }

    #[test]
    fn keys_differ_by_any_component() {
        let base = FetchKey::new("orders").with_scope("lineId", "A");
        assert_ne!(base, base.clone().with_scope("lineId", "B"));
        assert_ne!(base, base.clone().with_query(Query::settle("x")));
        assert_ne!(base, FetchKey::new("positions").with_scope("lineId", "A"));
        assert_eq!(base, FetchKey::new("orders").with_scope("lineId", "A"));
    }

    #[test]
    fn display_is_compact() {
        let key = FetchKey::new("orders")
            .with_scope("lineId", "A")
            .with_query(Query::settle("gauze"));
        assert_eq!(key.to_string(), "orders[lineId=A]?q=gauze");
    }
}
