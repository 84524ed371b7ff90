//! Deployment scope: the unit of co-deployed infrastructure.
//!
//! The scope owns every construct attached during a synthesis pass, both
//! the ones a provisioner adds for standard resources and the ones a custom
//! hook adds by hand. It is always passed explicitly, never held globally.

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::ScopeConfig;
use crate::error::{Error, Result};

/// Identifier of a construct, unique within its scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ConstructId(String);

impl ConstructId {
    /// Wrap an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConstructId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::borrow::Borrow<str> for ConstructId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ConstructId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ConstructId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One low-level infrastructure object.
///
/// `kind` is free-form (e.g. `"storage.bucket"`, `"monitoring.alarm"`);
/// properties are arbitrary JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Construct {
    id: ConstructId,
    kind: String,
    properties: serde_json::Map<String, serde_json::Value>,
}

impl Construct {
    /// New construct without properties.
    pub fn new(id: impl Into<ConstructId>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            properties: serde_json::Map::new(),
        }
    }

    /// Set a property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// The construct id.
    #[must_use]
    pub fn id(&self) -> &ConstructId {
        &self.id
    }

    /// The construct kind.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Property by name.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&serde_json::Value> {
        self.properties.get(key)
    }
}

/// Handle to the unit of co-deployed infrastructure.
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentScope {
    name: String,
    tags: BTreeMap<String, String>,
    constructs: IndexMap<ConstructId, Construct>,
}

impl DeploymentScope {
    /// Empty scope with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: BTreeMap::new(),
            constructs: IndexMap::new(),
        }
    }

    /// Empty scope named and tagged from configuration.
    #[must_use]
    pub fn from_config(config: &ScopeConfig) -> Self {
        Self {
            name: config.name.clone(),
            tags: config.tags.clone(),
            constructs: IndexMap::new(),
        }
    }

    /// Add a tag.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Scope name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tags, sorted by key.
    #[must_use]
    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// Attach a construct. The scope owns it from now on.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateConstruct`] if the id is already taken.
    pub fn add(&mut self, construct: Construct) -> Result<&Construct> {
        if self.constructs.contains_key(&construct.id) {
            return Err(Error::DuplicateConstruct {
                id: construct.id.0,
            });
        }
        tracing::debug!(
            scope = %self.name,
            construct = %construct.id,
            kind = %construct.kind,
            "Attached construct"
        );
        let (index, _) = self.constructs.insert_full(construct.id.clone(), construct);
        Ok(&self.constructs[index])
    }

    /// Construct by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Construct> {
        self.constructs.get(id)
    }

    /// Whether a construct with this id exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.constructs.contains_key(id)
    }

    /// Constructs in attachment order.
    pub fn constructs(&self) -> impl ExactSizeIterator<Item = &Construct> {
        self.constructs.values()
    }

    /// Number of constructs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.constructs.len()
    }

    /// Whether nothing is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constructs.is_empty()
    }

    /// Ids of constructs attached after the first `from` ones.
    pub(crate) fn ids_since(&self, from: usize) -> Vec<ConstructId> {
        self.constructs.keys().skip(from).cloned().collect()
    }

    /// Deterministic JSON view of the scope, for inspection.
    #[must_use]
    pub fn manifest(&self) -> serde_json::Value {
        serde_json::json!({
            "scope": self.name,
            "tags": self.tags,
            "constructs": self.constructs.values().collect::<Vec<_>>(),
        })
    }
}
