//! Resource registry: the immutable, uniquely-keyed aggregate of descriptors.
//!
//! A registry is assembled once from `(name, descriptor)` pairs and never
//! changes afterwards. Keys keep their input order so anything derived from
//! the registry (provisioning order, reports, manifests) is deterministic.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::descriptor::{AnyDescriptor, Descriptor};
use crate::error::{Error, Result};
use crate::key::ResourceKey;

/// Shared, type-erased descriptor as stored in a [`Registry`].
pub type SharedDescriptor = Arc<dyn AnyDescriptor>;

/// Immutable mapping from resource key to descriptor.
///
/// Cloning is cheap: descriptors are shared.
#[derive(Clone, Default)]
pub struct Registry {
    entries: IndexMap<ResourceKey, SharedDescriptor>,
}

impl Registry {
    /// Start a [`RegistryBuilder`].
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Assemble a registry from `(name, descriptor)` pairs.
    ///
    /// A `None` descriptor stands for a builder collaborator that produced
    /// nothing.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidKey`] if a name is not a valid [`ResourceKey`]
    /// - [`Error::DuplicateName`] if two pairs share a name
    /// - [`Error::InvalidDescriptor`] if a descriptor is absent or fails
    ///   its own validation
    pub fn assemble<I, K>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Option<SharedDescriptor>)>,
        K: AsRef<str>,
    {
        // All names first, then descriptors.
        let mut named: IndexMap<ResourceKey, Option<SharedDescriptor>> = IndexMap::new();
        for (name, descriptor) in pairs {
            let key = ResourceKey::new(name.as_ref())?;
            if named.contains_key(&key) {
                return Err(Error::DuplicateName { key: key.into() });
            }
            named.insert(key, descriptor);
        }

        let mut entries = IndexMap::with_capacity(named.len());
        for (key, descriptor) in named {
            let descriptor = descriptor.ok_or_else(|| {
                Error::invalid_descriptor(key.as_str(), "builder produced no descriptor")
            })?;
            descriptor
                .check()
                .map_err(|reason| Error::invalid_descriptor(key.as_str(), reason))?;

            tracing::debug!(
                resource = %key,
                kind = %descriptor.resource_kind(),
                descriptor = descriptor.descriptor_type(),
                "Assembled resource"
            );
            entries.insert(key, descriptor);
        }

        Ok(Self { entries })
    }

    /// Number of resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no resources.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `key` names a resource in this registry.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys in assembly order.
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &ResourceKey> {
        self.entries.keys()
    }

    /// `(key, descriptor)` pairs in assembly order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&ResourceKey, &dyn AnyDescriptor)> {
        self.entries.iter().map(|(k, d)| (k, &**d))
    }

    /// Type-erased descriptor under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&dyn AnyDescriptor> {
        self.entries.get(key).map(|d| &**d)
    }

    /// Typed descriptor under `key`.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownResourceKey`] if the key is not in the registry,
    /// [`Error::DescriptorTypeMismatch`] if the descriptor is not a `D`.
    pub fn get_as<D: Descriptor>(&self, key: &str) -> Result<&D> {
        let descriptor = self.get(key).ok_or_else(|| self.unknown_key(key))?;
        descriptor
            .downcast_ref::<D>()
            .ok_or_else(|| Error::DescriptorTypeMismatch {
                key: key.to_string(),
                expected: std::any::type_name::<D>(),
            })
    }

    pub(crate) fn unknown_key(&self, key: &str) -> Error {
        Error::UnknownResourceKey {
            key: key.to_string(),
            available: self.entries.keys().map(ToString::to_string).collect(),
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = (&'a ResourceKey, &'a dyn AnyDescriptor);
    type IntoIter = Box<dyn Iterator<Item = Self::Item> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// Fluent front-end to [`Registry::assemble`].
///
/// Nothing is validated until [`build`](Self::build), so the builder can
/// be chained without intermediate `?`.
#[derive(Default)]
pub struct RegistryBuilder {
    pairs: Vec<(String, Option<SharedDescriptor>)>,
}

impl RegistryBuilder {
    /// Add a resource.
    pub fn with<D: Descriptor>(mut self, key: impl Into<String>, descriptor: D) -> Self {
        let descriptor: SharedDescriptor = Arc::new(descriptor);
        self.pairs.push((key.into(), Some(descriptor)));
        self
    }

    /// Add a resource whose builder may have produced nothing.
    pub fn with_optional<D: Descriptor>(
        mut self,
        key: impl Into<String>,
        descriptor: Option<D>,
    ) -> Self {
        let descriptor = descriptor.map(|d| Arc::new(d) as SharedDescriptor);
        self.pairs.push((key.into(), descriptor));
        self
    }

    /// Add an already shared descriptor.
    pub fn with_shared(mut self, key: impl Into<String>, descriptor: SharedDescriptor) -> Self {
        self.pairs.push((key.into(), Some(descriptor)));
        self
    }

    /// Assemble the registry.
    pub fn build(self) -> Result<Registry> {
        Registry::assemble(self.pairs)
    }
}

impl fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("pending", &self.pairs.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ResourceKind;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone)]
    struct Table {
        name: &'static str,
    }

    #[derive(Debug)]
    struct TableArn;

    impl Descriptor for Table {
        type Realized = TableArn;

        fn kind(&self) -> ResourceKind {
            ResourceKind::Data
        }

        fn validate(&self) -> std::result::Result<(), String> {
            if self.name.is_empty() {
                Err("table name is empty".into())
            } else {
                Ok(())
            }
        }
    }

    #[derive(Debug)]
    struct Bucket;

    impl Descriptor for Bucket {
        type Realized = ();

        fn kind(&self) -> ResourceKind {
            ResourceKind::Storage
        }
    }

    fn table(name: &'static str) -> Table {
        Table { name }
    }

    #[test]
    fn preserves_insertion_order() {
        let registry = Registry::builder()
            .with("zeta", table("z"))
            .with("alpha", table("a"))
            .with("mid", Bucket)
            .build()
            .unwrap();

        let keys: Vec<&str> = registry.keys().map(ResourceKey::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn duplicate_name_fails() {
        let err = Registry::builder()
            .with("data", table("a"))
            .with("data", Bucket)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateName { ref key } if key == "data"));
    }

    #[test]
    fn duplicate_name_wins_over_bad_first_copy() {
        let err = Registry::builder()
            .with_optional::<Bucket>("data", None)
            .with("data", table("a"))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateName { ref key } if key == "data"));

        let err = Registry::builder()
            .with("data", table(""))
            .with("data", table("a"))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateName { ref key } if key == "data"));
    }

    #[test]
    fn absent_descriptor_fails() {
        let err = Registry::builder()
            .with("data", table("a"))
            .with_optional::<Bucket>("storage", None)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDescriptor { ref key, .. } if key == "storage"));
    }

    #[test]
    fn descriptor_validation_reason_is_reported() {
        let err = Registry::builder().with("data", table("")).build().unwrap_err();
        match err {
            Error::InvalidDescriptor { key, reason } => {
                assert_eq!(key, "data");
                assert_eq!(reason, "table name is empty");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_key_fails() {
        let err = Registry::builder().with("file-storage", Bucket).build().unwrap_err();
        assert!(matches!(err, Error::InvalidKey { .. }));
    }

    #[test]
    fn typed_lookup() {
        let registry = Registry::builder()
            .with("data", table("todos"))
            .with("storage", Bucket)
            .build()
            .unwrap();

        assert_eq!(registry.get_as::<Table>("data").unwrap().name, "todos");
        assert!(matches!(
            registry.get_as::<Table>("storage"),
            Err(Error::DescriptorTypeMismatch { .. })
        ));
        match registry.get_as::<Table>("auth") {
            Err(Error::UnknownResourceKey { key, available }) => {
                assert_eq!(key, "auth");
                assert_eq!(available, vec!["data".to_string(), "storage".to_string()]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn empty_registry_is_valid() {
        let registry = Registry::builder().build().unwrap();
        assert!(registry.is_empty());
        assert!(!registry.contains("auth"));
    }

    #[test]
    fn clones_share_descriptors() {
        let registry = Registry::builder().with("data", table("t")).build().unwrap();
        let copy = registry.clone();
        let a = registry.get("data").unwrap() as *const dyn AnyDescriptor;
        let b = copy.get("data").unwrap() as *const dyn AnyDescriptor;
        assert!(std::ptr::addr_eq(a, b));
    }
}
