//! Realized resources: the provisioned counterparts of descriptors.
//!
//! [`RealizedRegistry`] is the runtime form of the hook parameter. It has
//! exactly the registry's keys, and every access outside that key set fails
//! with [`Error::UnknownResourceKey`]. Derived backends convert it into a
//! plain struct so the same guarantee holds at compile time.

use std::any::{Any, TypeId, type_name};
use std::fmt;

use indexmap::IndexMap;

use crate::descriptor::ResourceKind;
use crate::error::{Error, Result};
use crate::key::ResourceKey;

/// One provisioned resource, type-erased.
pub struct RealizedResource {
    kind: ResourceKind,
    type_id: TypeId,
    type_name: &'static str,
    value: Box<dyn Any + Send + Sync>,
    debug: fn(&(dyn Any + Send + Sync), &mut fmt::Formatter<'_>) -> fmt::Result,
}

impl RealizedResource {
    /// Wrap a realized value.
    pub fn new<R>(kind: ResourceKind, value: R) -> Self
    where
        R: fmt::Debug + Send + Sync + 'static,
    {
        Self {
            kind,
            type_id: TypeId::of::<R>(),
            type_name: type_name::<R>(),
            value: Box::new(value),
            debug: debug_as::<R>,
        }
    }

    /// Capability of the descriptor this was realized from.
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// `TypeId` of the wrapped value.
    #[must_use]
    pub fn value_type_id(&self) -> TypeId {
        self.type_id
    }

    /// Type name of the wrapped value.
    #[must_use]
    pub fn value_type(&self) -> &'static str {
        self.type_name
    }

    /// Whether the wrapped value is an `R`.
    #[must_use]
    pub fn is<R: Any>(&self) -> bool {
        self.type_id == TypeId::of::<R>()
    }

    /// Borrow the wrapped value as an `R`.
    #[must_use]
    pub fn downcast_ref<R: Any>(&self) -> Option<&R> {
        self.value.downcast_ref::<R>()
    }

    /// Mutably borrow the wrapped value as an `R`.
    pub fn downcast_mut<R: Any>(&mut self) -> Option<&mut R> {
        self.value.downcast_mut::<R>()
    }

    /// Take the wrapped value, or get `self` back if it is not an `R`.
    pub fn downcast<R: Any>(self) -> std::result::Result<R, Self> {
        let Self {
            kind,
            type_id,
            type_name,
            value,
            debug,
        } = self;
        match value.downcast::<R>() {
            Ok(value) => Ok(*value),
            Err(value) => Err(Self {
                kind,
                type_id,
                type_name,
                value,
                debug,
            }),
        }
    }
}

fn debug_as<R: fmt::Debug + 'static>(
    value: &(dyn Any + Send + Sync),
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    match value.downcast_ref::<R>() {
        Some(value) => value.fmt(f),
        None => f.write_str("<?>"),
    }
}

impl fmt::Debug for RealizedResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (self.debug)(self.value.as_ref(), f)
    }
}

/// Realized resources keyed exactly like the registry they came from.
///
/// Built by the synthesis driver, one entry per registry entry, in
/// registry order. There is no way to add a key after construction.
#[derive(Default)]
pub struct RealizedRegistry {
    entries: IndexMap<ResourceKey, RealizedResource>,
}

impl RealizedRegistry {
    /// Build from `(key, resource)` pairs, rejecting repeated keys.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (ResourceKey, RealizedResource)>,
    {
        let mut map = IndexMap::new();
        for (key, resource) in entries {
            if map.contains_key(&key) {
                return Err(Error::DuplicateName { key: key.into() });
            }
            map.insert(key, resource);
        }
        Ok(Self { entries: map })
    }

    /// Number of realized resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was realized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys in registry order.
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &ResourceKey> {
        self.entries.keys()
    }

    /// `(key, resource)` pairs in registry order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&ResourceKey, &RealizedResource)> {
        self.entries.iter()
    }

    /// Type-erased resource under `key`.
    pub fn resource(&self, key: &str) -> Result<&RealizedResource> {
        self.entries.get(key).ok_or_else(|| self.unknown_key(key))
    }

    /// Typed resource under `key`.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownResourceKey`] if `key` is not present,
    /// [`Error::RealizedTypeMismatch`] if the resource is not an `R`.
    pub fn get<R: Any>(&self, key: &str) -> Result<&R> {
        let resource = self.resource(key)?;
        resource
            .downcast_ref::<R>()
            .ok_or_else(|| mismatch::<R>(key, resource))
    }

    /// Typed mutable resource under `key`.
    pub fn get_mut<R: Any>(&mut self, key: &str) -> Result<&mut R> {
        if !self.entries.contains_key(key) {
            return Err(self.unknown_key(key));
        }
        let resource = &mut self.entries[key];
        let found = resource.value_type();
        resource
            .downcast_mut::<R>()
            .ok_or_else(|| Error::RealizedTypeMismatch {
                key: key.to_string(),
                expected: type_name::<R>(),
                found,
            })
    }

    /// Move the resource under `key` out, as an `R`.
    ///
    /// Used when converting into a typed realized struct. A key taken once
    /// is gone; taking it again reports [`Error::MissingRealized`].
    pub fn take<R: Any>(&mut self, key: &str) -> Result<R> {
        let Some((index, owned_key, resource)) = self.entries.shift_remove_full(key) else {
            return Err(Error::MissingRealized {
                key: key.to_string(),
            });
        };
        resource.downcast::<R>().map_err(|resource| {
            let err = mismatch::<R>(key, &resource);
            self.entries.shift_insert(index, owned_key, resource);
            err
        })
    }

    /// Check that the key set is exactly `expected`.
    ///
    /// # Errors
    ///
    /// [`Error::MissingRealized`] for the first expected key that is absent,
    /// [`Error::UnknownResourceKey`] for the first present key that was not
    /// expected.
    pub fn expect_keys<K: AsRef<str>>(&self, expected: &[K]) -> Result<()> {
        if let Some(missing) = expected
            .iter()
            .map(AsRef::as_ref)
            .find(|key| !self.entries.contains_key(*key))
        {
            return Err(Error::MissingRealized {
                key: missing.to_string(),
            });
        }
        if let Some(extra) = self
            .entries
            .keys()
            .find(|key| !expected.iter().any(|e| e.as_ref() == key.as_str()))
        {
            return Err(Error::UnknownResourceKey {
                key: extra.to_string(),
                available: expected.iter().map(|k| k.as_ref().to_string()).collect(),
            });
        }
        Ok(())
    }

    fn unknown_key(&self, key: &str) -> Error {
        Error::UnknownResourceKey {
            key: key.to_string(),
            available: self.entries.keys().map(ToString::to_string).collect(),
        }
    }
}

fn mismatch<R: Any>(key: &str, resource: &RealizedResource) -> Error {
    Error::RealizedTypeMismatch {
        key: key.to_string(),
        expected: type_name::<R>(),
        found: resource.value_type(),
    }
}

impl fmt::Debug for RealizedRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}
