//! File storage.

use serde::{Deserialize, Serialize};

use super::{Access, Grant, Principal, record_grant};
use crate::descriptor::{Descriptor, ResourceKind};

/// Access granted to a path prefix for signed-in users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRule {
    /// Path prefix, e.g. `media/*`
    pub path: String,
    /// Allowed access
    pub access: Access,
}

/// Storage descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageDescriptor {
    /// Logical bucket name; lowercase
    pub name: String,
    /// Path rules
    pub rules: Vec<AccessRule>,
}

/// Bucket `storage` without path rules.
#[must_use]
pub fn define_storage() -> StorageDescriptor {
    StorageDescriptor {
        name: "storage".to_string(),
        rules: Vec::new(),
    }
}

impl StorageDescriptor {
    /// Set the bucket name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Allow `access` under `path`.
    #[must_use]
    pub fn allow(mut self, path: impl Into<String>, access: Access) -> Self {
        self.rules.push(AccessRule {
            path: path.into(),
            access,
        });
        self
    }
}

impl Descriptor for StorageDescriptor {
    type Realized = StorageResources;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Storage
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("bucket name cannot be empty".to_string());
        }
        if self.name.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(format!("bucket name '{}' must be lowercase", self.name));
        }
        Ok(())
    }
}

/// Provisioned bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageResources {
    /// Physical bucket name, unique per scope
    pub bucket_name: String,
    /// Bucket identifier
    pub bucket_arn: String,
    /// Path rules
    pub rules: Vec<AccessRule>,
    grants: Vec<Grant>,
}

impl StorageResources {
    pub(crate) fn from_descriptor(
        bucket_arn: String,
        scope: &str,
        descriptor: &StorageDescriptor,
    ) -> Self {
        Self {
            bucket_name: format!("{}-{}", descriptor.name, scope.to_ascii_lowercase()),
            bucket_arn,
            rules: descriptor.rules.clone(),
            grants: Vec::new(),
        }
    }

    /// Give `principal` access to the whole bucket.
    pub fn grant(&mut self, principal: &impl Principal, access: Access) {
        record_grant(&mut self.grants, principal.principal_id(), access);
    }

    /// Grants in the order they were first made.
    #[must_use]
    pub fn grants(&self) -> &[Grant] {
        &self.grants
    }
}
