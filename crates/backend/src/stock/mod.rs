//! Stock resource descriptors and their reference provisioner.
//!
//! Four capabilities cover a typical backend: [`auth`], [`data`],
//! [`storage`] and [`function`]. Each has a zero-argument factory
//! (`define_auth()` and so on) returning a descriptor with sensible
//! defaults that can be adjusted with builder methods.
//!
//! [`provisioner()`] realizes them into a [`DeploymentScope`], adding one
//! construct per resource under the resource's key. Identifiers it produces
//! are deterministic: `arn:keystone:<service>:<scope>:<key>`.

pub mod auth;
pub mod data;
pub mod function;
pub mod storage;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::key::ResourceKey;
use crate::provision::Provisioner;
use crate::scope::{Construct, DeploymentScope};

pub use auth::{AuthDescriptor, AuthResources, AuthTrigger, LoginMethod, define_auth};
pub use data::{AuthorizationMode, DataDescriptor, DataResources, Model, define_data};
pub use function::{FunctionDescriptor, FunctionResources, define_function};
pub use storage::{AccessRule, StorageDescriptor, StorageResources, define_storage};

/// Level of access granted to a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    /// Read only
    Read,
    /// Write only
    Write,
    /// Read and write
    ReadWrite,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
            Self::ReadWrite => write!(f, "read_write"),
        }
    }
}

/// A realized resource that can be granted access to another one.
pub trait Principal {
    /// Identifier used in grants.
    fn principal_id(&self) -> &str;
}

/// Access recorded on a realized resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grant {
    /// Who gets access.
    pub principal: String,
    /// What kind of access.
    pub access: Access,
}

pub(crate) fn arn(service: &str, scope: &DeploymentScope, key: &ResourceKey) -> String {
    format!("arn:keystone:{service}:{}:{key}", scope.name())
}

/// Record a grant, widening an existing one for the same principal.
pub(crate) fn record_grant(grants: &mut Vec<Grant>, principal: &str, access: Access) {
    match grants.iter_mut().find(|g| g.principal == principal) {
        Some(existing) if existing.access != access => existing.access = Access::ReadWrite,
        Some(_) => {}
        None => grants.push(Grant {
            principal: principal.to_string(),
            access,
        }),
    }
}

/// Reference provisioner for the four stock descriptors.
#[must_use]
pub fn provisioner() -> Provisioner {
    Provisioner::new()
        .handle::<AuthDescriptor, _>(|key, auth, scope| {
            let realized = AuthResources::from_descriptor(arn("cognito", scope, key), auth);
            scope.add(
                Construct::new(key.as_str(), "auth.user_pool")
                    .with_property("arn", realized.user_pool_arn.clone())
                    .with_property("login", serde_json::to_value(&auth.login).unwrap_or_default())
                    .with_property("groups", auth.groups.clone()),
            )?;
            Ok(realized)
        })
        .handle::<DataDescriptor, _>(|key, data, scope| {
            let realized = DataResources::from_descriptor(arn("appsync", scope, key), data);
            scope.add(
                Construct::new(key.as_str(), "data.graphql_api")
                    .with_property("arn", realized.api_arn.clone())
                    .with_property("authorization", data.authorization.to_string())
                    .with_property("models", realized.models.clone()),
            )?;
            Ok(realized)
        })
        .handle::<StorageDescriptor, _>(|key, storage, scope| {
            let realized =
                StorageResources::from_descriptor(arn("s3", scope, key), scope.name(), storage);
            scope.add(
                Construct::new(key.as_str(), "storage.bucket")
                    .with_property("arn", realized.bucket_arn.clone())
                    .with_property("bucket", realized.bucket_name.clone())
                    .with_property("rules", serde_json::to_value(&storage.rules).unwrap_or_default()),
            )?;
            Ok(realized)
        })
        .handle::<FunctionDescriptor, _>(|key, function, scope| {
            let realized = FunctionResources::from_descriptor(arn("lambda", scope, key), function);
            scope.add(
                Construct::new(key.as_str(), "function.lambda")
                    .with_property("arn", realized.function_arn.clone())
                    .with_property("entry", function.entry.clone())
                    .with_property("timeout", function.timeout_secs),
            )?;
            Ok(realized)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provision::Provision;
    use rstest::rstest;

    #[rstest]
    #[case(&[Access::Read], Access::Read)]
    #[case(&[Access::Read, Access::Read], Access::Read)]
    #[case(&[Access::Read, Access::Write], Access::ReadWrite)]
    #[case(&[Access::ReadWrite, Access::Read], Access::ReadWrite)]
    fn grants_widen_per_principal(#[case] granted: &[Access], #[case] expected: Access) {
        let mut grants = Vec::new();
        for access in granted {
            record_grant(&mut grants, "role/handler", *access);
        }
        assert_eq!(
            grants,
            vec![Grant {
                principal: "role/handler".into(),
                access: expected,
            }]
        );
    }

    #[test]
    fn stock_provisioner_handles_every_stock_descriptor() {
        let provisioner = provisioner();
        assert!(provisioner.handles::<AuthDescriptor>());
        assert!(provisioner.handles::<DataDescriptor>());
        assert!(provisioner.handles::<StorageDescriptor>());
        assert!(provisioner.handles::<FunctionDescriptor>());
    }

    #[test]
    fn bucket_construct_carries_access_rules() {
        let storage = define_storage()
            .allow("media/*", Access::Read)
            .allow("uploads/*", Access::ReadWrite);
        let key = ResourceKey::new("files").unwrap();
        let mut scope = DeploymentScope::new("dev");
        provisioner().provision(&key, &storage, &mut scope).unwrap();

        assert_eq!(
            scope.get("files").and_then(|c| c.property("rules")),
            Some(&serde_json::json!([
                { "path": "media/*", "access": "read" },
                { "path": "uploads/*", "access": "read_write" },
            ]))
        );
    }

    #[test]
    fn arn_is_scoped() {
        let scope = DeploymentScope::new("sandbox");
        let key = ResourceKey::new("fileStorage").unwrap();
        assert_eq!(arn("s3", &scope, &key), "arn:keystone:s3:sandbox:fileStorage");
    }
}
