//! # Keystone Backend
//!
//! Declarative resource composition for backends. A backend is a struct
//! of resource descriptors plus two optional hooks:
//!
//! - a **composition hook** that wires the realized resources together,
//! - a **custom hook** that attaches arbitrary constructs to the
//!   [`DeploymentScope`].
//!
//! Both hooks are typed over the backend's own shape, so they can only
//! touch the resources the backend actually declares.
//!
//! ```
//! use keystone_backend::stock::{self, Access, AuthDescriptor, DataDescriptor};
//! use keystone_backend::{Backend, DeploymentScope, Synthesizer, define_backend};
//!
//! #[derive(Debug, Backend)]
//! struct Config {
//!     auth: AuthDescriptor,
//!     data: DataDescriptor,
//! }
//!
//! let backend = define_backend(Config {
//!     auth: stock::define_auth(),
//!     data: stock::define_data(),
//! })?
//! .compose(|resources: &mut ConfigResources| {
//!     resources.data.grant(&resources.auth, Access::Read);
//!     Ok(())
//! });
//!
//! let mut scope = DeploymentScope::new("sandbox");
//! let synthesis = Synthesizer::new(stock::provisioner()).run(backend, &mut scope)?;
//! assert_eq!(synthesis.resources.data.grants().len(), 1);
//! # Ok::<(), keystone_backend::Error>(())
//! ```
//!
//! A hook that reaches for a key the backend does not declare is rejected
//! by the compiler:
//!
//! ```compile_fail
//! use keystone_backend::stock::{self, AuthDescriptor, DataDescriptor};
//! use keystone_backend::{Backend, define_backend};
//!
//! #[derive(Debug, Backend)]
//! struct Config {
//!     auth: AuthDescriptor,
//!     data: DataDescriptor,
//! }
//!
//! let backend = define_backend(Config {
//!     auth: stock::define_auth(),
//!     data: stock::define_data(),
//! })
//! .unwrap()
//! .compose(|resources: &mut ConfigResources| {
//!     let _ = &resources.storage;
//!     Ok(())
//! });
//! ```
//!
//! So is a backend with two fields under the same key:
//!
//! ```compile_fail
//! use keystone_backend::Backend;
//! use keystone_backend::stock::DataDescriptor;
//!
//! #[derive(Debug, Backend)]
//! struct Config {
//!     data: DataDescriptor,
//!     #[backend(rename = "data")]
//!     other: DataDescriptor,
//! }
//! ```
//!
//! When the key set is only known at runtime, a [`Registry`] is itself a
//! backend. Its hooks receive a [`RealizedRegistry`], and every access to a
//! key outside the registry fails with [`Error::UnknownResourceKey`]. Raised
//! inside a hook, it reaches the caller wrapped in [`Error::Hook`];
//! [`Error::hook_inner`] returns it.

extern crate self as keystone_backend;

pub mod backend;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod hooks;
pub mod key;
pub mod provision;
pub mod realized;
pub mod registry;
pub mod scope;
pub mod synth;

#[cfg(feature = "stock")]
pub mod stock;

pub use backend::{Backend, BackendDefinition, define_backend};
pub use config::{ScopeConfig, SynthConfig};
pub use descriptor::{AnyDescriptor, Descriptor, ResourceKind};
pub use error::{Error, Result};
pub use hooks::{
    ComposeHook, Composition, CustomHook, CustomResources, HookError, HookKind, HookOutcome,
    HookPresence, HookResult, HookSet, Link,
};
pub use key::ResourceKey;
pub use provision::{Provision, Provisioner};
pub use realized::{RealizedRegistry, RealizedResource};
pub use registry::{Registry, RegistryBuilder};
pub use scope::{Construct, ConstructId, DeploymentScope};
pub use synth::{Synthesis, SynthesisReport, Synthesizer};

#[cfg(feature = "derive")]
pub use keystone_backend_macros::Backend;
