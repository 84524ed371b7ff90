//! Backend definitions: a typed configuration plus its optional hooks.
//!
//! A backend author writes a struct of descriptors, derives [`Backend`] for
//! it and exports a [`BackendDefinition`]:
//!
//! ```ignore
//! #[derive(Backend)]
//! pub struct Config {
//!     auth: AuthDescriptor,
//!     data: DataDescriptor,
//! }
//!
//! let backend = define_backend(Config { auth: define_auth(), data: define_data() })?
//!     .compose(|resources: &mut ConfigResources| {
//!         resources.data.grant(&resources.auth, DataAccess::Read);
//!         Ok(())
//!     });
//! ```
//!
//! The derive generates `ConfigResources` with one field per key, so a hook
//! that names a key the config does not have is a compile error. Using a
//! plain [`Registry`] as the backend keeps the same contract at runtime
//! instead: the hooks get a [`RealizedRegistry`] and unknown keys fail with
//! [`Error::UnknownResourceKey`](crate::Error::UnknownResourceKey).

use std::fmt;

use crate::error::Result;
use crate::hooks::{
    ComposeHook, Composition, CustomHook, CustomResources, HookPresence, HookResult, HookSet,
};
use crate::realized::RealizedRegistry;
use crate::registry::Registry;
use crate::scope::DeploymentScope;

/// A typed aggregate of resource descriptors.
///
/// Usually derived with `#[derive(Backend)]`.
pub trait Backend: Send + 'static {
    /// Realized counterpart: same keys, realized types.
    type Realized: Send + 'static;

    /// Assemble the type-erased registry view of this backend.
    fn registry(&self) -> Result<Registry>;

    /// Convert the realized registry into [`Self::Realized`].
    ///
    /// Fails if the realized key set differs from the registry's or a value
    /// has the wrong type.
    fn realize(&self, realized: RealizedRegistry) -> Result<Self::Realized>;
}

/// Dynamic backend: keys are only known at runtime, hooks receive the
/// [`RealizedRegistry`] itself.
impl Backend for Registry {
    type Realized = RealizedRegistry;

    fn registry(&self) -> Result<Registry> {
        Ok(self.clone())
    }

    fn realize(&self, realized: RealizedRegistry) -> Result<RealizedRegistry> {
        let keys: Vec<&str> = self.keys().map(|k| k.as_str()).collect();
        realized.expect_keys(&keys)?;
        Ok(realized)
    }
}

/// What a backend exports: its configuration, the assembled registry and
/// the two optional hooks.
pub struct BackendDefinition<B: Backend> {
    config: B,
    registry: Registry,
    compose: Option<ComposeHook<B::Realized>>,
    custom: Option<CustomHook<B::Realized>>,
}

/// Assemble `config` into a [`BackendDefinition`] without hooks.
pub fn define_backend<B: Backend>(config: B) -> Result<BackendDefinition<B>> {
    BackendDefinition::new(config)
}

impl<B: Backend> BackendDefinition<B> {
    /// Assemble the registry of `config`.
    ///
    /// # Errors
    ///
    /// Whatever [`Backend::registry`] reports: duplicate names, invalid keys
    /// or invalid descriptors.
    pub fn new(config: B) -> Result<Self> {
        let registry = config.registry()?;
        tracing::debug!(resources = registry.len(), "Defined backend");
        Ok(Self {
            config,
            registry,
            compose: None,
            custom: None,
        })
    }

    /// Declare the composition hook, replacing any previous one.
    pub fn compose<F, O>(mut self, hook: F) -> Self
    where
        F: FnOnce(&mut B::Realized) -> HookResult<O> + Send + 'static,
        O: Into<Composition>,
    {
        self.compose = Some(ComposeHook::new(hook));
        self
    }

    /// Declare the custom hook, replacing any previous one.
    pub fn custom<F, O>(mut self, hook: F) -> Self
    where
        F: FnOnce(&mut B::Realized, &mut DeploymentScope) -> HookResult<O> + Send + 'static,
        O: Into<CustomResources>,
    {
        self.custom = Some(CustomHook::new(hook));
        self
    }

    /// The typed configuration.
    #[must_use]
    pub fn config(&self) -> &B {
        &self.config
    }

    /// The assembled registry.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Which hooks are declared.
    #[must_use]
    pub fn hooks(&self) -> HookSet {
        HookSet {
            compose: presence(self.compose.is_some()),
            custom: presence(self.custom.is_some()),
        }
    }

    pub(crate) fn into_parts(self) -> DefinitionParts<B> {
        DefinitionParts {
            config: self.config,
            registry: self.registry,
            compose: self.compose,
            custom: self.custom,
        }
    }
}

fn presence(declared: bool) -> HookPresence {
    if declared {
        HookPresence::Present
    } else {
        HookPresence::Absent
    }
}

impl<B: Backend + fmt::Debug> fmt::Debug for BackendDefinition<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendDefinition")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("hooks", &self.hooks())
            .finish()
    }
}

/// A definition taken apart by the synthesis driver.
pub(crate) struct DefinitionParts<B: Backend> {
    pub(crate) config: B,
    pub(crate) registry: Registry,
    pub(crate) compose: Option<ComposeHook<B::Realized>>,
    pub(crate) custom: Option<CustomHook<B::Realized>>,
}
