//! Synthesis configuration.
//!
//! Loaded from TOML, then optionally overridden from the environment:
//!
//! ```toml
//! [scope]
//! name = "sandbox"
//!
//! [scope.tags]
//! env = "dev"
//!
//! [log]
//! level = "info"
//! format = "compact"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable overriding [`ScopeConfig::name`].
pub const SCOPE_ENV: &str = "KEYSTONE_SCOPE";

/// Settings for the deployment scope a pass synthesizes into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScopeConfig {
    /// Scope name.
    pub name: String,
    /// Tags applied to the scope.
    pub tags: BTreeMap<String, String>,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            name: "backend".to_string(),
            tags: BTreeMap::new(),
        }
    }
}

/// Top-level configuration of a synthesis run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SynthConfig {
    /// Deployment scope settings.
    pub scope: ScopeConfig,
    /// Logging settings, see `keystone-log`.
    pub log: keystone_log::Config,
}

impl SynthConfig {
    /// Parse configuration from a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source).map_err(|e| Error::Configuration {
            message: format!("invalid TOML: {e}"),
            source: Some(Box::new(e)),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| Error::Configuration {
            message: format!("cannot read {}: {e}", path.display()),
            source: Some(Box::new(e)),
        })?;
        Self::from_toml_str(&source)
    }

    /// Apply environment overrides: [`SCOPE_ENV`] for the scope name and
    /// `keystone-log`'s variables for logging.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.apply_env(|name| std::env::var(name).ok())
    }

    /// Same as [`with_env_overrides`](Self::with_env_overrides), reading
    /// variables through `var`.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] if the resulting scope name is empty.
    pub fn apply_env(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(name) = var(SCOPE_ENV) {
            self.scope.name = name;
        }
        self.log = self.log.apply_env(&var);
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if self.scope.name.trim().is_empty() {
            return Err(Error::configuration("scope name must not be empty"));
        }
        Ok(())
    }
}
