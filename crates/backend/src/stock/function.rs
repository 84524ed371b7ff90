//! Handler function.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Principal;
use crate::descriptor::{Descriptor, ResourceKind};

/// Longest allowed timeout, in seconds.
pub const MAX_TIMEOUT_SECS: u32 = 900;

/// Function descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDescriptor {
    /// Function name
    pub name: String,
    /// Entry point of the handler
    pub entry: String,
    /// Timeout in seconds
    pub timeout_secs: u32,
    /// Environment variables
    pub environment: BTreeMap<String, String>,
}

/// A function named `handler` with a 3 second timeout.
#[must_use]
pub fn define_function() -> FunctionDescriptor {
    FunctionDescriptor {
        name: "handler".to_string(),
        entry: "./handler".to_string(),
        timeout_secs: 3,
        environment: BTreeMap::new(),
    }
}

impl FunctionDescriptor {
    /// Set the function name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the entry point.
    #[must_use]
    pub fn with_entry(mut self, entry: impl Into<String>) -> Self {
        self.entry = entry.into();
        self
    }

    /// Set the timeout.
    #[must_use]
    pub fn with_timeout(mut self, secs: u32) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Add an environment variable.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }
}

impl Descriptor for FunctionDescriptor {
    type Realized = FunctionResources;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Function
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("function name cannot be empty".to_string());
        }
        if !(1..=MAX_TIMEOUT_SECS).contains(&self.timeout_secs) {
            return Err(format!(
                "timeout must be between 1 and {MAX_TIMEOUT_SECS} seconds, got {}",
                self.timeout_secs
            ));
        }
        Ok(())
    }
}

/// Provisioned function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionResources {
    /// Deployed function name
    pub function_name: String,
    /// Function identifier
    pub function_arn: String,
    /// Execution role
    pub role_arn: String,
    environment: BTreeMap<String, String>,
}

impl FunctionResources {
    pub(crate) fn from_descriptor(function_arn: String, descriptor: &FunctionDescriptor) -> Self {
        Self {
            function_name: descriptor.name.clone(),
            role_arn: format!("{function_arn}/role"),
            function_arn,
            environment: descriptor.environment.clone(),
        }
    }

    /// Set an environment variable on the deployed function.
    pub fn add_environment(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.environment.insert(key.into(), value.into());
    }

    /// Environment as deployed.
    #[must_use]
    pub fn environment(&self) -> &BTreeMap<String, String> {
        &self.environment
    }
}

impl Principal for FunctionResources {
    fn principal_id(&self) -> &str {
        &self.role_arn
    }
}
