//! Error types for backend assembly and synthesis
use thiserror::Error;

use crate::hooks::{HookError, HookKind};

/// Result type for backend operations
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure that can abort registry assembly or a synthesis pass.
///
/// None of these are recoverable inside a pass: the driver reports them and
/// decides whether to start a new pass.
#[derive(Error, Debug)]
pub enum Error {
    /// Two resource definitions share a key
    #[error("Duplicate resource name '{key}'")]
    DuplicateName {
        /// The repeated key
        key: String,
    },

    /// A resource name is not a valid key
    #[error("Invalid resource key '{key}': {reason}")]
    InvalidKey {
        /// The rejected key
        key: String,
        /// Why the key was rejected
        reason: String,
    },

    /// A descriptor is absent or rejected its own validation
    #[error("Invalid descriptor for resource '{key}': {reason}")]
    InvalidDescriptor {
        /// The resource key
        key: String,
        /// The rejection reason
        reason: String,
    },

    /// A key outside the registry's key set was accessed
    #[error("Unknown resource key '{key}' (available: {})", available.join(", "))]
    UnknownResourceKey {
        /// The key that was asked for
        key: String,
        /// The keys that do exist, in registry order
        available: Vec<String>,
    },

    /// A registry key has no realized counterpart
    #[error("Resource '{key}' was not realized")]
    MissingRealized {
        /// The resource key
        key: String,
    },

    /// A descriptor was read back as the wrong type
    #[error("Descriptor for resource '{key}' is not a {expected}")]
    DescriptorTypeMismatch {
        /// The resource key
        key: String,
        /// The requested descriptor type
        expected: &'static str,
    },

    /// A realized resource does not have the type its descriptor declares
    #[error("Realized resource '{key}' has type {found}, expected {expected}")]
    RealizedTypeMismatch {
        /// The resource key
        key: String,
        /// The type the descriptor declares
        expected: &'static str,
        /// The type the provisioner produced
        found: &'static str,
    },

    /// The provisioning collaborator failed to realize a descriptor
    #[error("Provisioning failed for resource '{key}': {reason}")]
    Provisioning {
        /// The resource key
        key: String,
        /// The failure reason
        reason: String,
        /// The underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A construct id is already taken in the deployment scope
    #[error("Construct '{id}' already exists in the deployment scope")]
    DuplicateConstruct {
        /// The construct id
        id: String,
    },

    /// An error raised inside a composition or custom hook
    #[error("{hook} hook failed: {source}")]
    Hook {
        /// Which hook raised the error
        hook: HookKind,
        /// The hook's own error, untouched
        #[source]
        source: HookError,
    },

    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Configuration {
        /// The error message
        message: String,
        /// The underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a provisioning error without an underlying cause
    pub fn provisioning(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Provisioning {
            key: key.into(),
            reason: reason.into(),
            source: None,
        }
    }

    /// Create an invalid-descriptor error
    pub fn invalid_descriptor(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Get the resource key associated with this error (if any)
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::DuplicateName { key }
            | Self::InvalidKey { key, .. }
            | Self::InvalidDescriptor { key, .. }
            | Self::UnknownResourceKey { key, .. }
            | Self::MissingRealized { key }
            | Self::DescriptorTypeMismatch { key, .. }
            | Self::RealizedTypeMismatch { key, .. }
            | Self::Provisioning { key, .. } => Some(key),
            Self::DuplicateConstruct { .. } | Self::Hook { .. } | Self::Configuration { .. } => {
                None
            }
        }
    }

    /// Which hook raised this error, if it came from a hook body
    #[must_use]
    pub fn hook(&self) -> Option<HookKind> {
        match self {
            Self::Hook { hook, .. } => Some(*hook),
            _ => None,
        }
    }

    /// The keystone error a hook body propagated, such as an
    /// [`Error::UnknownResourceKey`] from a realized registry lookup.
    #[must_use]
    pub fn hook_inner(&self) -> Option<&Error> {
        match self {
            Self::Hook { source, .. } => source.downcast_ref::<Error>(),
            _ => None,
        }
    }

    /// Take back the error a hook body returned, exactly as it was raised.
    pub fn into_hook_source(self) -> Option<HookError> {
        match self {
            Self::Hook { source, .. } => Some(source),
            _ => None,
        }
    }
}
