//! User authentication.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::Principal;
use super::function::FunctionResources;
use crate::descriptor::{Descriptor, ResourceKind};

/// How users sign in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginMethod {
    /// Email and password
    Email,
    /// Phone number and SMS code
    Phone,
    /// Federated identity provider, by name
    External(String),
}

/// Points in the authentication flow a function can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthTrigger {
    /// Before a user is created
    PreSignUp,
    /// After a user confirmed their account
    PostConfirmation,
    /// Before tokens are issued
    PreTokenGeneration,
}

impl fmt::Display for AuthTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PreSignUp => write!(f, "pre_sign_up"),
            Self::PostConfirmation => write!(f, "post_confirmation"),
            Self::PreTokenGeneration => write!(f, "pre_token_generation"),
        }
    }
}

/// Authentication descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthDescriptor {
    /// Enabled login methods
    pub login: Vec<LoginMethod>,
    /// User groups
    pub groups: Vec<String>,
}

/// Email login, no groups.
#[must_use]
pub fn define_auth() -> AuthDescriptor {
    AuthDescriptor {
        login: vec![LoginMethod::Email],
        groups: Vec::new(),
    }
}

impl AuthDescriptor {
    /// Replace the login methods.
    #[must_use]
    pub fn with_login(mut self, login: impl IntoIterator<Item = LoginMethod>) -> Self {
        self.login = login.into_iter().collect();
        self
    }

    /// Add a user group.
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }
}

impl Descriptor for AuthDescriptor {
    type Realized = AuthResources;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Auth
    }

    fn validate(&self) -> Result<(), String> {
        if self.login.is_empty() {
            return Err("at least one login method is required".to_string());
        }
        Ok(())
    }
}

/// Provisioned user pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResources {
    /// User pool identifier
    pub user_pool_arn: String,
    /// Role assumed by signed-in users
    pub authenticated_role: String,
    /// User groups
    pub groups: Vec<String>,
    triggers: BTreeMap<AuthTrigger, String>,
}

impl AuthResources {
    pub(crate) fn from_descriptor(user_pool_arn: String, descriptor: &AuthDescriptor) -> Self {
        Self {
            authenticated_role: format!("{user_pool_arn}/authenticated"),
            user_pool_arn,
            groups: descriptor.groups.clone(),
            triggers: BTreeMap::new(),
        }
    }

    /// Attach `function` to `trigger`, replacing any earlier attachment.
    pub fn add_trigger(&mut self, trigger: AuthTrigger, function: &FunctionResources) {
        self.triggers
            .insert(trigger, function.function_arn.clone());
    }

    /// Function attached to `trigger`.
    #[must_use]
    pub fn trigger(&self, trigger: AuthTrigger) -> Option<&str> {
        self.triggers.get(&trigger).map(String::as_str)
    }

    /// All attached triggers, ordered by trigger.
    pub fn triggers(&self) -> impl Iterator<Item = (AuthTrigger, &str)> {
        self.triggers.iter().map(|(t, f)| (*t, f.as_str()))
    }
}

impl Principal for AuthResources {
    fn principal_id(&self) -> &str {
        &self.authenticated_role
    }
}
