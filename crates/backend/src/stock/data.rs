//! Data models served through a GraphQL API.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Access, Grant, Principal, record_grant};
use crate::descriptor::{Descriptor, ResourceKind};

/// Default authorization of API requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationMode {
    /// Signed-in users of the auth resource
    #[default]
    UserPool,
    /// Static API key
    ApiKey,
    /// Role-based access
    Iam,
}

impl fmt::Display for AuthorizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserPool => write!(f, "user_pool"),
            Self::ApiKey => write!(f, "api_key"),
            Self::Iam => write!(f, "iam"),
        }
    }
}

/// One data model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    /// Model name
    pub name: String,
    /// Field names
    pub fields: Vec<String>,
}

/// Data descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataDescriptor {
    /// Models, in declaration order
    pub models: Vec<Model>,
    /// Default authorization mode
    pub authorization: AuthorizationMode,
}

/// A single `Todo { content }` model behind user-pool authorization.
#[must_use]
pub fn define_data() -> DataDescriptor {
    DataDescriptor {
        models: vec![Model {
            name: "Todo".to_string(),
            fields: vec!["content".to_string()],
        }],
        authorization: AuthorizationMode::default(),
    }
}

impl DataDescriptor {
    /// Add a model.
    #[must_use]
    pub fn with_model<I, S>(mut self, name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.models.push(Model {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Drop all models.
    #[must_use]
    pub fn without_models(mut self) -> Self {
        self.models.clear();
        self
    }

    /// Set the default authorization mode.
    #[must_use]
    pub fn with_authorization(mut self, mode: AuthorizationMode) -> Self {
        self.authorization = mode;
        self
    }
}

impl Descriptor for DataDescriptor {
    type Realized = DataResources;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Data
    }

    fn validate(&self) -> Result<(), String> {
        if self.models.is_empty() {
            return Err("at least one model is required".to_string());
        }
        let mut seen = HashSet::new();
        for model in &self.models {
            if !seen.insert(model.name.as_str()) {
                return Err(format!("model '{}' is declared twice", model.name));
            }
        }
        Ok(())
    }
}

/// Provisioned API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataResources {
    /// API identifier
    pub api_arn: String,
    /// Endpoint URL
    pub endpoint: String,
    /// Model names
    pub models: Vec<String>,
    grants: Vec<Grant>,
}

impl DataResources {
    pub(crate) fn from_descriptor(api_arn: String, descriptor: &DataDescriptor) -> Self {
        Self {
            endpoint: format!("https://{}.graphql.keystone.local/graphql", api_arn.replace(':', "-")),
            api_arn,
            models: descriptor.models.iter().map(|m| m.name.clone()).collect(),
            grants: Vec::new(),
        }
    }

    /// Give `principal` access to the API.
    pub fn grant(&mut self, principal: &impl Principal, access: Access) {
        record_grant(&mut self.grants, principal.principal_id(), access);
    }

    /// Grants in the order they were first made.
    #[must_use]
    pub fn grants(&self) -> &[Grant] {
        &self.grants
    }
}
