//! Resource keys: the names a registry uses for its entries.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Validated name of one registry entry.
///
/// A key starts with an ASCII letter and continues with ASCII letters,
/// digits or `_`, so `auth`, `fileStorage` and `pre_sign_up` are all keys
/// while `""`, `1st` and `file-storage` are not.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceKey(String);

impl ResourceKey {
    /// Parse and validate a key.
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        validate(&key).map_err(|reason| Error::InvalidKey {
            key: key.clone(),
            reason: reason.to_string(),
        })?;
        Ok(Self(key))
    }

    /// The key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn validate(key: &str) -> std::result::Result<(), &'static str> {
    let mut chars = key.chars();
    match chars.next() {
        None => return Err("key must not be empty"),
        Some(c) if !c.is_ascii_alphabetic() => return Err("key must start with an ASCII letter"),
        Some(_) => {}
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err("key may only contain ASCII letters, digits and '_'")
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ResourceKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl FromStr for ResourceKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for ResourceKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ResourceKey {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ResourceKey> for String {
    fn from(key: ResourceKey) -> Self {
        key.0
    }
}

impl PartialEq<str> for ResourceKey {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ResourceKey {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
