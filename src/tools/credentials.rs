//! Credential sources consulted before a tool is instantiated.
//!
//! A missing credential is a soft condition (the tool is simply unavailable);
//! only an unreadable one is an error.

use std::collections::HashMap;
use std::env::{self, VarError};

use parking_lot::RwLock;

use crate::utilities::errors::ToolError;

/// Source of named credential values (API keys, connection URIs).
pub trait CredentialSource: Send + Sync {
    /// Look up a credential. `Ok(None)` means "not set".
    fn get(&self, key: &str) -> Result<Option<String>, ToolError>;

    /// Whether the credential is present and non-empty.
    fn is_set(&self, key: &str) -> Result<bool, ToolError> {
        Ok(self.get(key)?.is_some_and(|v| !v.is_empty()))
    }

    /// Whether every key in `keys` is set.
    fn all_set(&self, keys: &[String]) -> Result<bool, ToolError> {
        for key in keys {
            if !self.is_set(key)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Reads credentials from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn get(&self, key: &str) -> Result<Option<String>, ToolError> {
        match env::var(key) {
            Ok(value) => Ok(Some(value)),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(_)) => Err(ToolError::Credential {
                key: key.to_string(),
                message: "value is not valid unicode".to_string(),
            }),
        }
    }
}

/// In-memory credentials, mutable at runtime.
#[derive(Debug, Default)]
pub struct StaticCredentials {
    values: RwLock<HashMap<String, String>>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(key, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            values: RwLock::new(values),
        }
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.values.write().insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) {
        self.values.write().remove(key);
    }
}

impl CredentialSource for StaticCredentials {
    fn get(&self, key: &str) -> Result<Option<String>, ToolError> {
        Ok(self.values.read().get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_credentials_set_and_remove() {
        let creds = StaticCredentials::new();
        assert!(!creds.is_set("EXA_API_KEY").unwrap());
        creds.set("EXA_API_KEY", "k");
        assert!(creds.is_set("EXA_API_KEY").unwrap());
        creds.remove("EXA_API_KEY");
        assert!(!creds.is_set("EXA_API_KEY").unwrap());
    }

    #[test]
    fn test_empty_value_counts_as_unset() {
        let creds = StaticCredentials::from_pairs([("GITHUB_TOKEN", "")]);
        assert!(!creds.is_set("GITHUB_TOKEN").unwrap());
    }

    #[test]
    fn test_all_set() {
        let creds = StaticCredentials::from_pairs([("QDRANT_URL", "http://q")]);
        let keys = vec!["QDRANT_URL".to_string(), "QDRANT_API_KEY".to_string()];
        assert!(!creds.all_set(&keys).unwrap());
        creds.set("QDRANT_API_KEY", "secret");
        assert!(creds.all_set(&keys).unwrap());
        assert!(creds.all_set(&[]).unwrap());
    }

    #[test]
    fn test_env_credentials_missing_is_none() {
        let creds = EnvCredentials;
        assert_eq!(
            creds.get("METACREW_TEST_SURELY_UNSET_VARIABLE").unwrap(),
            None
        );
    }
}
