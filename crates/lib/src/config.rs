//! # Directory Configuration Validation
//!
//! Callers validate their raw configuration with [`validate_config`] before
//! invoking an import. The runner itself assumes a valid [`DirectoryConfig`].

use crate::errors::ImportError;
use serde_json::Value;
use std::fmt;

/// Path of the directory credential inside the raw configuration.
pub const CREDENTIAL_PATH: &str = "tyk.proxybeez.key";
/// Path of the directory URL inside the raw configuration.
pub const URL_PATH: &str = "tyk.proxybeez.url";

/// The validated inputs of an import run.
#[derive(Clone, PartialEq, Eq)]
pub struct DirectoryConfig {
    pub credential: String,
    pub url: String,
}

impl DirectoryConfig {
    pub fn new(credential: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            credential: credential.into(),
            url: url.into(),
        }
    }
}

impl fmt::Debug for DirectoryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryConfig")
            .field("credential", &"<redacted>")
            .field("url", &self.url)
            .finish()
    }
}

/// Result of [`validate_config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidation {
    Valid(DirectoryConfig),
    /// Every required path that is absent, not a string, or empty.
    Invalid { missing: Vec<&'static str> },
}

impl ConfigValidation {
    pub fn is_valid(&self) -> bool {
        matches!(self, ConfigValidation::Valid(_))
    }

    pub fn into_result(self) -> Result<DirectoryConfig, ImportError> {
        match self {
            ConfigValidation::Valid(config) => Ok(config),
            ConfigValidation::Invalid { missing } => Err(ImportError::ConfigInvalid {
                missing: missing.into_iter().map(String::from).collect(),
            }),
        }
    }
}

fn non_empty_str<'a>(root: &'a Value, path: &str) -> Option<&'a str> {
    path.split('.')
        .try_fold(root, |node, segment| node.get(segment))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Checks that a raw configuration value carries a usable directory credential and URL.
///
/// Never fails: any missing field is reported in `ConfigValidation::Invalid`.
pub fn validate_config(config: &Value) -> ConfigValidation {
    let credential = non_empty_str(config, CREDENTIAL_PATH);
    let url = non_empty_str(config, URL_PATH);
    match (credential, url) {
        (Some(credential), Some(url)) => {
            ConfigValidation::Valid(DirectoryConfig::new(credential, url))
        }
        _ => {
            let mut missing = Vec::new();
            if credential.is_none() {
                missing.push(CREDENTIAL_PATH);
            }
            if url.is_none() {
                missing.push(URL_PATH);
            }
            ConfigValidation::Invalid { missing }
        }
    }
}
