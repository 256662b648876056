//! # CLI Configuration
//!
//! Loads the configuration of the `employee-import` binary from a YAML file and
//! environment variables. The raw, merged value is kept so the library's
//! `validate_config` guard can inspect the directory section itself.

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use employee_import::{constants::DEFAULT_HTTP_TIMEOUT_SECS, ImportSettings};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::env;
use std::fs;
use tracing::info;

/// The configuration file read when no `--config` is given.
pub const DEFAULT_CONFIG_PATH: &str = "config.yml";

/// Prefix of the environment variables overriding nested keys.
pub const ENV_PREFIX: &str = "EMPLOYEE_IMPORT";

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates a required configuration file was not found.
    NotFound(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// Where import documents are written.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct FirestoreConfig {
    pub project_id: Option<String>,
}

/// Settings of the directory HTTP client.
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Deserialize)]
struct TypedSections {
    #[serde(default)]
    firestore: FirestoreConfig,
    #[serde(default)]
    http: HttpConfig,
    #[serde(default)]
    import: ImportSettings,
}

/// The fully resolved configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Every merged key, including the `tyk.proxybeez` directory section.
    pub raw: Value,
    pub firestore: FirestoreConfig,
    pub http: HttpConfig,
    pub import: ImportSettings,
}

/// Directory values that must reach `validate_config` as strings.
const DIRECTORY_KEYS: &[&str] = &["/tyk/proxybeez/key", "/tyk/proxybeez/url"];

// YAML reads an unquoted `key: 123456789` as a number; keep it as text.
fn stringify_directory_scalars(raw: &mut Value) {
    for pointer in DIRECTORY_KEYS {
        if let Some(value) = raw.pointer_mut(pointer) {
            if value.is_number() || value.is_boolean() {
                *value = Value::String(value.to_string());
            }
        }
    }
}

// Reads a file and substitutes `${VAR}` with environment values.
// Returns Ok(None) if the file does not exist.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !std::path::Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(e.to_string()))?;
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_default()
    });

    Ok(Some(expanded_content.to_string()))
}

/// Loads the configuration from a YAML file and environment variables.
///
/// - An explicit `config_path_override` must exist; the default `config.yml`
///   is optional so a deployment can be configured from the environment alone.
/// - Nested keys are overridden by `EMPLOYEE_IMPORT_...` variables, with `__`
///   between path segments (e.g. `EMPLOYEE_IMPORT_TYK__PROXYBEEZ__KEY`).
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = ConfigBuilder::builder()
        // Layer 1: Programmatic defaults.
        .set_default("http.timeout_secs", DEFAULT_HTTP_TIMEOUT_SECS)?;

    // Layer 2: The YAML file.
    let config_path = config_path_override.unwrap_or(DEFAULT_CONFIG_PATH);
    match read_and_substitute(config_path)? {
        Some(content) => {
            info!("Loading configuration from '{config_path}'.");
            builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
        }
        None if config_path_override.is_some() => {
            return Err(ConfigError::NotFound(format!(
                "Config file not found at '{config_path}'."
            )));
        }
        None => info!("'{config_path}' not found. Using environment variables only."),
    }

    // Layer 3: Prefixed environment variables. Values stay strings so a numeric
    // looking credential is not turned into a number.
    let settings = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let typed: TypedSections = settings.clone().try_deserialize()?;
    let mut raw: Value = settings.try_deserialize()?;
    stringify_directory_scalars(&mut raw);

    Ok(AppConfig {
        raw,
        firestore: typed.firestore,
        http: typed.http,
        import: typed.import,
    })
}
