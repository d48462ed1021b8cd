//! Generation boundary configuration.
//!
//! Defaults target the public Gemini REST endpoint. Environment overrides:
//!
//! | variable | field |
//! |---|---|
//! | `API_KEY` (fallback `GEMINI_API_KEY`) | `api_key` |
//! | `PROMPT_ARCHITECT_ENDPOINT` | `endpoint` |
//! | `PROMPT_ARCHITECT_MODEL` | `model` |
//! | `PROMPT_ARCHITECT_SUGGESTION_MODEL` | `suggestion_model` |
//! | `PROMPT_ARCHITECT_TIMEOUT_MS` | `timeout_ms` |
//! | `PROMPT_ARCHITECT_CONNECT_TIMEOUT_MS` | `connect_timeout_ms` |
//!
//! A blank or missing key is the mock configuration state, not an error.

use log::warn;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_SUGGESTION_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_TIMEOUT_MS: u64 = 60_000;
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;

/// Invalid generation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidEndpoint(String),
    EmptyModel(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEndpoint(value) => {
                write!(f, "generation endpoint must start with http:// or https://, got `{value}`")
            }
            Self::EmptyModel(field) => write!(f, "generation `{field}` must not be blank"),
        }
    }
}

impl Error for ConfigError {}

/// Settings for the remote generation client.
#[derive(Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    pub suggestion_model: String,
    /// Request timeout in milliseconds (0 disables).
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds (0 disables).
    pub connect_timeout_ms: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            suggestion_model: DEFAULT_SUGGESTION_MODEL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
        }
    }
}

// Keeps the key out of `{:?}` output and therefore out of logs.
impl Debug for GenerationConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("suggestion_model", &self.suggestion_model)
            .field("timeout_ms", &self.timeout_ms)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .finish()
    }
}

impl GenerationConfig {
    /// Loads defaults overridden by process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads defaults overridden by values from `lookup`.
    ///
    /// Unparseable numeric overrides are ignored with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        let key = lookup("API_KEY")
            .filter(|value| !value.trim().is_empty())
            .or_else(|| lookup("GEMINI_API_KEY"));
        if let Some(key) = key {
            config = config.with_api_key(key);
        }
        if let Some(endpoint) = non_blank(lookup("PROMPT_ARCHITECT_ENDPOINT")) {
            config.endpoint = endpoint;
        }
        if let Some(model) = non_blank(lookup("PROMPT_ARCHITECT_MODEL")) {
            config.model = model;
        }
        if let Some(model) = non_blank(lookup("PROMPT_ARCHITECT_SUGGESTION_MODEL")) {
            config.suggestion_model = model;
        }
        if let Some(value) = parse_millis(&lookup, "PROMPT_ARCHITECT_TIMEOUT_MS") {
            config.timeout_ms = value;
        }
        if let Some(value) = parse_millis(&lookup, "PROMPT_ARCHITECT_CONNECT_TIMEOUT_MS") {
            config.connect_timeout_ms = value;
        }
        config
    }

    /// Sets the API key. Blank keys clear it.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        let trimmed = key.trim();
        self.api_key = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// `true` when no credential is configured.
    pub fn is_mock(&self) -> bool {
        self.api_key.is_none()
    }

    /// Checks endpoint and model settings used by the remote client.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::InvalidEndpoint(self.endpoint.clone()));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel("model"));
        }
        if self.suggestion_model.trim().is_empty() {
            return Err(ConfigError::EmptyModel("suggestion_model"));
        }
        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

fn parse_millis(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    let raw = non_blank(lookup(key))?;
    match raw.parse::<u64>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("event=config_override module=generation status=ignored key={key}");
            None
        }
    }
}
