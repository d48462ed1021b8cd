//! Remote generation boundary.
//!
//! # Responsibility
//! - Define the request/response contract consumed by item workflows.
//! - Select exactly one provider per configuration: the offline mock when no
//!   credential is configured, the remote client otherwise.
//!
//! # Invariants
//! - One request per call; no streaming, no retry.
//! - Errors carry human-readable messages and never include raw response
//!   bodies.
//! - Mock results are always marked with a `Mock` prefix and are never mixed
//!   with remote results.

pub mod config;
pub mod gemini;
pub mod mock;
mod response;

pub use config::{ConfigError, GenerationConfig};
pub use gemini::GeminiClient;
pub use mock::MockGenerationProvider;

use log::info;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type GenerationResult<T> = Result<T, GenerationError>;

/// Boundary operation, used to shape error messages and log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationOperation {
    Compose,
    Distill,
    Refine,
    Suggest,
}

impl GenerationOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compose => "compose",
            Self::Distill => "distill",
            Self::Refine => "refine",
            Self::Suggest => "suggest",
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Self::Compose => "generate prompts",
            Self::Distill => "distill bookmark",
            Self::Refine => "refine prompt",
            Self::Suggest => "generate variable suggestions",
        }
    }
}

/// Failure of a generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// Remote client was requested without an API key.
    MissingCredential,
    Config(ConfigError),
    /// HTTP client could not be constructed.
    ClientSetup(String),
    /// Transport-level failure (connect, timeout, TLS, ...).
    Request {
        operation: GenerationOperation,
        message: String,
    },
    /// Remote API answered with a non-success status.
    Status {
        operation: GenerationOperation,
        status: u16,
    },
    /// Response was not valid JSON or did not match the expected shape.
    InvalidResponse { operation: GenerationOperation },
}

impl Display for GenerationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCredential => write!(f, "generation API key is not configured"),
            Self::Config(err) => write!(f, "{err}"),
            Self::ClientSetup(message) => write!(f, "failed to build HTTP client: {message}"),
            Self::Request { operation, message } => {
                write!(f, "failed to {}: {message}", operation.describe())
            }
            Self::Status { operation, status } => write!(
                f,
                "failed to {}: generation API returned status {status}",
                operation.describe()
            ),
            Self::InvalidResponse { operation } => write!(
                f,
                "failed to {}: received an invalid response from the generation API",
                operation.describe()
            ),
        }
    }
}

impl Error for GenerationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for GenerationError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

/// One prompt proposed by the generation boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPrompt {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl GeneratedPrompt {
    pub fn new<I, S>(title: impl Into<String>, body: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            title: title.into(),
            body: body.into(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}

/// Result of distilling a bookmark's target page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distillation {
    pub summary: String,
    #[serde(default)]
    pub prompts: Vec<GeneratedPrompt>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Request/response contract of the remote generation API.
pub trait GenerationProvider: Send + Sync {
    /// Provider name for logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Whether results are placeholder data.
    fn is_mock(&self) -> bool {
        false
    }

    /// Turns a free-text idea into reusable prompts.
    fn compose_from_idea(&self, idea: &str) -> GenerationResult<Vec<GeneratedPrompt>>;

    /// Summarizes the page at `url` and proposes prompts and tags.
    fn distill_bookmark(&self, url: &str) -> GenerationResult<Distillation>;

    /// Rewrites a prompt body using a named framework.
    fn refine_prompt(&self, body: &str, framework: &str) -> GenerationResult<String>;

    /// Proposes values for one variable of a prompt template. May be empty.
    fn suggest_variable_values(
        &self,
        body: &str,
        variable_name: &str,
    ) -> GenerationResult<Vec<String>>;
}

/// Builds the provider selected by `config`.
///
/// # Errors
/// - Returns an error when a credential is configured but the remote client
///   cannot be built (invalid endpoint/model, HTTP client setup failure).
pub fn provider_from_config(
    config: &GenerationConfig,
) -> GenerationResult<Box<dyn GenerationProvider>> {
    if config.is_mock() {
        info!("event=generation_mode module=generation status=ok mode=mock");
        return Ok(Box::new(MockGenerationProvider::new()));
    }

    let client = GeminiClient::from_config(config)?;
    info!(
        "event=generation_mode module=generation status=ok mode=remote model={}",
        config.model
    );
    Ok(Box::new(client))
}

#[cfg(test)]
mod tests {
    use super::{provider_from_config, GenerationConfig, GenerationError, GenerationOperation};

    #[test]
    fn missing_key_selects_mock_provider() {
        let config = GenerationConfig::default();
        let provider = provider_from_config(&config).unwrap();
        assert!(provider.is_mock());
        assert_eq!(provider.name(), "mock");
    }

    #[test]
    fn configured_key_selects_remote_provider() {
        let config = GenerationConfig::default().with_api_key("test-key");
        let provider = provider_from_config(&config).unwrap();
        assert!(!provider.is_mock());
        assert_eq!(provider.name(), "gemini");
    }

    #[test]
    fn invalid_response_message_hides_details() {
        let err = GenerationError::InvalidResponse {
            operation: GenerationOperation::Distill,
        };
        assert_eq!(
            err.to_string(),
            "failed to distill bookmark: received an invalid response from the generation API"
        );
    }
}
