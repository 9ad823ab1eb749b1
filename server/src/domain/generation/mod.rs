//! Content generation through an external chat completion API
//!
//! Each call is a single request/response passthrough: no retry, caching,
//! or streaming. Handlers talk to [`GenerationService`], which owns prompt
//! construction and delegates transport to a [`CompletionProvider`].

mod characters;
mod client;
mod prompts;

pub use characters::{CHARACTERS, random_character};
pub use client::MistralClient;
pub use prompts::{biography_prompt, story_prompt};

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::config::GenerationConfig;
use crate::core::constants::{
    BIOGRAPHY_MAX_TOKENS, BIOGRAPHY_TEMPERATURE, STORY_MAX_TOKENS, STORY_TEMPERATURE,
};

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Generation is not configured: no API key")]
    Unavailable,

    #[error("Completion request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Completion API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Completion API returned a malformed body: {0}")]
    Malformed(String),

    #[error("Completion API returned no choices")]
    EmptyResponse,
}

/// One completion call
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

/// Transport for completion calls
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Return the text of the first choice
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerationError>;
}

/// Generation features exposed to the API layer
#[derive(Clone)]
pub struct GenerationService {
    provider: Option<Arc<dyn CompletionProvider>>,
}

impl GenerationService {
    /// Build from config. Without an API key the service is created disabled.
    pub fn from_config(config: &GenerationConfig) -> Result<Self, GenerationError> {
        let provider = match &config.api_key {
            Some(key) => {
                let client = MistralClient::new(config, key.clone())?;
                tracing::debug!(model = %config.model, "Generation enabled");
                Some(Arc::new(client) as Arc<dyn CompletionProvider>)
            }
            None => {
                tracing::warn!("No completion API key configured, generation endpoints disabled");
                None
            }
        };
        Ok(Self { provider })
    }

    /// Build around an explicit provider
    pub fn with_provider(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    /// Service whose every call fails with `Unavailable`
    pub fn disabled() -> Self {
        Self { provider: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    fn provider(&self) -> Result<&Arc<dyn CompletionProvider>, GenerationError> {
        self.provider.as_ref().ok_or(GenerationError::Unavailable)
    }

    /// Write a biography for `character`
    pub async fn biography(&self, character: &str) -> Result<String, GenerationError> {
        let provider = self.provider()?;
        let request = CompletionRequest {
            prompt: biography_prompt(character),
            temperature: BIOGRAPHY_TEMPERATURE,
            max_tokens: BIOGRAPHY_MAX_TOKENS,
        };
        tracing::debug!(%character, "Generating biography");
        provider.complete(&request).await
    }

    /// Write a short story, optionally on `theme`
    pub async fn story(&self, theme: Option<&str>) -> Result<String, GenerationError> {
        let provider = self.provider()?;
        let request = CompletionRequest {
            prompt: story_prompt(theme),
            temperature: STORY_TEMPERATURE,
            max_tokens: STORY_MAX_TOKENS,
        };
        tracing::debug!(themed = theme.is_some_and(|t| !t.trim().is_empty()), "Generating story");
        provider.complete(&request).await
    }
}
