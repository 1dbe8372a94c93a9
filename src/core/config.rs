//! Configuration for the assistant subsystem.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::core::errors::{AssistantError, AssistantResult};

/// Top-level configuration for the assistant.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Embedding model settings.
    pub embedding: EmbeddingConfig,
    /// Completion model settings.
    pub llm: LlmConfig,
    /// Memory retrieval settings.
    pub retrieval: RetrievalConfig,
    /// Gathering-stage settings.
    pub gather: GatherConfig,
    /// Analytics sink settings.
    pub analytics: AnalyticsConfig,
    /// Assistant persona and fallback copy.
    pub persona: PersonaConfig,
}

impl AssistantConfig {
    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> AssistantResult<()> {
        if self.embedding.ndims == 0 {
            return Err(AssistantError::InvalidConfig(
                "embedding.ndims must be > 0".to_string(),
            ));
        }

        if self.retrieval.top_k == 0 {
            return Err(AssistantError::InvalidConfig(
                "retrieval.top_k must be > 0".to_string(),
            ));
        }

        if self.gather.call_timeout_ms == 0 {
            return Err(AssistantError::InvalidConfig(
                "gather.call_timeout_ms must be > 0".to_string(),
            ));
        }

        if self.persona.system_preamble.trim().is_empty() {
            return Err(AssistantError::InvalidConfig(
                "persona.system_preamble must not be empty".to_string(),
            ));
        }

        if self.persona.error_reply.trim().is_empty() {
            return Err(AssistantError::InvalidConfig(
                "persona.error_reply must not be empty".to_string(),
            ));
        }

        if let Some(base_url) = &self.embedding.base_url {
            Url::parse(base_url)?;
        }

        if let Some(base_url) = &self.llm.base_url {
            Url::parse(base_url)?;
        }

        if let Some(endpoint) = &self.analytics.endpoint {
            Url::parse(endpoint)?;
        }

        Ok(())
    }
}

/// Embedding model settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Ollama embedding model name.
    pub model: String,
    /// Embedding vector dimensions.
    pub ndims: usize,
    /// Optional custom base URL.
    pub base_url: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "nomic-embed-text".to_string(),
            ndims: 768,
            base_url: None,
        }
    }
}

/// Completion model settings.
///
/// The sampling temperature is not configured here; it is derived per
/// exchange from the classified sentiment.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Ollama completion model name.
    pub model: String,
    /// Optional max tokens per response.
    pub max_tokens: Option<u64>,
    /// Optional custom base URL.
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "mistral:7b-instruct-q8_0".to_string(),
            max_tokens: None,
            base_url: None,
        }
    }
}

/// Memory retrieval settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of memories to retrieve per index.
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

/// Gathering-stage settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatherConfig {
    /// Per-call timeout for memory queries and sentiment classification.
    /// A hung dependency degrades instead of stalling the stage.
    pub call_timeout_ms: u64,
}

impl Default for GatherConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: 10_000,
        }
    }
}

/// Analytics sink settings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Report endpoint base URL; `None` disables event delivery.
    pub endpoint: Option<String>,
}

/// Assistant persona and fallback copy.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersonaConfig {
    /// Opening sentence of every system prompt.
    pub system_preamble: String,
    /// User-visible reply substituted when an exchange produces no text.
    pub error_reply: String,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            system_preamble: "You are Echo, an empathetic AI assistant.".to_string(),
            error_reply: "Sorry, something went wrong while answering. Please try again."
                .to_string(),
        }
    }
}
