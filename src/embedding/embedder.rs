//! Embedding model wrapper for Rig + Ollama.

use std::future::Future;
use std::pin::Pin;

use reqwest::Client as ReqwestClient;
use rig::client::{EmbeddingsClient, Nothing};
use rig::embeddings::EmbeddingModel;
use rig::providers::ollama;

use crate::core::config::EmbeddingConfig;
use crate::core::errors::{AssistantError, AssistantResult};

/// Boxed future type for embedder operations.
pub type EmbedFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Trait abstraction over embedding models.
///
/// Output is deterministic for a fixed model and version.
pub trait Embedder: Send + Sync {
    /// Embed a single text string into a fixed-length vector.
    ///
    /// # Errors
    /// Returns [`AssistantError::TransientNetwork`] when the backend is
    /// unreachable and the caller may retry, or an embedding/model error when
    /// the request itself is rejected.
    fn embed_text(&self, text: &str) -> EmbedFuture<'_, AssistantResult<Vec<f64>>>;

    /// Return embedding dimensionality.
    fn ndims(&self) -> usize;
}

type OllamaEmbeddingModel = ollama::EmbeddingModel<ReqwestClient>;

/// Ollama embedder using the Rig provider.
#[derive(Clone)]
pub struct OllamaEmbedder {
    model: OllamaEmbeddingModel,
    ndims: usize,
}

impl OllamaEmbedder {
    /// Create a new Ollama embedder from config.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the client cannot be
    /// built.
    pub fn new(config: &EmbeddingConfig) -> AssistantResult<Self> {
        let builder = ollama::Client::<ReqwestClient>::builder().api_key(Nothing);
        let builder = if let Some(base_url) = &config.base_url {
            builder.base_url(base_url)
        } else {
            builder
        };
        let client = builder.build().map_err(AssistantError::from)?;
        let model = client.embedding_model_with_ndims(config.model.clone(), config.ndims);
        Ok(Self {
            model,
            ndims: config.ndims,
        })
    }
}

impl Embedder for OllamaEmbedder {
    fn embed_text(&self, text: &str) -> EmbedFuture<'_, AssistantResult<Vec<f64>>> {
        let text = text.to_string();
        Box::pin(async move {
            let embedding = self
                .model
                .embed_text(&text)
                .await
                .map_err(AssistantError::Embedding)?;
            Ok(embedding.vec)
        })
    }

    fn ndims(&self) -> usize {
        self.ndims
    }
}
