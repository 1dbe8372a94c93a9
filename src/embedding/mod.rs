//! Embedding model integration.

/// Embedder trait and Ollama implementation.
pub mod embedder;
