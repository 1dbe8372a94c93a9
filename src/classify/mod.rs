//! Sentiment classification over the chat model.

/// Classifier trait and Ollama implementation.
pub mod classifier;
