//! Streaming completion transport.

/// Ollama NDJSON streaming implementation.
pub mod ollama;
/// Completion contract and token stream plumbing.
pub mod streaming;
