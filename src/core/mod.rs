//! Core types shared across the assistant subsystem.

/// Configuration structs and validation.
pub mod config;
/// Error types and result alias.
pub mod errors;
/// Identifier newtypes.
pub mod ids;
/// Conversation message model.
pub mod message;
/// Sentiment set and temperature mapping.
pub mod sentiment;
