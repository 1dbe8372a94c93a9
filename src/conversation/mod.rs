//! Conversation state and durable history storage.

/// Session-facing adapter driving exchanges.
pub mod state;
/// Durable per-user history storage.
pub mod store;
