//! Exchange orchestration.

/// Conversation session orchestrator.
pub mod core;
/// Exchange lifecycle and cancellable handle.
pub mod exchange;
