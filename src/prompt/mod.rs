//! System prompt assembly.

/// Deterministic prompt composition.
pub mod composer;
