//! Fire-and-forget analytics event delivery.

/// Sink trait and HTTP implementation.
pub mod sink;
