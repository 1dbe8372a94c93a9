//! Append-only vector memory indices.
//!
//! The session holds two instances of [`index::MemoryIndex`]: a personal
//! index scoped to one user and a collective index shared across users. The
//! two are independent namespaces with no cross-index visibility.

/// In-process vector index implementation.
pub mod in_memory;
/// Memory index contract and record model.
pub mod index;
