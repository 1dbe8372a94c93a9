//! Memory index contract and record model.

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};

use crate::core::errors::AssistantResult;
use crate::core::ids::MemoryId;

/// Boxed future type for memory index operations.
pub type IndexFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One stored exchange memory.
///
/// Immutable once created; the index defines no update or delete operation.
#[derive(Clone, Debug, PartialEq)]
pub struct MemoryRecord {
    /// Unique record id.
    pub id: MemoryId,
    /// Stored text: the triggering user message and the final response.
    pub content: String,
    /// Creation timestamp; breaks similarity ties, most recent first.
    pub created_at: DateTime<Utc>,
    /// Embedding vector used for similarity search.
    pub embedding: Vec<f64>,
}

/// Append-only store of text searchable by embedding similarity.
pub trait MemoryIndex: Send + Sync {
    /// Return the contents of the `top_k` most similar records, most similar
    /// first; ties broken by `created_at` descending.
    ///
    /// # Errors
    /// Returns an error if embedding or the backing store fails. Callers
    /// degrade to an empty result set rather than failing the exchange.
    fn query(&self, text: &str, top_k: usize) -> IndexFuture<'_, AssistantResult<Vec<String>>>;

    /// Store `content` with a fresh unique id and `created_at = now()`.
    ///
    /// # Errors
    /// Returns an error if embedding or the backing store fails.
    fn upsert(&self, content: &str) -> IndexFuture<'_, AssistantResult<()>>;
}
