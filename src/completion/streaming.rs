//! Streaming completion contract and token stream plumbing.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::core::errors::AssistantResult;
use crate::core::message::{Message, Role};

/// Boxed future type for completion operations.
pub type CompletionFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Capacity of the bounded token channel between producer and consumer.
pub(crate) const TOKEN_CHANNEL_CAPACITY: usize = 32;

/// Role tag understood by the completion backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatRole {
    /// System prompt.
    System,
    /// End user turn.
    User,
    /// Assistant turn.
    Assistant,
}

impl ChatRole {
    /// Wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl From<Role> for ChatRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => Self::User,
            Role::Assistant => Self::Assistant,
        }
    }
}

/// One ordered role/content pair in a completion request.
#[derive(Clone, Debug)]
pub struct ChatTurn {
    /// Author role on the wire.
    pub role: ChatRole,
    /// Turn text.
    pub content: String,
}

impl ChatTurn {
    /// Create a system turn.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    /// Create a user turn.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

impl From<&Message> for ChatTurn {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role.into(),
            content: message.content.clone(),
        }
    }
}

/// Lazy, single-pass sequence of response text chunks.
///
/// Chunks arrive through a bounded channel fed by a producer task; dropping
/// the stream aborts the producer, which releases the underlying connection.
/// A second consumption attempt is not possible: `next_chunk` drains.
pub struct TokenStream {
    rx: mpsc::Receiver<AssistantResult<String>>,
    producer: JoinHandle<()>,
}

impl TokenStream {
    /// Wrap the receiving half of a token channel and the producer task
    /// driving it.
    #[must_use]
    pub fn new(rx: mpsc::Receiver<AssistantResult<String>>, producer: JoinHandle<()>) -> Self {
        Self { rx, producer }
    }

    /// Pull the next chunk; `None` once the stream has ended.
    ///
    /// A mid-stream failure arrives as one `Err` item carrying
    /// [`AssistantError::StreamInterrupted`](crate::core::errors::AssistantError::StreamInterrupted),
    /// after which the stream ends.
    pub async fn next_chunk(&mut self) -> Option<AssistantResult<String>> {
        self.rx.recv().await
    }
}

impl Drop for TokenStream {
    fn drop(&mut self) {
        self.producer.abort();
    }
}

/// Trait abstraction over streaming completion backends.
pub trait StreamingCompletion: Send + Sync {
    /// Start a completion over `turns` at the given sampling temperature and
    /// return its token stream.
    ///
    /// # Errors
    /// Returns an error if the completion request cannot be started.
    fn stream_complete(
        &self,
        turns: Vec<ChatTurn>,
        temperature: f64,
    ) -> CompletionFuture<'_, AssistantResult<TokenStream>>;
}
