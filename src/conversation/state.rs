//! Session-facing conversation state.
//!
//! Owns the per-user history, serializes sends, and keeps the history
//! consistent under partial failure: the user message is always retained, the
//! assistant entry holds streamed text, partial text, or the error reply.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::conversation::store::SessionStore;
use crate::core::errors::{AssistantError, AssistantResult};
use crate::core::ids::UserId;
use crate::core::message::{ConversationHistory, Message};
use crate::session::core::ConversationSession;
use crate::session::exchange::Exchange;

/// Per-user conversation driver over a [`ConversationSession`].
///
/// At most one exchange is in flight at a time; an overlapping
/// [`send`](Self::send) is rejected with
/// [`AssistantError::ConcurrencyViolation`].
pub struct ConversationState {
    user_id: UserId,
    session: ConversationSession,
    store: Arc<dyn SessionStore>,
    history: RwLock<ConversationHistory>,
    sending: AtomicBool,
    error_reply: String,
}

/// Clears the sending flag when a send unwinds or returns.
struct SendingGuard<'a>(&'a AtomicBool);

impl Drop for SendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ConversationState {
    /// Open the conversation for `user_id`, loading its stored history.
    ///
    /// # Errors
    /// Returns an error if the stored history cannot be read.
    pub async fn open(
        user_id: UserId,
        session: ConversationSession,
        store: Arc<dyn SessionStore>,
    ) -> AssistantResult<Self> {
        let history = store.load(user_id).await?;
        debug!(
            "Opened conversation for {user_id} with {} stored messages",
            history.len()
        );
        let error_reply = session.config().persona.error_reply.clone();
        Ok(Self {
            user_id,
            session,
            store,
            history: RwLock::new(history),
            sending: AtomicBool::new(false),
            error_reply,
        })
    }

    /// The user this conversation belongs to.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Whether a send is currently in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.sending.load(Ordering::Acquire)
    }

    /// Whether the assistant is currently producing a reply.
    ///
    /// Tracks the same in-flight window as [`is_loading`](Self::is_loading).
    #[must_use]
    pub fn is_typing(&self) -> bool {
        self.sending.load(Ordering::Acquire)
    }

    /// Snapshot of the current history.
    pub async fn history(&self) -> ConversationHistory {
        self.history.read().await.clone()
    }

    /// Run one exchange for `text`, streaming the reply into the history.
    ///
    /// The user message is appended immediately and never rolled back. The
    /// assistant entry accumulates tokens as they arrive; on interruption it
    /// keeps the partial text, and only when no text was produced at all is
    /// it replaced with the configured error reply. The whole history is
    /// saved once per send; a save failure is logged, not propagated.
    ///
    /// # Errors
    /// Returns [`AssistantError::ConcurrencyViolation`] if a send is already
    /// in flight, or an error if the completion stream cannot be started.
    pub async fn send(
        &self,
        text: &str,
        context: &str,
        transcript: &str,
    ) -> AssistantResult<Exchange> {
        if self
            .sending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(AssistantError::ConcurrencyViolation);
        }
        let _guard = SendingGuard(&self.sending);

        let prior = self.history.read().await.clone();
        {
            let mut history = self.history.write().await;
            history.push(Message::user(text));
            history.push(Message::assistant(""));
        }

        let handle = self
            .session
            .begin_exchange(&prior, text, context, transcript)
            .await;
        let mut handle = match handle {
            Ok(handle) => handle,
            Err(err) => {
                self.replace_tail(self.error_reply.clone()).await;
                self.save_history().await;
                return Err(err);
            }
        };

        while let Some(token) = handle.next_token().await {
            let mut history = self.history.write().await;
            if let Some(tail) = history.last_mut() {
                tail.content.push_str(&token);
            }
        }

        let exchange = handle.finish();
        if !exchange.succeeded && exchange.response.is_empty() {
            self.replace_tail(self.error_reply.clone()).await;
        }
        self.save_history().await;
        Ok(exchange)
    }

    async fn replace_tail(&self, content: String) {
        let mut history = self.history.write().await;
        if let Some(tail) = history.last_mut() {
            tail.content = content;
        }
    }

    async fn save_history(&self) {
        let snapshot = self.history.read().await.clone();
        if let Err(err) = self.store.save(self.user_id, &snapshot).await {
            warn!("history save failed for {}: {err}", self.user_id);
        }
    }
}
