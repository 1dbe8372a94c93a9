//! Conversation session orchestration.
//!
//! One exchange moves through gather, compose, stream and persist stages.
//! Gathering fans out concurrently and absorbs every failure; persistence is
//! fire-and-forget. Only the completion stream itself can fail an exchange.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, warn};

use crate::analytics::sink::AnalyticsSink;
use crate::classify::classifier::SentimentClassifier;
use crate::completion::streaming::{ChatTurn, StreamingCompletion};
use crate::core::config::AssistantConfig;
use crate::core::errors::{AssistantError, AssistantResult};
use crate::core::message::Message;
use crate::core::sentiment::Sentiment;
use crate::memory::index::MemoryIndex;
use crate::prompt::composer::compose;
use crate::session::exchange::{Exchange, ExchangeHandle};

/// Collaborators injected into the session at construction.
pub struct SessionBackends {
    /// User-scoped memory index.
    pub personal: Arc<dyn MemoryIndex>,
    /// Shared cross-user memory index.
    pub collective: Arc<dyn MemoryIndex>,
    /// Sentiment classifier.
    pub classifier: Arc<dyn SentimentClassifier>,
    /// Streaming completion backend.
    pub completion: Arc<dyn StreamingCompletion>,
    /// Fire-and-forget analytics sink.
    pub analytics: Arc<dyn AnalyticsSink>,
}

/// Orchestrator for conversational exchanges.
#[derive(Clone)]
pub struct ConversationSession {
    config: AssistantConfig,
    personal: Arc<dyn MemoryIndex>,
    collective: Arc<dyn MemoryIndex>,
    classifier: Arc<dyn SentimentClassifier>,
    completion: Arc<dyn StreamingCompletion>,
    analytics: Arc<dyn AnalyticsSink>,
}

/// Results of the gathering stage, degraded where dependencies failed.
struct Gathered {
    personal: Vec<String>,
    collective: Vec<String>,
    sentiment: Sentiment,
}

impl ConversationSession {
    /// Create a new session from validated configuration and backends.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(config: AssistantConfig, backends: SessionBackends) -> AssistantResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            personal: backends.personal,
            collective: backends.collective,
            classifier: backends.classifier,
            completion: backends.completion,
            analytics: backends.analytics,
        })
    }

    /// Access the session configuration.
    #[must_use]
    pub const fn config(&self) -> &AssistantConfig {
        &self.config
    }

    /// Start one exchange: gather memory and sentiment concurrently, compose
    /// the system prompt, and open the completion stream.
    ///
    /// `history` is the conversation before the new user message. Returns a
    /// cancellable token-producing handle; [`ExchangeHandle::finish`] yields
    /// the settled [`Exchange`].
    ///
    /// # Errors
    /// Returns an error only if the completion stream cannot be started;
    /// gathering failures degrade to empty memory and neutral sentiment.
    pub async fn begin_exchange(
        &self,
        history: &[Message],
        user_message: &str,
        context: &str,
        transcript: &str,
    ) -> AssistantResult<ExchangeHandle> {
        let gathered = self.gather(user_message).await;
        self.spawn_sentiment_event(user_message, gathered.sentiment);

        let system_prompt = compose(
            &self.config.persona.system_preamble,
            context,
            transcript,
            &gathered.personal,
            &gathered.collective,
            gathered.sentiment,
        );

        let mut turns = Vec::with_capacity(history.len() + 2);
        turns.push(ChatTurn::system(system_prompt));
        turns.extend(history.iter().map(ChatTurn::from));
        turns.push(ChatTurn::user(user_message));

        let stream = self
            .completion
            .stream_complete(turns, gathered.sentiment.temperature())
            .await?;

        Ok(ExchangeHandle::new(
            self.clone(),
            user_message,
            gathered.sentiment,
            stream,
        ))
    }

    /// Run one exchange to completion and return the settled result.
    ///
    /// # Errors
    /// Returns an error if the completion stream cannot be started.
    pub async fn send_message(
        &self,
        history: &[Message],
        user_message: &str,
        context: &str,
        transcript: &str,
    ) -> AssistantResult<Exchange> {
        let mut handle = self
            .begin_exchange(history, user_message, context, transcript)
            .await?;
        while handle.next_token().await.is_some() {}
        Ok(handle.finish())
    }

    /// Fan out to both memory indices and the classifier, all keyed off the
    /// user message. Each call is independently bounded and fault-tolerant.
    async fn gather(&self, user_message: &str) -> Gathered {
        let top_k = self.config.retrieval.top_k;
        let limit = Duration::from_millis(self.config.gather.call_timeout_ms);

        let (personal, collective, sentiment) = tokio::join!(
            bounded(limit, self.personal.query(user_message, top_k)),
            bounded(limit, self.collective.query(user_message, top_k)),
            bounded(limit, self.classifier.classify(user_message)),
        );

        let personal = personal.unwrap_or_else(|err| {
            warn!("personal memory query degraded to empty: {err}");
            Vec::new()
        });
        let collective = collective.unwrap_or_else(|err| {
            warn!("collective memory query degraded to empty: {err}");
            Vec::new()
        });
        let sentiment = sentiment.unwrap_or_else(|err| {
            warn!("sentiment classification degraded to neutral: {err}");
            Sentiment::Neutral
        });

        debug!(
            "Gathered {} personal and {} collective memories, sentiment {sentiment}",
            personal.len(),
            collective.len()
        );
        Gathered {
            personal,
            collective,
            sentiment,
        }
    }

    fn spawn_sentiment_event(&self, message: &str, sentiment: Sentiment) {
        let sink = Arc::clone(&self.analytics);
        let message = message.to_string();
        tokio::spawn(async move {
            if let Err(err) = sink.track_sentiment(&message, sentiment).await {
                debug!("sentiment analytics event dropped: {err}");
            }
        });
    }

    /// Persist a settled exchange: best-effort upserts into both memory
    /// indices and the exchange analytics event, all independent of each
    /// other and of the caller. Skipped entirely when no text was produced.
    pub(crate) fn persist_exchange(&self, exchange: &Exchange) {
        if exchange.response.is_empty() {
            debug!("no response text produced; skipping memory persistence");
            return;
        }

        let content = format!("{}\n{}", exchange.user_message, exchange.response);

        let personal = Arc::clone(&self.personal);
        let entry = content.clone();
        tokio::spawn(async move {
            if let Err(err) = personal.upsert(&entry).await {
                warn!("personal memory upsert failed: {err}");
            }
        });

        let collective = Arc::clone(&self.collective);
        tokio::spawn(async move {
            if let Err(err) = collective.upsert(&content).await {
                warn!("collective memory upsert failed: {err}");
            }
        });

        let analytics = Arc::clone(&self.analytics);
        let user_message = exchange.user_message.clone();
        let response = exchange.response.clone();
        let sentiment = exchange.sentiment;
        tokio::spawn(async move {
            if let Err(err) = analytics
                .track_exchange(&user_message, &response, sentiment)
                .await
            {
                warn!("exchange analytics event dropped: {err}");
            }
        });
    }
}

async fn bounded<T>(
    limit: Duration,
    call: impl Future<Output = AssistantResult<T>>,
) -> AssistantResult<T> {
    match timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(AssistantError::TransientNetwork(
            "dependency call timed out".to_string(),
        )),
    }
}
