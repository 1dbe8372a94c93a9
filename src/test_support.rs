//! Deterministic in-process doubles shared across unit tests.

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::{Notify, mpsc};

use crate::analytics::sink::{AnalyticsSink, SinkFuture};
use crate::classify::classifier::{ClassifyFuture, SentimentClassifier};
use crate::completion::streaming::{
    ChatTurn, CompletionFuture, StreamingCompletion, TokenStream,
};
use crate::core::errors::{AssistantError, AssistantResult};
use crate::core::sentiment::Sentiment;
use crate::embedding::embedder::{EmbedFuture, Embedder};
use crate::memory::index::{IndexFuture, MemoryIndex};

/// Poll `condition` until it holds, panicking after roughly one second.
///
/// Used to observe the effects of fire-and-forget spawned tasks.
pub(crate) async fn wait_until(condition: impl Fn() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition did not hold within the polling window");
}

/// Embedder mapping text onto keyword-count axes.
///
/// Texts mentioning the same keyword land on the same axis, so similarity
/// ranking is predictable without a model.
pub(crate) struct KeywordEmbedder;

const KEYWORDS: [&str; 2] = ["cats", "dogs"];

impl Embedder for KeywordEmbedder {
    fn embed_text(&self, text: &str) -> EmbedFuture<'_, AssistantResult<Vec<f64>>> {
        let mut vec = vec![0.0; KEYWORDS.len() + 1];
        for word in text.split_whitespace() {
            match KEYWORDS.iter().position(|keyword| *keyword == word) {
                Some(axis) => vec[axis] += 1.0,
                None => vec[KEYWORDS.len()] += 1.0,
            }
        }
        Box::pin(async move { Ok(vec) })
    }

    fn ndims(&self) -> usize {
        KEYWORDS.len() + 1
    }
}

/// Embedder whose every call fails.
pub(crate) struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn embed_text(&self, _text: &str) -> EmbedFuture<'_, AssistantResult<Vec<f64>>> {
        Box::pin(async {
            Err(AssistantError::Model(
                "embedder configured to fail".to_string(),
            ))
        })
    }

    fn ndims(&self) -> usize {
        0
    }
}

/// Memory index recording upserted contents; optionally failing every call.
#[derive(Default)]
pub(crate) struct RecordingIndex {
    fail: bool,
    upserts: Mutex<Vec<String>>,
}

impl RecordingIndex {
    /// Index whose queries and upserts all fail.
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            upserts: Mutex::new(Vec::new()),
        }
    }

    /// Contents upserted so far, in order.
    pub(crate) fn upserts(&self) -> Vec<String> {
        self.upserts.lock().unwrap().clone()
    }
}

impl MemoryIndex for RecordingIndex {
    fn query(&self, _text: &str, _top_k: usize) -> IndexFuture<'_, AssistantResult<Vec<String>>> {
        let fail = self.fail;
        Box::pin(async move {
            if fail {
                Err(AssistantError::TransientNetwork(
                    "index configured to fail".to_string(),
                ))
            } else {
                Ok(Vec::new())
            }
        })
    }

    fn upsert(&self, content: &str) -> IndexFuture<'_, AssistantResult<()>> {
        let content = content.to_string();
        Box::pin(async move {
            if self.fail {
                return Err(AssistantError::TransientNetwork(
                    "index configured to fail".to_string(),
                ));
            }
            self.upserts.lock().unwrap().push(content);
            Ok(())
        })
    }
}

/// Classifier returning a fixed sentiment, or failing every call.
pub(crate) struct FixedClassifier {
    outcome: Option<Sentiment>,
}

impl FixedClassifier {
    pub(crate) fn new(sentiment: Sentiment) -> Self {
        Self {
            outcome: Some(sentiment),
        }
    }

    /// Classifier whose every call fails.
    pub(crate) fn failing() -> Self {
        Self { outcome: None }
    }
}

impl SentimentClassifier for FixedClassifier {
    fn classify(&self, _text: &str) -> ClassifyFuture<'_, AssistantResult<Sentiment>> {
        let outcome = self.outcome;
        Box::pin(async move {
            outcome.ok_or_else(|| {
                AssistantError::TransientNetwork("classifier configured to fail".to_string())
            })
        })
    }
}

/// How a scripted completion ends after its tokens are spent.
#[derive(Clone, Copy)]
pub(crate) enum ScriptEnd {
    /// Close the stream normally.
    Complete,
    /// Deliver a stream interruption error.
    Interrupt,
}

/// Completion emitting a fixed token script.
///
/// Records the temperature of every request; an optional gate holds token
/// production until notified, keeping an exchange observably in flight.
pub(crate) struct ScriptedCompletion {
    script: Vec<String>,
    end: ScriptEnd,
    gate: Option<Arc<Notify>>,
    temperatures: Mutex<Vec<f64>>,
}

impl ScriptedCompletion {
    pub(crate) fn new(script: &[&str], end: ScriptEnd) -> Self {
        Self {
            script: script.iter().map(ToString::to_string).collect(),
            end,
            gate: None,
            temperatures: Mutex::new(Vec::new()),
        }
    }

    /// Completion streaming `script` and completing normally.
    pub(crate) fn tokens(script: &[&str]) -> Self {
        Self::new(script, ScriptEnd::Complete)
    }

    /// Completion that waits on `gate` before producing any token.
    pub(crate) fn gated(script: &[&str], gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(script, ScriptEnd::Complete)
        }
    }

    /// Temperatures of every request seen so far, in order.
    pub(crate) fn temperatures(&self) -> Vec<f64> {
        self.temperatures.lock().unwrap().clone()
    }
}

impl StreamingCompletion for ScriptedCompletion {
    fn stream_complete(
        &self,
        _turns: Vec<ChatTurn>,
        temperature: f64,
    ) -> CompletionFuture<'_, AssistantResult<TokenStream>> {
        self.temperatures.lock().unwrap().push(temperature);
        let script = self.script.clone();
        let end = self.end;
        let gate = self.gate.clone();
        Box::pin(async move {
            let (tx, rx) = mpsc::channel(8);
            let producer = tokio::spawn(async move {
                if let Some(gate) = gate {
                    gate.notified().await;
                }
                let mut produced = String::new();
                for token in script {
                    produced.push_str(&token);
                    if tx.send(Ok(token)).await.is_err() {
                        return;
                    }
                }
                if matches!(end, ScriptEnd::Interrupt) {
                    let _ = tx
                        .send(Err(AssistantError::StreamInterrupted {
                            reason: "scripted interruption".to_string(),
                            partial: produced,
                        }))
                        .await;
                }
            });
            Ok(TokenStream::new(rx, producer))
        })
    }
}

/// Analytics sink recording every event; optionally failing every call.
#[derive(Default)]
pub(crate) struct RecordingSink {
    fail: bool,
    sentiments: Mutex<Vec<(String, Sentiment)>>,
    exchanges: Mutex<Vec<(String, String)>>,
}

impl RecordingSink {
    /// Sink whose every call fails.
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Sentiment events recorded so far.
    pub(crate) fn sentiments(&self) -> Vec<(String, Sentiment)> {
        self.sentiments.lock().unwrap().clone()
    }

    /// Exchange events recorded so far as (user message, response) pairs.
    pub(crate) fn exchanges(&self) -> Vec<(String, String)> {
        self.exchanges.lock().unwrap().clone()
    }
}

impl AnalyticsSink for RecordingSink {
    fn track_sentiment(
        &self,
        message: &str,
        sentiment: Sentiment,
    ) -> SinkFuture<'_, AssistantResult<()>> {
        let message = message.to_string();
        Box::pin(async move {
            if self.fail {
                return Err(AssistantError::Persistence(
                    "sink configured to fail".to_string(),
                ));
            }
            self.sentiments.lock().unwrap().push((message, sentiment));
            Ok(())
        })
    }

    fn track_exchange(
        &self,
        user_message: &str,
        response: &str,
        sentiment: Sentiment,
    ) -> SinkFuture<'_, AssistantResult<()>> {
        let user_message = user_message.to_string();
        let response = response.to_string();
        let _ = sentiment;
        Box::pin(async move {
            if self.fail {
                return Err(AssistantError::Persistence(
                    "sink configured to fail".to_string(),
                ));
            }
            self.exchanges
                .lock()
                .unwrap()
                .push((user_message, response));
            Ok(())
        })
    }
}
