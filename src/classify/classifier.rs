//! Sentiment classifier asking the chat model to rate free text.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::config::LlmConfig;
use crate::core::errors::{AssistantError, AssistantResult};
use crate::core::sentiment::Sentiment;

/// Boxed future type for classifier operations.
pub type ClassifyFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Trait abstraction over sentiment classifiers.
pub trait SentimentClassifier: Send + Sync {
    /// Classify free text into the closed sentiment set.
    ///
    /// # Errors
    /// Returns an error if the backend call fails; callers substitute
    /// [`Sentiment::Neutral`] rather than aborting the exchange.
    fn classify(&self, text: &str) -> ClassifyFuture<'_, AssistantResult<Sentiment>>;
}

const CLASSIFIER_SYSTEM_PROMPT: &str = "Rate sentiment: positive, neutral, or negative.";
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ChatResponseMessage>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Classifier backed by a one-shot Ollama chat completion.
pub struct OllamaSentimentClassifier {
    client: Client,
    model: String,
    base_url: String,
}

impl OllamaSentimentClassifier {
    /// Build a classifier from completion-model settings.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> AssistantResult<Self> {
        let client = Client::builder()
            .timeout(CLIENT_TIMEOUT)
            .build()
            .map_err(AssistantError::from)?;
        Ok(Self {
            client,
            model: config.model.clone(),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }
}

impl SentimentClassifier for OllamaSentimentClassifier {
    fn classify(&self, text: &str) -> ClassifyFuture<'_, AssistantResult<Sentiment>> {
        let text = text.to_string();
        Box::pin(async move {
            let request = ChatRequest {
                model: &self.model,
                messages: vec![
                    WireMessage {
                        role: "system",
                        content: CLASSIFIER_SYSTEM_PROMPT,
                    },
                    WireMessage {
                        role: "user",
                        content: &text,
                    },
                ],
                stream: false,
            };

            let url = format!("{}/api/chat", self.base_url);
            let response = self.client.post(&url).json(&request).send().await?;
            let status = response.status();
            if status.is_server_error() {
                return Err(AssistantError::TransientNetwork(format!(
                    "sentiment endpoint returned {status}"
                )));
            }
            if !status.is_success() {
                return Err(AssistantError::Model(format!(
                    "sentiment endpoint returned {status}"
                )));
            }

            let body: ChatResponse = response.json().await?;
            let reply = body.message.map(|message| message.content).unwrap_or_default();
            // Unparseable replies fall back to neutral rather than erroring.
            Ok(Sentiment::from_model_reply(&reply).unwrap_or_default())
        })
    }
}
