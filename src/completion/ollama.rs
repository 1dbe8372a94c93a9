//! Ollama-backed streaming completion over NDJSON chat responses.

use std::time::Duration;

use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::completion::streaming::{
    ChatTurn, CompletionFuture, StreamingCompletion, TOKEN_CHANNEL_CAPACITY, TokenStream,
};
use crate::core::config::LlmConfig;
use crate::core::errors::{AssistantError, AssistantResult};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
struct StreamChatRequest {
    model: String,
    messages: Vec<WireTurn>,
    stream: bool,
    options: StreamOptions,
}

#[derive(Serialize)]
struct WireTurn {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct StreamOptions {
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u64>,
}

#[derive(Deserialize)]
struct StreamChunk {
    message: Option<StreamChunkMessage>,
    #[serde(default)]
    done: bool,
}

#[derive(Deserialize)]
struct StreamChunkMessage {
    content: String,
}

/// Streaming chat completion against a local Ollama runtime.
pub struct OllamaStreamingCompletion {
    client: Client,
    model: String,
    base_url: String,
    max_tokens: Option<u64>,
}

impl OllamaStreamingCompletion {
    /// Build a streaming completion client from completion-model settings.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> AssistantResult<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(AssistantError::from)?;
        Ok(Self {
            client,
            model: config.model.clone(),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            max_tokens: config.max_tokens,
        })
    }
}

impl StreamingCompletion for OllamaStreamingCompletion {
    fn stream_complete(
        &self,
        turns: Vec<ChatTurn>,
        temperature: f64,
    ) -> CompletionFuture<'_, AssistantResult<TokenStream>> {
        Box::pin(async move {
            let request = StreamChatRequest {
                model: self.model.clone(),
                messages: turns
                    .into_iter()
                    .map(|turn| WireTurn {
                        role: turn.role.as_str(),
                        content: turn.content,
                    })
                    .collect(),
                stream: true,
                options: StreamOptions {
                    temperature,
                    num_predict: self.max_tokens,
                },
            };

            let url = format!("{}/api/chat", self.base_url);
            let response = self.client.post(&url).json(&request).send().await?;
            let status = response.status();
            if status.is_server_error() {
                return Err(AssistantError::TransientNetwork(format!(
                    "completion endpoint returned {status}"
                )));
            }
            if !status.is_success() {
                return Err(AssistantError::Model(format!(
                    "completion endpoint returned {status}"
                )));
            }

            let (tx, rx) = mpsc::channel(TOKEN_CHANNEL_CAPACITY);
            let producer = tokio::spawn(pump_chunks(response, tx));
            Ok(TokenStream::new(rx, producer))
        })
    }
}

/// Forward NDJSON chat chunks into the token channel until the backend marks
/// the response done, the consumer hangs up, or the connection drops.
async fn pump_chunks(response: reqwest::Response, tx: mpsc::Sender<AssistantResult<String>>) {
    let mut produced = String::new();
    let mut buffer = String::new();
    let mut body = response.bytes_stream();

    while let Some(next) = body.next().await {
        let bytes = match next {
            Ok(bytes) => bytes,
            Err(err) => {
                let _ = tx
                    .send(Err(AssistantError::StreamInterrupted {
                        reason: err.to_string(),
                        partial: produced,
                    }))
                    .await;
                return;
            }
        };

        buffer.push_str(&String::from_utf8_lossy(&bytes));
        while let Some(newline) = buffer.find('\n') {
            let line: String = buffer.drain(..=newline).collect();
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let chunk: StreamChunk = match serde_json::from_str(line) {
                Ok(chunk) => chunk,
                Err(err) => {
                    let _ = tx
                        .send(Err(AssistantError::StreamInterrupted {
                            reason: format!("malformed stream chunk: {err}"),
                            partial: produced,
                        }))
                        .await;
                    return;
                }
            };

            if let Some(message) = chunk.message
                && !message.content.is_empty()
            {
                produced.push_str(&message.content);
                if tx.send(Ok(message.content)).await.is_err() {
                    // Consumer hung up; stop pulling the body.
                    return;
                }
            }
            if chunk.done {
                return;
            }
        }
    }

    // Body ended without a done marker: the connection dropped mid-response.
    let _ = tx
        .send(Err(AssistantError::StreamInterrupted {
            reason: "stream ended before completion".to_string(),
            partial: produced,
        }))
        .await;
}
