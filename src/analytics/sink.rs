//! Analytics sink posting JSON events to a report endpoint.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

use crate::core::config::AnalyticsConfig;
use crate::core::errors::{AssistantError, AssistantResult};
use crate::core::sentiment::Sentiment;

/// Boxed future type for sink operations.
pub type SinkFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Fire-and-forget event recorder.
///
/// Callers log failures and never block an exchange on delivery.
pub trait AnalyticsSink: Send + Sync {
    /// Record the sentiment classified for one user message.
    ///
    /// # Errors
    /// Returns an error if delivery fails; the caller only logs it.
    fn track_sentiment(
        &self,
        message: &str,
        sentiment: Sentiment,
    ) -> SinkFuture<'_, AssistantResult<()>>;

    /// Record one completed exchange.
    ///
    /// # Errors
    /// Returns an error if delivery fails; the caller only logs it.
    fn track_exchange(
        &self,
        user_message: &str,
        response: &str,
        sentiment: Sentiment,
    ) -> SinkFuture<'_, AssistantResult<()>>;
}

const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct SentimentEvent<'a> {
    message: &'a str,
    sentiment: Sentiment,
}

#[derive(Serialize)]
struct ExchangeEvent<'a> {
    user_message: &'a str,
    response: &'a str,
    sentiment: Sentiment,
}

/// HTTP sink posting JSON events to the configured analytics endpoint.
pub struct HttpAnalyticsSink {
    client: Client,
    endpoint: String,
}

impl HttpAnalyticsSink {
    /// Build a sink from analytics settings.
    ///
    /// # Errors
    /// Returns an error if no endpoint is configured or the HTTP client
    /// cannot be built.
    pub fn new(config: &AnalyticsConfig) -> AssistantResult<Self> {
        let endpoint = config.endpoint.clone().ok_or_else(|| {
            AssistantError::InvalidConfig("analytics.endpoint is not set".to_string())
        })?;
        let client = Client::builder()
            .timeout(CLIENT_TIMEOUT)
            .build()
            .map_err(AssistantError::from)?;
        Ok(Self { client, endpoint })
    }

    async fn post<T: Serialize>(&self, path: &str, event: &T) -> AssistantResult<()> {
        let url = format!("{}{path}", self.endpoint);
        let response = self
            .client
            .post(&url)
            .json(event)
            .send()
            .await
            .map_err(|err| AssistantError::Persistence(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssistantError::Persistence(format!(
                "analytics endpoint returned {status}"
            )));
        }
        Ok(())
    }
}

impl AnalyticsSink for HttpAnalyticsSink {
    fn track_sentiment(
        &self,
        message: &str,
        sentiment: Sentiment,
    ) -> SinkFuture<'_, AssistantResult<()>> {
        let message = message.to_string();
        Box::pin(async move {
            self.post(
                "/sentiment",
                &SentimentEvent {
                    message: &message,
                    sentiment,
                },
            )
            .await
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
        Box::pin(async move {
            self.post(
                "/exchange",
                &ExchangeEvent {
                    user_message: &user_message,
                    response: &response,
                    sentiment,
                },
            )
            .await
        })
    }
}

/// Sink that drops every event; used when no endpoint is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopAnalyticsSink;

impl AnalyticsSink for NoopAnalyticsSink {
    fn track_sentiment(
        &self,
        _message: &str,
        _sentiment: Sentiment,
    ) -> SinkFuture<'_, AssistantResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn track_exchange(
        &self,
        _user_message: &str,
        _response: &str,
        _sentiment: Sentiment,
    ) -> SinkFuture<'_, AssistantResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
