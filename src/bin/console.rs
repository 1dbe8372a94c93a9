//! Console conversation demo against a local Ollama runtime.
//! Run with: `cargo run --bin echo-console`
//!
//! Walks a short scripted conversation through the full exchange pipeline,
//! printing tokens as they stream. Requires Ollama listening on the default
//! port with the configured embedding and completion models pulled.

use std::io::Write;
use std::sync::Arc;

use echo_assistant::analytics::sink::{AnalyticsSink, HttpAnalyticsSink, NoopAnalyticsSink};
use echo_assistant::classify::classifier::OllamaSentimentClassifier;
use echo_assistant::completion::ollama::OllamaStreamingCompletion;
use echo_assistant::core::config::AssistantConfig;
use echo_assistant::core::message::Message;
use echo_assistant::embedding::embedder::{Embedder, OllamaEmbedder};
use echo_assistant::memory::in_memory::InMemoryVectorIndex;
use echo_assistant::session::core::{ConversationSession, SessionBackends};

const SCRIPT: [&str; 3] = [
    "Hello",
    "How do you handle errors?",
    "Summarize our chat so far.",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let config = AssistantConfig::default();
    config.validate()?;

    let embedder: Arc<dyn Embedder> = Arc::new(OllamaEmbedder::new(&config.embedding)?);
    let analytics: Arc<dyn AnalyticsSink> = if config.analytics.endpoint.is_some() {
        Arc::new(HttpAnalyticsSink::new(&config.analytics)?)
    } else {
        Arc::new(NoopAnalyticsSink)
    };

    let session = ConversationSession::new(
        config.clone(),
        SessionBackends {
            personal: Arc::new(InMemoryVectorIndex::new("personal", Arc::clone(&embedder))),
            collective: Arc::new(InMemoryVectorIndex::new("collective", embedder)),
            classifier: Arc::new(OllamaSentimentClassifier::new(&config.llm)?),
            completion: Arc::new(OllamaStreamingCompletion::new(&config.llm)?),
            analytics,
        },
    )?;

    let mut history: Vec<Message> = Vec::new();
    for user_message in SCRIPT {
        println!("\n> {user_message}");

        let mut handle = session.begin_exchange(&history, user_message, "", "").await?;
        while let Some(token) = handle.next_token().await {
            print!("{token}");
            std::io::stdout().flush()?;
        }
        let exchange = handle.finish();
        println!();

        if !exchange.succeeded {
            eprintln!("[exchange interrupted; keeping partial reply]");
        }
        history.push(Message::user(user_message));
        history.push(Message::assistant(exchange.response));
    }

    Ok(())
}
