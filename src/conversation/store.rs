//! Durable per-user conversation history storage.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use dashmap::DashMap;
use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;

use crate::core::errors::AssistantResult;
use crate::core::ids::UserId;
use crate::core::message::{ConversationHistory, Message};

/// Boxed future type for store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Keyed store of full per-user histories.
///
/// A history is read once when a conversation opens and overwritten wholesale
/// after each completed or failed exchange, never per token.
pub trait SessionStore: Send + Sync {
    /// Load the history for `user_id`; empty if none was saved.
    ///
    /// # Errors
    /// Returns an error if the backing store cannot be read.
    fn load(&self, user_id: UserId) -> StoreFuture<'_, AssistantResult<ConversationHistory>>;

    /// Overwrite the stored history for `user_id`.
    ///
    /// # Errors
    /// Returns an error if the backing store cannot be written.
    fn save(&self, user_id: UserId, history: &[Message]) -> StoreFuture<'_, AssistantResult<()>>;
}

/// `SQLite` implementation storing one JSON history row per user.
pub struct SqliteSessionStore {
    conn: Arc<Connection>,
    table: String,
}

impl SqliteSessionStore {
    /// Table name for conversation histories.
    pub const DEFAULT_TABLE: &'static str = "conversation_history";

    /// Initialize the store and create the table if it doesn't exist.
    ///
    /// # Errors
    /// Returns an error if database operations fail.
    pub async fn new(conn: Arc<Connection>) -> AssistantResult<Self> {
        let table = Self::DEFAULT_TABLE.to_string();
        let table_name = table.clone();

        conn.call(move |conn| {
            conn.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {table_name} (
                    user_id TEXT PRIMARY KEY,
                    history_json TEXT NOT NULL,
                    updated_at INTEGER NOT NULL
                );"
            ))?;
            Ok(())
        })
        .await?;

        Ok(Self { conn, table })
    }
}

impl SessionStore for SqliteSessionStore {
    fn load(&self, user_id: UserId) -> StoreFuture<'_, AssistantResult<ConversationHistory>> {
        Box::pin(async move {
            let table = self.table.clone();
            let id = user_id.to_string();
            let json: Option<String> = self
                .conn
                .call(move |conn| {
                    let mut stmt = conn
                        .prepare(&format!("SELECT history_json FROM {table} WHERE user_id = ?1"))?;
                    let row = stmt.query_row([&id], |row| row.get(0)).optional()?;
                    Ok(row)
                })
                .await?;

            match json {
                Some(json) => Ok(serde_json::from_str(&json)?),
                None => Ok(Vec::new()),
            }
        })
    }

    fn save(&self, user_id: UserId, history: &[Message]) -> StoreFuture<'_, AssistantResult<()>> {
        let json = serde_json::to_string(history);
        Box::pin(async move {
            let json = json?;
            let table = self.table.clone();
            let id = user_id.to_string();
            let now_ms = chrono::Utc::now().timestamp_millis();

            self.conn
                .call(move |conn| {
                    conn.execute(
                        &format!(
                            "INSERT INTO {table} (user_id, history_json, updated_at)
                             VALUES (?1, ?2, ?3)
                             ON CONFLICT(user_id)
                             DO UPDATE SET history_json = ?2, updated_at = ?3"
                        ),
                        rusqlite::params![id, json, now_ms],
                    )?;
                    Ok(())
                })
                .await?;
            Ok(())
        })
    }
}

/// In-process store for tests and embedded use.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    histories: DashMap<UserId, ConversationHistory>,
}

impl InMemorySessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn load(&self, user_id: UserId) -> StoreFuture<'_, AssistantResult<ConversationHistory>> {
        Box::pin(async move {
            Ok(self
                .histories
                .get(&user_id)
                .map(|entry| entry.clone())
                .unwrap_or_default())
        })
    }

    fn save(&self, user_id: UserId, history: &[Message]) -> StoreFuture<'_, AssistantResult<()>> {
        let history = history.to_vec();
        Box::pin(async move {
            self.histories.insert(user_id, history);
            Ok(())
        })
    }
}
