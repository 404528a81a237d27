//! Persistence collaborator for the real-time core.
//!
//! Every call is independently fallible; absence of a row is a normal
//! outcome (`Ok(None)`), not an error. The core never assumes atomicity
//! across separate calls — the one multi-row operation (group creation)
//! is transactional inside a single call.

mod sqlite;

pub use sqlite::SqliteStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::db::models::{ChatMessage, Conversation, NewConversation, NewMessage};

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The connection mutex was poisoned by a panicking writer.
    #[error("Database lock poisoned")]
    LockPoisoned,

    /// The blocking task running the query was cancelled or panicked.
    #[error("Blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Convenience alias used throughout the store.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Narrow persistence interface consumed by the chat core.
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Persist a new message with is_read=false and a fresh id/timestamp.
    /// Returns the full persisted record.
    async fn insert_message(&self, new: NewMessage) -> Result<ChatMessage>;

    /// Flip the read flag of a message, conditioned on `reader_id` being
    /// the message's receiver. Returns the number of affected rows — zero
    /// means the message doesn't exist or is addressed to someone else.
    async fn mark_message_read(
        &self,
        message_id: &str,
        reader_id: &str,
        read_at: DateTime<Utc>,
    ) -> Result<u64>;

    /// Fetch a message by id. Absence is `Ok(None)`.
    async fn find_message(&self, message_id: &str) -> Result<Option<ChatMessage>>;

    /// Create a group conversation together with its membership rows in a
    /// single transaction: the creator with role admin, every id in
    /// `member_ids` with role member. Nothing persists on failure.
    async fn create_group(
        &self,
        new: NewConversation,
        member_ids: Vec<String>,
    ) -> Result<Conversation>;
}
