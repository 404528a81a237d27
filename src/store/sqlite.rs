//! SQLite-backed implementation of the chat store.
//!
//! rusqlite is synchronous, so every operation locks the shared connection
//! inside tokio::task::spawn_blocking to avoid starving the runtime.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use crate::db::models::{
    ChatMessage, Conversation, MemberRole, NewConversation, NewMessage,
};
use crate::db::DbPool;

use super::{ChatStore, Result, StoreError};

pub struct SqliteStore {
    db: DbPool,
}

impl SqliteStore {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }
}

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChatMessage> {
    Ok(ChatMessage {
        id: row.get(0)?,
        sender_id: row.get(1)?,
        receiver_id: row.get(2)?,
        conversation_id: row.get(3)?,
        content: row.get(4)?,
        file_url: row.get(5)?,
        file_type: row.get(6)?,
        is_read: row.get(7)?,
        read_at: row.get(8)?,
        created_at: row.get(9)?,
    })
}

const MESSAGE_COLUMNS: &str = "id, sender_id, receiver_id, conversation_id, content, \
                               file_url, file_type, is_read, read_at, created_at";

#[async_trait]
impl ChatStore for SqliteStore {
    async fn insert_message(&self, new: NewMessage) -> Result<ChatMessage> {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || {
            let conn = db.lock().map_err(|_| StoreError::LockPoisoned)?;

            let message = ChatMessage {
                id: Uuid::now_v7().to_string(),
                sender_id: new.sender_id,
                receiver_id: new.receiver_id,
                conversation_id: new.conversation_id,
                content: new.content,
                file_url: new.file_url,
                file_type: new.file_type,
                is_read: false,
                read_at: None,
                created_at: Utc::now(),
            };

            conn.execute(
                "INSERT INTO messages (id, sender_id, receiver_id, conversation_id, content, \
                                       file_url, file_type, is_read, read_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    message.id,
                    message.sender_id,
                    message.receiver_id,
                    message.conversation_id,
                    message.content,
                    message.file_url,
                    message.file_type,
                    message.is_read,
                    message.read_at,
                    message.created_at,
                ],
            )?;

            Ok(message)
        })
        .await?
    }

    async fn mark_message_read(
        &self,
        message_id: &str,
        reader_id: &str,
        read_at: DateTime<Utc>,
    ) -> Result<u64> {
        let db = self.db.clone();
        let message_id = message_id.to_string();
        let reader_id = reader_id.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = db.lock().map_err(|_| StoreError::LockPoisoned)?;

            // The receiver_id condition is the authorization check: a user
            // may only mark messages addressed to them as read. Anything
            // else matches zero rows.
            let affected = conn.execute(
                "UPDATE messages SET is_read = 1, read_at = ?1 \
                 WHERE id = ?2 AND receiver_id = ?3",
                params![read_at, message_id, reader_id],
            )?;

            Ok(affected as u64)
        })
        .await?
    }

    async fn find_message(&self, message_id: &str) -> Result<Option<ChatMessage>> {
        let db = self.db.clone();
        let message_id = message_id.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = db.lock().map_err(|_| StoreError::LockPoisoned)?;

            let message = conn
                .query_row(
                    &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"),
                    params![message_id],
                    row_to_message,
                )
                .optional()?;

            Ok(message)
        })
        .await?
    }

    async fn create_group(
        &self,
        new: NewConversation,
        member_ids: Vec<String>,
    ) -> Result<Conversation> {
        let db = self.db.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = db.lock().map_err(|_| StoreError::LockPoisoned)?;
            let tx = conn.transaction()?;

            let conversation = Conversation {
                id: Uuid::now_v7().to_string(),
                name: new.name,
                description: new.description,
                created_by: new.created_by,
                is_group: true,
                created_at: Utc::now(),
            };

            tx.execute(
                "INSERT INTO conversations (id, name, description, created_by, is_group, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    conversation.id,
                    conversation.name,
                    conversation.description,
                    conversation.created_by,
                    conversation.is_group,
                    conversation.created_at,
                ],
            )?;

            // The creator is always an admin member of their own group,
            // inserted in the same transaction as the conversation row.
            let joined_at = conversation.created_at;
            tx.execute(
                "INSERT INTO conversation_members (conversation_id, user_id, role, joined_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    conversation.id,
                    conversation.created_by,
                    MemberRole::Admin.as_str(),
                    joined_at,
                ],
            )?;

            for member_id in &member_ids {
                tx.execute(
                    "INSERT INTO conversation_members (conversation_id, user_id, role, joined_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![
                        conversation.id,
                        member_id,
                        MemberRole::Member.as_str(),
                        joined_at,
                    ],
                )?;
            }

            tx.commit()?;

            Ok(conversation)
        })
        .await?
    }
}
