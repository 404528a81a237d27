/// Database row types for all tables.
/// These correspond 1:1 to the SQLite schema defined in migrations.rs
/// and double as the wire representations carried by server events.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted chat message, direct or addressed into a conversation.
/// A message carrying a file reference also carries a human-readable
/// placeholder in `content`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub conversation_id: Option<String>,
    pub content: String,
    pub file_url: Option<String>,
    pub file_type: Option<String>,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by the caller when persisting a new message.
/// id, is_read, and created_at are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender_id: String,
    pub receiver_id: String,
    pub conversation_id: Option<String>,
    pub content: String,
    pub file_url: Option<String>,
    pub file_type: Option<String>,
}

/// Conversation record. name/description are present only for groups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub created_by: String,
    pub is_group: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by the caller when creating a group conversation.
/// id, is_group, and created_at are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewConversation {
    pub name: Option<String>,
    pub description: Option<String>,
    pub created_by: String,
}

/// Membership role within a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Admin,
    Member,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }
}

/// Join row linking a user to a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMember {
    pub conversation_id: String,
    pub user_id: String,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
}
