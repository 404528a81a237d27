//! Wire protocol: JSON text frames of the form
//! `{"type": "<event>", "data": {...}}`.
//!
//! Inbound and outbound events are closed enums with a single exhaustive
//! dispatch, so adding an event is a compile-time concern rather than a
//! string-keyed handler registration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chat;
use crate::db::models::{ChatMessage, Conversation};
use crate::state::AppState;
use crate::ws::registry::ConnectionHandle;
use crate::ws::{send_event, ConnectionSender};

// --- Inbound payloads ---

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SendMessagePayload {
    pub sender_id: String,
    pub receiver_id: String,
    pub content: String,
    pub conversation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TypingPayload {
    pub sender_id: String,
    pub receiver_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ReadReceiptPayload {
    pub message_id: String,
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct FileUploadPayload {
    pub sender_id: String,
    pub receiver_id: String,
    pub file_name: String,
    /// Base64-encoded file content
    pub data: String,
    pub mime_type: String,
    pub conversation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateGroupPayload {
    pub creator_id: String,
    pub name: String,
    pub description: Option<String>,
    pub member_ids: Vec<String>,
}

/// Every event a client may send over the socket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "login")]
    Login(LoginPayload),
    #[serde(rename = "message:send")]
    SendMessage(SendMessagePayload),
    #[serde(rename = "typing:start")]
    TypingStart(TypingPayload),
    #[serde(rename = "typing:stop")]
    TypingStop(TypingPayload),
    #[serde(rename = "message:read")]
    MarkRead(ReadReceiptPayload),
    #[serde(rename = "file:upload")]
    FileUpload(FileUploadPayload),
    #[serde(rename = "group:create")]
    CreateGroup(CreateGroupPayload),
}

/// Every event the server may push to a client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerEvent {
    /// Full online-user set, broadcast on every registry change.
    #[serde(rename = "online:users")]
    OnlineUsers { users: Vec<String> },
    /// Acknowledgment of a persisted message, sent to its sender.
    #[serde(rename = "message:sent")]
    MessageSent { message: ChatMessage },
    /// New incoming message, pushed to its receiver.
    #[serde(rename = "message:receive")]
    MessageReceive { message: ChatMessage },
    #[serde(rename = "message:error")]
    MessageError { message: String },
    #[serde(rename = "typing:start")]
    TypingStart { sender_id: String },
    #[serde(rename = "typing:stop")]
    TypingStop { sender_id: String },
    /// A message the recipient has now read, pushed to the original sender.
    #[serde(rename = "message:read")]
    MessageRead {
        message_id: String,
        read_by: String,
        read_at: DateTime<Utc>,
    },
    /// Confirmation to the creator carrying the full conversation record.
    #[serde(rename = "group:created")]
    GroupCreated { conversation: Conversation },
    /// Invitation pushed to each connected member.
    #[serde(rename = "group:invited")]
    GroupInvited {
        conversation_id: String,
        name: Option<String>,
        invited_by: String,
    },
    #[serde(rename = "group:create:error")]
    GroupCreateError { message: String },
    #[serde(rename = "file:upload:error")]
    FileUploadError { message: String },
    /// Frame-level failure (malformed JSON, unknown event).
    #[serde(rename = "error")]
    ProtocolError { message: String },
}

impl ServerEvent {
    /// Serialize into a WebSocket text frame.
    pub fn to_ws_message(&self) -> Option<axum::extract::ws::Message> {
        match serde_json::to_string(self) {
            Ok(json) => Some(axum::extract::ws::Message::Text(json.into())),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize server event");
                None
            }
        }
    }
}

/// Per-connection session state owned by the actor. Holds the registry
/// handle once the connection has logged in.
#[derive(Default)]
pub struct Session {
    pub handle: Option<ConnectionHandle>,
}

/// Handle one incoming text frame: decode the event, dispatch it.
pub async fn handle_text_message(
    text: &str,
    session: &mut Session,
    tx: &ConnectionSender,
    state: &AppState,
) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to decode client event");
            send_event(
                tx,
                &ServerEvent::ProtocolError {
                    message: "Invalid event".to_string(),
                },
            );
            return;
        }
    };

    dispatch_event(event, session, tx, state).await;
}

/// Exhaustive dispatch over the closed set of inbound events.
async fn dispatch_event(
    event: ClientEvent,
    session: &mut Session,
    tx: &ConnectionSender,
    state: &AppState,
) {
    match event {
        ClientEvent::Login(payload) => {
            // A second login on the same connection re-registers under the
            // new identity; release the previous association first.
            if let Some(previous) = session.handle.take() {
                state.registry.unregister(&previous);
            }

            tracing::info!(user_id = %payload.user_id, "User logged in");
            let handle = state.registry.register(&payload.user_id, tx.clone());
            session.handle = Some(handle);
        }
        ClientEvent::SendMessage(payload) => {
            chat::router::send_message(state, tx, payload).await;
        }
        ClientEvent::TypingStart(payload) => {
            chat::typing::forward(state, payload, true);
        }
        ClientEvent::TypingStop(payload) => {
            chat::typing::forward(state, payload, false);
        }
        ClientEvent::MarkRead(payload) => {
            chat::receipts::mark_read(state, payload).await;
        }
        ClientEvent::FileUpload(payload) => {
            chat::files::send_file(state, tx, payload).await;
        }
        ClientEvent::CreateGroup(payload) => {
            chat::groups::create_group(state, tx, payload).await;
        }
    }
}
