//! File-transfer relay: decode the inline payload, hand it to object
//! storage, persist a message referencing the locator, then deliver it
//! like any other message. The payload itself is treated as opaque.

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::chat::router;
use crate::db::models::NewMessage;
use crate::state::AppState;
use crate::ws::protocol::{FileUploadPayload, ServerEvent};
use crate::ws::{send_event, ConnectionSender};

pub async fn send_file(state: &AppState, tx: &ConnectionSender, payload: FileUploadPayload) {
    let bytes = match STANDARD.decode(&payload.data) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(
                error = %e,
                file = %payload.file_name,
                "Rejected file upload with invalid encoding"
            );
            send_event(
                tx,
                &ServerEvent::FileUploadError {
                    message: "Invalid file encoding".to_string(),
                },
            );
            return;
        }
    };

    let file_url = match state.uploads.store(&payload.file_name, &bytes).await {
        Ok(url) => url,
        Err(e) => {
            tracing::error!(
                error = %e,
                file = %payload.file_name,
                "Failed to store uploaded file"
            );
            send_event(
                tx,
                &ServerEvent::FileUploadError {
                    message: "Failed to store file".to_string(),
                },
            );
            return;
        }
    };

    let new = NewMessage {
        sender_id: payload.sender_id,
        receiver_id: payload.receiver_id,
        conversation_id: payload.conversation_id,
        content: format!("Sent a file: {}", payload.file_name),
        file_url: Some(file_url),
        file_type: Some(payload.mime_type),
    };

    match state.store.insert_message(new).await {
        Ok(message) => router::deliver(state, tx, message),
        Err(e) => {
            tracing::error!(error = %e, "Failed to persist file message");
            send_event(
                tx,
                &ServerEvent::FileUploadError {
                    message: "Failed to send file".to_string(),
                },
            );
        }
    }
}
