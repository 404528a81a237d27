//! Direct message routing: persist first, then deliver.

use crate::db::models::{ChatMessage, NewMessage};
use crate::state::AppState;
use crate::ws::protocol::{SendMessagePayload, ServerEvent};
use crate::ws::{send_event, ConnectionSender};

pub async fn send_message(state: &AppState, tx: &ConnectionSender, payload: SendMessagePayload) {
    let new = NewMessage {
        sender_id: payload.sender_id,
        receiver_id: payload.receiver_id,
        conversation_id: payload.conversation_id,
        content: payload.content,
        file_url: None,
        file_type: None,
    };

    match state.store.insert_message(new).await {
        Ok(message) => deliver(state, tx, message),
        Err(e) => {
            tracing::error!(error = %e, "Failed to persist message");
            send_event(
                tx,
                &ServerEvent::MessageError {
                    message: "Failed to send message".to_string(),
                },
            );
        }
    }
}

/// Ack the persisted message to the issuing connection, then push it to
/// the receiver's connection when one is registered. Persistence has
/// already happened at this point; the two delivery events carry the same
/// record and are unordered relative to one another.
pub(crate) fn deliver(state: &AppState, tx: &ConnectionSender, message: ChatMessage) {
    let receiver_id = message.receiver_id.clone();

    send_event(
        tx,
        &ServerEvent::MessageSent {
            message: message.clone(),
        },
    );

    state.delivery.deliver(
        &state.registry,
        &receiver_id,
        &ServerEvent::MessageReceive { message },
    );
}
