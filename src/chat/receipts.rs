//! Read receipts: conditional persisted update plus best-effort
//! notification of the original sender.
//!
//! This path never surfaces an error to the reader — persistence failures
//! are logged and swallowed, and a receipt for a message addressed to
//! someone else is a silent no-op.

use chrono::Utc;

use crate::state::AppState;
use crate::ws::protocol::{ReadReceiptPayload, ServerEvent};

pub async fn mark_read(state: &AppState, payload: ReadReceiptPayload) {
    let read_at = Utc::now();

    let affected = match state
        .store
        .mark_message_read(&payload.message_id, &payload.user_id, read_at)
        .await
    {
        Ok(affected) => affected,
        Err(e) => {
            tracing::warn!(
                error = %e,
                message_id = %payload.message_id,
                "Read receipt update failed"
            );
            return;
        }
    };

    // Zero rows: the message doesn't exist, or the reader isn't its
    // receiver. Either way nobody gets notified.
    if affected == 0 {
        tracing::debug!(
            message_id = %payload.message_id,
            reader = %payload.user_id,
            "Read receipt matched no message"
        );
        return;
    }

    let sender_id = match state.store.find_message(&payload.message_id).await {
        Ok(Some(message)) => message.sender_id,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!(
                error = %e,
                message_id = %payload.message_id,
                "Failed to look up message sender"
            );
            return;
        }
    };

    state.delivery.deliver(
        &state.registry,
        &sender_id,
        &ServerEvent::MessageRead {
            message_id: payload.message_id,
            read_by: payload.user_id,
            read_at,
        },
    );
}
