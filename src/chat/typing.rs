//! Transient typing indicators. Pure forwarding — nothing is persisted,
//! and repeated start events simply re-emit; debouncing is the client's
//! responsibility.

use crate::state::AppState;
use crate::ws::protocol::{ServerEvent, TypingPayload};

pub fn forward(state: &AppState, payload: TypingPayload, started: bool) {
    let event = if started {
        ServerEvent::TypingStart {
            sender_id: payload.sender_id,
        }
    } else {
        ServerEvent::TypingStop {
            sender_id: payload.sender_id,
        }
    };

    state
        .delivery
        .deliver(&state.registry, &payload.receiver_id, &event);
}
