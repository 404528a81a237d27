//! Ad-hoc group creation: one transactional persistence call, then
//! invitation fan-out to connected members and a confirmation to the
//! creator.

use crate::db::models::NewConversation;
use crate::state::AppState;
use crate::ws::protocol::{CreateGroupPayload, ServerEvent};
use crate::ws::{send_event, ConnectionSender};

pub async fn create_group(state: &AppState, tx: &ConnectionSender, payload: CreateGroupPayload) {
    // Normalize the invite list: drop duplicates and the creator, who is
    // inserted as admin by the store itself.
    let mut member_ids: Vec<String> = Vec::new();
    for member_id in payload.member_ids {
        if member_id != payload.creator_id && !member_ids.contains(&member_id) {
            member_ids.push(member_id);
        }
    }

    let new = NewConversation {
        name: Some(payload.name),
        description: payload.description,
        created_by: payload.creator_id.clone(),
    };

    let conversation = match state.store.create_group(new, member_ids.clone()).await {
        Ok(conversation) => conversation,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create group conversation");
            send_event(
                tx,
                &ServerEvent::GroupCreateError {
                    message: "Failed to create group".to_string(),
                },
            );
            return;
        }
    };

    tracing::info!(
        conversation_id = %conversation.id,
        creator = %payload.creator_id,
        members = member_ids.len(),
        "Group conversation created"
    );

    // Invite every member currently connected; the rest discover the group
    // on their next conversation-list fetch.
    for member_id in &member_ids {
        state.delivery.deliver(
            &state.registry,
            member_id,
            &ServerEvent::GroupInvited {
                conversation_id: conversation.id.clone(),
                name: conversation.name.clone(),
                invited_by: payload.creator_id.clone(),
            },
        );
    }

    send_event(tx, &ServerEvent::GroupCreated { conversation });
}
