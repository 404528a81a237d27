//! Outbound delivery policy.

use crate::ws::protocol::ServerEvent;
use crate::ws::registry::ConnectionRegistry;

/// Policy for delivering an event to a user who may or may not be
/// connected. A store-and-forward queue could be substituted here without
/// touching any call site.
pub trait DeliveryStrategy: Send + Sync {
    /// Attempt delivery. Returns true if a connection accepted the event.
    fn deliver(&self, registry: &ConnectionRegistry, user_id: &str, event: &ServerEvent) -> bool;
}

/// Deliver to the user's active connection if one is registered, otherwise
/// skip silently — an unreachable peer is a normal condition, and offline
/// durability comes from persistence, not from this layer.
pub struct BestEffortDelivery;

impl DeliveryStrategy for BestEffortDelivery {
    fn deliver(&self, registry: &ConnectionRegistry, user_id: &str, event: &ServerEvent) -> bool {
        match registry.resolve(user_id) {
            Some(tx) => {
                if let Some(msg) = event.to_ws_message() {
                    let _ = tx.send(msg);
                }
                true
            }
            None => {
                tracing::trace!(user_id, "Receiver offline, skipping delivery");
                false
            }
        }
    }
}
