//! Connection registry and presence broadcaster.
//!
//! Maps a user id to its single active connection; the key set is the
//! online-user set. A later login for the same user overwrites the entry
//! (last-writer-wins, no multi-device fan-out). Unregistration is keyed on
//! the handle issued at registration, so the delayed disconnect of a
//! superseded connection can never evict its successor.
//!
//! Constructed per process (and per test) and injected through AppState —
//! there is no global instance.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::ws::protocol::ServerEvent;
use crate::ws::ConnectionSender;

/// Handle identifying one specific user/connection association.
/// Issued by `register`; required by `unregister`.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: u64,
    user_id: String,
}

impl ConnectionHandle {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

struct ActiveConnection {
    id: u64,
    tx: ConnectionSender,
}

#[derive(Default)]
pub struct ConnectionRegistry {
    connections: DashMap<String, ActiveConnection>,
    next_id: AtomicU64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `user_id` with this connection, overwriting any prior
    /// association for the same user, then broadcast the online set to
    /// every registered connection (the new one included).
    pub fn register(&self, user_id: &str, tx: ConnectionSender) -> ConnectionHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.connections
            .insert(user_id.to_string(), ActiveConnection { id, tx });

        tracing::debug!(user_id, connection_id = id, "Connection registered");
        self.broadcast_online_users();

        ConnectionHandle {
            id,
            user_id: user_id.to_string(),
        }
    }

    /// Drop the association held by `handle` if it is still the current
    /// one, then broadcast the online set. A handle already superseded by
    /// a newer login removes nothing and broadcasts nothing.
    pub fn unregister(&self, handle: &ConnectionHandle) {
        let removed = self
            .connections
            .remove_if(&handle.user_id, |_, current| current.id == handle.id);

        if removed.is_some() {
            tracing::debug!(
                user_id = %handle.user_id,
                connection_id = handle.id,
                "Connection unregistered"
            );
            self.broadcast_online_users();
        }
    }

    /// Look up the active connection for a user. Absence means offline —
    /// a normal outcome, never an error.
    pub fn resolve(&self, user_id: &str) -> Option<ConnectionSender> {
        self.connections.get(user_id).map(|entry| entry.tx.clone())
    }

    pub fn is_online(&self, user_id: &str) -> bool {
        self.connections.contains_key(user_id)
    }

    /// Snapshot of the currently-online user ids.
    pub fn online_users(&self) -> Vec<String> {
        self.connections
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Push an event to every registered connection.
    pub fn broadcast(&self, event: &ServerEvent) {
        if let Some(msg) = event.to_ws_message() {
            for entry in self.connections.iter() {
                let _ = entry.value().tx.send(msg.clone());
            }
        }
    }

    fn broadcast_online_users(&self) {
        let users = self.online_users();
        self.broadcast(&ServerEvent::OnlineUsers { users });
    }
}
