pub mod actor;
pub mod handler;
pub mod protocol;
pub mod registry;

use tokio::sync::mpsc;

/// Type alias for the sender half of a WebSocket connection's channel.
/// Other parts of the system can clone this to push messages to a specific client.
pub type ConnectionSender = mpsc::UnboundedSender<axum::extract::ws::Message>;

/// Serialize an event and push it onto a connection's outbound channel.
/// Fire-and-forget: a closed channel means the connection is on its way out.
pub fn send_event(tx: &ConnectionSender, event: &protocol::ServerEvent) {
    if let Some(msg) = event.to_ws_message() {
        let _ = tx.send(msg);
    }
}
