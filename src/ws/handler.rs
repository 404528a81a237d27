use axum::{
    extract::{ws::WebSocketUpgrade, ConnectInfo, State},
    response::Response,
};
use std::net::SocketAddr;

use crate::state::AppState;
use crate::ws::actor;

/// GET /ws
/// WebSocket upgrade endpoint. Identity is established afterward by the
/// login event on the socket itself; until then the connection is
/// anonymous and receives no broadcasts.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    ws: WebSocketUpgrade,
) -> Response {
    tracing::debug!(peer = %addr, "WebSocket connection accepted");
    ws.on_upgrade(move |socket| actor::run_connection(socket, state))
}
