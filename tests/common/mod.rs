//! Shared harness for integration tests: boots the server on an ephemeral
//! port with a temp-dir database and drives it over real WebSockets.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use agora_chat::chat::delivery::BestEffortDelivery;
use agora_chat::db::{self, DbPool};
use agora_chat::routes;
use agora_chat::state::AppState;
use agora_chat::storage::DiskStorage;
use agora_chat::store::SqliteStore;
use agora_chat::ws::registry::ConnectionRegistry;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

pub type WsWriter = SplitSink<WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>, Message>;
pub type WsReader = SplitStream<WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>>;

pub struct TestServer {
    pub addr: SocketAddr,
    pub db: DbPool,
    pub data_dir: PathBuf,
    // Dropped with the server, deleting the temp database and uploads
    _tmp_dir: tempfile::TempDir,
}

/// Start the server on a random port with a fresh temp-dir database.
pub async fn start_test_server() -> TestServer {
    let tmp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let data_dir = tmp_dir.path().to_path_buf();
    let data_dir_str = data_dir.to_str().unwrap().to_string();

    let db = db::init_db(&data_dir_str).expect("Failed to init DB");
    let uploads = DiskStorage::new(&data_dir_str).expect("Failed to init uploads dir");

    let state = AppState {
        store: Arc::new(SqliteStore::new(db.clone())),
        registry: Arc::new(ConnectionRegistry::new()),
        delivery: Arc::new(BestEffortDelivery),
        uploads: Arc::new(uploads),
    };

    let app = routes::build_router(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    TestServer {
        addr,
        db,
        data_dir,
        _tmp_dir: tmp_dir,
    }
}

/// Connect a WebSocket client without logging in.
pub async fn connect(addr: SocketAddr) -> (WsWriter, WsReader) {
    let ws_url = format!("ws://{}/ws", addr);
    let (ws_stream, _) = tokio_tungstenite::connect_async(&ws_url)
        .await
        .expect("Failed to connect to WebSocket");
    ws_stream.split()
}

/// Connect a WebSocket client and log in as `user_id`, consuming the
/// online-set broadcast the login triggers on this connection.
pub async fn connect_and_login(addr: SocketAddr, user_id: &str) -> (WsWriter, WsReader) {
    let (mut write, mut read) = connect(addr).await;

    send_event(&mut write, "login", json!({ "user_id": user_id })).await;

    let presence = next_event(&mut read).await;
    assert_eq!(presence["type"], "online:users");

    (write, read)
}

/// Send one protocol frame: `{"type": ..., "data": ...}`.
pub async fn send_event(write: &mut WsWriter, event_type: &str, data: Value) {
    let frame = json!({ "type": event_type, "data": data }).to_string();
    write
        .send(Message::Text(frame.into()))
        .await
        .expect("Failed to send frame");
}

/// Read the next JSON event, failing the test after two seconds.
/// Transport-level ping/pong frames are skipped.
pub async fn next_event(read: &mut WsReader) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(2), read.next())
            .await
            .expect("Expected an event within timeout")
            .expect("Stream ended")
            .expect("WebSocket error");

        match msg {
            Message::Text(text) => {
                return serde_json::from_str(text.as_str()).expect("Event should be JSON")
            }
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("Expected text frame, got: {:?}", other),
        }
    }
}

/// Assert that no event arrives on this connection within `millis`.
pub async fn expect_silence(read: &mut WsReader, millis: u64) {
    match tokio::time::timeout(Duration::from_millis(millis), read.next()).await {
        Err(_) => {}
        Ok(msg) => panic!("Expected no event, got: {:?}", msg),
    }
}

/// Count the rows in the messages table.
pub fn count_messages(db: &DbPool) -> i64 {
    let conn = db.lock().unwrap();
    conn.query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))
        .unwrap()
}

/// Fetch (user_id, role) membership rows for a conversation.
pub fn list_member_rows(db: &DbPool, conversation_id: &str) -> Vec<(String, String)> {
    let conn = db.lock().unwrap();
    let mut stmt = conn
        .prepare(
            "SELECT user_id, role FROM conversation_members \
             WHERE conversation_id = ?1 ORDER BY user_id",
        )
        .unwrap();
    stmt.query_map([conversation_id], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .filter_map(|r| r.ok())
        .collect()
}
