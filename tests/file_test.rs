//! Integration tests for the file-transfer relay.

mod common;

use base64::{engine::general_purpose::STANDARD, Engine};
use common::{
    connect_and_login, count_messages, expect_silence, next_event, send_event, start_test_server,
};
use serde_json::json;

use agora_chat::store::{ChatStore, SqliteStore};

#[tokio::test]
async fn test_file_upload_stores_payload_and_relays_message() {
    let server = start_test_server().await;

    let (mut alice_write, mut alice_read) = connect_and_login(server.addr, "alice").await;
    let (_bob_write, mut bob_read) = connect_and_login(server.addr, "bob").await;
    let _ = next_event(&mut alice_read).await; // bob online

    let payload = b"quarterly sales figures";
    send_event(
        &mut alice_write,
        "file:upload",
        json!({
            "sender_id": "alice",
            "receiver_id": "bob",
            "file_name": "report.csv",
            "data": STANDARD.encode(payload),
            "mime_type": "text/csv",
            "conversation_id": "c1",
        }),
    )
    .await;

    let ack = next_event(&mut alice_read).await;
    assert_eq!(ack["type"], "message:sent");
    let message = &ack["data"]["message"];
    assert_eq!(message["content"], "Sent a file: report.csv");
    assert_eq!(message["file_type"], "text/csv");
    let file_url = message["file_url"].as_str().expect("file url");
    assert!(file_url.starts_with("/uploads/"));
    assert!(file_url.ends_with("report.csv"));

    let push = next_event(&mut bob_read).await;
    assert_eq!(push["type"], "message:receive");
    assert_eq!(push["data"]["message"], *message);

    // The decoded payload landed on disk under the uploads root
    let stored_name = file_url.trim_start_matches("/uploads/");
    let stored_path = server.data_dir.join("uploads").join(stored_name);
    let stored = std::fs::read(&stored_path).expect("uploaded file should exist");
    assert_eq!(stored, payload);

    // And the message row carries the locator
    let message_id = message["id"].as_str().unwrap().to_string();
    let store = SqliteStore::new(server.db.clone());
    let persisted = store.find_message(&message_id).await.unwrap().unwrap();
    assert_eq!(persisted.file_url.as_deref(), Some(file_url));
    assert_eq!(persisted.file_type.as_deref(), Some("text/csv"));
    assert!(!persisted.is_read);
}

#[tokio::test]
async fn test_file_upload_with_invalid_encoding_is_rejected() {
    let server = start_test_server().await;

    let (mut alice_write, mut alice_read) = connect_and_login(server.addr, "alice").await;

    send_event(
        &mut alice_write,
        "file:upload",
        json!({
            "sender_id": "alice",
            "receiver_id": "bob",
            "file_name": "broken.bin",
            "data": "!!! definitely not base64 !!!",
            "mime_type": "application/octet-stream",
            "conversation_id": null,
        }),
    )
    .await;

    let error = next_event(&mut alice_read).await;
    assert_eq!(error["type"], "file:upload:error");
    assert!(error["data"]["message"].as_str().is_some());

    // Nothing persisted, connection still usable
    assert_eq!(count_messages(&server.db), 0);

    send_event(
        &mut alice_write,
        "message:send",
        json!({
            "sender_id": "alice",
            "receiver_id": "bob",
            "content": "plain text instead",
            "conversation_id": null,
        }),
    )
    .await;

    let ack = next_event(&mut alice_read).await;
    assert_eq!(ack["type"], "message:sent");
}

#[tokio::test]
async fn test_file_name_with_path_separators_is_sanitized() {
    let server = start_test_server().await;

    let (mut alice_write, mut alice_read) = connect_and_login(server.addr, "alice").await;

    send_event(
        &mut alice_write,
        "file:upload",
        json!({
            "sender_id": "alice",
            "receiver_id": "bob",
            "file_name": "../../etc/passwd",
            "data": STANDARD.encode(b"harmless"),
            "mime_type": "text/plain",
            "conversation_id": null,
        }),
    )
    .await;

    let ack = next_event(&mut alice_read).await;
    assert_eq!(ack["type"], "message:sent");
    let file_url = ack["data"]["message"]["file_url"].as_str().unwrap();

    // The stored name keeps no path separators, so the file stays inside
    // the uploads root
    let stored_name = file_url.trim_start_matches("/uploads/");
    assert!(!stored_name.contains('/'));
    let stored_path = server.data_dir.join("uploads").join(stored_name);
    assert!(stored_path.exists());

    expect_silence(&mut alice_read, 300).await;
}
