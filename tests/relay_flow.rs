// SPDX-FileCopyrightText: 2026 Figrelay Contributors
// SPDX-License-Identifier: MIT

//! End-to-end relay flows over a real listener: SSE session handshake, posted JSON-RPC
//! envelopes, and plugin round-trips driven through the connection pool.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use figrelay::bridge::BridgeServer;
use figrelay::config::Config;

const READ_TIMEOUT: Duration = Duration::from_secs(5);

async fn spawn_relay() -> (Arc<BridgeServer>, SocketAddr) {
    let server = Arc::new(BridgeServer::new(&Config { port: 0, figma_token: None }));
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let router = Arc::clone(&server).router();
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    (server, addr)
}

/// Incremental SSE parser over a reqwest byte stream.
struct SseReader {
    stream: std::pin::Pin<
        Box<dyn futures::Stream<Item = reqwest::Result<axum::body::Bytes>> + Send>,
    >,
    buffer: String,
}

impl SseReader {
    async fn open(addr: SocketAddr) -> Self {
        let response = reqwest::get(format!("http://{addr}/sse")).await.expect("open sse");
        assert!(response.status().is_success());
        Self { stream: Box::pin(response.bytes_stream()), buffer: String::new() }
    }

    /// Returns the next `(event, data)` pair, skipping heartbeats.
    async fn next_event(&mut self) -> (String, String) {
        loop {
            if let Some(end) = self.buffer.find("\n\n") {
                let raw: String = self.buffer.drain(..end + 2).collect();
                let mut event = String::new();
                let mut data = String::new();
                for line in raw.lines() {
                    if let Some(rest) = line.strip_prefix("event:") {
                        event = rest.trim().to_owned();
                    } else if let Some(rest) = line.strip_prefix("data:") {
                        data = rest.trim().to_owned();
                    }
                }
                if event == "heartbeat" {
                    continue;
                }
                return (event, data);
            }
            let chunk = tokio::time::timeout(READ_TIMEOUT, self.stream.next())
                .await
                .expect("sse read timed out")
                .expect("sse stream ended")
                .expect("sse chunk");
            self.buffer.push_str(std::str::from_utf8(&chunk).expect("utf-8 chunk"));
        }
    }

    async fn next_message(&mut self) -> Value {
        let (event, data) = self.next_event().await;
        assert_eq!(event, "message");
        serde_json::from_str(&data).expect("message json")
    }
}

async fn open_session(addr: SocketAddr) -> (SseReader, String) {
    let mut sse = SseReader::open(addr).await;
    let (event, endpoint) = sse.next_event().await;
    assert_eq!(event, "endpoint");
    let session_id = endpoint
        .rsplit("sessionId=")
        .next()
        .expect("sessionId in endpoint uri")
        .to_owned();
    (sse, session_id)
}

async fn post(addr: SocketAddr, session_id: &str, body: Value) -> (reqwest::StatusCode, Value) {
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/messages?sessionId={session_id}"))
        .json(&body)
        .send()
        .await
        .expect("post message");
    let status = response.status();
    let body: Value = response.json().await.expect("response json");
    (status, body)
}

#[tokio::test]
async fn initialize_handshake_acks_and_streams_the_capabilities() {
    let (_server, addr) = spawn_relay().await;
    let (mut sse, session_id) = open_session(addr).await;

    let (status, ack) = post(
        addr,
        &session_id,
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
    )
    .await;
    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(ack["id"], json!(1));
    assert_eq!(ack["result"]["ack"], json!("initialize"));

    let response = sse.next_message().await;
    assert_eq!(response["id"], json!(1));
    assert_eq!(response["result"]["protocolVersion"], json!("2024-11-05"));
}

#[tokio::test]
async fn add_numbers_tool_answers_over_the_stream() {
    let (_server, addr) = spawn_relay().await;
    let (mut sse, session_id) = open_session(addr).await;

    let (status, _ack) = post(
        addr,
        &session_id,
        json!({
            "jsonrpc": "2.0",
            "id": 2,
            "method": "tools/call",
            "params": {"name": "addNumbersTool", "arguments": {"a": 2, "b": 3}},
        }),
    )
    .await;
    assert_eq!(status, reqwest::StatusCode::OK);

    let response = sse.next_message().await;
    assert_eq!(response["id"], json!(2));
    assert_eq!(response["result"]["content"][0]["text"], json!("Sum of 2 + 3 = 5"));
}

#[tokio::test]
async fn plugin_tool_without_a_plugin_streams_an_internal_error() {
    let (_server, addr) = spawn_relay().await;
    let (mut sse, session_id) = open_session(addr).await;

    post(
        addr,
        &session_id,
        json!({
            "jsonrpc": "2.0",
            "id": 3,
            "method": "tools/call",
            "params": {
                "name": "figma.createRectangle",
                "arguments": {"position": {"x": 0, "y": 0}, "size": {"width": 10, "height": 10}},
            },
        }),
    )
    .await;

    let response = sse.next_message().await;
    assert_eq!(response["id"], json!(3));
    assert_eq!(response["error"]["code"], json!(-32603));
}

#[tokio::test]
async fn select_node_round_trips_through_a_connected_plugin() {
    let (server, addr) = spawn_relay().await;
    let (mut sse, session_id) = open_session(addr).await;

    let (tx, mut plugin_rx) = mpsc::unbounded_channel::<String>();
    let client_id = server.pool().register(tx);

    post(
        addr,
        &session_id,
        json!({
            "jsonrpc": "2.0",
            "id": 4,
            "method": "tools/call",
            "params": {"name": "figma.selectNode", "arguments": {"nodeId": "12:34"}},
        }),
    )
    .await;

    let frame = tokio::time::timeout(READ_TIMEOUT, plugin_rx.recv())
        .await
        .expect("plugin frame timed out")
        .expect("plugin frame");
    let operation: Value = serde_json::from_str(&frame).expect("operation json");
    assert_eq!(operation["type"], json!("select-node"));
    assert_eq!(operation["nodeId"], json!("12:34"));

    server.handle_plugin_frame(
        &client_id,
        r#"{"type":"operation-completed","originalOperation":"select-node","message":"node 12:34 selected"}"#,
    );

    let response = sse.next_message().await;
    assert_eq!(response["id"], json!(4));
    assert_eq!(response["result"]["content"][0]["text"], json!("node 12:34 selected"));
}

#[tokio::test]
async fn unknown_session_is_a_404() {
    let (_server, addr) = spawn_relay().await;

    let (status, body) = post(
        addr,
        "not-a-session",
        json!({"jsonrpc": "2.0", "id": 5, "method": "tools/list", "params": {}}),
    )
    .await;
    assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("unknown session"));
}

#[tokio::test]
async fn malformed_body_is_a_400_invalid_request() {
    let (_server, addr) = spawn_relay().await;
    let (_sse, session_id) = open_session(addr).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/messages?sessionId={session_id}"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("post message");
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("response json");
    assert_eq!(body["error"]["code"], json!(-32600));
}

#[tokio::test]
async fn session_header_addresses_the_session_too() {
    let (_server, addr) = spawn_relay().await;
    let (mut sse, session_id) = open_session(addr).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/messages"))
        .header("x-session-id", &session_id)
        .json(&json!({"jsonrpc": "2.0", "id": 6, "method": "tools/list", "params": {}}))
        .send()
        .await
        .expect("post message");
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let listing = sse.next_message().await;
    assert_eq!(listing["id"], json!(6));
    assert!(listing["result"]["tools"].is_array());
}
