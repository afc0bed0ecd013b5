// SPDX-FileCopyrightText: 2026 Figrelay Contributors
// SPDX-License-Identifier: MIT

//! HTTP front-end and JSON-RPC method dispatch.
//!
//! Three endpoints: `GET /sse` opens an agent session and its event stream, `POST /messages`
//! accepts JSON-RPC envelopes addressed to a session, and `GET /plugin` upgrades to the plugin
//! WebSocket. A posted request is acknowledged synchronously with a minimal
//! `{result: {ack: <method>}}` body; the substantive JSON-RPC response is pushed asynchronously
//! onto the session's stream as a `message` event. These are two distinct observable effects of
//! one call and both must happen for every request carrying an id.

use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::{SinkExt, Stream, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::correlate::Correlator;
use crate::figma::FigmaClient;
use crate::pool::{ClientId, PluginPool};
use crate::session::{SessionId, SessionRegistry, StreamFrame};
use crate::tools::{self, Dispatcher};
use crate::wire::{Operation, PluginEvent};

use super::types::{
    ack_response, error_response, parse_envelope, recover_id, result_response, Envelope, RpcError,
    PROTOCOL_VERSION, SERVER_NAME,
};

const SESSION_HEADER: &str = "x-session-id";

/// The coordinating service object: owns every shared collection explicitly (no ambient state),
/// which is what lets the tests drive it with fake transports.
pub struct BridgeServer {
    sessions: Arc<SessionRegistry>,
    pool: Arc<PluginPool>,
    correlator: Arc<Correlator>,
    dispatcher: Dispatcher,
}

impl BridgeServer {
    pub fn new(config: &Config) -> Self {
        let pool = Arc::new(PluginPool::new());
        let correlator = Arc::new(Correlator::new());
        let figma = Arc::new(FigmaClient::new(config.figma_token.clone()));
        Self {
            sessions: Arc::new(SessionRegistry::new()),
            dispatcher: Dispatcher::new(Arc::clone(&pool), Arc::clone(&correlator), figma),
            pool,
            correlator,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    pub fn pool(&self) -> &Arc<PluginPool> {
        &self.pool
    }

    pub fn correlator(&self) -> &Arc<Correlator> {
        &self.correlator
    }

    pub fn router(self: Arc<Self>) -> Router {
        Router::new()
            .route("/sse", get(open_stream))
            .route("/messages", post(post_message))
            .route("/plugin", get(plugin_socket))
            .with_state(self)
    }

    /// Dispatches one validated envelope and pushes the substantive reply (if any is owed) onto
    /// the session stream. A write to a session that has since closed is a silent no-op.
    pub async fn handle_envelope(&self, session_id: SessionId, envelope: Envelope) {
        let Envelope { id, method, params } = envelope;
        match method.as_str() {
            "initialize" => {
                if self.sessions.mark_initialized(&session_id).is_none() {
                    debug!(%session_id, "initialize for a session that already closed");
                }
                info!(%session_id, "session initialized");
                self.respond(
                    &session_id,
                    id,
                    Ok(json!({
                        "protocolVersion": PROTOCOL_VERSION,
                        "capabilities": {"tools": {}},
                        "serverInfo": {
                            "name": SERVER_NAME,
                            "version": env!("CARGO_PKG_VERSION"),
                        },
                    })),
                );
            }
            "notifications/initialized" => {
                debug!(%session_id, "agent acknowledged initialization");
            }
            "tools/list" => {
                let catalog = tools::catalog();
                let count = catalog.len();
                let outcome = serde_json::to_value(&catalog)
                    .map(|tools| json!({"tools": tools, "count": count}))
                    .map_err(|err| {
                        RpcError::internal_error(format!("cannot serialize tool catalog: {err}"))
                    });
                self.respond(&session_id, id, outcome);
            }
            "tools/call" => {
                if !self.sessions.is_initialized(&session_id) {
                    debug!(%session_id, "tools/call before initialize; processing anyway");
                }
                let outcome = self.call_tool(id.as_ref(), params).await;
                self.respond(&session_id, id, outcome);
            }
            other => {
                self.respond(&session_id, id, Err(RpcError::method_not_found(other)));
            }
        }
    }

    async fn call_tool(
        &self,
        id: Option<&Value>,
        params: Option<Value>,
    ) -> Result<Value, RpcError> {
        let params = params.unwrap_or(Value::Null);
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| RpcError::invalid_params("params.name must be a tool name string"))?
            .to_owned();
        let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));
        let request_id = id.cloned().unwrap_or(Value::Null);

        let reply = self.dispatcher.dispatch(&request_id, &name, arguments).await?;
        Ok(json!({"content": [{"type": "text", "text": reply.text}]}))
    }

    fn respond(&self, session_id: &SessionId, id: Option<Value>, outcome: Result<Value, RpcError>) {
        let Some(id) = id else {
            // notification: nothing is owed on the stream
            if let Err(error) = outcome {
                debug!(%session_id, %error, "dropping error outcome of a notification");
            }
            return;
        };
        let response = match outcome {
            Ok(result) => result_response(&id, result),
            Err(error) => error_response(&id, &error),
        };
        if !self.sessions.push(session_id, StreamFrame::Message(response)) {
            debug!(%session_id, "session stream closed before the reply could be delivered");
        }
    }

    /// Handles one inbound plugin text frame. A parse failure is logged and the socket stays
    /// open; outcome messages nobody is waiting for (late or duplicate) are dropped.
    pub fn handle_plugin_frame(&self, client_id: &ClientId, raw: &str) {
        match serde_json::from_str::<PluginEvent>(raw) {
            Err(err) => {
                warn!(%client_id, %err, "unparseable plugin frame; keeping socket open");
            }
            Ok(PluginEvent::PluginReady { version }) => {
                info!(%client_id, version = version.as_deref().unwrap_or("unknown"), "plugin ready");
            }
            Ok(event) => {
                if !self.correlator.deliver(event) {
                    debug!(%client_id, "plugin message with no pending call; dropped");
                }
            }
        }
    }
}

/// Closes the session when the agent's stream is dropped, however that happens.
struct StreamGuard {
    sessions: Arc<SessionRegistry>,
    session_id: SessionId,
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.sessions.close(&self.session_id);
        info!(session_id = %self.session_id, "agent stream closed");
    }
}

struct SessionStream {
    inner: UnboundedReceiverStream<StreamFrame>,
    _guard: StreamGuard,
}

impl Stream for SessionStream {
    type Item = Result<Event, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx).map(|frame| frame.map(|frame| Ok(frame_event(frame))))
    }
}

fn frame_event(frame: StreamFrame) -> Event {
    match frame {
        StreamFrame::Endpoint { uri } => Event::default().event("endpoint").data(uri),
        StreamFrame::Heartbeat => Event::default().event("heartbeat").data("keep-alive"),
        StreamFrame::Message(response) => Event::default().event("message").data(response.to_string()),
    }
}

async fn open_stream(State(app): State<Arc<BridgeServer>>) -> Sse<SessionStream> {
    let (session_id, rx) = app.sessions.open();
    let endpoint = format!("/messages?sessionId={session_id}");
    app.sessions.push(&session_id, StreamFrame::Endpoint { uri: endpoint });
    info!(%session_id, "agent stream opened");

    Sse::new(SessionStream {
        inner: UnboundedReceiverStream::new(rx),
        _guard: StreamGuard { sessions: Arc::clone(&app.sessions), session_id },
    })
}

#[derive(Debug, Deserialize)]
struct MessageQuery {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

async fn post_message(
    State(app): State<Arc<BridgeServer>>,
    Query(query): Query<MessageQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let session_id = query.session_id.or_else(|| {
        headers.get(SESSION_HEADER).and_then(|value| value.to_str().ok()).map(str::to_owned)
    });
    let Some(session_id) = session_id else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "missing sessionId query parameter or x-session-id header"})),
        )
            .into_response();
    };
    let session_id = SessionId::from(session_id);
    if !app.sessions.contains(&session_id) {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "unknown session", "sessionId": session_id.as_str()})),
        )
            .into_response();
    }

    let raw: Value = match serde_json::from_slice(&body) {
        Ok(raw) => raw,
        Err(err) => {
            let error = RpcError::invalid_request(format!("body is not valid JSON: {err}"));
            return (StatusCode::BAD_REQUEST, Json(error_response(&Value::Null, &error)))
                .into_response();
        }
    };
    let envelope = match parse_envelope(&raw) {
        Ok(envelope) => envelope,
        Err(error) => {
            return (StatusCode::BAD_REQUEST, Json(error_response(&recover_id(&raw), &error)))
                .into_response();
        }
    };

    let ack = ack_response(envelope.id.as_ref(), &envelope.method);
    tokio::spawn(async move {
        app.handle_envelope(session_id, envelope).await;
    });

    (StatusCode::OK, Json(ack)).into_response()
}

async fn plugin_socket(
    State(app): State<Arc<BridgeServer>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_plugin_socket(socket, app))
}

async fn handle_plugin_socket(socket: WebSocket, app: Arc<BridgeServer>) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    // greet before registering so server-ready is the socket's first frame
    match serde_json::to_string(&Operation::ServerReady) {
        Ok(frame) => {
            let _ = tx.send(frame);
        }
        Err(err) => warn!(%err, "cannot serialize server-ready"),
    }
    let client_id = app.pool.register(tx);
    info!(%client_id, "plugin connected");

    let writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if ws_tx.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = ws_rx.next().await {
        match frame {
            Ok(Message::Text(text)) => app.handle_plugin_frame(&client_id, text.as_str()),
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(err) => {
                warn!(%client_id, %err, "plugin socket error");
                break;
            }
        }
    }

    app.pool.unregister(&client_id);
    writer.abort();
    info!(%client_id, "plugin disconnected");
}
