// SPDX-FileCopyrightText: 2026 Figrelay Contributors
// SPDX-License-Identifier: MIT

//! Session registry: one entry per open agent event stream.
//!
//! A session is created when the agent opens its SSE stream and destroyed when that stream
//! closes; the session id is the sole join key between a posted JSON-RPC request and the stream
//! its substantive reply must be pushed to. Opening a session also starts the periodic
//! keep-alive writes on the stream; both keep-alive and close are idempotent with respect to a
//! session that has already gone away.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

/// Interval between `heartbeat` frames on an open stream.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(10);

/// Opaque session identifier (random 128-bit, rendered as a UUID string).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(String);

impl SessionId {
    fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// One outbound frame on a session's event stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamFrame {
    /// First frame after stream open; `uri` is the path+query to post requests to.
    Endpoint { uri: String },
    Heartbeat,
    /// A full JSON-RPC response, delivered as a `message` event.
    Message(serde_json::Value),
}

struct SessionEntry {
    tx: mpsc::UnboundedSender<StreamFrame>,
    initialized: bool,
    keep_alive: JoinHandle<()>,
}

/// Registry of open agent sessions.
///
/// All mutation is insert/remove by key under one short-lived lock; nothing awaits while the
/// lock is held.
#[derive(Default)]
pub struct SessionRegistry {
    inner: Mutex<BTreeMap<SessionId, SessionEntry>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh session, stores its outbound channel and starts the keep-alive writer.
    /// Returns the id plus the receiving half the transport layer turns into an event stream.
    pub fn open(self: &Arc<Self>) -> (SessionId, mpsc::UnboundedReceiver<StreamFrame>) {
        let session_id = SessionId::generate();
        let (tx, rx) = mpsc::unbounded_channel();

        let keep_alive = tokio::spawn({
            let registry = Arc::clone(self);
            let session_id = session_id.clone();
            async move {
                let mut ticker = tokio::time::interval(HEARTBEAT_INTERVAL);
                ticker.tick().await; // first tick completes immediately
                loop {
                    ticker.tick().await;
                    if !registry.push(&session_id, StreamFrame::Heartbeat) {
                        break;
                    }
                }
            }
        });

        let entry = SessionEntry { tx, initialized: false, keep_alive };
        self.inner.lock().insert(session_id.clone(), entry);
        (session_id, rx)
    }

    /// Removes the session. Closing twice or closing an unknown id is a no-op.
    pub fn close(&self, session_id: &SessionId) {
        if let Some(entry) = self.inner.lock().remove(session_id) {
            entry.keep_alive.abort();
            debug!(%session_id, "session closed");
        }
    }

    /// Pushes one frame onto the session's stream. Returns `false` when the session is unknown
    /// or its stream already went away; the caller treats that as a silent no-op.
    pub fn push(&self, session_id: &SessionId, frame: StreamFrame) -> bool {
        let guard = self.inner.lock();
        match guard.get(session_id) {
            Some(entry) => entry.tx.send(frame).is_ok(),
            None => false,
        }
    }

    pub fn contains(&self, session_id: &SessionId) -> bool {
        self.inner.lock().contains_key(session_id)
    }

    /// Marks the session as having completed `initialize`. Returns the previous flag value, or
    /// `None` for an unknown session.
    pub fn mark_initialized(&self, session_id: &SessionId) -> Option<bool> {
        let mut guard = self.inner.lock();
        guard.get_mut(session_id).map(|entry| std::mem::replace(&mut entry.initialized, true))
    }

    pub fn is_initialized(&self, session_id: &SessionId) -> bool {
        self.inner.lock().get(session_id).is_some_and(|entry| entry.initialized)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Drops every open session; used on interrupt where streams are cut without drain.
    pub fn clear(&self) {
        let mut guard = self.inner.lock();
        for (_, entry) in std::mem::take(&mut *guard) {
            entry.keep_alive.abort();
        }
    }
}
