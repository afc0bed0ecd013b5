// SPDX-FileCopyrightText: 2026 Figrelay Contributors
// SPDX-License-Identifier: MIT

//! Plugin connection pool.
//!
//! One entry per open plugin socket, keyed by a freshly generated client id. Broadcast is the
//! only delivery mechanism; there is no per-plugin addressing, and any connected plugin may
//! serve any request. A sender that errors on write is logged and skipped but not removed —
//! removal happens only through the socket's own close path, to avoid racing in-flight writes.

use std::collections::BTreeMap;
use std::fmt;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

use crate::wire::Operation;

/// Opaque plugin client identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClientId(String);

impl ClientId {
    fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug)]
pub enum BroadcastError {
    Serialize(serde_json::Error),
}

impl fmt::Display for BroadcastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serialize(source) => write!(f, "cannot serialize operation: {source}"),
        }
    }
}

impl std::error::Error for BroadcastError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Serialize(source) => Some(source),
        }
    }
}

/// Pool of open plugin sockets, each represented by the sending half of its writer channel.
#[derive(Default)]
pub struct PluginPool {
    clients: Mutex<BTreeMap<ClientId, mpsc::UnboundedSender<String>>>,
}

impl PluginPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the socket's writer keyed by a fresh client id and returns the id.
    pub fn register(&self, tx: mpsc::UnboundedSender<String>) -> ClientId {
        let client_id = ClientId::generate();
        self.clients.lock().insert(client_id.clone(), tx);
        client_id
    }

    /// Removes the entry on socket close. Unregistering twice or an unknown id is a no-op.
    pub fn unregister(&self, client_id: &ClientId) {
        self.clients.lock().remove(client_id);
    }

    pub fn is_empty(&self) -> bool {
        self.clients.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.clients.lock().len()
    }

    /// Serializes `operation` once and writes it to every registered socket. Returns the number
    /// of sockets the frame was handed to; writers that error are logged and skipped. An empty
    /// pool yields `Ok(0)` — the caller must surface that as "no plugin connected".
    pub fn broadcast(&self, operation: &Operation) -> Result<usize, BroadcastError> {
        let frame = serde_json::to_string(operation).map_err(BroadcastError::Serialize)?;
        let guard = self.clients.lock();
        let mut delivered = 0;
        for (client_id, tx) in guard.iter() {
            if tx.send(frame.clone()).is_ok() {
                delivered += 1;
            } else {
                warn!(%client_id, operation = operation.name(), "plugin socket write failed; skipping");
            }
        }
        Ok(delivered)
    }
}
