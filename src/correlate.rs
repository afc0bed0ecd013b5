// SPDX-FileCopyrightText: 2026 Figrelay Contributors
// SPDX-License-Identifier: MIT

//! Response correlator.
//!
//! Every tool call that awaits plugin confirmation arms one [`PendingCall`] before its
//! operation is broadcast. The plugin protocol carries no request identifiers — outcomes are
//! matched by declared operation name (or by a dedicated outcome tag), so correlation assumes at
//! most one call per distinct operation name is in flight against the pool. Concurrent
//! same-operation calls from different sessions are not disambiguated: first match wins. This is
//! a known limitation of the wire protocol, preserved deliberately.
//!
//! Resolution is exactly-once by construction: delivery removes the pending entry under the
//! table lock before the one-shot channel fires, and the timeout path removes by token only if
//! the entry is still present. Whichever side loses the race finds nothing left to resolve.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::debug;

use crate::wire::PluginEvent;

/// What a pending call is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AwaitKind {
    /// An `operation-completed` or `operation-error` whose `originalOperation` matches.
    Report { operation: &'static str },
    NodesDeleted,
    NodesMoved,
    FontsList,
    NodesList,
}

impl AwaitKind {
    fn matches(&self, event: &PluginEvent) -> bool {
        match (self, event) {
            (
                Self::Report { operation },
                PluginEvent::OperationCompleted { original_operation, .. }
                | PluginEvent::OperationError { original_operation, .. },
            ) => original_operation == operation,
            (Self::NodesDeleted, PluginEvent::NodesDeleted { .. })
            | (Self::NodesMoved, PluginEvent::NodesMoved { .. })
            | (Self::FontsList, PluginEvent::FontsList { .. })
            | (Self::NodesList, PluginEvent::NodesList { .. }) => true,
            _ => false,
        }
    }
}

/// Terminal state of one pending call.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    Event(PluginEvent),
    TimedOut,
}

struct PendingCall {
    token: u64,
    request_id: serde_json::Value,
    kind: AwaitKind,
    tx: oneshot::Sender<PluginEvent>,
}

/// An armed pending call; dropped (or timed out) entries are detached from the table.
pub struct PendingOutcome<'a> {
    correlator: &'a Correlator,
    token: u64,
    rx: oneshot::Receiver<PluginEvent>,
}

impl PendingOutcome<'_> {
    /// Waits until a matching plugin message resolves this call or `timeout` elapses,
    /// whichever comes first.
    pub async fn wait(mut self, timeout: std::time::Duration) -> Outcome {
        match tokio::time::timeout(timeout, &mut self.rx).await {
            Ok(Ok(event)) => Outcome::Event(event),
            // sender dropped without resolving, or the clock ran out
            Ok(Err(_)) | Err(_) => Outcome::TimedOut,
        }
    }
}

impl Drop for PendingOutcome<'_> {
    fn drop(&mut self) {
        self.correlator.cancel(self.token);
    }
}

/// Table of pending calls shared by every dispatch and every plugin socket.
#[derive(Default)]
pub struct Correlator {
    pending: Mutex<Vec<PendingCall>>,
    next_token: AtomicU64,
}

impl Correlator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a pending call. Must happen before the operation is broadcast so that a fast
    /// plugin reply cannot slip past the table.
    pub fn arm(&self, request_id: &serde_json::Value, kind: AwaitKind) -> PendingOutcome<'_> {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().push(PendingCall {
            token,
            request_id: request_id.clone(),
            kind,
            tx,
        });
        PendingOutcome { correlator: self, token, rx }
    }

    /// Hands an incoming plugin message to the first pending call it satisfies. Returns `false`
    /// when no call claims it — late and duplicate messages land here and are simply dropped.
    pub fn deliver(&self, event: PluginEvent) -> bool {
        let claimed = {
            let mut guard = self.pending.lock();
            guard
                .iter()
                .position(|call| call.kind.matches(&event))
                .map(|index| guard.remove(index))
        };
        match claimed {
            Some(call) => {
                if call.tx.send(event).is_err() {
                    // receiver already gave up (timeout fired between unlock and send)
                    debug!(request_id = %call.request_id, "pending call resolved after its waiter left");
                }
                true
            }
            None => false,
        }
    }

    fn cancel(&self, token: u64) {
        self.pending.lock().retain(|call| call.token != token);
    }

    pub fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }
}
