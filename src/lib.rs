// SPDX-FileCopyrightText: 2026 Figrelay Contributors
// SPDX-License-Identifier: MIT

//! Figrelay — a session-keyed relay between a natural-language agent and a Figma plugin
//! sandbox.
//!
//! The agent side speaks JSON-RPC over SSE (`GET /sse` + `POST /messages`); the plugin side
//! holds a WebSocket (`GET /plugin`). Tool calls are translated into typed wire operations,
//! fanned out to every connected plugin, and — where the plugin reports back — correlated to
//! the originating call with a bounded wait.

pub mod bridge;
pub mod config;
pub mod correlate;
pub mod figma;
pub mod pool;
pub mod session;
pub mod tools;
pub mod wire;
