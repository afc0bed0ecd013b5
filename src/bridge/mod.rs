// SPDX-FileCopyrightText: 2026 Figrelay Contributors
// SPDX-License-Identifier: MIT

//! Protocol front-end: HTTP/SSE/WebSocket surface and JSON-RPC method dispatch.

pub mod server;
pub mod types;

pub use server::BridgeServer;
pub use types::RpcError;
