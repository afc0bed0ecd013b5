// SPDX-FileCopyrightText: 2026 Figrelay Contributors
// SPDX-License-Identifier: MIT

//! JSON-RPC 2.0 envelope handling and error vocabulary.
//!
//! Every error path is an explicit [`RpcError`] value; the transport layer decides whether it
//! goes out synchronously (envelope malformation) or on the session stream (everything else).

use serde::Serialize;
use serde_json::{json, Value};

pub const JSONRPC_VERSION: &str = "2.0";

pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

/// Protocol version advertised by `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "figrelay";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self { code: INVALID_REQUEST, message: message.into(), data: None }
    }

    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: METHOD_NOT_FOUND,
            message: format!("method not found: {method}"),
            data: None,
        }
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self { code: INVALID_PARAMS, message: message.into(), data: None }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self { code: INTERNAL_ERROR, message: message.into(), data: None }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

impl std::fmt::Display for RpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rpc error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for RpcError {}

/// A validated request envelope. `id: None` marks a notification (no substantive reply owed);
/// a JSON `null` id is treated the same way.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub id: Option<Value>,
    pub method: String,
    pub params: Option<Value>,
}

/// Validates the posted body as a JSON-RPC 2.0 envelope.
pub fn parse_envelope(raw: &Value) -> Result<Envelope, RpcError> {
    let object = raw.as_object().ok_or_else(|| {
        RpcError::invalid_request("request body must be a JSON-RPC 2.0 object")
    })?;

    match object.get("jsonrpc").and_then(Value::as_str) {
        Some(JSONRPC_VERSION) => {}
        _ => return Err(RpcError::invalid_request("jsonrpc must be the string \"2.0\"")),
    }

    let method = object
        .get("method")
        .and_then(Value::as_str)
        .ok_or_else(|| RpcError::invalid_request("method must be a string"))?
        .to_owned();

    let id = match object.get("id") {
        None | Some(Value::Null) => None,
        Some(id @ (Value::String(_) | Value::Number(_))) => Some(id.clone()),
        Some(_) => return Err(RpcError::invalid_request("id must be a string or number")),
    };

    Ok(Envelope { id, method, params: object.get("params").cloned() })
}

/// Id as recovered from an arbitrary (possibly malformed) body, for error responses.
pub fn recover_id(raw: &Value) -> Value {
    match raw.get("id") {
        Some(id @ (Value::String(_) | Value::Number(_))) => id.clone(),
        _ => Value::Null,
    }
}

pub fn result_response(id: &Value, result: Value) -> Value {
    json!({"jsonrpc": JSONRPC_VERSION, "id": id, "result": result})
}

pub fn error_response(id: &Value, error: &RpcError) -> Value {
    json!({"jsonrpc": JSONRPC_VERSION, "id": id, "error": error})
}

/// Minimal synchronous HTTP acknowledgment; this is not the substantive reply, which arrives
/// on the session stream.
pub fn ack_response(id: Option<&Value>, method: &str) -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "id": id.cloned().unwrap_or(Value::Null),
        "result": {"ack": method},
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn parses_a_request_envelope() {
        let raw = json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}});
        let envelope = parse_envelope(&raw).expect("envelope");
        assert_eq!(envelope.id, Some(json!(1)));
        assert_eq!(envelope.method, "initialize");
        assert_eq!(envelope.params, Some(json!({})));
    }

    #[test]
    fn notification_has_no_id() {
        let raw = json!({"jsonrpc": "2.0", "method": "notifications/initialized"});
        let envelope = parse_envelope(&raw).expect("envelope");
        assert_eq!(envelope.id, None);

        let raw = json!({"jsonrpc": "2.0", "id": null, "method": "notifications/initialized"});
        assert_eq!(parse_envelope(&raw).expect("envelope").id, None);
    }

    #[rstest]
    #[case::not_an_object(json!([1, 2]))]
    #[case::missing_version(json!({"id": 1, "method": "initialize"}))]
    #[case::wrong_version(json!({"jsonrpc": "1.0", "id": 1, "method": "initialize"}))]
    #[case::missing_method(json!({"jsonrpc": "2.0", "id": 1}))]
    #[case::method_not_a_string(json!({"jsonrpc": "2.0", "id": 1, "method": 7}))]
    #[case::id_not_a_scalar(json!({"jsonrpc": "2.0", "id": {"nested": true}, "method": "x"}))]
    fn malformed_envelopes_are_invalid_requests(#[case] raw: Value) {
        let error = parse_envelope(&raw).expect_err("must fail");
        assert_eq!(error.code, INVALID_REQUEST);
    }

    #[test]
    fn recover_id_falls_back_to_null() {
        assert_eq!(recover_id(&json!({"id": 7})), json!(7));
        assert_eq!(recover_id(&json!({"id": {"bad": 1}})), Value::Null);
        assert_eq!(recover_id(&json!("not an object")), Value::Null);
    }

    #[test]
    fn responses_carry_the_fixed_version() {
        let ok = result_response(&json!(1), json!({"done": true}));
        assert_eq!(ok, json!({"jsonrpc": "2.0", "id": 1, "result": {"done": true}}));

        let err = error_response(&json!(2), &RpcError::method_not_found("nope"));
        assert_eq!(err["error"]["code"], json!(METHOD_NOT_FOUND));
        assert_eq!(err["id"], json!(2));

        let ack = ack_response(Some(&json!(3)), "tools/call");
        assert_eq!(ack["result"]["ack"], json!("tools/call"));
        let ack = ack_response(None, "notifications/initialized");
        assert_eq!(ack["id"], Value::Null);
    }

    #[test]
    fn error_data_is_omitted_when_absent() {
        let error = RpcError::internal_error("boom");
        let value = serde_json::to_value(&error).expect("serialize");
        assert_eq!(value, json!({"code": INTERNAL_ERROR, "message": "boom"}));

        let error = error.with_data(json!({"hint": "retry"}));
        let value = serde_json::to_value(&error).expect("serialize");
        assert_eq!(value["data"]["hint"], json!("retry"));
    }
}
