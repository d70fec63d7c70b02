//! Glue for transports that exchange raw bodies.
//!
//! The controller never touches sockets or headers itself; these helpers
//! decode a body, run the pipeline and encode the envelope so an HTTP (or any
//! other) collaborator only has to move bytes.

use serde_json::Value;
use tracing::debug;

use crate::{
    controller::{Controller, Operations},
    error::{Cause, RpcError},
    response::Response,
};

/// Headers a transport should attach to every response body
pub const RESPONSE_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Headers", "Content-Type"),
    ("Content-Type", "application/json; charset=utf-8"),
];

/// Last-resort body when even an error envelope cannot be encoded
const FALLBACK_BODY: &str =
    r#"{"jsonrpc":"2.0","error":{"code":-32603,"message":"Internal error"}}"#;

/// Decode a request body.
///
/// A blank body decodes to `null` and is rejected later as an invalid
/// request; text that is not JSON at all is a parse error.
pub fn decode_body(body: &str) -> Result<Value, RpcError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| {
        debug!(error = %e, "Request body is not valid JSON");
        RpcError::parse_error().with_cause(Cause::capture(&e))
    })
}

/// Encode an envelope, falling back to an internal error envelope.
pub fn encode_response<H>(controller: &Controller<H>, response: &Response) -> String {
    match serde_json::to_string(response) {
        Ok(body) => body,
        Err(e) => {
            let fallback = controller.error_response(response.id.clone(), &RpcError::classify(&e));
            serde_json::to_string(&fallback).unwrap_or_else(|_| FALLBACK_BODY.to_string())
        }
    }
}

/// Handle one raw request body and produce the response body.
pub fn handle_body<H>(controller: &Controller<H>, body: &str) -> String
where
    H: Operations,
{
    let response = match decode_body(body) {
        Ok(payload) => controller.dispatch(&payload),
        Err(error) => controller.error_response(None, &error),
    };
    encode_response(controller, &response)
}

/// Async counterpart of [`handle_body`]
#[cfg(feature = "async")]
pub async fn handle_body_async<H>(controller: &Controller<H>, body: &str) -> String
where
    H: crate::r#async::AsyncOperations,
{
    let response = match decode_body(body) {
        Ok(payload) => controller.dispatch_async(&payload).await,
        Err(error) => controller.error_response(None, &error),
    };
    encode_response(controller, &response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{ControllerConfig, DebugMode},
        signature::OperationSignature,
        table::MethodTable,
    };
    use serde_json::{from_str, json};

    fn controller(debug: DebugMode) -> Controller<MethodTable<RpcError>> {
        let table = MethodTable::new().method(
            "greet",
            OperationSignature::default().param_with_default("name", json!("world")),
            |args| Ok(json!(format!("hello {}", args[0].as_str().unwrap_or("?")))),
        );
        Controller::with_config(table, ControllerConfig::new().with_debug(debug))
    }

    #[test]
    fn test_handle_body_success() {
        let body = handle_body(
            &controller(DebugMode::Disabled),
            r#"{"jsonrpc":"2.0","id":"a","method":"greet","params":{"name":"rpc"}}"#,
        );
        let value: Value = from_str(&body).unwrap();
        assert_eq!(value, json!({"jsonrpc": "2.0", "id": "a", "result": "hello rpc"}));
    }

    #[test]
    fn test_malformed_body_is_parse_error() {
        let body = handle_body(&controller(DebugMode::Disabled), r#"{"jsonrpc": "2.0", "method""#);
        let value: Value = from_str(&body).unwrap();
        assert_eq!(
            value,
            json!({"jsonrpc": "2.0", "error": {"code": -32700, "message": "Parse error"}})
        );
    }

    #[test]
    fn test_malformed_body_discloses_decoder_message_in_debug() {
        let body = handle_body(&controller(DebugMode::Enabled), "{not json");
        let value: Value = from_str(&body).unwrap();
        assert_eq!(value["error"]["code"], -32700);
        assert!(value["error"]["data"]["previousException"]["class"]
            .as_str()
            .unwrap()
            .contains("serde_json"));
    }

    #[test]
    fn test_blank_and_null_bodies_are_invalid_requests() {
        for raw in ["", "   ", "null", "[]", "\"greet\""] {
            let body = handle_body(&controller(DebugMode::Disabled), raw);
            let value: Value = from_str(&body).unwrap();
            assert_eq!(value["error"]["code"], -32600, "body {:?}", raw);
        }
    }

    #[test]
    fn test_response_headers_include_json_content_type() {
        assert!(RESPONSE_HEADERS
            .iter()
            .any(|(name, value)| *name == "Content-Type" && value.starts_with("application/json")));
    }
}
