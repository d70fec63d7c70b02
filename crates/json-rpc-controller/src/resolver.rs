//! Envelope validation and method resolution.

use serde_json::Value;
use tracing::debug;

use crate::{
    error::RpcError,
    request::{Params, ResolvedRequest},
    signature::Capabilities,
    types::{JsonRpcVersion, RequestId},
};

/// The only top-level keys a request may carry
pub const ENVELOPE_KEYS: [&str; 4] = ["jsonrpc", "id", "method", "params"];

/// Method names starting with this prefix are reserved by JSON-RPC 2.0
pub const RESERVED_METHOD_PREFIX: &str = "rpc.";

/// Validate a decoded payload and resolve it against the handler.
///
/// Shape problems always win over lookup problems: a malformed envelope is
/// reported as `Invalid request` even when its method is also unknown.
pub fn resolve<H>(payload: &Value, handler: &H) -> Result<ResolvedRequest, RpcError>
where
    H: Capabilities + ?Sized,
{
    let request = check_envelope(payload)?;
    check_method(&request.method, handler)?;

    debug!(
        method = %request.method,
        id = ?request.id,
        params = request.params.len(),
        "Resolved JSON-RPC request"
    );
    Ok(request)
}

/// Id to echo in the response, if the payload carried a usable one.
///
/// Used for error envelopes, where resolution may not have completed.
pub fn request_id(payload: &Value) -> Option<RequestId> {
    payload
        .as_object()?
        .get("id")
        .and_then(RequestId::from_value)
}

fn check_envelope(payload: &Value) -> Result<ResolvedRequest, RpcError> {
    let object = match payload.as_object() {
        Some(object) if !object.is_empty() => object,
        _ => return Err(RpcError::invalid_request()),
    };

    if let Some(key) = object
        .keys()
        .find(|key| !ENVELOPE_KEYS.contains(&key.as_str()))
    {
        debug!(key = %key, "Rejecting request with unexpected member");
        return Err(RpcError::invalid_request());
    }

    match object.get("jsonrpc") {
        Some(version) if JsonRpcVersion::matches(version) => {}
        _ => return Err(RpcError::invalid_request()),
    }

    let method = match object.get("method").and_then(Value::as_str) {
        Some(method) if !method.is_empty() => method,
        _ => return Err(RpcError::invalid_request()),
    };

    let id = match object.get("id") {
        Some(raw) => Some(RequestId::from_value(raw).ok_or_else(RpcError::invalid_request)?),
        None => None,
    };

    // Only objects carry named params; any other shape binds as if no
    // names were supplied and the binder decides what is missing.
    let params = match object.get("params") {
        Some(Value::Object(map)) => map.clone(),
        Some(other) if !other.is_null() => {
            debug!(params = %other, "Params carry no named members");
            Params::new()
        }
        _ => Params::new(),
    };

    Ok(ResolvedRequest::new(method, id, params))
}

fn check_method<H>(method: &str, handler: &H) -> Result<(), RpcError>
where
    H: Capabilities + ?Sized,
{
    if method.starts_with(RESERVED_METHOD_PREFIX) {
        return Err(RpcError::method_not_found());
    }
    match handler.signature(method) {
        Some(signature) if signature.is_callable() => Ok(()),
        _ => {
            debug!(
                method = %method,
                available = ?handler.methods(),
                "No callable operation for method"
            );
            Err(RpcError::method_not_found())
        }
    }
}
