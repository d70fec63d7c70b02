//! Registration-table handlers built from closures.

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

use crate::{
    binder::ArgumentList,
    controller::Operations,
    error::{RpcError, ToRpcError},
    signature::{Capabilities, OperationSignature},
};

/// Failure of a table-backed handler
#[derive(Debug, Error)]
pub enum TableError<E> {
    #[error("no operation registered as '{0}'")]
    UnknownMethod(String),
    #[error(transparent)]
    Operation(E),
}

impl<E: ToRpcError> ToRpcError for TableError<E> {
    fn to_rpc_error(&self) -> Option<RpcError> {
        match self {
            TableError::UnknownMethod(_) => Some(RpcError::method_not_found()),
            TableError::Operation(e) => e.to_rpc_error(),
        }
    }

    fn error_code(&self) -> i64 {
        match self {
            TableError::UnknownMethod(_) => RpcError::method_not_found().code.code(),
            TableError::Operation(e) => e.error_code(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            TableError::UnknownMethod(_) => std::any::type_name::<Self>(),
            TableError::Operation(e) => e.kind(),
        }
    }
}

type MethodFn<E> = Box<dyn Fn(ArgumentList) -> Result<Value, E> + Send + Sync>;

struct Method<E> {
    signature: OperationSignature,
    call: MethodFn<E>,
}

/// Handler whose operations are registered with explicit signatures.
///
/// ```rust
/// use json_rpc_controller::{Controller, MethodTable, OperationSignature, RpcError};
/// use serde_json::json;
///
/// let table = MethodTable::<RpcError>::new().method(
///     "add",
///     OperationSignature::default().param("a").param("b"),
///     |args| Ok(json!(args[0].as_i64().unwrap_or(0) + args[1].as_i64().unwrap_or(0))),
/// );
/// let response = Controller::new(table)
///     .dispatch(&json!({"jsonrpc": "2.0", "id": 1, "method": "add", "params": {"a": 2, "b": 3}}));
/// assert_eq!(response.result(), Some(&json!(5)));
/// ```
pub struct MethodTable<E> {
    methods: HashMap<String, Method<E>>,
}

impl<E> MethodTable<E>
where
    E: ToRpcError,
{
    pub fn new() -> Self {
        Self {
            methods: HashMap::new(),
        }
    }

    /// Register an operation, replacing any previous one with the same name
    pub fn register<F>(&mut self, name: impl Into<String>, signature: OperationSignature, call: F)
    where
        F: Fn(ArgumentList) -> Result<Value, E> + Send + Sync + 'static,
    {
        self.methods.insert(
            name.into(),
            Method {
                signature,
                call: Box::new(call),
            },
        );
    }

    pub fn method<F>(mut self, name: impl Into<String>, signature: OperationSignature, call: F) -> Self
    where
        F: Fn(ArgumentList) -> Result<Value, E> + Send + Sync + 'static,
    {
        self.register(name, signature, call);
        self
    }
}

impl<E> Default for MethodTable<E>
where
    E: ToRpcError,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Capabilities for MethodTable<E> {
    fn signature(&self, method: &str) -> Option<&OperationSignature> {
        self.methods.get(method).map(|m| &m.signature)
    }

    fn methods(&self) -> Vec<String> {
        let mut names: Vec<_> = self.methods.keys().cloned().collect();
        names.sort();
        names
    }
}

impl<E> Operations for MethodTable<E>
where
    E: ToRpcError,
{
    type Error = TableError<E>;

    fn invoke(&self, method: &str, args: ArgumentList) -> Result<Value, Self::Error> {
        let entry = self
            .methods
            .get(method)
            .ok_or_else(|| TableError::UnknownMethod(method.to_string()))?;
        (entry.call)(args).map_err(TableError::Operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Controller;
    use crate::error::{Cause, ErrorCode};
    use serde_json::json;

    #[derive(Debug, Error)]
    #[error("storage offline")]
    struct Offline;

    impl ToRpcError for Offline {
        fn error_code(&self) -> i64 {
            503
        }
    }

    fn table() -> MethodTable<Offline> {
        MethodTable::new()
            .method(
                "echo",
                OperationSignature::default().param("value"),
                |args| Ok(args.into_iter().next().unwrap_or(Value::Null)),
            )
            .method(
                "load",
                OperationSignature::default().param_with_default("key", json!("k")),
                |_| Err(Offline),
            )
            .method("hidden", OperationSignature::default().internal(), |_| {
                Ok(json!("secret"))
            })
    }

    #[test]
    fn test_lists_registered_methods() {
        assert_eq!(table().methods(), vec!["echo", "hidden", "load"]);
    }

    #[test]
    fn test_invoke_registered_operation() {
        let result = table().invoke("echo", vec![json!({"x": 1})]).unwrap();
        assert_eq!(result, json!({"x": 1}));
    }

    #[test]
    fn test_invoke_unknown_maps_to_method_not_found() {
        let error = table().invoke("missing", vec![]).unwrap_err();
        assert_eq!(error.to_rpc_error().map(|e| e.code), Some(ErrorCode::MethodNotFound));
    }

    #[test]
    fn test_operation_error_keeps_its_identity() {
        let error = table().invoke("load", vec![json!("k")]).unwrap_err();
        let cause = Cause::capture(&error);
        assert!(cause.kind.ends_with("Offline"));
        assert_eq!(cause.code, 503);
        assert_eq!(cause.message, "storage offline");
    }

    #[test]
    fn test_internal_operation_is_not_dispatched() {
        let response =
            Controller::new(table()).dispatch(&json!({"jsonrpc": "2.0", "id": 1, "method": "hidden"}));
        assert_eq!(response.error_object().map(|e| e.code), Some(-32601));
    }
}
