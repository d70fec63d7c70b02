//! Async handlers. Resolution and binding are unchanged; only invocation
//! is awaited.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;
use tracing::{debug, error};

use crate::{
    binder::ArgumentList,
    controller::Controller,
    error::{Cause, RpcError, ToRpcError},
    resolver,
    response::Response,
    signature::{Capabilities, OperationSignature},
    table::TableError,
};

/// A handler whose operations are invoked asynchronously
#[async_trait]
pub trait AsyncOperations: Capabilities + Send + Sync {
    /// The error type returned by this handler's operations
    type Error: ToRpcError;

    /// Invoke an operation that [`Capabilities::signature`] reported as callable
    async fn invoke(&self, method: &str, args: ArgumentList) -> Result<Value, Self::Error>;
}

impl<H> Controller<H>
where
    H: AsyncOperations,
{
    /// Async counterpart of [`Controller::dispatch`]
    pub async fn dispatch_async(&self, payload: &Value) -> Response {
        let id = resolver::request_id(payload);
        let outcome = match self.prepare(payload) {
            Ok((request, args)) => self.invoke_async(&request.method, args).await,
            Err(error) => Err(error),
        };
        self.respond(id, outcome)
    }

    async fn invoke_async(&self, method: &str, args: ArgumentList) -> Result<Value, RpcError> {
        debug!(method = %method, args = args.len(), "Invoking async operation");
        let call = AssertUnwindSafe(self.handler().invoke(method, args)).catch_unwind();
        match call.await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(failure)) => Err(RpcError::classify(&failure)),
            Err(payload) => {
                let cause = Cause::from_panic(payload.as_ref());
                error!(method = %method, message = %cause.message, "Async operation panicked");
                Err(RpcError::internal_error(cause))
            }
        }
    }
}

type AsyncMethodFn<E> = Box<dyn Fn(ArgumentList) -> BoxFuture<'static, Result<Value, E>> + Send + Sync>;

struct AsyncMethod<E> {
    signature: OperationSignature,
    call: AsyncMethodFn<E>,
}

/// Registration table of async operations
pub struct AsyncMethodTable<E> {
    methods: HashMap<String, AsyncMethod<E>>,
}

impl<E> AsyncMethodTable<E>
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
        F: Fn(ArgumentList) -> BoxFuture<'static, Result<Value, E>> + Send + Sync + 'static,
    {
        self.methods.insert(
            name.into(),
            AsyncMethod {
                signature,
                call: Box::new(call),
            },
        );
    }

    pub fn method<F>(mut self, name: impl Into<String>, signature: OperationSignature, call: F) -> Self
    where
        F: Fn(ArgumentList) -> BoxFuture<'static, Result<Value, E>> + Send + Sync + 'static,
    {
        self.register(name, signature, call);
        self
    }
}

impl<E> Default for AsyncMethodTable<E>
where
    E: ToRpcError,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Capabilities for AsyncMethodTable<E> {
    fn signature(&self, method: &str) -> Option<&OperationSignature> {
        self.methods.get(method).map(|m| &m.signature)
    }

    fn methods(&self) -> Vec<String> {
        let mut names: Vec<_> = self.methods.keys().cloned().collect();
        names.sort();
        names
    }
}

#[async_trait]
impl<E> AsyncOperations for AsyncMethodTable<E>
where
    E: ToRpcError,
{
    type Error = TableError<E>;

    async fn invoke(&self, method: &str, args: ArgumentList) -> Result<Value, Self::Error> {
        let entry = self
            .methods
            .get(method)
            .ok_or_else(|| TableError::UnknownMethod(method.to_string()))?;
        (entry.call)(args).await.map_err(TableError::Operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ControllerConfig, DebugMode};
    use serde_json::{json, to_value};

    #[derive(Debug, thiserror::Error)]
    #[error("upstream timed out")]
    struct Timeout;

    impl ToRpcError for Timeout {}

    fn table() -> AsyncMethodTable<Timeout> {
        AsyncMethodTable::<Timeout>::new()
            .method(
                "add",
                OperationSignature::default().param("a").param_with_default("b", json!(10)),
                |args| {
                    async move {
                        let a = args[0].as_i64().unwrap_or_default();
                        let b = args[1].as_i64().unwrap_or_default();
                        Ok(json!(a + b))
                    }
                    .boxed()
                },
            )
            .method("fetch", OperationSignature::default(), |_| {
                async { Err(Timeout) }.boxed()
            })
            .method("crash", OperationSignature::default(), |args| {
                async move {
                    if args.is_empty() {
                        panic!("async kaboom");
                    }
                    Ok(Value::Null)
                }
                .boxed()
            })
    }

    #[tokio::test]
    async fn test_async_dispatch_success() {
        let controller = Controller::new(table());
        let response = controller
            .dispatch_async(&json!({"jsonrpc": "2.0", "id": 1, "method": "add", "params": {"a": 5}}))
            .await;
        assert_eq!(
            to_value(&response).unwrap(),
            json!({"jsonrpc": "2.0", "id": 1, "result": 15})
        );
    }

    #[tokio::test]
    async fn test_async_binding_failure() {
        let controller = Controller::new(table());
        let response = controller
            .dispatch_async(&json!({"jsonrpc": "2.0", "id": 1, "method": "add", "params": {}}))
            .await;
        assert_eq!(response.error_object().map(|e| e.code), Some(-32602));
    }

    #[tokio::test]
    async fn test_async_failure_demoted() {
        let config = ControllerConfig::new().with_debug(DebugMode::Enabled);
        let controller = Controller::with_config(table(), config);
        let response = controller
            .dispatch_async(&json!({"jsonrpc": "2.0", "method": "fetch"}))
            .await;

        let error = response.error_object().unwrap();
        assert_eq!(error.code, -32603);
        assert_eq!(error.data.as_ref().unwrap()["previousException"]["message"], "upstream timed out");
        assert!(response.id().is_none());
    }

    #[tokio::test]
    async fn test_async_panic_contained() {
        let controller = Controller::new(table());
        let response = controller
            .dispatch_async(&json!({"jsonrpc": "2.0", "id": 9, "method": "crash"}))
            .await;
        assert_eq!(
            to_value(&response).unwrap(),
            json!({"jsonrpc": "2.0", "id": 9, "error": {"code": -32603, "message": "Internal error"}})
        );
    }
}
