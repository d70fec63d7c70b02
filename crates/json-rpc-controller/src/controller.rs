//! The request pipeline: resolve, bind, invoke, respond.

use std::panic::{self, AssertUnwindSafe};

use serde_json::Value;
use tracing::{debug, error};

use crate::{
    binder::{self, ArgumentList},
    config::ControllerConfig,
    error::{Cause, RpcError, ToRpcError},
    request::ResolvedRequest,
    resolver,
    response::Response,
    signature::Capabilities,
    types::RequestId,
};

/// A handler whose operations can be invoked synchronously
pub trait Operations: Capabilities + Send + Sync {
    /// The error type returned by this handler's operations
    type Error: ToRpcError;

    /// Invoke an operation that [`Capabilities::signature`] reported as callable,
    /// with arguments in declared order.
    fn invoke(&self, method: &str, args: ArgumentList) -> Result<Value, Self::Error>;
}

/// Dispatches single JSON-RPC requests to a handler.
///
/// Holds no per-request state; one controller can serve any number of
/// requests, concurrently if the handler allows it.
pub struct Controller<H> {
    handler: H,
    config: ControllerConfig,
}

impl<H> Controller<H> {
    pub fn new(handler: H) -> Self {
        Self::with_config(handler, ControllerConfig::default())
    }

    pub fn with_config(handler: H, config: ControllerConfig) -> Self {
        Self { handler, config }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Build the error envelope for `error`, consulting the debug mode once.
    pub fn error_response(&self, id: Option<RequestId>, error: &RpcError) -> Response {
        let debug_on = self.config.debug_enabled();
        debug!(
            code = error.code.code(),
            message = %error.message,
            debug = debug_on,
            "Emitting JSON-RPC error"
        );
        Response::error(id, error.to_error_object(debug_on))
    }

    pub(crate) fn respond(&self, id: Option<RequestId>, outcome: Result<Value, RpcError>) -> Response {
        match outcome {
            Ok(result) => Response::success(id, result),
            Err(error) => self.error_response(id, &error),
        }
    }
}

impl<H> Controller<H>
where
    H: Capabilities,
{
    /// Resolve the payload and bind its arguments, stopping at the first failure.
    pub fn prepare(&self, payload: &Value) -> Result<(ResolvedRequest, ArgumentList), RpcError> {
        let request = resolver::resolve(payload, &self.handler)?;
        let signature = self
            .handler
            .signature(&request.method)
            .ok_or_else(RpcError::method_not_found)?;
        let args = binder::bind(&request, signature)?;
        Ok((request, args))
    }
}

impl<H> Controller<H>
where
    H: Operations,
{
    /// Run one decoded payload through the pipeline.
    ///
    /// Always yields exactly one envelope. The response echoes the request id
    /// whenever the payload carried a usable one, including on errors.
    pub fn dispatch(&self, payload: &Value) -> Response {
        let id = resolver::request_id(payload);
        let outcome = self
            .prepare(payload)
            .and_then(|(request, args)| self.invoke(&request.method, args));
        self.respond(id, outcome)
    }

    fn invoke(&self, method: &str, args: ArgumentList) -> Result<Value, RpcError> {
        debug!(method = %method, args = args.len(), "Invoking operation");
        match panic::catch_unwind(AssertUnwindSafe(|| self.handler.invoke(method, args))) {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(failure)) => Err(RpcError::classify(&failure)),
            Err(payload) => {
                let cause = Cause::from_panic(payload.as_ref());
                error!(method = %method, message = %cause.message, "Operation panicked");
                Err(RpcError::internal_error(cause))
            }
        }
    }
}
