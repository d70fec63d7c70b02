//! # JSON-RPC 2.0 Controller
//!
//! Dispatches a single JSON-RPC 2.0 request to a handler and turns the outcome
//! into exactly one response envelope. Transport agnostic: the crate works on
//! decoded JSON values (or raw bodies via [`transport`]) and never reads
//! sockets or sets headers.
//!
//! ## Pipeline
//! 1. [`resolver`] validates the envelope and checks that the method names a
//!    callable operation.
//! 2. [`binder`] maps named params onto the operation's declared parameters.
//! 3. The handler's operation is invoked with positional arguments.
//! 4. Failures are mapped onto the JSON-RPC error taxonomy; unclassified ones
//!    become internal errors whose cause is disclosed only in debug mode.
//!
//! ## Features
//! - `async` (default): async handlers and [`Controller::dispatch_async`]

pub mod binder;
pub mod config;
pub mod controller;
pub mod error;
pub mod prelude;
pub mod request;
pub mod resolver;
pub mod response;
pub mod signature;
pub mod table;
pub mod transport;
pub mod types;

#[cfg(feature = "async")]
pub mod r#async;

// Re-export main types
pub use binder::ArgumentList;
pub use config::{ControllerConfig, DebugMode};
pub use controller::{Controller, Operations};
pub use error::{Cause, ErrorCode, ErrorObject, RpcError, ToRpcError};
pub use request::{Params, ResolvedRequest};
pub use response::{Outcome, Response};
pub use signature::{Capabilities, OperationSignature, ParamDescriptor, Visibility};
pub use table::{MethodTable, TableError};
pub use types::{JsonRpcVersion, RequestId};

#[cfg(feature = "async")]
pub use r#async::{AsyncMethodTable, AsyncOperations};

/// JSON-RPC 2.0 version constant
pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC error codes
pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;

    /// Application-defined; available to handlers, never raised by the controller
    pub const INTEGRITY_ERROR: i64 = -32020;
}
