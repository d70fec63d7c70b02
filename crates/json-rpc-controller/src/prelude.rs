//! # JSON-RPC Controller Prelude
//!
//! Convenient re-exports of the types needed to write a handler and run the
//! pipeline.
//!
//! ```rust
//! use json_rpc_controller::prelude::*;
//! ```

pub use crate::binder::ArgumentList;
pub use crate::config::{ControllerConfig, DebugMode};
pub use crate::controller::{Controller, Operations};
pub use crate::error::{ErrorCode, RpcError, ToRpcError};
pub use crate::response::Response;
pub use crate::signature::{Capabilities, OperationSignature, ParamDescriptor};
pub use crate::table::MethodTable;
pub use crate::types::RequestId;

#[cfg(feature = "async")]
pub use crate::r#async::{AsyncMethodTable, AsyncOperations};

// Standard error codes
pub use crate::error_codes::*;
