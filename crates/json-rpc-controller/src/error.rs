use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::any::Any;
use std::fmt;
use std::panic::Location;
use thiserror::Error;
use tracing::warn;

use crate::error_codes;

/// JSON-RPC error codes understood by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    /// Reserved for handlers; the controller never raises it itself.
    IntegrityError,
    /// Any other handler-defined code, passed through unchanged.
    Custom(i64),
}

impl ErrorCode {
    pub fn code(&self) -> i64 {
        match self {
            ErrorCode::ParseError => error_codes::PARSE_ERROR,
            ErrorCode::InvalidRequest => error_codes::INVALID_REQUEST,
            ErrorCode::MethodNotFound => error_codes::METHOD_NOT_FOUND,
            ErrorCode::InvalidParams => error_codes::INVALID_PARAMS,
            ErrorCode::InternalError => error_codes::INTERNAL_ERROR,
            ErrorCode::IntegrityError => error_codes::INTEGRITY_ERROR,
            ErrorCode::Custom(code) => *code,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::ParseError => "Parse error",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::MethodNotFound => "Method not found",
            ErrorCode::InvalidParams => "Invalid request params",
            ErrorCode::InternalError => "Internal error",
            ErrorCode::IntegrityError => "Integrity error",
            ErrorCode::Custom(_) => "Server error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Diagnostic record of a failure that was demoted to an internal error.
///
/// Only ever disclosed to callers in the `data` member of an error object
/// while debug mode is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cause {
    /// Type name of the original failure, or `panic`
    #[serde(rename = "class")]
    pub kind: String,
    pub code: i64,
    pub message: String,
    pub file: &'static str,
    pub line: u32,
}

impl Cause {
    #[track_caller]
    pub fn new(kind: impl Into<String>, code: i64, message: impl Into<String>) -> Self {
        let location = Location::caller();
        Self {
            kind: kind.into(),
            code,
            message: message.into(),
            file: location.file(),
            line: location.line(),
        }
    }

    /// Capture a handler failure, recording where it crossed into the controller.
    #[track_caller]
    pub fn capture<E: ToRpcError>(error: &E) -> Self {
        Self::new(error.kind(), error.error_code(), error.to_string())
    }

    /// Capture the payload of a caught panic.
    #[track_caller]
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::new("panic", 0, message)
    }
}

/// JSON-RPC Error object as sent on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A failure of any pipeline stage, tagged with its taxonomy code.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message} ({code})")]
pub struct RpcError {
    pub code: ErrorCode,
    pub message: String,
    pub cause: Option<Cause>,
}

impl RpcError {
    pub fn new(code: ErrorCode, message: Option<String>) -> Self {
        Self {
            message: message.unwrap_or_else(|| code.message().to_string()),
            code,
            cause: None,
        }
    }

    pub fn parse_error() -> Self {
        Self::new(ErrorCode::ParseError, None)
    }

    pub fn invalid_request() -> Self {
        Self::new(ErrorCode::InvalidRequest, None)
    }

    pub fn method_not_found() -> Self {
        Self::new(ErrorCode::MethodNotFound, None)
    }

    /// Missing parameter with no declared default
    pub fn invalid_params(param: &str) -> Self {
        Self::new(
            ErrorCode::InvalidParams,
            Some(format!("{}: missing '{}'", ErrorCode::InvalidParams.message(), param)),
        )
    }

    pub fn internal_error(cause: Cause) -> Self {
        Self::new(ErrorCode::InternalError, None).with_cause(cause)
    }

    pub fn integrity_error(message: &str) -> Self {
        Self::new(ErrorCode::IntegrityError, Some(message.to_string()))
    }

    pub fn with_cause(mut self, cause: Cause) -> Self {
        self.cause = Some(cause);
        self
    }

    /// Map a handler failure onto the taxonomy.
    ///
    /// Classified failures pass through unchanged; anything else becomes an
    /// internal error that keeps the original failure as its cause.
    #[track_caller]
    pub fn classify<E: ToRpcError>(error: &E) -> Self {
        match error.to_rpc_error() {
            Some(classified) => classified,
            None => {
                let cause = Cause::capture(error);
                warn!(
                    kind = %cause.kind,
                    message = %cause.message,
                    "Demoting unclassified failure to internal error"
                );
                Self::internal_error(cause)
            }
        }
    }

    /// Wire representation; `data` is attached only in debug mode and only
    /// when there is a cause to disclose.
    pub fn to_error_object(&self, debug: bool) -> ErrorObject {
        let data = match (&self.cause, debug) {
            (Some(cause), true) => Some(json!({ "previousException": cause })),
            _ => None,
        };
        ErrorObject {
            code: self.code.code(),
            message: self.message.clone(),
            data,
        }
    }
}

/// Trait for handler errors that can be mapped onto JSON-RPC errors
pub trait ToRpcError: std::error::Error + Send + Sync + 'static {
    /// The classified JSON-RPC error for this failure, if it has one.
    /// Unclassified failures are reported as internal errors.
    fn to_rpc_error(&self) -> Option<RpcError> {
        None
    }

    /// Numeric code recorded in the diagnostic cause
    fn error_code(&self) -> i64 {
        0
    }

    /// Classification name recorded in the diagnostic cause
    fn kind(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl ToRpcError for RpcError {
    fn to_rpc_error(&self) -> Option<RpcError> {
        Some(self.clone())
    }

    fn error_code(&self) -> i64 {
        self.code.code()
    }
}

impl ToRpcError for serde_json::Error {}

impl ToRpcError for std::convert::Infallible {}
