use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ErrorObject;
use crate::types::{JsonRpcVersion, RequestId};

/// Either the operation's result or the error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Result(Value),
    Error(ErrorObject),
}

/// The single envelope emitted for every request.
///
/// `id` is omitted entirely when the request had none; a request id of
/// `null` is echoed as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "jsonrpc")]
    pub version: JsonRpcVersion,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_id"
    )]
    pub id: Option<RequestId>,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl Response {
    pub fn success(id: Option<RequestId>, result: Value) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            id,
            outcome: Outcome::Result(result),
        }
    }

    pub fn error(id: Option<RequestId>, error: ErrorObject) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            id,
            outcome: Outcome::Error(error),
        }
    }

    /// Check if this is an error response
    pub fn is_error(&self) -> bool {
        matches!(self.outcome, Outcome::Error(_))
    }

    pub fn id(&self) -> Option<&RequestId> {
        self.id.as_ref()
    }

    pub fn result(&self) -> Option<&Value> {
        match &self.outcome {
            Outcome::Result(value) => Some(value),
            Outcome::Error(_) => None,
        }
    }

    pub fn error_object(&self) -> Option<&ErrorObject> {
        match &self.outcome {
            Outcome::Error(error) => Some(error),
            Outcome::Result(_) => None,
        }
    }
}

// A present `"id": null` must stay distinguishable from a missing id.
fn present_id<'de, D>(deserializer: D) -> Result<Option<RequestId>, D::Error>
where
    D: Deserializer<'de>,
{
    RequestId::deserialize(deserializer).map(Some)
}
