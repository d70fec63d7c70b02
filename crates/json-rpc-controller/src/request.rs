use serde_json::{Map, Value};

use crate::types::RequestId;

/// Named parameters of a request
pub type Params = Map<String, Value>;

/// A request that passed envelope validation and names a callable operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRequest {
    pub method: String,
    /// `Some` exactly when the payload carried an `id` key.
    pub id: Option<RequestId>,
    pub params: Params,
}

impl ResolvedRequest {
    pub fn new(method: impl Into<String>, id: Option<RequestId>, params: Params) -> Self {
        Self {
            method: method.into(),
            id,
            params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_keeps_params_by_name() {
        let mut params = Params::new();
        params.insert("name".to_string(), json!("test"));
        params.insert("value".to_string(), json!(42));

        let request = ResolvedRequest::new("set_value", Some(RequestId::from("req1")), params);

        assert_eq!(request.method, "set_value");
        assert_eq!(request.params.get("value"), Some(&json!(42)));
        assert!(request.params.get("missing").is_none());
    }
}
