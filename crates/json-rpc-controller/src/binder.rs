//! Binding named request parameters onto an operation's positional arguments.

use std::borrow::Cow;

use serde_json::Value;
use tracing::debug;

use crate::{
    error::RpcError,
    request::{Params, ResolvedRequest},
    signature::OperationSignature,
};

/// Positional arguments, aligned with the operation's declared parameters
pub type ArgumentList = Vec<Value>;

/// Produce the argument list for `signature` from the request's params.
///
/// Arguments come out in declared order regardless of the order of keys in
/// the request. Values are passed through untouched.
pub fn bind(request: &ResolvedRequest, signature: &OperationSignature) -> Result<ArgumentList, RpcError> {
    let params = scoped_params(&request.params, signature);

    let mut args = Vec::with_capacity(signature.len());
    for param in signature.params() {
        if let Some(value) = params.get(&param.name) {
            args.push(value.clone());
        } else if let Some(default) = &param.default {
            args.push(default.clone());
        } else {
            debug!(
                method = %request.method,
                param = %param.name,
                "Missing required parameter"
            );
            return Err(RpcError::invalid_params(&param.name));
        }
    }
    Ok(args)
}

/// Params visible to the binder.
///
/// A single-parameter operation only ever sees the entry stored under its
/// parameter's name, so callers may wrap one complex argument as
/// `{"name": {...}}`. Multi-parameter operations see every top-level key.
fn scoped_params<'a>(params: &'a Params, signature: &OperationSignature) -> Cow<'a, Params> {
    match signature.params() {
        [only] => {
            let mut scoped = Params::new();
            if let Some(value) = params.get(&only.name) {
                scoped.insert(only.name.clone(), value.clone());
            }
            Cow::Owned(scoped)
        }
        _ => Cow::Borrowed(params),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;

    fn request(params: Value) -> ResolvedRequest {
        let params = match params {
            Value::Object(map) => map,
            _ => Params::new(),
        };
        ResolvedRequest::new("op", None, params)
    }

    #[test]
    fn test_single_param_binds_wrapped_value() {
        let signature = OperationSignature::default().param("p");
        let args = bind(&request(json!({"p": {"x": 1}})), &signature).unwrap();
        assert_eq!(args, vec![json!({"x": 1})]);
    }

    #[test]
    fn test_single_param_ignores_other_keys() {
        let signature = OperationSignature::default().param("p");
        let error = bind(&request(json!({"x": 1})), &signature).unwrap_err();
        assert_eq!(error.code, ErrorCode::InvalidParams);
    }

    #[test]
    fn test_single_param_falls_back_to_default() {
        let signature = OperationSignature::default().param_with_default("p", json!("dflt"));
        let args = bind(&request(json!({"q": 1})), &signature).unwrap();
        assert_eq!(args, vec![json!("dflt")]);
    }

    #[test]
    fn test_default_fills_missing_parameter() {
        let signature = OperationSignature::default()
            .param("a")
            .param_with_default("b", json!(10));

        assert_eq!(
            bind(&request(json!({"a": 5})), &signature).unwrap(),
            vec![json!(5), json!(10)]
        );

        let error = bind(&request(json!({})), &signature).unwrap_err();
        assert_eq!(error.code.code(), -32602);
        assert!(error.message.contains("'a'"));
    }

    #[test]
    fn test_output_follows_declared_order() {
        let signature = OperationSignature::default().param("a").param("b").param("c");
        let args = bind(&request(json!({"c": 3, "b": 2, "a": 1})), &signature).unwrap();
        assert_eq!(args, vec![json!(1), json!(2), json!(3)]);
    }

    #[test]
    fn test_reports_first_missing_parameter() {
        let signature = OperationSignature::default().param("a").param("b").param("c");
        let error = bind(&request(json!({"a": 1})), &signature).unwrap_err();
        assert!(error.message.contains("'b'"));
    }

    #[test]
    fn test_values_are_not_coerced() {
        let signature = OperationSignature::default().param("a").param("b");
        let args = bind(
            &request(json!({"a": "5", "b": [1, {"n": null}]})),
            &signature,
        )
        .unwrap();
        assert_eq!(args, vec![json!("5"), json!([1, {"n": null}])]);
    }

    #[test]
    fn test_supplied_null_is_not_replaced_by_default() {
        let signature = OperationSignature::default()
            .param("a")
            .param_with_default("b", json!(10));
        let args = bind(&request(json!({"a": 1, "b": null})), &signature).unwrap();
        assert_eq!(args, vec![json!(1), json!(null)]);
    }

    #[test]
    fn test_zero_parameter_operation() {
        let args = bind(&request(json!({"ignored": 1})), &OperationSignature::default()).unwrap();
        assert!(args.is_empty());
    }

    #[test]
    fn test_binding_is_repeatable() {
        let signature = OperationSignature::default()
            .param("a")
            .param_with_default("b", json!({"nested": [1]}));
        let req = request(json!({"a": 5}));

        let first = bind(&req, &signature).unwrap();
        let second = bind(&req, &signature).unwrap();
        assert_eq!(first, second);
        assert_eq!(signature.params()[1].default, Some(json!({"nested": [1]})));
    }
}
