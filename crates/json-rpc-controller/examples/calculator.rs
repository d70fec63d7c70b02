//! Calculator JSON-RPC Example
//!
//! Registers a few arithmetic operations with explicit signatures and runs a
//! series of raw request bodies through the controller, sync and async.
//!
//! Run with `ENVIRONMENT=development RUST_LOG=debug` to see diagnostic `data`
//! on internal errors and the pipeline's tracing output.

use futures::FutureExt;
use json_rpc_controller::{
    AsyncMethodTable, Controller, ControllerConfig, MethodTable, OperationSignature, RpcError,
    ToRpcError, transport,
};
use serde_json::{Value, json};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
enum CalculatorError {
    #[error("operand '{0}' is not a number")]
    NotANumber(&'static str),
    #[error("division by zero")]
    DivisionByZero,
    #[error("running total would overflow")]
    Overflow,
}

impl ToRpcError for CalculatorError {
    fn to_rpc_error(&self) -> Option<RpcError> {
        match self {
            CalculatorError::Overflow => Some(RpcError::integrity_error("Running total would overflow")),
            // Everything else is reported as an internal error
            _ => None,
        }
    }
}

fn operand(args: &[Value], index: usize, name: &'static str) -> Result<f64, CalculatorError> {
    args.get(index)
        .and_then(Value::as_f64)
        .ok_or(CalculatorError::NotANumber(name))
}

fn calculator() -> MethodTable<CalculatorError> {
    let pair = || OperationSignature::default().param("a").param("b");

    MethodTable::new()
        .method("add", pair(), |args| {
            Ok(json!(operand(&args, 0, "a")? + operand(&args, 1, "b")?))
        })
        .method("subtract", pair(), |args| {
            Ok(json!(operand(&args, 0, "a")? - operand(&args, 1, "b")?))
        })
        .method("divide", pair(), |args| {
            let b = operand(&args, 1, "b")?;
            if b == 0.0 {
                return Err(CalculatorError::DivisionByZero);
            }
            Ok(json!(operand(&args, 0, "a")? / b))
        })
        .method(
            "scale",
            OperationSignature::default()
                .param("value")
                .param_with_default("factor", json!(10)),
            |args| {
                let product = operand(&args, 0, "value")? * operand(&args, 1, "factor")?;
                if !product.is_finite() {
                    return Err(CalculatorError::Overflow);
                }
                Ok(json!(product))
            },
        )
        .method(
            "sum",
            OperationSignature::default().param("numbers"),
            |args| {
                let numbers = args[0].as_array().cloned().unwrap_or_default();
                Ok(json!(numbers.iter().filter_map(Value::as_f64).sum::<f64>()))
            },
        )
}

fn async_calculator() -> AsyncMethodTable<CalculatorError> {
    AsyncMethodTable::new().method(
        "slow_add",
        OperationSignature::default().param("a").param("b"),
        |args| {
            async move {
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                Ok(json!(operand(&args, 0, "a")? + operand(&args, 1, "b")?))
            }
            .boxed()
        },
    )
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("Calculator JSON-RPC Controller Example");
    println!("======================================");

    let controller = Controller::with_config(calculator(), ControllerConfig::from_env());

    let requests = [
        r#"{"jsonrpc": "2.0", "method": "add", "params": {"a": 5, "b": 3}, "id": 1}"#,
        r#"{"jsonrpc": "2.0", "method": "subtract", "params": {"b": 4, "a": 10}, "id": 2}"#,
        r#"{"jsonrpc": "2.0", "method": "scale", "params": {"value": 4}, "id": 3}"#,
        r#"{"jsonrpc": "2.0", "method": "sum", "params": {"numbers": [1, 2, 3.5]}, "id": 4}"#,
        r#"{"jsonrpc": "2.0", "method": "scale", "params": {"value": 1e308}, "id": 5}"#, // Integrity error
        r#"{"jsonrpc": "2.0", "method": "divide", "params": {"a": 1, "b": 0}, "id": 6}"#, // Internal error
        r#"{"jsonrpc": "2.0", "method": "multiply", "params": {"a": 2, "b": 3}, "id": 7}"#, // Method not found
        r#"{"jsonrpc": "2.0", "method": "add", "params": {"a": 2}, "id": 8}"#, // Invalid params
        r#"{"jsonrpc": "1.0", "method": "add"}"#, // Invalid request
        r#"{"jsonrpc": "2.0", "method": "add""#, // Parse error
    ];

    for (i, body) in requests.iter().enumerate() {
        println!("\n--- Request {} ---", i + 1);
        println!("-> {}", body);
        println!("<- {}", transport::handle_body(&controller, body));
    }

    let async_controller = Controller::with_config(async_calculator(), ControllerConfig::from_env());
    let body = r#"{"jsonrpc": "2.0", "method": "slow_add", "params": {"a": 20, "b": 22}, "id": "async-1"}"#;
    println!("\n--- Async request ---");
    println!("-> {}", body);
    println!("<- {}", transport::handle_body_async(&async_controller, body).await);

    println!("\nResponse headers for transports:");
    for (name, value) in transport::RESPONSE_HEADERS {
        println!("  {}: {}", name, value);
    }
}
