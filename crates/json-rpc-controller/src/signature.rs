//! Static metadata describing the callable surface of a handler.

use serde_json::Value;

/// One declared parameter of an operation
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDescriptor {
    pub name: String,
    /// Value used when the caller omits the parameter. A JSON `null` default
    /// is still a default.
    pub default: Option<Value>,
}

impl ParamDescriptor {
    /// A parameter the caller must supply
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }

    pub fn optional(name: impl Into<String>, default: Value) -> Self {
        Self {
            name: name.into(),
            default: Some(default),
        }
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

/// Whether callers may reach an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    /// Registered on the handler but never dispatched to
    Internal,
}

/// Ordered parameter list of an operation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OperationSignature {
    params: Vec<ParamDescriptor>,
    visibility: Visibility,
}

impl OperationSignature {
    pub fn new(params: Vec<ParamDescriptor>) -> Self {
        Self {
            params,
            visibility: Visibility::Public,
        }
    }

    pub fn internal(mut self) -> Self {
        self.visibility = Visibility::Internal;
        self
    }

    /// Append a required parameter
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(ParamDescriptor::required(name));
        self
    }

    /// Append a parameter with a default value
    pub fn param_with_default(mut self, name: impl Into<String>, default: Value) -> Self {
        self.params.push(ParamDescriptor::optional(name, default));
        self
    }

    pub fn params(&self) -> &[ParamDescriptor] {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn is_callable(&self) -> bool {
        self.visibility == Visibility::Public
    }
}

impl From<Vec<ParamDescriptor>> for OperationSignature {
    fn from(params: Vec<ParamDescriptor>) -> Self {
        Self::new(params)
    }
}

/// The introspectable surface of a handler: which operations exist and what
/// they declare. Shared by sync and async handlers.
pub trait Capabilities {
    /// Signature of the named operation, `None` when no such operation exists.
    fn signature(&self, method: &str) -> Option<&OperationSignature>;

    /// Operation names, logged when a request names an unknown method
    fn methods(&self) -> Vec<String> {
        vec![]
    }
}
