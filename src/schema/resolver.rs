//! Resolver plumbing: the function type attached to fields and its inputs

use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use crate::error::PathSegment;
use crate::execution::{ContextError, ExecutionContext};

pub type ResolverFuture = BoxFuture<'static, Result<JsonValue, FieldError>>;

/// Computes a field's value. Invoked only by the executor.
pub type Resolver = Arc<dyn Fn(ResolveParams) -> ResolverFuture + Send + Sync>;

/// Everything a resolver gets to see about the field being resolved
#[derive(Debug, Clone)]
pub struct ResolveParams {
    /// The value of the parent object (the root value for top-level fields)
    pub source: JsonValue,
    /// Coerced argument values, defaults applied
    pub args: Map<String, JsonValue>,
    pub field_name: String,
    pub parent_type: String,
    pub path: Vec<PathSegment>,
    pub context: ExecutionContext,
}

impl ResolveParams {
    pub fn arg(&self, name: &str) -> Option<&JsonValue> {
        self.args.get(name).filter(|value| !value.is_null())
    }

    pub fn arg_str(&self, name: &str) -> Option<&str> {
        self.arg(name).and_then(JsonValue::as_str)
    }

    pub fn arg_i64(&self, name: &str) -> Option<i64> {
        self.arg(name).and_then(JsonValue::as_i64)
    }
}

/// A resolver failure, reported with the field's path and locations
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct FieldError {
    pub message: String,
    pub extensions: Map<String, JsonValue>,
}

impl FieldError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            extensions: Map::new(),
        }
    }

    pub fn extension(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.extensions.insert(key.into(), value);
        self
    }
}

impl From<ContextError> for FieldError {
    fn from(err: ContextError) -> Self {
        FieldError::new(err.to_string())
    }
}

impl From<anyhow::Error> for FieldError {
    fn from(err: anyhow::Error) -> Self {
        FieldError::new(format!("{:#}", err))
    }
}

impl From<String> for FieldError {
    fn from(message: String) -> Self {
        FieldError::new(message)
    }
}

impl From<&str> for FieldError {
    fn from(message: &str) -> Self {
        FieldError::new(message)
    }
}
