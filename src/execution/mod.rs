//! Execution stage
//!
//! The pipeline hands a parsed (and usually validated) document to an
//! [`Executor`] together with everything the request carried. The default
//! [`DefaultExecutor`] resolves fields against the [`Schema`]'s resolvers:
//! query fields concurrently, mutation root fields one at a time.

pub mod context;
mod executor;
mod values;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};

use crate::error::GraphQLError;
use crate::language::Document;
use crate::response::QueryResult;
use crate::schema::Schema;

pub use context::{ContextError, ExecutionContext};
pub use executor::{execute, DefaultExecutor};


/// Observer called synchronously for each error the executor records.
/// It cannot change the result.
pub type ErrorHandler = Arc<dyn Fn(&GraphQLError) + Send + Sync>;

/// Everything an executor needs for one request
#[derive(Clone)]
pub struct ExecuteParams {
    pub schema: Schema,
    pub document: Arc<Document>,
    pub root_value: Map<String, JsonValue>,
    pub variables: Map<String, JsonValue>,
    pub operation_name: Option<String>,
    pub context: ExecutionContext,
    pub error_handler: Option<ErrorHandler>,
}

impl ExecuteParams {
    pub fn new(schema: Schema, document: Arc<Document>) -> Self {
        Self {
            schema,
            document,
            root_value: Map::new(),
            variables: Map::new(),
            operation_name: None,
            context: ExecutionContext::default(),
            error_handler: None,
        }
    }
}

impl std::fmt::Debug for ExecuteParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecuteParams")
            .field("schema", &self.schema)
            .field("operation_name", &self.operation_name)
            .field("variables", &self.variables)
            .field("context", &self.context)
            .field("has_error_handler", &self.error_handler.is_some())
            .finish()
    }
}

/// Executor collaborator consumed by the pipeline
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, params: ExecuteParams) -> QueryResult;
}
