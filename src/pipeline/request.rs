use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};

use crate::error::GraphQLError;
use crate::execution::{ErrorHandler, ExecutionContext};
use crate::schema::Schema;
use crate::validation::{RuleRef, ValidationRule};

/// One GraphQL request, immutable once built
#[derive(Clone)]
pub struct Request {
    pub schema: Schema,
    pub text: String,
    pub root_value: Map<String, JsonValue>,
    pub variables: Map<String, JsonValue>,
    pub operation_name: Option<String>,
    pub context: ExecutionContext,
    pub skip_validation: bool,
    /// Run after the pipeline's built-in rules
    pub custom_rules: Vec<RuleRef>,
    pub error_handler: Option<ErrorHandler>,
}

impl Request {
    pub fn builder(schema: Schema, text: impl Into<String>) -> RequestBuilder {
        RequestBuilder {
            request: Request {
                schema,
                text: text.into(),
                root_value: Map::new(),
                variables: Map::new(),
                operation_name: None,
                context: ExecutionContext::default(),
                skip_validation: false,
                custom_rules: Vec::new(),
                error_handler: None,
            },
        }
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("schema", &self.schema)
            .field("text", &self.text)
            .field("variables", &self.variables)
            .field("operation_name", &self.operation_name)
            .field("skip_validation", &self.skip_validation)
            .field("custom_rules", &self.custom_rules.len())
            .field("has_error_handler", &self.error_handler.is_some())
            .finish()
    }
}

/// Builder for [`Request`]
pub struct RequestBuilder {
    request: Request,
}

impl RequestBuilder {
    pub fn root_value(mut self, root_value: Map<String, JsonValue>) -> Self {
        self.request.root_value = root_value;
        self
    }

    pub fn variables(mut self, variables: Map<String, JsonValue>) -> Self {
        self.request.variables = variables;
        self
    }

    pub fn variable(mut self, name: impl Into<String>, value: JsonValue) -> Self {
        self.request.variables.insert(name.into(), value);
        self
    }

    pub fn operation_name(mut self, name: impl Into<String>) -> Self {
        self.request.operation_name = Some(name.into());
        self
    }

    pub fn context(mut self, context: ExecutionContext) -> Self {
        self.request.context = context;
        self
    }

    pub fn skip_validation(mut self, skip: bool) -> Self {
        self.request.skip_validation = skip;
        self
    }

    pub fn rule(mut self, rule: impl ValidationRule + 'static) -> Self {
        self.request.custom_rules.push(Arc::new(rule));
        self
    }

    pub fn rules(mut self, rules: impl IntoIterator<Item = RuleRef>) -> Self {
        self.request.custom_rules.extend(rules);
        self
    }

    pub fn error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&GraphQLError) + Send + Sync + 'static,
    {
        self.request.error_handler = Some(Arc::new(handler));
        self
    }

    pub fn build(self) -> Request {
        self.request
    }
}
