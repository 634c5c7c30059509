//! Request pipeline
//!
//! Turns a [`Request`] into a [`QueryResult`] in three stages:
//!
//! 1. **Parse**: look the text up in the [`DocumentCache`], parse on a miss
//! 2. **Validate**: run built-in then custom rules (unless skipped)
//! 3. **Execute**: hand everything to the executor
//!
//! Parse and validation failures end the request with an errors-only
//! result. Execution results are returned as produced, partial data and all.
//!
//! # Example
//!
//! ```ignore
//! let pipeline = Pipeline::new();
//! let request = Request::builder(schema, "{ hero { name } }").build();
//! let result = pipeline.run(request).await;
//! ```

mod cache;
mod request;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info_span, Instrument};

use crate::config::Config;
use crate::error::GraphQLError;
use crate::execution::{DefaultExecutor, ExecuteParams, Executor};
use crate::language::{Document, DocumentParser, GraphQLParser, Source};
use crate::response::QueryResult;
use crate::schema::Schema;
use crate::validation::{specified_rules, DocumentValidator, RuleRef, ValidationResult, Validator};

pub use cache::{CacheStats, DocumentCache};
pub use request::{Request, RequestBuilder};

#[cfg(test)]
mod tests;

/// The request orchestrator.
///
/// Cloning is cheap and clones share the document cache. Cache entries are
/// keyed by [`Schema::id`], so requests only reuse a tree when they carry
/// clones of the same built schema.
#[derive(Clone)]
pub struct Pipeline {
    parser: Arc<dyn DocumentParser>,
    validator: Arc<dyn Validator>,
    executor: Arc<dyn Executor>,
    rules: Vec<RuleRef>,
    cache: Arc<DocumentCache>,
    default_timeout: Option<Duration>,
}

impl Pipeline {
    /// Default collaborators, built-in rules and a fresh unbounded cache
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Default collaborators, with cache bound and timeout taken from `config`
    pub fn from_config(config: &Config) -> Self {
        let cache = match config.cache.max_entries {
            Some(max) => DocumentCache::bounded(max),
            None => DocumentCache::new(),
        };

        let mut builder = Self::builder().cache(Arc::new(cache));
        if let Some(timeout) = config.execution.timeout() {
            builder = builder.default_timeout(timeout);
        }
        builder.build()
    }

    pub fn cache(&self) -> &Arc<DocumentCache> {
        &self.cache
    }

    /// The pipeline's built-in rules
    pub fn rules(&self) -> &[RuleRef] {
        &self.rules
    }

    /// Built-in rules followed by `custom`, order kept, duplicates kept
    pub fn effective_rules(&self, custom: &[RuleRef]) -> Vec<RuleRef> {
        self.rules.iter().chain(custom).cloned().collect()
    }

    /// Cached tree for `text`, parsing and caching it on a miss.
    /// Failed parses are never cached.
    pub fn parse_stage(&self, schema: &Schema, text: &str) -> Result<Arc<Document>, Vec<GraphQLError>> {
        if let Some(document) = self.cache.lookup(schema, text) {
            debug!("document cache hit");
            return Ok(document);
        }
        debug!("document cache miss");

        match self.parser.parse(&Source::request(text)) {
            Ok(document) => Ok(self.cache.store(schema, text, document)),
            Err(err) => {
                debug!(error = %err, "parse failed");
                Err(vec![GraphQLError::from(err)])
            }
        }
    }

    /// Run the effective rules once through the validator
    pub fn validate_stage(
        &self,
        schema: &Schema,
        document: &Document,
        custom: &[RuleRef],
    ) -> ValidationResult {
        let rules = self.effective_rules(custom);
        let result = self.validator.validate(schema, document, &rules);
        debug!(
            rules = rules.len(),
            errors = result.errors.len(),
            valid = result.is_valid,
            "validated document"
        );
        result
    }

    pub async fn execute_stage(&self, params: ExecuteParams) -> QueryResult {
        self.executor.execute(params).await
    }

    /// Parse, validate and execute one request
    pub async fn run(&self, request: Request) -> QueryResult {
        let span = info_span!(
            "graphql_request",
            operation = request.operation_name.as_deref().unwrap_or(""),
            skip_validation = request.skip_validation,
        );
        self.run_stages(request).instrument(span).await
    }

    async fn run_stages(&self, request: Request) -> QueryResult {
        let Request {
            schema,
            text,
            root_value,
            variables,
            operation_name,
            context,
            skip_validation,
            custom_rules,
            error_handler,
        } = request;

        let document = match self.parse_stage(&schema, &text) {
            Ok(document) => document,
            Err(errors) => return QueryResult::from_errors(errors),
        };

        if !skip_validation {
            let verdict = self.validate_stage(&schema, &document, &custom_rules);
            if !verdict.is_valid {
                return QueryResult::from_errors(verdict.errors);
            }
        }

        let context = match self.default_timeout {
            Some(timeout) => context.with_timeout(timeout),
            None => context,
        };

        let result = self
            .execute_stage(ExecuteParams {
                schema,
                document,
                root_value,
                variables,
                operation_name,
                context,
                error_handler,
            })
            .await;
        debug!(
            errors = result.errors.len(),
            partial = result.has_errors() && result.data.is_some(),
            "executed request"
        );
        result
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("rules", &self.rules.iter().map(|r| r.id()).collect::<Vec<_>>())
            .field("cache", &self.cache)
            .field("default_timeout", &self.default_timeout)
            .finish()
    }
}

/// Builder for [`Pipeline`]. Anything not set falls back to the defaults.
#[derive(Default)]
pub struct PipelineBuilder {
    parser: Option<Arc<dyn DocumentParser>>,
    validator: Option<Arc<dyn Validator>>,
    executor: Option<Arc<dyn Executor>>,
    rules: Option<Vec<RuleRef>>,
    cache: Option<Arc<DocumentCache>>,
    default_timeout: Option<Duration>,
}

impl PipelineBuilder {
    pub fn parser(mut self, parser: Arc<dyn DocumentParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    pub fn validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Replace the built-in rule list
    pub fn rules(mut self, rules: Vec<RuleRef>) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Share a cache, possibly with other pipelines
    pub fn cache(mut self, cache: Arc<DocumentCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Deadline applied to every request's context on top of its own
    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Pipeline {
        Pipeline {
            parser: self.parser.unwrap_or_else(|| Arc::new(GraphQLParser)),
            validator: self
                .validator
                .unwrap_or_else(|| Arc::new(DocumentValidator::new())),
            executor: self
                .executor
                .unwrap_or_else(|| Arc::new(DefaultExecutor::new())),
            rules: self.rules.unwrap_or_else(specified_rules),
            cache: self.cache.unwrap_or_default(),
            default_timeout: self.default_timeout,
        }
    }
}
