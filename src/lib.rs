pub mod cli;
pub mod config;
pub mod demo;
pub mod error;
pub mod execution;
pub mod language;
pub mod pipeline;
pub mod response;
pub mod schema;
pub mod validation;

// Re-export main types
pub use error::{GraphQLError, Location, PathSegment};
pub use execution::{ExecuteParams, ExecutionContext, Executor};
pub use language::{Document, DocumentParser, Source};
pub use pipeline::{DocumentCache, Pipeline, PipelineBuilder, Request, RequestBuilder};
pub use response::QueryResult;
pub use schema::Schema;
pub use validation::{specified_rules, ValidationRule, Validator};

