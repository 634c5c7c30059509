//! GraphQL language front end
//!
//! Turns request text into a [`Document`]. The pipeline only talks to the
//! parser through [`DocumentParser`], so any implementation can be injected;
//! [`GraphQLParser`] is the pest-based default.

pub mod ast;
mod parser;

pub use ast::{Document, Span};
pub use parser::{parse_document, GraphQLParser, ParseError, ParseResult, MAX_NESTING_DEPTH};


/// Name given to request text when it is handed to the parser
pub const REQUEST_SOURCE_NAME: &str = "GraphQL request";

/// Request text labelled with a source name for error messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub body: String,
    pub name: String,
}

impl Source {
    pub fn new(body: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            name: name.into(),
        }
    }

    /// Label request text as the request document
    pub fn request(body: impl Into<String>) -> Self {
        Self::new(body, REQUEST_SOURCE_NAME)
    }
}

/// Parser collaborator consumed by the pipeline.
pub trait DocumentParser: Send + Sync {
    fn parse(&self, source: &Source) -> ParseResult<Document>;
}
