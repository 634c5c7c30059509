//! Error types shared across the request pipeline
//!
//! Every stage reports failures as [`GraphQLError`], the serializable shape
//! found in a GraphQL response. Stage-specific errors (`ParseError`,
//! `ValidationError`, `FieldError`) convert into it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::language::ast::Span;
use crate::language::ParseError;

/// A source location (1-based line and column) for a [`GraphQLError`].
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl From<Span> for Location {
    fn from(span: Span) -> Self {
        Location {
            line: span.start_line + 1,
            column: span.start_col + 1,
        }
    }
}

/// One segment of a response path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl std::fmt::Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{}", key),
            PathSegment::Index(idx) => write!(f, "{}", idx),
        }
    }
}

/// A serializable error, as found in a GraphQL response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQLError {
    pub message: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<PathSegment>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Map<String, JsonValue>>,
}

impl GraphQLError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: Vec::new(),
            path: None,
            extensions: None,
        }
    }

    pub fn with_locations(mut self, spans: impl IntoIterator<Item = Span>) -> Self {
        self.locations.extend(spans.into_iter().map(Location::from));
        self
    }

    pub fn with_path(mut self, path: Vec<PathSegment>) -> Self {
        self.path = Some(path);
        self
    }

    pub fn with_extensions(mut self, extensions: Map<String, JsonValue>) -> Self {
        if !extensions.is_empty() {
            self.extensions = Some(extensions);
        }
        self
    }
}

impl std::fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(loc) = self.locations.first() {
            write!(f, " ({}:{})", loc.line, loc.column)?;
        }
        if let Some(path) = &self.path {
            let joined: Vec<String> = path.iter().map(|s| s.to_string()).collect();
            write!(f, " at {}", joined.join("."))?;
        }
        Ok(())
    }
}

impl std::error::Error for GraphQLError {}

impl From<&ParseError> for GraphQLError {
    fn from(err: &ParseError) -> Self {
        GraphQLError::new(err.to_string()).with_locations(err.span())
    }
}

impl From<ParseError> for GraphQLError {
    fn from(err: ParseError) -> Self {
        GraphQLError::from(&err)
    }
}
