//! Document Validation
//!
//! This module provides a rule-based validation system that runs after
//! parsing to reject documents that are well formed but cannot be executed
//! against the schema.
//!
//! # Usage
//!
//! ```ignore
//! use quiver_core::validation::{specified_rules, validate_document};
//!
//! let result = validate_document(&schema, &document, &specified_rules());
//! if !result.is_valid {
//!     // Report result.errors
//! }
//! ```
//!
//! # Architecture
//!
//! 1. **ValidationRule trait** - Each rule implements this trait
//! 2. **Validator trait** - Runs an ordered rule list against a document
//! 3. **ValidationError** - The output of validation (errors and warnings)
//!
//! # Adding a New Rule
//!
//! 1. Create a new file in `validation/rules/`
//! 2. Implement `ValidationRule` for your struct
//! 3. Either add it to `specified_rules()` or pass it per request as a
//!    custom rule

mod context;
pub mod rules;

use std::sync::Arc;

use tracing::warn;

use crate::error::GraphQLError;
use crate::language::ast::{Document, Span};
use crate::schema::Schema;

pub use context::{DirectiveLocation, FieldVisit, ValidationContext, VariableUsage};

// ============================================================================
// Validation Error Types
// ============================================================================

/// A problem found by a validation rule.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// The primary source location of the issue
    pub span: Span,
    /// Further locations involved (e.g. the other duplicate)
    pub related: Vec<Span>,
    /// Human-readable message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Which rule produced this error
    pub rule_id: &'static str,
}

/// Severity levels for validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Document cannot be executed
    Error,
    /// Reported to logs only
    Warning,
}

impl ValidationError {
    /// Create a new error
    pub fn error(span: Span, message: impl Into<String>, rule_id: &'static str) -> Self {
        Self {
            span,
            related: Vec::new(),
            message: message.into(),
            severity: Severity::Error,
            rule_id,
        }
    }

    /// Create a new warning
    pub fn warning(span: Span, message: impl Into<String>, rule_id: &'static str) -> Self {
        Self {
            span,
            related: Vec::new(),
            message: message.into(),
            severity: Severity::Warning,
            rule_id,
        }
    }

    pub fn with_related(mut self, spans: impl IntoIterator<Item = Span>) -> Self {
        self.related.extend(spans);
        self
    }

    /// Check if this is an error (not a warning)
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(
            f,
            "{} at line {}, col {}: {} [{}]",
            severity,
            self.span.start_line + 1,
            self.span.start_col + 1,
            self.message,
            self.rule_id
        )
    }
}

impl std::error::Error for ValidationError {}

impl From<&ValidationError> for GraphQLError {
    fn from(err: &ValidationError) -> Self {
        GraphQLError::new(err.message.clone())
            .with_locations(std::iter::once(err.span).chain(err.related.iter().copied()))
    }
}

// ============================================================================
// ValidationRule Trait
// ============================================================================

/// Trait that all validation rules must implement.
///
/// Each rule checks one specific property of a document and must not depend
/// on the results of other rules.
pub trait ValidationRule: Send + Sync {
    /// Unique identifier for this rule (e.g., "known-fragment-names")
    fn id(&self) -> &'static str;

    /// Human-readable description of what this rule checks
    fn description(&self) -> &'static str;

    /// Run the validation and return any problems found.
    /// An empty vector means the document passes this rule.
    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationError>;
}

/// Shared handle to a rule, as stored in rule lists
pub type RuleRef = Arc<dyn ValidationRule>;

/// The built-in rules, in the order they run
pub fn specified_rules() -> Vec<RuleRef> {
    vec![
        // Operations
        Arc::new(rules::UniqueOperationNamesRule),
        Arc::new(rules::LoneAnonymousOperationRule),
        Arc::new(rules::KnownTypeNamesRule),
        // Fragments
        Arc::new(rules::UniqueFragmentNamesRule),
        Arc::new(rules::KnownFragmentNamesRule),
        Arc::new(rules::NoUnusedFragmentsRule),
        Arc::new(rules::NoFragmentCyclesRule),
        // Fields and arguments
        Arc::new(rules::FieldsOnCorrectTypeRule),
        Arc::new(rules::ScalarLeafsRule),
        Arc::new(rules::KnownArgumentNamesRule),
        Arc::new(rules::ProvidedRequiredArgumentsRule),
        Arc::new(rules::KnownDirectivesRule),
        // Variables
        Arc::new(rules::NoUndefinedVariablesRule),
        Arc::new(rules::NoUnusedVariablesRule),
    ]
}

// ============================================================================
// Validator
// ============================================================================

/// Outcome of validating one document
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    /// `false` when any error-severity problem was found
    pub is_valid: bool,
    /// Error-severity problems, in rule order
    pub errors: Vec<GraphQLError>,
}

/// Validator collaborator consumed by the pipeline.
pub trait Validator: Send + Sync {
    fn validate(&self, schema: &Schema, document: &Document, rules: &[RuleRef])
        -> ValidationResult;
}

/// Runs every rule once and keeps error-severity findings.
/// Warnings go to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentValidator;

impl DocumentValidator {
    pub fn new() -> Self {
        Self
    }

    /// Run all rules and collect every finding, warnings included
    pub fn diagnostics(
        &self,
        schema: &Schema,
        document: &Document,
        rules: &[RuleRef],
    ) -> Vec<ValidationError> {
        let ctx = ValidationContext::new(schema, document);
        rules.iter().flat_map(|rule| rule.validate(&ctx)).collect()
    }
}

impl Validator for DocumentValidator {
    fn validate(
        &self,
        schema: &Schema,
        document: &Document,
        rules: &[RuleRef],
    ) -> ValidationResult {
        let mut errors = Vec::new();
        for finding in self.diagnostics(schema, document, rules) {
            if finding.is_error() {
                errors.push(GraphQLError::from(&finding));
            } else {
                warn!(rule = finding.rule_id, "{}", finding);
            }
        }

        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Validate a document with the default validator.
///
/// # Example
///
/// ```ignore
/// let result = validate_document(&schema, &document, &specified_rules());
/// for error in &result.errors {
///     eprintln!("{}", error);
/// }
/// ```
pub fn validate_document(schema: &Schema, document: &Document, rules: &[RuleRef]) -> ValidationResult {
    DocumentValidator.validate(schema, document, rules)
}

#[cfg(test)]
mod tests;
