//! Rule: Unique Fragment Names
//!
//! Reports an error when two fragments share a name.
//!
//! # Examples
//!
//! ```graphql
//! # Error: 'Names' defined twice
//! { hero { ...Names } }
//! fragment Names on Character { name }
//! fragment Names on Character { id }
//! ```

use std::collections::HashMap;

use super::super::{ValidationContext, ValidationError, ValidationRule};

pub struct UniqueFragmentNamesRule;

impl ValidationRule for UniqueFragmentNamesRule {
    fn id(&self) -> &'static str {
        "unique-fragment-names"
    }

    fn description(&self) -> &'static str {
        "Fragment names must be unique within a document"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let mut first_seen = HashMap::new();

        for fragment in ctx.document().fragments() {
            if let Some(&first) = first_seen.get(fragment.name.as_str()) {
                errors.push(
                    ValidationError::error(
                        fragment.span,
                        format!("There can be only one fragment named \"{}\".", fragment.name),
                        self.id(),
                    )
                    .with_related([first]),
                );
            } else {
                first_seen.insert(fragment.name.as_str(), fragment.span);
            }
        }

        errors
    }
}
