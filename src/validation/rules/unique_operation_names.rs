//! Rule: Unique Operation Names
//!
//! Reports an error when two operations share a name.
//!
//! # Examples
//!
//! ```graphql
//! # Error: two operations named 'Hero'
//! query Hero { hero { name } }
//! query Hero { hero { id } }
//! ```
//!
//! ```graphql
//! # OK
//! query HeroName { hero { name } }
//! query HeroId { hero { id } }
//! ```

use std::collections::HashMap;

use super::super::{ValidationContext, ValidationError, ValidationRule};

pub struct UniqueOperationNamesRule;

impl ValidationRule for UniqueOperationNamesRule {
    fn id(&self) -> &'static str {
        "unique-operation-names"
    }

    fn description(&self) -> &'static str {
        "Operation names must be unique within a document"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let mut first_seen = HashMap::new();

        for operation in ctx.document().operations() {
            let Some(name) = operation.name.as_deref() else {
                continue;
            };
            match first_seen.get(name) {
                Some(&first) => errors.push(
                    ValidationError::error(
                        operation.span,
                        format!("There can be only one operation named \"{}\".", name),
                        self.id(),
                    )
                    .with_related([first]),
                ),
                None => {
                    first_seen.insert(name, operation.span);
                }
            }
        }

        errors
    }
}
