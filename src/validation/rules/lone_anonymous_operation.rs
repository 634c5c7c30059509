//! Rule: Lone Anonymous Operation
//!
//! An anonymous operation (including the `{ ... }` shorthand) is only
//! allowed when it is the single operation in the document.
//!
//! # Examples
//!
//! ```graphql
//! # Error: anonymous operation next to another operation
//! { hero { name } }
//! query Other { hero { id } }
//! ```

use super::super::{ValidationContext, ValidationError, ValidationRule};

pub struct LoneAnonymousOperationRule;

impl ValidationRule for LoneAnonymousOperationRule {
    fn id(&self) -> &'static str {
        "lone-anonymous-operation"
    }

    fn description(&self) -> &'static str {
        "An anonymous operation must be the only operation in the document"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationError> {
        let count = ctx.document().operations().count();
        if count < 2 {
            return Vec::new();
        }

        ctx.document()
            .operations()
            .filter(|operation| operation.name.is_none())
            .map(|operation| {
                ValidationError::error(
                    operation.span,
                    "This anonymous operation must be the only defined operation.",
                    self.id(),
                )
            })
            .collect()
    }
}
