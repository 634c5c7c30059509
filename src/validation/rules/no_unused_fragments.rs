//! Rule: No Unused Fragments
//!
//! Every fragment definition must be reachable from at least one operation.
//!
//! # Examples
//!
//! ```graphql
//! # Error: 'Extra' is defined but never spread
//! { hero { name } }
//! fragment Extra on Character { id }
//! ```

use std::collections::HashSet;

use super::super::{ValidationContext, ValidationError, ValidationRule};

pub struct NoUnusedFragmentsRule;

impl ValidationRule for NoUnusedFragmentsRule {
    fn id(&self) -> &'static str {
        "no-unused-fragments"
    }

    fn description(&self) -> &'static str {
        "Fragments must be used by some operation"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationError> {
        let used: HashSet<&str> = ctx
            .document()
            .operations()
            .flat_map(|op| ctx.recursively_referenced_fragments(op))
            .map(|fragment| fragment.name.as_str())
            .collect();

        ctx.document()
            .fragments()
            .filter(|fragment| !used.contains(fragment.name.as_str()))
            .map(|fragment| {
                ValidationError::error(
                    fragment.span,
                    format!("Fragment \"{}\" is never used.", fragment.name),
                    self.id(),
                )
            })
            .collect()
    }
}
