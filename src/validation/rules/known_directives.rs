//! Rule: Known Directives
//!
//! Only `@skip` and `@include` are understood, and only on fields, fragment
//! spreads and inline fragments.
//!
//! # Examples
//!
//! ```graphql
//! # Error: '@cached' is not a known directive
//! { hero @cached { name } }
//! ```
//!
//! ```graphql
//! # Error: '@skip' is not allowed on an operation
//! query Q @skip(if: true) { hero { name } }
//! ```

use super::super::{DirectiveLocation, ValidationContext, ValidationError, ValidationRule};
use super::BUILTIN_DIRECTIVES;

pub struct KnownDirectivesRule;

impl ValidationRule for KnownDirectivesRule {
    fn id(&self) -> &'static str {
        "known-directives"
    }

    fn description(&self) -> &'static str {
        "Directives must be known and used in a valid location"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for (location, directive) in ctx.directives() {
            if !BUILTIN_DIRECTIVES.contains(&directive.name.as_str()) {
                errors.push(ValidationError::error(
                    directive.span,
                    format!("Unknown directive \"{}\".", directive.name),
                    self.id(),
                ));
                continue;
            }

            let allowed = matches!(
                location,
                DirectiveLocation::Field
                    | DirectiveLocation::FragmentSpread
                    | DirectiveLocation::InlineFragment
            );
            if !allowed {
                errors.push(ValidationError::error(
                    directive.span,
                    format!(
                        "Directive \"{}\" may not be used on {}.",
                        directive.name, location
                    ),
                    self.id(),
                ));
            }
        }

        errors
    }
}
