//! Rule: Provided Required Arguments
//!
//! Non-null arguments without a default value must be written on the field.
//! `@skip` and `@include` always need `if`.
//!
//! # Examples
//!
//! ```graphql
//! # Error: 'human' requires 'id'
//! { human { name } }
//! ```
//!
//! ```graphql
//! # Error: '@skip' requires 'if'
//! { hero { name @skip } }
//! ```

use super::super::{ValidationContext, ValidationError, ValidationRule};
use super::BUILTIN_DIRECTIVES;

pub struct ProvidedRequiredArgumentsRule;

impl ValidationRule for ProvidedRequiredArgumentsRule {
    fn id(&self) -> &'static str {
        "provided-required-arguments"
    }

    fn description(&self) -> &'static str {
        "Required arguments must be provided"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        ctx.visit_fields(|visit| {
            let Some(definition) = visit.definition else {
                return;
            };
            let missing = definition.args.iter().filter(|arg| {
                arg.ty.is_non_null()
                    && arg.default_value.is_none()
                    && visit.field.argument(&arg.name).is_none()
            });
            for arg in missing {
                errors.push(ValidationError::error(
                    visit.field.span,
                    format!(
                        "Field \"{}\" argument \"{}\" of type \"{}\" is required but not provided.",
                        definition.name, arg.name, arg.ty
                    ),
                    self.id(),
                ));
            }
        });

        for (_, directive) in ctx.directives() {
            if BUILTIN_DIRECTIVES.contains(&directive.name.as_str())
                && directive.argument("if").is_none()
            {
                errors.push(ValidationError::error(
                    directive.span,
                    format!(
                        "Directive \"@{}\" argument \"if\" of type \"Boolean!\" is required but not provided.",
                        directive.name
                    ),
                    self.id(),
                ));
            }
        }

        errors
    }
}
