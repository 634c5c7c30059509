//! Rule: Known Argument Names
//!
//! Arguments on a field must be declared by the field definition, and
//! arguments on `@skip`/`@include` are limited to `if`.
//!
//! # Examples
//!
//! ```graphql
//! # Error: 'hero' takes no argument 'planet'
//! { hero(planet: "Tatooine") { name } }
//! ```

use super::super::{ValidationContext, ValidationError, ValidationRule};
use super::BUILTIN_DIRECTIVES;

pub struct KnownArgumentNamesRule;

impl ValidationRule for KnownArgumentNamesRule {
    fn id(&self) -> &'static str {
        "known-argument-names"
    }

    fn description(&self) -> &'static str {
        "Arguments must be declared by their field or directive"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        ctx.visit_fields(|visit| {
            let (Some(parent), Some(definition)) = (visit.parent_type, visit.definition) else {
                return;
            };
            for argument in &visit.field.arguments {
                if definition.find_arg(&argument.name).is_none() {
                    errors.push(ValidationError::error(
                        argument.span,
                        format!(
                            "Unknown argument \"{}\" on field \"{}\" of type \"{}\".",
                            argument.name, definition.name, parent.name
                        ),
                        self.id(),
                    ));
                }
            }
        });

        for (_, directive) in ctx.directives() {
            if !BUILTIN_DIRECTIVES.contains(&directive.name.as_str()) {
                continue;
            }
            for argument in directive.arguments.iter().filter(|arg| arg.name != "if") {
                errors.push(ValidationError::error(
                    argument.span,
                    format!(
                        "Unknown argument \"{}\" on directive \"@{}\".",
                        argument.name, directive.name
                    ),
                    self.id(),
                ));
            }
        }

        errors
    }
}
