//! Rule: Fields On Correct Type
//!
//! Every selected field must be declared by the type it is selected on.
//! `__typename` is allowed on every object type.
//!
//! # Examples
//!
//! ```graphql
//! # Error: Character has no field 'unknownField'
//! { hero { unknownField } }
//! ```
//!
//! ```graphql
//! # OK
//! { hero { name __typename } }
//! ```

use super::super::{ValidationContext, ValidationError, ValidationRule};

pub struct FieldsOnCorrectTypeRule;

impl ValidationRule for FieldsOnCorrectTypeRule {
    fn id(&self) -> &'static str {
        "fields-on-correct-type"
    }

    fn description(&self) -> &'static str {
        "Selected fields must exist on the parent type"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        ctx.visit_fields(|visit| {
            let Some(parent) = visit.parent_type else {
                return;
            };
            if visit.definition.is_none() && visit.field.name != "__typename" {
                errors.push(ValidationError::error(
                    visit.field.span,
                    format!(
                        "Cannot query field \"{}\" on type \"{}\".",
                        visit.field.name, parent.name
                    ),
                    self.id(),
                ));
            }
        });

        errors
    }
}
