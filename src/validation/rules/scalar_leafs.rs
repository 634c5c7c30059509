//! Rule: Scalar Leafs
//!
//! Fields of scalar or enum type must not have a selection set; fields of
//! object type must have one.
//!
//! # Examples
//!
//! ```graphql
//! # Error: 'name' is a String
//! { hero { name { length } } }
//! ```
//!
//! ```graphql
//! # Error: 'hero' needs sub-fields
//! { hero }
//! ```

use super::super::{ValidationContext, ValidationError, ValidationRule};

pub struct ScalarLeafsRule;

impl ValidationRule for ScalarLeafsRule {
    fn id(&self) -> &'static str {
        "scalar-leafs"
    }

    fn description(&self) -> &'static str {
        "Leaf fields take no selection set and object fields require one"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        ctx.visit_fields(|visit| {
            let Some(definition) = visit.definition else {
                return;
            };
            let Some(named) = ctx.schema().get_type(definition.ty.base_name()) else {
                return;
            };
            let field = visit.field;

            if named.is_leaf() && !field.selection_set.is_empty() {
                errors.push(ValidationError::error(
                    field.selection_set.span,
                    format!(
                        "Field \"{}\" must not have a selection since type \"{}\" has no subfields.",
                        field.name, definition.ty
                    ),
                    self.id(),
                ));
            } else if !named.is_leaf() && field.selection_set.is_empty() {
                errors.push(ValidationError::error(
                    field.span,
                    format!(
                        "Field \"{}\" of type \"{}\" must have a selection of subfields. Did you mean \"{} {{ ... }}\"?",
                        field.name, definition.ty, field.name
                    ),
                    self.id(),
                ));
            }
        });

        errors
    }
}
