//! Rule: Known Type Names
//!
//! Every type named in a fragment type condition or a variable definition
//! must exist in the schema.
//!
//! # Examples
//!
//! ```graphql
//! # Error: 'Starship' is not a schema type
//! query ($id: ID) { ... on Starship { name } }
//! ```
//!
//! ```graphql
//! # Error: 'Text' is not a schema type
//! query ($note: Text) { hero { name } }
//! ```

use crate::language::ast::{NamedType, Selection, SelectionSet, Span};

use super::super::{ValidationContext, ValidationError, ValidationRule};

pub struct KnownTypeNamesRule;

impl ValidationRule for KnownTypeNamesRule {
    fn id(&self) -> &'static str {
        "known-type-names"
    }

    fn description(&self) -> &'static str {
        "Type conditions and variable types must name schema types"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let mut check = |name: &str, span: Span| {
            if ctx.schema().get_type(name).is_none() {
                errors.push(ValidationError::error(
                    span,
                    format!("Unknown type \"{}\".", name),
                    self.id(),
                ));
            }
        };

        for operation in ctx.document().operations() {
            for def in &operation.variable_definitions {
                check(def.var_type.base_name(), def.span);
            }
            for condition in inline_conditions(&operation.selection_set) {
                check(&condition.name, condition.span);
            }
        }

        for fragment in ctx.document().fragments() {
            check(&fragment.type_condition.name, fragment.type_condition.span);
            for condition in inline_conditions(&fragment.selection_set) {
                check(&condition.name, condition.span);
            }
        }

        errors
    }
}

/// Type conditions of inline fragments anywhere below a selection set
fn inline_conditions(selection_set: &SelectionSet) -> Vec<&NamedType> {
    let mut conditions = Vec::new();
    let mut pending = vec![selection_set];

    while let Some(set) = pending.pop() {
        for selection in &set.items {
            match selection {
                Selection::Field(field) => pending.push(&field.selection_set),
                Selection::InlineFragment(inline) => {
                    conditions.extend(inline.type_condition.as_ref());
                    pending.push(&inline.selection_set);
                }
                Selection::FragmentSpread(_) => {}
            }
        }
    }
    conditions
}
