//! Rule: No Unused Variables
//!
//! Every variable an operation declares must be used by it, directly or
//! through the fragments it spreads.
//!
//! # Examples
//!
//! ```graphql
//! # Error: '$episode' is never used
//! query Hero($episode: Episode) { hero { name } }
//! ```

use std::collections::HashSet;

use super::super::{ValidationContext, ValidationError, ValidationRule};

pub struct NoUnusedVariablesRule;

impl ValidationRule for NoUnusedVariablesRule {
    fn id(&self) -> &'static str {
        "no-unused-variables"
    }

    fn description(&self) -> &'static str {
        "Declared variables must be used"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for operation in ctx.document().operations() {
            let used: HashSet<&str> = ctx
                .recursive_variable_usages(operation)
                .into_iter()
                .map(|usage| usage.name)
                .collect();

            for def in &operation.variable_definitions {
                if used.contains(def.name.as_str()) {
                    continue;
                }
                let message = match &operation.name {
                    Some(op_name) => format!(
                        "Variable \"${}\" is never used in operation \"{}\".",
                        def.name, op_name
                    ),
                    None => format!("Variable \"${}\" is never used.", def.name),
                };
                errors.push(ValidationError::error(def.span, message, self.id()));
            }
        }

        errors
    }
}
