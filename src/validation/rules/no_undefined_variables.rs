//! Rule: No Undefined Variables
//!
//! Every variable used by an operation, including inside the fragments it
//! spreads, must be declared by that operation.
//!
//! # Examples
//!
//! ```graphql
//! # Error: '$id' is not declared
//! query Find { human(id: $id) { name } }
//! ```

use std::collections::HashSet;

use super::super::{ValidationContext, ValidationError, ValidationRule};

pub struct NoUndefinedVariablesRule;

impl ValidationRule for NoUndefinedVariablesRule {
    fn id(&self) -> &'static str {
        "no-undefined-variables"
    }

    fn description(&self) -> &'static str {
        "Variables must be declared by the operation that uses them"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for operation in ctx.document().operations() {
            let declared: HashSet<&str> = operation
                .variable_definitions
                .iter()
                .map(|def| def.name.as_str())
                .collect();
            let mut reported = HashSet::new();

            for usage in ctx.recursive_variable_usages(operation) {
                if declared.contains(usage.name) || !reported.insert(usage.name) {
                    continue;
                }
                let message = match &operation.name {
                    Some(op_name) => format!(
                        "Variable \"${}\" is not defined by operation \"{}\".",
                        usage.name, op_name
                    ),
                    None => format!("Variable \"${}\" is not defined.", usage.name),
                };
                errors.push(
                    ValidationError::error(usage.span, message, self.id())
                        .with_related([operation.span]),
                );
            }
        }

        errors
    }
}
