//! Rule: Known Fragment Names
//!
//! Every `...Name` spread must refer to a fragment defined in the document.
//!
//! # Examples
//!
//! ```graphql
//! # Error: 'Missing' is never defined
//! { hero { ...Missing } }
//! ```

use super::super::{ValidationContext, ValidationError, ValidationRule};

pub struct KnownFragmentNamesRule;

impl ValidationRule for KnownFragmentNamesRule {
    fn id(&self) -> &'static str {
        "known-fragment-names"
    }

    fn description(&self) -> &'static str {
        "Spread fragments must be defined"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationError> {
        let document = ctx.document();
        let selection_sets = document
            .operations()
            .map(|op| &op.selection_set)
            .chain(document.fragments().map(|frag| &frag.selection_set));

        selection_sets
            .flat_map(|set| ctx.fragment_spreads(set))
            .filter(|spread| ctx.fragment(&spread.name).is_none())
            .map(|spread| {
                ValidationError::error(
                    spread.span,
                    format!("Unknown fragment \"{}\".", spread.name),
                    self.id(),
                )
            })
            .collect()
    }
}
