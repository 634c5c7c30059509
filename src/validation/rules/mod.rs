//! Validation Rules
//!
//! Each file in this module contains one validation rule.
//! Rules are organized by what they check:
//!
//! - `unique_operation_names.rs` - Named operations are unique
//! - `lone_anonymous_operation.rs` - An anonymous operation stands alone
//! - `known_type_names.rs` - Type conditions and variable types exist
//! - `unique_fragment_names.rs` - Fragment names are unique
//! - `known_fragment_names.rs` - Spread fragments are defined
//! - `no_unused_fragments.rs` - Every fragment is spread by some operation
//! - `no_fragment_cycles.rs` - Fragments never spread themselves
//! - `fields_on_correct_type.rs` - Selected fields exist on their parent type
//! - `scalar_leafs.rs` - Leaf fields have no selection, object fields do
//! - `known_argument_names.rs` - Arguments are declared by the field or directive
//! - `provided_required_arguments.rs` - Required arguments are present
//! - `known_directives.rs` - Only `@skip` and `@include`, in valid locations
//! - `no_undefined_variables.rs` - Used variables are declared
//! - `no_unused_variables.rs` - Declared variables are used

mod fields_on_correct_type;
mod known_argument_names;
mod known_directives;
mod known_fragment_names;
mod known_type_names;
mod lone_anonymous_operation;
mod no_fragment_cycles;
mod no_undefined_variables;
mod no_unused_fragments;
mod no_unused_variables;
mod provided_required_arguments;
mod scalar_leafs;
mod unique_fragment_names;
mod unique_operation_names;

pub use fields_on_correct_type::FieldsOnCorrectTypeRule;
pub use known_argument_names::KnownArgumentNamesRule;
pub use known_directives::KnownDirectivesRule;
pub use known_fragment_names::KnownFragmentNamesRule;
pub use known_type_names::KnownTypeNamesRule;
pub use lone_anonymous_operation::LoneAnonymousOperationRule;
pub use no_fragment_cycles::NoFragmentCyclesRule;
pub use no_undefined_variables::NoUndefinedVariablesRule;
pub use no_unused_fragments::NoUnusedFragmentsRule;
pub use no_unused_variables::NoUnusedVariablesRule;
pub use provided_required_arguments::ProvidedRequiredArgumentsRule;
pub use scalar_leafs::ScalarLeafsRule;
pub use unique_fragment_names::UniqueFragmentNamesRule;
pub use unique_operation_names::UniqueOperationNamesRule;

/// Directives the executor understands, with the one argument they take
pub(crate) const BUILTIN_DIRECTIVES: [&str; 2] = ["skip", "include"];
