//! Rule: No Fragment Cycles
//!
//! A fragment may not spread itself, directly or through other fragments.
//!
//! # Examples
//!
//! ```graphql
//! # Error: A -> B -> A
//! fragment A on Character { ...B }
//! fragment B on Character { ...A }
//! ```

use std::collections::{HashMap, HashSet};

use crate::language::ast::{FragmentDefinition, FragmentSpread};

use super::super::{ValidationContext, ValidationError, ValidationRule};

pub struct NoFragmentCyclesRule;

impl ValidationRule for NoFragmentCyclesRule {
    fn id(&self) -> &'static str {
        "no-fragment-cycles"
    }

    fn description(&self) -> &'static str {
        "Fragments must not form spread cycles"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationError> {
        let mut search = CycleSearch {
            ctx,
            rule_id: self.id(),
            visited: HashSet::new(),
            path: Vec::new(),
            path_index: HashMap::new(),
            errors: Vec::new(),
        };

        for fragment in ctx.document().fragments() {
            search.visit(fragment);
        }
        search.errors
    }
}

/// Depth-first walk over spreads. Each fragment is entered once; a spread
/// naming a fragment that is still on the current path closes a cycle.
struct CycleSearch<'c, 'a> {
    ctx: &'c ValidationContext<'a>,
    rule_id: &'static str,
    visited: HashSet<&'a str>,
    path: Vec<&'a FragmentSpread>,
    /// Position in `path` at which each fragment on the path was entered
    path_index: HashMap<&'a str, usize>,
    errors: Vec<ValidationError>,
}

impl<'a> CycleSearch<'_, 'a> {
    fn visit(&mut self, fragment: &'a FragmentDefinition) {
        if !self.visited.insert(fragment.name.as_str()) {
            return;
        }
        self.path_index.insert(fragment.name.as_str(), self.path.len());

        for spread in self.ctx.fragment_spreads(&fragment.selection_set) {
            let start = self.path_index.get(spread.name.as_str()).copied();
            self.path.push(spread);
            match start {
                Some(start) => self.report(start),
                None => {
                    if let Some(target) = self.ctx.fragment(&spread.name) {
                        self.visit(target);
                    }
                }
            }
            self.path.pop();
        }

        self.path_index.remove(fragment.name.as_str());
    }

    /// `path[start..]` ends with the spread that closes the cycle
    fn report(&mut self, start: usize) {
        let cycle = &self.path[start..];
        let Some((closing, via)) = cycle.split_last() else {
            return;
        };

        let message = if via.is_empty() {
            format!("Cannot spread fragment \"{}\" within itself.", closing.name)
        } else {
            let names: Vec<&str> = via.iter().map(|s| s.name.as_str()).collect();
            format!(
                "Cannot spread fragment \"{}\" within itself via {}.",
                closing.name,
                names.join(", ")
            )
        };

        self.errors.push(
            ValidationError::error(cycle[0].span, message, self.rule_id)
                .with_related(cycle[1..].iter().map(|s| s.span)),
        );
    }
}
