//! Shared read-only view of the document and schema handed to every rule

use std::collections::HashSet;

use crate::language::ast::{
    Directive, Document, Field, FragmentDefinition, FragmentSpread, OperationDefinition,
    OperationType, Selection, SelectionSet, Span,
};
use crate::schema::{FieldDef, ObjectType, Schema};

/// A field reached while walking the document, with its schema context
#[derive(Debug, Clone, Copy)]
pub struct FieldVisit<'a> {
    /// Object type the field is selected on. `None` when that type is unknown.
    pub parent_type: Option<&'a ObjectType>,
    pub field: &'a Field,
    /// Schema definition of the field, when the parent type declares it
    pub definition: Option<&'a FieldDef>,
}

/// Places in an executable document where a directive can be written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveLocation {
    Query,
    Mutation,
    Subscription,
    Field,
    FragmentDefinition,
    FragmentSpread,
    InlineFragment,
}

impl std::fmt::Display for DirectiveLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DirectiveLocation::Query => "QUERY",
            DirectiveLocation::Mutation => "MUTATION",
            DirectiveLocation::Subscription => "SUBSCRIPTION",
            DirectiveLocation::Field => "FIELD",
            DirectiveLocation::FragmentDefinition => "FRAGMENT_DEFINITION",
            DirectiveLocation::FragmentSpread => "FRAGMENT_SPREAD",
            DirectiveLocation::InlineFragment => "INLINE_FRAGMENT",
        };
        f.write_str(name)
    }
}

/// A `$variable` reference and the argument it appears in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableUsage<'a> {
    pub name: &'a str,
    pub span: Span,
}

pub struct ValidationContext<'a> {
    schema: &'a Schema,
    document: &'a Document,
}

impl<'a> ValidationContext<'a> {
    pub fn new(schema: &'a Schema, document: &'a Document) -> Self {
        Self { schema, document }
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    pub fn document(&self) -> &'a Document {
        self.document
    }

    pub fn fragment(&self, name: &str) -> Option<&'a FragmentDefinition> {
        self.document.fragment(name)
    }

    // ========================================================================
    // Field traversal
    // ========================================================================

    /// Call `visit` for every field in every operation and fragment definition
    pub fn visit_fields(&self, mut visit: impl FnMut(FieldVisit<'a>)) {
        for operation in self.document.operations() {
            let root = self.schema.root_type(operation.operation);
            self.walk_fields(root, &operation.selection_set, &mut visit);
        }
        for fragment in self.document.fragments() {
            let parent = self.schema.object_type(&fragment.type_condition.name);
            self.walk_fields(parent, &fragment.selection_set, &mut visit);
        }
    }

    fn walk_fields(
        &self,
        parent: Option<&'a ObjectType>,
        selection_set: &'a SelectionSet,
        visit: &mut impl FnMut(FieldVisit<'a>),
    ) {
        for selection in &selection_set.items {
            match selection {
                Selection::Field(field) => {
                    let definition = parent.and_then(|p| p.find_field(&field.name));
                    visit(FieldVisit {
                        parent_type: parent,
                        field,
                        definition,
                    });
                    let child = definition.and_then(|d| self.schema.object_type(d.ty.base_name()));
                    self.walk_fields(child, &field.selection_set, visit);
                }
                Selection::InlineFragment(inline) => {
                    let scope = match &inline.type_condition {
                        Some(condition) => self.schema.object_type(&condition.name),
                        None => parent,
                    };
                    self.walk_fields(scope, &inline.selection_set, visit);
                }
                Selection::FragmentSpread(_) => {}
            }
        }
    }

    // ========================================================================
    // Directives
    // ========================================================================

    /// Every directive written anywhere in the document, with where it appears
    pub fn directives(&self) -> Vec<(DirectiveLocation, &'a Directive)> {
        let mut found = Vec::new();
        for operation in self.document.operations() {
            let location = match operation.operation {
                OperationType::Query => DirectiveLocation::Query,
                OperationType::Mutation => DirectiveLocation::Mutation,
                OperationType::Subscription => DirectiveLocation::Subscription,
            };
            found.extend(operation.directives.iter().map(|d| (location, d)));
            collect_directives(&operation.selection_set, &mut found);
        }
        for fragment in self.document.fragments() {
            found.extend(
                fragment
                    .directives
                    .iter()
                    .map(|d| (DirectiveLocation::FragmentDefinition, d)),
            );
            collect_directives(&fragment.selection_set, &mut found);
        }
        found
    }

    // ========================================================================
    // Fragment references
    // ========================================================================

    /// Spreads in a selection set, including nested fields and inline fragments
    /// but not the bodies of the spread fragments themselves
    pub fn fragment_spreads(&self, selection_set: &'a SelectionSet) -> Vec<&'a FragmentSpread> {
        let mut spreads = Vec::new();
        collect_spreads(selection_set, &mut spreads);
        spreads
    }

    /// Every defined fragment reachable from an operation, each listed once
    pub fn recursively_referenced_fragments(
        &self,
        operation: &'a OperationDefinition,
    ) -> Vec<&'a FragmentDefinition> {
        let mut fragments = Vec::new();
        let mut seen = HashSet::new();
        let mut pending = vec![&operation.selection_set];

        while let Some(selection_set) = pending.pop() {
            for spread in self.fragment_spreads(selection_set) {
                if !seen.insert(spread.name.as_str()) {
                    continue;
                }
                if let Some(fragment) = self.fragment(&spread.name) {
                    fragments.push(fragment);
                    pending.push(&fragment.selection_set);
                }
            }
        }
        fragments
    }

    // ========================================================================
    // Variable references
    // ========================================================================

    /// Variables referenced by an operation and every fragment it reaches
    pub fn recursive_variable_usages(
        &self,
        operation: &'a OperationDefinition,
    ) -> Vec<VariableUsage<'a>> {
        let mut usages = Vec::new();
        directive_variable_usages(&operation.directives, &mut usages);
        collect_variable_usages(&operation.selection_set, &mut usages);
        for fragment in self.recursively_referenced_fragments(operation) {
            directive_variable_usages(&fragment.directives, &mut usages);
            collect_variable_usages(&fragment.selection_set, &mut usages);
        }
        usages
    }
}

fn collect_directives<'a>(
    selection_set: &'a SelectionSet,
    found: &mut Vec<(DirectiveLocation, &'a Directive)>,
) {
    for selection in &selection_set.items {
        match selection {
            Selection::Field(field) => {
                found.extend(field.directives.iter().map(|d| (DirectiveLocation::Field, d)));
                collect_directives(&field.selection_set, found);
            }
            Selection::FragmentSpread(spread) => found.extend(
                spread
                    .directives
                    .iter()
                    .map(|d| (DirectiveLocation::FragmentSpread, d)),
            ),
            Selection::InlineFragment(inline) => {
                found.extend(
                    inline
                        .directives
                        .iter()
                        .map(|d| (DirectiveLocation::InlineFragment, d)),
                );
                collect_directives(&inline.selection_set, found);
            }
        }
    }
}

fn collect_spreads<'a>(selection_set: &'a SelectionSet, spreads: &mut Vec<&'a FragmentSpread>) {
    for selection in &selection_set.items {
        match selection {
            Selection::Field(field) => collect_spreads(&field.selection_set, spreads),
            Selection::FragmentSpread(spread) => spreads.push(spread),
            Selection::InlineFragment(inline) => collect_spreads(&inline.selection_set, spreads),
        }
    }
}

fn collect_variable_usages<'a>(selection_set: &'a SelectionSet, usages: &mut Vec<VariableUsage<'a>>) {
    for selection in &selection_set.items {
        match selection {
            Selection::Field(field) => {
                for argument in &field.arguments {
                    usages.extend(argument.value.variables().into_iter().map(|name| {
                        VariableUsage {
                            name,
                            span: argument.span,
                        }
                    }));
                }
                directive_variable_usages(&field.directives, usages);
                collect_variable_usages(&field.selection_set, usages);
            }
            Selection::FragmentSpread(spread) => {
                directive_variable_usages(&spread.directives, usages);
            }
            Selection::InlineFragment(inline) => {
                directive_variable_usages(&inline.directives, usages);
                collect_variable_usages(&inline.selection_set, usages);
            }
        }
    }
}

fn directive_variable_usages<'a>(directives: &'a [Directive], usages: &mut Vec<VariableUsage<'a>>) {
    for directive in directives {
        for argument in &directive.arguments {
            usages.extend(
                argument
                    .value
                    .variables()
                    .into_iter()
                    .map(|name| VariableUsage {
                        name,
                        span: argument.span,
                    }),
            );
        }
    }
}
