use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use futures::future::{join_all, BoxFuture, FutureExt};
use parking_lot::Mutex;
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, warn};

use super::values::{coerce_argument_values, coerce_variable_values, should_include};
use super::{ErrorHandler, ExecuteParams, ExecutionContext, Executor};
use crate::error::{GraphQLError, PathSegment};
use crate::language::ast::{
    Document, Field, OperationDefinition, OperationType, Selection, SelectionSet,
};
use crate::language::MAX_NESTING_DEPTH;
use crate::response::QueryResult;
use crate::schema::{FieldDef, FieldError, NamedType, ObjectType, ResolveParams, Schema, TypeRef};

/// Resolves documents against the schema's resolver functions
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultExecutor;

impl DefaultExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Executor for DefaultExecutor {
    async fn execute(&self, params: ExecuteParams) -> QueryResult {
        execute(params).await
    }
}

/// Marker for a null that must propagate to the nearest nullable parent.
/// The error explaining it has already been recorded.
struct Bubble;

type Completion = Result<JsonValue, Bubble>;

/// Fields grouped by response key, in first-seen order
type GroupedFields<'a> = Vec<(String, Vec<&'a Field>)>;

struct ExecutionState<'a> {
    schema: &'a Schema,
    document: &'a Document,
    variables: Map<String, JsonValue>,
    context: ExecutionContext,
    errors: Mutex<Vec<GraphQLError>>,
    error_handler: Option<ErrorHandler>,
}

impl ExecutionState<'_> {
    fn record(&self, error: GraphQLError) {
        if let Some(handler) = &self.error_handler {
            handler(&error);
        }
        self.errors.lock().push(error);
    }

    fn field_error(&self, message: impl Into<String>, field: &Field, path: &[PathSegment]) {
        self.record(
            GraphQLError::new(message)
                .with_locations([field.span])
                .with_path(path.to_vec()),
        );
    }
}

/// Execute one operation of a document
pub async fn execute(params: ExecuteParams) -> QueryResult {
    let ExecuteParams {
        schema,
        document,
        root_value,
        variables,
        operation_name,
        context,
        error_handler,
    } = params;

    let fail = |errors: Vec<GraphQLError>| {
        if let Some(handler) = &error_handler {
            errors.iter().for_each(|error| handler(error));
        }
        QueryResult::from_errors(errors)
    };

    let operation = match select_operation(&document, operation_name.as_deref()) {
        Ok(operation) => operation,
        Err(error) => return fail(vec![error]),
    };

    let Some(root_type) = schema.root_type(operation.operation) else {
        let error = GraphQLError::new(format!(
            "Schema is not configured for {}s.",
            operation.operation
        ))
        .with_locations([operation.span]);
        return fail(vec![error]);
    };

    let variables = match coerce_variable_values(&schema, operation, &variables) {
        Ok(variables) => variables,
        Err(errors) => return fail(errors),
    };

    debug!(
        operation = operation.name.as_deref().unwrap_or("<anonymous>"),
        kind = %operation.operation,
        "executing operation"
    );

    let state = ExecutionState {
        schema: &schema,
        document: &document,
        variables,
        context,
        errors: Mutex::new(Vec::new()),
        error_handler,
    };

    let fields = collect_fields(&state, root_type, &[&operation.selection_set]);
    let serial = operation.operation == OperationType::Mutation;
    let data = execute_fields(
        &state,
        root_type,
        JsonValue::Object(root_value),
        Vec::new(),
        fields,
        serial,
    )
    .await
    .unwrap_or(JsonValue::Null);

    QueryResult {
        data: Some(data),
        errors: state.errors.into_inner(),
    }
}

fn select_operation<'d>(
    document: &'d Document,
    operation_name: Option<&str>,
) -> Result<&'d OperationDefinition, GraphQLError> {
    let mut operations = document.operations();

    match operation_name {
        Some(name) => document
            .operations()
            .find(|op| op.name.as_deref() == Some(name))
            .ok_or_else(|| GraphQLError::new(format!("Unknown operation named \"{}\".", name))),
        None => match (operations.next(), operations.next()) {
            (Some(operation), None) => Ok(operation),
            (Some(_), Some(_)) => Err(GraphQLError::new(
                "Must provide operation name if query contains multiple operations.",
            )),
            (None, _) => Err(GraphQLError::new("Must provide an operation.")),
        },
    }
}

/* ===================== Field Collection ===================== */

fn collect_fields<'a>(
    state: &ExecutionState<'a>,
    object_type: &ObjectType,
    selection_sets: &[&'a SelectionSet],
) -> GroupedFields<'a> {
    let mut grouped = Vec::new();
    let mut index = HashMap::new();
    let mut visited = HashSet::new();

    for &selection_set in selection_sets {
        collect_into(
            state,
            object_type,
            selection_set,
            &mut grouped,
            &mut index,
            &mut visited,
        );
    }
    grouped
}

fn collect_into<'a>(
    state: &ExecutionState<'a>,
    object_type: &ObjectType,
    selection_set: &'a SelectionSet,
    grouped: &mut GroupedFields<'a>,
    index: &mut HashMap<String, usize>,
    visited: &mut HashSet<&'a str>,
) {
    for selection in &selection_set.items {
        match selection {
            Selection::Field(field) => {
                if !should_include(&field.directives, &state.variables) {
                    continue;
                }
                let key = field.response_key();
                match index.get(key) {
                    Some(&slot) => grouped[slot].1.push(field),
                    None => {
                        index.insert(key.to_string(), grouped.len());
                        grouped.push((key.to_string(), vec![field]));
                    }
                }
            }
            Selection::FragmentSpread(spread) => {
                if !should_include(&spread.directives, &state.variables)
                    || !visited.insert(spread.name.as_str())
                {
                    continue;
                }
                let Some(fragment) = state.document.fragment(&spread.name) else {
                    continue;
                };
                if fragment.type_condition.name != object_type.name {
                    continue;
                }
                collect_into(
                    state,
                    object_type,
                    &fragment.selection_set,
                    grouped,
                    index,
                    visited,
                );
            }
            Selection::InlineFragment(inline) => {
                if !should_include(&inline.directives, &state.variables) {
                    continue;
                }
                if let Some(condition) = &inline.type_condition {
                    if condition.name != object_type.name {
                        continue;
                    }
                }
                collect_into(
                    state,
                    object_type,
                    &inline.selection_set,
                    grouped,
                    index,
                    visited,
                );
            }
        }
    }
}

/* ===================== Field Execution ===================== */

fn execute_fields<'a>(
    state: &'a ExecutionState<'a>,
    object_type: &'a ObjectType,
    source: JsonValue,
    path: Vec<PathSegment>,
    fields: GroupedFields<'a>,
    serial: bool,
) -> BoxFuture<'a, Completion> {
    async move {
        let mut pending = Vec::with_capacity(fields.len());
        for (key, nodes) in fields {
            let mut field_path = path.clone();
            field_path.push(PathSegment::Key(key.clone()));

            let name = nodes[0].name.as_str();
            let future: BoxFuture<'a, Completion> = if name == "__typename" {
                let type_name = JsonValue::String(object_type.name.clone());
                async move { Ok(type_name) }.boxed()
            } else if let Some(definition) = object_type.find_field(name) {
                execute_field(state, object_type, definition, source.clone(), nodes, field_path)
            } else {
                // Only reachable without validation; unknown fields are left out
                continue;
            };
            pending.push((key, future));
        }

        let mut data = Map::new();
        if serial {
            for (key, future) in pending {
                data.insert(key, future.await?);
            }
        } else {
            let (keys, futures): (Vec<_>, Vec<_>) = pending.into_iter().unzip();
            for (key, result) in keys.into_iter().zip(join_all(futures).await) {
                data.insert(key, result?);
            }
        }
        Ok(JsonValue::Object(data))
    }
    .boxed()
}

fn execute_field<'a>(
    state: &'a ExecutionState<'a>,
    parent: &'a ObjectType,
    definition: &'a FieldDef,
    source: JsonValue,
    nodes: Vec<&'a Field>,
    path: Vec<PathSegment>,
) -> BoxFuture<'a, Completion> {
    async move {
        let field = nodes[0];

        if let Some(err) = state.context.err() {
            warn!(field = %definition.name, error = %err, "skipping field of finished context");
            state.field_error(err.to_string(), field, &path);
            return null_or_bubble(&definition.ty);
        }

        // Fragment chains can nest fields deeper than the text itself
        let depth = path.iter().filter(|seg| matches!(seg, PathSegment::Key(_))).count();
        if depth > MAX_NESTING_DEPTH {
            state.field_error(
                format!(
                    "Field {}.{} is nested too deeply, limit is {}",
                    parent.name, definition.name, MAX_NESTING_DEPTH
                ),
                field,
                &path,
            );
            return null_or_bubble(&definition.ty);
        }

        let args = match coerce_argument_values(state.schema, definition, field, &state.variables) {
            Ok(args) => args,
            Err(message) => {
                state.field_error(message, field, &path);
                return null_or_bubble(&definition.ty);
            }
        };

        let resolved = match &definition.resolver {
            Some(resolver) => {
                let params = ResolveParams {
                    source,
                    args,
                    field_name: definition.name.clone(),
                    parent_type: parent.name.clone(),
                    path: path.clone(),
                    context: state.context.clone(),
                };
                tokio::select! {
                    biased;
                    result = resolver(params) => result,
                    err = state.context.done() => {
                        warn!(field = %definition.name, error = %err, "resolver interrupted");
                        Err(FieldError::from(err))
                    }
                }
            }
            None => Ok(default_resolve(&source, &definition.name)),
        };

        match resolved {
            Ok(value) => {
                complete_value(state, parent, definition, &definition.ty, nodes, path, value).await
            }
            Err(err) => {
                state.record(
                    GraphQLError::new(err.message)
                        .with_locations([field.span])
                        .with_path(path)
                        .with_extensions(err.extensions),
                );
                null_or_bubble(&definition.ty)
            }
        }
    }
    .boxed()
}

/// Property lookup on the parent value
fn default_resolve(source: &JsonValue, field_name: &str) -> JsonValue {
    source.get(field_name).cloned().unwrap_or(JsonValue::Null)
}

fn null_or_bubble(ty: &TypeRef) -> Completion {
    if ty.is_non_null() {
        Err(Bubble)
    } else {
        Ok(JsonValue::Null)
    }
}

/* ===================== Value Completion ===================== */

fn complete_value<'a>(
    state: &'a ExecutionState<'a>,
    parent: &'a ObjectType,
    definition: &'a FieldDef,
    ty: &'a TypeRef,
    nodes: Vec<&'a Field>,
    path: Vec<PathSegment>,
    value: JsonValue,
) -> BoxFuture<'a, Completion> {
    async move {
        match ty {
            TypeRef::NonNull(inner) => {
                let field = nodes[0];
                let completed =
                    complete_inner(state, parent, definition, inner, nodes, path.clone(), value)
                        .await?;
                if completed.is_null() {
                    state.field_error(
                        format!(
                            "Cannot return null for non-nullable field {}.{}.",
                            parent.name, definition.name
                        ),
                        field,
                        &path,
                    );
                    return Err(Bubble);
                }
                Ok(completed)
            }
            _ => Ok(complete_inner(state, parent, definition, ty, nodes, path, value)
                .await
                .unwrap_or(JsonValue::Null)),
        }
    }
    .boxed()
}

fn complete_inner<'a>(
    state: &'a ExecutionState<'a>,
    parent: &'a ObjectType,
    definition: &'a FieldDef,
    ty: &'a TypeRef,
    nodes: Vec<&'a Field>,
    path: Vec<PathSegment>,
    value: JsonValue,
) -> BoxFuture<'a, Completion> {
    async move {
        if value.is_null() {
            return Ok(JsonValue::Null);
        }
        let field = nodes[0];

        match ty {
            TypeRef::NonNull(_) => {
                complete_value(state, parent, definition, ty, nodes, path, value).await
            }
            TypeRef::List(item_ty) => {
                let JsonValue::Array(items) = value else {
                    state.field_error(
                        format!(
                            "User Error: expected iterable, but did not find one for field {}.{}.",
                            parent.name, definition.name
                        ),
                        field,
                        &path,
                    );
                    return Err(Bubble);
                };

                let futures = items.into_iter().enumerate().map(|(idx, item)| {
                    let mut item_path = path.clone();
                    item_path.push(PathSegment::Index(idx));
                    complete_value(state, parent, definition, item_ty, nodes.clone(), item_path, item)
                });
                join_all(futures)
                    .await
                    .into_iter()
                    .collect::<Result<Vec<_>, _>>()
                    .map(JsonValue::Array)
            }
            TypeRef::Named(name) => match state.schema.get_type(name) {
                Some(NamedType::Scalar(scalar)) => scalar.serialize(&value).ok_or_else(|| {
                    state.field_error(
                        format!("Expected a value of type \"{}\" but received: {}", name, value),
                        field,
                        &path,
                    );
                    Bubble
                }),
                Some(NamedType::Enum(enum_type)) => match value.as_str() {
                    Some(v) if enum_type.has_value(v) => Ok(value),
                    _ => {
                        state.field_error(
                            format!("Expected a value of type \"{}\" but received: {}", name, value),
                            field,
                            &path,
                        );
                        Err(Bubble)
                    }
                },
                Some(NamedType::Object(object_type)) => {
                    let selection_sets: Vec<&SelectionSet> =
                        nodes.iter().map(|node| &node.selection_set).collect();
                    let fields = collect_fields(state, object_type, &selection_sets);
                    execute_fields(state, object_type, value, path, fields, false).await
                }
                None => {
                    state.field_error(format!("Unknown type \"{}\".", name), field, &path);
                    Err(Bubble)
                }
            },
        }
    }
    .boxed()
}
