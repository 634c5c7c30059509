//! Variable and argument coercion

use serde_json::{Map, Value as JsonValue};

use crate::error::GraphQLError;
use crate::language::ast::{self, Directive, Field, OperationDefinition};
use crate::schema::{literal_to_json, FieldDef, NamedType, Schema, TypeRef};

type Variables = Map<String, JsonValue>;

/// Coerce the caller's variables against the operation's definitions.
///
/// Provided values are checked against their declared type, missing values
/// take their defaults, and missing required values are errors.
pub(crate) fn coerce_variable_values(
    schema: &Schema,
    operation: &OperationDefinition,
    inputs: &Variables,
) -> Result<Variables, Vec<GraphQLError>> {
    let mut coerced = Map::new();
    let mut errors = Vec::new();

    for def in &operation.variable_definitions {
        let ty = TypeRef::from(&def.var_type);

        match inputs.get(&def.name) {
            Some(value) => match coerce_input_value(schema, value, &ty) {
                Ok(value) => {
                    coerced.insert(def.name.clone(), value);
                }
                Err(reason) => errors.push(
                    GraphQLError::new(format!(
                        "Variable \"${}\" got invalid value {}; {}",
                        def.name, value, reason
                    ))
                    .with_locations([def.span]),
                ),
            },
            None => {
                if let Some(default) = &def.default_value {
                    match value_from_ast(schema, default, &ty, &Map::new()) {
                        Ok(value) => {
                            coerced.insert(def.name.clone(), value);
                        }
                        Err(reason) => errors.push(
                            GraphQLError::new(format!(
                                "Variable \"${}\" has invalid default value: {}",
                                def.name, reason
                            ))
                            .with_locations([def.span]),
                        ),
                    }
                } else if ty.is_non_null() {
                    errors.push(
                        GraphQLError::new(format!(
                            "Variable \"${}\" of required type \"{}\" was not provided.",
                            def.name, ty
                        ))
                        .with_locations([def.span]),
                    );
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(coerced)
    } else {
        Err(errors)
    }
}

/// Coerce a JSON input value to an input type
pub(crate) fn coerce_input_value(
    schema: &Schema,
    value: &JsonValue,
    ty: &TypeRef,
) -> Result<JsonValue, String> {
    match ty {
        TypeRef::NonNull(inner) => {
            if value.is_null() {
                return Err(format!("Expected non-nullable type {} not to be null.", ty));
            }
            coerce_input_value(schema, value, inner)
        }
        _ if value.is_null() => Ok(JsonValue::Null),
        TypeRef::List(item_ty) => match value {
            JsonValue::Array(items) => items
                .iter()
                .map(|item| coerce_input_value(schema, item, item_ty))
                .collect::<Result<Vec<_>, _>>()
                .map(JsonValue::Array),
            single => Ok(JsonValue::Array(vec![coerce_input_value(
                schema, single, item_ty,
            )?])),
        },
        TypeRef::Named(name) => match schema.get_type(name) {
            Some(NamedType::Scalar(scalar)) => scalar
                .parse_value(value)
                .ok_or_else(|| format!("Expected type {}.", name)),
            Some(NamedType::Enum(enum_type)) => match value.as_str() {
                Some(v) if enum_type.has_value(v) => Ok(value.clone()),
                _ => Err(format!("Expected type {}.", name)),
            },
            Some(NamedType::Object(_)) => Err(format!("{} is not an input type.", name)),
            None => Err(format!("Unknown type {}.", name)),
        },
    }
}

/// Coerce a document literal (possibly containing variables) to an input type
pub(crate) fn value_from_ast(
    schema: &Schema,
    value: &ast::Value,
    ty: &TypeRef,
    variables: &Variables,
) -> Result<JsonValue, String> {
    if let ast::Value::Variable(name) = value {
        let resolved = variables.get(name).cloned().unwrap_or(JsonValue::Null);
        if ty.is_non_null() && resolved.is_null() {
            return Err(format!(
                "Variable \"${}\" of type \"{}\" must not be null.",
                name, ty
            ));
        }
        return Ok(resolved);
    }

    match ty {
        TypeRef::NonNull(inner) => {
            if matches!(value, ast::Value::Null) {
                return Err(format!("Expected \"{}\", found null.", ty));
            }
            value_from_ast(schema, value, inner, variables)
        }
        _ if matches!(value, ast::Value::Null) => Ok(JsonValue::Null),
        TypeRef::List(item_ty) => match value {
            ast::Value::List(items) => items
                .iter()
                .map(|item| value_from_ast(schema, item, item_ty, variables))
                .collect::<Result<Vec<_>, _>>()
                .map(JsonValue::Array),
            single => Ok(JsonValue::Array(vec![value_from_ast(
                schema, single, item_ty, variables,
            )?])),
        },
        TypeRef::Named(name) => match schema.get_type(name) {
            Some(NamedType::Scalar(scalar)) => scalar
                .parse_literal(value)
                .ok_or_else(|| format!("Expected type \"{}\", found {}.", name, describe(value))),
            Some(NamedType::Enum(enum_type)) => match value {
                ast::Value::Enum(v) if enum_type.has_value(v) => Ok(JsonValue::String(v.clone())),
                _ => Err(format!("Expected type \"{}\", found {}.", name, describe(value))),
            },
            Some(NamedType::Object(_)) => Err(format!("{} is not an input type.", name)),
            None => Err(format!("Unknown type {}.", name)),
        },
    }
}

fn describe(value: &ast::Value) -> String {
    literal_to_json(value)
        .map(|json| json.to_string())
        .unwrap_or_else(|| "a variable".to_string())
}

/// Coerce the arguments written on a field against the field's definition
pub(crate) fn coerce_argument_values(
    schema: &Schema,
    definition: &FieldDef,
    field: &Field,
    variables: &Variables,
) -> Result<Map<String, JsonValue>, String> {
    let mut coerced = Map::new();

    for arg_def in &definition.args {
        let provided = field
            .argument(&arg_def.name)
            .map(|arg| &arg.value)
            .filter(|value| match value {
                ast::Value::Variable(name) => variables.contains_key(name),
                _ => true,
            });

        match provided {
            Some(value) => {
                let coerced_value = value_from_ast(schema, value, &arg_def.ty, variables)
                    .map_err(|reason| {
                        format!("Argument \"{}\" has invalid value: {}", arg_def.name, reason)
                    })?;
                coerced.insert(arg_def.name.clone(), coerced_value);
            }
            None => {
                if let Some(default) = &arg_def.default_value {
                    coerced.insert(arg_def.name.clone(), default.clone());
                } else if arg_def.ty.is_non_null() {
                    return Err(format!(
                        "Argument \"{}\" of required type \"{}\" was not provided.",
                        arg_def.name, arg_def.ty
                    ));
                }
            }
        }
    }

    Ok(coerced)
}

/// Evaluate `@skip` and `@include` on a selection
pub(crate) fn should_include(directives: &[Directive], variables: &Variables) -> bool {
    let condition = |directive: &Directive| -> bool {
        match directive.argument("if").map(|arg| &arg.value) {
            Some(ast::Value::Boolean(b)) => *b,
            Some(ast::Value::Variable(name)) => variables
                .get(name)
                .and_then(JsonValue::as_bool)
                .unwrap_or(false),
            _ => false,
        }
    };

    for directive in directives {
        match directive.name.as_str() {
            "skip" if condition(directive) => return false,
            "include" if !condition(directive) => return false,
            _ => {}
        }
    }
    true
}
