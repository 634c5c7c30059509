use serde_json::json;

use super::*;
use crate::language::ast;

fn query_with(field: FieldDef) -> ObjectType {
    ObjectType::new("Query").field(field)
}

#[test]
fn test_builtin_scalars_are_registered() {
    let schema = Schema::builder(query_with(FieldDef::new("a", TypeRef::named("Int"))))
        .build()
        .expect("schema should build");

    for name in ["Int", "Float", "String", "Boolean", "ID"] {
        assert!(schema.get_type(name).is_some(), "missing scalar {}", name);
    }
    assert_eq!(schema.query_type().name, "Query");
    assert!(schema.mutation_type().is_none());
    assert!(schema.root_type(ast::OperationType::Subscription).is_none());
}

#[test]
fn test_unknown_field_type_is_rejected() {
    let err = Schema::builder(query_with(FieldDef::new("a", TypeRef::named("Missing"))))
        .build()
        .expect_err("unknown type should fail");

    assert_eq!(
        err,
        SchemaError::UnknownType {
            type_name: "Missing".to_string(),
            referenced_by: "Query.a".to_string(),
        }
    );
}

#[test]
fn test_object_argument_type_is_rejected() {
    let other = ObjectType::new("Other").field(FieldDef::new("x", TypeRef::named("Int")));
    let err = Schema::builder(query_with(
        FieldDef::new("a", TypeRef::named("Int"))
            .argument(ArgumentDef::new("o", TypeRef::named("Other"))),
    ))
    .register(other)
    .build()
    .expect_err("object arguments should fail");

    assert!(matches!(err, SchemaError::InvalidArgumentType { .. }));
}

#[test]
fn test_duplicate_type_is_rejected() {
    let err = Schema::builder(query_with(FieldDef::new("a", TypeRef::named("Int"))))
        .register(ScalarType::custom("Int"))
        .build()
        .expect_err("duplicate should fail");

    assert_eq!(err, SchemaError::DuplicateType("Int".to_string()));
}

#[test]
fn test_empty_object_is_rejected() {
    let err = Schema::builder(ObjectType::new("Query"))
        .build()
        .expect_err("empty object should fail");
    assert_eq!(err, SchemaError::EmptyObject("Query".to_string()));
}

#[test]
fn test_each_build_gets_a_new_identity() {
    let build = || {
        Schema::builder(query_with(FieldDef::new("a", TypeRef::named("Int"))))
            .build()
            .expect("schema should build")
    };
    let first = build();
    let second = build();

    assert_ne!(first.id(), second.id());
    assert_eq!(first.clone().id(), first.id());
    assert_eq!(first, first.clone());
}

#[test]
fn test_scalar_output_coercion() {
    assert_eq!(ScalarType::int().serialize(&json!(3.0)), Some(json!(3)));
    assert_eq!(ScalarType::int().serialize(&json!(3.5)), None);
    assert_eq!(ScalarType::int().serialize(&json!(1u64 << 40)), None);
    assert_eq!(ScalarType::string().serialize(&json!(12)), Some(json!("12")));
    assert_eq!(ScalarType::boolean().serialize(&json!(0)), Some(json!(false)));
    assert_eq!(ScalarType::id().serialize(&json!(7)), Some(json!("7")));
    assert_eq!(ScalarType::string().serialize(&json!({"a": 1})), None);
}

#[test]
fn test_scalar_input_coercion_is_strict() {
    assert_eq!(ScalarType::int().parse_value(&json!("3")), None);
    assert_eq!(ScalarType::boolean().parse_value(&json!(1)), None);
    assert_eq!(ScalarType::float().parse_value(&json!(2)), Some(json!(2.0)));
    assert_eq!(
        ScalarType::float().parse_literal(&ast::Value::Int(2)),
        Some(json!(2.0))
    );
    assert_eq!(
        ScalarType::id().parse_literal(&ast::Value::Int(4)),
        Some(json!("4"))
    );
    assert_eq!(
        ScalarType::string().parse_literal(&ast::Value::Int(4)),
        None
    );
}

#[test]
fn test_type_ref_display_and_base_name() {
    let ty = TypeRef::non_null(TypeRef::list(TypeRef::required("Episode")));
    assert_eq!(ty.to_string(), "[Episode!]!");
    assert_eq!(ty.base_name(), "Episode");
    assert!(ty.is_non_null());
}

#[tokio::test]
async fn test_sync_and_async_resolvers() {
    let sync_field = FieldDef::new("a", TypeRef::named("Int")).resolve_sync(|_| Ok(json!(1)));
    let async_field = FieldDef::new("b", TypeRef::named("Int")).resolve(|params| async move {
        Ok(json!(params.arg_i64("n").unwrap_or(0) * 2))
    });

    let params = |args: serde_json::Map<String, serde_json::Value>| ResolveParams {
        source: json!({}),
        args,
        field_name: "x".to_string(),
        parent_type: "Query".to_string(),
        path: Vec::new(),
        context: crate::execution::ExecutionContext::new(),
    };

    let sync_resolver = sync_field.resolver.expect("resolver attached");
    assert_eq!(sync_resolver(params(Default::default())).await, Ok(json!(1)));

    let async_resolver = async_field.resolver.expect("resolver attached");
    let mut args = serde_json::Map::new();
    args.insert("n".to_string(), json!(21));
    assert_eq!(async_resolver(params(args)).await, Ok(json!(42)));
}
