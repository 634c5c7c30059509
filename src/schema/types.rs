//! Type definitions: scalars, enums, objects and wrapped type references

use std::sync::Arc;

use serde_json::{Number, Value as JsonValue};

use super::resolver::{FieldError, ResolveParams, Resolver, ResolverFuture};
use crate::language::ast;

/* ===================== Type References ===================== */

/// A possibly wrapped reference to a named type (`T`, `[T]`, `T!`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn list(inner: TypeRef) -> Self {
        TypeRef::List(Box::new(inner))
    }

    pub fn non_null(inner: TypeRef) -> Self {
        TypeRef::NonNull(Box::new(inner))
    }

    /// Shorthand for `T!`
    pub fn required(name: impl Into<String>) -> Self {
        TypeRef::non_null(TypeRef::named(name))
    }

    /// The name of the innermost named type
    pub fn base_name(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.base_name(),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeRef::NonNull(_))
    }
}

impl From<&ast::Type> for TypeRef {
    fn from(ty: &ast::Type) -> Self {
        match ty {
            ast::Type::Named { name } => TypeRef::Named(name.clone()),
            ast::Type::List { inner } => TypeRef::list(TypeRef::from(inner.as_ref())),
            ast::Type::NonNull { inner } => TypeRef::non_null(TypeRef::from(inner.as_ref())),
        }
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeRef::Named(name) => write!(f, "{}", name),
            TypeRef::List(inner) => write!(f, "[{}]", inner),
            TypeRef::NonNull(inner) => write!(f, "{}!", inner),
        }
    }
}

/* ===================== Scalars ===================== */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Int,
    Float,
    String,
    Boolean,
    Id,
    /// Values pass through unchanged in both directions
    Custom,
}

#[derive(Debug, Clone)]
pub struct ScalarType {
    pub name: String,
    pub description: Option<String>,
    pub kind: ScalarKind,
}

impl ScalarType {
    fn builtin(name: &str, kind: ScalarKind) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            kind,
        }
    }

    pub fn int() -> Self {
        Self::builtin("Int", ScalarKind::Int)
    }

    pub fn float() -> Self {
        Self::builtin("Float", ScalarKind::Float)
    }

    pub fn string() -> Self {
        Self::builtin("String", ScalarKind::String)
    }

    pub fn boolean() -> Self {
        Self::builtin("Boolean", ScalarKind::Boolean)
    }

    pub fn id() -> Self {
        Self::builtin("ID", ScalarKind::Id)
    }

    pub fn custom(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            kind: ScalarKind::Custom,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The built-in scalars every schema contains
    pub fn builtins() -> Vec<ScalarType> {
        vec![
            Self::int(),
            Self::float(),
            Self::string(),
            Self::boolean(),
            Self::id(),
        ]
    }

    /// Output coercion of a resolved value. `None` means the value cannot be represented.
    pub fn serialize(&self, value: &JsonValue) -> Option<JsonValue> {
        match self.kind {
            ScalarKind::Int => match value {
                JsonValue::Number(n) => number_to_i32(n).map(JsonValue::from),
                JsonValue::Bool(b) => Some(JsonValue::from(i32::from(*b))),
                JsonValue::String(s) => s.trim().parse::<i32>().ok().map(JsonValue::from),
                _ => None,
            },
            ScalarKind::Float => match value {
                JsonValue::Number(n) => n.as_f64().and_then(float_value),
                JsonValue::Bool(b) => float_value(if *b { 1.0 } else { 0.0 }),
                JsonValue::String(s) => s.trim().parse::<f64>().ok().and_then(float_value),
                _ => None,
            },
            ScalarKind::String => match value {
                JsonValue::String(_) => Some(value.clone()),
                JsonValue::Number(n) => Some(JsonValue::String(n.to_string())),
                JsonValue::Bool(b) => Some(JsonValue::String(b.to_string())),
                _ => None,
            },
            ScalarKind::Boolean => match value {
                JsonValue::Bool(_) => Some(value.clone()),
                JsonValue::Number(n) => n.as_f64().map(|f| JsonValue::Bool(f != 0.0)),
                _ => None,
            },
            ScalarKind::Id => id_value(value),
            ScalarKind::Custom => Some(value.clone()),
        }
    }

    /// Input coercion of a variable value. Stricter than [`ScalarType::serialize`].
    pub fn parse_value(&self, value: &JsonValue) -> Option<JsonValue> {
        match self.kind {
            ScalarKind::Int => match value {
                JsonValue::Number(n) => number_to_i32(n).map(JsonValue::from),
                _ => None,
            },
            ScalarKind::Float => match value {
                JsonValue::Number(n) => n.as_f64().and_then(float_value),
                _ => None,
            },
            ScalarKind::String => value.is_string().then(|| value.clone()),
            ScalarKind::Boolean => value.is_boolean().then(|| value.clone()),
            ScalarKind::Id => id_value(value),
            ScalarKind::Custom => Some(value.clone()),
        }
    }

    /// Input coercion of a literal written in the document
    pub fn parse_literal(&self, value: &ast::Value) -> Option<JsonValue> {
        match (self.kind, value) {
            (ScalarKind::Int, ast::Value::Int(i)) => i32::try_from(*i).ok().map(JsonValue::from),
            (ScalarKind::Float, ast::Value::Int(i)) => float_value(*i as f64),
            (ScalarKind::Float, ast::Value::Float(f)) => float_value(*f),
            (ScalarKind::String, ast::Value::String(s)) => Some(JsonValue::String(s.clone())),
            (ScalarKind::Boolean, ast::Value::Boolean(b)) => Some(JsonValue::Bool(*b)),
            (ScalarKind::Id, ast::Value::String(s)) => Some(JsonValue::String(s.clone())),
            (ScalarKind::Id, ast::Value::Int(i)) => Some(JsonValue::String(i.to_string())),
            (ScalarKind::Custom, literal) => literal_to_json(literal),
            _ => None,
        }
    }
}

fn number_to_i32(n: &Number) -> Option<i32> {
    if let Some(i) = n.as_i64() {
        return i32::try_from(i).ok();
    }
    let f = n.as_f64()?;
    if f.fract() == 0.0 && f >= i32::MIN as f64 && f <= i32::MAX as f64 {
        Some(f as i32)
    } else {
        None
    }
}

fn float_value(f: f64) -> Option<JsonValue> {
    Number::from_f64(f).map(JsonValue::Number)
}

fn id_value(value: &JsonValue) -> Option<JsonValue> {
    match value {
        JsonValue::String(_) => Some(value.clone()),
        JsonValue::Number(n) if n.is_i64() || n.is_u64() => Some(JsonValue::String(n.to_string())),
        _ => None,
    }
}

/// Convert a variable-free literal into JSON
pub(crate) fn literal_to_json(value: &ast::Value) -> Option<JsonValue> {
    Some(match value {
        ast::Value::Variable(_) => return None,
        ast::Value::Int(i) => JsonValue::from(*i),
        ast::Value::Float(f) => float_value(*f)?,
        ast::Value::String(s) | ast::Value::Enum(s) => JsonValue::String(s.clone()),
        ast::Value::Boolean(b) => JsonValue::Bool(*b),
        ast::Value::Null => JsonValue::Null,
        ast::Value::List(items) => JsonValue::Array(
            items
                .iter()
                .map(literal_to_json)
                .collect::<Option<Vec<_>>>()?,
        ),
        ast::Value::Object(fields) => JsonValue::Object(
            fields
                .iter()
                .map(|(name, v)| literal_to_json(v).map(|v| (name.clone(), v)))
                .collect::<Option<serde_json::Map<_, _>>>()?,
        ),
    })
}

/* ===================== Enums ===================== */

#[derive(Debug, Clone)]
pub struct EnumType {
    pub name: String,
    pub description: Option<String>,
    pub values: Vec<String>,
}

impl EnumType {
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            description: None,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn has_value(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}

/* ===================== Objects ===================== */

#[derive(Debug, Clone)]
pub struct ArgumentDef {
    pub name: String,
    pub ty: TypeRef,
    pub description: Option<String>,
    pub default_value: Option<JsonValue>,
}

impl ArgumentDef {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            description: None,
            default_value: None,
        }
    }

    pub fn default_value(mut self, value: JsonValue) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A field on an object type, with an optional resolver.
///
/// Fields without a resolver read the property of the same name from the
/// parent value.
#[derive(Clone)]
pub struct FieldDef {
    pub name: String,
    pub ty: TypeRef,
    pub description: Option<String>,
    pub args: Vec<ArgumentDef>,
    pub resolver: Option<Resolver>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            description: None,
            args: Vec::new(),
            resolver: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn argument(mut self, arg: ArgumentDef) -> Self {
        self.args.push(arg);
        self
    }

    /// Attach an async resolver
    pub fn resolve<F, Fut>(mut self, resolver: F) -> Self
    where
        F: Fn(ResolveParams) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<JsonValue, FieldError>> + Send + 'static,
    {
        let resolver: Resolver =
            Arc::new(move |params| -> ResolverFuture { Box::pin(resolver(params)) });
        self.resolver = Some(resolver);
        self
    }

    /// Attach a resolver that completes without suspending
    pub fn resolve_sync<F>(mut self, resolver: F) -> Self
    where
        F: Fn(ResolveParams) -> Result<JsonValue, FieldError> + Send + Sync + 'static,
    {
        let resolver: Resolver = Arc::new(move |params| -> ResolverFuture {
            let result = resolver(params);
            Box::pin(async move { result })
        });
        self.resolver = Some(resolver);
        self
    }

    pub fn find_arg(&self, name: &str) -> Option<&ArgumentDef> {
        self.args.iter().find(|arg| arg.name == name)
    }
}

impl std::fmt::Debug for FieldDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("args", &self.args)
            .field("has_resolver", &self.resolver.is_some())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ObjectType {
    pub name: String,
    pub description: Option<String>,
    fields: Vec<FieldDef>,
}

impl ObjectType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn find_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/* ===================== Named Types ===================== */

#[derive(Debug, Clone)]
pub enum NamedType {
    Scalar(ScalarType),
    Enum(EnumType),
    Object(ObjectType),
}

impl NamedType {
    pub fn name(&self) -> &str {
        match self {
            NamedType::Scalar(scalar) => &scalar.name,
            NamedType::Enum(enum_type) => &enum_type.name,
            NamedType::Object(object) => &object.name,
        }
    }

    /// Scalars and enums have no sub-fields
    pub fn is_leaf(&self) -> bool {
        matches!(self, NamedType::Scalar(_) | NamedType::Enum(_))
    }

    /// Only leaf types may be used as variable and argument types
    pub fn is_input(&self) -> bool {
        self.is_leaf()
    }

    pub fn as_object(&self) -> Option<&ObjectType> {
        match self {
            NamedType::Object(object) => Some(object),
            _ => None,
        }
    }
}

impl From<ScalarType> for NamedType {
    fn from(scalar: ScalarType) -> Self {
        NamedType::Scalar(scalar)
    }
}

impl From<EnumType> for NamedType {
    fn from(enum_type: EnumType) -> Self {
        NamedType::Enum(enum_type)
    }
}

impl From<ObjectType> for NamedType {
    fn from(object: ObjectType) -> Self {
        NamedType::Object(object)
    }
}
