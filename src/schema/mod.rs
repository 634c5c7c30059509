//! Schema / type system
//!
//! A [`Schema`] is an immutable, cheaply cloneable set of named types with a
//! query root and an optional mutation root. Each built schema gets a unique
//! identity ([`Schema::id`]) that the document cache uses to keep trees parsed
//! for one schema apart from trees parsed for another.
//!
//! Identity is per build, not per definition: two builds of the same types
//! never share cache entries. Build a schema once at startup and clone it
//! into each request.
//!
//! # Example
//!
//! ```ignore
//! let query = ObjectType::new("Query").field(
//!     FieldDef::new("greeting", TypeRef::named("String"))
//!         .resolve_sync(|_| Ok(json!("hello"))),
//! );
//! let schema = Schema::builder(query).build()?;
//! ```

mod resolver;
mod types;

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::language::ast::OperationType;

pub use resolver::{FieldError, ResolveParams, Resolver, ResolverFuture};
pub(crate) use types::literal_to_json;
pub use types::{
    ArgumentDef, EnumType, FieldDef, NamedType, ObjectType, ScalarKind, ScalarType, TypeRef,
};

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Schema must contain unique named types but contains multiple types named \"{0}\".")]
    DuplicateType(String),
    #[error("Type \"{type_name}\" referenced by {referenced_by} is not defined.")]
    UnknownType {
        type_name: String,
        referenced_by: String,
    },
    #[error("The type of {argument} must be an input type but got: {type_name}.")]
    InvalidArgumentType { argument: String, type_name: String },
    #[error("Type {0} must define one or more fields.")]
    EmptyObject(String),
}

struct SchemaInner {
    id: Uuid,
    query: ObjectType,
    mutation: Option<ObjectType>,
    types: HashMap<String, NamedType>,
}

/// The static type definitions requests are validated and executed against
///
/// Cloning is an `Arc` bump and keeps the identity; [`SchemaBuilder::build`]
/// always assigns a fresh one, so rebuilding per request defeats the
/// document cache.
#[derive(Clone)]
pub struct Schema {
    inner: Arc<SchemaInner>,
}

impl Schema {
    /// Start building a schema around its query root type
    pub fn builder(query: ObjectType) -> SchemaBuilder {
        SchemaBuilder {
            query,
            mutation: None,
            types: Vec::new(),
        }
    }

    /// Identity assigned when the schema was built; clones share it
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn query_type(&self) -> &ObjectType {
        &self.inner.query
    }

    pub fn mutation_type(&self) -> Option<&ObjectType> {
        self.inner.mutation.as_ref()
    }

    /// Root type for an operation; subscriptions have none
    pub fn root_type(&self, operation: OperationType) -> Option<&ObjectType> {
        match operation {
            OperationType::Query => Some(self.query_type()),
            OperationType::Mutation => self.mutation_type(),
            OperationType::Subscription => None,
        }
    }

    pub fn get_type(&self, name: &str) -> Option<&NamedType> {
        self.inner.types.get(name)
    }

    pub fn object_type(&self, name: &str) -> Option<&ObjectType> {
        self.get_type(name).and_then(NamedType::as_object)
    }

    pub fn types(&self) -> impl Iterator<Item = &NamedType> {
        self.inner.types.values()
    }
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("id", &self.inner.id)
            .field("query", &self.inner.query.name)
            .field(
                "mutation",
                &self.inner.mutation.as_ref().map(|m| m.name.as_str()),
            )
            .field("types", &self.inner.types.len())
            .finish()
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Schema {}

/// Builder for [`Schema`]; checks type references when finished
pub struct SchemaBuilder {
    query: ObjectType,
    mutation: Option<ObjectType>,
    types: Vec<NamedType>,
}

impl SchemaBuilder {
    pub fn mutation(mut self, mutation: ObjectType) -> Self {
        self.mutation = Some(mutation);
        self
    }

    /// Register a type that is reachable only through field types
    pub fn register(mut self, named: impl Into<NamedType>) -> Self {
        self.types.push(named.into());
        self
    }

    /// Check the types and assign a new identity
    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut types: HashMap<String, NamedType> = ScalarType::builtins()
            .into_iter()
            .map(|scalar| (scalar.name.clone(), NamedType::Scalar(scalar)))
            .collect();

        let mut declared: Vec<NamedType> = vec![NamedType::Object(self.query.clone())];
        if let Some(mutation) = &self.mutation {
            declared.push(NamedType::Object(mutation.clone()));
        }
        declared.extend(self.types);

        for named in declared {
            let name = named.name().to_string();
            if types.contains_key(&name) {
                return Err(SchemaError::DuplicateType(name));
            }
            types.insert(name, named);
        }

        for named in types.values() {
            if let NamedType::Object(object) = named {
                check_object(object, &types)?;
            }
        }

        Ok(Schema {
            inner: Arc::new(SchemaInner {
                id: Uuid::new_v4(),
                query: self.query,
                mutation: self.mutation,
                types,
            }),
        })
    }
}

fn check_object(object: &ObjectType, types: &HashMap<String, NamedType>) -> Result<(), SchemaError> {
    if object.fields().is_empty() {
        return Err(SchemaError::EmptyObject(object.name.clone()));
    }

    for field in object.fields() {
        let coordinate = format!("{}.{}", object.name, field.name);
        if !types.contains_key(field.ty.base_name()) {
            return Err(SchemaError::UnknownType {
                type_name: field.ty.base_name().to_string(),
                referenced_by: coordinate,
            });
        }

        for arg in &field.args {
            let argument = format!("{}({}:)", coordinate, arg.name);
            match types.get(arg.ty.base_name()) {
                None => {
                    return Err(SchemaError::UnknownType {
                        type_name: arg.ty.base_name().to_string(),
                        referenced_by: argument,
                    })
                }
                Some(named) if !named.is_input() => {
                    return Err(SchemaError::InvalidArgumentType {
                        argument,
                        type_name: arg.ty.to_string(),
                    })
                }
                Some(_) => {}
            }
        }
    }

    Ok(())
}
