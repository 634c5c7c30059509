//! Abstract Syntax Tree node types for GraphQL executable documents

use serde::{Deserialize, Serialize};

/// Source location span for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Span {
    /// Start byte offset
    pub start: usize,
    /// End byte offset
    pub end: usize,
    /// Start line (0-indexed)
    pub start_line: usize,
    /// Start column (0-indexed)
    pub start_col: usize,
    /// End line (0-indexed)
    pub end_line: usize,
    /// End column (0-indexed)
    pub end_col: usize,
}

impl Span {
    pub fn new(
        start: usize,
        end: usize,
        start_line: usize,
        start_col: usize,
        end_line: usize,
        end_col: usize,
    ) -> Self {
        Self {
            start,
            end,
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }
}

/* ===================== Document ===================== */

/// A parsed request document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub definitions: Vec<Definition>,
    #[serde(default)]
    pub span: Span,
}

impl Document {
    /// All operation definitions, in document order
    pub fn operations(&self) -> impl Iterator<Item = &OperationDefinition> {
        self.definitions.iter().filter_map(|def| match def {
            Definition::Operation(op) => Some(op),
            Definition::Fragment(_) => None,
        })
    }

    /// All fragment definitions, in document order
    pub fn fragments(&self) -> impl Iterator<Item = &FragmentDefinition> {
        self.definitions.iter().filter_map(|def| match def {
            Definition::Fragment(frag) => Some(frag),
            Definition::Operation(_) => None,
        })
    }

    /// Find the first fragment with the given name
    pub fn fragment(&self, name: &str) -> Option<&FragmentDefinition> {
        self.fragments().find(|frag| frag.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum Definition {
    Operation(OperationDefinition),
    Fragment(FragmentDefinition),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationType::Query => write!(f, "query"),
            OperationType::Mutation => write!(f, "mutation"),
            OperationType::Subscription => write!(f, "subscription"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationDefinition {
    pub operation: OperationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variable_definitions: Vec<VariableDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<Directive>,
    pub selection_set: SelectionSet,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentDefinition {
    pub name: String,
    pub type_condition: NamedType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<Directive>,
    pub selection_set: SelectionSet,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDefinition {
    pub name: String,
    pub var_type: Type,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub span: Span,
}

/* ===================== Selections ===================== */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SelectionSet {
    pub items: Vec<Selection>,
    #[serde(default)]
    pub span: Span,
}

impl SelectionSet {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum Selection {
    Field(Field),
    FragmentSpread(FragmentSpread),
    InlineFragment(InlineFragment),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<Argument>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<Directive>,
    #[serde(default)]
    pub selection_set: SelectionSet,
    #[serde(default)]
    pub span: Span,
}

impl Field {
    /// The key this field occupies in the response object
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn argument(&self, name: &str) -> Option<&Argument> {
        self.arguments.iter().find(|arg| arg.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentSpread {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<Directive>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineFragment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_condition: Option<NamedType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<Directive>,
    pub selection_set: SelectionSet,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    pub name: String,
    pub value: Value,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Directive {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<Argument>,
    #[serde(default)]
    pub span: Span,
}

impl Directive {
    pub fn argument(&self, name: &str) -> Option<&Argument> {
        self.arguments.iter().find(|arg| arg.name == name)
    }
}

/* ===================== Types ===================== */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedType {
    pub name: String,
    #[serde(default)]
    pub span: Span,
}

/// Type reference as written in a variable definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum Type {
    Named { name: String },
    List { inner: Box<Type> },
    NonNull { inner: Box<Type> },
}

impl Type {
    /// The name of the innermost named type
    pub fn base_name(&self) -> &str {
        match self {
            Type::Named { name } => name,
            Type::List { inner } | Type::NonNull { inner } => inner.base_name(),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, Type::NonNull { .. })
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Named { name } => write!(f, "{}", name),
            Type::List { inner } => write!(f, "[{}]", inner),
            Type::NonNull { inner } => write!(f, "{}!", inner),
        }
    }
}

/* ===================== Values ===================== */

/// Literal or variable value appearing in arguments and defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v")]
pub enum Value {
    Variable(String),
    Int(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,
    Enum(String),
    List(Vec<Value>),
    Object(Vec<(String, Value)>),
}

impl Value {
    /// Visit every variable referenced by this value, including nested ones
    pub fn variables(&self) -> Vec<&str> {
        let mut names = Vec::new();
        collect_variables(self, &mut names);
        names
    }
}

fn collect_variables<'a>(value: &'a Value, names: &mut Vec<&'a str>) {
    match value {
        Value::Variable(name) => names.push(name),
        Value::List(items) => {
            for item in items {
                collect_variables(item, names);
            }
        }
        Value::Object(fields) => {
            for (_, item) in fields {
                collect_variables(item, names);
            }
        }
        Value::Int(_)
        | Value::Float(_)
        | Value::String(_)
        | Value::Boolean(_)
        | Value::Null
        | Value::Enum(_) => {}
    }
}
