//! PEST-based parser for GraphQL executable documents
//!
//! Produces the AST in [`super::ast`], with span information for error reporting.

use pest::error::{ErrorVariant, InputLocation};
use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

use super::ast::{
    Argument, Definition, Directive, Document, Field, FragmentDefinition, FragmentSpread,
    InlineFragment, NamedType, OperationDefinition, OperationType, Selection, SelectionSet, Span,
    Type, Value, VariableDefinition,
};
use super::{DocumentParser, Source};

/* ===================== PEST Parser ===================== */

#[derive(Parser)]
#[grammar = "language/graphql.pest"]
struct GraphQLGrammar;

/// The default [`DocumentParser`]
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphQLParser;

impl DocumentParser for GraphQLParser {
    fn parse(&self, source: &Source) -> ParseResult<Document> {
        parse_document(source)
    }
}

/* ===================== Error Types ===================== */

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// The text does not match the grammar
    #[error("{message}")]
    Syntax { message: String, span: Span },
    /// The text matched but a node could not be built (e.g. an out-of-range literal)
    #[error("{message}")]
    Build { message: String, span: Option<Span> },
}

impl ParseError {
    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        ParseError::Syntax {
            message: message.into(),
            span,
        }
    }

    pub fn build(message: impl Into<String>, span: Option<Span>) -> Self {
        ParseError::Build {
            message: message.into(),
            span,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::Syntax { span, .. } => Some(*span),
            ParseError::Build { span, .. } => *span,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ParseError::Syntax { message, .. } => message,
            ParseError::Build { message, .. } => message,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/* ===================== Span Helpers ===================== */

/// Byte offsets of line starts, for offset -> (line, column) lookups
struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (idx, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(idx + 1);
            }
        }
        Self { line_starts }
    }

    /// Convert byte offset to (line, column), both 0-indexed
    fn line_col(&self, source: &str, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next.saturating_sub(1),
        };
        let line_start = self.line_starts[line];
        let col = source
            .get(line_start..offset)
            .map(|text| text.chars().count())
            .unwrap_or(0);
        (line, col)
    }
}

fn syntax_error(err: pest::error::Error<Rule>, source: &Source, lines: &LineIndex) -> ParseError {
    let offset = match err.location {
        InputLocation::Pos(pos) => pos,
        InputLocation::Span((start, _)) => start,
    };
    let (line, col) = lines.line_col(&source.body, offset);
    let found = describe_found(source.body.get(offset..).unwrap_or(""));

    let detail = match &err.variant {
        ErrorVariant::ParsingError { positives, .. } => {
            let mut expected: Vec<&'static str> = Vec::new();
            for rule in positives {
                let label = describe_rule(rule);
                if !expected.contains(&label) {
                    expected.push(label);
                }
            }
            if expected.is_empty() {
                format!("Unexpected {}", found)
            } else {
                format!("Expected {}, found {}", expected.join(" or "), found)
            }
        }
        ErrorVariant::CustomError { message } => message.clone(),
    };

    ParseError::syntax(
        format!("Syntax Error {} ({}:{}) {}", source.name, line + 1, col + 1, detail),
        Span::new(offset, offset, line, col, line, col),
    )
}

fn describe_found(rest: &str) -> String {
    let mut chars = rest.chars();
    match chars.next() {
        None => "<EOF>".to_string(),
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            let word: String = rest
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
                .collect();
            format!("Name \"{}\"", word)
        }
        Some(c) => format!("\"{}\"", c),
    }
}

fn describe_rule(rule: &Rule) -> &'static str {
    match rule {
        Rule::name
        | Rule::field
        | Rule::alias
        | Rule::fragment_name
        | Rule::named_type
        | Rule::argument
        | Rule::object_field => "Name",
        Rule::fragment_spread | Rule::inline_fragment => "\"...\"",
        Rule::selection_set => "\"{\"",
        Rule::operation_definition | Rule::fragment_definition => "Definition",
        Rule::operation_type => "operation type",
        Rule::kw_fragment => "\"fragment\"",
        Rule::type_condition | Rule::kw_on => "\"on\"",
        Rule::value
        | Rule::variable
        | Rule::int_value
        | Rule::float_value
        | Rule::string_value
        | Rule::boolean_value
        | Rule::null_value
        | Rule::enum_value
        | Rule::list_value
        | Rule::object_value => "Value",
        Rule::type_ref | Rule::non_null_type | Rule::list_type => "Type",
        Rule::variable_definitions | Rule::variable_definition => "Variable",
        Rule::directives | Rule::directive => "\"@\"",
        Rule::arguments => "\"(\"",
        Rule::default_value => "\"=\"",
        Rule::EOI => "<EOF>",
        _ => "token",
    }
}

/* ===================== Nesting Limit ===================== */

/// Deepest `{`/`[`/`(` nesting accepted in a document.
///
/// Parsing, validation and execution all recurse once per level, so this
/// bounds the stack they use.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Reject over-nested text before it reaches the recursive grammar.
/// Brackets inside strings and comments are ignored.
fn check_nesting(source: &Source, lines: &LineIndex) -> ParseResult<()> {
    let body = source.body.as_bytes();
    let mut depth = 0usize;
    let mut idx = 0;

    while idx < body.len() {
        match body[idx] {
            b'#' => {
                while idx < body.len() && !matches!(body[idx], b'\n' | b'\r') {
                    idx += 1;
                }
                continue;
            }
            b'"' if body[idx..].starts_with(b"\"\"\"") => {
                idx += 3;
                while idx < body.len() && !body[idx..].starts_with(b"\"\"\"") {
                    idx += if body[idx..].starts_with(b"\\\"\"\"") { 4 } else { 1 };
                }
                idx += 3;
                continue;
            }
            b'"' => {
                idx += 1;
                while idx < body.len() && !matches!(body[idx], b'"' | b'\n' | b'\r') {
                    idx += if body[idx] == b'\\' { 2 } else { 1 };
                }
                idx += 1;
                continue;
            }
            b'{' | b'[' | b'(' => {
                depth += 1;
                if depth > MAX_NESTING_DEPTH {
                    let (line, col) = lines.line_col(&source.body, idx);
                    return Err(ParseError::syntax(
                        format!(
                            "Syntax Error {} ({}:{}) Document is nested too deeply, limit is {}",
                            source.name,
                            line + 1,
                            col + 1,
                            MAX_NESTING_DEPTH
                        ),
                        Span::new(idx, idx + 1, line, col, line, col + 1),
                    ));
                }
            }
            b'}' | b']' | b')' => depth = depth.saturating_sub(1),
            _ => {}
        }
        idx += 1;
    }
    Ok(())
}

/* ===================== Public API ===================== */

/// Parse a GraphQL request document
pub fn parse_document(source: &Source) -> ParseResult<Document> {
    let lines = LineIndex::new(&source.body);
    check_nesting(source, &lines)?;

    let mut pairs = GraphQLGrammar::parse(Rule::document, &source.body)
        .map_err(|err| syntax_error(err, source, &lines))?;

    let document = pairs
        .next()
        .ok_or_else(|| ParseError::build("Parser produced no document", None))?;

    let builder = Builder {
        source: &source.body,
        lines: &lines,
    };
    builder.document(document)
}

/* ===================== AST Builder ===================== */

struct Builder<'s> {
    source: &'s str,
    lines: &'s LineIndex,
}

fn expect_next<'i>(pairs: &mut Pairs<'i, Rule>, span: Span, what: &str) -> ParseResult<Pair<'i, Rule>> {
    pairs
        .next()
        .ok_or_else(|| ParseError::build(format!("Expected {} in parse tree", what), Some(span)))
}

fn unexpected(pair: &Pair<Rule>, span: Span, context: &str) -> ParseError {
    ParseError::build(
        format!("Unexpected {} content: {:?}", context, pair.as_rule()),
        Some(span),
    )
}

impl<'s> Builder<'s> {
    fn span(&self, pair: &Pair<Rule>) -> Span {
        let pest_span = pair.as_span();
        let (start_line, start_col) = self.lines.line_col(self.source, pest_span.start());
        let (end_line, end_col) = self.lines.line_col(self.source, pest_span.end());
        Span::new(
            pest_span.start(),
            pest_span.end(),
            start_line,
            start_col,
            end_line,
            end_col,
        )
    }

    fn document(&self, pair: Pair<Rule>) -> ParseResult<Document> {
        let span = self.span(&pair);
        let mut definitions = Vec::new();

        for child in pair.into_inner() {
            match child.as_rule() {
                Rule::operation_definition => {
                    definitions.push(Definition::Operation(self.operation(child)?))
                }
                Rule::fragment_definition => {
                    definitions.push(Definition::Fragment(self.fragment_definition(child)?))
                }
                Rule::EOI => {}
                _ => return Err(unexpected(&child, span, "document")),
            }
        }

        Ok(Document { definitions, span })
    }

    fn operation(&self, pair: Pair<Rule>) -> ParseResult<OperationDefinition> {
        let span = self.span(&pair);
        let mut operation = OperationType::Query;
        let mut name = None;
        let mut variable_definitions = Vec::new();
        let mut directives = Vec::new();
        let mut selection_set = None;

        for child in pair.into_inner() {
            match child.as_rule() {
                Rule::operation_type => {
                    operation = match child.as_str() {
                        "query" => OperationType::Query,
                        "mutation" => OperationType::Mutation,
                        "subscription" => OperationType::Subscription,
                        other => {
                            return Err(ParseError::build(
                                format!("Unknown operation type: {}", other),
                                Some(self.span(&child)),
                            ))
                        }
                    }
                }
                Rule::name => name = Some(child.as_str().to_string()),
                Rule::variable_definitions => {
                    variable_definitions = child
                        .into_inner()
                        .map(|def| self.variable_definition(def))
                        .collect::<ParseResult<_>>()?;
                }
                Rule::directives => directives = self.directives(child)?,
                Rule::selection_set => selection_set = Some(self.selection_set(child)?),
                _ => return Err(unexpected(&child, span, "operation")),
            }
        }

        let selection_set = selection_set.ok_or_else(|| {
            ParseError::build("Operation is missing a selection set", Some(span))
        })?;

        Ok(OperationDefinition {
            operation,
            name,
            variable_definitions,
            directives,
            selection_set,
            span,
        })
    }

    fn fragment_definition(&self, pair: Pair<Rule>) -> ParseResult<FragmentDefinition> {
        let span = self.span(&pair);
        let mut name = None;
        let mut type_condition = None;
        let mut directives = Vec::new();
        let mut selection_set = None;

        for child in pair.into_inner() {
            match child.as_rule() {
                Rule::kw_fragment => {}
                Rule::fragment_name => name = Some(child.as_str().to_string()),
                Rule::type_condition => type_condition = Some(self.type_condition(child)?),
                Rule::directives => directives = self.directives(child)?,
                Rule::selection_set => selection_set = Some(self.selection_set(child)?),
                _ => return Err(unexpected(&child, span, "fragment")),
            }
        }

        match (name, type_condition, selection_set) {
            (Some(name), Some(type_condition), Some(selection_set)) => Ok(FragmentDefinition {
                name,
                type_condition,
                directives,
                selection_set,
                span,
            }),
            _ => Err(ParseError::build("Incomplete fragment definition", Some(span))),
        }
    }

    fn type_condition(&self, pair: Pair<Rule>) -> ParseResult<NamedType> {
        let span = self.span(&pair);
        let named = pair
            .into_inner()
            .find(|child| child.as_rule() == Rule::named_type)
            .ok_or_else(|| ParseError::build("Type condition is missing a type", Some(span)))?;
        Ok(self.named_type(&named))
    }

    fn named_type(&self, pair: &Pair<Rule>) -> NamedType {
        NamedType {
            name: pair.as_str().to_string(),
            span: self.span(pair),
        }
    }

    fn selection_set(&self, pair: Pair<Rule>) -> ParseResult<SelectionSet> {
        let span = self.span(&pair);
        let items = pair
            .into_inner()
            .map(|child| match child.as_rule() {
                Rule::field => self.field(child).map(Selection::Field),
                Rule::fragment_spread => self.fragment_spread(child).map(Selection::FragmentSpread),
                Rule::inline_fragment => self.inline_fragment(child).map(Selection::InlineFragment),
                _ => Err(unexpected(&child, span, "selection set")),
            })
            .collect::<ParseResult<Vec<_>>>()?;

        Ok(SelectionSet { items, span })
    }

    fn field(&self, pair: Pair<Rule>) -> ParseResult<Field> {
        let span = self.span(&pair);
        let mut alias = None;
        let mut name = None;
        let mut arguments = Vec::new();
        let mut directives = Vec::new();
        let mut selection_set = SelectionSet::default();

        for child in pair.into_inner() {
            match child.as_rule() {
                Rule::alias => {
                    let child_span = self.span(&child);
                    let alias_name = expect_next(&mut child.into_inner(), child_span, "alias name")?;
                    alias = Some(alias_name.as_str().to_string());
                }
                Rule::name => name = Some(child.as_str().to_string()),
                Rule::arguments => arguments = self.arguments(child)?,
                Rule::directives => directives = self.directives(child)?,
                Rule::selection_set => selection_set = self.selection_set(child)?,
                _ => return Err(unexpected(&child, span, "field")),
            }
        }

        let name = name.ok_or_else(|| ParseError::build("Field is missing a name", Some(span)))?;

        Ok(Field {
            alias,
            name,
            arguments,
            directives,
            selection_set,
            span,
        })
    }

    fn fragment_spread(&self, pair: Pair<Rule>) -> ParseResult<FragmentSpread> {
        let span = self.span(&pair);
        let mut name = None;
        let mut directives = Vec::new();

        for child in pair.into_inner() {
            match child.as_rule() {
                Rule::fragment_name => name = Some(child.as_str().to_string()),
                Rule::directives => directives = self.directives(child)?,
                _ => return Err(unexpected(&child, span, "fragment spread")),
            }
        }

        let name =
            name.ok_or_else(|| ParseError::build("Fragment spread is missing a name", Some(span)))?;
        Ok(FragmentSpread {
            name,
            directives,
            span,
        })
    }

    fn inline_fragment(&self, pair: Pair<Rule>) -> ParseResult<InlineFragment> {
        let span = self.span(&pair);
        let mut type_condition = None;
        let mut directives = Vec::new();
        let mut selection_set = None;

        for child in pair.into_inner() {
            match child.as_rule() {
                Rule::type_condition => type_condition = Some(self.type_condition(child)?),
                Rule::directives => directives = self.directives(child)?,
                Rule::selection_set => selection_set = Some(self.selection_set(child)?),
                _ => return Err(unexpected(&child, span, "inline fragment")),
            }
        }

        let selection_set = selection_set.ok_or_else(|| {
            ParseError::build("Inline fragment is missing a selection set", Some(span))
        })?;
        Ok(InlineFragment {
            type_condition,
            directives,
            selection_set,
            span,
        })
    }

    fn arguments(&self, pair: Pair<Rule>) -> ParseResult<Vec<Argument>> {
        pair.into_inner()
            .map(|arg| {
                let span = self.span(&arg);
                let mut inner = arg.into_inner();
                let name = expect_next(&mut inner, span, "argument name")?;
                let value = expect_next(&mut inner, span, "argument value")?;
                Ok(Argument {
                    name: name.as_str().to_string(),
                    value: self.value(value)?,
                    span,
                })
            })
            .collect()
    }

    fn directives(&self, pair: Pair<Rule>) -> ParseResult<Vec<Directive>> {
        pair.into_inner()
            .map(|directive| {
                let span = self.span(&directive);
                let mut inner = directive.into_inner();
                let name = expect_next(&mut inner, span, "directive name")?;
                let arguments = match inner.next() {
                    Some(args) => self.arguments(args)?,
                    None => Vec::new(),
                };
                Ok(Directive {
                    name: name.as_str().to_string(),
                    arguments,
                    span,
                })
            })
            .collect()
    }

    fn variable_definition(&self, pair: Pair<Rule>) -> ParseResult<VariableDefinition> {
        let span = self.span(&pair);
        let mut name = None;
        let mut var_type = None;
        let mut default_value = None;

        for child in pair.into_inner() {
            match child.as_rule() {
                Rule::variable => name = Some(self.variable_name(child)?),
                Rule::type_ref => var_type = Some(self.type_node(child)?),
                Rule::default_value => {
                    let child_span = self.span(&child);
                    let value = expect_next(&mut child.into_inner(), child_span, "default value")?;
                    default_value = Some(self.value(value)?);
                }
                // Variable directives are accepted but carry no meaning here
                Rule::directives => {}
                _ => return Err(unexpected(&child, span, "variable definition")),
            }
        }

        match (name, var_type) {
            (Some(name), Some(var_type)) => Ok(VariableDefinition {
                name,
                var_type,
                default_value,
                span,
            }),
            _ => Err(ParseError::build("Incomplete variable definition", Some(span))),
        }
    }

    fn variable_name(&self, pair: Pair<Rule>) -> ParseResult<String> {
        let span = self.span(&pair);
        let name = expect_next(&mut pair.into_inner(), span, "variable name")?;
        Ok(name.as_str().to_string())
    }

    fn type_node(&self, pair: Pair<Rule>) -> ParseResult<Type> {
        let span = self.span(&pair);
        match pair.as_rule() {
            Rule::type_ref => {
                let inner = expect_next(&mut pair.into_inner(), span, "type")?;
                self.type_node(inner)
            }
            Rule::non_null_type => {
                let inner = expect_next(&mut pair.into_inner(), span, "type")?;
                Ok(Type::NonNull {
                    inner: Box::new(self.type_node(inner)?),
                })
            }
            Rule::list_type => {
                let inner = expect_next(&mut pair.into_inner(), span, "list item type")?;
                Ok(Type::List {
                    inner: Box::new(self.type_node(inner)?),
                })
            }
            Rule::named_type => Ok(Type::Named {
                name: pair.as_str().to_string(),
            }),
            _ => Err(unexpected(&pair, span, "type")),
        }
    }

    fn value(&self, pair: Pair<Rule>) -> ParseResult<Value> {
        let span = self.span(&pair);
        match pair.as_rule() {
            Rule::value => {
                let inner = expect_next(&mut pair.into_inner(), span, "value")?;
                self.value(inner)
            }
            Rule::variable => Ok(Value::Variable(self.variable_name(pair)?)),
            Rule::int_value => pair.as_str().parse::<i64>().map(Value::Int).map_err(|_| {
                ParseError::build(
                    format!("Int cannot represent value: {}", pair.as_str()),
                    Some(span),
                )
            }),
            Rule::float_value => pair.as_str().parse::<f64>().map(Value::Float).map_err(|_| {
                ParseError::build(
                    format!("Float cannot represent value: {}", pair.as_str()),
                    Some(span),
                )
            }),
            Rule::string_value => {
                let inner = expect_next(&mut pair.into_inner(), span, "string")?;
                let is_block = inner.as_rule() == Rule::block_string;
                let raw = inner
                    .into_inner()
                    .next()
                    .map(|chars| chars.as_str())
                    .unwrap_or("");
                if is_block {
                    Ok(Value::String(block_string_value(raw)))
                } else {
                    unescape(raw, span).map(Value::String)
                }
            }
            Rule::boolean_value => Ok(Value::Boolean(pair.as_str() == "true")),
            Rule::null_value => Ok(Value::Null),
            Rule::enum_value => Ok(Value::Enum(pair.as_str().to_string())),
            Rule::list_value => pair
                .into_inner()
                .map(|item| self.value(item))
                .collect::<ParseResult<Vec<_>>>()
                .map(Value::List),
            Rule::object_value => pair
                .into_inner()
                .map(|field| {
                    let field_span = self.span(&field);
                    let mut inner = field.into_inner();
                    let name = expect_next(&mut inner, field_span, "object field name")?;
                    let value = expect_next(&mut inner, field_span, "object field value")?;
                    Ok((name.as_str().to_string(), self.value(value)?))
                })
                .collect::<ParseResult<Vec<_>>>()
                .map(Value::Object),
            _ => Err(unexpected(&pair, span, "value")),
        }
    }
}

/* ===================== String Literals ===================== */

fn read_hex4(chars: &mut std::str::Chars<'_>) -> Option<u32> {
    let hex: String = chars.by_ref().take(4).collect();
    if hex.len() != 4 {
        return None;
    }
    u32::from_str_radix(&hex, 16).ok()
}

/// Resolve escape sequences in a quoted string body
fn unescape(raw: &str, span: Span) -> ParseResult<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('/') => out.push('/'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('u') => {
                let code = read_hex4(&mut chars).ok_or_else(|| {
                    ParseError::build("Invalid unicode escape sequence", Some(span))
                })?;
                let mut decoded = char::from_u32(code);
                if (0xD800..0xDC00).contains(&code) {
                    // Join a UTF-16 surrogate pair written as two escapes
                    let mut lookahead = chars.clone();
                    if lookahead.next() == Some('\\') && lookahead.next() == Some('u') {
                        if let Some(low) = read_hex4(&mut lookahead) {
                            if (0xDC00..0xE000).contains(&low) {
                                let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                                decoded = char::from_u32(combined);
                                chars = lookahead;
                            }
                        }
                    }
                }
                out.push(decoded.unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            _ => {
                return Err(ParseError::build("Invalid escape sequence", Some(span)));
            }
        }
    }

    Ok(out)
}

/// Strip the common indentation and blank edge lines of a block string
fn block_string_value(raw: &str) -> String {
    let raw = raw.replace("\\\"\"\"", "\"\"\"");
    let lines: Vec<&str> = raw.lines().collect();

    let common_indent = lines
        .iter()
        .skip(1)
        .filter_map(|line| {
            let indent = line.len() - line.trim_start_matches(|c| c == ' ' || c == '\t').len();
            (indent < line.len()).then_some(indent)
        })
        .min();

    let mut out: Vec<&str> = lines
        .iter()
        .enumerate()
        .map(|(idx, line)| match common_indent {
            Some(indent) if idx > 0 => &line[indent.min(line.len())..],
            _ => line,
        })
        .collect();

    while out.first().is_some_and(|line| line.trim().is_empty()) {
        out.remove(0);
    }
    while out.last().is_some_and(|line| line.trim().is_empty()) {
        out.pop();
    }

    out.join("\n")
}
