//! Tests for the document validation system

use super::*;
use crate::demo::star_wars_schema;
use crate::language::{parse_document, Source};

// ============================================================================
// Helper Functions
// ============================================================================

/// Parse source and run the built-in rules, returning every finding
fn validate(source: &str) -> Vec<ValidationError> {
    let schema = star_wars_schema().expect("demo schema should build");
    let document = parse_document(&Source::request(source)).expect("Parse should succeed");
    DocumentValidator::new().diagnostics(&schema, &document, &specified_rules())
}

/// Check if errors contain a specific rule
fn has_rule(errors: &[ValidationError], rule_id: &str) -> bool {
    errors.iter().any(|e| e.rule_id == rule_id)
}

/// Get errors for a specific rule
fn for_rule<'a>(errors: &'a [ValidationError], rule_id: &str) -> Vec<&'a ValidationError> {
    errors.iter().filter(|e| e.rule_id == rule_id).collect()
}

// ============================================================================
// Valid Documents
// ============================================================================

#[test]
fn test_valid_documents_pass_every_rule() {
    let sources = [
        "{ hero { name } }",
        "query HeroName($ep: Episode) { hero(episode: $ep) { name __typename } }",
        r#"
query Luke { human(id: "1000") { ...Names friends { ... on Character { id } } } }
fragment Names on Character { name appearsIn }
"#,
        "query Q($skip: Boolean!) { hero { name @skip(if: $skip) } }",
        r#"mutation { createReview(episode: JEDI, stars: 5) { stars } }"#,
    ];

    for source in sources {
        let errors = validate(source);
        assert!(errors.is_empty(), "{} -> {:?}", source, errors);
    }
}

// ============================================================================
// Operation Rules
// ============================================================================

#[test]
fn test_unique_operation_names() {
    let errors = validate("query A { hero { name } } query A { hero { id } }");

    let dupes = for_rule(&errors, "unique-operation-names");
    assert_eq!(dupes.len(), 1);
    assert_eq!(dupes[0].message, "There can be only one operation named \"A\".");
    assert_eq!(dupes[0].related.len(), 1);
}

#[test]
fn test_lone_anonymous_operation() {
    let errors = validate("{ hero { name } } query B { hero { id } }");
    assert_eq!(for_rule(&errors, "lone-anonymous-operation").len(), 1);

    let errors = validate("{ hero { name } }");
    assert!(!has_rule(&errors, "lone-anonymous-operation"));
}

#[test]
fn test_known_type_names() {
    let errors = validate(
        r#"
query Q($note: Text) { hero { ... on Starship { name } } }
fragment F on Planet { name }
"#,
    );

    let unknown: Vec<&str> = for_rule(&errors, "known-type-names")
        .iter()
        .map(|e| e.message.as_str())
        .collect();
    assert_eq!(
        unknown,
        [
            "Unknown type \"Text\".",
            "Unknown type \"Starship\".",
            "Unknown type \"Planet\"."
        ]
    );
}

// ============================================================================
// Fragment Rules
// ============================================================================

#[test]
fn test_unique_fragment_names() {
    let errors = validate(
        "{ hero { ...F } } fragment F on Character { name } fragment F on Character { id }",
    );
    assert_eq!(for_rule(&errors, "unique-fragment-names").len(), 1);
}

#[test]
fn test_known_fragment_names() {
    let errors = validate("{ hero { ...Missing } }");

    let unknown = for_rule(&errors, "known-fragment-names");
    assert_eq!(unknown.len(), 1);
    assert_eq!(unknown[0].message, "Unknown fragment \"Missing\".");
}

#[test]
fn test_no_unused_fragments() {
    let errors = validate(
        r#"
{ hero { ...Used } }
fragment Used on Character { ...Nested }
fragment Nested on Character { name }
fragment Unused on Character { id }
"#,
    );

    let unused = for_rule(&errors, "no-unused-fragments");
    assert_eq!(unused.len(), 1);
    assert_eq!(unused[0].message, "Fragment \"Unused\" is never used.");
}

#[test]
fn test_no_fragment_cycles() {
    let errors = validate(
        r#"
{ hero { ...A } }
fragment A on Character { ...B }
fragment B on Character { ...A }
"#,
    );

    let cycles = for_rule(&errors, "no-fragment-cycles");
    assert_eq!(cycles.len(), 1);
    assert_eq!(
        cycles[0].message,
        "Cannot spread fragment \"A\" within itself via B."
    );
}

#[test]
fn test_fragment_spreading_itself() {
    let errors = validate("{ hero { ...Me } } fragment Me on Character { name ...Me }");

    let cycles = for_rule(&errors, "no-fragment-cycles");
    assert_eq!(cycles.len(), 1);
    assert_eq!(
        cycles[0].message,
        "Cannot spread fragment \"Me\" within itself."
    );
}

// ============================================================================
// Field and Argument Rules
// ============================================================================

#[test]
fn test_fields_on_correct_type() {
    let errors = validate("{ unknownField }");

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].rule_id, "fields-on-correct-type");
    assert_eq!(
        errors[0].message,
        "Cannot query field \"unknownField\" on type \"Query\"."
    );
    assert_eq!(errors[0].span.start_col, 2);
}

#[test]
fn test_fields_checked_inside_fragments() {
    let errors = validate("{ hero { ...F } } fragment F on Character { starship }");

    let wrong = for_rule(&errors, "fields-on-correct-type");
    assert_eq!(wrong.len(), 1);
    assert!(wrong[0].message.contains("\"starship\" on type \"Character\""));
}

#[test]
fn test_scalar_leafs() {
    let errors = validate("{ hero { name { length } } }");
    let leafs = for_rule(&errors, "scalar-leafs");
    assert_eq!(leafs.len(), 1);
    assert!(leafs[0].message.contains("must not have a selection"));

    let errors = validate("{ hero }");
    let leafs = for_rule(&errors, "scalar-leafs");
    assert_eq!(leafs.len(), 1);
    assert_eq!(
        leafs[0].message,
        "Field \"hero\" of type \"Character\" must have a selection of subfields. Did you mean \"hero { ... }\"?"
    );
}

#[test]
fn test_known_argument_names() {
    let errors = validate(r#"{ hero(planet: "Tatooine") { name @include(if: true, unless: false) } }"#);

    let unknown: Vec<&str> = for_rule(&errors, "known-argument-names")
        .iter()
        .map(|e| e.message.as_str())
        .collect();
    assert_eq!(
        unknown,
        [
            "Unknown argument \"planet\" on field \"hero\" of type \"Query\".",
            "Unknown argument \"unless\" on directive \"@include\"."
        ]
    );
}

#[test]
fn test_provided_required_arguments() {
    let errors = validate("{ human { name @skip } }");

    let missing: Vec<&str> = for_rule(&errors, "provided-required-arguments")
        .iter()
        .map(|e| e.message.as_str())
        .collect();
    assert_eq!(
        missing,
        [
            "Field \"human\" argument \"id\" of type \"String!\" is required but not provided.",
            "Directive \"@skip\" argument \"if\" of type \"Boolean!\" is required but not provided."
        ]
    );
}

#[test]
fn test_known_directives() {
    let errors = validate("query Q @include(if: true) { hero @cached { name } }");

    let unknown: Vec<&str> = for_rule(&errors, "known-directives")
        .iter()
        .map(|e| e.message.as_str())
        .collect();
    assert_eq!(
        unknown,
        [
            "Directive \"include\" may not be used on QUERY.",
            "Unknown directive \"cached\"."
        ]
    );
}

// ============================================================================
// Variable Rules
// ============================================================================

#[test]
fn test_no_undefined_variables() {
    let errors = validate(
        r#"
query Find { human(id: $id) { ...F } }
fragment F on Character { name @include(if: $withName) }
"#,
    );

    let undefined: Vec<&str> = for_rule(&errors, "no-undefined-variables")
        .iter()
        .map(|e| e.message.as_str())
        .collect();
    assert_eq!(
        undefined,
        [
            "Variable \"$id\" is not defined by operation \"Find\".",
            "Variable \"$withName\" is not defined by operation \"Find\"."
        ]
    );
}

#[test]
fn test_no_unused_variables() {
    let errors = validate("query Hero($episode: Episode, $used: Boolean!) { hero { name @skip(if: $used) } }");

    let unused = for_rule(&errors, "no-unused-variables");
    assert_eq!(unused.len(), 1);
    assert_eq!(
        unused[0].message,
        "Variable \"$episode\" is never used in operation \"Hero\"."
    );
}

#[test]
fn test_variables_used_through_fragments_count() {
    let errors = validate(
        r#"
query Q($id: String!) { ...Lookup }
fragment Lookup on Query { human(id: $id) { name } }
"#,
    );
    assert!(!has_rule(&errors, "no-unused-variables"));
    assert!(!has_rule(&errors, "no-undefined-variables"));
}

// ============================================================================
// Validator
// ============================================================================

struct NoHeroWarning;

impl ValidationRule for NoHeroWarning {
    fn id(&self) -> &'static str {
        "no-hero"
    }

    fn description(&self) -> &'static str {
        "Warns about the hero field"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationError> {
        let mut found = Vec::new();
        ctx.visit_fields(|visit| {
            if visit.field.name == "hero" {
                found.push(ValidationError::warning(visit.field.span, "hero used", self.id()));
            }
        });
        found
    }
}

#[test]
fn test_warnings_do_not_invalidate() {
    let schema = star_wars_schema().expect("demo schema should build");
    let document = parse_document(&Source::request("{ hero { name } }")).expect("parse");
    let rules: Vec<RuleRef> = vec![Arc::new(NoHeroWarning)];

    let result = validate_document(&schema, &document, &rules);
    assert!(result.is_valid);
    assert!(result.errors.is_empty());

    let all = DocumentValidator::new().diagnostics(&schema, &document, &rules);
    assert_eq!(all.len(), 1);
    assert!(!all[0].is_error());
}

#[test]
fn test_errors_convert_with_locations() {
    let schema = star_wars_schema().expect("demo schema should build");
    let document = parse_document(&Source::request("query A { hero { name } }\nquery A { hero { id } }"))
        .expect("parse");

    let result = validate_document(&schema, &document, &specified_rules());
    assert!(!result.is_valid);
    assert_eq!(result.errors.len(), 1);
    let locations = &result.errors[0].locations;
    assert_eq!(locations.len(), 2);
    assert_eq!((locations[0].line, locations[0].column), (2, 1));
    assert_eq!((locations[1].line, locations[1].column), (1, 1));
}

#[test]
fn test_specified_rules_order() {
    let ids: Vec<&str> = specified_rules().iter().map(|r| r.id()).collect();
    assert_eq!(
        ids,
        [
            "unique-operation-names",
            "lone-anonymous-operation",
            "known-type-names",
            "unique-fragment-names",
            "known-fragment-names",
            "no-unused-fragments",
            "no-fragment-cycles",
            "fields-on-correct-type",
            "scalar-leafs",
            "known-argument-names",
            "provided-required-arguments",
            "known-directives",
            "no-undefined-variables",
            "no-unused-variables",
        ]
    );
    assert!(specified_rules().iter().all(|r| !r.description().is_empty()));
}
