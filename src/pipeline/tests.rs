//! Tests for request orchestration and the document cache

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use super::*;
use crate::demo::star_wars_schema;
use crate::language::ParseResult;
use crate::schema::{FieldDef, ObjectType, TypeRef};
use crate::validation::{ValidationContext, ValidationError, ValidationRule};

// ============================================================================
// Counting Collaborators
// ============================================================================

#[derive(Default)]
struct CountingParser {
    calls: AtomicUsize,
}

impl DocumentParser for CountingParser {
    fn parse(&self, source: &Source) -> ParseResult<Document> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        GraphQLParser.parse(source)
    }
}

#[derive(Default)]
struct CountingValidator {
    calls: AtomicUsize,
    rule_ids: parking_lot::Mutex<Vec<&'static str>>,
}

impl Validator for CountingValidator {
    fn validate(&self, schema: &Schema, document: &Document, rules: &[RuleRef]) -> ValidationResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.rule_ids.lock() = rules.iter().map(|r| r.id()).collect();
        DocumentValidator::new().validate(schema, document, rules)
    }
}

#[derive(Default)]
struct CountingExecutor {
    calls: AtomicUsize,
}

#[async_trait]
impl Executor for CountingExecutor {
    async fn execute(&self, params: ExecuteParams) -> QueryResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        DefaultExecutor::new().execute(params).await
    }
}

struct Mocks {
    parser: Arc<CountingParser>,
    validator: Arc<CountingValidator>,
    executor: Arc<CountingExecutor>,
    pipeline: Pipeline,
}

fn mocked() -> Mocks {
    let parser = Arc::new(CountingParser::default());
    let validator = Arc::new(CountingValidator::default());
    let executor = Arc::new(CountingExecutor::default());
    let pipeline = Pipeline::builder()
        .parser(parser.clone())
        .validator(validator.clone())
        .executor(executor.clone())
        .build();

    Mocks {
        parser,
        validator,
        executor,
        pipeline,
    }
}

fn schema() -> Schema {
    star_wars_schema().expect("demo schema should build")
}

struct NamedRule(&'static str);

impl ValidationRule for NamedRule {
    fn id(&self) -> &'static str {
        self.0
    }

    fn description(&self) -> &'static str {
        "Reports nothing"
    }

    fn validate(&self, _ctx: &ValidationContext<'_>) -> Vec<ValidationError> {
        Vec::new()
    }
}

// ============================================================================
// Happy Path
// ============================================================================

#[tokio::test]
async fn test_runs_all_three_stages() {
    let mocks = mocked();
    let request = Request::builder(schema(), "{ hero { name } }").build();

    let result = mocks.pipeline.run(request).await;

    assert_eq!(result.data, Some(json!({"hero": {"name": "R2-D2"}})));
    assert!(result.errors.is_empty());
    assert_eq!(mocks.parser.calls.load(Ordering::SeqCst), 1);
    assert_eq!(mocks.validator.calls.load(Ordering::SeqCst), 1);
    assert_eq!(mocks.executor.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_request_fields_reach_the_executor() {
    let pipeline = Pipeline::new();
    let request = Request::builder(
        schema(),
        "query A { hero { name } } query B($ep: Episode) { hero(episode: $ep) { name } }",
    )
    .operation_name("B")
    .variable("ep", json!("EMPIRE"))
    .build();

    let result = pipeline.run(request).await;
    assert_eq!(result.data, Some(json!({"hero": {"name": "Luke Skywalker"}})));
}

// ============================================================================
// Parse Stage and Cache
// ============================================================================

#[tokio::test]
async fn test_repeated_text_parses_once() {
    let mocks = mocked();
    let schema = schema();

    let first = mocks.pipeline.parse_stage(&schema, "{ hero { id } }").expect("parses");
    let second = mocks.pipeline.parse_stage(&schema, "{ hero { id } }").expect("parses");

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(mocks.parser.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        mocks.pipeline.cache().stats(),
        CacheStats {
            hits: 1,
            misses: 1,
            entries: 1
        }
    );
}

#[tokio::test]
async fn test_text_is_matched_exactly() {
    let mocks = mocked();
    let schema = schema();

    mocks.pipeline.parse_stage(&schema, "{ hero { id } }").expect("parses");
    mocks.pipeline.parse_stage(&schema, "{ hero { id }}").expect("parses");

    assert_eq!(mocks.parser.calls.load(Ordering::SeqCst), 2);
    assert_eq!(mocks.pipeline.cache().len(), 2);
}

#[tokio::test]
async fn test_parse_failure_is_not_cached() {
    let mocks = mocked();

    for _ in 0..2 {
        let result = mocks
            .pipeline
            .run(Request::builder(schema(), "{ hero { ").build())
            .await;

        assert_eq!(result.data, None);
        assert_eq!(result.errors.len(), 1);
        assert!(!result.errors[0].locations.is_empty());
    }

    assert_eq!(mocks.parser.calls.load(Ordering::SeqCst), 2);
    assert_eq!(mocks.validator.calls.load(Ordering::SeqCst), 0);
    assert_eq!(mocks.executor.calls.load(Ordering::SeqCst), 0);
    assert!(mocks.pipeline.cache().is_empty());

    let schema = schema();
    let corrected = mocks
        .pipeline
        .run(Request::builder(schema.clone(), "{ hero { name } }").build())
        .await;

    assert!(corrected.errors.is_empty());
    assert_eq!(mocks.parser.calls.load(Ordering::SeqCst), 3);
    assert!(mocks.pipeline.cache().contains(&schema, "{ hero { name } }"));
    assert!(!mocks.pipeline.cache().contains(&schema, "{ hero { "));
    assert_eq!(mocks.pipeline.cache().len(), 1);
}

#[tokio::test]
async fn test_deeply_nested_request_fails_cleanly() {
    let mocks = mocked();
    let depth = 10_000;
    let text = format!("{}name{}", "{ hero { friends ".repeat(depth), " } }".repeat(depth));

    let result = mocks
        .pipeline
        .run(Request::builder(schema(), text).skip_validation(true).build())
        .await;

    assert_eq!(result.data, None);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].message.contains("nested too deeply"));
    assert_eq!(mocks.executor.calls.load(Ordering::SeqCst), 0);
    assert!(mocks.pipeline.cache().is_empty());
}

#[tokio::test]
async fn test_schemas_do_not_share_entries() {
    let mocks = mocked();
    let text = "{ hero { name } }";

    mocks.pipeline.parse_stage(&schema(), text).expect("parses");
    mocks.pipeline.parse_stage(&schema(), text).expect("parses");

    assert_eq!(mocks.parser.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_cloned_schema_reuses_entries() {
    let mocks = mocked();
    let text = "{ hero { name } }";
    let built_once = schema();

    for _ in 0..3 {
        mocks.pipeline.run(Request::builder(built_once.clone(), text).build()).await;
    }
    assert_eq!(mocks.parser.calls.load(Ordering::SeqCst), 1);

    mocks.pipeline.run(Request::builder(schema(), text).build()).await;
    assert_eq!(mocks.parser.calls.load(Ordering::SeqCst), 2);
    assert_eq!(mocks.pipeline.cache().len(), 2);
}

#[test]
fn test_bounded_cache_evicts_least_recently_used() {
    let schema = schema();
    let cache = DocumentCache::bounded(2);
    let parse = |text: &str| GraphQLParser.parse(&Source::request(text)).expect("parses");

    cache.store(&schema, "{ a }", parse("{ a }"));
    cache.store(&schema, "{ b }", parse("{ b }"));
    assert!(cache.lookup(&schema, "{ a }").is_some());
    cache.store(&schema, "{ c }", parse("{ c }"));

    assert_eq!(cache.capacity(), Some(2));
    assert_eq!(cache.len(), 2);
    assert!(cache.contains(&schema, "{ a }"));
    assert!(!cache.contains(&schema, "{ b }"));
    assert!(cache.contains(&schema, "{ c }"));
}

#[test]
fn test_store_keeps_the_first_tree() {
    let schema = schema();
    let cache = DocumentCache::new();
    let parse = || GraphQLParser.parse(&Source::request("{ a }")).expect("parses");

    let first = cache.store(&schema, "{ a }", parse());
    let second = cache.store(&schema, "{ a }", parse());

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.len(), 1);

    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.capacity(), None);
}

#[test]
fn test_zero_bound_holds_one_entry() {
    let cache = DocumentCache::bounded(0);
    assert_eq!(cache.capacity(), Some(1));
}

/// Release every task at once, then check all of them got the same tree
async fn race_one_text(mocks: Mocks) {
    const TASKS: usize = 64;
    let text = "{ hero { name friends { name } } }";
    let pipeline = mocks.pipeline.clone();
    let schema = schema();
    let barrier = Arc::new(tokio::sync::Barrier::new(TASKS));

    let handles: Vec<_> = (0..TASKS)
        .map(|_| {
            let pipeline = pipeline.clone();
            let schema = schema.clone();
            let barrier = barrier.clone();
            tokio::spawn(async move {
                barrier.wait().await;
                let document = pipeline.parse_stage(&schema, text).expect("parses");
                let result = pipeline.run(Request::builder(schema, text).build()).await;
                (document, result)
            })
        })
        .collect();

    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.expect("task should not panic"));
    }

    let canonical = pipeline.cache().lookup(&schema, text).expect("text is cached");
    let (_, first_result) = &outcomes[0];
    for (document, result) in &outcomes {
        assert!(Arc::ptr_eq(&canonical, document));
        assert_eq!(result, first_result);
    }
    assert!(first_result.errors.is_empty());
    assert_eq!(pipeline.cache().len(), 1);

    let parses = mocks.parser.calls.load(Ordering::SeqCst);
    assert!((1..=TASKS).contains(&parses), "parsed {} times", parses);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_requests_share_one_tree() {
    race_one_text(mocked()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_requests_share_one_tree_bounded() {
    let parser = Arc::new(CountingParser::default());
    let validator = Arc::new(CountingValidator::default());
    let executor = Arc::new(CountingExecutor::default());
    let pipeline = Pipeline::builder()
        .parser(parser.clone())
        .validator(validator.clone())
        .executor(executor.clone())
        .cache(Arc::new(DocumentCache::bounded(4)))
        .build();

    race_one_text(Mocks {
        parser,
        validator,
        executor,
        pipeline,
    })
    .await;
}

#[tokio::test]
async fn test_clones_share_the_cache() {
    let shared = Arc::new(DocumentCache::new());
    let a = Pipeline::builder().cache(shared.clone()).build();
    let b = Pipeline::builder().cache(shared.clone()).build();
    let schema = schema();

    let from_a = a.parse_stage(&schema, "{ hero { id } }").expect("parses");
    let from_b = b.parse_stage(&schema, "{ hero { id } }").expect("parses");

    assert!(Arc::ptr_eq(&from_a, &from_b));
    assert_eq!(shared.stats().hits, 1);
}

// ============================================================================
// Validation Stage
// ============================================================================

#[tokio::test]
async fn test_invalid_document_never_executes() {
    let mocks = mocked();

    let result = mocks
        .pipeline
        .run(Request::builder(schema(), "{ unknownField }").build())
        .await;

    assert_eq!(result.data, None);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].message.contains("unknownField"));
    assert_eq!(mocks.executor.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_skip_validation_bypasses_validator() {
    let mocks = mocked();

    let result = mocks
        .pipeline
        .run(
            Request::builder(schema(), "{ hero { name } unknownField }")
                .skip_validation(true)
                .build(),
        )
        .await;

    assert_eq!(mocks.validator.calls.load(Ordering::SeqCst), 0);
    assert_eq!(mocks.executor.calls.load(Ordering::SeqCst), 1);
    assert_eq!(result.data, Some(json!({"hero": {"name": "R2-D2"}})));
}

#[tokio::test]
async fn test_custom_rules_run_after_builtins() {
    let mocks = mocked();
    let builtin = mocks.pipeline.rules().len();

    mocks
        .pipeline
        .run(
            Request::builder(schema(), "{ hero { name } }")
                .rule(NamedRule("first-custom"))
                .rule(NamedRule("first-custom"))
                .rule(NamedRule("second-custom"))
                .build(),
        )
        .await;

    let ids = mocks.validator.rule_ids.lock().clone();
    assert_eq!(ids.len(), builtin + 3);
    assert_eq!(ids[0], "unique-operation-names");
    assert_eq!(&ids[builtin..], ["first-custom", "first-custom", "second-custom"]);
}

#[test]
fn test_effective_rules_without_custom() {
    let pipeline = Pipeline::builder().rules(Vec::new()).build();
    assert!(pipeline.effective_rules(&[]).is_empty());

    let custom: Vec<RuleRef> = vec![Arc::new(NamedRule("only"))];
    let ids: Vec<&str> = pipeline.effective_rules(&custom).iter().map(|r| r.id()).collect();
    assert_eq!(ids, ["only"]);
}

// ============================================================================
// Execution Stage
// ============================================================================

#[tokio::test]
async fn test_execution_errors_keep_partial_data() {
    let pipeline = Pipeline::new();
    let request = Request::builder(
        schema(),
        "mutation { createReview(episode: JEDI, stars: 9) { stars } }",
    )
    .build();

    let result = pipeline.run(request).await;

    assert_eq!(result.data, Some(json!({"createReview": null})));
    assert_eq!(result.errors.len(), 1);
    let extensions = result.errors[0].extensions.as_ref().expect("code extension");
    assert_eq!(extensions["code"], json!("BAD_RATING"));
}

#[tokio::test]
async fn test_error_handler_is_forwarded() {
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = seen.clone();

    let request = Request::builder(
        schema(),
        "mutation { createReview(episode: JEDI, stars: 0) { stars } }",
    )
    .error_handler(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    })
    .build();

    let result = Pipeline::new().run(request).await;
    assert_eq!(result.errors.len(), 1);
    assert_eq!(seen.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_default_timeout_applies_to_requests() {
    let query = ObjectType::new("Query").field(
        FieldDef::new("slow", TypeRef::named("String")).resolve(|_| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(json!("late"))
        }),
    );
    let schema = Schema::builder(query).build().expect("schema should build");

    let pipeline = Pipeline::builder()
        .default_timeout(Duration::from_millis(20))
        .build();
    let result = pipeline.run(Request::builder(schema, "{ slow }").build()).await;

    assert_eq!(result.data, Some(json!({"slow": null})));
    assert_eq!(result.errors[0].message, "context deadline exceeded");
}

#[test]
fn test_from_config() {
    let config = Config::from_toml_str("[cache]\nmax_entries = 4\n\n[execution]\ntimeout_ms = 1000\n")
        .expect("valid config");

    let pipeline = Pipeline::from_config(&config);
    assert_eq!(pipeline.cache().capacity(), Some(4));
    assert_eq!(pipeline.default_timeout, Some(Duration::from_secs(1)));

    let unbounded = Pipeline::from_config(&Config::default());
    assert_eq!(unbounded.cache().capacity(), None);
    assert_eq!(unbounded.default_timeout, None);
}
