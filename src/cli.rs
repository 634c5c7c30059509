use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value as JsonValue};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::demo::star_wars_schema;
use crate::pipeline::{Pipeline, Request};
use crate::validation::specified_rules;

#[derive(Parser)]
#[command(name = "quiver")]
#[command(about = "Quiver - parse, validate and execute GraphQL requests", long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default search)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Execute a request against the demo schema
    Run {
        /// Request text
        #[arg(short = 'q', long = "query")]
        query: Option<String>,

        /// Read the request text from a file
        #[arg(short = 'f', long = "file", conflicts_with = "query")]
        file: Option<PathBuf>,

        /// Variables as a JSON object
        #[arg(long)]
        variables: Option<String>,

        /// Operation to run when the document has several
        #[arg(short = 'o', long = "operation")]
        operation: Option<String>,

        /// Execute without validating first
        #[arg(long)]
        skip_validation: bool,

        /// Request deadline in milliseconds (overrides config)
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Run the same request this many times
        #[arg(long, default_value = "1")]
        repeat: usize,
    },

    /// Parse and validate a request without executing it
    Validate {
        /// Request text
        #[arg(short = 'q', long = "query")]
        query: Option<String>,

        /// Read the request text from a file
        #[arg(short = 'f', long = "file", conflicts_with = "query")]
        file: Option<PathBuf>,
    },

    /// List the built-in validation rules in the order they run
    Rules,
}

/// Run the CLI by parsing process arguments
pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    run_cli_with_args(cli).await
}

/// Run the CLI with provided arguments
pub async fn run_cli_from_args(args: Vec<String>) -> Result<()> {
    let cli = Cli::parse_from(args);
    run_cli_with_args(cli).await
}

async fn run_cli_with_args(cli: Cli) -> Result<()> {
    let timeout_ms = match &cli.command {
        Commands::Run { timeout_ms, .. } => *timeout_ms,
        _ => None,
    };

    // Load before anything else so config errors surface first
    let config = Config::builder()
        .config_path(cli.config.map(PathBuf::from))
        .timeout_ms(timeout_ms)
        .build()?;

    init_logging(&config);

    let output = run_command(cli.command, &config).await?;
    println!("{}", output);
    Ok(())
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));

    // Already installed when called twice in one process
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run one command and render what it would print
async fn run_command(command: Commands, config: &Config) -> Result<String> {
    match command {
        Commands::Run {
            query,
            file,
            variables,
            operation,
            skip_validation,
            repeat,
            ..
        } => {
            let text = read_request_text(query, file)?;
            let variables = parse_variables(variables.as_deref())?;
            let schema = star_wars_schema().context("Failed to build demo schema")?;
            let pipeline = Pipeline::from_config(config);

            let mut builder = Request::builder(schema, text)
                .variables(variables)
                .skip_validation(skip_validation);
            if let Some(operation) = operation {
                builder = builder.operation_name(operation);
            }
            let request = builder.build();

            let mut result = pipeline.run(request.clone()).await;
            for _ in 1..repeat {
                result = pipeline.run(request.clone()).await;
            }

            let stats = pipeline.cache().stats();
            debug!(
                runs = repeat.max(1),
                hits = stats.hits,
                misses = stats.misses,
                entries = stats.entries,
                "document cache"
            );

            Ok(serde_json::to_string_pretty(&result.to_json())?)
        }

        Commands::Validate { query, file } => {
            let text = read_request_text(query, file)?;
            let schema = star_wars_schema().context("Failed to build demo schema")?;
            let pipeline = Pipeline::from_config(config);

            let errors = match pipeline.parse_stage(&schema, &text) {
                Ok(document) => pipeline.validate_stage(&schema, &document, &[]).errors,
                Err(errors) => errors,
            };

            if errors.is_empty() {
                return Ok("✓ Document is valid".to_string());
            }

            let rendered = serde_json::to_string_pretty(&json!({ "errors": errors }))?;
            println!("{}", rendered);
            bail!("Document has {} error(s)", errors.len());
        }

        Commands::Rules => Ok(specified_rules()
            .iter()
            .map(|rule| format!("{:<28} {}", rule.id(), rule.description()))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

fn read_request_text(query: Option<String>, file: Option<PathBuf>) -> Result<String> {
    match (query, file) {
        (Some(query), _) => Ok(query),
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read request from {}", path.display())),
        (None, None) => bail!("Provide --query or --file"),
    }
}

fn parse_variables(raw: Option<&str>) -> Result<Map<String, JsonValue>> {
    let Some(raw) = raw else {
        return Ok(Map::new());
    };

    match serde_json::from_str::<JsonValue>(raw).context("Variables must be valid JSON")? {
        JsonValue::Object(map) => Ok(map),
        JsonValue::Null => Ok(Map::new()),
        other => bail!("Variables must be a JSON object, got {}", other),
    }
}
