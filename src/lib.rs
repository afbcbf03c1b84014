pub mod agent;
pub mod config;
pub mod error;
pub mod logging;
pub mod ontology;
pub mod rules;
pub mod sparql;
pub mod validator;
pub mod vocab;

pub use config::{CliArgs, GuardConfig, OutputFormat};
pub use error::{ExecutorError, SchemaLoadError};
pub use logging::{LoggingConfig, init_logging};
pub use ontology::{OntologySchema, SCHEMA_CACHE, SchemaCache, SchemaSource};
pub use rules::{RuleId, ValidationOutcome, ValidationReport, Violation};
pub use validator::{QueryValidator, ValidatorConfig, validate_query};

use agent::{Binding, HttpSparqlExecutor};
use anyhow::{Context, Result};
use indexmap::IndexMap;
use ontology::SchemaStats;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::AsyncReadExt;

/// Exit status when the check could not run at all: bad configuration, an
/// unreadable ontology or query, or a failed endpoint call.
pub const FATAL_EXIT_STATUS: u8 = 3;

/// Exit status for a validation outcome: 0 clean, 1 violations, 2 not a
/// graph pattern query. Fatal errors use [`FATAL_EXIT_STATUS`].
pub fn exit_status(outcome: &ValidationOutcome) -> u8 {
    match outcome {
        ValidationOutcome::NotStructurallyRecognizable => 2,
        ValidationOutcome::Validated { report } if report.is_clean() => 0,
        ValidationOutcome::Validated { .. } => 1,
    }
}

#[derive(Debug, Serialize)]
struct CliOutput<'a> {
    #[serde(flatten)]
    outcome: &'a ValidationOutcome,
    violations_by_rule: IndexMap<RuleId, usize>,
    schema: SchemaStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    bindings: Option<Vec<Binding>>,
}

/// Resolve configuration and run one check, folding any error into
/// [`FATAL_EXIT_STATUS`] after reporting it on stderr.
pub async fn run(args: CliArgs) -> u8 {
    let result = match GuardConfig::from_args(args) {
        Ok(config) => run_cli(config).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(status) => status,
        Err(err) => {
            tracing::error!(error = ?err, "bgp-guard failed");
            eprintln!("bgp-guard: {:#}", err);
            FATAL_EXIT_STATUS
        }
    }
}

/// Validate one query and print the outcome, returning its exit status.
pub async fn run_cli(config: GuardConfig) -> Result<u8> {
    let schema = SCHEMA_CACHE
        .get_or_load(&config.ontology)
        .await
        .with_context(|| format!("failed to load ontology {}", config.ontology))?;

    let query = read_query(&config).await?;

    let validator = config.query_validator(Arc::clone(&schema));
    let started = Instant::now();
    let outcome = validator.validate(&query);
    crate::log_slow_operation!(started.elapsed(), 100, "query validated");

    let bindings = match (&config.endpoint, outcome.is_clean()) {
        (Some(endpoint), true) => {
            let executor = HttpSparqlExecutor::new(endpoint.as_str());
            let rows = executor
                .query(&query)
                .await
                .with_context(|| format!("failed to execute query against {}", endpoint))?;
            Some(rows)
        }
        _ => None,
    };

    match config.format {
        OutputFormat::Text => {
            println!("{}", outcome.to_text());
            if let Some(rows) = bindings.as_ref() {
                println!("{}", serde_json::to_string_pretty(rows)?);
            }
        }
        OutputFormat::Json => {
            let output = CliOutput {
                outcome: &outcome,
                violations_by_rule: outcome
                    .report()
                    .map(ValidationReport::counts_by_rule)
                    .unwrap_or_default(),
                schema: schema.stats(),
                bindings,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(exit_status(&outcome))
}

async fn read_query(config: &GuardConfig) -> Result<String> {
    match config.query_file.as_ref() {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read query file {:?}", path)),
        None => {
            let mut query = String::new();
            tokio::io::stdin()
                .read_to_string(&mut query)
                .await
                .context("failed to read query from stdin")?;
            Ok(query)
        }
    }
}
