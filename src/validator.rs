//! Query validation entry point.

use crate::error::SchemaLoadError;
use crate::ontology::OntologySchema;
use crate::rules::{RuleContext, RuleEvaluator, ValidationOutcome};
use crate::sparql::{DEFAULT_SCHEMA_NAMESPACE, QueryGraphBuilder, TermResolver};
use crate::vocab;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Library-level validation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Namespace unprefixed and `:`-prefixed query names resolve into
    pub schema_namespace: String,
    /// Predicates in these namespaces never need declaring
    pub reserved_namespaces: Vec<String>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            schema_namespace: DEFAULT_SCHEMA_NAMESPACE.to_string(),
            reserved_namespaces: vocab::default_reserved_namespaces(),
        }
    }
}

/// Validates query text against one shared ontology schema.
///
/// Holds no per-query state, so one validator can serve concurrent
/// callers. The subclass closure memo lives inside each `validate` call.
pub struct QueryValidator {
    schema: Arc<OntologySchema>,
    builder: QueryGraphBuilder,
    evaluator: RuleEvaluator,
    reserved_namespaces: Vec<String>,
}

impl QueryValidator {
    pub fn new(schema: Arc<OntologySchema>, config: ValidatorConfig) -> Self {
        Self {
            schema,
            builder: QueryGraphBuilder::new(TermResolver::new(config.schema_namespace)),
            evaluator: RuleEvaluator::default_suite(),
            reserved_namespaces: config.reserved_namespaces,
        }
    }

    pub fn with_defaults(schema: Arc<OntologySchema>) -> Self {
        Self::new(schema, ValidatorConfig::default())
    }

    /// Replace the rule suite.
    pub fn with_evaluator(mut self, evaluator: RuleEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn schema(&self) -> &Arc<OntologySchema> {
        &self.schema
    }

    pub fn resolver(&self) -> &TermResolver {
        self.builder.resolver()
    }

    /// Validate one query text. Never fails: malformed text yields
    /// [`ValidationOutcome::NotStructurallyRecognizable`].
    pub fn validate(&self, query: &str) -> ValidationOutcome {
        let span = tracing::debug_span!(
            "validate_query",
            triples = tracing::field::Empty,
            violations = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
        );
        let _enter = span.enter();
        let started = Instant::now();

        let Some(graph) = self.builder.build(query) else {
            tracing::debug!("no triple patterns recognised");
            return ValidationOutcome::NotStructurallyRecognizable;
        };
        span.record("triples", graph.len());

        let mut ctx = RuleContext::new(
            &graph,
            &self.schema,
            self.builder.resolver(),
            &self.reserved_namespaces,
        );
        let report = self.evaluator.evaluate(&mut ctx);

        span.record("violations", report.len());
        span.record("duration_ms", started.elapsed().as_millis() as u64);
        if !report.is_clean() {
            tracing::debug!(feedback = %report.feedback(), "query failed validation");
        }

        ValidationOutcome::from(report)
    }
}

/// Load the schema at `ontology` and validate a single query against it.
pub fn validate_query(
    query: &str,
    ontology: impl AsRef<Path>,
) -> Result<ValidationOutcome, SchemaLoadError> {
    let schema = OntologySchema::from_path(ontology)?;
    Ok(QueryValidator::with_defaults(Arc::new(schema)).validate(query))
}
