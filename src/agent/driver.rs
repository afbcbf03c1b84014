//! Generate-and-validate retry loop.

use crate::agent::QueryGenerator;
use crate::rules::ValidationReport;
use crate::validator::QueryValidator;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, warn};

/// Default number of generation attempts per question
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// How a question's query generation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverOutcome {
    /// A query passed validation.
    Validated { query: String, attempts: u32 },
    /// The generator produced something with no triple patterns.
    NotRecognizable { text: String, attempts: u32 },
    /// Every attempt failed validation; holds the last query and report.
    Exhausted {
        query: String,
        report: ValidationReport,
        attempts: u32,
    },
}

impl DriverOutcome {
    pub fn attempts(&self) -> u32 {
        match self {
            DriverOutcome::Validated { attempts, .. }
            | DriverOutcome::NotRecognizable { attempts, .. }
            | DriverOutcome::Exhausted { attempts, .. } => *attempts,
        }
    }

    /// The query that may be executed, if any.
    pub fn validated_query(&self) -> Option<&str> {
        match self {
            DriverOutcome::Validated { query, .. } => Some(query),
            _ => None,
        }
    }
}

/// Instruction sent to the generator after a failed attempt.
pub fn retry_prompt(feedback: &str, question: &str) -> String {
    format!(
        "The previous SPARQL query failed validation with these errors: {}. \
         Please correct and regenerate a valid SPARQL query for: {}",
        feedback, question
    )
}

/// Runs generator and validator until a query passes or attempts run out.
pub struct RetryDriver {
    generator: Arc<dyn QueryGenerator>,
    validator: Arc<QueryValidator>,
    max_attempts: u32,
}

impl RetryDriver {
    pub fn new(generator: Arc<dyn QueryGenerator>, validator: Arc<QueryValidator>) -> Self {
        Self {
            generator,
            validator,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Zero is treated as one attempt.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn validator(&self) -> &Arc<QueryValidator> {
        &self.validator
    }

    pub async fn run(&self, question: &str) -> Result<DriverOutcome> {
        let mut prompt = question.to_string();
        let mut attempt = 0;

        loop {
            attempt += 1;

            let query = self
                .generator
                .generate(&prompt)
                .await
                .with_context(|| format!("query generation failed on attempt {}", attempt))?;
            debug!(attempt, query = %query, "query generated");

            let outcome = self.validator.validate(&query);
            let Some(report) = outcome.report() else {
                warn!(attempt, "generated text is not a graph pattern query");
                return Ok(DriverOutcome::NotRecognizable {
                    text: query,
                    attempts: attempt,
                });
            };

            if report.is_clean() {
                if attempt > 1 {
                    debug!(attempt, "query validated after retry");
                }
                return Ok(DriverOutcome::Validated {
                    query,
                    attempts: attempt,
                });
            }

            if attempt >= self.max_attempts {
                warn!(
                    attempt,
                    violations = report.len(),
                    "query still invalid after final attempt"
                );
                return Ok(DriverOutcome::Exhausted {
                    query,
                    report: report.clone(),
                    attempts: attempt,
                });
            }

            warn!(
                attempt,
                max_attempts = self.max_attempts,
                violations = report.len(),
                "query failed validation, regenerating"
            );
            prompt = retry_prompt(&report.feedback(), question);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_prompt_wording() {
        assert_eq!(
            retry_prompt("The property :x isn't defined", "Who plays for Arsenal?"),
            "The previous SPARQL query failed validation with these errors: \
             The property :x isn't defined. Please correct and regenerate a valid SPARQL \
             query for: Who plays for Arsenal?"
        );
    }

    #[test]
    fn test_outcome_accessors() {
        let outcome = DriverOutcome::Validated {
            query: "SELECT".into(),
            attempts: 2,
        };
        assert_eq!(outcome.attempts(), 2);
        assert_eq!(outcome.validated_query(), Some("SELECT"));

        let outcome = DriverOutcome::NotRecognizable {
            text: "no".into(),
            attempts: 1,
        };
        assert_eq!(outcome.validated_query(), None);
    }
}
