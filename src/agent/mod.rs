//! Conversational question answering over a knowledge graph.
//!
//! Each turn is routed either to the chat model directly or through the
//! knowledge-graph path: generate a query, validate it (retrying with the
//! violation text as feedback), execute it only once it is clean, and
//! summarize non-empty results.
//!
//! The language-model collaborators are traits; this crate supplies only
//! the validator, the retry loop and an HTTP query executor.

pub mod driver;
pub mod executor;
pub mod history;

use crate::rules::ValidationReport;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;

pub use driver::{DEFAULT_MAX_ATTEMPTS, DriverOutcome, RetryDriver, retry_prompt};
pub use executor::HttpSparqlExecutor;
pub use history::{ChatHistory, ChatMessage, Role};

/// One result row: variable name to RDF term object.
pub type Binding = serde_json::Map<String, serde_json::Value>;

// =============================================================================
// Collaborators
// =============================================================================

/// Decides whether a question needs the knowledge graph.
#[async_trait]
pub trait QueryRouter: Send + Sync {
    async fn should_use_graph(&self, question: &str) -> Result<bool>;
}

/// Turns a question (or a retry instruction) into query text.
#[async_trait]
pub trait QueryGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Runs a validated query against the store.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, query: &str) -> Result<Vec<Binding>>;
}

/// Renders result rows as an answer to the user's question.
#[async_trait]
pub trait ResultSummarizer: Send + Sync {
    async fn summarize(&self, question: &str, bindings: &[Binding]) -> Result<String>;
}

/// Free-form chat used when the graph is not consulted.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn reply(&self, system_prompt: &str, history: &[ChatMessage]) -> Result<String>;
}

/// Interpret a router model's raw reply. Any mention of `true` counts as
/// a yes, so both `{"use_kg": true}` and a bare `True` route to the graph.
pub fn parse_router_verdict(reply: &str) -> bool {
    reply.trim().to_lowercase().contains("true")
}

// =============================================================================
// Conversation Agent
// =============================================================================

/// What the agent answered for one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnReply {
    /// Summarized knowledge-graph results
    Answer(String),
    /// A clean query ran but matched nothing (or the store was unreachable)
    NoResults,
    /// The generator did not produce a graph query
    CannotAnswer,
    /// No generated query passed validation
    Rejected { report: ValidationReport },
    /// Chat model reply without the graph
    Direct(String),
}

pub struct ConversationAgent {
    router: Arc<dyn QueryRouter>,
    driver: RetryDriver,
    executor: Arc<dyn QueryExecutor>,
    summarizer: Arc<dyn ResultSummarizer>,
    chat: Arc<dyn ChatModel>,
    history: ChatHistory,
}

impl ConversationAgent {
    pub fn new(
        router: Arc<dyn QueryRouter>,
        driver: RetryDriver,
        executor: Arc<dyn QueryExecutor>,
        summarizer: Arc<dyn ResultSummarizer>,
        chat: Arc<dyn ChatModel>,
        history: ChatHistory,
    ) -> Self {
        Self {
            router,
            driver,
            executor,
            summarizer,
            chat,
            history,
        }
    }

    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut ChatHistory {
        &mut self.history
    }

    pub async fn handle_turn(&mut self, input: &str) -> Result<TurnReply> {
        let use_graph = self
            .router
            .should_use_graph(input)
            .await
            .context("routing failed")?;

        if !use_graph {
            self.history.add_message(Role::User, input);
            let reply = self
                .chat
                .reply(self.history.system_prompt(), self.history.messages())
                .await
                .context("chat model failed")?;
            self.history.add_message(Role::Assistant, reply.as_str());
            return Ok(TurnReply::Direct(reply));
        }

        self.history.add_message(Role::User, input);
        tracing::info!("querying the knowledge graph");

        let query = match self.driver.run(input).await? {
            DriverOutcome::Validated { query, attempts } => {
                tracing::info!(attempts, "query validated");
                query
            }
            DriverOutcome::NotRecognizable { .. } => return Ok(TurnReply::CannotAnswer),
            DriverOutcome::Exhausted { report, .. } => return Ok(TurnReply::Rejected { report }),
        };

        let bindings = match self.executor.execute(&query).await {
            Ok(bindings) => bindings,
            Err(err) => {
                tracing::warn!(error = %err, "query execution failed");
                Vec::new()
            }
        };
        if bindings.is_empty() {
            return Ok(TurnReply::NoResults);
        }

        let answer = self
            .summarizer
            .summarize(input, &bindings)
            .await
            .context("summarizing results failed")?;
        self.history.add_message(Role::Assistant, answer.as_str());
        Ok(TurnReply::Answer(answer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_verdict() {
        assert!(parse_router_verdict(r#"{"use_kg": true}"#));
        assert!(parse_router_verdict("  TRUE\n"));
        assert!(!parse_router_verdict(r#"{"use_kg": false}"#));
        assert!(!parse_router_verdict(""));
    }
}
