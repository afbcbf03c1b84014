//! SPARQL protocol client.

use crate::agent::{Binding, QueryExecutor};
use crate::error::ExecutorError;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use std::time::Duration;

const SPARQL_QUERY_TYPE: &str = "application/sparql-query";
const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

#[derive(Debug, Default, Deserialize)]
struct ResultsDocument {
    #[serde(default)]
    results: ResultsBlock,
}

#[derive(Debug, Default, Deserialize)]
struct ResultsBlock {
    #[serde(default)]
    bindings: Vec<Binding>,
}

/// Executes queries by POSTing them to a SPARQL endpoint.
#[derive(Debug, Clone)]
pub struct HttpSparqlExecutor {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSparqlExecutor {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_timeout(
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ExecutorError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, endpoint))
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run `query` and return its result bindings. A results document
    /// without a bindings list yields no rows.
    pub async fn query(&self, query: &str) -> Result<Vec<Binding>, ExecutorError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, SPARQL_QUERY_TYPE)
            .header(ACCEPT, SPARQL_RESULTS_JSON)
            .body(query.to_string())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExecutorError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let document: ResultsDocument = serde_json::from_slice(&body)?;
        tracing::debug!(
            endpoint = %self.endpoint,
            rows = document.results.bindings.len(),
            "query executed"
        );
        Ok(document.results.bindings)
    }
}

#[async_trait]
impl QueryExecutor for HttpSparqlExecutor {
    async fn execute(&self, query: &str) -> anyhow::Result<Vec<Binding>> {
        Ok(self.query(query).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results_document_defaults() {
        let document: ResultsDocument = serde_json::from_str(r#"{"head": {"vars": []}}"#).unwrap();
        assert!(document.results.bindings.is_empty());

        let document: ResultsDocument = serde_json::from_str(
            r#"{"results": {"bindings": [{"team": {"type": "uri", "value": "http://ex.org/t"}}]}}"#,
        )
        .unwrap();
        assert_eq!(document.results.bindings.len(), 1);
        assert_eq!(document.results.bindings[0]["team"]["value"], "http://ex.org/t");
    }
}
