//! Error types
//!
//! Library boundaries return typed errors built with `thiserror`; the CLI
//! and the agent pipeline wrap them in `anyhow` with context.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// SCHEMA LOADING
// =============================================================================

/// Failure to obtain or parse an ontology document.
#[derive(Debug, Error)]
pub enum SchemaLoadError {
    #[error("failed to read ontology file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported ontology format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to parse ontology: {0}")]
    Parse(#[from] oxigraph::store::LoaderError),

    #[error("ontology store error: {0}")]
    Storage(#[from] oxigraph::store::StorageError),

    #[error("failed to fetch ontology from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

// =============================================================================
// QUERY EXECUTION
// =============================================================================

/// Failure talking to a SPARQL endpoint.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("endpoint request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("endpoint returned HTTP {status}")]
    Status { status: u16 },

    #[error("malformed results document: {0}")]
    Decode(#[from] serde_json::Error),
}
