//! SPARQL pattern extraction
//!
//! This module turns raw query text into a [`QueryGraph`]:
//! - WHERE-block extraction and clause stripping
//! - Basic graph pattern tokenization with `;` / `,` abbreviations
//! - Term classification against a schema namespace

pub mod extract;
pub mod query_graph;
pub mod term;
pub mod tokenizer;

pub use extract::{ScanState, extract_where_block, strip_comments, strip_non_triple_clauses};
pub use query_graph::{QueryGraph, QueryGraphBuilder, Triple};
pub use term::{DEFAULT_SCHEMA_NAMESPACE, Term, TermResolver};
pub use tokenizer::{RawTriple, segment_tokens, tokenize_bgp};
