//! Ontology schema loading
//!
//! - **Schema extraction** - subclass edges, domains, ranges, declared properties
//! - **Subclass closure** - memoised reflexive-transitive ancestor sets
//! - **Caching** - LRU cache of parsed schemas keyed by source

pub mod cache;
pub mod closure;
pub mod schema;

pub use cache::{CacheStats, DEFAULT_SCHEMA_CACHE_CAPACITY, SCHEMA_CACHE, SchemaCache};
pub use closure::SubclassClosure;
pub use schema::{OntologySchema, SchemaSource, SchemaStats, format_for, url_format};
