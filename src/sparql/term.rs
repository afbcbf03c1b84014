//! Term model for extracted graph patterns.
//!
//! Every non-empty token resolves to exactly one [`Term`]: a query variable,
//! the `a` type shorthand, or a resource IRI.

use crate::vocab::{self, rdf};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace unprefixed and `:`-prefixed names resolve into by default.
pub const DEFAULT_SCHEMA_NAMESPACE: &str = "http://semanticweb.org/unitedOntology#";

/// A classified pattern token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Term {
    /// Query variable, stored without its sigil
    Variable(String),
    /// Schema resource, stored as a full IRI
    Resource(String),
    /// The `a` / `rdf:type` shorthand
    TypeAlias,
}

impl Term {
    pub fn variable(name: impl Into<String>) -> Self {
        Term::Variable(name.into())
    }

    pub fn resource(iri: impl Into<String>) -> Self {
        Term::Resource(iri.into())
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable(_))
    }

    pub fn is_type_alias(&self) -> bool {
        matches!(self, Term::TypeAlias)
    }

    /// IRI of a resource term.
    pub fn as_resource(&self) -> Option<&str> {
        match self {
            Term::Resource(iri) => Some(iri),
            _ => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Variable(name) => write!(f, "?{}", name),
            Term::Resource(iri) => write!(f, "<{}>", iri),
            Term::TypeAlias => write!(f, "a"),
        }
    }
}

/// Resolves raw tokens into [`Term`]s against one schema namespace.
#[derive(Debug, Clone)]
pub struct TermResolver {
    schema_namespace: String,
}

impl TermResolver {
    pub fn new(schema_namespace: impl Into<String>) -> Self {
        Self {
            schema_namespace: schema_namespace.into(),
        }
    }

    pub fn schema_namespace(&self) -> &str {
        &self.schema_namespace
    }

    /// Classify a token. Total for any input.
    pub fn resolve(&self, token: &str) -> Term {
        let token = token.trim();

        if let Some(name) = token.strip_prefix('?').or_else(|| token.strip_prefix('$')) {
            return Term::Variable(name.to_string());
        }

        if token == "a" {
            return Term::TypeAlias;
        }

        if let Some(iri) = token.strip_prefix('<').and_then(|rest| rest.strip_suffix('>')) {
            return Self::resource_or_alias(iri.to_string());
        }

        if let Some((prefix, local)) = token.split_once(':') {
            if let Some(namespace) = vocab::reserved_namespace(prefix) {
                return Self::resource_or_alias(format!("{}{}", namespace, local));
            }
        }

        Term::Resource(format!("{}{}", self.schema_namespace, token.replace(':', "")))
    }

    fn resource_or_alias(iri: String) -> Term {
        if iri == rdf::TYPE {
            Term::TypeAlias
        } else {
            Term::Resource(iri)
        }
    }

    /// Render a term in the compact form used in diagnostics
    /// (`?x`, `a`, `:Player`, `rdfs:label`, or `<iri>`).
    pub fn compact(&self, term: &Term) -> String {
        match term {
            Term::Variable(name) => format!("?{}", name),
            Term::TypeAlias => "a".to_string(),
            Term::Resource(iri) => self.compact_iri(iri),
        }
    }

    pub fn compact_iri(&self, iri: &str) -> String {
        if let Some(local) = iri.strip_prefix(self.schema_namespace.as_str()) {
            return format!(":{}", local);
        }
        for (prefix, namespace) in vocab::RESERVED_VOCABULARIES {
            if let Some(local) = iri.strip_prefix(namespace) {
                return format!("{}:{}", prefix, local);
            }
        }
        format!("<{}>", iri)
    }
}

impl Default for TermResolver {
    fn default() -> Self {
        Self::new(DEFAULT_SCHEMA_NAMESPACE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ns(local: &str) -> Term {
        Term::Resource(format!("{}{}", DEFAULT_SCHEMA_NAMESPACE, local))
    }

    #[test]
    fn test_variables_keep_name_without_sigil() {
        let resolver = TermResolver::default();
        assert_eq!(resolver.resolve("?player"), Term::variable("player"));
        assert_eq!(resolver.resolve("$team"), Term::variable("team"));
        assert_eq!(resolver.resolve("?"), Term::variable(""));
    }

    #[test]
    fn test_type_shorthand_forms() {
        let resolver = TermResolver::default();
        assert_eq!(resolver.resolve("a"), Term::TypeAlias);
        assert_eq!(resolver.resolve("rdf:type"), Term::TypeAlias);
        assert_eq!(
            resolver.resolve("<http://www.w3.org/1999/02/22-rdf-syntax-ns#type>"),
            Term::TypeAlias
        );
    }

    #[test]
    fn test_schema_names_resolve_into_schema_namespace() {
        let resolver = TermResolver::default();
        assert_eq!(resolver.resolve(":Player"), ns("Player"));
        assert_eq!(resolver.resolve("Player"), ns("Player"));
        assert_eq!(resolver.resolve("ex:Player"), ns("exPlayer"));
        assert_eq!(resolver.resolve("5"), ns("5"));
    }

    #[test]
    fn test_reserved_prefixes_resolve_to_standard_namespaces() {
        let resolver = TermResolver::default();
        assert_eq!(
            resolver.resolve("rdfs:label"),
            Term::resource("http://www.w3.org/2000/01/rdf-schema#label")
        );
        assert_eq!(
            resolver.resolve("skos:prefLabel"),
            Term::resource("http://www.w3.org/2004/02/skos/core#prefLabel")
        );
    }

    #[test]
    fn test_full_iris_are_kept_verbatim() {
        let resolver = TermResolver::default();
        assert_eq!(
            resolver.resolve("<http://example.org/x#y>"),
            Term::resource("http://example.org/x#y")
        );
    }

    #[test]
    fn test_compact_rendering() {
        let resolver = TermResolver::default();
        assert_eq!(resolver.compact(&ns("playsFor")), ":playsFor");
        assert_eq!(resolver.compact(&Term::variable("t")), "?t");
        assert_eq!(resolver.compact(&Term::TypeAlias), "a");
        assert_eq!(
            resolver.compact(&Term::resource("http://www.w3.org/2002/07/owl#Thing")),
            "owl:Thing"
        );
        assert_eq!(
            resolver.compact(&Term::resource("http://example.org/other")),
            "<http://example.org/other>"
        );
    }
}
