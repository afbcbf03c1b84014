//! In-memory query graph built from extracted patterns.

use crate::sparql::extract::{extract_where_block, strip_non_triple_clauses};
use crate::sparql::term::{Term, TermResolver};
use crate::sparql::tokenizer::{RawTriple, tokenize_bgp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A classified triple pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

/// Ordered triple patterns with positional indexes by subject, predicate
/// and object. Duplicates are kept.
#[derive(Debug, Clone, Default)]
pub struct QueryGraph {
    triples: Vec<Triple>,
    by_subject: HashMap<Term, Vec<usize>>,
    by_predicate: HashMap<Term, Vec<usize>>,
    by_object: HashMap<Term, Vec<usize>>,
}

impl QueryGraph {
    pub fn from_triples(triples: Vec<Triple>) -> Self {
        let mut graph = Self {
            triples: Vec::with_capacity(triples.len()),
            ..Self::default()
        };
        for triple in triples {
            graph.push(triple);
        }
        graph
    }

    fn push(&mut self, triple: Triple) {
        let position = self.triples.len();
        self.by_subject
            .entry(triple.subject.clone())
            .or_default()
            .push(position);
        self.by_predicate
            .entry(triple.predicate.clone())
            .or_default()
            .push(position);
        self.by_object
            .entry(triple.object.clone())
            .or_default()
            .push(position);
        self.triples.push(triple);
    }

    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Positions of triples whose subject is `term`, ascending.
    pub fn positions_with_subject(&self, term: &Term) -> &[usize] {
        self.by_subject.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Positions of triples whose predicate is `term`, ascending.
    pub fn positions_with_predicate(&self, term: &Term) -> &[usize] {
        self.by_predicate.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Positions of triples whose object is `term`, ascending.
    pub fn positions_with_object(&self, term: &Term) -> &[usize] {
        self.by_object.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get(&self, position: usize) -> Option<&Triple> {
        self.triples.get(position)
    }

    /// Classes asserted for `term` through `term a Class`, in order.
    /// Variable classes are not assertions about a concrete class and are
    /// skipped.
    pub fn asserted_classes<'a>(&'a self, term: &Term) -> impl Iterator<Item = &'a Term> + 'a {
        self.positions_with_subject(term)
            .iter()
            .map(|&position| &self.triples[position])
            .filter(|triple| triple.predicate.is_type_alias())
            .map(|triple| &triple.object)
            .filter(|class| class.as_resource().is_some())
    }
}

/// Builds a [`QueryGraph`] from raw query text.
#[derive(Debug, Clone, Default)]
pub struct QueryGraphBuilder {
    resolver: TermResolver,
}

impl QueryGraphBuilder {
    pub fn new(resolver: TermResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &TermResolver {
        &self.resolver
    }

    /// Extract, strip and tokenize the query's pattern block.
    pub fn raw_triples(&self, query: &str) -> Vec<RawTriple> {
        let block = extract_where_block(query);
        if block.is_empty() {
            return Vec::new();
        }
        tokenize_bgp(&strip_non_triple_clauses(&block))
    }

    /// Build the query graph.
    ///
    /// Returns `None` when no triple pattern could be recognised, which
    /// callers must treat as "not a graph query" rather than as a clean
    /// query.
    pub fn build(&self, query: &str) -> Option<QueryGraph> {
        let raw = self.raw_triples(query);
        if raw.is_empty() {
            return None;
        }

        let triples = raw
            .iter()
            .map(|raw| {
                Triple::new(
                    self.resolver.resolve(&raw.subject),
                    self.resolver.resolve(&raw.predicate),
                    self.resolver.resolve(&raw.object),
                )
            })
            .collect();

        Some(QueryGraph::from_triples(triples))
    }
}
