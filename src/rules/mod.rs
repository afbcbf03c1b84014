//! Consistency rules over a query graph and an ontology schema.
//!
//! Six independent rules, always all evaluated, in this order:
//! - **Domain** - asserted subject classes fit the property's domain
//! - **Range** - asserted object classes fit the property's range
//! - **Double range** - two properties sharing an object have related ranges
//! - **Double domain** - two properties sharing a subject have related domains
//! - **Domain range** - a property's range relates to the next hop's domain
//! - **Unknown property** - every non-reserved predicate is declared
//!
//! Class compatibility only ever uses the reflexive-transitive subclass
//! closure. For the pairwise rules two class sets are compatible when some
//! member of one is a subclass of some member of the other, in either
//! direction.
//!
//! ## Usage
//! ```rust,ignore
//! use bgp_guard::rules::{RuleContext, RuleEvaluator};
//!
//! let evaluator = RuleEvaluator::default_suite();
//! let mut ctx = RuleContext::new(&graph, &schema, &resolver, &reserved);
//! let report = evaluator.evaluate(&mut ctx);
//! ```

pub mod membership;
pub mod pairwise;
pub mod report;
pub mod vocabulary;

use crate::ontology::{OntologySchema, SubclassClosure};
use crate::sparql::{QueryGraph, Term, TermResolver};
use std::collections::BTreeSet;

pub use membership::{DomainRule, RangeRule};
pub use pairwise::{DomainRangeRule, DoubleDomainRule, DoubleRangeRule};
pub use report::{Bindings, RuleId, ValidationOutcome, ValidationReport, Violation};
pub use vocabulary::UnknownPropertyRule;

// =============================================================================
// Core Rule Trait
// =============================================================================

/// One consistency check
pub trait Rule: Send + Sync {
    fn id(&self) -> RuleId;

    /// Human-readable description
    fn description(&self) -> &str;

    /// Violations in the order their triples appear in the graph.
    fn check(&self, ctx: &mut RuleContext<'_>) -> Vec<Violation>;
}

// =============================================================================
// Rule Context
// =============================================================================

/// Everything a rule may look at during one validation call.
///
/// The closure memo is owned by the context, so it lives exactly as long
/// as one validation.
pub struct RuleContext<'a> {
    pub graph: &'a QueryGraph,
    pub schema: &'a OntologySchema,
    pub resolver: &'a TermResolver,
    pub reserved_namespaces: &'a [String],
    pub closure: SubclassClosure<'a>,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        graph: &'a QueryGraph,
        schema: &'a OntologySchema,
        resolver: &'a TermResolver,
        reserved_namespaces: &'a [String],
    ) -> Self {
        Self {
            graph,
            schema,
            resolver,
            reserved_namespaces,
            closure: SubclassClosure::new(schema),
        }
    }

    /// Whether `iri` lives in one of the reserved vocabularies.
    pub fn is_reserved(&self, iri: &str) -> bool {
        self.reserved_namespaces
            .iter()
            .any(|namespace| iri.starts_with(namespace.as_str()))
    }

    /// Whether the two class sets share a subclass-related pair.
    pub fn sets_related(&mut self, left: &BTreeSet<String>, right: &BTreeSet<String>) -> bool {
        let right: Vec<&String> = right.iter().collect();
        self.closure.any_related(left, &right)
    }

    /// Compact display form of a term.
    pub fn show(&self, term: &Term) -> String {
        self.resolver.compact(term)
    }

    /// Compact display form of a class set, alternatives joined with "or".
    pub fn show_classes(&self, classes: &BTreeSet<String>) -> String {
        classes
            .iter()
            .map(|iri| self.resolver.compact_iri(iri))
            .collect::<Vec<_>>()
            .join(" or ")
    }
}

/// Class set as resource terms, for bindings.
pub(crate) fn class_terms(classes: &BTreeSet<String>) -> Vec<Term> {
    classes.iter().cloned().map(Term::Resource).collect()
}

// =============================================================================
// Rule Evaluator (Orchestrator)
// =============================================================================

/// Runs a fixed sequence of rules and aggregates their output
pub struct RuleEvaluator {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleEvaluator {
    /// Create a new evaluator with custom rules
    pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    /// Create the default suite of 6 rules
    pub fn default_suite() -> Self {
        Self {
            rules: vec![
                Box::new(DomainRule),
                Box::new(RangeRule),
                Box::new(DoubleRangeRule),
                Box::new(DoubleDomainRule),
                Box::new(DomainRangeRule),
                Box::new(UnknownPropertyRule),
            ],
        }
    }

    /// Evaluate every rule; no rule short-circuits another.
    pub fn evaluate(&self, ctx: &mut RuleContext<'_>) -> ValidationReport {
        ValidationReport::from_rule_outputs(self.rules.iter().map(|rule| {
            let violations = rule.check(ctx);
            tracing::debug!(
                rule = %rule.id(),
                violations = violations.len(),
                "rule evaluated"
            );
            violations
        }))
    }

    /// Get the number of rules
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn rule_ids(&self) -> Vec<RuleId> {
        self.rules.iter().map(|rule| rule.id()).collect()
    }
}

impl Default for RuleEvaluator {
    fn default() -> Self {
        Self::default_suite()
    }
}
