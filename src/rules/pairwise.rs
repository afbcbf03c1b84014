//! Rules comparing the declared classes of two properties that meet on a
//! shared term.
//!
//! These are a heuristic, not entailment: two class sets pass when any
//! member of one is a subclass of any member of the other, checked in both
//! directions.

use super::{Bindings, Rule, RuleContext, RuleId, Violation, class_terms};
use crate::ontology::OntologySchema;
use crate::sparql::{QueryGraph, Term, Triple};
use std::collections::BTreeSet;

/// Which declaration of a property is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Facet {
    Domain,
    Range,
}

impl Facet {
    fn classes<'s>(self, schema: &'s OntologySchema, property: &str) -> Option<&'s BTreeSet<String>> {
        match self {
            Facet::Domain => schema.domains(property),
            Facet::Range => schema.ranges(property),
        }
    }

    fn noun(self) -> &'static str {
        match self {
            Facet::Domain => "domain",
            Facet::Range => "range",
        }
    }
}

/// How the second triple of a pair is found from the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Join {
    /// Later triples with the same object
    SharedObject,
    /// Later triples with the same subject
    SharedSubject,
    /// Any triple whose subject is the first triple's object
    ObjectToSubject,
}

impl Join {
    fn partners(self, graph: &QueryGraph, position: usize, triple: &Triple) -> Vec<usize> {
        match self {
            Join::SharedObject => later(graph.positions_with_object(&triple.object), position),
            Join::SharedSubject => later(graph.positions_with_subject(&triple.subject), position),
            Join::ObjectToSubject => graph.positions_with_subject(&triple.object).to_vec(),
        }
    }

    fn shared<'t>(self, triple: &'t Triple) -> &'t Term {
        match self {
            Join::SharedSubject => &triple.subject,
            Join::SharedObject | Join::ObjectToSubject => &triple.object,
        }
    }

    fn describe(self, shared: &str) -> String {
        match self {
            Join::SharedObject => format!("on their shared object {}", shared),
            Join::SharedSubject => format!("on their shared subject {}", shared),
            Join::ObjectToSubject => format!("where they meet on {}", shared),
        }
    }
}

fn later(positions: &[usize], position: usize) -> Vec<usize> {
    positions.iter().copied().filter(|&p| p > position).collect()
}

#[derive(Debug, Clone, Copy)]
struct Pairing {
    rule: RuleId,
    first: Facet,
    second: Facet,
    join: Join,
}

/// Two properties sharing an object must have related ranges
pub struct DoubleRangeRule;

impl Rule for DoubleRangeRule {
    fn id(&self) -> RuleId {
        RuleId::DoubleRange
    }

    fn description(&self) -> &str {
        "Properties sharing an object declare subclass-related ranges"
    }

    fn check(&self, ctx: &mut RuleContext<'_>) -> Vec<Violation> {
        check_pairs(
            ctx,
            Pairing {
                rule: RuleId::DoubleRange,
                first: Facet::Range,
                second: Facet::Range,
                join: Join::SharedObject,
            },
        )
    }
}

/// Two properties sharing a subject must have related domains
pub struct DoubleDomainRule;

impl Rule for DoubleDomainRule {
    fn id(&self) -> RuleId {
        RuleId::DoubleDomain
    }

    fn description(&self) -> &str {
        "Properties sharing a subject declare subclass-related domains"
    }

    fn check(&self, ctx: &mut RuleContext<'_>) -> Vec<Violation> {
        check_pairs(
            ctx,
            Pairing {
                rule: RuleId::DoubleDomain,
                first: Facet::Domain,
                second: Facet::Domain,
                join: Join::SharedSubject,
            },
        )
    }
}

/// A property's range must relate to the domain of the property that
/// continues from its object
pub struct DomainRangeRule;

impl Rule for DomainRangeRule {
    fn id(&self) -> RuleId {
        RuleId::DomainRange
    }

    fn description(&self) -> &str {
        "A property's range is subclass-related to the next property's domain"
    }

    fn check(&self, ctx: &mut RuleContext<'_>) -> Vec<Violation> {
        check_pairs(
            ctx,
            Pairing {
                rule: RuleId::DomainRange,
                first: Facet::Range,
                second: Facet::Domain,
                join: Join::ObjectToSubject,
            },
        )
    }
}

fn check_pairs(ctx: &mut RuleContext<'_>, pairing: Pairing) -> Vec<Violation> {
    let graph = ctx.graph;
    let schema = ctx.schema;
    let mut violations = Vec::new();

    for (position, first) in graph.triples().iter().enumerate() {
        let Some(first_classes) = first
            .predicate
            .as_resource()
            .and_then(|p| pairing.first.classes(schema, p))
        else {
            continue;
        };

        for partner in pairing.join.partners(graph, position, first) {
            let Some(second) = graph.get(partner) else {
                continue;
            };
            let Some(second_classes) = second
                .predicate
                .as_resource()
                .and_then(|q| pairing.second.classes(schema, q))
            else {
                continue;
            };

            if ctx.sets_related(first_classes, second_classes) {
                continue;
            }

            let shared = pairing.join.shared(first);
            let message = format!(
                "The property {} has {} {}, and {} has {} {}, and these are incompatible {}.",
                ctx.show(&first.predicate),
                pairing.first.noun(),
                ctx.show_classes(first_classes),
                ctx.show(&second.predicate),
                pairing.second.noun(),
                ctx.show_classes(second_classes),
                pairing.join.describe(&ctx.show(shared)),
            );
            violations.push(Violation::new(
                pairing.rule,
                message,
                Bindings::Incompatible {
                    first: first.predicate.clone(),
                    first_classes: class_terms(first_classes),
                    second: second.predicate.clone(),
                    second_classes: class_terms(second_classes),
                    shared: shared.clone(),
                },
            ));
        }
    }

    violations
}
