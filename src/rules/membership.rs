//! Domain and range membership of asserted classes.

use super::{Bindings, Rule, RuleContext, RuleId, Violation, class_terms};

/// Which end of the triple the declared classes constrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Subject,
    Object,
}

impl Side {
    fn noun(self) -> &'static str {
        match self {
            Side::Subject => "subject",
            Side::Object => "object",
        }
    }

    fn facet(self) -> &'static str {
        match self {
            Side::Subject => "domain",
            Side::Object => "range",
        }
    }
}

/// Subject classes asserted with `a` must fall under the property's domain
pub struct DomainRule;

impl Rule for DomainRule {
    fn id(&self) -> RuleId {
        RuleId::Domain
    }

    fn description(&self) -> &str {
        "Classes asserted for a subject are subclasses of the property's domain"
    }

    fn check(&self, ctx: &mut RuleContext<'_>) -> Vec<Violation> {
        check_membership(ctx, RuleId::Domain, Side::Subject)
    }
}

/// Object classes asserted with `a` must fall under the property's range
pub struct RangeRule;

impl Rule for RangeRule {
    fn id(&self) -> RuleId {
        RuleId::Range
    }

    fn description(&self) -> &str {
        "Classes asserted for an object are subclasses of the property's range"
    }

    fn check(&self, ctx: &mut RuleContext<'_>) -> Vec<Violation> {
        check_membership(ctx, RuleId::Range, Side::Object)
    }
}

fn check_membership(ctx: &mut RuleContext<'_>, rule: RuleId, side: Side) -> Vec<Violation> {
    let graph = ctx.graph;
    let schema = ctx.schema;
    let mut violations = Vec::new();

    for triple in graph.triples() {
        let Some(property) = triple.predicate.as_resource() else {
            continue;
        };
        let declared = match side {
            Side::Subject => schema.domains(property),
            Side::Object => schema.ranges(property),
        };
        let Some(declared) = declared else {
            continue;
        };
        let term = match side {
            Side::Subject => &triple.subject,
            Side::Object => &triple.object,
        };

        for class in graph.asserted_classes(term) {
            let Some(class_iri) = class.as_resource() else {
                continue;
            };
            let fits = declared
                .iter()
                .any(|expected| ctx.closure.is_subclass_of(class_iri, expected));
            if fits {
                continue;
            }

            let expected = ctx.show_classes(declared);
            let message = format!(
                "The property {} has {} {}, but its {} {} is a {}, which isn't a subclass of {}",
                ctx.show(&triple.predicate),
                side.facet(),
                expected,
                side.noun(),
                ctx.show(term),
                ctx.show(class),
                expected,
            );
            violations.push(Violation::new(
                rule,
                message,
                Bindings::Membership {
                    property: triple.predicate.clone(),
                    term: term.clone(),
                    class: class.clone(),
                    expected: class_terms(declared),
                },
            ));
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::OntologySchema;
    use crate::sparql::{QueryGraph, QueryGraphBuilder, Term, TermResolver};

    const NS: &str = "http://semanticweb.org/unitedOntology#";

    fn iri(local: &str) -> String {
        format!("{}{}", NS, local)
    }

    fn schema() -> OntologySchema {
        let mut schema = OntologySchema::new();
        schema.add_subclass(&iri("Striker"), &iri("Player"));
        schema.add_domain(&iri("playsFor"), &iri("Player"));
        schema.add_range(&iri("playsFor"), &iri("Team"));
        schema
    }

    fn run(rule: &dyn Rule, schema: &OntologySchema, query: &str) -> Vec<Violation> {
        let graph: QueryGraph = QueryGraphBuilder::default().build(query).unwrap();
        let resolver = TermResolver::default();
        let reserved = crate::vocab::default_reserved_namespaces();
        let mut ctx = RuleContext::new(&graph, schema, &resolver, &reserved);
        rule.check(&mut ctx)
    }

    #[test]
    fn test_domain_accepts_subclass() {
        let violations = run(
            &DomainRule,
            &schema(),
            "SELECT * WHERE { ?p a :Striker ; :playsFor ?t }",
        );
        assert!(violations.is_empty());
    }

    #[test]
    fn test_domain_rejects_unrelated_class() {
        let violations = run(
            &DomainRule,
            &schema(),
            "SELECT * WHERE { ?p a :Stadium ; :playsFor ?t }",
        );
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].message,
            "The property :playsFor has domain :Player, but its subject ?p is a :Stadium, \
             which isn't a subclass of :Player"
        );
    }

    #[test]
    fn test_range_checks_object_assertions() {
        let violations = run(
            &RangeRule,
            &schema(),
            "SELECT * WHERE { ?p :playsFor ?t . ?t a :Player . ?t a :Team }",
        );
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].bindings,
            Bindings::Membership {
                property: Term::resource(iri("playsFor")),
                term: Term::variable("t"),
                class: Term::resource(iri("Player")),
                expected: vec![Term::resource(iri("Team"))],
            }
        );
    }

    #[test]
    fn test_unasserted_terms_are_not_checked() {
        assert!(run(&DomainRule, &schema(), "SELECT * WHERE { ?p :playsFor ?t }").is_empty());
        assert!(run(&RangeRule, &schema(), "SELECT * WHERE { ?p :playsFor ?t }").is_empty());
    }
}
