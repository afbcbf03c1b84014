//! Undeclared predicate detection.

use super::{Bindings, Rule, RuleContext, RuleId, Violation};

/// Every predicate outside the reserved vocabularies must carry an
/// `rdf:type` in the ontology. Reported once per triple using it.
pub struct UnknownPropertyRule;

impl Rule for UnknownPropertyRule {
    fn id(&self) -> RuleId {
        RuleId::UnknownProperty
    }

    fn description(&self) -> &str {
        "Predicates are declared in the ontology or come from a standard vocabulary"
    }

    fn check(&self, ctx: &mut RuleContext<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();

        for triple in ctx.graph.triples() {
            let Some(property) = triple.predicate.as_resource() else {
                continue;
            };
            if ctx.is_reserved(property) || ctx.schema.is_declared(property) {
                continue;
            }

            let message = format!(
                "The property {} isn't defined in the ontology. Please only use properties \
                 from the ontology, or from a standard source like rdf:, rdfs:, owl:, or skos:.",
                ctx.show(&triple.predicate)
            );
            violations.push(Violation::new(
                RuleId::UnknownProperty,
                message,
                Bindings::UndeclaredProperty {
                    property: triple.predicate.clone(),
                },
            ));
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::OntologySchema;
    use crate::sparql::{QueryGraphBuilder, TermResolver};

    fn run(query: &str) -> Vec<Violation> {
        let mut schema = OntologySchema::new();
        schema.declare_property("http://semanticweb.org/unitedOntology#playsFor");
        let graph = QueryGraphBuilder::default().build(query).unwrap();
        let resolver = TermResolver::default();
        let reserved = crate::vocab::default_reserved_namespaces();
        let mut ctx = RuleContext::new(&graph, &schema, &resolver, &reserved);
        UnknownPropertyRule.check(&mut ctx)
    }

    #[test]
    fn test_reported_per_triple() {
        let violations = run("SELECT * WHERE { ?p :playsFor ?t ; :nick ?a , ?b . ?t :nick ?c }");
        assert_eq!(violations.len(), 3);
        assert!(violations.iter().all(|v| v.message.starts_with("The property :nick isn't")));
    }

    #[test]
    fn test_reserved_vocabularies_are_exempt() {
        let violations = run(
            "SELECT * WHERE { ?p rdfs:label ?l ; skos:prefLabel ?s ; owl:sameAs ?o ; rdf:value ?v }",
        );
        assert!(violations.is_empty());
    }

    #[test]
    fn test_variable_predicates_are_not_checked() {
        assert!(run("SELECT * WHERE { ?s ?p ?o }").is_empty());
    }
}
