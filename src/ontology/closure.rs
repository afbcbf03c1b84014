//! Reflexive-transitive `rdfs:subClassOf` closure.

use crate::ontology::schema::OntologySchema;
use std::collections::{HashMap, HashSet, VecDeque};

/// Lazily computed ancestor sets over a schema's subclass edges.
///
/// Each class's ancestor set is computed once by breadth-first search and
/// memoised. Cycles in the hierarchy terminate because visited classes are
/// never enqueued twice.
#[derive(Debug)]
pub struct SubclassClosure<'a> {
    schema: &'a OntologySchema,
    memo: HashMap<String, HashSet<String>>,
}

impl<'a> SubclassClosure<'a> {
    pub fn new(schema: &'a OntologySchema) -> Self {
        Self {
            schema,
            memo: HashMap::new(),
        }
    }

    /// Every class reachable from `class` by zero or more subclass edges,
    /// including `class` itself.
    pub fn ancestors(&mut self, class: &str) -> &HashSet<String> {
        if !self.memo.contains_key(class) {
            let computed = self.compute(class);
            self.memo.insert(class.to_string(), computed);
        }
        &self.memo[class]
    }

    fn compute(&self, class: &str) -> HashSet<String> {
        let mut seen = HashSet::from([class.to_string()]);
        let mut queue = VecDeque::from([class.to_string()]);

        while let Some(current) = queue.pop_front() {
            let Some(parents) = self.schema.superclasses(&current) else {
                continue;
            };
            for parent in parents {
                if seen.insert(parent.clone()) {
                    queue.push_back(parent.clone());
                }
            }
        }

        seen
    }

    /// Whether `class` is `ancestor` or one of its subclasses.
    pub fn is_subclass_of(&mut self, class: &str, ancestor: &str) -> bool {
        class == ancestor || self.ancestors(class).contains(ancestor)
    }

    /// Whether either class is a subclass of the other.
    pub fn related(&mut self, first: &str, second: &str) -> bool {
        self.is_subclass_of(first, second) || self.is_subclass_of(second, first)
    }

    /// Whether some member of `left` is related to some member of `right`.
    pub fn any_related<'s>(
        &mut self,
        left: impl IntoIterator<Item = &'s String>,
        right: &[&'s String],
    ) -> bool {
        left.into_iter()
            .any(|l| right.iter().any(|r| self.related(l, r)))
    }
}
