//! Violations, the aggregated report, and the validation outcome.

use crate::sparql::term::Term;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumIter, IntoStaticStr};

/// Identifier of a consistency rule, in evaluation order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RuleId {
    Domain,
    Range,
    DoubleRange,
    DoubleDomain,
    DomainRange,
    UnknownProperty,
}

/// The concrete terms a violation was found on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Bindings {
    /// A class assertion that does not fit a property's domain or range.
    Membership {
        property: Term,
        term: Term,
        class: Term,
        expected: Vec<Term>,
    },
    /// Two properties whose declared classes meet on a shared term.
    Incompatible {
        first: Term,
        first_classes: Vec<Term>,
        second: Term,
        second_classes: Vec<Term>,
        shared: Term,
    },
    /// A predicate the ontology does not declare.
    UndeclaredProperty { property: Term },
}

/// One rule failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub rule: RuleId,
    pub message: String,
    pub bindings: Bindings,
}

impl Violation {
    pub fn new(rule: RuleId, message: impl Into<String>, bindings: Bindings) -> Self {
        Self {
            rule,
            message: message.into(),
            bindings,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.rule, self.message)
    }
}

/// Ordered violations from every rule. Empty means clean.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn clean() -> Self {
        Self::default()
    }

    /// Concatenate per-rule outputs in the order given.
    pub fn from_rule_outputs(outputs: impl IntoIterator<Item = Vec<Violation>>) -> Self {
        Self {
            violations: outputs.into_iter().flatten().collect(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn by_rule(&self, rule: RuleId) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.rule == rule)
    }

    /// Violation count per rule that fired, in rule order.
    pub fn counts_by_rule(&self) -> IndexMap<RuleId, usize> {
        let mut counts = IndexMap::new();
        for violation in &self.violations {
            *counts.entry(violation.rule).or_insert(0) += 1;
        }
        counts
    }

    pub fn messages(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.message.as_str()).collect()
    }

    /// Violation messages joined for feeding back into query generation.
    pub fn feedback(&self) -> String {
        self.messages().join("; ")
    }

    /// Numbered, one violation per line.
    pub fn to_text(&self) -> String {
        if self.is_clean() {
            return "No violations found.".to_string();
        }
        self.violations
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{}. {}", i + 1, v))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl IntoIterator for ValidationReport {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

/// Result of validating one query text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ValidationOutcome {
    /// No triple pattern could be extracted; regenerating will not help.
    NotStructurallyRecognizable,
    Validated { report: ValidationReport },
}

impl ValidationOutcome {
    /// Recognised and free of violations.
    pub fn is_clean(&self) -> bool {
        matches!(self, ValidationOutcome::Validated { report } if report.is_clean())
    }

    /// Recognised but with violations a regenerated query might fix.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ValidationOutcome::Validated { report } if !report.is_clean())
    }

    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            ValidationOutcome::Validated { report } => Some(report),
            ValidationOutcome::NotStructurallyRecognizable => None,
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            ValidationOutcome::NotStructurallyRecognizable => {
                "Input not recognisable as a graph pattern query.".to_string()
            }
            ValidationOutcome::Validated { report } => report.to_text(),
        }
    }
}

impl From<ValidationReport> for ValidationOutcome {
    fn from(report: ValidationReport) -> Self {
        ValidationOutcome::Validated { report }
    }
}
