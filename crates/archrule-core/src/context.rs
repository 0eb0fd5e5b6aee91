//! Context handed to conditions during one rule evaluation.

use crate::config::Config;
use crate::graph::{CodeElement, ElementId, Graph};
use std::collections::HashSet;

/// Read-only view a condition evaluates against.
///
/// Created fresh for every rule evaluation. It gives conditions that need
/// more than the item at hand (transitive search, dependency quantifiers)
/// access to the whole graph and to the rule's subject set.
#[derive(Debug, Clone)]
pub struct EvaluationContext<'g> {
    graph: &'g Graph,
    config: &'g Config,
    subjects: HashSet<ElementId>,
}

impl<'g> EvaluationContext<'g> {
    /// A context whose subject set is every element of `graph`.
    #[must_use]
    pub fn new(graph: &'g Graph, config: &'g Config) -> Self {
        Self {
            graph,
            config,
            subjects: graph.elements().iter().map(|e| e.id()).collect(),
        }
    }

    /// Restricts the subject set to `subjects`.
    #[must_use]
    pub fn with_subjects<'e>(
        mut self,
        subjects: impl IntoIterator<Item = &'e CodeElement>,
    ) -> Self {
        self.subjects = subjects.into_iter().map(CodeElement::id).collect();
        self
    }

    /// The graph under evaluation.
    #[must_use]
    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// Settings for this evaluation.
    #[must_use]
    pub fn config(&self) -> &'g Config {
        self.config
    }

    /// Returns true if `element` is one of the rule's subjects.
    ///
    /// The subject set is the reference set transitive searches stay
    /// outside of.
    #[must_use]
    pub fn is_subject(&self, element: &CodeElement) -> bool {
        self.subjects.contains(&element.id())
    }
}
