//! Slices: components carved out of the namespace tree by a pattern.

use super::{Classifier, ComponentKey};
use crate::error::ConfigurationError;
use crate::graph::CodeElement;
use crate::namespace::NamespaceMatcher;

/// Assigns each element to the slice named after the capture groups of a
/// namespace pattern.
///
/// With `app.(*)..`, `app.orders.api.Controller` lands in `Slice orders`.
/// A custom name template refers to captures as `$1`, `$2`, ...
#[derive(Debug, Clone)]
pub struct SliceAssignment {
    matcher: NamespaceMatcher,
    template: Option<String>,
}

impl SliceAssignment {
    /// Slices by the captures of `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidNamespacePattern`] for a bad
    /// pattern, or if the pattern has no capture group.
    pub fn matching(pattern: &str) -> Result<Self, ConfigurationError> {
        if !pattern.contains("(*)") && !pattern.contains("(**)") {
            return Err(ConfigurationError::InvalidNamespacePattern {
                pattern: pattern.to_string(),
                reason: "slice patterns need at least one capture group".to_string(),
            });
        }
        Ok(Self {
            matcher: NamespaceMatcher::new(pattern)?,
            template: None,
        })
    }

    /// Names slices with `template`, e.g. `"$1 module"`.
    #[must_use]
    pub fn named(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    fn name_for(&self, captures: &[String]) -> String {
        match &self.template {
            Some(template) => {
                let mut name = template.clone();
                // highest first so `$1` does not eat into `$10`
                for (index, capture) in captures.iter().enumerate().rev() {
                    name = name.replace(&format!("${}", index + 1), capture);
                }
                name
            }
            None => format!("Slice {}", captures.join(" - ")),
        }
    }
}

impl Classifier for SliceAssignment {
    fn description(&self) -> String {
        format!("slices matching {}", self.matcher)
    }

    fn classify(&self, element: &CodeElement) -> Result<Option<ComponentKey>, ConfigurationError> {
        Ok(self
            .matcher
            .captures(element.namespace())
            .map(|captures| ComponentKey::new(self.name_for(&captures), captures)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Components;
    use crate::graph::{ElementSpec, Graph};

    fn graph() -> Graph {
        let mut builder = Graph::builder();
        for name in [
            "app.orders.api.Controller",
            "app.orders.Order",
            "app.billing.Invoice",
            "other.X",
        ] {
            builder.add_element(ElementSpec::class(name)).unwrap();
        }
        builder.build()
    }

    #[test]
    fn default_names_join_captures() {
        let graph = graph();
        let slices = SliceAssignment::matching("app.(*)..").unwrap();
        assert_eq!(slices.description(), "slices matching 'app.(*)..'");
        let components =
            Components::partition(graph.elements().iter().map(AsRef::as_ref), &slices).unwrap();
        let names: Vec<&str> = components.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["Slice billing", "Slice orders"]);
        assert_eq!(components.by_name("Slice orders").unwrap().members().len(), 2);
        assert_eq!(components.by_name("Slice orders").unwrap().identifier(), ["orders"]);
    }

    #[test]
    fn template_names_and_multiple_captures() {
        let graph = graph();
        let slices = SliceAssignment::matching("(*).(*)..").unwrap().named("$2 of $1");
        let components =
            Components::partition(graph.elements().iter().map(AsRef::as_ref), &slices).unwrap();
        let names: Vec<&str> = components.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["billing of app", "orders of app"]);
        // `other.X` has a single segment and stays undefined
        assert_eq!(components.undefined().len(), 1);
    }

    #[test]
    fn pattern_without_capture_is_rejected() {
        assert!(SliceAssignment::matching("app..").is_err());
    }
}
