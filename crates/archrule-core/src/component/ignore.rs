//! Dependencies a single condition should not see.

use crate::graph::Dependency;
use crate::predicate::{dependencies, DependencyPredicate, ElementPredicate};
use tracing::debug;

/// A set of predicates selecting raw dependencies to drop before a
/// condition evaluates.
///
/// Each condition owns its filter; joining conditions does not share it.
#[derive(Debug, Clone, Default)]
pub struct IgnoreFilter {
    predicates: Vec<DependencyPredicate>,
}

impl IgnoreFilter {
    /// An empty filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ignores dependencies matching `predicate`.
    pub fn add(&mut self, predicate: DependencyPredicate) {
        self.predicates.push(predicate);
    }

    /// Ignores dependencies from elements matching `origin` to elements
    /// matching `target`.
    pub fn add_elements(&mut self, origin: ElementPredicate, target: ElementPredicate) {
        self.add(dependencies::between_elements(origin, target));
    }

    /// Ignores dependencies between two named elements.
    pub fn add_names(&mut self, origin: &str, target: &str) {
        self.add(dependencies::between(origin, target));
    }

    /// Returns true if `dependency` is ignored.
    #[must_use]
    pub fn is_ignored(&self, dependency: &Dependency) -> bool {
        let ignored = self.predicates.iter().any(|p| p.test(dependency));
        if ignored {
            debug!("Ignoring dependency: {}", dependency.description_line());
        }
        ignored
    }

    /// Keeps the dependencies that are not ignored.
    pub fn retain<'a, I>(&'a self, dependencies: I) -> impl Iterator<Item = &'a Dependency> + 'a
    where
        I: IntoIterator<Item = &'a Dependency>,
        I::IntoIter: 'a,
    {
        dependencies
            .into_iter()
            .filter(move |dependency| !self.is_ignored(dependency))
    }

    /// Returns true if nothing is ignored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

/// Builder methods for conditions that carry an [`IgnoreFilter`].
pub trait IgnoreDependencies: Sized {
    /// The filter to extend.
    fn ignore_filter_mut(&mut self) -> &mut IgnoreFilter;

    /// Ignores dependencies from elements matching `origin` to elements
    /// matching `target`.
    #[must_use]
    fn ignore_dependency(mut self, origin: ElementPredicate, target: ElementPredicate) -> Self {
        self.ignore_filter_mut().add_elements(origin, target);
        self
    }

    /// Ignores dependencies between two fully qualified element names.
    #[must_use]
    fn ignore_dependency_between(mut self, origin: &str, target: &str) -> Self {
        self.ignore_filter_mut().add_names(origin, target);
        self
    }

    /// Ignores dependencies matching `predicate`.
    #[must_use]
    fn ignore_dependency_matching(mut self, predicate: DependencyPredicate) -> Self {
        self.ignore_filter_mut().add(predicate);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{DependencySpec, ElementSpec, Graph};
    use crate::predicate::elements::resides_in;

    #[test]
    fn retains_only_unmatched_dependencies() {
        let mut builder = Graph::builder();
        for name in ["a.A", "b.B", "c.C"] {
            builder.add_element(ElementSpec::class(name)).unwrap();
        }
        builder.add_dependency(DependencySpec::new("a.A", "b.B", "ab")).unwrap();
        builder.add_dependency(DependencySpec::new("a.A", "c.C", "ac")).unwrap();
        builder.add_dependency(DependencySpec::new("b.B", "c.C", "bc")).unwrap();
        let graph = builder.build();

        let mut filter = IgnoreFilter::new();
        assert!(filter.is_empty());
        filter.add_names("a.A", "b.B");
        filter.add_elements(resides_in("b").unwrap(), resides_in("c").unwrap());

        let kept: Vec<&str> = filter
            .retain(graph.dependencies())
            .map(Dependency::description)
            .collect();
        assert_eq!(kept, vec!["ac"]);
    }
}
