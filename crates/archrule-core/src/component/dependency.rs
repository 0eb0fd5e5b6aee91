//! Projection of element dependencies onto components.

use super::{Component, ComponentId, Components};
use crate::graph::Dependency;
use std::collections::BTreeMap;
use std::fmt;

/// All dependencies from one component to another.
#[derive(Debug, Clone)]
pub struct ComponentDependency<'a> {
    origin: &'a Component,
    target: &'a Component,
    evidences: Vec<&'a Dependency>,
}

impl<'a> ComponentDependency<'a> {
    /// The depending component.
    #[must_use]
    pub fn origin(&self) -> &'a Component {
        self.origin
    }

    /// The component depended upon.
    #[must_use]
    pub fn target(&self) -> &'a Component {
        self.target
    }

    /// The element-level dependencies, in graph order.
    #[must_use]
    pub fn evidences(&self) -> &[&'a Dependency] {
        &self.evidences
    }
}

impl fmt::Display for ComponentDependency<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.origin.name(), self.target.name())
    }
}

/// A dependency leaving a component towards an element no component claims.
#[derive(Debug, Clone, Copy)]
pub struct UndefinedDependency<'a> {
    /// The component the origin belongs to.
    pub origin: &'a Component,
    /// The raw dependency.
    pub dependency: &'a Dependency,
}

/// Inter-component dependencies keyed by `(origin, target)`.
///
/// Only pairs that actually have edges are stored.
#[derive(Debug, Clone, Default)]
pub struct ComponentDependencies<'a> {
    edges: BTreeMap<(ComponentId, ComponentId), ComponentDependency<'a>>,
    undefined: Vec<UndefinedDependency<'a>>,
}

impl<'a> ComponentDependencies<'a> {
    /// Projects `dependencies` onto `components` in one pass.
    ///
    /// Dependencies inside one component are discarded. Dependencies whose
    /// origin is in a component but whose target is in none are kept
    /// separately as undefined.
    pub fn derive(
        components: &'a Components,
        dependencies: impl IntoIterator<Item = &'a Dependency>,
    ) -> Self {
        let mut edges: BTreeMap<(ComponentId, ComponentId), ComponentDependency<'a>> =
            BTreeMap::new();
        let mut undefined = Vec::new();

        for dependency in dependencies {
            let Some(origin) = components.component_of(dependency.origin()) else {
                continue;
            };
            match components.component_of(dependency.target()) {
                Some(target) if target.id() == origin.id() => {}
                Some(target) => edges
                    .entry((origin.id(), target.id()))
                    .or_insert_with(|| ComponentDependency {
                        origin,
                        target,
                        evidences: Vec::new(),
                    })
                    .evidences
                    .push(dependency),
                None => undefined.push(UndefinedDependency { origin, dependency }),
            }
        }

        Self { edges, undefined }
    }

    /// All component dependencies, ordered by (origin, target) name.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentDependency<'a>> {
        self.edges.values()
    }

    /// Outgoing component dependencies of `component`, ordered by target name.
    pub fn from(&self, component: ComponentId) -> impl Iterator<Item = &ComponentDependency<'a>> {
        self.edges
            .range((component, ComponentId(0))..=(component, ComponentId(usize::MAX)))
            .map(|(_, dependency)| dependency)
    }

    /// The dependency from `origin` to `target`, if any.
    #[must_use]
    pub fn get(
        &self,
        origin: ComponentId,
        target: ComponentId,
    ) -> Option<&ComponentDependency<'a>> {
        self.edges.get(&(origin, target))
    }

    /// Dependencies into elements no component claims.
    #[must_use]
    pub fn undefined(&self) -> &[UndefinedDependency<'a>] {
        &self.undefined
    }

    /// Number of component pairs with edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns true if no two components are connected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::SliceAssignment;
    use crate::graph::{DependencySpec, ElementSpec, Graph};

    fn graph() -> Graph {
        let mut builder = Graph::builder();
        for name in ["app.one.A", "app.one.A2", "app.two.B", "lib.Outside"] {
            builder.add_element(ElementSpec::class(name)).unwrap();
        }
        for (origin, target, text) in [
            ("app.one.A", "app.two.B", "first"),
            ("app.one.A", "app.one.A2", "internal"),
            ("app.one.A2", "app.two.B", "second"),
            ("app.one.A", "app.two.B", "third"),
            ("app.two.B", "lib.Outside", "external"),
        ] {
            builder
                .add_dependency(DependencySpec::new(origin, target, text))
                .unwrap();
        }
        builder.build()
    }

    #[test]
    fn aggregates_per_pair_and_drops_self_dependencies() {
        let graph = graph();
        let slices = SliceAssignment::matching("app.(*)..").unwrap();
        let components =
            Components::partition(graph.elements().iter().map(AsRef::as_ref), &slices).unwrap();
        let derived = ComponentDependencies::derive(&components, graph.dependencies());

        assert_eq!(derived.len(), 1);
        let edge = derived.iter().next().unwrap();
        assert_eq!(edge.to_string(), "Slice one -> Slice two");
        let evidence: Vec<&str> = edge.evidences().iter().map(|d| d.description()).collect();
        // grouped by origin element, call-site order kept within each
        assert_eq!(evidence, vec!["first", "third", "second"]);

        let one = components.by_name("Slice one").unwrap().id();
        let two = components.by_name("Slice two").unwrap().id();
        assert!(derived.get(one, two).is_some());
        assert!(derived.get(two, one).is_none());
        assert_eq!(derived.from(one).count(), 1);
        assert_eq!(derived.from(two).count(), 0);
    }

    #[test]
    fn targets_outside_every_component_are_undefined() {
        let graph = graph();
        let slices = SliceAssignment::matching("app.(*)..").unwrap();
        let components =
            Components::partition(graph.elements().iter().map(AsRef::as_ref), &slices).unwrap();
        let derived = ComponentDependencies::derive(&components, graph.dependencies());

        assert_eq!(derived.undefined().len(), 1);
        let undefined = derived.undefined()[0];
        assert_eq!(undefined.origin.name(), "Slice two");
        assert_eq!(undefined.dependency.description(), "external");
    }

    #[test]
    fn no_edges_without_cross_component_dependencies() {
        let graph = Graph::builder().build();
        let slices = SliceAssignment::matching("app.(*)..").unwrap();
        let components =
            Components::partition(graph.elements().iter().map(AsRef::as_ref), &slices).unwrap();
        assert!(ComponentDependencies::derive(&components, graph.dependencies()).is_empty());
    }
}
