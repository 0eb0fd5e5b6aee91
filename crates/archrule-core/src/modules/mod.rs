//! Explicitly declared modules and the rules over their dependencies.
//!
//! ```text
//! ModuleDefinitions ──classify──► Components ──► RespectAllowedDependencies(policy, scope)
//!                                            ├─► OnlyDependOnEachOtherThrough(predicate)
//!                                            └─► be_free_of_cycles()
//! ```

mod allowed;
mod conditions;
mod layered;
mod scope;

pub use allowed::{allowed_by, AllowedBy, AllowedModuleDependencies, DependencyPolicy};
pub use conditions::{
    not_depend_on_each_other, only_depend_on_each_other_through_elements_that,
    respect_allowed_dependencies, NotDependOnEachOther, OnlyDependOnEachOtherThrough,
    RespectAllowedDependencies,
};
pub use layered::{LayerAccess, LayeredArchitecture};
pub use scope::DependencyScope;

use crate::component::{Classifier, ComponentKey};
use crate::error::ConfigurationError;
use crate::graph::CodeElement;
use crate::predicate::{elements::resides_in_any, ElementPredicate};

/// One named module and the predicate selecting its members.
#[derive(Debug, Clone)]
pub struct ModuleDefinition {
    name: String,
    predicate: ElementPredicate,
}

impl ModuleDefinition {
    /// A module of all elements matching `predicate`.
    #[must_use]
    pub fn new(name: impl Into<String>, predicate: ElementPredicate) -> Self {
        Self {
            name: name.into(),
            predicate,
        }
    }

    /// A module of all elements residing in any of `patterns`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidNamespacePattern`] for a bad pattern.
    pub fn in_namespaces<S: AsRef<str>>(
        name: impl Into<String>,
        patterns: &[S],
    ) -> Result<Self, ConfigurationError> {
        Ok(Self::new(name, resides_in_any(patterns)?))
    }

    /// Module name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Membership predicate.
    #[must_use]
    pub fn predicate(&self) -> &ElementPredicate {
        &self.predicate
    }
}

/// A set of module definitions, usable as a [`Classifier`].
///
/// Elements matched by no definition are undefined; elements matched by
/// definitions of two different names are a configuration error.
#[derive(Debug, Clone, Default)]
pub struct ModuleDefinitions {
    modules: Vec<ModuleDefinition>,
}

impl ModuleDefinitions {
    /// No modules yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a definition. Definitions sharing a name form one module.
    #[must_use]
    pub fn define(mut self, module: ModuleDefinition) -> Self {
        self.modules.push(module);
        self
    }

    /// Adds a module of all elements residing in any of `patterns`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidNamespacePattern`] for a bad pattern.
    pub fn define_namespaces<S: AsRef<str>>(
        self,
        name: impl Into<String>,
        patterns: &[S],
    ) -> Result<Self, ConfigurationError> {
        Ok(self.define(ModuleDefinition::in_namespaces(name, patterns)?))
    }

    /// Definitions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ModuleDefinition> {
        self.modules.iter()
    }

    /// Distinct module names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.modules.iter().map(|m| m.name.clone()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns true if nothing is defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl Classifier for ModuleDefinitions {
    fn description(&self) -> String {
        format!("modules [{}]", self.names().join(", "))
    }

    fn classify(&self, element: &CodeElement) -> Result<Option<ComponentKey>, ConfigurationError> {
        let mut candidates: Vec<&str> = self
            .modules
            .iter()
            .filter(|module| module.predicate.test(element))
            .map(|module| module.name.as_str())
            .collect();
        candidates.sort_unstable();
        candidates.dedup();

        match candidates.as_slice() {
            [] => Ok(None),
            [name] => Ok(Some(ComponentKey::named(*name))),
            _ => Err(ConfigurationError::AmbiguousComponent {
                element: element.name().to_string(),
                candidates: candidates.iter().map(ToString::to_string).collect(),
            }),
        }
    }

    fn declared_names(&self) -> Option<Vec<String>> {
        Some(self.names())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Components;
    use crate::graph::{ElementSpec, Graph};

    fn graph() -> Graph {
        let mut builder = Graph::builder();
        for name in ["app.one.A", "app.one.impl.B", "app.two.C", "app.shared.D"] {
            builder.add_element(ElementSpec::class(name)).unwrap();
        }
        builder.build()
    }

    #[test]
    fn classifies_by_declared_namespaces() {
        let graph = graph();
        let modules = ModuleDefinitions::new()
            .define_namespaces("One", &["app.one.."])
            .unwrap()
            .define_namespaces("Two", &["app.two.."])
            .unwrap()
            .define_namespaces("Three", &["app.three.."])
            .unwrap();
        assert_eq!(modules.description(), "modules [One, Three, Two]");

        let components =
            Components::partition(graph.elements().iter().map(AsRef::as_ref), &modules).unwrap();
        assert_eq!(components.len(), 2);
        assert_eq!(components.by_name("One").unwrap().members().len(), 2);
        assert_eq!(components.undefined().len(), 1);
        // declared even though empty
        assert!(components.is_known_name("Three"));
    }

    #[test]
    fn overlapping_modules_are_ambiguous() {
        let graph = graph();
        let modules = ModuleDefinitions::new()
            .define_namespaces("One", &["app.one.."])
            .unwrap()
            .define_namespaces("Impl", &["..impl"])
            .unwrap();
        let err = Components::partition(graph.elements().iter().map(AsRef::as_ref), &modules)
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::AmbiguousComponent {
                element: "app.one.impl.B".into(),
                candidates: vec!["Impl".into(), "One".into()],
            }
        );
    }
}
