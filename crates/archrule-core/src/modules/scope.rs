//! Which raw dependencies a module rule looks at.

use crate::component::Components;
use crate::error::ConfigurationError;
use crate::graph::Dependency;
use crate::namespace::NamespaceMatcher;

/// Restricts the raw dependencies a module rule considers.
#[derive(Debug, Clone, Default)]
pub enum DependencyScope {
    /// Every dependency, including those leaving all modules.
    AllDependencies,
    /// Only dependencies whose origin and target both belong to a module.
    #[default]
    BetweenModules,
    /// Only dependencies whose origin and target both reside in one of the
    /// namespaces.
    InNamespaces(Vec<NamespaceMatcher>),
}

impl DependencyScope {
    /// [`DependencyScope::InNamespaces`] from patterns.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidNamespacePattern`] for a bad pattern.
    pub fn in_namespaces<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigurationError> {
        patterns
            .iter()
            .map(|pattern| NamespaceMatcher::new(pattern.as_ref()))
            .collect::<Result<Vec<_>, _>>()
            .map(Self::InNamespaces)
    }

    /// Suffix for rule descriptions.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::AllDependencies => "considering all dependencies".to_string(),
            Self::BetweenModules => "considering only dependencies between modules".to_string(),
            Self::InNamespaces(matchers) => {
                let listed: Vec<String> = matchers.iter().map(ToString::to_string).collect();
                format!(
                    "considering only dependencies in any namespace [{}]",
                    listed.join(", ")
                )
            }
        }
    }

    /// Returns true if `dependency` is in scope.
    #[must_use]
    pub fn includes(&self, dependency: &Dependency, components: &Components) -> bool {
        match self {
            Self::AllDependencies => true,
            Self::BetweenModules => {
                components.component_of(dependency.origin()).is_some()
                    && components.component_of(dependency.target()).is_some()
            }
            Self::InNamespaces(matchers) => {
                let inside = |namespace: &str| matchers.iter().any(|m| m.matches(namespace));
                inside(dependency.origin().namespace()) && inside(dependency.target().namespace())
            }
        }
    }
}
