//! Layered architectures: modules with access constraints.

use super::{respect_allowed_dependencies, DependencyPolicy, DependencyScope, ModuleDefinitions};
use crate::component::{Component, Components, IgnoreDependencies, IgnoreFilter};
use crate::condition::{Condition, ConditionEvent, ConditionEvents};
use crate::config::Config;
use crate::context::EvaluationContext;
use crate::cycle::be_free_of_cycles;
use crate::error::ConfigurationError;
use crate::graph::Graph;
use crate::result::{EvaluationResult, Priority};
use crate::rule::ArchRule;
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

/// Access constraints between layers.
///
/// A layer without constraints may be accessed by, and may access, any
/// other layer.
#[derive(Debug, Clone, Default)]
pub struct LayerAccess {
    accessed_by: BTreeMap<String, BTreeSet<String>>,
    accesses: BTreeMap<String, BTreeSet<String>>,
}

impl LayerAccess {
    fn constraint_lines(&self) -> Vec<String> {
        let quoted = |names: &BTreeSet<String>| {
            names
                .iter()
                .map(|name| format!("'{name}'"))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let incoming = self.accessed_by.iter().map(|(layer, accessors)| {
            if accessors.is_empty() {
                format!("where layer '{layer}' may not be accessed by any layer")
            } else {
                format!(
                    "where layer '{layer}' may only be accessed by layers [{}]",
                    quoted(accessors)
                )
            }
        });
        let outgoing = self.accesses.iter().map(|(layer, targets)| {
            if targets.is_empty() {
                format!("where layer '{layer}' may not access any layer")
            } else {
                format!("where layer '{layer}' may only access layers [{}]", quoted(targets))
            }
        });
        incoming.chain(outgoing).collect()
    }
}

impl DependencyPolicy for LayerAccess {
    fn description(&self) -> String {
        self.constraint_lines().join(", ")
    }

    fn validate(&self, components: &Components) -> Result<(), ConfigurationError> {
        let names = self
            .accessed_by
            .iter()
            .chain(&self.accesses)
            .flat_map(|(layer, others)| std::iter::once(layer).chain(others));
        for name in names {
            if !components.is_known_name(name) {
                return Err(ConfigurationError::UnknownComponent {
                    context: "layer constraints".to_string(),
                    name: name.clone(),
                });
            }
        }
        Ok(())
    }

    fn allows(&self, origin: &Component, target: &Component) -> bool {
        let may_be_accessed = self
            .accessed_by
            .get(target.name())
            .map_or(true, |accessors| accessors.contains(origin.name()));
        let may_access = self
            .accesses
            .get(origin.name())
            .map_or(true, |targets| targets.contains(target.name()));
        may_be_accessed && may_access
    }
}

#[derive(Debug, Clone)]
struct Layer {
    name: String,
    patterns: Vec<String>,
}

/// A rule checking layer access constraints.
///
/// ```text
/// Controller ──► Service ──► Persistence
/// ```
#[derive(Debug, Clone, Default)]
pub struct LayeredArchitecture {
    layers: Vec<Layer>,
    definitions: ModuleDefinitions,
    access: LayerAccess,
    scope: DependencyScope,
    ignore: IgnoreFilter,
    optional_layers: bool,
    free_of_cycles: bool,
    because: Option<String>,
    priority: Priority,
}

impl LayeredArchitecture {
    /// No layers yet; only dependencies between layers are considered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a layer of the elements residing in any of `patterns`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidNamespacePattern`] for a bad pattern.
    pub fn layer<S: AsRef<str>>(
        mut self,
        name: impl Into<String>,
        patterns: &[S],
    ) -> Result<Self, ConfigurationError> {
        let name = name.into();
        self.definitions = self.definitions.define_namespaces(name.clone(), patterns)?;
        self.layers.push(Layer {
            name,
            patterns: patterns.iter().map(|p| p.as_ref().to_string()).collect(),
        });
        Ok(self)
    }

    /// Only `accessors` may depend on `layer`.
    #[must_use]
    pub fn may_only_be_accessed_by_layers(mut self, layer: &str, accessors: &[&str]) -> Self {
        self.access
            .accessed_by
            .entry(layer.to_string())
            .or_default()
            .extend(accessors.iter().map(ToString::to_string));
        self
    }

    /// No other layer may depend on `layer`.
    #[must_use]
    pub fn may_not_be_accessed_by_any_layer(self, layer: &str) -> Self {
        self.may_only_be_accessed_by_layers(layer, &[])
    }

    /// `layer` may only depend on `targets`.
    #[must_use]
    pub fn may_only_access_layers(mut self, layer: &str, targets: &[&str]) -> Self {
        self.access
            .accesses
            .entry(layer.to_string())
            .or_default()
            .extend(targets.iter().map(ToString::to_string));
        self
    }

    /// `layer` may not depend on any other layer.
    #[must_use]
    pub fn may_not_access_any_layer(self, layer: &str) -> Self {
        self.may_only_access_layers(layer, &[])
    }

    /// Changes which raw dependencies are considered.
    #[must_use]
    pub fn consider(mut self, scope: DependencyScope) -> Self {
        self.scope = scope;
        self
    }

    /// Accepts layers without members instead of reporting them.
    #[must_use]
    pub fn with_optional_layers(mut self, optional: bool) -> Self {
        self.optional_layers = optional;
        self
    }

    /// Additionally requires the layers to be free of cycles.
    #[must_use]
    pub fn free_of_cycles(mut self, check: bool) -> Self {
        self.free_of_cycles = check;
        self
    }

    /// Appends `, because <reason>` to the description.
    #[must_use]
    pub fn because(mut self, reason: impl Into<String>) -> Self {
        self.because = Some(reason.into());
        self
    }

    /// Sets the priority shown in the report header.
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

impl IgnoreDependencies for LayeredArchitecture {
    fn ignore_filter_mut(&mut self) -> &mut IgnoreFilter {
        &mut self.ignore
    }
}

impl ArchRule for LayeredArchitecture {
    fn description(&self) -> String {
        let mut lines = vec![format!(
            "Layered architecture {}, consisting of",
            self.scope.description()
        )];
        lines.extend(self.layers.iter().map(|layer| {
            let patterns: Vec<String> = layer.patterns.iter().map(|p| format!("'{p}'")).collect();
            format!("layer '{}' ({})", layer.name, patterns.join(", "))
        }));
        lines.extend(self.access.constraint_lines());
        if self.free_of_cycles {
            lines.push("where layers are free of cycles".to_string());
        }
        let text = lines.join("\n");
        match &self.because {
            Some(reason) => format!("{text}, because {reason}"),
            None => text,
        }
    }

    fn priority(&self) -> Priority {
        self.priority
    }

    fn evaluate_with(
        &self,
        graph: &Graph,
        config: &Config,
    ) -> Result<EvaluationResult, ConfigurationError> {
        let description = self.description();
        let components =
            Components::partition(graph.elements().iter().map(AsRef::as_ref), &self.definitions)?;
        let ctx = EvaluationContext::new(graph, config);
        let mut events = ConditionEvents::new();

        if !self.optional_layers {
            for layer in &self.layers {
                if components.by_name(&layer.name).is_none() {
                    events.add(ConditionEvent::violated(
                        format!("Layer '{}'", layer.name),
                        format!("Layer '{}' is empty", layer.name),
                    ));
                }
            }
        }

        let mut access = respect_allowed_dependencies(self.access.clone(), self.scope.clone());
        *access.ignore_filter_mut() = self.ignore.clone();
        access.check(&components, &ctx, &mut events)?;

        if self.free_of_cycles {
            let mut cycles = be_free_of_cycles();
            *cycles.ignore_filter_mut() = self.ignore.clone();
            cycles.check(&components, &ctx, &mut events)?;
        }

        info!(
            "Rule '{}' evaluated: {} violations",
            description,
            events.violating().len()
        );
        Ok(EvaluationResult::from_events(description, self.priority, &events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{DependencySpec, ElementSpec};

    fn graph() -> Graph {
        let mut builder = Graph::builder();
        for name in ["app.web.Controller", "app.service.Service", "app.persistence.Repo"] {
            builder.add_element(ElementSpec::class(name)).unwrap();
        }
        for (origin, target) in [
            ("app.web.Controller", "app.service.Service"),
            ("app.service.Service", "app.persistence.Repo"),
            ("app.persistence.Repo", "app.web.Controller"),
        ] {
            builder
                .add_dependency(DependencySpec::new(
                    origin,
                    target,
                    format!("<{origin}> uses <{target}>"),
                ))
                .unwrap();
        }
        builder.build()
    }

    fn architecture() -> LayeredArchitecture {
        LayeredArchitecture::new()
            .layer("Web", &["..web.."])
            .unwrap()
            .layer("Service", &["..service.."])
            .unwrap()
            .layer("Persistence", &["..persistence.."])
            .unwrap()
            .may_not_be_accessed_by_any_layer("Web")
            .may_only_be_accessed_by_layers("Service", &["Web"])
            .may_only_be_accessed_by_layers("Persistence", &["Service"])
    }

    #[test]
    fn description_lists_layers_and_constraints() {
        insta::assert_snapshot!(architecture().description(), @r"
        Layered architecture considering only dependencies between modules, consisting of
        layer 'Web' ('..web..')
        layer 'Service' ('..service..')
        layer 'Persistence' ('..persistence..')
        where layer 'Persistence' may only be accessed by layers ['Service']
        where layer 'Service' may only be accessed by layers ['Web']
        where layer 'Web' may not be accessed by any layer
        ");
    }

    #[test]
    fn back_access_is_violation() {
        let result = architecture().evaluate(&graph()).unwrap();
        assert_eq!(
            result.violations(),
            ["Module Dependency [Persistence -> Web]:\n<app.persistence.Repo> uses <app.web.Controller>"]
        );
    }

    #[test]
    fn ignore_and_cycles() {
        let rule = architecture()
            .free_of_cycles(true)
            .ignore_dependency_between("app.persistence.Repo", "app.web.Controller");
        assert!(rule.check(&graph()).is_ok());

        let result = architecture().free_of_cycles(true).evaluate(&graph()).unwrap();
        assert_eq!(result.violation_count(), 2);
    }

    #[test]
    fn empty_layers_are_reported_unless_optional() {
        let rule = architecture().layer("Batch", &["..batch.."]).unwrap();
        let result = rule.evaluate(&graph()).unwrap();
        assert!(result.violations().contains(&"Layer 'Batch' is empty".to_string()));

        let result = architecture()
            .layer("Batch", &["..batch.."])
            .unwrap()
            .with_optional_layers(true)
            .evaluate(&graph())
            .unwrap();
        assert_eq!(result.violation_count(), 1);
    }

    #[test]
    fn unknown_layer_in_constraint_fails() {
        let err = architecture()
            .may_only_access_layers("Web", &["Nope"])
            .evaluate(&graph())
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::UnknownComponent { .. }));
    }
}
