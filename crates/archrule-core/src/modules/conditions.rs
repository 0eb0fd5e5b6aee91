//! Conditions over a set of components.

use super::{DependencyPolicy, DependencyScope};
use crate::component::{ComponentDependencies, Components, IgnoreDependencies, IgnoreFilter};
use crate::condition::{Condition, ConditionEvent, ConditionEvents};
use crate::context::EvaluationContext;
use crate::error::ConfigurationError;
use crate::graph::Dependency;
use crate::predicate::ElementPredicate;
use tracing::debug;

fn evidence_block(header: String, evidences: &[&Dependency]) -> String {
    let mut block = header;
    for evidence in evidences {
        block.push('\n');
        block.push_str(&evidence.description_line());
    }
    block
}

/// Every module dependency must be allowed by a policy.
pub struct RespectAllowedDependencies {
    policy: Box<dyn DependencyPolicy>,
    scope: DependencyScope,
    ignore: IgnoreFilter,
}

/// `respect their allowed dependencies <policy> <scope>`.
#[must_use]
pub fn respect_allowed_dependencies(
    policy: impl DependencyPolicy + 'static,
    scope: DependencyScope,
) -> RespectAllowedDependencies {
    RespectAllowedDependencies {
        policy: Box::new(policy),
        scope,
        ignore: IgnoreFilter::new(),
    }
}

impl IgnoreDependencies for RespectAllowedDependencies {
    fn ignore_filter_mut(&mut self) -> &mut IgnoreFilter {
        &mut self.ignore
    }
}

impl Condition<Components> for RespectAllowedDependencies {
    fn description(&self) -> String {
        format!(
            "respect their allowed dependencies {} {}",
            self.policy.description(),
            self.scope.description()
        )
    }

    fn check(
        &self,
        components: &Components,
        ctx: &EvaluationContext<'_>,
        events: &mut ConditionEvents,
    ) -> Result<(), ConfigurationError> {
        self.policy.validate(components)?;
        let dependencies = ComponentDependencies::derive(
            components,
            self.ignore.retain(ctx.graph().dependencies()),
        );

        for edge in dependencies.iter() {
            let in_scope: Vec<&Dependency> = edge
                .evidences()
                .iter()
                .copied()
                .filter(|dependency| self.scope.includes(dependency, components))
                .collect();
            if in_scope.is_empty() {
                continue;
            }
            let allowed = self.policy.allows(edge.origin(), edge.target());
            debug!("Module dependency {edge}: allowed = {allowed}");
            events.add(ConditionEvent::new(
                edge.to_string(),
                allowed,
                evidence_block(format!("Module Dependency [{edge}]:"), &in_scope),
            ));
        }

        for undefined in dependencies.undefined() {
            if self.scope.includes(undefined.dependency, components) {
                events.add(ConditionEvent::violated(
                    undefined.origin.name(),
                    format!(
                        "Dependency not contained in any module: {}",
                        undefined.dependency.description_line()
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// Module-to-module dependencies must target elements matching a predicate.
pub struct OnlyDependOnEachOtherThrough {
    predicate: ElementPredicate,
    ignore: IgnoreFilter,
}

/// `only depend on each other through elements that <predicate>`.
///
/// Reports each offending raw dependency on its own line.
#[must_use]
pub fn only_depend_on_each_other_through_elements_that(
    predicate: ElementPredicate,
) -> OnlyDependOnEachOtherThrough {
    OnlyDependOnEachOtherThrough {
        predicate,
        ignore: IgnoreFilter::new(),
    }
}

impl IgnoreDependencies for OnlyDependOnEachOtherThrough {
    fn ignore_filter_mut(&mut self) -> &mut IgnoreFilter {
        &mut self.ignore
    }
}

impl Condition<Components> for OnlyDependOnEachOtherThrough {
    fn description(&self) -> String {
        format!(
            "only depend on each other through elements that {}",
            self.predicate
        )
    }

    fn check(
        &self,
        components: &Components,
        ctx: &EvaluationContext<'_>,
        events: &mut ConditionEvents,
    ) -> Result<(), ConfigurationError> {
        let dependencies = ComponentDependencies::derive(
            components,
            self.ignore.retain(ctx.graph().dependencies()),
        );
        for edge in dependencies.iter() {
            for evidence in edge.evidences() {
                events.add(ConditionEvent::new(
                    edge.to_string(),
                    self.predicate.test(evidence.target()),
                    evidence.description_line(),
                ));
            }
        }
        Ok(())
    }
}

/// No component may depend on another.
#[derive(Debug, Clone, Default)]
pub struct NotDependOnEachOther {
    ignore: IgnoreFilter,
}

/// `not depend on each other`: one violation per component pair.
#[must_use]
pub fn not_depend_on_each_other() -> NotDependOnEachOther {
    NotDependOnEachOther::default()
}

impl IgnoreDependencies for NotDependOnEachOther {
    fn ignore_filter_mut(&mut self) -> &mut IgnoreFilter {
        &mut self.ignore
    }
}

impl Condition<Components> for NotDependOnEachOther {
    fn description(&self) -> String {
        "not depend on each other".to_string()
    }

    fn check(
        &self,
        components: &Components,
        ctx: &EvaluationContext<'_>,
        events: &mut ConditionEvents,
    ) -> Result<(), ConfigurationError> {
        let dependencies = ComponentDependencies::derive(
            components,
            self.ignore.retain(ctx.graph().dependencies()),
        );
        for edge in dependencies.iter() {
            events.add(ConditionEvent::violated(
                edge.to_string(),
                evidence_block(
                    format!("{} calls {}:", edge.origin().name(), edge.target().name()),
                    edge.evidences(),
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Classifier, SliceAssignment};
    use crate::config::Config;
    use crate::graph::{DependencySpec, ElementSpec, Graph};
    use crate::modules::{AllowedModuleDependencies, ModuleDefinitions};
    use crate::predicate::dependencies;
    use crate::predicate::elements::{name_matching, resides_in};

    fn graph() -> Graph {
        let mut builder = Graph::builder();
        for name in [
            "app.one.Service",
            "app.two.api.TwoApi",
            "app.two.internal.TwoImpl",
            "app.three.Three",
            "lib.Util",
        ] {
            builder.add_element(ElementSpec::class(name)).unwrap();
        }
        for (origin, target, line) in [
            ("app.one.Service", "app.two.api.TwoApi", 10),
            ("app.one.Service", "app.two.internal.TwoImpl", 11),
            ("app.one.Service", "app.three.Three", 12),
            ("app.one.Service", "lib.Util", 13),
        ] {
            builder
                .add_dependency(
                    DependencySpec::new(
                        origin,
                        target,
                        format!("Method <{origin}.run()> calls method <{target}.go()>"),
                    )
                    .at("Service.java", line),
                )
                .unwrap();
        }
        builder.build()
    }

    fn modules() -> ModuleDefinitions {
        ModuleDefinitions::new()
            .define_namespaces("One", &["app.one.."])
            .unwrap()
            .define_namespaces("Two", &["app.two.."])
            .unwrap()
            .define_namespaces("Three", &["app.three.."])
            .unwrap()
    }

    fn run(
        condition: &dyn Condition<Components>,
        graph: &Graph,
        classifier: &dyn Classifier,
    ) -> Result<ConditionEvents, ConfigurationError> {
        let config = Config::default();
        let ctx = EvaluationContext::new(graph, &config);
        let components =
            Components::partition(graph.elements().iter().map(AsRef::as_ref), classifier)?;
        let mut events = ConditionEvents::new();
        condition.check(&components, &ctx, &mut events)?;
        Ok(events)
    }

    #[test]
    fn disallowed_module_dependency_is_reported_with_evidence() {
        let graph = graph();
        let allowed = AllowedModuleDependencies::new().allow("One", ["Two"]);
        let condition = respect_allowed_dependencies(allowed, DependencyScope::BetweenModules);
        let events = run(&condition, &graph, &modules()).unwrap();

        insta::assert_snapshot!(events.violation_lines().join("\n---\n"), @r"
        Module Dependency [One -> Three]:
        Method <app.one.Service.run()> calls method <app.three.Three.go()> in (Service.java:12)
        ");
    }

    #[test]
    fn undefined_dependencies_are_reported_when_in_scope() {
        let graph = graph();
        let allowed = AllowedModuleDependencies::new().allow("One", ["Two", "Three"]);
        let condition = respect_allowed_dependencies(allowed, DependencyScope::AllDependencies);
        let events = run(&condition, &graph, &modules()).unwrap();
        assert_eq!(
            events.violation_lines(),
            vec!["Dependency not contained in any module: Method <app.one.Service.run()> calls method <lib.Util.go()> in (Service.java:13)"]
        );
    }

    #[test]
    fn ignored_pair_removes_the_violation() {
        let graph = graph();
        let allowed = AllowedModuleDependencies::new().allow("One", ["Two"]);
        let condition = respect_allowed_dependencies(allowed, DependencyScope::BetweenModules)
            .ignore_dependency_between("app.one.Service", "app.three.Three");
        assert!(!run(&condition, &graph, &modules()).unwrap().contain_violation());
    }

    #[test]
    fn unknown_module_in_allow_list_is_a_configuration_error() {
        let graph = graph();
        let allowed = AllowedModuleDependencies::new().allow("One", ["Four"]);
        let condition = respect_allowed_dependencies(allowed, DependencyScope::BetweenModules);
        let err = run(&condition, &graph, &modules()).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownComponent {
                context: "allowed module dependencies".into(),
                name: "Four".into(),
            }
        );
    }

    #[test]
    fn only_through_reports_each_raw_dependency() {
        let graph = graph();
        let condition =
            only_depend_on_each_other_through_elements_that(resides_in("..api").unwrap());
        let events = run(&condition, &graph, &modules()).unwrap();
        assert_eq!(
            events.violation_lines(),
            vec![
                "Method <app.one.Service.run()> calls method <app.three.Three.go()> in (Service.java:12)",
                "Method <app.one.Service.run()> calls method <app.two.internal.TwoImpl.go()> in (Service.java:11)",
            ]
        );
    }

    #[test]
    fn slices_not_depending_on_each_other() {
        let graph = graph();
        let slices = SliceAssignment::matching("app.(*)..").unwrap();
        let condition = not_depend_on_each_other().ignore_dependency_matching(dependencies::target(
            name_matching(".*Three").unwrap(),
        ));
        let events = run(&condition, &graph, &slices).unwrap();
        insta::assert_snapshot!(events.violation_lines().join("\n---\n"), @r"
        Slice one calls Slice two:
        Method <app.one.Service.run()> calls method <app.two.api.TwoApi.go()> in (Service.java:10)
        Method <app.one.Service.run()> calls method <app.two.internal.TwoImpl.go()> in (Service.java:11)
        ");
    }
}
