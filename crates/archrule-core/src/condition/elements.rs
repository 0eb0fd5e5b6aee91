//! Conditions over single elements and their dependencies.

use super::{contains_any, contains_only, Condition, ConditionEvent, ConditionEvents, Quantify};
use crate::context::EvaluationContext;
use crate::error::ConfigurationError;
use crate::graph::{CodeElement, Dependency, Visibility};
use crate::namespace::NamespaceMatcher;
use crate::predicate::{dependencies, DependencyPredicate, ElementPredicate};
use regex::Regex;

/// Element name matches a regular expression in full.
pub struct NameMatching {
    pattern: String,
    regex: Regex,
}

/// `have name matching '<pattern>'`.
///
/// # Errors
///
/// Returns [`ConfigurationError::InvalidRegex`] if `pattern` does not compile.
pub fn have_name_matching(pattern: &str) -> Result<NameMatching, ConfigurationError> {
    let regex = Regex::new(&format!("^(?:{pattern})$"))
        .map_err(|err| ConfigurationError::invalid_regex(pattern, &err))?;
    Ok(NameMatching {
        pattern: pattern.to_string(),
        regex,
    })
}

impl Condition<CodeElement> for NameMatching {
    fn description(&self) -> String {
        format!("have name matching '{}'", self.pattern)
    }

    fn check(
        &self,
        element: &CodeElement,
        _ctx: &EvaluationContext<'_>,
        events: &mut ConditionEvents,
    ) -> Result<(), ConfigurationError> {
        let matches = self.regex.is_match(element.name());
        let verb = if matches { "has" } else { "does not have" };
        events.add(ConditionEvent::new(
            element.to_string(),
            matches,
            format!("{element} {verb} name matching '{}'", self.pattern),
        ));
        Ok(())
    }
}

/// Element has a given visibility.
pub struct HaveVisibility(Visibility);

/// `be <visibility>`.
#[must_use]
pub fn have_visibility(visibility: Visibility) -> HaveVisibility {
    HaveVisibility(visibility)
}

impl Condition<CodeElement> for HaveVisibility {
    fn description(&self) -> String {
        format!("be {}", self.0)
    }

    fn check(
        &self,
        element: &CodeElement,
        _ctx: &EvaluationContext<'_>,
        events: &mut ConditionEvents,
    ) -> Result<(), ConfigurationError> {
        events.add(ConditionEvent::new(
            element.to_string(),
            element.visibility() == self.0,
            format!("{element} is {}", element.visibility()),
        ));
        Ok(())
    }
}

/// Element namespace matches a namespace pattern.
pub struct ResideIn(NamespaceMatcher);

/// `reside in a namespace '<pattern>'`.
///
/// # Errors
///
/// Returns [`ConfigurationError::InvalidNamespacePattern`] for a bad pattern.
pub fn reside_in(pattern: &str) -> Result<ResideIn, ConfigurationError> {
    Ok(ResideIn(NamespaceMatcher::new(pattern)?))
}

impl Condition<CodeElement> for ResideIn {
    fn description(&self) -> String {
        format!("reside in a namespace {}", self.0)
    }

    fn check(
        &self,
        element: &CodeElement,
        _ctx: &EvaluationContext<'_>,
        events: &mut ConditionEvents,
    ) -> Result<(), ConfigurationError> {
        let matches = self.0.matches(element.namespace());
        let verb = if matches { "resides" } else { "does not reside" };
        events.add(ConditionEvent::new(
            element.to_string(),
            matches,
            format!("{element} {verb} in a namespace {}", self.0),
        ));
        Ok(())
    }
}

/// Element satisfies an arbitrary described predicate.
pub struct Satisfy(ElementPredicate);

/// `be elements that <predicate>`.
#[must_use]
pub fn satisfy(predicate: ElementPredicate) -> Satisfy {
    Satisfy(predicate)
}

impl Condition<CodeElement> for Satisfy {
    fn description(&self) -> String {
        format!("be elements that {}", self.0)
    }

    fn check(
        &self,
        element: &CodeElement,
        _ctx: &EvaluationContext<'_>,
        events: &mut ConditionEvents,
    ) -> Result<(), ConfigurationError> {
        let matches = self.0.test(element);
        let verb = if matches { "is" } else { "is not" };
        events.add(ConditionEvent::new(
            element.to_string(),
            matches,
            format!("{element} {verb} among elements that {}", self.0),
        ));
        Ok(())
    }
}

/// A raw dependency satisfies a predicate; the event line is its evidence.
pub struct DependencySatisfies(DependencyPredicate);

/// Dependency-level condition whose lines are the dependency evidence.
#[must_use]
pub fn dependency_satisfies(predicate: DependencyPredicate) -> DependencySatisfies {
    DependencySatisfies(predicate)
}

impl Condition<Dependency> for DependencySatisfies {
    fn description(&self) -> String {
        format!("have {}", self.0)
    }

    fn check(
        &self,
        dependency: &Dependency,
        _ctx: &EvaluationContext<'_>,
        events: &mut ConditionEvents,
    ) -> Result<(), ConfigurationError> {
        let line = dependency.description_line();
        events.add(ConditionEvent::new(line.clone(), self.0.test(dependency), line));
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Outgoing,
    Incoming,
}

/// Quantifies a dependency condition over an element's dependencies.
pub struct OverDependencies {
    direction: Direction,
    quantified: Quantify<Dependency>,
    description: String,
}

impl OverDependencies {
    fn outgoing(quantified: Quantify<Dependency>, description: String) -> Self {
        Self {
            direction: Direction::Outgoing,
            quantified: quantified.items_named("outgoing dependencies"),
            description,
        }
    }

    fn incoming(quantified: Quantify<Dependency>, description: String) -> Self {
        Self {
            direction: Direction::Incoming,
            quantified: quantified.items_named("incoming dependencies"),
            description,
        }
    }
}

impl Condition<CodeElement> for OverDependencies {
    fn description(&self) -> String {
        self.description.clone()
    }

    fn check(
        &self,
        element: &CodeElement,
        ctx: &EvaluationContext<'_>,
        events: &mut ConditionEvents,
    ) -> Result<(), ConfigurationError> {
        let graph = ctx.graph();
        match self.direction {
            Direction::Outgoing => self.quantified.check_items(
                element.to_string(),
                graph.dependencies_from(element),
                ctx,
                events,
            ),
            Direction::Incoming => self.quantified.check_items(
                element.to_string(),
                graph.dependencies_to(element),
                ctx,
                events,
            ),
        }
    }
}

/// Violated by every dependency whose target satisfies `predicate`.
#[must_use]
pub fn not_depend_on_elements_that(predicate: ElementPredicate) -> OverDependencies {
    let description = format!("not depend on elements that {predicate}");
    OverDependencies::outgoing(
        contains_any(dependency_satisfies(dependencies::target(predicate))),
        description,
    )
}

/// Violated if no dependency target satisfies `predicate`.
#[must_use]
pub fn depend_on_elements_that(predicate: ElementPredicate) -> super::Described<CodeElement> {
    let description = format!("depend on elements that {predicate}");
    super::Described::new(
        super::Never::new(not_depend_on_elements_that(predicate)),
        description,
    )
}

/// Violated by every dependency whose target fails `predicate`.
#[must_use]
pub fn only_depend_on_elements_that(predicate: ElementPredicate) -> OverDependencies {
    let description = format!("only depend on elements that {predicate}");
    OverDependencies::outgoing(
        contains_only(dependency_satisfies(dependencies::target(predicate))),
        description,
    )
}

/// Violated by every incoming dependency whose origin fails `predicate`.
#[must_use]
pub fn only_have_dependents_that(predicate: ElementPredicate) -> OverDependencies {
    let description = format!("only have dependents that {predicate}");
    OverDependencies::incoming(
        contains_only(dependency_satisfies(dependencies::origin(predicate))),
        description,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::graph::{DependencySpec, ElementSpec, Graph};
    use crate::predicate::elements::resides_in;

    fn graph() -> Graph {
        let mut builder = Graph::builder();
        for name in ["app.web.Controller", "app.service.Service", "app.db.Repo", "app.web.Lonely"] {
            builder.add_element(ElementSpec::class(name)).unwrap();
        }
        builder
            .add_element(ElementSpec::class("app.db.Hidden").visibility(Visibility::Package))
            .unwrap();
        for (origin, target, line) in [
            ("app.web.Controller", "app.service.Service", 3),
            ("app.web.Controller", "app.db.Repo", 9),
            ("app.service.Service", "app.db.Repo", 4),
        ] {
            builder
                .add_dependency(
                    DependencySpec::new(
                        origin,
                        target,
                        format!("Method <{origin}.run()> calls method <{target}.run()>"),
                    )
                    .at(format!("{}.java", origin.rsplit('.').next().unwrap()), line),
                )
                .unwrap();
        }
        builder.build()
    }

    fn check(condition: &dyn Condition<CodeElement>, graph: &Graph, name: &str) -> ConditionEvents {
        let config = Config::default();
        let ctx = EvaluationContext::new(graph, &config);
        let mut events = ConditionEvents::new();
        condition
            .check(graph.find(name).unwrap(), &ctx, &mut events)
            .unwrap();
        events
    }

    #[test]
    fn not_depend_on_reports_offending_call_sites() {
        let graph = graph();
        let condition = not_depend_on_elements_that(resides_in("..db").unwrap());
        assert_eq!(
            condition.description(),
            "not depend on elements that reside in a namespace '..db'"
        );
        let events = check(&condition, &graph, "app.web.Controller");
        assert_eq!(
            events.violation_lines(),
            vec!["Method <app.web.Controller.run()> calls method <app.db.Repo.run()> in (Controller.java:9)"]
        );
        assert!(!check(&condition, &graph, "app.web.Lonely").contain_violation());
    }

    #[test]
    fn depend_on_requires_one_matching_target() {
        let graph = graph();
        let condition = depend_on_elements_that(resides_in("..service").unwrap());
        assert!(!check(&condition, &graph, "app.web.Controller").contain_violation());

        let events = check(&condition, &graph, "app.service.Service");
        assert_eq!(
            events.violation_lines(),
            vec!["Method <app.service.Service.run()> calls method <app.db.Repo.run()> in (Service.java:4)"]
        );

        let lonely = check(&condition, &graph, "app.web.Lonely");
        assert_eq!(
            lonely.violation_lines(),
            vec!["Class <app.web.Lonely> has no outgoing dependencies"]
        );
    }

    #[test]
    fn only_depend_on_lists_every_counter_example() {
        let graph = graph();
        let condition = only_depend_on_elements_that(resides_in("..service").unwrap());
        let events = check(&condition, &graph, "app.web.Controller");
        assert_eq!(
            events.violation_lines(),
            vec!["Method <app.web.Controller.run()> calls method <app.db.Repo.run()> in (Controller.java:9)"]
        );
        assert!(!check(&condition, &graph, "app.web.Lonely").contain_violation());
    }

    #[test]
    fn only_have_dependents_checks_incoming_origins() {
        let graph = graph();
        let condition = only_have_dependents_that(resides_in("..service").unwrap());
        let events = check(&condition, &graph, "app.db.Repo");
        assert_eq!(events.violation_lines().len(), 1);
        assert!(events.violation_lines()[0].starts_with("Method <app.web.Controller.run()>"));
    }

    #[test]
    fn simple_conditions_state_facts() {
        let graph = graph();
        let events = check(&have_visibility(Visibility::Public), &graph, "app.db.Hidden");
        assert_eq!(
            events.violation_lines(),
            vec!["Class <app.db.Hidden> is package-private"]
        );

        let events = check(&reside_in("app.web").unwrap(), &graph, "app.db.Repo");
        assert_eq!(
            events.violation_lines(),
            vec!["Class <app.db.Repo> does not reside in a namespace 'app.web'"]
        );

        let events = check(
            &satisfy(resides_in("app.db").unwrap()),
            &graph,
            "app.db.Repo",
        );
        assert!(!events.contain_violation());
        assert_eq!(
            events.allowed()[0].description_lines(),
            vec!["Class <app.db.Repo> is among elements that reside in a namespace 'app.db'"]
        );

        let events = check(
            &satisfy(resides_in("app.web").unwrap()),
            &graph,
            "app.db.Repo",
        );
        assert_eq!(
            events.violation_lines(),
            vec!["Class <app.db.Repo> is not among elements that reside in a namespace 'app.web'"]
        );
    }
}
