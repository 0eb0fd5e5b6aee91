//! Declarative rule construction.
//!
//! Turns a validated [`DeclarativeConfig`] into named [`ArchRule`]s built
//! from the same conditions as hand-written rules.

use crate::component::IgnoreDependencies;
use crate::config::Config;
use crate::cycle::be_free_of_cycles;
use crate::declarative::model::DeclarativeConfig;
use crate::error::ConfigurationError;
use crate::graph::Graph;
use crate::modules::{
    not_depend_on_each_other, only_depend_on_each_other_through_elements_that,
    respect_allowed_dependencies, AllowedModuleDependencies,
};
use crate::namespace::NamespaceMatcher;
use crate::predicate::{DependencyPredicate, ElementPredicate};
use crate::result::{EvaluationResult, Priority};
use crate::rule::{ArchRule, ComponentRule, RuleBox};

// ────────────────────────────────────────────
// Named rules
// ────────────────────────────────────────────

/// A generated rule and the name `[rules.<name>]` overrides refer to.
pub struct DeclaredRule {
    name: String,
    rule: RuleBox,
}

impl DeclaredRule {
    /// Wraps `rule` under `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, rule: impl ArchRule + 'static) -> Self {
        Self {
            name: name.into(),
            rule: Box::new(rule),
        }
    }

    /// Rule name, e.g. `modules-free-of-cycles`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unwraps the rule.
    #[must_use]
    pub fn into_rule(self) -> RuleBox {
        self.rule
    }
}

impl std::fmt::Debug for DeclaredRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeclaredRule")
            .field("name", &self.name)
            .field("description", &self.rule.description())
            .finish()
    }
}

impl ArchRule for DeclaredRule {
    fn description(&self) -> String {
        self.rule.description()
    }

    fn priority(&self) -> Priority {
        self.rule.priority()
    }

    fn evaluate_with(
        &self,
        graph: &Graph,
        config: &Config,
    ) -> Result<EvaluationResult, ConfigurationError> {
        self.rule.evaluate_with(graph, config)
    }
}

// ────────────────────────────────────────────
// Construction
// ────────────────────────────────────────────

fn ignoring<C: IgnoreDependencies>(condition: C, ignored: &[DependencyPredicate]) -> C {
    ignored
        .iter()
        .cloned()
        .fold(condition, C::ignore_dependency_matching)
}

fn through(matcher: &NamespaceMatcher) -> ElementPredicate {
    let matcher = matcher.clone();
    ElementPredicate::new(format!("reside in a namespace {matcher}"), move |element| {
        matcher.matches(element.namespace())
    })
}

fn prioritized(name: &str, rule: ComponentRule, settings: &Config) -> DeclaredRule {
    let rule = match settings.rule_priority(name) {
        Some(priority) => rule.with_priority(priority),
        None => rule,
    };
    DeclaredRule::new(name, rule)
}

/// Builds the module rules of `[module-rules]`.
pub(crate) fn module_rules(config: &DeclarativeConfig, settings: &Config) -> Vec<DeclaredRule> {
    let Some(switches) = config.module_rules() else {
        return vec![];
    };
    let ignored = config.ignored();
    let mut rules = Vec::new();

    if switches.respect_allowed_dependencies {
        let allowed = config
            .allowed()
            .iter()
            .fold(AllowedModuleDependencies::new(), |allowed, (origin, targets)| {
                allowed.allow(origin.as_str(), targets.iter().map(|t| t.as_str().to_string()))
            });
        let condition = ignoring(
            respect_allowed_dependencies(allowed, switches.scope.clone()),
            ignored,
        );
        rules.push(prioritized(
            "modules-respect-allowed-dependencies",
            ComponentRule::modules(config.module_definitions()).should(condition),
            settings,
        ));
    }

    if switches.free_of_cycles {
        rules.push(prioritized(
            "modules-free-of-cycles",
            ComponentRule::modules(config.module_definitions())
                .should(ignoring(be_free_of_cycles(), ignored)),
            settings,
        ));
    }

    if let Some(matcher) = &switches.only_through {
        let condition = ignoring(
            only_depend_on_each_other_through_elements_that(through(matcher)),
            ignored,
        );
        rules.push(prioritized(
            "modules-only-through",
            ComponentRule::modules(config.module_definitions()).should(condition),
            settings,
        ));
    }

    rules
}

/// Builds the rules of every `[[slices]]` entry.
pub(crate) fn slice_rules(config: &DeclarativeConfig, settings: &Config) -> Vec<DeclaredRule> {
    let ignored = config.ignored();
    let mut rules = Vec::new();

    for slice in config.slices() {
        if slice.free_of_cycles() {
            rules.push(prioritized(
                &format!("{}-free-of-cycles", slice.id()),
                ComponentRule::slices(slice.assignment().clone())
                    .should(ignoring(be_free_of_cycles(), ignored)),
                settings,
            ));
        }
        if slice.independent() {
            rules.push(prioritized(
                &format!("{}-independent", slice.id()),
                ComponentRule::slices(slice.assignment().clone())
                    .should(ignoring(not_depend_on_each_other(), ignored)),
                settings,
            ));
        }
    }

    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declarative::{config_dto::DeclarativeConfigDto, loader};
    use crate::graph::{DependencySpec, ElementSpec};

    fn load(toml: &str) -> DeclarativeConfig {
        let dto: DeclarativeConfigDto = toml::from_str(toml).unwrap();
        loader::load(dto).unwrap()
    }

    fn graph() -> Graph {
        let mut builder = Graph::builder();
        for name in ["app.one.api.OneApi", "app.one.Legacy", "app.two.Two", "app.three.Three"] {
            builder.add_element(ElementSpec::class(name)).unwrap();
        }
        for (origin, target) in [
            ("app.one.Legacy", "app.three.Three"),
            ("app.two.Two", "app.one.api.OneApi"),
            ("app.three.Three", "app.two.Two"),
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

    const MODULES: &str = r#"
[[modules]]
name = "One"
namespaces = ["app.one.."]

[[modules]]
name = "Two"
namespaces = ["app.two.."]

[[modules]]
name = "Three"
namespaces = ["app.three.."]

[allowed-dependencies]
Two = ["One"]
Three = ["Two"]
"#;

    #[test]
    fn module_rules_are_named_and_evaluated() {
        let config = load(&format!("{MODULES}\n[module-rules]\nfree-of-cycles = true\n"));
        let rules = module_rules(&config, &Config::default());
        let names: Vec<&str> = rules.iter().map(DeclaredRule::name).collect();
        assert_eq!(names, ["modules-respect-allowed-dependencies", "modules-free-of-cycles"]);

        let allowed = rules[0].evaluate(&graph()).unwrap();
        assert_eq!(
            allowed.violations(),
            ["Module Dependency [One -> Three]:\n<app.one.Legacy> uses <app.three.Three>"]
        );
        let cycles = rules[1].evaluate(&graph()).unwrap();
        assert_eq!(cycles.violation_count(), 1);
    }

    #[test]
    fn ignored_dependencies_apply_to_every_rule() {
        let config = load(&format!(
            "{MODULES}\n[module-rules]\nfree-of-cycles = true\n\n[[ignore-dependency]]\norigin = \"app.one.Legacy*\"\ntarget = \"app.three.*\"\n"
        ));
        for rule in module_rules(&config, &Config::default()) {
            assert!(rule.check(&graph()).is_ok(), "{}", rule.name());
        }
    }

    #[test]
    fn only_through_targets_the_namespace() {
        let config = load(&format!(
            "{MODULES}\n[module-rules]\nrespect-allowed-dependencies = false\nonly-through = \"..api..\"\n"
        ));
        let rules = module_rules(&config, &Config::default());
        assert_eq!(rules.len(), 1);
        assert_eq!(
            rules[0].description(),
            "modules [One, Three, Two] should only depend on each other through elements that reside in a namespace '..api..'"
        );
        let result = rules[0].evaluate(&graph()).unwrap();
        assert_eq!(
            result.violations(),
            ["<app.one.Legacy> uses <app.three.Three>", "<app.three.Three> uses <app.two.Two>"]
        );
    }

    #[test]
    fn slice_rules_use_id_and_priority_override() {
        let config = load(
            r#"
[[slices]]
id = "features"
pattern = "app.(*).."
independent = true
"#,
        );
        let settings =
            Config::parse("[rules.features-independent]\npriority = \"high\"\n").unwrap();
        let rules = slice_rules(&config, &settings);
        let names: Vec<&str> = rules.iter().map(DeclaredRule::name).collect();
        assert_eq!(names, ["features-free-of-cycles", "features-independent"]);
        assert_eq!(rules[0].priority(), Priority::Medium);
        assert_eq!(rules[1].priority(), Priority::High);
        assert_eq!(rules[1].evaluate(&graph()).unwrap().violation_count(), 3);
    }
}
