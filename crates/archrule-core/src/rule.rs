//! Rules: a subject selection, a condition, and how to report.
//!
//! ```text
//! ElementRule::all(that).should(condition)      elements   ──► EvaluationResult
//! ComponentRule::slices(assignment).should(..)  components ──► EvaluationResult
//! ```

use crate::component::{Classifier, Components, SliceAssignment};
use crate::condition::{BoxedCondition, Condition, ConditionEvents, Joined};
use crate::config::Config;
use crate::context::EvaluationContext;
use crate::error::ConfigurationError;
use crate::graph::{CodeElement, Graph};
use crate::modules::ModuleDefinitions;
use crate::predicate::{elements, ElementPredicate};
use crate::result::{EvaluationResult, Priority, RuleError};
use std::sync::Arc;
use tracing::info;

/// An evaluable architecture rule.
///
/// Evaluation never mutates the graph, so rules may be evaluated
/// concurrently against one shared snapshot.
pub trait ArchRule: Send + Sync {
    /// Full rule text, as shown in the report header.
    fn description(&self) -> String;

    /// Priority shown in the report header.
    fn priority(&self) -> Priority {
        Priority::Medium
    }

    /// Evaluates the rule under `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if the rule cannot be evaluated.
    fn evaluate_with(
        &self,
        graph: &Graph,
        config: &Config,
    ) -> Result<EvaluationResult, ConfigurationError>;

    /// Evaluates the rule under default settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if the rule cannot be evaluated.
    fn evaluate(&self, graph: &Graph) -> Result<EvaluationResult, ConfigurationError> {
        self.evaluate_with(graph, &Config::default())
    }

    /// Evaluates under `config` and fails on any violation.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Violated`] with the full report, or
    /// [`RuleError::Configuration`].
    fn check_with(&self, graph: &Graph, config: &Config) -> Result<(), RuleError> {
        self.evaluate_with(graph, config)?.into_check()?;
        Ok(())
    }

    /// Evaluates under default settings and fails on any violation.
    ///
    /// # Errors
    ///
    /// See [`ArchRule::check_with`].
    fn check(&self, graph: &Graph) -> Result<(), RuleError> {
        self.check_with(graph, &Config::default())
    }
}

/// Boxed rule.
pub type RuleBox = Box<dyn ArchRule>;

/// Reporting options shared by all rule kinds.
#[derive(Debug, Clone, Default)]
struct Decorations {
    described_as: Option<String>,
    because: Option<String>,
    allow_empty_should: Option<bool>,
    priority: Priority,
}

impl Decorations {
    fn render(&self, generated: String) -> String {
        let text = self.described_as.clone().unwrap_or(generated);
        match &self.because {
            Some(reason) => format!("{text}, because {reason}"),
            None => text,
        }
    }

    fn ensure_subjects(
        &self,
        found: bool,
        rule: &str,
        config: &Config,
    ) -> Result<(), ConfigurationError> {
        let allowed = self
            .allow_empty_should
            .unwrap_or(!config.fail_on_empty_should);
        if found || allowed {
            Ok(())
        } else {
            Err(ConfigurationError::EmptyShould {
                rule: rule.to_string(),
            })
        }
    }
}

/// Elements selected by a predicate, waiting for a condition.
pub struct ElementSelection {
    negated: bool,
    that: ElementPredicate,
}

impl ElementSelection {
    /// Completes the rule with `condition`.
    #[must_use]
    pub fn should(self, condition: impl Condition<CodeElement> + 'static) -> ElementRule {
        ElementRule {
            negated: self.negated,
            that: self.that,
            condition: Box::new(condition),
            decorations: Decorations::default(),
        }
    }
}

/// A rule over individual elements.
pub struct ElementRule {
    negated: bool,
    that: ElementPredicate,
    condition: BoxedCondition<CodeElement>,
    decorations: Decorations,
}

impl ElementRule {
    /// Every element matching `that` should satisfy the condition.
    #[must_use]
    pub fn all(that: ElementPredicate) -> ElementSelection {
        ElementSelection {
            negated: false,
            that,
        }
    }

    /// No element matching `that` should satisfy the condition.
    #[must_use]
    pub fn no(that: ElementPredicate) -> ElementSelection {
        ElementSelection {
            negated: true,
            that,
        }
    }

    /// Every element of the graph should satisfy the condition.
    #[must_use]
    pub fn all_elements() -> ElementSelection {
        Self::all(elements::any())
    }

    /// Adds a condition that must hold as well.
    #[must_use]
    pub fn and_should(mut self, condition: impl Condition<CodeElement> + 'static) -> Self {
        self.condition = Box::new(Joined::and(vec![self.condition, Box::new(condition)]));
        self
    }

    /// Adds an alternative condition.
    #[must_use]
    pub fn or_should(mut self, condition: impl Condition<CodeElement> + 'static) -> Self {
        self.condition = Box::new(Joined::or(vec![self.condition, Box::new(condition)]));
        self
    }

    /// Appends `, because <reason>` to the description.
    #[must_use]
    pub fn because(mut self, reason: impl Into<String>) -> Self {
        self.decorations.because = Some(reason.into());
        self
    }

    /// Replaces the generated description.
    #[must_use]
    pub fn described_as(mut self, description: impl Into<String>) -> Self {
        self.decorations.described_as = Some(description.into());
        self
    }

    /// Overrides `fail_on_empty_should` for this rule.
    #[must_use]
    pub fn allow_empty_should(mut self, allow: bool) -> Self {
        self.decorations.allow_empty_should = Some(allow);
        self
    }

    /// Sets the priority shown in the report header.
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.decorations.priority = priority;
        self
    }
}

impl ArchRule for ElementRule {
    fn description(&self) -> String {
        let quantifier = if self.negated { "no elements" } else { "elements" };
        self.decorations.render(format!(
            "{quantifier} that {} should {}",
            self.that,
            self.condition.description()
        ))
    }

    fn priority(&self) -> Priority {
        self.decorations.priority
    }

    fn evaluate_with(
        &self,
        graph: &Graph,
        config: &Config,
    ) -> Result<EvaluationResult, ConfigurationError> {
        let description = self.description();
        let subjects: Vec<&Arc<CodeElement>> = graph
            .elements()
            .iter()
            .filter(|element| self.that.test(element))
            .collect();
        self.decorations
            .ensure_subjects(!subjects.is_empty(), &description, config)?;

        let ctx = EvaluationContext::new(graph, config)
            .with_subjects(subjects.iter().copied().map(AsRef::as_ref));
        let mut events = ConditionEvents::new();
        for subject in subjects {
            if self.negated {
                let mut sub = ConditionEvents::new();
                self.condition.check(subject, &ctx, &mut sub)?;
                events.append(sub.inverted());
            } else {
                self.condition.check(subject, &ctx, &mut events)?;
            }
        }

        info!(
            "Rule '{}' evaluated: {} violations",
            description,
            events.violating().len()
        );
        Ok(EvaluationResult::from_events(
            description,
            self.decorations.priority,
            &events,
        ))
    }
}

/// Components produced by a classifier, waiting for a condition.
pub struct ComponentSelection {
    classifier: Box<dyn Classifier>,
}

impl ComponentSelection {
    /// Completes the rule with `condition`.
    #[must_use]
    pub fn should(self, condition: impl Condition<Components> + 'static) -> ComponentRule {
        ComponentRule {
            classifier: self.classifier,
            condition: Box::new(condition),
            decorations: Decorations::default(),
        }
    }
}

/// A rule over slices or modules.
pub struct ComponentRule {
    classifier: Box<dyn Classifier>,
    condition: BoxedCondition<Components>,
    decorations: Decorations,
}

impl ComponentRule {
    /// Components are slices carved by a namespace pattern.
    #[must_use]
    pub fn slices(assignment: SliceAssignment) -> ComponentSelection {
        Self::components(assignment)
    }

    /// Components are explicitly declared modules.
    #[must_use]
    pub fn modules(definitions: ModuleDefinitions) -> ComponentSelection {
        Self::components(definitions)
    }

    /// Components come from any classifier.
    #[must_use]
    pub fn components(classifier: impl Classifier + 'static) -> ComponentSelection {
        ComponentSelection {
            classifier: Box::new(classifier),
        }
    }

    /// Adds a condition that must hold as well. Ignore filters of earlier
    /// conditions do not apply to it.
    #[must_use]
    pub fn and_should(mut self, condition: impl Condition<Components> + 'static) -> Self {
        self.condition = Box::new(Joined::and(vec![self.condition, Box::new(condition)]));
        self
    }

    /// Appends `, because <reason>` to the description.
    #[must_use]
    pub fn because(mut self, reason: impl Into<String>) -> Self {
        self.decorations.because = Some(reason.into());
        self
    }

    /// Replaces the generated description.
    #[must_use]
    pub fn described_as(mut self, description: impl Into<String>) -> Self {
        self.decorations.described_as = Some(description.into());
        self
    }

    /// Overrides `fail_on_empty_should` for this rule.
    #[must_use]
    pub fn allow_empty_should(mut self, allow: bool) -> Self {
        self.decorations.allow_empty_should = Some(allow);
        self
    }

    /// Sets the priority shown in the report header.
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.decorations.priority = priority;
        self
    }
}

impl ArchRule for ComponentRule {
    fn description(&self) -> String {
        self.decorations.render(format!(
            "{} should {}",
            self.classifier.description(),
            self.condition.description()
        ))
    }

    fn priority(&self) -> Priority {
        self.decorations.priority
    }

    fn evaluate_with(
        &self,
        graph: &Graph,
        config: &Config,
    ) -> Result<EvaluationResult, ConfigurationError> {
        let description = self.description();
        let components = Components::partition(
            graph.elements().iter().map(AsRef::as_ref),
            self.classifier.as_ref(),
        )?;
        self.decorations
            .ensure_subjects(!components.is_empty(), &description, config)?;

        let ctx = EvaluationContext::new(graph, config);
        let mut events = ConditionEvents::new();
        self.condition.check(&components, &ctx, &mut events)?;

        info!(
            "Rule '{}' evaluated: {} violations",
            description,
            events.violating().len()
        );
        Ok(EvaluationResult::from_events(
            description,
            self.decorations.priority,
            &events,
        ))
    }
}
