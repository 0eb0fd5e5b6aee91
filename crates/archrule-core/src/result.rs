//! Evaluation results and the failure raised by `check`.

use crate::condition::ConditionEvents;
use crate::error::ConfigurationError;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};

/// How urgent a rule is; shown in the report header.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Low priority.
    Low,
    /// Medium priority (default).
    #[default]
    Medium,
    /// High priority.
    High,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Outcome of evaluating one rule against one graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationResult {
    rule: String,
    priority: Priority,
    violations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    information: Option<String>,
}

impl EvaluationResult {
    /// A result from the events a rule's condition recorded.
    #[must_use]
    pub fn from_events(
        rule: impl Into<String>,
        priority: Priority,
        events: &ConditionEvents,
    ) -> Self {
        Self {
            rule: rule.into(),
            priority,
            violations: events.violation_lines(),
            information: events.information().map(str::to_string),
        }
    }

    /// Description of the evaluated rule.
    #[must_use]
    pub fn rule(&self) -> &str {
        &self.rule
    }

    /// Priority of the evaluated rule.
    #[must_use]
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Violation lines, in evaluation order. A line may span several
    /// physical lines (cycles, module dependencies).
    #[must_use]
    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    /// Summary recorded when reporting was truncated.
    #[must_use]
    pub fn information(&self) -> Option<&str> {
        self.information.as_deref()
    }

    /// Returns true if the rule was violated.
    #[must_use]
    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }

    /// Number of violation lines.
    #[must_use]
    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    /// Drops violation lines matching `predicate`, e.g. known violations
    /// accepted for now.
    #[must_use]
    pub fn filter_lines(mut self, predicate: impl Fn(&str) -> bool) -> Self {
        self.violations.retain(|line| !predicate(line));
        self
    }

    /// The full failure text: header, one entry per violation, then the
    /// summary if any.
    #[must_use]
    pub fn failure_report(&self) -> String {
        let mut report = format!(
            "Architecture Violation [Priority: {}] - Rule '{}' was violated ({} times):",
            self.priority,
            self.rule,
            self.violations.len()
        );
        for line in self.violations.iter().map(String::as_str).chain(self.information.as_deref()) {
            report.push('\n');
            report.push_str(line);
        }
        report
    }

    /// `Ok` if nothing was violated.
    ///
    /// # Errors
    ///
    /// Returns [`ArchitectureViolation`] carrying the failure report.
    pub fn into_check(self) -> Result<(), ArchitectureViolation> {
        if self.has_violations() {
            Err(ArchitectureViolation::new(self))
        } else {
            Ok(())
        }
    }
}

/// A violated rule, surfaced by [`ArchRule::check`](crate::ArchRule::check).
///
/// `Display` is exactly the failure report.
#[derive(Debug, Clone, thiserror::Error, Diagnostic)]
#[error("{report}")]
#[diagnostic(
    code(archrule::violation),
    help("fix the listed dependencies, or accept known ones with `EvaluationResult::filter_lines`")
)]
pub struct ArchitectureViolation {
    report: String,
    result: EvaluationResult,
}

impl ArchitectureViolation {
    fn new(result: EvaluationResult) -> Self {
        Self {
            report: result.failure_report(),
            result,
        }
    }

    /// The result that failed.
    #[must_use]
    pub fn result(&self) -> &EvaluationResult {
        &self.result
    }

    /// The formatted failure report.
    #[must_use]
    pub fn report(&self) -> &str {
        &self.report
    }
}

/// Why [`ArchRule::check`](crate::ArchRule::check) failed.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum RuleError {
    /// The rule could not be evaluated.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The rule was evaluated and violated.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Violated(#[from] ArchitectureViolation),
}
