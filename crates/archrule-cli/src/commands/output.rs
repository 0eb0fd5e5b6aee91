//! Shared output formatting for evaluation results.

use anyhow::Result;
use archrule_core::{EvaluationResult, Priority};
use serde::Serialize;

use crate::OutputFormat;

/// One evaluated rule.
#[derive(Debug, Serialize)]
pub struct RuleOutcome {
    /// Declared rule name.
    pub name: String,
    /// Evaluation result.
    #[serde(flatten)]
    pub result: EvaluationResult,
}

impl RuleOutcome {
    /// Pairs a rule name with its result.
    #[must_use]
    pub fn new(name: impl Into<String>, result: EvaluationResult) -> Self {
        Self {
            name: name.into(),
            result,
        }
    }
}

/// Print evaluation results in the specified format.
pub fn print(outcomes: &[RuleOutcome], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(outcomes),
        OutputFormat::Json => return print_json(outcomes),
        OutputFormat::Compact => print_compact(outcomes),
    }
    Ok(())
}

fn priority_indicator(priority: Priority) -> String {
    let color = match priority {
        Priority::High => "\x1b[31m",
        Priority::Medium => "\x1b[33m",
        Priority::Low => "\x1b[34m",
    };
    format!("{color}{priority}\x1b[0m")
}

fn print_text(outcomes: &[RuleOutcome]) {
    let mut violated = 0;
    let mut violations = 0;

    for outcome in outcomes {
        match outcome.result.clone().into_check() {
            Ok(()) => println!("\x1b[32mpassed\x1b[0m {}", outcome.name),
            Err(violation) => {
                violated += 1;
                violations += outcome.result.violation_count();
                println!(
                    "{} {}",
                    priority_indicator(outcome.result.priority()),
                    outcome.name
                );
                println!("{:?}", miette::Report::new(violation));
            }
        }
    }

    let summary_color = if violated > 0 { "\x1b[31m" } else { "\x1b[32m" };
    println!(
        "{}Evaluated {} rule(s): {} violated, {} violation(s)\x1b[0m",
        summary_color,
        outcomes.len(),
        violated,
        violations
    );
}

fn print_json(outcomes: &[RuleOutcome]) -> Result<()> {
    let json = serde_json::to_string_pretty(outcomes)?;
    println!("{json}");
    Ok(())
}

fn print_compact(outcomes: &[RuleOutcome]) {
    for outcome in outcomes {
        for violation in outcome.result.violations() {
            println!(
                "{} [{}] {}",
                outcome.name,
                outcome.result.priority(),
                violation.replace('\n', " | "),
            );
        }
    }
}
