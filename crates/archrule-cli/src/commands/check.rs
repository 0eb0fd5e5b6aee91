//! Check command implementation.

use anyhow::{bail, Context, Result};
use archrule_core::{ArchRule, Graph, GraphSnapshot};
use std::path::Path;

use super::output::RuleOutcome;
use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Runs the check command.
///
/// Exits with status 1 if any evaluated rule is violated.
pub fn run(
    graph_path: &Path,
    format: OutputFormat,
    rules_filter: Option<&str>,
    source: &ConfigSource,
) -> Result<()> {
    let loaded = super::load(source)?;
    let graph = read_graph(graph_path)?;

    let selected: Option<Vec<&str>> =
        rules_filter.map(|filter| filter.split(',').map(str::trim).collect());
    if let Some(names) = &selected {
        for name in names {
            if !loaded.rules.iter().any(|rule| rule.name() == *name) {
                tracing::warn!("Unknown rule: {}", name);
            }
        }
    }

    let rules: Vec<_> = loaded
        .rules
        .iter()
        .filter(|rule| loaded.settings.is_rule_enabled(rule.name()))
        .filter(|rule| {
            selected
                .as_ref()
                .map_or(true, |names| names.contains(&rule.name()))
        })
        .collect();

    if rules.is_empty() {
        tracing::warn!("No rules to evaluate; declare [[modules]] or [[slices]] in archrule.toml");
        return Ok(());
    }

    tracing::info!(
        "Evaluating {} rule(s) against {} element(s)",
        rules.len(),
        graph.len()
    );

    let mut outcomes = Vec::with_capacity(rules.len());
    for rule in rules {
        let result = rule
            .evaluate_with(&graph, &loaded.settings)
            .with_context(|| format!("Rule '{}' could not be evaluated", rule.name()))?;
        outcomes.push(RuleOutcome::new(rule.name(), result));
    }

    super::output::print(&outcomes, format)?;

    if outcomes.iter().any(|outcome| outcome.result.has_violations()) {
        std::process::exit(1);
    }

    Ok(())
}

fn read_graph(path: &Path) -> Result<Graph> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read graph snapshot: {}", path.display()))?;
    let snapshot: GraphSnapshot = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse graph snapshot: {}", path.display()))?;
    let graph = snapshot
        .into_graph()
        .with_context(|| format!("Invalid graph snapshot: {}", path.display()))?;
    if graph.is_empty() {
        bail!("Graph snapshot {} contains no elements", path.display());
    }
    Ok(graph)
}
