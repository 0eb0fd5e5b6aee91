//! List rules command implementation.

use anyhow::Result;
use archrule_core::ArchRule;

use crate::config_resolver::ConfigSource;

/// Runs the list-rules command.
pub fn run(source: &ConfigSource) -> Result<()> {
    let loaded = super::load(source)?;

    if loaded.rules.is_empty() {
        println!("No rules declared.");
        println!("\nDeclare [[modules]] with [module-rules], or [[slices]], in archrule.toml.");
        println!("Run `archrule init` for a starter configuration.");
        return Ok(());
    }

    println!("Declared rules:\n");
    println!("{:<40} {:<8} {:<9} Description", "Name", "Priority", "Enabled");
    println!("{}", "-".repeat(100));

    for rule in &loaded.rules {
        let enabled = if loaded.settings.is_rule_enabled(rule.name()) {
            "yes"
        } else {
            "no"
        };
        let description = rule.description();
        let mut lines = description.lines();
        println!(
            "{:<40} {:<8} {:<9} {}",
            rule.name(),
            rule.priority().to_string(),
            enabled,
            lines.next().unwrap_or_default()
        );
        for line in lines {
            println!("{:<59} {line}", "");
        }
    }

    println!("\nDisable or re-prioritize a rule with, e.g.:");
    println!("  [rules.modules-free-of-cycles]");
    println!("  enabled = false");
    println!("  priority = \"high\"");
    Ok(())
}
