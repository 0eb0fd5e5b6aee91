//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# archrule configuration
# Settings and declarative rules share this file.

# Fail rules whose subject selection is empty
fail_on_empty_should = true

[cycles]
# Stop after this many cycles per rule
max_number_to_detect = 100
# Evidence lines listed per cycle hop
max_dependencies_per_edge = 20

[transitive]
# Unbounded when absent
# max_depth = 50

# Modules group namespaces; `..` matches any number of packages
[[modules]]
name = "Web"
namespaces = ["com.example.web.."]

[[modules]]
name = "Service"
namespaces = ["com.example.service.."]

[[modules]]
name = "Persistence"
namespaces = ["com.example.persistence.."]

[allowed-dependencies]
Web = ["Service"]
Service = ["Persistence"]
Persistence = []

[module-rules]
respect-allowed-dependencies = true
free-of-cycles = true
# only-through = "..api.."
scope = "between-modules"          # all | between-modules

# Slices are carved by capture groups
[[slices]]
pattern = "com.example.(*).."
free-of-cycles = true
independent = false

# Known dependencies to accept (globs over element names)
# [[ignore-dependency]]
# origin = "com.example.web.Legacy*"
# target = "com.example.persistence.*"

# Per-rule overrides
# [rules.slices-free-of-cycles]
# enabled = false
# priority = "high"                # low | medium | high
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let config_path = Path::new("archrule.toml");

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)?;

    println!("Created archrule.toml");
    println!("\nNext steps:");
    println!("  1. Edit archrule.toml to declare your modules and slices");
    println!("  2. Export a graph snapshot with your importer");
    println!("  3. Run: archrule check --graph graph.json");

    Ok(())
}
