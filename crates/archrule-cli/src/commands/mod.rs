//! Subcommand implementations.

pub mod check;
pub mod init;
pub mod list_rules;
pub mod output;

use anyhow::{Context, Result};
use archrule_core::declarative::{self, DeclaredRule};
use archrule_core::Config;

use crate::config_resolver::ConfigSource;

/// Settings and declared rules read from one configuration file.
pub struct Loaded {
    /// Evaluation settings.
    pub settings: Config,
    /// Every declared rule, enabled or not.
    pub rules: Vec<DeclaredRule>,
}

/// Reads settings and declarative rules from the resolved file.
///
/// Without a file, returns default settings and no rules.
pub fn load(source: &ConfigSource) -> Result<Loaded> {
    let content = match source.path() {
        Some(path) => {
            tracing::info!("Using config: {source}");
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {source}"))?
        }
        None => {
            tracing::debug!("No config found; using {source}");
            String::new()
        }
    };

    let settings = Config::parse(&content).context("Failed to load settings")?;
    let rules = declarative::load_rules_from_toml(&content, &settings)
        .context("Failed to load declarative rules")?;
    tracing::debug!("Loaded {} declared rule(s)", rules.len());
    Ok(Loaded { settings, rules })
}
