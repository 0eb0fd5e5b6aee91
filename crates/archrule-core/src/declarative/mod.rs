//! Declarative architecture rules driven by TOML configuration.
//!
//! Modules, slices and the checks between them can be declared in the same
//! `archrule.toml` that carries the evaluation settings, without writing
//! Rust rule code.
//!
//! # Architecture
//!
//! ```text
//! TOML text
//!   ↓ serde (DTO layer)
//! config_dto types
//!   ↓ validate + convert
//! DeclarativeConfig (pure domain model)
//!   ↓ load_rules_from_toml()
//! Vec<DeclaredRule>
//! ```

pub mod config_dto;
pub mod loader;
pub mod model;
pub mod rules;

pub use rules::DeclaredRule;

use crate::config::Config;

/// Errors from parsing TOML and loading declarative rules.
#[derive(Debug, thiserror::Error)]
pub enum LoadRulesError {
    /// TOML deserialization failed.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Domain model validation failed.
    #[error("{0}")]
    Load(#[from] loader::LoadError),
}

/// Parses TOML content and creates all declared rules.
///
/// Priority overrides from `settings` are applied; disabled rules are
/// still returned so callers can list them. Returns `Ok(vec![])` if no
/// declarative sections are present.
///
/// # Errors
///
/// Returns an error if TOML parsing or model validation fails.
pub fn load_rules_from_toml(
    content: &str,
    settings: &Config,
) -> Result<Vec<DeclaredRule>, LoadRulesError> {
    let dto: config_dto::DeclarativeConfigDto = toml::from_str(content)?;
    let config = loader::load(dto)?;
    Ok(create_rules(&config, settings))
}

/// Creates all declared rules from a validated [`model::DeclarativeConfig`].
///
/// Module rules come first, then slice rules in declaration order.
#[must_use]
pub fn create_rules(config: &model::DeclarativeConfig, settings: &Config) -> Vec<DeclaredRule> {
    if config.is_empty() {
        return vec![];
    }

    let mut result = rules::module_rules(config, settings);
    result.extend(rules::slice_rules(config, settings));
    tracing::debug!("Created {} declarative rules", result.len());
    result
}
