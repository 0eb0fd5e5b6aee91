//! Evaluation settings.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration. The same TOML document may also carry declarative rules;
//! keys that belong to them are ignored here.

use crate::result::Priority;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Top-level settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Fail rules whose subject selection is empty (default: true).
    #[serde(default = "default_true")]
    pub fail_on_empty_should: bool,

    /// Cycle reporting limits.
    #[serde(default)]
    pub cycles: CycleConfig,

    /// Transitive search settings.
    #[serde(default)]
    pub transitive: TransitiveConfig,

    /// Per-rule overrides, keyed by declarative rule name.
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fail_on_empty_should: true,
            cycles: CycleConfig::default(),
            transitive: TransitiveConfig::default(),
            rules: HashMap::new(),
        }
    }
}

impl Config {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks if a declarative rule is enabled.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_name: &str) -> bool {
        self.rules
            .get(rule_name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the priority override for a declarative rule.
    #[must_use]
    pub fn rule_priority(&self, rule_name: &str) -> Option<Priority> {
        self.rules.get(rule_name).and_then(|c| c.priority)
    }
}

/// Limits applied while reporting cycles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleConfig {
    /// Maximum number of cycles reported per evaluation.
    #[serde(default = "default_max_cycles")]
    pub max_number_to_detect: usize,

    /// Maximum number of evidences listed per cycle hop.
    #[serde(default = "default_max_dependencies_per_edge")]
    pub max_dependencies_per_edge: usize,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            max_number_to_detect: default_max_cycles(),
            max_dependencies_per_edge: default_max_dependencies_per_edge(),
        }
    }
}

/// Transitive dependency search settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransitiveConfig {
    /// Maximum path length explored; unbounded when absent.
    #[serde(default)]
    pub max_depth: Option<usize>,
}

/// Per-rule overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether the rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Priority override.
    #[serde(default)]
    pub priority: Option<Priority>,
}

fn default_true() -> bool {
    true
}

fn default_max_cycles() -> usize {
    100
}

fn default_max_dependencies_per_edge() -> usize {
    20
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert!(config.fail_on_empty_should);
        assert_eq!(config.cycles.max_number_to_detect, 100);
        assert_eq!(config.cycles.max_dependencies_per_edge, 20);
        assert_eq!(config.transitive.max_depth, None);
        assert!(config.is_rule_enabled("anything"));
    }

    #[test]
    fn empty_document_equals_defaults() {
        let config = Config::parse("").unwrap();
        assert!(config.fail_on_empty_should);
        assert_eq!(config.cycles.max_number_to_detect, 100);
    }

    #[test]
    fn parse_overrides_and_ignores_rule_sections() {
        let toml = r#"
fail_on_empty_should = false

[cycles]
max_number_to_detect = 5

[transitive]
max_depth = 12

[rules.modules-free-of-cycles]
enabled = false

[rules.slices-free-of-cycles]
priority = "high"

[[modules]]
name = "One"
namespaces = ["app.one.."]
"#;
        let config = Config::parse(toml).expect("Failed to parse");
        assert!(!config.fail_on_empty_should);
        assert_eq!(config.cycles.max_number_to_detect, 5);
        assert_eq!(config.cycles.max_dependencies_per_edge, 20);
        assert_eq!(config.transitive.max_depth, Some(12));
        assert!(!config.is_rule_enabled("modules-free-of-cycles"));
        assert_eq!(
            config.rule_priority("slices-free-of-cycles"),
            Some(Priority::High)
        );
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let err = Config::parse("cycles = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
