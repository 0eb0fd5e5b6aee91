//! TOML deserialization types (DTO layer).
//!
//! These types exist solely for serde deserialization.
//! They are converted to domain model types via the loader.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Raw TOML representation of declarative rules.
///
/// Shares its document with [`crate::Config`]; settings keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeclarativeConfigDto {
    /// Module definitions.
    #[serde(default)]
    pub modules: Vec<ModuleDto>,

    /// Allowed targets per module name.
    #[serde(rename = "allowed-dependencies", default)]
    pub allowed_dependencies: BTreeMap<String, Vec<String>>,

    /// Which module rules to generate.
    #[serde(rename = "module-rules", default)]
    pub module_rules: Option<ModuleRulesDto>,

    /// Slice patterns and their rules.
    #[serde(default)]
    pub slices: Vec<SliceDto>,

    /// Dependencies every generated rule ignores.
    #[serde(rename = "ignore-dependency", default)]
    pub ignore_dependency: Vec<IgnoreDependencyDto>,
}

/// TOML representation of a module.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleDto {
    /// Module name (e.g., "Orders").
    pub name: String,
    /// Namespace patterns (e.g., "app.orders..").
    pub namespaces: Vec<String>,
}

/// TOML representation of `[module-rules]`.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleRulesDto {
    /// Check `[allowed-dependencies]` (default: true).
    #[serde(rename = "respect-allowed-dependencies", default = "default_true")]
    pub respect_allowed_dependencies: bool,
    /// Check modules for cycles (default: false).
    #[serde(rename = "free-of-cycles", default)]
    pub free_of_cycles: bool,
    /// Namespace pattern every module-to-module dependency must target.
    #[serde(rename = "only-through", default)]
    pub only_through: Option<String>,
    /// `all` or `between-modules` (default).
    #[serde(default = "default_scope")]
    pub scope: String,
}

/// TOML representation of a slice declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct SliceDto {
    /// Namespace pattern with capture groups (e.g., "app.(*)..").
    pub pattern: String,
    /// Prefix of the generated rule names (default: "slices").
    #[serde(default = "default_slice_id")]
    pub id: String,
    /// Slice name template (e.g., "$1 feature").
    #[serde(default)]
    pub name: Option<String>,
    /// Check slices for cycles (default: true).
    #[serde(rename = "free-of-cycles", default = "default_true")]
    pub free_of_cycles: bool,
    /// Forbid any dependency between slices (default: false).
    #[serde(default)]
    pub independent: bool,
}

/// TOML representation of an ignored dependency.
#[derive(Debug, Clone, Deserialize)]
pub struct IgnoreDependencyDto {
    /// Glob over origin element names.
    pub origin: String,
    /// Glob over target element names.
    pub target: String,
}

fn default_true() -> bool {
    true
}

fn default_scope() -> String {
    "between-modules".to_string()
}

fn default_slice_id() -> String {
    "slices".to_string()
}
